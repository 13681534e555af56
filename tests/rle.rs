use hashlife::{rle, Engine, Error, Universe};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

proptest! {
  #[test]
  fn write_then_read_keeps_cells(
    cells in prop::collection::hash_set((-40i64..40, -40i64..40), 0..200),
  ) {
    let mut engine = Engine::new();
    let universe = cells.iter()
      .fold(Universe::new(&mut engine), |u, &(x, y)| u.set(&mut engine, x, y, true).unwrap());

    let text = rle::write(&engine, &universe);
    let loaded = rle::read(&mut engine, &text).unwrap().universe;

    let bbox = universe.bounding_box(&engine);
    let shifted: Vec<_> = universe.cells(&engine).into_iter()
      .map(|(x, y)| (x - bbox.west, y - bbox.north))
      .collect();
    prop_assert_eq!(loaded.cells(&engine), shifted);
    prop_assert_eq!(rle::write(&engine, &loaded), text);
  }
}

#[test]
fn gosper_gun_round_trip() {
  let gun = "#N Gosper glider gun
#C This was the first gun discovered.
x = 36, y = 9, rule = B3/S23
24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o4b
obo$10bo5bo7bo$11bo3bo$12b2o!
";
  let mut engine = Engine::new();
  let pattern = rle::read(&mut engine, gun).unwrap();
  assert_eq!(pattern.metadata.name.as_deref(), Some("Gosper glider gun"));
  assert_eq!(pattern.metadata.comments, vec!["This was the first gun discovered."]);
  assert_eq!(pattern.universe.population(), 36);
  assert_eq!(rle::write(&engine, &pattern.universe), gun.splitn(3, '\n').nth(2).unwrap());
}

#[test]
fn loading_replaces_the_rule() {
  let mut engine = Engine::new();
  rle::read(&mut engine, "x = 1, y = 1, rule = b36/s23\no!").unwrap();
  assert_eq!(engine.rule().to_string(), "B36/S23");

  let replicator = rle::read(&mut engine, "x = 3, y = 3, rule = B36/S23\nb2o$obo$2o!").unwrap();
  let text = rle::write(&engine, &replicator.universe);
  assert!(text.starts_with("x = 3, y = 3, rule = B36/S23\n"));
}

#[test]
fn format_errors_report_position() {
  let mut engine = Engine::new();
  assert_eq!(
    rle::read(&mut engine, "x = 2, y = 1\n2o?abcdefghijk!").unwrap_err(),
    Error::Format { position: 15, remainder: "?abcdefghi".to_owned() },
  );
  assert!(matches!(
    rle::read(&mut engine, "x = 1, y = 1, rule = Life\no!"),
    Err(Error::Format { .. })
  ));
}
