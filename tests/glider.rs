use hashlife::{rle, BoundingBox, Engine};
use pretty_assertions::assert_eq;

#[test]
fn multi_simulate() {
  let glider_0 = "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n";
  let glider_1 = "x = 3, y = 3, rule = B3/S23\nobo$b2o$bo!\n";
  let glider_2 = "x = 3, y = 3, rule = B3/S23\n2bo$obo$b2o!\n";
  let glider_3 = "x = 3, y = 3, rule = B3/S23\no$b2o$2o!\n";
  let mut engine = Engine::new();
  let uni = rle::read(&mut engine, glider_0).unwrap().universe;

  let uni = uni.run(&mut engine, 1).unwrap();
  assert_eq!(glider_1, &rle::write(&engine, &uni));

  let uni = uni.run(&mut engine, 169).unwrap();
  assert_eq!(glider_2, &rle::write(&engine, &uni));

  let uni = uni.run(&mut engine, 1).unwrap();
  assert_eq!(glider_3, &rle::write(&engine, &uni));
  assert_eq!(uni.generation(), 171);
}

#[test]
fn period_four_translation() {
  let mut engine = Engine::new();
  let uni = rle::read(&mut engine, "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!").unwrap().universe;
  let moved = uni.run(&mut engine, 4).unwrap();

  let expected: Vec<_> = uni.cells(&engine).into_iter().map(|(x, y)| (x + 1, y + 1)).collect();
  assert_eq!(moved.cells(&engine), expected);
  assert_eq!(moved.population(), 5);
  assert_eq!(moved.generation(), 4);
}

#[test]
fn far_travel() {
  let mut engine = Engine::new();
  let uni = rle::read(&mut engine, "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!").unwrap().universe;
  let moved = uni.run(&mut engine, 4 << 40).unwrap();

  assert_eq!(moved.generation(), 4 << 40);
  let d = 1i64 << 40;
  assert_eq!(moved.bounding_box(&engine), BoundingBox { west: d, north: d, east: d + 3, south: d + 3 });
  assert_eq!(rle::write(&engine, &moved), "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n");
}
