use hashlife::{rle, Engine, EngineConfig, Error, Universe};
use proptest::prelude::*;

const R_PENTOMINO: &str = "x = 3, y = 3, rule = B3/S23\nb2o$2o$bo!";

fn r_pentomino(engine: &mut Engine) -> Universe {
  rle::read(engine, R_PENTOMINO).unwrap().universe
}

proptest! {
  #[test]
  fn rewind_returns_to_the_same_snapshot(
    steps in prop::collection::vec(1u64..50, 1..20),
    last in 1u64..200,
  ) {
    let mut engine = Engine::new();
    let mut universe = r_pentomino(&mut engine);
    for step in steps {
      universe = universe.run(&mut engine, step).unwrap();
    }

    let later = universe.run(&mut engine, last).unwrap();
    let back = later.run_back(&mut engine, last).unwrap();
    prop_assert!(back.ptr_eq(&universe));
    prop_assert_eq!(back.root(), universe.root());
    prop_assert_eq!(back.generation(), universe.generation());
  }

  #[test]
  fn rewind_to_any_generation(
    total in 1u64..400,
    back in 0u64..400,
  ) {
    let back = back.min(total);
    let mut engine = Engine::new();
    let start = r_pentomino(&mut engine);
    let mut universe = start.clone();
    for _ in 0..total {
      universe = universe.run(&mut engine, 1).unwrap();
    }

    let rewound = universe.run_back(&mut engine, back).unwrap();
    let direct = start.run(&mut engine, total - back).unwrap();
    prop_assert_eq!(rewound.generation(), total - back);
    prop_assert_eq!(rewound.cells(&engine), direct.cells(&engine));
  }
}

#[test]
fn generations_add_up() {
  let mut engine = Engine::new();
  let mut universe = r_pentomino(&mut engine);
  let mut generation = 0;
  for step in [1, 2, 3, 5, 8, 13, 21, 34, 55, 89] {
    universe = universe.run(&mut engine, step).unwrap();
    generation += step;
    assert_eq!(universe.generation(), generation);
  }
}

#[test]
fn history_is_logarithmic() {
  let mut engine = Engine::with_config(EngineConfig::default().with_history_window(2));
  let mut universe = r_pentomino(&mut engine);
  for _ in 0..2000 {
    universe = universe.run(&mut engine, 1).unwrap();
  }
  assert!(universe.history_len() < 50, "{}", universe.history_len());

  let mut cursor = universe.previous();
  let mut last = universe.generation();
  while let Some(previous) = cursor {
    assert!(previous.generation() < last);
    last = previous.generation();
    cursor = previous.previous();
  }
  assert_eq!(last, 0);
}

#[test]
fn rewind_past_the_beginning() {
  let mut engine = Engine::new();
  let universe = r_pentomino(&mut engine).run(&mut engine, 10).unwrap();
  assert!(matches!(universe.run_back(&mut engine, 11), Err(Error::InvalidArgument(_))));
  let start = universe.run_back(&mut engine, 10).unwrap();
  assert_eq!(start.generation(), 0);
  assert_eq!(start.population(), 5);
}
