use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hashlife::{rle, Engine};

const GOSPER_GUN: &str = "x = 36, y = 9, rule = B3/S23
24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o4b
obo$10bo5bo7bo$11bo3bo$12b2o!";

fn gun_benchmark(c: &mut Criterion) {
  c.bench_function("gosper gun 100000 generations", |b| b.iter(|| {
    let mut engine = Engine::new();
    let gun = rle::read(&mut engine, GOSPER_GUN).unwrap().universe;

    let _ = gun.run(&mut engine, black_box(100000)).unwrap();
  }));

  c.bench_function("gosper gun 1000 single steps", |b| b.iter(|| {
    let mut engine = Engine::new();
    let mut gun = rle::read(&mut engine, GOSPER_GUN).unwrap().universe;
    for _ in 0..1000 {
      gun = gun.run(&mut engine, black_box(1)).unwrap();
    }
    engine.collect(&[&gun])
  }));
}

criterion_group!(benches, gun_benchmark);
criterion_main!(benches);
