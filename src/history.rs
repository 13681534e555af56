//! Skip pruning of the `previous` chain.
//!
//! After every step the chain is thinned so that the retained snapshots grow
//! sparser the further back they are: `window` snapshots one generation
//! apart, then `window` snapshots two generations apart, then four, and so
//! on. The chain length is therefore logarithmic in the generation count.

use tracing::trace;
use crate::universe::Universe;

/// Generations worth keeping a snapshot for, newest first, ending with 0.
pub(crate) struct KeyFrames {
  next: Option<u64>,
  stride: u64,
  window: usize,
  left: usize,
}

impl KeyFrames {
  pub(crate) fn new(generation: u64, window: usize) -> Self {
    let window = window.max(1);
    Self {
      next: Some(generation),
      stride: 1,
      window,
      left: window,
    }
  }
}

impl Iterator for KeyFrames {
  type Item = u64;

  fn next(&mut self) -> Option<u64> {
    let count = self.next?;
    self.next = if count == 0 {
      None
    } else {
      let mut next = count.saturating_sub(self.stride);
      self.left -= 1;
      if self.left == 0 {
        self.left = self.window;
        self.stride = self.stride.saturating_mul(2);
        next -= next % self.stride;
      }
      Some(next)
    };
    Some(count)
  }
}

/// Thins the chain behind `latest`. For every key frame only the oldest
/// snapshot not older than it survives. The direct predecessor of `latest`
/// and the root of the timeline are never dropped.
pub(crate) fn prune(latest: &Universe, window: usize) {
  let mut cursor = match latest.previous() {
    Some(previous) => previous,
    None => return,
  };

  let mut dropped = 0;
  for frame in KeyFrames::new(cursor.generation(), window) {
    loop {
      let previous = match cursor.previous() {
        Some(previous) => previous,
        None => break,
      };
      match previous.previous() {
        Some(skip) if skip.generation() >= frame => {
          *cursor.frame().previous.borrow_mut() = Some(skip);
          dropped += 1;
        }
        _ => {
          if previous.generation() >= frame {
            cursor = previous;
          }
          break;
        }
      }
    }
  }

  if dropped > 0 {
    trace!(generation = latest.generation(), dropped, "pruned history");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::Engine;
  use crate::config::EngineConfig;
  use itertools::Itertools;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_key_frames() {
    assert_eq!(
      KeyFrames::new(20, 2).collect_vec(),
      vec![20, 19, 18, 16, 12, 8, 0],
    );
    assert_eq!(KeyFrames::new(0, 4).collect_vec(), vec![0]);
    assert_eq!(KeyFrames::new(3, 4).collect_vec(), vec![3, 2, 1, 0]);
  }

  fn chain_generations(u: &Universe) -> Vec<u64> {
    let mut gens = vec![u.generation()];
    let mut cursor = u.previous();
    while let Some(p) = cursor {
      gens.push(p.generation());
      cursor = p.previous();
    }
    gens
  }

  fn glider(engine: &mut Engine) -> Universe {
    [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)].iter()
      .fold(Universe::new(engine), |u, &(x, y)| u.set(engine, x, y, true).unwrap())
  }

  #[test]
  fn test_chain_stays_short() {
    let mut engine = Engine::new();
    let mut u = glider(&mut engine);
    for _ in 0..1000 {
      u = u.run(&mut engine, 1).unwrap();
    }
    let gens = chain_generations(&u);
    assert_eq!(gens[0], 1000);
    assert_eq!(gens[1], 999);
    assert_eq!(*gens.last().unwrap(), 0);
    assert!(gens.windows(2).all(|w| w[0] > w[1]));
    assert!(u.history_len() < 80, "{:?}", gens);
  }

  #[test]
  fn test_recent_generations_are_exact() {
    let mut engine = Engine::with_config(EngineConfig::default().with_history_window(4));
    let mut u = glider(&mut engine);
    for _ in 0..100 {
      u = u.run(&mut engine, 1).unwrap();
    }
    let gens = chain_generations(&u);
    assert_eq!(&gens[..4], &[100, 99, 98, 97]);
  }
}
