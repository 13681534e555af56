//! HashLife: simulation of Life-like cellular automata over hash-consed,
//! memoized quadtrees.
//!
//! ```
//! use hashlife::{rle, Engine};
//!
//! let mut engine = Engine::new();
//! let glider = rle::read(&mut engine, "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!").unwrap();
//! let later = glider.universe.run(&mut engine, 4).unwrap();
//! assert_eq!(later.cells(&engine), vec![(2, 1), (3, 2), (1, 3), (2, 3), (3, 3)]);
//! ```

mod config;
mod engine;
mod error;
mod export;
mod gc;
mod history;
mod node;
mod rule;
mod store;
mod tree;
mod universe;
pub mod rle;

pub use config::{EngineConfig, DEFAULT_HISTORY_WINDOW};
pub use engine::Engine;
pub use error::{Error, Result};
pub use export::{BoundingBox, CellView, Region};
pub use node::{NodeId, NodeKey};
pub use rle::{Metadata, Pattern};
pub use rule::{Rule, GAME_OF_LIFE};
pub use store::{NodeStore, MAX_LEVEL};
pub use universe::Universe;
