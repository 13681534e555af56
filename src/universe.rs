use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use itertools::Itertools;
use tracing::trace;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::export::{BoundingBox, CellView, Region};
use crate::history;
use crate::node::NodeId;
use crate::store::{NodeStore, MAX_LEVEL};

/// Largest step handed to the tree at once. Bigger steps are split so the
/// padded root stays within [`MAX_LEVEL`].
const MAX_STEP: u64 = 1 << 56;

/// An immutable snapshot of the plane at one generation.
///
/// Cloning is cheap and yields a handle to the same snapshot. Every operation
/// that changes the plane returns a new `Universe`; older ones stay valid for
/// as long as their nodes survive [`Engine::collect`].
#[derive(Clone)]
pub struct Universe(Rc<Frame>);

pub(crate) struct Frame {
  pub(crate) root: NodeId,
  /// Absolute coordinate of the root's center.
  pub(crate) cx: i64,
  pub(crate) cy: i64,
  pub(crate) generation: u64,
  pub(crate) population: u128,
  pub(crate) previous: RefCell<Option<Universe>>,
}

impl Universe {
  /// An empty plane at generation 0.
  pub fn new(engine: &mut Engine) -> Self {
    let root = engine.store.empty_node(3);
    Self::with_root(&engine.store, root, 0, 0, 0, None)
  }

  pub(crate) fn with_root(
    store: &NodeStore,
    root: NodeId,
    cx: i64,
    cy: i64,
    generation: u64,
    previous: Option<Universe>,
  ) -> Self {
    Universe(Rc::new(Frame {
      root,
      cx,
      cy,
      generation,
      population: store.population(root),
      previous: RefCell::new(previous),
    }))
  }

  pub(crate) fn frame(&self) -> &Frame {
    &self.0
  }

  pub fn root(&self) -> NodeId {
    self.0.root
  }

  /// Absolute coordinate of the root's center.
  pub fn center(&self) -> (i64, i64) {
    (self.0.cx, self.0.cy)
  }

  pub fn generation(&self) -> u64 {
    self.0.generation
  }

  pub fn population(&self) -> u128 {
    self.0.population
  }

  /// The snapshot this one was advanced from, if it is still retained.
  pub fn previous(&self) -> Option<Universe> {
    self.0.previous.borrow().clone()
  }

  /// Number of retained snapshots behind this one.
  pub fn history_len(&self) -> usize {
    let mut len = 0;
    let mut cursor = self.previous();
    while let Some(universe) = cursor {
      len += 1;
      cursor = universe.previous();
    }
    len
  }

  /// Whether both handles refer to the same snapshot.
  pub fn ptr_eq(&self, other: &Universe) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  fn local(&self, x: i64, y: i64) -> Option<(i64, i64)> {
    Some((x.checked_sub(self.0.cx)?, y.checked_sub(self.0.cy)?))
  }

  pub fn get(&self, engine: &Engine, x: i64, y: i64) -> bool {
    match self.local(x, y) {
      Some((x, y)) => engine.store.get(self.0.root, x, y),
      None => false,
    }
  }

  /// Returns a universe with one cell changed. The result starts a new
  /// timeline: its generation is 0 and it has no history.
  pub fn set(&self, engine: &mut Engine, x: i64, y: i64, alive: bool) -> Result<Universe> {
    let limit = 1i64 << (MAX_LEVEL - 1);
    let (lx, ly) = match self.local(x, y) {
      Some((lx, ly)) if (-limit..limit).contains(&lx) && (-limit..limit).contains(&ly) => (lx, ly),
      _ => return Err(Error::InvalidArgument(format!(
        "({}, {}) is too far from the pattern", x, y))),
    };
    let root = engine.store.expand_to_contain(self.0.root, lx, ly);
    let root = engine.store.set_rec(root, lx, ly, alive);
    Ok(Self::with_root(&engine.store, root, self.0.cx, self.0.cy, 0, None))
  }

  /// Advances the plane by `step` generations.
  ///
  /// An empty plane, or a step of 0, returns this very snapshot.
  ///
  /// # Errors
  ///
  /// Fails when the pattern cannot be padded within [`MAX_LEVEL`] or the
  /// `i64` coordinate range, or when the generation counter overflows.
  pub fn run(&self, engine: &mut Engine, step: u64) -> Result<Universe> {
    if step == 0 || self.0.population == 0 {
      return Ok(self.clone());
    }
    let generation = self.0.generation.checked_add(step).ok_or_else(|| Error::InvalidArgument(
      format!("generation {} cannot advance by {}", self.0.generation, step)))?;

    let (mut root, mut cx, mut cy) = engine.store.shrink(self.0.root, self.0.cx, self.0.cy);
    let mut remaining = step;
    while remaining > 0 {
      let chunk = remaining.min(MAX_STEP);
      let expanded = engine.store.expand(root, chunk)?;
      let half = (engine.store.size(expanded) / 2) as i64;
      let fits = |c: i64| c.checked_sub(half).is_some() && c.checked_add(half).is_some();
      if !fits(cx) || !fits(cy) {
        return Err(Error::InvalidSize(format!(
          "pattern around ({}, {}) leaves the coordinate range", cx, cy)));
      }
      let result = engine.step_node(expanded, chunk);
      let shrunk = engine.store.shrink(result, cx, cy);
      root = shrunk.0;
      cx = shrunk.1;
      cy = shrunk.2;
      remaining -= chunk;
    }

    let next = Self::with_root(&engine.store, root, cx, cy, generation, Some(self.clone()));
    trace!(generation, step, population = next.0.population, "advanced");
    history::prune(&next, engine.config.history_window);
    Ok(next)
  }

  /// Goes back `step` generations by returning to the newest retained
  /// snapshot at or before the target and advancing from there.
  pub fn run_back(&self, engine: &mut Engine, step: u64) -> Result<Universe> {
    if step > self.0.generation {
      return Err(Error::InvalidArgument(format!(
        "cannot go back {} generations from generation {}", step, self.0.generation)));
    }
    let target = self.0.generation - step;

    let mut cursor = self.clone();
    while cursor.generation() > target {
      match cursor.previous() {
        Some(previous) => cursor = previous,
        None => break,
      }
    }
    if cursor.generation() > target {
      return Err(Error::InvalidArgument(format!(
        "generation {} is not retained", target)));
    }
    cursor.run(engine, target - cursor.generation())
  }

  /// Visits every live cell.
  pub fn each<F>(&self, engine: &Engine, mut visit: F)
  where
    F: FnMut(CellView)
  {
    self.query(engine, &Region::ALL, 1, &mut visit);
  }

  /// Visits the populated blocks intersecting `region`; blocks no larger
  /// than `min_cell_size` are reported whole.
  pub fn query<F>(&self, engine: &Engine, region: &Region, min_cell_size: u64, visit: &mut F)
  where
    F: FnMut(CellView)
  {
    engine.store.each(self.0.root, self.0.cx, self.0.cy, region, min_cell_size, visit);
  }

  /// Coordinates of all live cells, sorted by row then column.
  pub fn cells(&self, engine: &Engine) -> Vec<(i64, i64)> {
    let mut cells = vec![];
    self.each(engine, |cell| cells.push((cell.x, cell.y)));
    cells.into_iter().sorted_by_key(|&(x, y)| (y, x)).collect_vec()
  }

  pub fn bounding_box(&self, engine: &Engine) -> BoundingBox {
    engine.store.bounding_box(self.0.root, self.0.cx, self.0.cy)
  }

  /// Offsets of the live cells among the eight neighbors of `(x, y)`.
  pub fn moore(&self, engine: &Engine, x: i64, y: i64) -> Vec<(i64, i64)> {
    (-1..=1).cartesian_product(-1..=1)
      .map(|(dy, dx)| (dx, dy))
      .filter(|&(dx, dy)| (dx, dy) != (0, 0))
      .filter(|&(dx, dy)| {
        match (x.checked_add(dx), y.checked_add(dy)) {
          (Some(nx), Some(ny)) => self.get(engine, nx, ny),
          _ => false,
        }
      })
      .collect_vec()
  }

  /// Renders the root as rows of `.` and `*`.
  pub fn dump(&self, engine: &Engine) -> String {
    engine.store.dump(self.0.root)
  }
}

impl fmt::Debug for Universe {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Universe")
      .field("root", &self.0.root)
      .field("center", &(self.0.cx, self.0.cy))
      .field("generation", &self.0.generation)
      .field("population", &self.0.population)
      .finish()
  }
}
