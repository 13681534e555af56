//! Structural quadtree operations. Coordinates are relative to a node's
//! center: a node of size `s` covers `-s/2 <= x, y < s/2`.

use itertools::Itertools;
use crate::error::{Error, Result};
use crate::export::{BoundingBox, CellView, Region};
use crate::node::*;
use crate::store::{NodeStore, MAX_LEVEL};

/// Centers of the four children of a node of `level` centered at `(cx, cy)`,
/// in the order NW, NE, SW, SE. Leaves are positioned at their own cell.
fn child_centers(level: u8, cx: i64, cy: i64) -> [(i64, i64); 4] {
  if level == 1 {
    [(cx - 1, cy - 1), (cx, cy - 1), (cx - 1, cy), (cx, cy)]
  } else {
    let r = 1i64 << (level - 2);
    [(cx - r, cy - r), (cx + r, cy - r), (cx - r, cy + r), (cx + r, cy + r)]
  }
}

fn quadrant(key: NodeKey, west: bool, north: bool) -> NodeId {
  match (west, north) {
    (true, true) => key.nw,
    (false, true) => key.ne,
    (true, false) => key.sw,
    (false, false) => key.se,
  }
}

impl NodeStore {
  fn in_bounds(&self, node: NodeId, x: i64, y: i64) -> bool {
    let level = self.level(node);
    if level == 0 {
      return x == 0 && y == 0;
    }
    let radius = 1i64 << (level - 1);
    x >= -radius && x < radius && y >= -radius && y < radius
  }

  /// Reads one cell. Cells outside the node read as dead.
  pub fn get(&self, node: NodeId, x: i64, y: i64) -> bool {
    if !self.in_bounds(node, x, y) {
      return false;
    }

    let (mut node, mut x, mut y) = (node, x, y);
    loop {
      match self.node(node) {
        Node::Leaf { alive } => return *alive,
        Node::Interior(InteriorNode { key, level, .. }) => {
          let (west, north) = (x < 0, y < 0);
          node = quadrant(*key, west, north);
          if *level > 1 {
            let r = 1i64 << (level - 2);
            x += if west { r } else { -r };
            y += if north { r } else { -r };
          }
        }
      }
    }
  }

  /// Returns a copy of `node` with one cell changed. Untouched subtrees are
  /// shared with `node`.
  pub fn set(&mut self, node: NodeId, x: i64, y: i64, alive: bool) -> Result<NodeId> {
    if !self.in_bounds(node, x, y) {
      return Err(Error::InvalidArgument(format!(
        "({}, {}) lies outside a node of size {}", x, y, self.size(node))));
    }
    Ok(self.set_rec(node, x, y, alive))
  }

  pub(crate) fn set_rec(&mut self, node: NodeId, x: i64, y: i64, alive: bool) -> NodeId {
    let (key, level) = match self.node(node) {
      Node::Leaf { .. } => return self.leaf(alive),
      Node::Interior(InteriorNode { key, level, .. }) => (*key, *level),
    };

    let r = if level > 1 { 1i64 << (level - 2) } else { 0 };
    let mut new_key = key;
    if y < 0 {
      if x < 0 {
        new_key.nw = self.set_rec(key.nw, x + r, y + r, alive);
      } else {
        new_key.ne = self.set_rec(key.ne, x - r, y + r, alive);
      }
    } else {
      if x < 0 {
        new_key.sw = self.set_rec(key.sw, x + r, y - r, alive);
      } else {
        new_key.se = self.set_rec(key.se, x - r, y - r, alive);
      }
    }

    self.find_node(new_key.nw, new_key.ne, new_key.sw, new_key.se)
  }

  /// The half-size node sharing this node's center.
  ///
  /// This and the other `sub_*` windows need a node of size 4 or more.
  pub(crate) fn sub_center(&mut self, node: NodeId) -> NodeId {
    let key = self.key(node);
    let (nw, ne) = (self.key(key.nw), self.key(key.ne));
    let (sw, se) = (self.key(key.sw), self.key(key.se));
    self.find_node(nw.se, ne.sw, sw.ne, se.nw)
  }

  pub(crate) fn sub_north(&mut self, node: NodeId) -> NodeId {
    let key = self.key(node);
    let (nw, ne) = (self.key(key.nw), self.key(key.ne));
    self.find_node(nw.ne, ne.nw, nw.se, ne.sw)
  }

  pub(crate) fn sub_south(&mut self, node: NodeId) -> NodeId {
    let key = self.key(node);
    let (sw, se) = (self.key(key.sw), self.key(key.se));
    self.find_node(sw.ne, se.nw, sw.se, se.sw)
  }

  pub(crate) fn sub_west(&mut self, node: NodeId) -> NodeId {
    let key = self.key(node);
    let (nw, sw) = (self.key(key.nw), self.key(key.sw));
    self.find_node(nw.sw, nw.se, sw.nw, sw.ne)
  }

  pub(crate) fn sub_east(&mut self, node: NodeId) -> NodeId {
    let key = self.key(node);
    let (ne, se) = (self.key(key.ne), self.key(key.se));
    self.find_node(ne.sw, ne.se, se.nw, se.ne)
  }

  /// Surrounds `node` with an empty border, doubling its size around the
  /// same center.
  pub(crate) fn wrap(&mut self, node: NodeId) -> NodeId {
    let level = self.level(node);
    assert!(level >= 1, "a single cell has no center to grow around");
    assert!(level < MAX_LEVEL, "node too large to expand");
    let key = self.key(node);
    let empty = self.empty_node(level - 1);
    let nw = self.find_node(empty, empty, empty, key.nw);
    let ne = self.find_node(empty, empty, key.ne, empty);
    let sw = self.find_node(empty, key.sw, empty, empty);
    let se = self.find_node(key.se, empty, empty, empty);
    self.find_node(nw, ne, sw, se)
  }

  /// Whether every live cell lies within the central quarter of `node`, so
  /// that nothing reaches the border within `size / 8` generations.
  fn is_padded(&self, node: NodeId, min_step: u64) -> bool {
    let level = self.level(node);
    if level < 3 || min_step > 1 << (level - 3) {
      return false;
    }
    let key = self.key(node);
    let inner = |quad: NodeId, pick: fn(NodeKey) -> NodeId| {
      pick(self.key(pick(self.key(quad))))
    };
    self.population(key.nw) == self.population(inner(key.nw, |k| k.se)) &&
      self.population(key.ne) == self.population(inner(key.ne, |k| k.sw)) &&
      self.population(key.sw) == self.population(inner(key.sw, |k| k.ne)) &&
      self.population(key.se) == self.population(inner(key.se, |k| k.nw))
  }

  /// Grows `node` around its center until it is at least 8 cells wide and
  /// advancing it by `min_step` generations cannot lose any live cell.
  ///
  /// Fails when that would take a single cell, or a node of more than
  /// [`MAX_LEVEL`] levels.
  pub fn expand(&mut self, node: NodeId, min_step: u64) -> Result<NodeId> {
    let mut node = node;
    while !self.is_padded(node, min_step) {
      let level = self.level(node);
      if level == 0 || level >= MAX_LEVEL {
        return Err(Error::InvalidSize(format!(
          "a node of level {} cannot be padded for {} generations", level, min_step)));
      }
      node = self.wrap(node);
    }
    Ok(node)
  }

  /// Grows `node` around its center until `(x, y)` lies inside it.
  pub(crate) fn expand_to_contain(&mut self, node: NodeId, x: i64, y: i64) -> NodeId {
    let mut node = node;
    while !self.in_bounds(node, x, y) {
      node = self.wrap(node);
    }
    node
  }

  /// Descends into the smallest quadrant or half-size window holding the
  /// whole population. Returns the node and its center.
  pub fn shrink(&mut self, node: NodeId, cx: i64, cy: i64) -> (NodeId, i64, i64) {
    let (mut node, mut cx, mut cy) = (node, cx, cy);
    'outer: loop {
      let level = self.level(node);
      let pop = self.population(node);
      if pop == 0 {
        return (self.empty_node(level.min(3)), cx, cy);
      }
      if level <= 3 {
        return (node, cx, cy);
      }

      let r = 1i64 << (level - 2);
      let key = self.key(node);
      let quadrants = [(key.nw, -r, -r), (key.ne, r, -r), (key.sw, -r, r), (key.se, r, r)];
      if let Some(&(sub, dx, dy)) = quadrants.iter().find(|q| self.population(q.0) == pop) {
        node = sub;
        cx += dx;
        cy += dy;
        continue;
      }

      let windows: [(fn(&mut Self, NodeId) -> NodeId, i64, i64); 5] = [
        (Self::sub_center, 0, 0),
        (Self::sub_west, -r, 0),
        (Self::sub_east, r, 0),
        (Self::sub_north, 0, -r),
        (Self::sub_south, 0, r),
      ];
      for &(window, dx, dy) in windows.iter() {
        let sub = window(self, node);
        if self.population(sub) == pop {
          node = sub;
          cx += dx;
          cy += dy;
          continue 'outer;
        }
      }

      return (node, cx, cy);
    }
  }

  /// Visits every populated block of `node` (centered at `(cx, cy)`) that
  /// intersects `region`. Blocks no larger than `min_cell_size` are reported
  /// whole instead of cell by cell.
  pub fn each<F>(
    &self,
    node: NodeId,
    cx: i64,
    cy: i64,
    region: &Region,
    min_cell_size: u64,
    visit: &mut F,
  )
  where
    F: FnMut(CellView)
  {
    let pop = self.population(node);
    if pop == 0 {
      return;
    }

    let level = self.level(node);
    let size = 1u64 << level;
    let half = (size / 2) as i64;
    let (west, north) = (cx - half, cy - half);
    if !region.intersects(west, north, size) {
      return;
    }

    if size <= min_cell_size.max(1) {
      let area = (size as f64) * (size as f64);
      visit(CellView { x: west, y: north, size, density: pop as f64 / area });
      return;
    }

    let key = self.key(node);
    for (&child, &(x, y)) in key.to_array().iter().zip(child_centers(level, cx, cy).iter()) {
      self.each(child, x, y, region, min_cell_size, visit);
    }
  }

  /// Returns the box of live cells of `node` centered at `(cx, cy)`, or
  /// [`BoundingBox::EMPTY`].
  pub fn bounding_box(&self, node: NodeId, cx: i64, cy: i64) -> BoundingBox {
    match self.node(node) {
      Node::Leaf { alive: true } => BoundingBox::cell(cx, cy),
      Node::Leaf { alive: false } => BoundingBox::EMPTY,
      Node::Interior(InteriorNode { population: 0, .. }) => BoundingBox::EMPTY,
      Node::Interior(InteriorNode { key, level, .. }) => {
        key.to_array().iter()
          .zip(child_centers(*level, cx, cy).iter())
          .map(|(&child, &(x, y))| self.bounding_box(child, x, y))
          .fold(BoundingBox::EMPTY, BoundingBox::union)
      }
    }
  }

  /// Renders `node` as rows of `.` (dead) and `*` (alive).
  pub fn dump(&self, node: NodeId) -> String {
    self.dump_rows(node).join("\n")
  }

  fn dump_rows(&self, node: NodeId) -> Vec<String> {
    match self.node(node) {
      Node::Leaf { alive } => vec![if *alive { "*" } else { "." }.to_owned()],
      Node::Interior(InteriorNode { key, .. }) => {
        let nw = self.dump_rows(key.nw);
        let ne = self.dump_rows(key.ne);
        let sw = self.dump_rows(key.sw);
        let se = self.dump_rows(key.se);
        nw.into_iter().zip(ne)
          .chain(sw.into_iter().zip(se))
          .map(|(a, b)| a + &b)
          .collect_vec()
      }
    }
  }
}
