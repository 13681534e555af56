//! What the engine hands to rendering collaborators: rectangular queries,
//! bounding boxes and aggregated cells.

/// A rectangle of cells, inclusive on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
  pub west: i64,
  pub north: i64,
  pub east: i64,
  pub south: i64,
}

impl Region {
  pub const ALL: Region = Region {
    west: i64::MIN,
    north: i64::MIN,
    east: i64::MAX,
    south: i64::MAX,
  };

  pub fn new(west: i64, north: i64, east: i64, south: i64) -> Self {
    Self { west, north, east, south }
  }

  pub fn contains(&self, x: i64, y: i64) -> bool {
    self.west <= x && x <= self.east && self.north <= y && y <= self.south
  }

  /// Whether the `size` x `size` square whose north-west cell is
  /// `(west, north)` overlaps this region.
  pub fn intersects(&self, west: i64, north: i64, size: u64) -> bool {
    let last = (size as i64).saturating_sub(1);
    west <= self.east && west.saturating_add(last) >= self.west &&
      north <= self.south && north.saturating_add(last) >= self.north
  }
}

impl Default for Region {
  fn default() -> Self {
    Region::ALL
  }
}

/// Returns (west, north, east, south), where east and south are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
  pub west: i64,
  pub north: i64,
  pub east: i64,
  pub south: i64,
}

impl BoundingBox {
  /// The box of an empty population; it is the identity of [`union`].
  ///
  /// [`union`]: BoundingBox::union
  pub const EMPTY: BoundingBox = BoundingBox {
    west: i64::MAX,
    north: i64::MAX,
    east: i64::MIN,
    south: i64::MIN,
  };

  pub fn cell(x: i64, y: i64) -> Self {
    Self { west: x, north: y, east: x + 1, south: y + 1 }
  }

  pub fn is_empty(&self) -> bool {
    self.east <= self.west || self.south <= self.north
  }

  pub fn width(&self) -> u64 {
    if self.is_empty() {
      0
    } else {
      (self.east - self.west) as u64
    }
  }

  pub fn height(&self) -> u64 {
    if self.is_empty() {
      0
    } else {
      (self.south - self.north) as u64
    }
  }

  pub fn union(self, other: BoundingBox) -> BoundingBox {
    BoundingBox {
      west: self.west.min(other.west),
      north: self.north.min(other.north),
      east: self.east.max(other.east),
      south: self.south.max(other.south),
    }
  }
}

/// One visited block of a cell query.
///
/// `(x, y)` is the north-west cell of a `size` x `size` block; `density` is
/// the fraction of live cells in it. Single cells have size 1 and density 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellView {
  pub x: i64,
  pub y: i64,
  pub size: u64,
  pub density: f64,
}
