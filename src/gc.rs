use tracing::debug;
use crate::engine::Engine;
use crate::universe::Universe;

impl Engine {
  /// Evicts every node that neither the canonical empty nodes nor one of
  /// `live` (including its history) can reach. Returns the number of evicted
  /// nodes.
  ///
  /// Universes not listed must not be used with this engine afterwards.
  pub fn collect(&mut self, live: &[&Universe]) -> usize {
    self.mark_tag += 1;
    let tag = self.mark_tag;

    for root in self.store.empty_nodes().to_vec() {
      self.store.mark(root, tag);
    }
    for &universe in live {
      let mut cursor = Some(universe.clone());
      while let Some(u) = cursor {
        self.store.mark(u.root(), tag);
        cursor = u.previous();
      }
    }

    let before = self.store.len();
    let evicted = self.store.sweep(tag);
    debug!(before, evicted, tag, "collected node cache");
    evicted
  }
}
