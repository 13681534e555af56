use tracing::debug;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::node::*;
use crate::rule::{compute_base_results, Rule};
use crate::store::NodeStore;

/// Owns the node store and the rule it is simulated under.
///
/// Every [`Universe`](crate::Universe) refers to nodes of exactly one engine
/// and must be used with that engine only.
pub struct Engine {
  pub(crate) store: NodeStore,
  rule: Rule,
  /// Next state of the central 2x2 square of every 4x4 square, see
  /// [`compute_base_results`].
  base_results: Box<[u8]>,
  pub(crate) config: EngineConfig,
  /// Tag of the last collection.
  pub(crate) mark_tag: u64,
}

impl Engine {
  pub fn new() -> Self {
    Self::with_config(EngineConfig::default())
  }

  pub fn with_config(config: EngineConfig) -> Self {
    Self {
      store: NodeStore::new(),
      rule: config.rule,
      base_results: compute_base_results(config.rule),
      config,
      mark_tag: 0,
    }
  }

  pub fn rule(&self) -> Rule {
    self.rule
  }

  /// Installs `rule`. Cached results computed under the previous rule are
  /// forgotten; nodes, and therefore existing universes, stay valid.
  pub fn set_rule(&mut self, rule: Rule) {
    if rule == self.rule {
      return;
    }
    debug!(from = %self.rule, to = %rule, "installing rule");
    self.rule = rule;
    self.base_results = compute_base_results(rule);
    self.store.flush_memos();
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn store(&self) -> &NodeStore {
    &self.store
  }

  pub fn store_mut(&mut self) -> &mut NodeStore {
    &mut self.store
  }

  /// Number of canonical interior nodes alive in the store.
  pub fn cache_size(&self) -> usize {
    self.store.len()
  }

  /// Advances the center half of `node` by `step` generations.
  ///
  /// `node` must be at least 4 cells wide and `step` at most a quarter of its
  /// size.
  pub fn run(&mut self, node: NodeId, step: u64) -> Result<NodeId> {
    let level = self.store.level(node);
    if level < 2 {
      return Err(Error::InvalidSize(format!(
        "cannot advance a node of size {}", self.store.size(node))));
    }
    if step > self.store.size(node) / 4 {
      return Err(Error::InvalidArgument(format!(
        "{} generations exceed a quarter of size {}", step, self.store.size(node))));
    }
    Ok(self.step_node(node, step))
  }

  pub(crate) fn step_node(&mut self, node: NodeId, step: u64) -> NodeId {
    let level = self.store.level(node);
    debug_assert!(level >= 2 && step <= 1 << (level - 2));

    if self.store.population(node) == 0 {
      return self.store.empty_node(level - 1);
    }
    if step == 0 {
      return self.store.sub_center(node);
    }
    if level == 2 {
      return self.step_base(node);
    }
    if let Some(result) = self.store.memo_get(node, step) {
      return result;
    }

    let half = 1u64 << (level - 3);
    let first = step.min(half);
    let rest = step - first;

    let key = self.store.key(node);
    let north = self.store.sub_north(node);
    let west = self.store.sub_west(node);
    let center = self.store.sub_center(node);
    let east = self.store.sub_east(node);
    let south = self.store.sub_south(node);

    let n0 = self.step_node(key.nw, first);
    let n1 = self.step_node(north, first);
    let n2 = self.step_node(key.ne, first);
    let n3 = self.step_node(west, first);
    let n4 = self.step_node(center, first);
    let n5 = self.step_node(east, first);
    let n6 = self.step_node(key.sw, first);
    let n7 = self.step_node(south, first);
    let n8 = self.step_node(key.se, first);

    let r0 = self.store.find_node(n0, n1, n3, n4);
    let r1 = self.store.find_node(n1, n2, n4, n5);
    let r2 = self.store.find_node(n3, n4, n6, n7);
    let r3 = self.store.find_node(n4, n5, n7, n8);

    let nw = self.step_node(r0, rest);
    let ne = self.step_node(r1, rest);
    let sw = self.step_node(r2, rest);
    let se = self.step_node(r3, rest);

    let result = self.store.find_node(nw, ne, sw, se);
    self.store.memo_insert(node, step, result, self.config.memo_capacity);
    result
  }

  /// One generation of a 4x4 node.
  fn step_base(&mut self, node: NodeId) -> NodeId {
    if let Some(result) = self.store.memo_get(node, 1) {
      return result;
    }

    let key = self.store.key(node);
    let mut bits = 0u16;
    for (i, &quad) in key.to_array().iter().enumerate() {
      let (qx, qy) = (i % 2 * 2, i / 2 * 2);
      for (j, &cell) in self.store.key(quad).to_array().iter().enumerate() {
        if cell == LIVE {
          bits |= 1 << ((qy + j / 2) * 4 + qx + j % 2);
        }
      }
    }

    let cells = self.base_results[bits as usize];
    let [nw, ne, sw, se] = [0, 1, 2, 3].map(|b| self.store.leaf(cells >> b & 1 != 0));
    let result = self.store.find_node(nw, ne, sw, se);
    self.store.memo_insert(node, 1, result, None);
    result
  }
}

impl Default for Engine {
  fn default() -> Self {
    Self::new()
  }
}
