use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::node::*;

/// Deepest tree the store hands out; coordinates of a node this size still
/// fit in an `i64`.
pub const MAX_LEVEL: u8 = 62;

/// Canonicalizing factory for quadtree nodes.
///
/// Every interior node is registered under the identities of its four
/// children, so asking twice for the same children yields the same
/// [`NodeId`]. Nodes live in an arena; slots freed by a sweep are reused.
///
/// The half-size windows used while stepping are internal, since they only
/// exist for nodes of size 4 and up:
///
/// ```compile_fail
/// let mut store = hashlife::NodeStore::new();
/// let node = store.empty(2).unwrap();
/// store.sub_center(node);
/// ```
pub struct NodeStore {
  nodes: Vec<Option<Node>>,
  free: Vec<NodeId>,
  table: FxHashMap<NodeKey, NodeId>,
  /// `empty_nodes[level]` is the all-dead node of that level.
  empty_nodes: Vec<NodeId>,
}

impl NodeStore {
  pub fn new() -> Self {
    Self {
      nodes: vec![
        Some(Node::Leaf { alive: false }),
        Some(Node::Leaf { alive: true }),
      ],
      free: vec![],
      table: FxHashMap::default(),
      empty_nodes: vec![DEAD],
    }
  }

  pub fn leaf(&self, alive: bool) -> NodeId {
    if alive {
      LIVE
    } else {
      DEAD
    }
  }

  /// Returns the canonical node with the given children, which must all have
  /// the same size.
  pub fn interior(
    &mut self,
    nw: NodeId,
    ne: NodeId,
    sw: NodeId,
    se: NodeId,
  ) -> Result<NodeId> {
    let level = self.level(nw);
    if [ne, sw, se].iter().any(|&c| self.level(c) != level) {
      return Err(Error::InvalidSize(format!(
        "children sizes differ: {}, {}, {}, {}",
        self.size(nw), self.size(ne), self.size(sw), self.size(se))));
    }
    if level >= MAX_LEVEL {
      return Err(Error::InvalidSize(format!(
        "node of size 2^{} exceeds the coordinate range", level + 1)));
    }
    Ok(self.find_node(nw, ne, sw, se))
  }

  /// The all-dead node of side length `size`.
  pub fn empty(&mut self, size: u64) -> Result<NodeId> {
    if !size.is_power_of_two() {
      return Err(Error::InvalidSize(format!("{} is not a power of two", size)));
    }
    let level = size.trailing_zeros() as u8;
    if level > MAX_LEVEL {
      return Err(Error::InvalidSize(format!("{} exceeds the coordinate range", size)));
    }
    Ok(self.empty_node(level))
  }

  pub(crate) fn find_node(
    &mut self,
    nw: NodeId,
    ne: NodeId,
    sw: NodeId,
    se: NodeId,
  ) -> NodeId {
    let key = NodeKey::new(nw, ne, sw, se);
    if let Some(&id) = self.table.get(&key) {
      return id;
    }

    let level = self.level(nw) + 1;
    debug_assert!(level <= MAX_LEVEL);
    debug_assert!(key.to_array().iter().all(|&c| self.level(c) + 1 == level));
    let population = key.to_array().iter().map(|&c| self.population(c)).sum();
    let id = self.alloc(Node::Interior(InteriorNode {
      key,
      level,
      population,
      memo: Memo::for_level(level),
      mark: 0,
    }));
    self.table.insert(key, id);
    id
  }

  fn alloc(&mut self, node: Node) -> NodeId {
    match self.free.pop() {
      Some(id) => {
        self.nodes[id.0 as usize] = Some(node);
        id
      }
      None => {
        let id = u32::try_from(self.nodes.len()).expect("node store exhausted");
        self.nodes.push(Some(node));
        NodeId(id)
      }
    }
  }

  pub(crate) fn empty_node(&mut self, level: u8) -> NodeId {
    let len = self.empty_nodes.len();
    for _ in len..=level as usize {
      let prev = *self.empty_nodes.last().unwrap_or(&DEAD);
      let node = self.find_node(prev, prev, prev, prev);
      self.empty_nodes.push(node);
    }
    self.empty_nodes[level as usize]
  }

  pub(crate) fn empty_nodes(&self) -> &[NodeId] {
    &self.empty_nodes
  }

  pub(crate) fn node(&self, id: NodeId) -> &Node {
    match self.nodes.get(id.0 as usize) {
      Some(Some(node)) => node,
      _ => panic!("dangling node {:?}", id),
    }
  }

  fn node_mut(&mut self, id: NodeId) -> &mut Node {
    match self.nodes.get_mut(id.0 as usize) {
      Some(Some(node)) => node,
      _ => panic!("dangling node {:?}", id),
    }
  }

  /// Children of an interior node. Panics on leaves.
  pub(crate) fn key(&self, id: NodeId) -> NodeKey {
    self.node(id).unwrap_interior_ref().key
  }

  pub fn children(&self, id: NodeId) -> Option<NodeKey> {
    match self.node(id) {
      Node::Leaf { .. } => None,
      Node::Interior(node) => Some(node.key),
    }
  }

  pub fn is_leaf(&self, id: NodeId) -> bool {
    matches!(self.node(id), Node::Leaf { .. })
  }

  pub fn level(&self, id: NodeId) -> u8 {
    self.node(id).level()
  }

  pub fn size(&self, id: NodeId) -> u64 {
    1 << self.level(id)
  }

  pub fn population(&self, id: NodeId) -> u128 {
    self.node(id).population()
  }

  /// Number of canonical interior nodes currently cached.
  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }

  pub fn contains(&self, id: NodeId) -> bool {
    matches!(self.nodes.get(id.0 as usize), Some(Some(_)))
  }

  pub(crate) fn memo_get(&self, id: NodeId, step: u64) -> Option<NodeId> {
    match &self.node(id).unwrap_interior_ref().memo {
      Memo::Unused => None,
      Memo::Base(result) => *result,
      Memo::Steps(results) => results.get(&step).copied(),
    }
  }

  pub(crate) fn memo_insert(
    &mut self,
    id: NodeId,
    step: u64,
    result: NodeId,
    capacity: Option<usize>,
  ) {
    match &mut self.node_mut(id).unwrap_interior_mut().memo {
      Memo::Unused => {}
      Memo::Base(slot) => *slot = Some(result),
      Memo::Steps(results) => {
        if let Some(capacity) = capacity {
          while !results.is_empty() && results.len() >= capacity.max(1) {
            results.shift_remove_index(0);
          }
        }
        results.insert(step, result);
      }
    }
  }

  pub(crate) fn memo_len(&self, id: NodeId) -> usize {
    match self.node(id) {
      Node::Interior(node) => node.memo.results().count(),
      Node::Leaf { .. } => 0,
    }
  }

  /// Forgets every cached `run` result; node identities are untouched.
  pub(crate) fn flush_memos(&mut self) {
    for slot in self.nodes.iter_mut() {
      if let Some(Node::Interior(node)) = slot {
        node.memo.clear();
      }
    }
  }

  /// Tags `root` and everything reachable from it, memoized results
  /// included. Already tagged nodes are not revisited.
  pub(crate) fn mark(&mut self, root: NodeId, tag: u64) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
      if let Some(Some(Node::Interior(node))) = self.nodes.get_mut(id.0 as usize) {
        if node.mark == tag {
          continue;
        }
        node.mark = tag;
        stack.extend_from_slice(&node.key.to_array());
        stack.extend(node.memo.results());
      }
    }
  }

  /// Evicts every interior node whose tag differs from `tag`. Returns the
  /// number of evicted nodes.
  pub(crate) fn sweep(&mut self, tag: u64) -> usize {
    let mut evicted = 0;
    for (i, slot) in self.nodes.iter_mut().enumerate() {
      let stale = matches!(&*slot, Some(Node::Interior(node)) if node.mark != tag);
      if !stale {
        continue;
      }
      if let Some(Node::Interior(node)) = slot.take() {
        self.table.remove(&node.key);
      }
      self.free.push(NodeId(i as u32));
      evicted += 1;
    }
    evicted
  }
}

impl Default for NodeStore {
  fn default() -> Self {
    Self::new()
  }
}
