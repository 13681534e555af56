use std::hash::BuildHasherDefault;
use indexmap::IndexMap;
use rustc_hash::FxHasher;

/// Identity of a canonical node inside a [`NodeStore`](crate::NodeStore).
///
/// Two ids are equal exactly when the nodes are structurally equal, so id
/// comparison stands in for tree comparison everywhere.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(pub(crate) u32);

pub(crate) const DEAD: NodeId = NodeId(0);
pub(crate) const LIVE: NodeId = NodeId(1);

/// The four children of an interior node. This is the hash-consing key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeKey {
  pub nw: NodeId,
  pub ne: NodeId,
  pub sw: NodeId,
  pub se: NodeId,
}

#[derive(Debug)]
pub(crate) enum Node {
  Leaf { alive: bool },
  Interior(InteriorNode),
}

#[derive(Debug)]
pub(crate) struct InteriorNode {
  pub(crate) key: NodeKey,
  /// `2 ^ level` cells on both sides of the square.
  pub(crate) level: u8,
  pub(crate) population: u128,
  pub(crate) memo: Memo,
  /// Tag of the last collection that found this node reachable.
  pub(crate) mark: u64,
}

pub(crate) type StepMemo = IndexMap<u64, NodeId, BuildHasherDefault<FxHasher>>;

/// Cached results of advancing a node.
#[derive(Debug)]
pub(crate) enum Memo {
  /// 2x2 nodes are never advanced.
  Unused,
  /// 4x4 nodes only ever advance by one generation.
  Base(Option<NodeId>),
  /// Larger nodes, keyed by the number of generations.
  Steps(StepMemo),
}

impl NodeKey {
  pub fn new(nw: NodeId, ne: NodeId, sw: NodeId, se: NodeId) -> Self {
    Self { nw, ne, sw, se }
  }

  pub fn to_array(self) -> [NodeId; 4] {
    [self.nw, self.ne, self.sw, self.se]
  }
}

impl Node {
  pub(crate) fn level(&self) -> u8 {
    match self {
      Node::Leaf { .. } => 0,
      Node::Interior(node) => node.level,
    }
  }

  pub(crate) fn population(&self) -> u128 {
    match self {
      Node::Leaf { alive } => *alive as u128,
      Node::Interior(node) => node.population,
    }
  }

  pub(crate) fn unwrap_interior_ref(&self) -> &InteriorNode {
    match self {
      Node::Interior(node) => node,
      Node::Leaf { .. } => panic!("leaf node"),
    }
  }

  pub(crate) fn unwrap_interior_mut(&mut self) -> &mut InteriorNode {
    match self {
      Node::Interior(node) => node,
      Node::Leaf { .. } => panic!("leaf node"),
    }
  }
}

impl Memo {
  pub(crate) fn for_level(level: u8) -> Self {
    match level {
      1 => Memo::Unused,
      2 => Memo::Base(None),
      _ => Memo::Steps(StepMemo::default()),
    }
  }

  pub(crate) fn clear(&mut self) {
    match self {
      Memo::Unused => {}
      Memo::Base(result) => *result = None,
      Memo::Steps(results) => results.clear(),
    }
  }

  pub(crate) fn results(&self) -> impl Iterator<Item = NodeId> + '_ {
    let base = match self {
      Memo::Base(result) => *result,
      _ => None,
    };
    let steps = match self {
      Memo::Steps(results) => Some(results.values().copied()),
      _ => None,
    };
    base.into_iter().chain(steps.into_iter().flatten())
  }
}
