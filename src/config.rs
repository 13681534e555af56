use crate::rule::{Rule, GAME_OF_LIFE};

/// Tunables of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
  /// Rule installed when the engine is created.
  pub rule: Rule,
  /// Most step results remembered per node; the oldest entry is evicted
  /// first. `None` keeps every result.
  pub memo_capacity: Option<usize>,
  /// Snapshots retained per stride of the history chain before the stride
  /// doubles.
  pub history_window: usize,
}

pub const DEFAULT_HISTORY_WINDOW: usize = 4;

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      rule: GAME_OF_LIFE,
      memo_capacity: None,
      history_window: DEFAULT_HISTORY_WINDOW,
    }
  }
}

impl EngineConfig {
  pub fn with_rule(mut self, rule: Rule) -> Self {
    self.rule = rule;
    self
  }

  pub fn with_memo_capacity(mut self, capacity: usize) -> Self {
    self.memo_capacity = Some(capacity.max(1));
    self
  }

  pub fn with_history_window(mut self, window: usize) -> Self {
    self.history_window = window.max(1);
    self
  }
}
