use thiserror::Error;

/// Longest slice of unparsed input carried by a [`Error::Format`].
pub(crate) const REMAINDER_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A node was requested with a size that is not a power of two, or with
  /// children of different sizes.
  #[error("invalid node size: {0}")]
  InvalidSize(String),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// Malformed pattern text or rule string. `position` is a byte offset into
  /// the input, `remainder` the first few characters that could not be read.
  #[error("unrecognized input at byte {position}: {remainder:?}")]
  Format {
    position: usize,
    remainder: String,
  },

  /// A well-formed rule string that this engine cannot simulate.
  #[error("unsupported rule: {0}")]
  Rule(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub(crate) fn format(src: &str, position: usize) -> Self {
    Error::Format {
      position,
      remainder: src[position..].chars().take(REMAINDER_LEN).collect(),
    }
  }
}
