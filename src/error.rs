pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("cannot build a hash tree over an empty buffer")]
  EmptyBuffer,

  #[error("block size must be greater than zero")]
  InvalidBlockSize,

  #[error("block {index} is out of range for a tree of {count} blocks")]
  BlockOutOfRange { index: usize, count: usize },

  #[error("invalid digest: {0}")]
  InvalidDigest(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
