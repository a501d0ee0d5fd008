use crate::{Error, Result};

/// Default number of bytes per leaf block.
pub const BLOCK_SIZE: usize = 1024;

/// How a level with an odd number of digests lifts its trailing digest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OddNodePolicy {
  /// The unpaired digest becomes a node of the next level unchanged.
  #[default]
  Promote,
  /// The unpaired digest is combined with itself.
  Duplicate,
}

/// Shape parameters of a tree. Two trees are only structurally comparable
/// when their configurations are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeConfig {
  pub block_size: usize,
  pub odd_policy: OddNodePolicy,
}

impl Default for TreeConfig {
  fn default() -> Self {
    Self { block_size: BLOCK_SIZE, odd_policy: OddNodePolicy::default() }
  }
}

impl TreeConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_block_size(mut self, block_size: usize) -> Self {
    self.block_size = block_size;
    self
  }

  pub fn with_odd_policy(mut self, odd_policy: OddNodePolicy) -> Self {
    self.odd_policy = odd_policy;
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.block_size == 0 { Err(Error::InvalidBlockSize) } else { Ok(()) }
  }
}
