use crate::Result;
use crate::hashtree::proof::Proof;

pub mod config;
pub mod merkle;
pub mod partition;
pub mod proof;

/// Core hash tree abstraction
pub trait HashTree {
  type Digest;

  /// Byte length of the buffer the tree was built from
  fn size(&self) -> usize;

  /// Number of leaf blocks
  fn block_count(&self) -> usize;

  /// Get the root hash
  fn root_hash(&self) -> Self::Digest;

  /// Retrieve the bytes of a block by index
  fn get(&self, index: usize) -> Option<&[u8]>;

  /// Check whether `data` hashes to the same root
  fn verify(&self, data: &[u8]) -> bool;

  /// Generate proof path for given index
  fn generate_proof(&self, index: usize) -> Result<Proof<Self::Digest>>;
}
