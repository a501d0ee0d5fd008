//! Content-addressed hash tree over a fixed-size-blocked byte buffer.
//!
//! A [`MerkleTree`] borrows the caller's bytes, splits them into blocks of
//! [`TreeConfig::block_size`] bytes and folds the per-block digests bottom-up
//! into a single root. The tree can re-check a buffer against that root,
//! rebuild itself after the borrowed bytes were modified in place, locate the
//! first block at which two trees diverge and hand out per-block audit paths.
//!
//! ```
//! use block_merkle::{Divergence, MerkleTree};
//!
//! let mut data = vec![0u8; 4096];
//! let original = MerkleTree::new(data.clone()).unwrap();
//!
//! let mut tree = MerkleTree::new(&mut data[..]).unwrap();
//! tree.buffer_mut()[2048] = 0xFF;
//! tree.rehash();
//!
//! assert_eq!(Divergence::Offset(2048), original.first_diff(&tree));
//! ```

pub mod digest;
pub mod error;
pub mod hashtree;

pub use digest::{Blake3, ContentHasher, Fnv64};
pub use error::{Error, Result};
pub use hashtree::config::{BLOCK_SIZE, OddNodePolicy, TreeConfig};
pub use hashtree::merkle::{Divergence, MerkleTree};
pub use hashtree::partition::{Block, Blocks, partition};
pub use hashtree::proof::{Proof, ProofStep};
pub use hashtree::HashTree;

/// SplitMix64 mixer, used to produce reproducible test and benchmark payloads.
pub fn splitmix64(x: u64) -> u64 {
  let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
  z ^ (z >> 31)
}

/// Fills `buffer` with a deterministic byte stream derived from `seed`.
pub fn fill_pseudo_random(buffer: &mut [u8], seed: u64) {
  for (i, chunk) in buffer.chunks_mut(8).enumerate() {
    let bytes = splitmix64(seed.wrapping_add(i as u64)).to_le_bytes();
    chunk.copy_from_slice(&bytes[..chunk.len()]);
  }
}
