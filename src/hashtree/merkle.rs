use std::fmt;

use tracing::{debug, trace};

use crate::hashtree::HashTree;
use crate::hashtree::config::{OddNodePolicy, TreeConfig};
use crate::hashtree::partition::partition;
use crate::hashtree::proof::{Proof, ProofStep};
use crate::{Blake3, ContentHasher, Error, Result};

/// Outcome of comparing two trees block by block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
  /// Root digests are equal.
  Identical,
  /// Byte offset of the first block whose digest differs.
  Offset(usize),
  /// The trees differ in block count, block size or odd node policy, so
  /// their levels cannot be walked side by side.
  Incomparable,
}

impl Divergence {
  pub fn offset(&self) -> Option<usize> {
    if let Divergence::Offset(offset) = self { Some(*offset) } else { None }
  }
}

/// Hash tree over a borrowed byte buffer.
///
/// `levels[0]` holds one digest per block and every following level pairs
/// the previous one left to right, so node `i` of level `L + 1` has the
/// children `2i` and `2i + 1` (when present) in level `L`. The last level
/// holds the root alone.
///
/// The tree never copies the buffer. Pass `&mut [u8]` to modify the bytes
/// through [`MerkleTree::buffer_mut`] and resynchronize with
/// [`MerkleTree::rehash`].
#[derive(Clone)]
pub struct MerkleTree<B, H: ContentHasher = Blake3> {
  buffer: B,
  size: usize,
  config: TreeConfig,
  hasher: H,
  levels: Vec<Vec<H::Digest>>,
}

impl<B: AsRef<[u8]>> MerkleTree<B> {
  /// Build a BLAKE3 tree with the default block size.
  pub fn new(buffer: B) -> Result<Self> {
    Self::with_hasher(buffer, TreeConfig::default(), Blake3)
  }

  pub fn with_config(buffer: B, config: TreeConfig) -> Result<Self> {
    Self::with_hasher(buffer, config, Blake3)
  }
}

impl<B: AsRef<[u8]>, H: ContentHasher> MerkleTree<B, H> {
  /// Build a tree over `buffer`. An empty buffer has no tree.
  pub fn with_hasher(buffer: B, config: TreeConfig, hasher: H) -> Result<Self> {
    config.validate()?;
    let data = buffer.as_ref();
    let size = data.len();
    if size == 0 {
      return Err(Error::EmptyBuffer);
    }
    let levels = build_levels(&hasher, data, &config);
    debug!(size, blocks = levels[0].len(), height = levels.len(), "hash tree built");
    Ok(MerkleTree { buffer, size, config, hasher, levels })
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn block_size(&self) -> usize {
    self.config.block_size
  }

  pub fn block_count(&self) -> usize {
    self.levels[0].len()
  }

  /// Number of levels including the leaves and the root.
  pub fn height(&self) -> usize {
    self.levels.len()
  }

  pub fn config(&self) -> &TreeConfig {
    &self.config
  }

  pub fn hasher(&self) -> &H {
    &self.hasher
  }

  pub fn root_hash(&self) -> H::Digest {
    self.levels[self.levels.len() - 1][0]
  }

  pub fn leaf_hash(&self, index: usize) -> Option<H::Digest> {
    self.levels[0].get(index).copied()
  }

  /// Digests of one level, `0` being the leaves.
  pub fn level(&self, level: usize) -> Option<&[H::Digest]> {
    self.levels.get(level).map(Vec::as_slice)
  }

  pub fn buffer(&self) -> &[u8] {
    self.buffer.as_ref()
  }

  /// Bytes of the block at `index` in the buffer's current state.
  pub fn block(&self, index: usize) -> Option<&[u8]> {
    if index >= self.block_count() {
      return None;
    }
    let start = index * self.config.block_size;
    let end = std::cmp::min(start + self.config.block_size, self.size);
    Some(&self.buffer.as_ref()[start..end])
  }

  /// Release the tree and hand the buffer back.
  pub fn into_inner(self) -> B {
    self.buffer
  }

  /// Rebuild the tree over `data` and compare roots. A buffer of a different
  /// length never matches.
  pub fn verify(&self, data: &[u8]) -> bool {
    if data.len() != self.size {
      debug!(expected = self.size, actual = data.len(), "verify: size mismatch");
      return false;
    }
    let levels = build_levels(&self.hasher, data, &self.config);
    levels[levels.len() - 1][0] == self.root_hash()
  }

  /// Recompute every digest from the referenced buffer and replace the stored
  /// levels.
  ///
  /// # Panics
  ///
  /// If the buffer became shorter than the size recorded at build time.
  pub fn rehash(&mut self) {
    let data = &self.buffer.as_ref()[..self.size];
    let levels = build_levels(&self.hasher, data, &self.config);
    self.levels = levels;
    debug!(size = self.size, blocks = self.block_count(), "hash tree rehashed");
  }

  /// Locate the first block at which `self` and `other` differ by walking
  /// both trees from the root, always descending into the leftmost child
  /// whose digest differs.
  pub fn first_diff<C: AsRef<[u8]>>(&self, other: &MerkleTree<C, H>) -> Divergence {
    if self.root_hash() == other.root_hash() {
      return Divergence::Identical;
    }
    if !self.is_comparable(other) {
      return Divergence::Incomparable;
    }
    let mut index = 0;
    for level in (0..self.height() - 1).rev() {
      let (a, b) = (&self.levels[level], &other.levels[level]);
      let left = 2 * index;
      let right = left + 1;
      index = if right < a.len() && a[left] == b[left] { right } else { left };
      trace!(level, index, "first_diff: descend");
    }
    Divergence::Offset(index * self.config.block_size)
  }

  /// Indices of every block whose digest differs, in ascending order.
  /// Subtrees with equal digests are skipped. `None` if the trees are not
  /// comparable.
  pub fn diff_blocks<C: AsRef<[u8]>>(&self, other: &MerkleTree<C, H>) -> Option<Vec<usize>> {
    if self.root_hash() == other.root_hash() {
      return Some(Vec::new());
    }
    if !self.is_comparable(other) {
      return None;
    }
    let mut frontier = vec![0usize];
    for level in (0..self.height() - 1).rev() {
      let (a, b) = (&self.levels[level], &other.levels[level]);
      frontier =
        frontier.into_iter().flat_map(|i| [2 * i, 2 * i + 1]).filter(|&c| c < a.len() && a[c] != b[c]).collect();
      trace!(level, differing = frontier.len(), "diff_blocks: descend");
    }
    Some(frontier)
  }

  /// Audit path from the block at `index` to the root.
  pub fn proof(&self, index: usize) -> Result<Proof<H::Digest>> {
    let count = self.block_count();
    if index >= count {
      return Err(Error::BlockOutOfRange { index, count });
    }
    let mut steps = Vec::with_capacity(self.height() - 1);
    let mut i = index;
    for level in &self.levels[..self.levels.len() - 1] {
      let sibling = i ^ 1;
      if sibling < level.len() {
        steps.push(if i % 2 == 0 { ProofStep::Right(level[sibling]) } else { ProofStep::Left(level[sibling]) });
      } else if self.config.odd_policy == OddNodePolicy::Duplicate {
        steps.push(ProofStep::Right(level[i]));
      }
      i /= 2;
    }
    Ok(Proof { block: index, steps })
  }

  fn is_comparable<C: AsRef<[u8]>>(&self, other: &MerkleTree<C, H>) -> bool {
    self.config == other.config && self.block_count() == other.block_count()
  }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, H: ContentHasher> MerkleTree<B, H> {
  /// Mutable view of the referenced bytes. The length is fixed; call
  /// [`MerkleTree::rehash`] after writing.
  pub fn buffer_mut(&mut self) -> &mut [u8] {
    &mut self.buffer.as_mut()[..self.size]
  }
}

impl<B: AsRef<[u8]>, H: ContentHasher> HashTree for MerkleTree<B, H> {
  type Digest = H::Digest;

  fn size(&self) -> usize {
    self.size
  }

  fn block_count(&self) -> usize {
    self.levels[0].len()
  }

  fn root_hash(&self) -> H::Digest {
    MerkleTree::root_hash(self)
  }

  fn get(&self, index: usize) -> Option<&[u8]> {
    self.block(index)
  }

  fn verify(&self, data: &[u8]) -> bool {
    MerkleTree::verify(self, data)
  }

  fn generate_proof(&self, index: usize) -> Result<Proof<H::Digest>> {
    self.proof(index)
  }
}

impl<B, H: ContentHasher> fmt::Debug for MerkleTree<B, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MerkleTree")
      .field("size", &self.size)
      .field("config", &self.config)
      .field("blocks", &self.levels[0].len())
      .field("root", &self.levels[self.levels.len() - 1][0])
      .finish()
  }
}

fn build_levels<H: ContentHasher>(hasher: &H, data: &[u8], config: &TreeConfig) -> Vec<Vec<H::Digest>> {
  let leaves: Vec<H::Digest> =
    partition(data.len(), config.block_size).map(|block| hasher.leaf(block.slice(data))).collect();
  let mut levels = vec![leaves];
  while levels[levels.len() - 1].len() > 1 {
    let next = levels[levels.len() - 1]
      .chunks(2)
      .map(|pair| match pair {
        [left, right] => hasher.combine(left, right),
        _ => match config.odd_policy {
          OddNodePolicy::Promote => pair[0],
          OddNodePolicy::Duplicate => hasher.combine(&pair[0], &pair[0]),
        },
      })
      .collect();
    levels.push(next);
  }
  levels
}
