use std::iter::FusedIterator;
use std::ops::Range;

/// A contiguous byte range of the source buffer covered by one leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub index: usize,
  pub start: usize,
  pub len: usize,
}

impl Block {
  pub fn range(&self) -> Range<usize> {
    self.start..self.start + self.len
  }

  pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
    &data[self.range()]
  }
}

/// Blocks of a buffer in ascending offset order.
#[derive(Debug, Clone)]
pub struct Blocks {
  size: usize,
  block_size: usize,
  next: usize,
  count: usize,
}

/// Splits `size` bytes into `ceil(size / block_size)` blocks; only the last
/// one may be shorter than `block_size`.
pub fn partition(size: usize, block_size: usize) -> Blocks {
  debug_assert!(block_size > 0);
  Blocks { size, block_size, next: 0, count: block_count(size, block_size) }
}

pub(crate) fn block_count(size: usize, block_size: usize) -> usize {
  size.div_ceil(block_size)
}

impl Iterator for Blocks {
  type Item = Block;

  fn next(&mut self) -> Option<Block> {
    if self.next >= self.count {
      return None;
    }
    let index = self.next;
    let start = index * self.block_size;
    let len = std::cmp::min(self.block_size, self.size - start);
    self.next += 1;
    Some(Block { index, start, len })
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.count - self.next;
    (remaining, Some(remaining))
  }
}

impl ExactSizeIterator for Blocks {}

impl FusedIterator for Blocks {}
