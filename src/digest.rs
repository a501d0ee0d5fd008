//! Content-hash primitives consumed by the tree.

use std::fmt::Debug;

use blake3::Hash;

use crate::{Error, Result};

/// A deterministic content hash with an order-sensitive combiner.
///
/// `combine(a, b)` must differ from `combine(b, a)` for distinct digests so
/// that swapping two sibling blocks changes the root.
pub trait ContentHasher {
  type Digest: Copy + Eq + Debug;

  /// Digest of one raw block.
  fn leaf(&self, data: &[u8]) -> Self::Digest;

  /// Digest of a parent node from its left and right children.
  fn combine(&self, left: &Self::Digest, right: &Self::Digest) -> Self::Digest;

  fn to_hex(digest: &Self::Digest) -> String;

  fn from_hex(hex: &str) -> Result<Self::Digest>;
}

/// BLAKE3 with `combine = BLAKE3(left || right)`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blake3;

impl ContentHasher for Blake3 {
  type Digest = Hash;

  fn leaf(&self, data: &[u8]) -> Hash {
    blake3::hash(data)
  }

  fn combine(&self, left: &Hash, right: &Hash) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hasher.finalize()
  }

  fn to_hex(digest: &Hash) -> String {
    digest.to_hex().to_string()
  }

  fn from_hex(hex: &str) -> Result<Hash> {
    Hash::from_hex(hex).map_err(|e| Error::InvalidDigest(format!("{hex}: {e}")))
  }
}

/// 64-bit FNV-1a. The combiner hashes the little-endian bytes of both children.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fnv64;

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

impl Fnv64 {
  fn update(mut h: u64, data: &[u8]) -> u64 {
    for byte in data {
      h ^= *byte as u64;
      h = h.wrapping_mul(FNV_PRIME);
    }
    h
  }
}

impl ContentHasher for Fnv64 {
  type Digest = u64;

  fn leaf(&self, data: &[u8]) -> u64 {
    Self::update(FNV_OFFSET_BASIS, data)
  }

  fn combine(&self, left: &u64, right: &u64) -> u64 {
    let h = Self::update(FNV_OFFSET_BASIS, &left.to_le_bytes());
    Self::update(h, &right.to_le_bytes())
  }

  fn to_hex(digest: &u64) -> String {
    format!("{digest:016x}")
  }

  fn from_hex(hex: &str) -> Result<u64> {
    if hex.len() != 16 {
      return Err(Error::InvalidDigest(format!("{hex}: expected 16 hex digits")));
    }
    u64::from_str_radix(hex, 16).map_err(|e| Error::InvalidDigest(format!("{hex}: {e}")))
  }
}
