use crate::ContentHasher;

/// One sibling on the path from a leaf to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofStep<D> {
  /// The sibling sits to the left: `parent = combine(sibling, current)`.
  Left(D),
  /// The sibling sits to the right: `parent = combine(current, sibling)`.
  Right(D),
}

/// Audit path of a single block.
///
/// Levels where the node was promoted unchanged contribute no step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof<D> {
  pub block: usize,
  pub steps: Vec<ProofStep<D>>,
}

impl<D: Copy + Eq> Proof<D> {
  /// Recompute the root implied by `data` being the content of `self.block`.
  pub fn root<H>(&self, hasher: &H, data: &[u8]) -> D
  where
    H: ContentHasher<Digest = D>,
  {
    self.steps.iter().fold(hasher.leaf(data), |current, step| match step {
      ProofStep::Left(sibling) => hasher.combine(sibling, &current),
      ProofStep::Right(sibling) => hasher.combine(&current, sibling),
    })
  }

  pub fn verify<H>(&self, hasher: &H, data: &[u8], root: &D) -> bool
  where
    H: ContentHasher<Digest = D>,
  {
    self.root(hasher, data) == *root
  }
}
