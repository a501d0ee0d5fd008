use std::cmp;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::time::Instant;

use block_merkle::{ContentHasher, MerkleTree, Result, TreeConfig, fill_pseudo_random};
use rand::Rng;
use tracing::debug;

use crate::stat::Report;

pub struct Bench {
  pub max_size: usize,
  pub division: usize,
  pub trials: usize,
  pub output: PathBuf,
  pub session: String,
}

impl Bench {
  pub fn sizes(&self) -> impl Iterator<Item = usize> {
    let step = cmp::max(1, self.max_size / cmp::max(1, self.division));
    (step..=self.max_size).step_by(step)
  }

  /// Time build, verify, rehash after a one-byte mutation and first_diff
  /// against the unmodified tree for each buffer size, then write one CSV per
  /// operation into the output directory.
  pub fn run<H: ContentHasher + Copy>(&self, config: TreeConfig, hasher: H) -> Result<Vec<PathBuf>> {
    create_dir_all(&self.output)?;
    let mut build = Report::new();
    let mut verify = Report::new();
    let mut rehash = Report::new();
    let mut diff = Report::new();
    let mut rng = rand::rng();

    for n in self.sizes() {
      let mut reference = vec![0u8; n];
      fill_pseudo_random(&mut reference, n as u64);
      let original = MerkleTree::with_hasher(&reference[..], config, hasher)?;
      let mut data = reference.clone();

      for _ in 0..self.trials {
        data.copy_from_slice(&reference);

        let t0 = Instant::now();
        let mut tree = MerkleTree::with_hasher(&mut data[..], config, hasher)?;
        build.add(n, t0.elapsed());

        let t0 = Instant::now();
        let matched = tree.verify(&reference);
        verify.add(n, t0.elapsed());

        let i = rng.random_range(0..n);
        tree.buffer_mut()[i] ^= 0xFF;
        let t0 = Instant::now();
        tree.rehash();
        rehash.add(n, t0.elapsed());

        let t0 = Instant::now();
        let divergence = original.first_diff(&tree);
        diff.add(n, t0.elapsed());
        debug!(n, matched, mutated = i, ?divergence, "trial finished");
      }
      println!("  n={n}");
      println!("    build:  {}", build.single(n));
      println!("    verify: {}", verify.single(n));
      println!("    rehash: {}", rehash.single(n));
      println!("    diff:   {}", diff.single(n));
    }

    let mut paths = Vec::new();
    for (name, report) in [("build", &build), ("verify", &verify), ("rehash", &rehash), ("diff", &diff)] {
      let path = self.output.join(format!("{}-{name}.csv", self.session));
      report.save_to_csv(&path)?;
      println!("==> {}", path.to_string_lossy());
      paths.push(path);
    }
    Ok(paths)
  }
}
