use block_merkle::{BLOCK_SIZE, Blake3, ContentHasher, Divergence, Fnv64, MerkleTree, OddNodePolicy, ProofStep};
use block_merkle::{Result, TreeConfig};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bench::Bench;

mod bench;
mod stat;

#[derive(Parser)]
#[command(name = "merkle-block")]
#[command(author, version, about = "Block hash trees over files: root digests, verification, diffs and proofs")]
struct Args {
  /// Number of bytes per leaf block
  #[arg(short, long, default_value_t = BLOCK_SIZE)]
  block_size: usize,

  /// How an unpaired digest at the end of a level is lifted
  #[arg(long, value_enum, default_value_t = Policy::Promote)]
  odd_policy: Policy,

  /// Content hash used for leaves and inner nodes
  #[arg(long, value_enum, default_value_t = HasherKind::Blake3)]
  hasher: HasherKind,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the root digest of a file
  Root { file: PathBuf },

  /// Check a file against a root digest; exits with 1 on mismatch
  Verify { file: PathBuf, root: String },

  /// Print the offset of the first differing block of two files; exits with 1 if they differ
  Diff {
    a: PathBuf,
    b: PathBuf,

    /// List the offsets of every differing block
    #[arg(short, long, default_value_t = false)]
    all: bool,
  },

  /// Print the audit path of a block and check it against the root
  Proof { file: PathBuf, block: usize },

  /// Measure build/verify/rehash/diff times over growing buffers
  Bench {
    #[arg(default_value_t = 1024 * 1024)]
    max_size: usize,

    #[arg(short, long, default_value_t = 8)]
    division: usize,

    #[arg(short, long, default_value_t = 10)]
    trials: usize,

    /// Directory for the CSV reports
    #[arg(short, long, default_value_t = std::env::temp_dir().to_string_lossy().into_owned())]
    output: String,

    #[arg(short, long, default_value_t = Local::now().format("%Y%m%d%H%M%S").to_string())]
    session: String,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
  Promote,
  Duplicate,
}

impl From<Policy> for OddNodePolicy {
  fn from(policy: Policy) -> Self {
    match policy {
      Policy::Promote => OddNodePolicy::Promote,
      Policy::Duplicate => OddNodePolicy::Duplicate,
    }
  }
}

#[derive(Clone, Copy, ValueEnum)]
enum HasherKind {
  Blake3,
  Fnv64,
}

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("block_merkle=warn,merkle_block=warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = TreeConfig::new().with_block_size(args.block_size).with_odd_policy(args.odd_policy.into());
  config.validate()?;
  match args.hasher {
    HasherKind::Blake3 => run(args.command, config, Blake3),
    HasherKind::Fnv64 => run(args.command, config, Fnv64),
  }
}

fn run<H: ContentHasher + Copy>(command: Command, config: TreeConfig, hasher: H) -> Result<ExitCode> {
  match command {
    Command::Root { file } => {
      let data = read(&file)?;
      let tree = MerkleTree::with_hasher(&data[..], config, hasher)?;
      println!("{}  {} bytes, {} blocks", H::to_hex(&tree.root_hash()), tree.size(), tree.block_count());
      Ok(ExitCode::SUCCESS)
    }
    Command::Verify { file, root } => {
      let expected = H::from_hex(root.trim())?;
      let data = read(&file)?;
      let tree = MerkleTree::with_hasher(&data[..], config, hasher)?;
      if tree.root_hash() == expected {
        println!("OK");
        Ok(ExitCode::SUCCESS)
      } else {
        println!("MISMATCH: {}", H::to_hex(&tree.root_hash()));
        Ok(ExitCode::FAILURE)
      }
    }
    Command::Diff { a, b, all } => {
      let (data_a, data_b) = (read(&a)?, read(&b)?);
      let tree_a = MerkleTree::with_hasher(&data_a[..], config, hasher)?;
      let tree_b = MerkleTree::with_hasher(&data_b[..], config, hasher)?;
      match tree_a.first_diff(&tree_b) {
        Divergence::Identical => {
          println!("identical");
          Ok(ExitCode::SUCCESS)
        }
        Divergence::Offset(offset) => {
          if all {
            for block in tree_a.diff_blocks(&tree_b).unwrap_or_default() {
              println!("{}", block * config.block_size);
            }
          } else {
            println!("{offset}");
          }
          Ok(ExitCode::FAILURE)
        }
        Divergence::Incomparable => {
          println!("incomparable: {} blocks vs {} blocks", tree_a.block_count(), tree_b.block_count());
          Ok(ExitCode::from(2))
        }
      }
    }
    Command::Proof { file, block } => {
      let data = read(&file)?;
      let tree = MerkleTree::with_hasher(&data[..], config, hasher)?;
      let proof = tree.proof(block)?;
      for step in &proof.steps {
        match step {
          ProofStep::Left(digest) => println!("L {}", H::to_hex(digest)),
          ProofStep::Right(digest) => println!("R {}", H::to_hex(digest)),
        }
      }
      let content = tree.block(block).unwrap_or_default();
      if proof.verify(&hasher, content, &tree.root_hash()) {
        println!("root {}", H::to_hex(&tree.root_hash()));
        Ok(ExitCode::SUCCESS)
      } else {
        println!("proof does not reproduce the root");
        Ok(ExitCode::FAILURE)
      }
    }
    Command::Bench { max_size, division, trials, output, session } => {
      let bench = Bench { max_size, division, trials, output: PathBuf::from(output), session };
      println!("Working directory: {:?}", &bench.output);
      bench.run(config, hasher)?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

fn read(path: &Path) -> Result<Vec<u8>> {
  let data = fs::read(path)?;
  info!(path = %path.display(), size = data.len(), "read input");
  Ok(data)
}
