use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use block_merkle::Result;

/// Summary of repeated timings in milliseconds.
#[derive(Debug, Clone)]
pub struct Stat {
  pub count: usize,
  pub mean: f64,
  pub median: f64,
  pub std_dev: f64,
  pub min: f64,
  pub max: f64,
}

impl Stat {
  pub fn from_vec(mut data: Vec<f64>) -> Stat {
    if data.is_empty() {
      return Stat { count: 0, mean: f64::NAN, median: f64::NAN, std_dev: f64::NAN, min: f64::NAN, max: f64::NAN };
    }
    data.sort_by(f64::total_cmp);
    let count = data.len();
    let (min, max) = (data[0], data[count - 1]);
    let mean = data.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 { (data[count / 2 - 1] + data[count / 2]) / 2.0 } else { data[count / 2] };
    let variance = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / count as f64;
    Stat { count, mean, median, std_dev: variance.sqrt(), min, max }
  }
}

impl Display for Stat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // 2σ relative to the mean, as a percentage
    let two_sigma_percent = if self.mean > 0.0 { (2.0 * self.std_dev / self.mean) * 100.0 } else { 0.0 };
    write!(
      f,
      "{}: {:.3}ms ±{:.1}% [{:.3}|{:.3}|{:.3}]",
      self.count, self.mean, two_sigma_percent, self.min, self.median, self.max
    )
  }
}

/// Timings grouped by an x-axis value such as the buffer size.
pub struct Report<X: Display + Copy + Hash + Ord> {
  data_set: HashMap<X, Vec<f64>>,
}

impl<X: Display + Copy + Hash + Ord> Report<X> {
  pub fn new() -> Self {
    Report { data_set: HashMap::new() }
  }

  pub fn add(&mut self, x: X, y: Duration) {
    self.data_set.entry(x).or_default().push(y.as_secs_f64() * 1000.0);
  }

  pub fn single(&self, x: X) -> Stat {
    Stat::from_vec(self.data_set.get(&x).cloned().unwrap_or_default())
  }

  pub fn save_to_csv(&self, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "N,COUNT,MEAN,MEDIAN,STDDEV,MIN,MAX")?;

    let mut xs = self.data_set.keys().copied().collect::<Vec<_>>();
    xs.sort_unstable();
    for x in xs {
      let y = self.single(x);
      writeln!(
        writer,
        "\"{}\",{},{:.3},{:.3},{:.3},{:.3},{:.3}",
        x, y.count, y.mean, y.median, y.std_dev, y.min, y.max
      )?;
    }

    writer.flush()?;
    Ok(())
  }
}
