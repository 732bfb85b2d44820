//! Writes `sample_modes.parquet`: a synthetic Γ-point mode table with
//! degenerate groups, linewidths, ir. rep. labels and one imaginary mode.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// (symbol, degeneracy, frequency [cm^-1], intensity per mode)
const GROUPS: &[(&str, usize, f64, f64)] = &[
    ("T1u", 3, -18.0, 0.0),
    ("T1u", 3, 0.0, 0.0),
    ("T2u", 3, 142.0, 0.0),
    ("T1u", 3, 178.5, 0.62),
    ("T2g", 3, 264.0, 0.0),
    ("T1u", 3, 351.2, 1.35),
    ("Eg", 2, 412.0, 0.0),
    ("A1g", 1, 498.3, 0.0),
    ("T1u", 3, 567.9, 0.28),
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut frequency: Vec<f64> = Vec::new();
    let mut intensity: Vec<f64> = Vec::new();
    let mut linewidth: Vec<Option<f64>> = Vec::new();
    let mut irrep: Vec<&str> = Vec::new();
    let mut band_index: Vec<i64> = Vec::new();

    for &(symbol, degeneracy, freq, intens) in GROUPS {
        // Linewidths grow with frequency; degenerate partners share one.
        let gamma = if freq > 0.0 {
            Some(1.0 + freq / 100.0 * rng.uniform(0.8, 1.2))
        } else {
            None
        };
        for _ in 0..degeneracy {
            band_index.push(band_index.len() as i64 + 1);
            frequency.push(freq);
            intensity.push(intens / degeneracy as f64);
            linewidth.push(gamma);
            irrep.push(symbol);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("band_index", DataType::Int64, false),
        Field::new("frequency", DataType::Float64, false),
        Field::new("intensity", DataType::Float64, false),
        Field::new("linewidth", DataType::Float64, true),
        Field::new("irrep", DataType::Utf8, false),
    ]));

    let num_modes = band_index.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(band_index)),
            Arc::new(Float64Array::from(frequency)),
            Arc::new(Float64Array::from(intensity)),
            Arc::new(Float64Array::from(linewidth)),
            Arc::new(StringArray::from(irrep)),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let output_path = "sample_modes.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!("Wrote {num_modes} modes to {output_path}");
    Ok(())
}
