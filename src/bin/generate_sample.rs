//! Writes a synthetic landings table as `sample_landings.csv` and
//! `sample_landings.parquet` into the directory given as the first argument
//! (default: current directory).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 2_000;

/// `(recclass, relative weight)`, roughly the mix of the real catalogue.
const CLASSES: [(&str, u32); 8] = [
    ("L6", 30),
    ("H5", 25),
    ("L5", 12),
    ("H6", 12),
    ("H4", 8),
    ("LL5", 6),
    ("CM2", 4),
    ("Iron, IIIAB", 3),
];

struct Landing {
    name: String,
    mass_g: Option<f64>,
    recclass: &'static str,
    fall: &'static str,
    year: Option<i32>,
    reclat: Option<f64>,
    reclong: Option<f64>,
}

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// `Some(value)` except for a `missing` fraction of draws.
    fn maybe<T>(&mut self, missing: f64, value: T) -> Option<T> {
        (self.next_f64() >= missing).then_some(value)
    }

    fn pick_class(&mut self) -> &'static str {
        let total: u32 = CLASSES.iter().map(|(_, w)| w).sum();
        let mut ticket = (self.next_f64() * total as f64) as u32;
        for (class, weight) in CLASSES {
            if ticket < weight {
                return class;
            }
            ticket -= weight;
        }
        CLASSES[0].0
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Landing> {
    (0..ROWS)
        .map(|i| {
            // Log-uniform between 0.1 g and 10 t.
            let mass = 10f64.powf(rng.uniform(-1.0, 7.0));
            let year = rng.uniform(1860.0, 2014.0) as i32;
            let lat = rng.uniform(-85.0, 80.0);
            let long = rng.uniform(-180.0, 180.0);
            Landing {
                name: format!("Synthetic {i:04}"),
                mass_g: rng.maybe(0.03, (mass * 100.0).round() / 100.0),
                recclass: rng.pick_class(),
                fall: if rng.next_f64() < 0.1 { "Fell" } else { "Found" },
                year: rng.maybe(0.02, year),
                reclat: rng.maybe(0.05, (lat * 1e5).round() / 1e5),
                reclong: rng.maybe(0.05, (long * 1e5).round() / 1e5),
            }
        })
        .collect()
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_csv(path: &PathBuf, landings: &[Landing]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "name", "id", "nametype", "recclass", "mass (g)", "fall", "year", "reclat", "reclong",
        "GeoLocation",
    ])?;
    for (id, l) in landings.iter().enumerate() {
        let geolocation = match (l.reclat, l.reclong) {
            (Some(lat), Some(long)) => format!("({lat}, {long})"),
            _ => String::new(),
        };
        writer.write_record([
            l.name.clone(),
            (id + 1).to_string(),
            "Valid".to_string(),
            l.recclass.to_string(),
            opt(l.mass_g),
            l.fall.to_string(),
            l.year
                .map(|y| format!("01/01/{y} 12:00:00 AM"))
                .unwrap_or_default(),
            opt(l.reclat),
            opt(l.reclong),
            geolocation,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &PathBuf, landings: &[Landing]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("mass (g)", DataType::Float64, true),
        Field::new("recclass", DataType::Utf8, false),
        Field::new("fall", DataType::Utf8, false),
        Field::new("year", DataType::Int32, true),
        Field::new("reclat", DataType::Float64, true),
        Field::new("reclong", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(landings.iter().map(|l| l.name.as_str()))),
            Arc::new(landings.iter().map(|l| l.mass_g).collect::<Float64Array>()),
            Arc::new(StringArray::from_iter_values(landings.iter().map(|l| l.recclass))),
            Arc::new(StringArray::from_iter_values(landings.iter().map(|l| l.fall))),
            Arc::new(landings.iter().map(|l| l.year).collect::<Int32Array>()),
            Arc::new(landings.iter().map(|l| l.reclat).collect::<Float64Array>()),
            Arc::new(landings.iter().map(|l| l.reclong).collect::<Float64Array>()),
        ],
    )
    .context("building record batch")?;
    arrow::util::pretty::print_batches(&[batch.slice(0, batch.num_rows().min(5))])?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut rng = SimpleRng::new(42);
    let landings = generate(&mut rng);

    let csv_path = out_dir.join("sample_landings.csv");
    write_csv(&csv_path, &landings)?;
    let parquet_path = out_dir.join("sample_landings.parquet");
    write_parquet(&parquet_path, &landings)?;

    println!(
        "Wrote {} landings to {} and {}",
        landings.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
