//! Writes a deterministic synthetic dataset in the dashboard's input layout,
//! as CSV and as Parquet.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use la_zip_dashboard::config::DEFAULT_DATASET;
use la_zip_dashboard::data::model::{Column, ZipRecord};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// `(city, first zip, zip count, affluence 0..1, urban density 0..1)`
const CITIES: &[(&str, u32, u32, f64, f64)] = &[
    ("Los Angeles", 90001, 40, 0.45, 0.9),
    ("Beverly Hills", 90210, 3, 0.95, 0.5),
    ("Santa Monica", 90401, 5, 0.85, 0.7),
    ("Long Beach", 90802, 12, 0.5, 0.7),
    ("Pasadena", 91101, 8, 0.7, 0.55),
    ("Glendale", 91201, 7, 0.6, 0.6),
    ("Burbank", 91501, 4, 0.65, 0.5),
    ("Compton", 90220, 3, 0.25, 0.6),
    ("Lancaster", 93534, 4, 0.3, 0.15),
    ("Malibu", 90265, 1, 0.98, 0.05),
    ("Torrance", 90501, 6, 0.65, 0.45),
    ("Inglewood", 90301, 5, 0.35, 0.75),
];

fn clamp_score(v: f64) -> f64 {
    (v.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

fn category(score: f64) -> &'static str {
    match score {
        s if s >= 75.0 => "Very High",
        s if s >= 60.0 => "High",
        s if s >= 45.0 => "Medium",
        s if s >= 30.0 => "Low",
        _ => "Very Low",
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<ZipRecord> {
    let mut records = Vec::new();
    for &(city, first_zip, count, affluence, urban) in CITIES {
        for k in 0..count {
            let a = (affluence + rng.gauss(0.0, 0.08)).clamp(0.0, 1.0);
            let u = (urban + rng.gauss(0.0, 0.1)).clamp(0.0, 1.0);

            let density_score = clamp_score(100.0 * u + rng.gauss(0.0, 5.0));
            let transit_score = clamp_score(90.0 * u * (1.1 - a) + rng.gauss(0.0, 6.0));
            let income_score = clamp_score(100.0 * a + rng.gauss(0.0, 4.0));
            let education_score = clamp_score(95.0 * a + rng.gauss(0.0, 7.0));
            let housing_score = clamp_score(100.0 * (1.0 - a * 0.8) + rng.gauss(0.0, 8.0));
            let composite = clamp_score(
                0.2 * density_score
                    + 0.2 * transit_score
                    + 0.25 * income_score
                    + 0.2 * education_score
                    + 0.15 * housing_score,
            );

            let population = (rng.uniform(8_000.0, 30_000.0) + 40_000.0 * u).round();
            let mut record = ZipRecord::new(
                format!("{:05}", first_zip + k),
                city,
                category(composite),
                composite,
            );
            record.density_score = Some(density_score);
            record.transit_score = Some(transit_score);
            record.income_score = Some(income_score);
            record.education_score = Some(education_score);
            record.housing_score = Some(housing_score);
            record.median_income = Some((35_000.0 + 160_000.0 * a + rng.gauss(0.0, 6_000.0)).round());
            record.median_home_value =
                Some((300_000.0 + 2_500_000.0 * a * a + rng.gauss(0.0, 40_000.0)).round());
            record.estimated_population = Some(population);
            record.population_density = Some((500.0 + 25_000.0 * u * u).round());
            record.public_transit_pct = Some(clamp_score(25.0 * u * (1.1 - a) + rng.uniform(0.0, 2.0)));
            record.education_pct = Some(clamp_score(15.0 + 60.0 * a + rng.gauss(0.0, 4.0)));
            // A few rows with gaps, like the real survey data.
            if rng.next_f64() < 0.03 {
                record.median_home_value = None;
            }
            records.push(record);
        }
    }
    records
}

fn write_parquet(path: &str, records: &[ZipRecord]) -> Result<()> {
    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    for col in Column::ALL {
        if col.is_numeric() {
            fields.push(Field::new(col.name(), DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(
                records.iter().map(|r| r.value(col)).collect::<Vec<_>>(),
            )));
        } else {
            fields.push(Field::new(col.name(), DataType::Utf8, false));
            arrays.push(Arc::new(StringArray::from(
                records.iter().map(|r| r.cell(col)).collect::<Vec<_>>(),
            )));
        }
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);

    let mut writer = csv::Writer::from_path(DEFAULT_DATASET)
        .with_context(|| format!("creating {DEFAULT_DATASET}"))?;
    for record in &records {
        writer.serialize(record).context("writing CSV row")?;
    }
    writer.flush()?;

    let parquet_path = DEFAULT_DATASET.replace(".csv", ".parquet");
    write_parquet(&parquet_path, &records)?;

    println!(
        "Wrote {} zip codes to {DEFAULT_DATASET} and {parquet_path}",
        records.len()
    );
    Ok(())
}
