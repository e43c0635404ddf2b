use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const CUSTOMERS: usize = 400;
const BRANDS: [&str; 4] = ["Aurora", "Borealis", "Cascade", "Delta"];
const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    id: i64,
    brand: &'static str,
    region: &'static str,
    name: String,
    sale_value: f64,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..CUSTOMERS)
        .map(|i| {
            // Log-normal sales: a long tail of large customers.
            let sale = rng.gauss(7.5, 0.9).exp();
            Row {
                id: 1000 + i as i64,
                brand: rng.pick(&BRANDS),
                region: rng.pick(&REGIONS),
                name: format!("Customer {:04}", i + 1),
                sale_value: (sale * 100.0).round() / 100.0,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["Customer ID", "Cust Name", "Brand", "region", "Sale value"])?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.name.clone(),
            r.brand.to_string(),
            r.region.to_string(),
            r.sale_value.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Customer ID", DataType::Int64, false),
        Field::new("Cust Name", DataType::Utf8, false),
        Field::new("Brand", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("Sale value", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.brand))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.sale_value))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "customer_data.csv".to_string());
    let output_path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let is_parquet = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(output_path, &rows)?;
    } else {
        write_csv(output_path, &rows)?;
    }

    println!("Wrote {} customers to {output}", rows.len());
    Ok(())
}
