use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataSourceError;
use super::model::{
    CustomerRecord, Dataset, BRAND_COLUMN, CUSTOMER_NAME_COLUMN, DECILE_COLUMN, REGION_COLUMN,
    REQUIRED_COLUMNS, SALE_VALUE_COLUMN,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a customer dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `Brand`, `region`, `Cust Name`, `Sale value`
/// * `.json`    – `[{ "Brand": ..., "region": ..., "Cust Name": ..., "Sale value": ... }, ...]`
/// * `.parquet` – flat table with the same four columns
///
/// Any further columns are carried through untouched.
pub fn load_file(path: &Path) -> Result<Dataset, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|e| DataSourceError::io(path, e))?;
            read_csv(file)
        }
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataSourceError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Memoized loading
// ---------------------------------------------------------------------------

/// Loads each source at most once per version and hands out shared,
/// read-only copies.
///
/// The cache is an ordinary value owned by whoever drives the loads; nothing
/// is stored globally.  A source whose modification time changed since it was
/// read is loaded again.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CachedSource>,
}

#[derive(Debug)]
struct CachedSource {
    modified: Option<SystemTime>,
    dataset: Arc<Dataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, reading it on first use or
    /// when the file changed on disk.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataSourceError> {
        let key = source_key(path);
        let modified = modified_time(path);
        if let Some(cached) = self.entries.get(&key) {
            if cached.modified == modified {
                log::debug!("Dataset cache hit for {}", key.display());
                return Ok(Arc::clone(&cached.dataset));
            }
            log::info!("{} changed on disk, reloading", key.display());
        }

        let dataset = Arc::new(load_file(path)?);
        log::info!(
            "Loaded {} customers from {} ({} brands, {} regions)",
            dataset.len(),
            path.display(),
            dataset.brands.len(),
            dataset.regions.len()
        );
        self.entries.insert(
            key,
            CachedSource {
                modified,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Forget `path` so the next [`load`](Self::load) re-reads it.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(&source_key(path)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Last modification time, when the platform reports one.
fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Identity of a source: its canonical path when it exists, else as given.
fn source_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header positions of the required columns plus the pass-through ones.
///
/// A source `Decile` column is derived data from an earlier export; it is
/// dropped so re-exporting never duplicates it.
struct ColumnIndex {
    brand: usize,
    region: usize,
    customer_name: usize,
    sale_value: usize,
    extras: Vec<(usize, Arc<str>)>,
    /// Headers kept in the dataset, in source order.
    columns: Vec<String>,
}

impl ColumnIndex {
    fn new(headers: &[String]) -> Result<Self, DataSourceError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or(DataSourceError::MissingColumn { column })
        };
        let brand = find(BRAND_COLUMN)?;
        let region = find(REGION_COLUMN)?;
        let customer_name = find(CUSTOMER_NAME_COLUMN)?;
        let sale_value = find(SALE_VALUE_COLUMN)?;
        let required = [brand, region, customer_name, sale_value];

        let kept = || {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.as_str() != DECILE_COLUMN)
        };
        let extras = kept()
            .filter(|(i, _)| !required.contains(i))
            .map(|(i, h)| (i, Arc::from(h.as_str())))
            .collect();
        let columns = kept().map(|(_, h)| h.clone()).collect();

        Ok(ColumnIndex {
            brand,
            region,
            customer_name,
            sale_value,
            extras,
            columns,
        })
    }
}

/// Parse CSV text (header row included) into a [`Dataset`].
///
/// Column names are matched exactly.  This is also the parser used to read
/// back an exported report; its `Decile` column is dropped.
pub fn read_csv<R: Read>(source: R) -> Result<Dataset, DataSourceError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let index = ColumnIndex::new(&headers)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let sale_value = parse_sale_value(field(index.sale_value), row)?;
        let extras = index
            .extras
            .iter()
            .map(|(idx, name)| (Arc::clone(name), field(*idx).to_string()))
            .collect();

        records.push(CustomerRecord {
            brand: field(index.brand).to_string(),
            region: field(index.region).to_string(),
            customer_name: field(index.customer_name).to_string(),
            sale_value,
            extras,
        });
    }

    Ok(Dataset::from_records(index.columns, records))
}

/// Parse a sale value; `NaN` and infinities are rejected like any other text.
fn parse_sale_value(text: &str, row: usize) -> Result<f64, DataSourceError> {
    let invalid = || DataSourceError::InvalidSaleValue {
        row,
        value: text.to_string(),
    };
    let value = text.trim().parse::<f64>().map_err(|_| invalid())?;
    finite_sale_value(value, row)
}

fn finite_sale_value(value: f64, row: usize) -> Result<f64, DataSourceError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataSourceError::InvalidSaleValue {
            row,
            value: value.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Brand": "Acme", "region": "North", "Cust Name": "C-001", "Sale value": 1520.5 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, DataSourceError> {
    let text = std::fs::read_to_string(path).map_err(|e| DataSourceError::io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or_else(|| DataSourceError::Malformed {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    // Column order: first-seen across all objects (serde_json `preserve_order`).
    let mut columns: Vec<String> = Vec::new();
    for rec in rows {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if key != DECILE_COLUMN && !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    for column in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == column) {
            return Err(DataSourceError::MissingColumn { column });
        }
    }
    let extra_names: Vec<Arc<str>> = columns
        .iter()
        .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
        .map(|c| Arc::from(c.as_str()))
        .collect();

    let mut records = Vec::with_capacity(rows.len());
    for (i, rec) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = rec.as_object().ok_or_else(|| DataSourceError::Malformed {
            row,
            reason: "not a JSON object".to_string(),
        })?;

        let required = |column: &'static str| {
            obj.get(column)
                .ok_or_else(|| DataSourceError::Malformed {
                    row,
                    reason: format!("missing '{column}'"),
                })
        };

        let sale_value = match required(SALE_VALUE_COLUMN)? {
            JsonValue::Number(n) => n.as_f64().ok_or_else(|| DataSourceError::InvalidSaleValue {
                row,
                value: n.to_string(),
            })?,
            other => parse_sale_value(&json_text(other), row)?,
        };

        let extras = extra_names
            .iter()
            .map(|name| {
                let text = obj.get(&**name).map(json_text).unwrap_or_default();
                (Arc::clone(name), text)
            })
            .collect();

        records.push(CustomerRecord {
            brand: json_text(required(BRAND_COLUMN)?),
            region: json_text(required(REGION_COLUMN)?),
            customer_name: json_text(required(CUSTOMER_NAME_COLUMN)?),
            sale_value,
            extras,
        });
    }

    Ok(Dataset::from_records(columns, records))
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table.  Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, DataSourceError> {
    let file = File::open(path).map_err(|e| DataSourceError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let index = ColumnIndex::new(&headers)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let row_no = records.len() + 1;
            let text = |idx: usize| cell_text(batch.column(idx), row);

            let sale_value = numeric_cell(batch.column(index.sale_value), row, row_no)?;
            let extras = index
                .extras
                .iter()
                .map(|(idx, name)| Ok((Arc::clone(name), text(*idx)?)))
                .collect::<Result<Vec<_>, DataSourceError>>()?;

            records.push(CustomerRecord {
                brand: text(index.brand)?,
                region: text(index.region)?,
                customer_name: text(index.customer_name)?,
                sale_value,
                extras,
            });
        }
    }

    Ok(Dataset::from_records(index.columns, records))
}

// -- Parquet / Arrow helpers --

/// Render one cell as text; nulls become the empty string.
fn cell_text(col: &ArrayRef, row: usize) -> Result<String, DataSourceError> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    Ok(array_value_to_string(col.as_ref(), row)?)
}

/// Read a sale value, accepting float, integer or numeric-text columns.
fn numeric_cell(col: &ArrayRef, row: usize, row_no: usize) -> Result<f64, DataSourceError> {
    let any = col.as_any();
    if !col.is_null(row) {
        if let Some(arr) = any.downcast_ref::<Float64Array>() {
            return finite_sale_value(arr.value(row), row_no);
        }
        if let Some(arr) = any.downcast_ref::<Float32Array>() {
            return finite_sale_value(arr.value(row) as f64, row_no);
        }
        if let Some(arr) = any.downcast_ref::<Int64Array>() {
            return Ok(arr.value(row) as f64);
        }
        if let Some(arr) = any.downcast_ref::<Int32Array>() {
            return Ok(arr.value(row) as f64);
        }
    }
    parse_sale_value(&cell_text(col, row)?, row_no)
}
