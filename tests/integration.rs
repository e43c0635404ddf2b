//! End-to-end tests for the decile report pipeline

use std::io::Write;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::NamedTempFile;

use decile_dashboard::data::{
    assign_deciles, build_report, distinct_values, export_csv, filter, load_file, read_csv,
    Attribute, CustomerRecord, DataSourceError, DatasetCache, Deciles, FilterCriteria,
};
use decile_dashboard::state::AppState;

/// Write CSV text to a temporary `.csv` file.
fn csv_file(text: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

/// 24 customers over two brands and two regions, with a pass-through column.
fn sample_csv() -> NamedTempFile {
    let mut text = String::from("Cust Name,Brand,region,Sale value,Segment\n");
    for i in 0..24 {
        let brand = if i % 2 == 0 { "Acme" } else { "Zen" };
        let region = if i % 3 == 0 { "North" } else { "South" };
        let segment = if i < 8 { "Gold" } else { "Standard" };
        text.push_str(&format!("Customer {i},{brand},{region},{}.25,{segment}\n", i * 37 % 101));
    }
    csv_file(&text)
}

#[test]
fn test_end_to_end_pipeline() {
    let file = sample_csv();
    let ds = load_file(file.path()).unwrap();
    assert_eq!(ds.len(), 24);

    let brands: Vec<String> = distinct_values(&ds, Attribute::Brand).into_iter().collect();
    assert_eq!(brands, ["Acme", "Zen"]);

    let report = build_report(&ds, &FilterCriteria::all(&ds));
    assert_eq!(report.kpis.count, 24);

    let breakdown = report.deciles.breakdown().expect("24 customers are enough");
    let count: usize = breakdown.summary.iter().map(|s| s.customer_count).sum();
    assert_eq!(count, 24);

    let expected: f64 = ds.records.iter().map(|r| r.sale_value).sum();
    let total: f64 = breakdown.summary.iter().map(|s| s.total_sales).sum();
    assert!((total - expected).abs() < 1e-9);
    assert!((report.kpis.total_sales - expected).abs() < 1e-9);
}

#[test]
fn test_filtered_population_is_ranked_on_its_own() {
    let file = sample_csv();
    let ds = load_file(file.path()).unwrap();

    let criteria = FilterCriteria {
        brands: ["Acme".to_string()].into(),
        regions: distinct_values(&ds, Attribute::Region),
    };
    let matched = filter(&ds, &criteria);
    assert_eq!(matched.len(), 12);
    assert!(matched.iter().all(|r| r.brand == "Acme"));

    let Deciles::Assigned(b) = assign_deciles(matched) else {
        panic!("12 customers are enough for deciles");
    };
    assert!(b.ranked.iter().all(|r| r.record.brand == "Acme"));
    assert_eq!(b.ranked.first().map(|r| r.decile), Some(1));
    assert_eq!(b.ranked.last().map(|r| r.decile), Some(10));
}

#[test]
fn test_small_selection_reports_insufficient_data() {
    let file = sample_csv();
    let ds = load_file(file.path()).unwrap();

    let criteria = FilterCriteria {
        brands: ["Zen".to_string()].into(),
        regions: ["North".to_string()].into(),
    };
    let report = build_report(&ds, &criteria);
    assert_eq!(report.kpis.count, 4);
    assert_eq!(report.deciles, Deciles::InsufficientData { available: 4 });
}

#[test]
fn test_export_round_trip() {
    let file = sample_csv();
    let ds = load_file(file.path()).unwrap();
    let report = build_report(&ds, &FilterCriteria::all(&ds));
    let breakdown = report.deciles.breakdown().unwrap();

    let bytes = export_csv(&ds.columns, &breakdown.ranked).unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.starts_with("Cust Name,Brand,region,Sale value,Segment,Decile\n"));

    let reloaded = read_csv(bytes.as_slice()).unwrap();
    assert_eq!(reloaded.len(), breakdown.ranked.len());
    for (back, ranked) in reloaded.records.iter().zip(&breakdown.ranked) {
        let (decile, rest) = back.extras.split_last().unwrap();
        assert_eq!(&*decile.0, "Decile");
        assert_eq!(decile.1, ranked.decile.to_string());

        let mut without_decile = back.clone();
        without_decile.extras = rest.to_vec();
        assert_eq!(without_decile, ranked.record);
    }
}

#[test]
fn test_reexporting_a_report_keeps_one_decile_column() {
    let file = sample_csv();
    let ds = load_file(file.path()).unwrap();
    let report = build_report(&ds, &FilterCriteria::all(&ds));
    let first = export_csv(&ds.columns, &report.deciles.breakdown().unwrap().ranked).unwrap();

    let exported = csv_file(std::str::from_utf8(&first).unwrap());
    let reopened = load_file(exported.path()).unwrap();
    assert_eq!(reopened.columns, ds.columns);

    let report = build_report(&reopened, &FilterCriteria::all(&reopened));
    let second = export_csv(&reopened.columns, &report.deciles.breakdown().unwrap().ranked).unwrap();
    let text = String::from_utf8(second.clone()).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, "Cust Name,Brand,region,Sale value,Segment,Decile");
    assert_eq!(header.matches("Decile").count(), 1);

    // Same population, same ranking: the second export reproduces the first.
    assert_eq!(second, first);
}

#[test]
fn test_fractional_values_survive_export() {
    let values = [0.1, 1.0 / 3.0, 2.5e-7, 123456789.125, 42.0, 7.7, 8.8, 9.9, 10.01, 11.5];
    let records: Vec<CustomerRecord> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| CustomerRecord::new("B", "R", format!("c{i}"), v))
        .collect();
    let Deciles::Assigned(b) = assign_deciles(records) else {
        panic!("ten records are enough");
    };
    let columns: Vec<String> = ["Brand", "region", "Cust Name", "Sale value"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let reloaded = read_csv(export_csv(&columns, &b.ranked).unwrap().as_slice()).unwrap();
    let back: Vec<f64> = reloaded.records.iter().map(|r| r.sale_value).collect();
    let original: Vec<f64> = b.ranked.iter().map(|r| r.record.sale_value).collect();
    assert_eq!(back, original);
}

#[test]
fn test_missing_column_is_a_data_source_error() {
    let file = csv_file("Brand,region,Sale value\nAcme,North,10\n");
    match load_file(file.path()) {
        Err(DataSourceError::MissingColumn { column }) => assert_eq!(column, "Cust Name"),
        other => panic!("expected missing column, got {other:?}"),
    }
}

#[test]
fn test_parquet_source() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Customer ID", DataType::Int64, false),
        Field::new("Cust Name", DataType::Utf8, false),
        Field::new("Brand", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("Sale value", DataType::Float64, false),
    ]));
    let n = 15;
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(0..n)),
            Arc::new(StringArray::from_iter_values((0..n).map(|i| format!("c{i}")))),
            Arc::new(StringArray::from_iter_values((0..n).map(|_| "Acme"))),
            Arc::new(StringArray::from_iter_values((0..n).map(|_| "North"))),
            Arc::new(Float64Array::from_iter_values((0..n).map(|i| i as f64 * 1.5))),
        ],
    )
    .unwrap();

    let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(file.path()).unwrap();
    assert_eq!(ds.len(), 15);
    assert_eq!(ds.records[3].sale_value, 4.5);
    assert_eq!(ds.records[3].customer_name, "c3");
    assert_eq!(ds.records[3].cell("Customer ID").as_deref(), Some("3"));
    assert_eq!(ds.columns[0], "Customer ID");
}

#[test]
fn test_state_loads_once_and_exports() {
    let file = sample_csv();
    let out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();

    let mut state = AppState::default();
    state.open(file.path()).unwrap();
    let first = state.dataset.clone().unwrap();
    state.open(file.path()).unwrap();
    assert!(Arc::ptr_eq(&first, state.dataset.as_ref().unwrap()));
    assert_eq!(state.cache.len(), 1);

    let rows = state.export_to(out.path()).unwrap();
    assert_eq!(rows, 24);
    let reloaded = load_file(out.path()).unwrap();
    assert_eq!(reloaded.len(), 24);
    assert_eq!(reloaded.columns.last().map(String::as_str), Some("Decile"));

    state.select_none(Attribute::Brand);
    assert!(state.export_to(out.path()).is_err());

    state.reload().unwrap();
    assert!(!Arc::ptr_eq(&first, state.dataset.as_ref().unwrap()));
    assert_eq!(state.report.as_ref().unwrap().kpis.count, 24);
}

#[test]
fn test_cache_reports_unreadable_sources() {
    let mut cache = DatasetCache::new();
    let err = cache
        .load(std::path::Path::new("/no/such/customer_data.csv"))
        .unwrap_err();
    assert!(matches!(err, DataSourceError::Io { .. }));
    assert!(cache.is_empty());
}
