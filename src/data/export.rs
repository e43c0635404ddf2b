use super::decile::RankedRecord;
pub use super::model::DECILE_COLUMN;

/// Suggested file name for the downloaded report.
pub const EXPORT_FILE_NAME: &str = "filtered_decile_report.csv";
/// MIME type of the exported report.
pub const EXPORT_MIME: &str = "text/csv";

/// Serialize ranked records as UTF-8 CSV.
///
/// `columns` is the source header order; every record is written in that
/// order with `Decile` appended.  There is no index column.  Sale values use
/// the shortest representation that parses back to the same `f64`.
pub fn export_csv(columns: &[String], ranked: &[RankedRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(
        columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(DECILE_COLUMN)),
    )?;

    for r in ranked {
        let mut row = r.record.cells(columns);
        row.push(r.decile.to_string());
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
