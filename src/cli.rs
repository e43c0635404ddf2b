//! Command-line interface and the headless (no window) report.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use crate::data::decile::{DecileSummaryRow, Deciles};
use crate::data::filter::FilterCriteria;
use crate::data::model::{Attribute, Dataset};
use crate::data::report::{format_thousands, Kpis, Report};

/// Customer decile dashboard
///
/// Ranks customers into ten sales deciles for a brand/region selection.
///
/// Examples:
///   decile-dashboard customer_data.csv
///   decile-dashboard customer_data.csv --headless --brand Acme --region North
///   decile-dashboard customer_data.csv --export filtered_decile_report.csv
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Customer data file (.csv, .json or .parquet)
    ///
    /// Optional in the GUI, where a file can be opened from the File menu.
    #[arg(value_name = "FILE", env = "DECILE_DATA")]
    pub data: Option<PathBuf>,

    /// Brand to include (repeatable). Default: every brand.
    #[arg(short, long = "brand", value_name = "NAME")]
    pub brands: Vec<String>,

    /// Region to include (repeatable). Default: every region.
    #[arg(short, long = "region", value_name = "NAME")]
    pub regions: Vec<String>,

    /// Print the report to stdout instead of opening a window
    #[arg(long)]
    pub headless: bool,

    /// Print the headless report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the decile CSV to FILE (runs headless)
    #[arg(short, long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

impl Args {
    /// Whether to skip the GUI.
    pub fn is_headless(&self) -> bool {
        self.headless || self.json || self.export.is_some()
    }

    /// Filter selection from `--brand`/`--region`; unspecified means all.
    pub fn criteria(&self, dataset: &Dataset) -> FilterCriteria {
        let pick = |given: &[String], attribute: Attribute| -> BTreeSet<String> {
            if given.is_empty() {
                dataset.values(attribute).clone()
            } else {
                given.iter().cloned().collect()
            }
        };
        FilterCriteria {
            brands: pick(&self.brands, Attribute::Brand),
            regions: pick(&self.regions, Attribute::Region),
        }
    }
}

// ---------------------------------------------------------------------------
// Headless rendering
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HeadlessReport<'a> {
    kpis: &'a Kpis,
    /// `null` when fewer than ten customers matched.
    deciles: Option<&'a [DecileSummaryRow]>,
}

/// Pretty-printed JSON with the KPIs and the decile summary.
pub fn report_json(report: &Report) -> serde_json::Result<String> {
    let out = HeadlessReport {
        kpis: &report.kpis,
        deciles: report.deciles.breakdown().map(|b| b.summary.as_slice()),
    };
    serde_json::to_string_pretty(&out)
}

/// Plain-text KPIs and decile summary.
pub fn report_text(report: &Report) -> String {
    ReportText(report).to_string()
}

struct ReportText<'a>(&'a Report);

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kpis = &self.0.kpis;
        writeln!(f, "Total Customers: {}", kpis.count_label())?;
        writeln!(f, "Total Sales:     {}", kpis.total_label())?;
        writeln!(f, "Average Sales:   {}", kpis.avg_label())?;
        writeln!(f)?;

        match &self.0.deciles {
            Deciles::InsufficientData { .. } => {
                writeln!(f, "Not enough customers to create 10 equal deciles.")
            }
            Deciles::Assigned(b) => {
                writeln!(
                    f,
                    "{:>6}  {:>16}  {:>14}  {:>14}",
                    "Decile", "Total_Sales", "Customer_Count", "Avg_Sales"
                )?;
                for s in &b.summary {
                    writeln!(
                        f,
                        "{:>6}  {:>16}  {:>14}  {:>14}",
                        s.decile,
                        format_thousands(s.total_sales, 2),
                        s.customer_count,
                        format_thousands(s.avg_sales, 2)
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CustomerRecord, REQUIRED_COLUMNS};
    use crate::data::report::build_report;

    fn dataset() -> Dataset {
        Dataset::from_records(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![
                CustomerRecord::new("Acme", "North", "a", 1.0),
                CustomerRecord::new("Zen", "South", "b", 2.0),
            ],
        )
    }

    #[test]
    fn parses_repeated_filters() {
        let args = Args::parse_from([
            "decile-dashboard",
            "data.csv",
            "--brand",
            "Acme",
            "-b",
            "Zen",
            "--region",
            "North",
        ]);
        assert_eq!(args.data, Some(PathBuf::from("data.csv")));
        assert_eq!(args.brands, ["Acme", "Zen"]);
        assert!(!args.is_headless());

        let criteria = args.criteria(&dataset());
        assert_eq!(criteria.brands.len(), 2);
        assert_eq!(criteria.regions, BTreeSet::from(["North".to_string()]));
    }

    #[test]
    fn missing_filters_select_everything() {
        let args = Args::parse_from(["decile-dashboard", "data.csv", "--export", "out.csv"]);
        assert!(args.is_headless());
        let ds = dataset();
        assert_eq!(args.criteria(&ds), FilterCriteria::all(&ds));
    }

    #[test]
    fn text_report_warns_on_small_selection() {
        let ds = dataset();
        let report = build_report(&ds, &FilterCriteria::all(&ds));
        let text = report_text(&report);
        assert!(text.contains("Total Customers: 2"));
        assert!(text.contains("Average Sales:   1.50"));
        assert!(text.contains("Not enough customers"));
        assert!(text.ends_with("deciles.\n"));

        let json: serde_json::Value = serde_json::from_str(&report_json(&report).unwrap()).unwrap();
        assert_eq!(json["kpis"]["count"], 2);
        assert!(json["deciles"].is_null());
    }

    #[test]
    fn text_report_lists_every_populated_decile() {
        let ds = Dataset::from_records(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            (1..=20)
                .map(|i| CustomerRecord::new("Acme", "North", format!("c{i}"), f64::from(i) * 100.0))
                .collect(),
        );
        let text = report_text(&build_report(&ds, &FilterCriteria::all(&ds)));
        assert!(text.contains("Total Sales:     21,000"));
        let table: Vec<&str> = text.lines().skip_while(|l| !l.contains("Decile")).collect();
        assert_eq!(table.len(), 11);
        assert!(table[1].trim_start().starts_with("1 "));
        assert!(table[1].contains("3,900.00"));
    }
}
