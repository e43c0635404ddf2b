use serde::Serialize;

use super::decile::{assign_deciles, Deciles};
use super::filter::{filter, FilterCriteria};
use super::model::{CustomerRecord, Dataset};

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Headline figures over the matched records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub count: usize,
    pub total_sales: f64,
    /// `None` when nothing matched.
    pub avg_sales: Option<f64>,
}

impl Kpis {
    /// Total customers, e.g. `"1204"`.
    pub fn count_label(&self) -> String {
        self.count.to_string()
    }

    /// Total sales with thousands separators and no decimals.
    pub fn total_label(&self) -> String {
        format_thousands(self.total_sales, 0)
    }

    /// Average sales with two decimals, or `"N/A"`.
    pub fn avg_label(&self) -> String {
        self.avg_sales
            .map(|avg| format_thousands(avg, 2))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

pub fn compute_kpis(records: &[CustomerRecord]) -> Kpis {
    let count = records.len();
    let total_sales: f64 = records.iter().map(|r| r.sale_value).sum();
    let avg_sales = (count > 0).then(|| total_sales / count as f64);
    Kpis {
        count,
        total_sales,
        avg_sales,
    }
}

/// Format `value` with `decimals` fraction digits and `,` between thousands.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    // "-0" after rounding is printed as "0".
    if value < 0.0 && int_part.chars().chain(frac_part.unwrap_or("").chars()).any(|c| c != '0') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

// ---------------------------------------------------------------------------
// Report – one request, one response
// ---------------------------------------------------------------------------

/// Everything the presentation layer shows for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub criteria: FilterCriteria,
    pub kpis: Kpis,
    pub deciles: Deciles,
}

/// Run the whole pipeline for `criteria`: filter, KPIs, deciles.
pub fn build_report(dataset: &Dataset, criteria: &FilterCriteria) -> Report {
    let matched = filter(dataset, criteria);
    let kpis = compute_kpis(&matched);
    let deciles = assign_deciles(matched);

    match &deciles {
        Deciles::Assigned(b) => log::debug!(
            "Report: {} of {} customers matched, {} deciles populated",
            kpis.count,
            dataset.len(),
            b.summary.len()
        ),
        Deciles::InsufficientData { available } => log::warn!(
            "Only {available} customers match the current filters; deciles need at least 10"
        ),
    }

    Report {
        criteria: criteria.clone(),
        kpis,
        deciles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::REQUIRED_COLUMNS;

    #[test]
    fn kpis_over_records() {
        let rows = vec![
            CustomerRecord::new("A", "N", "x", 10.0),
            CustomerRecord::new("A", "N", "y", 25.5),
        ];
        let kpis = compute_kpis(&rows);
        assert_eq!(kpis.count, 2);
        assert_eq!(kpis.total_sales, 35.5);
        assert_eq!(kpis.avg_sales, Some(17.75));
        assert_eq!(kpis.avg_label(), "17.75");
    }

    #[test]
    fn empty_kpis_have_no_average() {
        let kpis = compute_kpis(&[]);
        assert_eq!(kpis.count, 0);
        assert_eq!(kpis.total_sales, 0.0);
        assert_eq!(kpis.avg_sales, None);
        assert_eq!(kpis.avg_label(), "N/A");
        assert_eq!(kpis.total_label(), "0");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-98765.4, 0), "-98,765");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
        assert_eq!(format_thousands(f64::NAN, 2), "N/A");
    }

    #[test]
    fn non_overlapping_filter_yields_empty_report() {
        let ds = Dataset::from_records(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            (0..20)
                .map(|i| {
                    let (brand, region) = if i % 2 == 0 { ("A", "N") } else { ("B", "S") };
                    CustomerRecord::new(brand, region, format!("c{i}"), i as f64)
                })
                .collect(),
        );
        let criteria = FilterCriteria {
            brands: ["A".to_string()].into(),
            regions: ["S".to_string()].into(),
        };
        let report = build_report(&ds, &criteria);
        assert_eq!(report.kpis.count, 0);
        assert_eq!(report.deciles, Deciles::InsufficientData { available: 0 });

        let full = build_report(&ds, &FilterCriteria::all(&ds));
        assert_eq!(full.kpis.count, 20);
        assert!(full.deciles.breakdown().is_some());
    }
}
