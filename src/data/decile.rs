use serde::Serialize;

use super::model::CustomerRecord;

/// Number of rank buckets.
pub const DECILE_COUNT: usize = 10;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A matched record tagged with its decile (1 = highest sales, 10 = lowest).
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub record: CustomerRecord,
    pub decile: u8,
}

/// Aggregates over the members of one decile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecileSummaryRow {
    #[serde(rename = "Decile")]
    pub decile: u8,
    #[serde(rename = "Total_Sales")]
    pub total_sales: f64,
    #[serde(rename = "Customer_Count")]
    pub customer_count: usize,
    #[serde(rename = "Avg_Sales")]
    pub avg_sales: f64,
}

/// Ranked records plus their per-decile summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DecileBreakdown {
    /// Records ordered by descending sale value (ties keep input order).
    pub ranked: Vec<RankedRecord>,
    /// One row per non-empty decile, ascending by decile number.
    pub summary: Vec<DecileSummaryRow>,
    /// The 10%..90% quantiles of the sale values, ascending.
    pub cut_points: [f64; DECILE_COUNT - 1],
}

/// Outcome of a decile assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Deciles {
    Assigned(DecileBreakdown),
    /// Fewer than ten records matched; nothing was ranked.
    InsufficientData { available: usize },
}

impl Deciles {
    pub fn breakdown(&self) -> Option<&DecileBreakdown> {
        match self {
            Deciles::Assigned(b) => Some(b),
            Deciles::InsufficientData { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Quantiles
// ---------------------------------------------------------------------------

/// The `p`-th quantile of ascending-sorted data, interpolating linearly
/// between order statistics (`h = (n - 1) * p`).
///
/// Returns `None` for empty input or `p` outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        Some(sorted[n - 1])
    } else {
        Some(sorted[j] + g * (sorted[j + 1] - sorted[j]))
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Rank `records` by sale value and split them into equal-frequency deciles.
///
/// Buckets are right-closed intervals between consecutive cut points, the
/// lowest one including the minimum.  A value equal to a cut point belongs to
/// the lower bucket, so duplicated values always share a decile and buckets
/// around repeated cut points can be uneven or empty.
pub fn assign_deciles(records: Vec<CustomerRecord>) -> Deciles {
    if records.len() < DECILE_COUNT {
        return Deciles::InsufficientData {
            available: records.len(),
        };
    }

    let mut sorted = records;
    sorted.sort_by(|a, b| b.sale_value.total_cmp(&a.sale_value));

    let ascending: Vec<f64> = sorted.iter().rev().map(|r| r.sale_value).collect();
    let mut cut_points = [0.0; DECILE_COUNT - 1];
    for (k, cut) in cut_points.iter_mut().enumerate() {
        let p = (k + 1) as f64 / DECILE_COUNT as f64;
        // Non-empty and p in range, so the quantile always exists.
        *cut = quantile_sorted(&ascending, p).unwrap_or(f64::NAN);
    }

    let ranked: Vec<RankedRecord> = sorted
        .into_iter()
        .map(|record| {
            let decile = decile_for(record.sale_value, &cut_points);
            RankedRecord { record, decile }
        })
        .collect();

    let summary = summarize(&ranked);
    Deciles::Assigned(DecileBreakdown {
        ranked,
        summary,
        cut_points,
    })
}

/// Decile of a single value given ascending cut points.
fn decile_for(value: f64, cut_points: &[f64; DECILE_COUNT - 1]) -> u8 {
    let bucket = cut_points
        .iter()
        .position(|&cut| value <= cut)
        .unwrap_or(DECILE_COUNT - 1);
    // bucket 0 is the lowest values; decile 1 the highest.
    (DECILE_COUNT - bucket) as u8
}

fn summarize(ranked: &[RankedRecord]) -> Vec<DecileSummaryRow> {
    let mut totals = [0.0_f64; DECILE_COUNT];
    let mut counts = [0_usize; DECILE_COUNT];
    for r in ranked {
        let idx = usize::from(r.decile) - 1;
        totals[idx] += r.record.sale_value;
        counts[idx] += 1;
    }

    (0..DECILE_COUNT)
        .filter(|&i| counts[i] > 0)
        .map(|i| DecileSummaryRow {
            decile: (i + 1) as u8,
            total_sales: totals[i],
            customer_count: counts[i],
            avg_sales: totals[i] / counts[i] as f64,
        })
        .collect()
}
