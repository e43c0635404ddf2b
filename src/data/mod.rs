/// Data layer: core types, loading, filtering and the decile report.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (memoized per source)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  brand × region selection → matched records
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  decile   │  rank, cut at 10%..90% quantiles, summarize
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  report   │  KPIs + deciles for one selection → UI / export
///   └──────────┘
/// ```

pub mod decile;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;

pub use decile::{assign_deciles, DecileBreakdown, DecileSummaryRow, Deciles, RankedRecord};
pub use error::DataSourceError;
pub use export::{export_csv, EXPORT_FILE_NAME, EXPORT_MIME};
pub use filter::{distinct_values, filter, FilterCriteria};
pub use loader::{load_file, read_csv, DatasetCache};
pub use model::{Attribute, CustomerRecord, Dataset};
pub use report::{build_report, compute_kpis, Kpis, Report};
