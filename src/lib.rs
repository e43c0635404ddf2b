//! Customer decile dashboard.
//!
//! Loads a customer sales table, filters it by brand and region, ranks the
//! matching customers into ten sales deciles and shows KPIs, a summary table,
//! a bar chart, the ranked detail and a CSV export.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;

pub use cli::Args;
pub use data::{build_report, DataSourceError, Dataset, DatasetCache, FilterCriteria, Report};
