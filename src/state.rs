use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::DecilePalette;
use crate::data::export::export_csv;
use crate::data::filter::FilterCriteria;
use crate::data::loader::DatasetCache;
use crate::data::model::{Attribute, Dataset};
use crate::data::report::{build_report, Report};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Every source loaded so far, read at most once each.
    pub cache: DatasetCache,

    /// Source of the current dataset.
    pub source: Option<PathBuf>,

    /// Current dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// Brand and region selections.
    pub criteria: FilterCriteria,

    /// Report for the current selection; rebuilt on every filter change.
    pub report: Option<Report>,

    /// Decile colours for the chart and tables.
    pub palette: DecilePalette,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load (or fetch from cache) `path` and make it the current dataset.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let dataset = self
            .cache
            .load(path)
            .with_context(|| format!("loading {}", path.display()))?;
        self.source = Some(path.to_path_buf());
        self.set_dataset(dataset);
        Ok(())
    }

    /// Re-read the current source from disk, bypassing the cache.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.source.clone().context("no file is open")?;
        self.cache.invalidate(&path);
        self.open(&path)
    }

    /// Ingest a dataset and select every brand and region.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.criteria = FilterCriteria::all(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the report after a filter change.
    pub fn refilter(&mut self) {
        self.report = self
            .dataset
            .as_deref()
            .map(|ds| build_report(ds, &self.criteria));
    }

    /// Toggle a single value in an attribute's selection.
    pub fn toggle_filter_value(&mut self, attribute: Attribute, value: &str) {
        let selected = self.criteria.selected_mut(attribute);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values of an attribute.
    pub fn select_all(&mut self, attribute: Attribute) {
        if let Some(ds) = &self.dataset {
            *self.criteria.selected_mut(attribute) = ds.values(attribute).clone();
            self.refilter();
        }
    }

    /// Deselect all values of an attribute.
    pub fn select_none(&mut self, attribute: Attribute) {
        self.criteria.selected_mut(attribute).clear();
        self.refilter();
    }

    /// CSV bytes for the current report, if deciles were assigned.
    pub fn export_bytes(&self) -> Result<Option<Vec<u8>>> {
        let (Some(ds), Some(report)) = (&self.dataset, &self.report) else {
            return Ok(None);
        };
        let Some(breakdown) = report.deciles.breakdown() else {
            return Ok(None);
        };
        let bytes = export_csv(&ds.columns, &breakdown.ranked).context("writing CSV")?;
        Ok(Some(bytes))
    }

    /// Write the current report to `path`.  Returns the number of rows written.
    pub fn export_to(&self, path: &Path) -> Result<usize> {
        let bytes = self
            .export_bytes()?
            .context("no decile report to export for the current filters")?;
        std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
        let rows = self
            .report
            .as_ref()
            .and_then(|r| r.deciles.breakdown())
            .map_or(0, |b| b.ranked.len());
        Ok(rows)
    }
}
