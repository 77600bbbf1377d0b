use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::color::CategoryColors;
use crate::config::{DashboardConfig, DEFAULT_DATASET};
use crate::data::export;
use crate::data::filter::{FilterCriteria, FilteredView, ScoreRange, filtered_indices};
use crate::data::loader;
use crate::data::model::{Column, ZipDataset};
use crate::data::summary::{Summary, summarize};

// ---------------------------------------------------------------------------
// UI enums
// ---------------------------------------------------------------------------

/// Dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    ScoreAnalysis,
    EconomicMetrics,
    Demographics,
    DataTable,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::ScoreAnalysis,
        Tab::EconomicMetrics,
        Tab::Demographics,
        Tab::DataTable,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "📊 Overview",
            Tab::ScoreAnalysis => "📈 Score Analysis",
            Tab::EconomicMetrics => "💰 Economic Metrics",
            Tab::Demographics => "🏘 Demographics",
            Tab::DataTable => "📋 Data Table",
        }
    }
}

/// Text columns with a checklist filter in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetFilter {
    Category,
    City,
}

impl SetFilter {
    pub fn label(self) -> &'static str {
        match self {
            SetFilter::Category => "Score Category",
            SetFilter::City => "Primary City",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file loads successfully). Never mutated.
    pub dataset: Option<ZipDataset>,

    /// Where the current dataset came from.
    pub dataset_path: Option<PathBuf>,

    /// Active constraints.
    pub criteria: FilterCriteria,

    /// Edit buffer for the score range inputs.
    pub range_input: (f64, f64),

    /// Shown when the range inputs are inverted.
    pub range_warning: Option<String>,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over `visible_indices` (cached).
    pub summary: Option<Summary>,

    /// Colour per score category.
    pub category_colors: Option<CategoryColors>,

    pub active_tab: Tab,

    /// Axes of the score relationship scatter.
    pub scatter_x: Column,
    pub scatter_y: Column,

    /// Data table search term.
    pub search: String,

    /// Data table columns, in display order.
    pub table_columns: Vec<Column>,

    /// Export only `table_columns` instead of every column.
    pub export_visible_only: bool,

    /// Fatal load error shown in the UI.
    pub status_message: Option<String>,

    /// Result of the last export.
    pub export_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            dataset_path: None,
            criteria: FilterCriteria::default(),
            range_input: (0.0, 0.0),
            range_warning: None,
            visible_indices: Vec::new(),
            summary: None,
            category_colors: None,
            active_tab: Tab::Overview,
            scatter_x: Column::DensityScore,
            scatter_y: Column::CompositeScore,
            search: String::new(),
            table_columns: Column::TABLE_DEFAULT.to_vec(),
            export_visible_only: false,
            status_message: None,
            export_message: None,
        }
    }

    /// Load whatever dataset the config points at, or report that none was found.
    pub fn load_initial(&mut self) {
        match self.config.locate_dataset() {
            Some(path) => self.load_path(&path),
            None => {
                let wanted = self
                    .config
                    .dataset_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET));
                log::warn!("No dataset found at {}", wanted.display());
                self.status_message = Some(format!(
                    "Could not find '{}'. Place it next to the executable or open it via File → Open…",
                    wanted.display()
                ));
            }
        }
    }

    /// Load a file, replacing the current dataset on success.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} zip codes ({} cities, {} categories) from {}",
                    dataset.len(),
                    dataset.cities.len(),
                    dataset.categories.len(),
                    path.display()
                );
                self.dataset_path = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.dataset = None;
                self.dataset_path = None;
                self.visible_indices.clear();
                self.summary = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, reset filters and colours.
    pub fn set_dataset(&mut self, dataset: ZipDataset) {
        self.criteria = FilterCriteria::default();
        self.range_input = dataset.score_bounds.unwrap_or((0.0, 0.0));
        self.range_warning = None;
        self.category_colors = Some(CategoryColors::new(&dataset.categories));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.export_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the summary after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(&ds.records, &self.criteria);
        let view = FilteredView::from_indices(ds, self.visible_indices.clone());
        self.summary = Some(summarize(&view, self.config.top_n));
        log::debug!(
            "Filter {:?} keeps {} of {} zip codes",
            self.criteria,
            self.visible_indices.len(),
            ds.len()
        );
    }

    /// The current filtered subset.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        self.dataset
            .as_ref()
            .map(|ds| FilteredView::from_indices(ds, self.visible_indices.clone()))
    }

    /// The filtered subset narrowed by the table search box.
    pub fn table_view(&self) -> Option<FilteredView<'_>> {
        self.view().map(|v| v.search(&self.search))
    }

    // -- Checklist filters --

    fn domain(&self, filter: SetFilter) -> Option<&BTreeSet<String>> {
        self.dataset.as_ref().map(|ds| match filter {
            SetFilter::Category => &ds.categories,
            SetFilter::City => &ds.cities,
        })
    }

    fn selection_mut(&mut self, filter: SetFilter) -> &mut Option<BTreeSet<String>> {
        match filter {
            SetFilter::Category => &mut self.criteria.categories,
            SetFilter::City => &mut self.criteria.cities,
        }
    }

    /// Whether `value` currently passes the given checklist.
    pub fn is_selected(&self, filter: SetFilter, value: &str) -> bool {
        let selection = match filter {
            SetFilter::Category => &self.criteria.categories,
            SetFilter::City => &self.criteria.cities,
        };
        selection.as_ref().map_or(true, |s| s.contains(value))
    }

    /// `(selected, total)` for the checklist header.
    pub fn selection_counts(&self, filter: SetFilter) -> (usize, usize) {
        let total = self.domain(filter).map_or(0, BTreeSet::len);
        let selected = match filter {
            SetFilter::Category => &self.criteria.categories,
            SetFilter::City => &self.criteria.cities,
        };
        (selected.as_ref().map_or(total, BTreeSet::len), total)
    }

    /// Toggle a single value in a checklist.
    pub fn toggle_filter_value(&mut self, filter: SetFilter, value: &str) {
        let Some(all_values) = self.domain(filter).cloned() else {
            return;
        };
        let selection = self.selection_mut(filter);
        let mut selected = selection.take().unwrap_or_else(|| all_values.clone());
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        // Everything selected means the constraint is inactive.
        *selection = (selected != all_values).then_some(selected);
        self.refilter();
    }

    /// Select all values (deactivates the constraint).
    pub fn select_all(&mut self, filter: SetFilter) {
        *self.selection_mut(filter) = None;
        self.refilter();
    }

    /// Deselect all values; nothing passes.
    pub fn select_none(&mut self, filter: SetFilter) {
        *self.selection_mut(filter) = Some(BTreeSet::new());
        self.refilter();
    }

    // -- Score range --

    /// Apply the range inputs. An inverted range is rejected with a warning and
    /// the previous range stays active.
    pub fn apply_range_input(&mut self) {
        let (min, max) = self.range_input;
        match ScoreRange::new(min, max) {
            Ok(range) => {
                self.range_warning = None;
                let bounds = self.dataset.as_ref().and_then(|ds| ds.score_bounds);
                let covers_all =
                    bounds.is_some_and(|(lo, hi)| range.min() <= lo && range.max() >= hi);
                self.criteria.score_range = (!covers_all).then_some(range);
                self.refilter();
            }
            Err(e) => {
                log::warn!("Rejected score range: {e}");
                self.range_warning = Some(e.to_string());
            }
        }
    }

    /// Reset the range to the dataset bounds.
    pub fn reset_range(&mut self) {
        if let Some((lo, hi)) = self.dataset.as_ref().and_then(|ds| ds.score_bounds) {
            self.range_input = (lo, hi);
        }
        self.apply_range_input();
    }

    /// Clear every constraint.
    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.reset_range();
    }

    // -- Data table --

    pub fn toggle_table_column(&mut self, column: Column) {
        if let Some(pos) = self.table_columns.iter().position(|c| *c == column) {
            self.table_columns.remove(pos);
        } else {
            // before the first shown column that comes later in the file
            let pos = self
                .table_columns
                .iter()
                .position(|c| *c > column)
                .unwrap_or(self.table_columns.len());
            self.table_columns.insert(pos, column);
        }
    }

    /// Columns written by the export button.
    pub fn export_columns(&self) -> Vec<Column> {
        if self.export_visible_only && !self.table_columns.is_empty() {
            self.table_columns.clone()
        } else {
            Column::ALL.to_vec()
        }
    }

    /// Write the table view (filters + search) to `path`.
    pub fn export_table(&mut self, path: &Path) -> Result<usize> {
        let columns = self.export_columns();
        let result = match self.table_view() {
            Some(view) => export::export_csv(path, view.records(), &columns),
            None => anyhow::bail!("No dataset loaded"),
        };
        self.export_message = Some(match &result {
            Ok(rows) => format!("Saved {rows} rows to {}", path.display()),
            Err(e) => format!("Export failed: {e:#}"),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn state() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(ZipDataset::from_records(vec![
            record("90001", "Los Angeles", "Low", 35.0),
            record("90210", "Beverly Hills", "Very High", 92.0),
            record("90012", "Los Angeles", "High", 71.0),
            record("91101", "Pasadena", "High", 68.5),
        ]));
        state
    }

    #[test]
    fn fresh_dataset_shows_everything() {
        let s = state();
        assert!(!s.criteria.is_active());
        assert_eq!(s.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(s.range_input, (35.0, 92.0));
        assert_eq!(s.summary.as_ref().map(|x| x.count), Some(4));
    }

    #[test]
    fn toggling_back_to_full_set_deactivates() {
        let mut s = state();
        s.toggle_filter_value(SetFilter::City, "Los Angeles");
        assert_eq!(s.visible_indices, vec![1, 3]);
        assert!(!s.is_selected(SetFilter::City, "Los Angeles"));
        assert_eq!(s.selection_counts(SetFilter::City), (2, 3));

        s.toggle_filter_value(SetFilter::City, "Los Angeles");
        assert_eq!(s.criteria.cities, None);
        assert_eq!(s.visible_indices.len(), 4);
    }

    #[test]
    fn select_none_renders_empty_state() {
        let mut s = state();
        s.select_none(SetFilter::Category);
        assert!(s.visible_indices.is_empty());
        assert!(s.summary.as_ref().is_some_and(Summary::is_empty));
        s.toggle_filter_value(SetFilter::Category, "High");
        assert_eq!(s.visible_indices, vec![2, 3]);
        s.select_all(SetFilter::Category);
        assert_eq!(s.visible_indices.len(), 4);
    }

    #[test]
    fn inverted_range_keeps_previous() {
        let mut s = state();
        s.range_input = (60.0, 80.0);
        s.apply_range_input();
        assert_eq!(s.visible_indices, vec![2, 3]);

        s.range_input = (90.0, 10.0);
        s.apply_range_input();
        assert!(s.range_warning.is_some());
        assert_eq!(s.visible_indices, vec![2, 3]);

        s.reset_range();
        assert!(s.range_warning.is_none());
        assert_eq!(s.criteria.score_range, None);
        assert_eq!(s.visible_indices.len(), 4);
    }

    #[test]
    fn table_view_applies_search_on_top_of_filters() {
        let mut s = state();
        s.toggle_filter_value(SetFilter::Category, "Low");
        s.search = "los".to_string();
        let view = s.table_view().unwrap();
        assert_eq!(view.indices(), &[2]);
    }

    #[test]
    fn export_respects_column_choice() {
        let mut s = state();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        assert_eq!(s.export_table(&path).unwrap(), 4);
        assert_eq!(loader::load_file(&path).unwrap().len(), 4);

        s.export_visible_only = true;
        s.table_columns = vec![Column::ZipCode];
        s.search = "902".to_string();
        assert_eq!(s.export_table(&path).unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "zip_code\n90210\n");
        assert!(s.export_message.as_deref().is_some_and(|m| m.starts_with("Saved 1 rows")));
    }

    #[test]
    fn table_columns_stay_in_file_order() {
        let mut s = state();
        s.table_columns = vec![Column::ZipCode, Column::MedianIncome];
        s.toggle_table_column(Column::PrimaryCity);
        assert_eq!(
            s.table_columns,
            vec![Column::ZipCode, Column::PrimaryCity, Column::MedianIncome]
        );
        s.toggle_table_column(Column::ZipCode);
        assert_eq!(s.table_columns, vec![Column::PrimaryCity, Column::MedianIncome]);
    }

    #[test]
    fn adding_a_column_keeps_default_order() {
        let mut s = state();
        s.toggle_table_column(Column::DensityScore);
        assert_eq!(
            s.table_columns,
            vec![
                Column::ZipCode,
                Column::PrimaryCity,
                Column::CompositeScore,
                Column::ScoreCategory,
                Column::DensityScore,
                Column::MedianIncome,
                Column::MedianHomeValue,
                Column::EstimatedPopulation,
            ]
        );
        s.toggle_table_column(Column::EducationPct);
        assert_eq!(s.table_columns.last(), Some(&Column::EducationPct));
    }

    #[test]
    fn missing_file_sets_status() {
        let mut s = AppState::default();
        s.load_path(Path::new("/no/such/zips.csv"));
        assert!(s.dataset.is_none());
        assert!(s.status_message.as_deref().is_some_and(|m| m.contains("Could not find")));
    }
}
