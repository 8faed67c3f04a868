use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::config::TrackerConfig;
use crate::data::aggregate::{self, CategorySummary};
use crate::data::filter::{
    apply_filters, filter_controls, FilterControl, FilterSelections, Selection,
};
use crate::data::model::{Dataset, Edit};
use crate::data::store;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: TrackerConfig,

    /// CSV file the dataset was loaded from and is saved to.
    pub data_path: PathBuf,

    /// Full dataset, including unsaved edits (None until a file loads).
    pub dataset: Option<Dataset>,

    /// "Add filters" gate. When off the view is the whole dataset.
    pub filters_enabled: bool,

    /// Columns the user chose to filter on, in the order they were added.
    pub filter_columns: Vec<String>,

    /// Per-column widget values. Columns without an entry use their defaults.
    pub selections: FilterSelections,

    /// Filter widgets for `filter_columns` (cached).
    pub controls: Vec<FilterControl>,

    /// Rows passing the current filters (cached).
    pub view: Option<Dataset>,

    /// Whether the dataset has edits not yet written to disk.
    pub dirty: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Colours for the status column.
    pub color_map: ColorMap,
}

impl AppState {
    pub fn new(config: TrackerConfig) -> Self {
        let color_map = ColorMap::new(&config.status_column, &config.statuses);
        Self {
            data_path: config.data_path.clone(),
            config,
            dataset: None,
            filters_enabled: false,
            filter_columns: Vec::new(),
            selections: FilterSelections::new(),
            controls: Vec::new(),
            view: None,
            dirty: false,
            status_message: None,
            color_map,
        }
    }

    /// Load `path` and make it the current file.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let dataset = store::load_csv(path)
            .with_context(|| format!("opening {}", path.display()))?;
        self.data_path = path.to_path_buf();
        self.set_dataset(dataset);
        Ok(())
    }

    /// Re-read the current file, discarding unsaved edits.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.data_path.clone();
        self.open(&path)
    }

    /// Ingest a newly loaded dataset and re-derive the filtered view.
    pub fn set_dataset(&mut self, mut dataset: Dataset) {
        dataset.mark_categorical(&self.config.categorical_columns);

        let names = dataset.column_names();
        self.filter_columns.retain(|c| names.contains(c));
        self.selections.retain(|c, _| names.contains(c));

        self.dataset = Some(dataset);
        self.dirty = false;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the filter widgets and `view` after any change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let selected: &[String] = if self.filters_enabled {
            &self.filter_columns
        } else {
            &[]
        };
        let options = self.config.filter_options();

        let result = filter_controls(ds, selected, &options).and_then(|controls| {
            apply_filters(ds, selected, &self.selections, &options).map(|view| (controls, view))
        });
        match result {
            Ok((controls, view)) => {
                self.controls = controls;
                self.view = Some(view);
            }
            Err(e) => {
                log::error!("Filtering failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.controls.clear();
                self.view = Some(ds.clone());
            }
        }
    }

    pub fn set_filters_enabled(&mut self, enabled: bool) {
        self.filters_enabled = enabled;
        self.refilter();
    }

    pub fn add_filter_column(&mut self, column: &str) {
        if !self.filter_columns.iter().any(|c| c == column) {
            self.filter_columns.push(column.to_string());
            self.refilter();
        }
    }

    pub fn remove_filter_column(&mut self, column: &str) {
        self.filter_columns.retain(|c| c != column);
        self.selections.remove(column);
        self.refilter();
    }

    pub fn set_selection(&mut self, column: &str, selection: Selection) {
        self.selections.insert(column.to_string(), selection);
        self.refilter();
    }

    /// Forget the user's choice for `column`, going back to the default.
    pub fn reset_selection(&mut self, column: &str) {
        self.selections.remove(column);
        self.refilter();
    }

    /// Current selection for a control: the user's choice if it still fits, else the default.
    pub fn selection_for(&self, control: &FilterControl) -> Selection {
        self.selections
            .get(control.column())
            .filter(|s| control.accepts(s))
            .cloned()
            .unwrap_or_else(|| control.default_selection())
    }

    /// Apply an edit made in the table to the full dataset, then re-derive the view.
    pub fn commit_edit(&mut self, edit: Edit) -> Result<()> {
        let ds = self.dataset.as_mut().context("no dataset loaded")?;
        ds.apply_edit(&edit)
            .with_context(|| format!("editing row {} of '{}'", edit.index, edit.column))?;
        log::debug!("row {} '{}' set to {:?}", edit.index, edit.column, edit.text);
        self.dirty = true;
        self.refilter();
        Ok(())
    }

    /// Append a task with the default status.
    pub fn add_task(&mut self) -> Result<()> {
        let ds = self.dataset.as_mut().context("no dataset loaded")?;
        let index = ds.append_blank_row();
        let has_status = ds.column(&self.config.status_column).is_some();
        self.dirty = true;

        let status = self
            .config
            .default_status()
            .filter(|_| has_status)
            .map(str::to_string);
        match status {
            Some(text) => self.commit_edit(Edit {
                index,
                column: self.config.status_column.clone(),
                text,
            }),
            None => {
                self.refilter();
                Ok(())
            }
        }
    }

    /// Write the dataset to the current file and read it back.
    pub fn save(&mut self) -> Result<()> {
        let ds = self.dataset.as_ref().context("no dataset loaded")?;
        store::save_csv(ds, &self.data_path)
            .with_context(|| format!("saving {}", self.data_path.display()))?;
        self.reload()?;
        self.status_message = Some(format!("Saved to {}", self.data_path.display()));
        Ok(())
    }

    /// Write to `path` and make it the current file once the write succeeded.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let ds = self.dataset.as_ref().context("no dataset loaded")?;
        store::save_csv(ds, path).with_context(|| format!("saving {}", path.display()))?;
        self.data_path = path.to_path_buf();
        self.reload()?;
        self.status_message = Some(format!("Saved to {}", self.data_path.display()));
        Ok(())
    }

    /// Row counts per configured status over the full dataset.
    pub fn status_summary(&self) -> Option<CategorySummary> {
        let ds = self.dataset.as_ref()?;
        Some(aggregate::summarize(
            ds,
            &self.config.status_column,
            &self.config.statuses,
        ))
    }

    /// Row counts per configured assignee over the full dataset.
    pub fn assignee_summary(&self) -> Option<CategorySummary> {
        let ds = self.dataset.as_ref()?;
        Some(aggregate::summarize(
            ds,
            &self.config.assignee_column,
            &self.config.assignees,
        ))
    }

    /// Column names of `ds` in display order: configured columns first, then the rest.
    pub fn display_columns(&self, ds: &Dataset) -> Vec<String> {
        let names = ds.column_names();
        let mut ordered: Vec<String> = self
            .config
            .column_order
            .iter()
            .filter(|c| names.contains(c))
            .cloned()
            .collect();
        for name in names {
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        ordered
    }

    /// Record the outcome of a user action in the status line.
    pub fn report(&mut self, action: &str, result: Result<()>) {
        if let Err(e) = result {
            log::error!("{action} failed: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
