use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::filter::{FilterOptions, DEFAULT_CATEGORICAL_THRESHOLD};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Tracker configuration
// ---------------------------------------------------------------------------

/// Everything the dashboard needs to know about the tracker file. Every field
/// has a default, so a config file only has to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// CSV file holding the tasks.
    pub data_path: PathBuf,
    pub title: String,
    pub subtitle: String,
    /// Column holding each task's workflow state.
    pub status_column: String,
    /// Workflow states, in display order.
    pub statuses: Vec<String>,
    /// Column holding the person a task is assigned to.
    pub assignee_column: String,
    pub assignees: Vec<String>,
    /// Columns shown first, in this order. Remaining columns follow in file order.
    pub column_order: Vec<String>,
    /// Columns always filtered by category, however many distinct values they hold.
    pub categorical_columns: Vec<String>,
    pub categorical_threshold: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("folder/out.csv"),
            title: "Migration Tracker".to_string(),
            subtitle: "Track the migration status of individual pages".to_string(),
            status_column: "State".to_string(),
            statuses: strings(&[
                "Backlog",
                "In Progress",
                "Content Review",
                "Client Review",
                "Done",
            ]),
            assignee_column: "Users".to_string(),
            assignees: strings(&["Jim", "Sarah P", "Sarah C", "Braden"]),
            column_order: strings(&[
                "State",
                "Users",
                "Notes",
                "Legacy URL",
                "New URL",
                "Title",
                "Suggested Title",
                "Jira Epic",
            ]),
            categorical_columns: Vec::new(),
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TrackerConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categorical_threshold == 0 {
            return Err(ConfigError::Invalid(
                "categorical_threshold must be at least 1".to_string(),
            ));
        }
        if self.status_column.trim().is_empty() {
            return Err(ConfigError::Invalid("status_column must not be empty".to_string()));
        }
        Ok(())
    }

    /// Default value for a freshly created status cell.
    pub fn default_status(&self) -> Option<&str> {
        self.statuses.first().map(String::as_str)
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            categorical_threshold: self.categorical_threshold,
        }
    }

    /// Options offered by the table editor for `column`, if it is a pick-list column.
    pub fn choices_for(&self, column: &str) -> Option<&[String]> {
        if column == self.status_column {
            Some(&self.statuses)
        } else if column == self.assignee_column {
            Some(&self.assignees)
        } else {
            None
        }
    }
}
