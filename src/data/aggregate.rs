use std::collections::BTreeMap;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Value counts per category
// ---------------------------------------------------------------------------

/// Row counts per distinct (non-null) value of one column, keyed by the value's
/// text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueCounts {
    counts: BTreeMap<String, usize>,
}

impl ValueCounts {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Count rows per value of `column`. `None` if the column does not exist.
pub fn value_counts(dataset: &Dataset, column: &str) -> Option<ValueCounts> {
    let col = dataset.column(column)?;
    let mut counts = BTreeMap::new();
    for v in col.values.iter().filter(|v| !v.is_null()) {
        *counts.entry(v.to_csv_field()).or_insert(0) += 1;
    }
    Some(ValueCounts { counts })
}

/// Count for `key`, or 0 if it never occurs.
pub fn count_of(counts: &ValueCounts, key: &str) -> usize {
    counts.counts.get(key).copied().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Summary over a fixed list of categories (metric cards)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySummary {
    /// `(category, count)` in the order the categories were requested.
    pub entries: Vec<(String, usize)>,
    /// Non-null rows whose value is not one of the requested categories.
    pub other: usize,
    /// All rows in the dataset.
    pub total: usize,
}

/// Count rows of `column` for each of `categories`. A missing column counts as
/// zero everywhere.
pub fn summarize<S: AsRef<str>>(
    dataset: &Dataset,
    column: &str,
    categories: &[S],
) -> CategorySummary {
    let counts = value_counts(dataset, column).unwrap_or_default();
    let entries: Vec<(String, usize)> = categories
        .iter()
        .map(|c| (c.as_ref().to_string(), count_of(&counts, c.as_ref())))
        .collect();
    let listed: usize = entries.iter().map(|(_, n)| n).sum();
    CategorySummary {
        other: counts.total().saturating_sub(listed),
        entries,
        total: dataset.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::dataset;

    #[test]
    fn absent_category_counts_as_zero() {
        let ds = dataset(&[("State", &["Backlog", "Done", "Backlog"])]);
        let counts = value_counts(&ds, "State").unwrap();
        assert_eq!(count_of(&counts, "Backlog"), 2);
        assert_eq!(count_of(&counts, "Done"), 1);
        assert_eq!(count_of(&counts, "In Progress"), 0);
    }

    #[test]
    fn unknown_column_has_no_counts() {
        let ds = dataset(&[("State", &["Backlog"])]);
        assert!(value_counts(&ds, "Users").is_none());
    }

    #[test]
    fn nulls_are_not_counted() {
        let ds = dataset(&[("Users", &["Jim", "", "Jim", "Braden"])]);
        let counts = value_counts(&ds, "Users").unwrap();
        assert_eq!(counts.total(), 3);
        assert_eq!(count_of(&counts, "Jim"), 2);
        assert_eq!(count_of(&counts, ""), 0);
    }

    #[test]
    fn summary_follows_requested_order() {
        let ds = dataset(&[("State", &["Done", "Backlog", "Done", "Archived", ""])]);
        let summary = summarize(&ds, "State", &["Backlog", "In Progress", "Done"]);
        assert_eq!(
            summary.entries,
            vec![
                ("Backlog".to_string(), 1),
                ("In Progress".to_string(), 0),
                ("Done".to_string(), 2),
            ]
        );
        assert_eq!(summary.other, 1);
        assert_eq!(summary.total, 5);
    }

    #[test]
    fn summary_of_missing_column_is_all_zero() {
        let ds = dataset(&[("State", &["Done"])]);
        let summary = summarize(&ds, "Users", &["Jim", "Braden"]);
        assert!(summary.entries.iter().all(|(_, n)| *n == 0));
        assert_eq!(summary.other, 0);
        assert_eq!(summary.total, 1);
    }
}
