use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use super::temporal::{self, ParsedTime};
use crate::error::DatasetError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the tracker table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used as a `BTreeSet` key by the categorical filter, so it must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    /// A parsed number with the field text it was read from. Equality and order
    /// use `value`; saving writes `text` back unchanged.
    Number { value: f64, text: String },
    Timestamp(NaiveDateTime),
    ZonedTimestamp(DateTime<FixedOffset>),
    Null,
}

impl CellValue {
    fn discriminant(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Number { .. } => 1,
            CellValue::Timestamp(_) => 2,
            CellValue::ZonedTimestamp(_) => 3,
            CellValue::Text(_) => 4,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Zone-naive view of a temporal cell. Zoned values keep their wall-clock time.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(dt) => Some(*dt),
            CellValue::ZonedTimestamp(dt) => Some(dt.naive_local()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The text written to CSV and shown in the table editor. Null is empty.
    pub fn to_csv_field(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number { text, .. } => text.clone(),
            CellValue::Timestamp(dt) => temporal::format_naive(dt),
            CellValue::ZonedTimestamp(dt) => temporal::format_zoned(dt),
            CellValue::Null => String::new(),
        }
    }

    fn fits(&self, dtype: ColumnType) -> bool {
        matches!(
            (self, dtype),
            (CellValue::Null, _)
                | (CellValue::Text(_), ColumnType::Text)
                | (CellValue::Number { .. }, ColumnType::Number)
                | (CellValue::Timestamp(_), ColumnType::Timestamp)
                | (CellValue::ZonedTimestamp(_), ColumnType::ZonedTimestamp)
        )
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number {
            value,
            text: value.to_string(),
        }
    }
}

// -- Manual Eq/Ord/Hash so CellValue can live in BTreeSet / HashSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        let da = self.discriminant();
        let db = other.discriminant();
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Number { value: a, .. }, Number { value: b, .. }) => a.total_cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (ZonedTimestamp(a), ZonedTimestamp(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Number { value, .. } => value.to_bits().hash(state),
            CellValue::Timestamp(dt) => dt.hash(state),
            // Zoned values compare by instant, so hash the instant.
            CellValue::ZonedTimestamp(dt) => dt.naive_utc().hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "<empty>"),
            other => write!(f, "{}", other.to_csv_field()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

/// Storage type of a column, mirroring the handful of dtypes a CSV can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Number,
    Timestamp,
    ZonedTimestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    /// Explicitly marked categorical, independent of how many distinct values it holds.
    pub categorical: bool,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            dtype,
            categorical: false,
            values,
        }
    }

    /// Build a column from raw CSV fields. Empty fields become null; the column is
    /// numeric when every non-null field parses as a finite number, text otherwise.
    pub fn from_raw(name: impl Into<String>, raw: Vec<String>) -> Self {
        let numeric = raw
            .iter()
            .filter(|s| !s.trim().is_empty())
            .all(|s| parse_number(s).is_some());
        let has_values = raw.iter().any(|s| !s.trim().is_empty());

        if numeric && has_values {
            let values = raw
                .iter()
                .map(|s| number_cell(s).unwrap_or(CellValue::Null))
                .collect();
            return Self::new(name, ColumnType::Number, values);
        }

        let values = raw
            .into_iter()
            .map(|s| {
                if s.trim().is_empty() {
                    CellValue::Null
                } else {
                    CellValue::Text(s)
                }
            })
            .collect();
        Self::new(name, ColumnType::Text, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Sorted set of every value present, null included.
    pub fn distinct_values(&self) -> BTreeSet<CellValue> {
        self.values.iter().cloned().collect()
    }

    /// Number of distinct non-null values.
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .collect::<HashSet<_>>()
            .len()
    }

    /// `(min, max)` over the numeric cells, ignoring nulls.
    pub fn numeric_bounds(&self) -> Option<(f64, f64)> {
        self.values.iter().filter_map(CellValue::as_f64).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// `(earliest, latest)` over the temporal cells, ignoring nulls.
    pub fn timestamp_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.values
            .iter()
            .filter_map(CellValue::as_timestamp)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Interpret user-typed text as a value of this column's type.
    /// Returns `None` when the text does not fit.
    pub fn parse_cell(&self, text: &str) -> Option<CellValue> {
        if text.trim().is_empty() {
            return Some(CellValue::Null);
        }
        match self.dtype {
            ColumnType::Text => Some(CellValue::Text(text.to_string())),
            ColumnType::Number => number_cell(text),
            ColumnType::Timestamp => match temporal::parse_datetime(text)? {
                ParsedTime::Naive(dt) => Some(CellValue::Timestamp(dt)),
                ParsedTime::Zoned(dt) => Some(CellValue::Timestamp(dt.naive_local())),
            },
            ColumnType::ZonedTimestamp => match temporal::parse_datetime(text)? {
                ParsedTime::Zoned(dt) => Some(CellValue::ZonedTimestamp(dt)),
                ParsedTime::Naive(_) => None,
            },
        }
    }

    /// Store `value` at `row`, demoting the column to text if the value does not
    /// fit the current type.
    pub fn assign(&mut self, row: usize, value: CellValue) {
        if !value.fits(self.dtype) {
            self.demote_to_text();
        }
        let value = match (value, self.dtype) {
            (CellValue::Null, _) => CellValue::Null,
            (v, ColumnType::Text) if v.as_text().is_none() => CellValue::Text(v.to_csv_field()),
            (v, _) => v,
        };
        self.values[row] = value;
    }

    /// Convert every cell to its textual form.
    pub fn demote_to_text(&mut self) {
        if self.dtype == ColumnType::Text {
            return;
        }
        log::debug!("column '{}' demoted from {:?} to text", self.name, self.dtype);
        for v in &mut self.values {
            if !v.is_null() && v.as_text().is_none() {
                *v = CellValue::Text(v.to_csv_field());
            }
        }
        self.dtype = ColumnType::Text;
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric cell keeping the trimmed field text, so `007` saves as `007`.
fn number_cell(s: &str) -> Option<CellValue> {
    parse_number(s).map(|value| CellValue::Number {
        value,
        text: s.trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Edit – one cell change made in a (possibly filtered) view
// ---------------------------------------------------------------------------

/// A cell edit addressed by stable row index, so it can be replayed against both
/// a filtered view and the full dataset it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub index: usize,
    pub column: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Dataset – the complete table
// ---------------------------------------------------------------------------

/// An ordered set of equally long named columns. Every row carries the index it
/// had when loaded; filtered views keep those indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    index: Vec<usize>,
}

impl Dataset {
    /// Build a dataset with rows indexed `0..n`.
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let rows = columns.first().map_or(0, Column::len);
        Self::with_index(columns, (0..rows).collect())
    }

    pub fn with_index(columns: Vec<Column>, index: Vec<usize>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        for (pos, col) in columns.iter().enumerate() {
            if col.name.trim().is_empty() {
                return Err(DatasetError::UnnamedColumn(pos));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != index.len() {
                return Err(DatasetError::LengthMismatch {
                    column: col.name.clone(),
                    expected: index.len(),
                    found: col.len(),
                });
            }
        }
        Ok(Self { columns, index })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Stable row indices, in row order.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Position of the row carrying `index`, if present.
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.index.iter().position(|&i| i == index)
    }

    /// Cells of the row at `pos`, in column order.
    pub fn row(&self, pos: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.columns.iter().map(move |c| &c.values[pos])
    }

    /// Keep only the rows at the given positions (in the given order).
    pub fn take(&self, positions: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype,
                categorical: c.categorical,
                values: positions.iter().map(|&p| c.values[p].clone()).collect(),
            })
            .collect();
        Dataset {
            columns,
            index: positions.iter().map(|&p| self.index[p]).collect(),
        }
    }

    /// Append a row of nulls and return its index (one past the largest in use).
    pub fn append_blank_row(&mut self) -> usize {
        let index = self.index.iter().max().map_or(0, |&i| i + 1);
        for col in &mut self.columns {
            col.values.push(CellValue::Null);
        }
        self.index.push(index);
        index
    }

    /// Flag the named columns as categorical. Unknown names are ignored.
    pub fn mark_categorical<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            if let Some(col) = self.column_mut(name.as_ref()) {
                col.categorical = true;
            }
        }
    }

    /// Apply a single cell edit. The text is parsed according to the column type;
    /// a value that does not fit demotes the column to text.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<(), DatasetError> {
        let pos = self
            .position_of(edit.index)
            .ok_or(DatasetError::UnknownRow(edit.index))?;
        let column = self
            .column_mut(&edit.column)
            .ok_or_else(|| DatasetError::UnknownColumn(edit.column.clone()))?;

        let value = column
            .parse_cell(&edit.text)
            .unwrap_or_else(|| CellValue::Text(edit.text.clone()));
        column.assign(pos, value);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a text/number dataset from string columns, the way the CSV store does.
    pub(crate) fn dataset(columns: &[(&str, &[&str])]) -> Dataset {
        Dataset::new(
            columns
                .iter()
                .map(|(name, vals)| {
                    Column::from_raw(*name, vals.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn from_raw_infers_numbers_and_nulls() {
        let col = Column::from_raw("Pages", vec!["3".into(), "".into(), "4.5".into()]);
        assert_eq!(col.dtype, ColumnType::Number);
        assert_eq!(
            col.values,
            vec![CellValue::from(3.0), CellValue::Null, CellValue::from(4.5)]
        );

        let col = Column::from_raw("State", vec!["Done".into(), "3".into()]);
        assert_eq!(col.dtype, ColumnType::Text);

        let col = Column::from_raw("Empty", vec!["".into(), " ".into()]);
        assert_eq!(col.dtype, ColumnType::Text);
        assert!(col.values.iter().all(CellValue::is_null));
    }

    #[test]
    fn distinct_count_ignores_nulls() {
        let col = Column::from_raw("State", vec!["a".into(), "".into(), "a".into(), "b".into()]);
        assert_eq!(col.distinct_count(), 2);
        assert_eq!(col.distinct_values().len(), 3);
    }

    #[test]
    fn ordering_is_total_across_variants() {
        let mut set = BTreeSet::new();
        set.insert(CellValue::Text("b".into()));
        set.insert(CellValue::from(f64::NAN));
        set.insert(CellValue::Null);
        set.insert(CellValue::from(1.0));
        set.insert(CellValue::Text("a".into()));
        let order: Vec<_> = set.into_iter().collect();
        assert_eq!(order[0], CellValue::Null);
        assert_eq!(order[1], CellValue::from(1.0));
        assert_eq!(order[4], CellValue::Text("b".into()));
    }

    #[test]
    fn new_rejects_ragged_and_duplicate_columns() {
        let a = Column::from_raw("A", vec!["1".into()]);
        let b = Column::from_raw("B", vec!["1".into(), "2".into()]);
        assert!(matches!(
            Dataset::new(vec![a.clone(), b]),
            Err(DatasetError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Dataset::new(vec![a.clone(), a]),
            Err(DatasetError::DuplicateColumn(_))
        ));
        let unnamed = Column::from_raw("", vec![]);
        assert!(matches!(
            Dataset::new(vec![unnamed]),
            Err(DatasetError::UnnamedColumn(0))
        ));
    }

    #[test]
    fn take_preserves_row_indices() {
        let ds = dataset(&[("State", &["a", "b", "c", "d"])]);
        let view = ds.take(&[1, 3]);
        assert_eq!(view.index(), &[1, 3]);
        assert_eq!(view.position_of(3), Some(1));
        assert_eq!(view.position_of(0), None);
        let row: Vec<_> = view.row(1).cloned().collect();
        assert_eq!(row, vec![CellValue::from("d")]);
    }

    #[test]
    fn apply_edit_targets_row_index_not_position() {
        let ds = dataset(&[("State", &["Backlog", "Backlog", "Done"])]);
        let mut view = ds.take(&[2]);
        let mut full = ds.clone();
        let edit = Edit {
            index: 2,
            column: "State".into(),
            text: "In Progress".into(),
        };
        view.apply_edit(&edit).unwrap();
        full.apply_edit(&edit).unwrap();
        assert_eq!(view.column("State").unwrap().values[0], CellValue::from("In Progress"));
        assert_eq!(full.column("State").unwrap().values[2], CellValue::from("In Progress"));
        assert_eq!(full.column("State").unwrap().values[0], CellValue::from("Backlog"));
    }

    #[test]
    fn apply_edit_demotes_column_when_value_does_not_fit() {
        let mut ds = dataset(&[("Pages", &["1", "2"])]);
        ds.apply_edit(&Edit {
            index: 0,
            column: "Pages".into(),
            text: "many".into(),
        })
        .unwrap();
        let col = ds.column("Pages").unwrap();
        assert_eq!(col.dtype, ColumnType::Text);
        assert_eq!(col.values, vec![CellValue::from("many"), CellValue::from("2")]);
    }

    #[test]
    fn apply_edit_reports_unknown_targets() {
        let mut ds = dataset(&[("State", &["a"])]);
        let edit = Edit {
            index: 5,
            column: "State".into(),
            text: "b".into(),
        };
        assert!(matches!(ds.apply_edit(&edit), Err(DatasetError::UnknownRow(5))));
        let edit = Edit {
            index: 0,
            column: "Nope".into(),
            text: "b".into(),
        };
        assert!(matches!(ds.apply_edit(&edit), Err(DatasetError::UnknownColumn(_))));
    }

    #[test]
    fn appended_rows_get_fresh_indices() {
        let ds = dataset(&[("State", &["a", "b", "c"])]);
        let mut view = ds.take(&[0, 2]);
        assert_eq!(view.append_blank_row(), 3);
        assert_eq!(view.len(), 3);
        assert!(view.column("State").unwrap().values[2].is_null());
    }

    #[test]
    fn empty_edit_clears_the_cell() {
        let mut ds = dataset(&[("Notes", &["x"])]);
        ds.apply_edit(&Edit {
            index: 0,
            column: "Notes".into(),
            text: String::new(),
        })
        .unwrap();
        assert!(ds.column("Notes").unwrap().values[0].is_null());
    }

    #[test]
    fn numbers_keep_their_field_text() {
        let mut ds = dataset(&[("Epic", &["007", "1e3"])]);
        let col = ds.column("Epic").unwrap();
        assert_eq!(col.values[0].as_f64(), Some(7.0));
        assert_eq!(col.values[0].to_csv_field(), "007");
        assert_eq!(col.values[1], CellValue::from(1000.0));
        assert_eq!(col.values[1].to_csv_field(), "1e3");

        ds.apply_edit(&Edit {
            index: 1,
            column: "Epic".into(),
            text: " 2.50 ".into(),
        })
        .unwrap();
        let col = ds.column("Epic").unwrap();
        assert_eq!(col.dtype, ColumnType::Number);
        assert_eq!(col.values[1].to_csv_field(), "2.50");
    }
}
