use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use regex::Regex;

use super::model::{CellValue, Column, ColumnType, Dataset};
use super::temporal::{self, ParsedTime};
use crate::error::FilterError;

/// Columns with fewer distinct non-null values than this are filtered by category.
pub const DEFAULT_CATEGORICAL_THRESHOLD: usize = 10;

/// Slider resolution: a numeric range is split into this many steps.
const SLIDER_STEPS: f64 = 100.0;

// ---------------------------------------------------------------------------
// Column kinds, user selections and filter specs
// ---------------------------------------------------------------------------

/// The semantic kind of a column, which decides what filter it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numeric,
    Temporal,
    Textual,
}

/// Whatever the user last chose for one column's filter widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Categories(BTreeSet<CellValue>),
    NumberRange { min: f64, max: f64 },
    DateRange { start: NaiveDateTime, end: NaiveDateTime },
    Pattern(String),
}

impl Selection {
    fn fits(&self, kind: ColumnKind) -> bool {
        matches!(
            (self, kind),
            (Selection::Categories(_), ColumnKind::Categorical)
                | (Selection::NumberRange { .. }, ColumnKind::Numeric)
                | (Selection::DateRange { .. }, ColumnKind::Temporal)
                | (Selection::Pattern(_), ColumnKind::Textual)
        )
    }
}

/// Per-column selections: column name → selection. Columns without an entry use
/// their kind's default.
pub type FilterSelections = BTreeMap<String, Selection>;

/// Tunables for kind inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub categorical_threshold: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
        }
    }
}

/// Substring-or-regex matcher for textual columns. Patterns that are not valid
/// regular expressions are matched literally.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    Regex(Regex),
    Literal(String),
}

impl TextMatcher {
    pub fn new(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => TextMatcher::Regex(re),
            Err(e) => {
                log::warn!("'{pattern}' is not a valid regex ({e}), matching it literally");
                TextMatcher::Literal(pattern.to_string())
            }
        }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            TextMatcher::Regex(re) => re.is_match(haystack),
            TextMatcher::Literal(s) => haystack.contains(s.as_str()),
        }
    }
}

/// The predicate a column filter applies to each cell.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// No constraint (empty text pattern).
    Any,
    /// Value is one of the allowed set.
    OneOf(BTreeSet<CellValue>),
    /// Numeric value within the inclusive range.
    Between { min: f64, max: f64 },
    /// Timestamp within the inclusive range.
    During { start: NaiveDateTime, end: NaiveDateTime },
    /// Text contains the pattern.
    Matches(TextMatcher),
}

/// A fully resolved filter for one column.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub column: String,
    pub kind: ColumnKind,
    pub predicate: Predicate,
}

impl FilterSpec {
    /// Does a single cell pass this filter?
    ///
    /// Nulls pass a categorical filter only when null is in the allowed set, and
    /// never pass range or pattern filters.
    pub fn matches(&self, value: &CellValue) -> bool {
        match &self.predicate {
            Predicate::Any => true,
            Predicate::OneOf(allowed) => allowed.contains(value),
            Predicate::Between { min, max } => value
                .as_f64()
                .is_some_and(|v| *min <= v && v <= *max),
            Predicate::During { start, end } => value
                .as_timestamp()
                .is_some_and(|t| *start <= t && t <= *end),
            Predicate::Matches(matcher) => match value {
                CellValue::Null => false,
                CellValue::Text(s) => matcher.is_match(s),
                other => matcher.is_match(&other.to_csv_field()),
            },
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.predicate, Predicate::Any)
    }
}

/// Describes the widget a presentation layer should draw for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    Categories {
        column: String,
        options: Vec<CellValue>,
    },
    NumberRange {
        column: String,
        min: f64,
        max: f64,
        step: f64,
    },
    DateRange {
        column: String,
        min: NaiveDateTime,
        max: NaiveDateTime,
    },
    Pattern {
        column: String,
    },
}

impl FilterControl {
    pub fn column(&self) -> &str {
        match self {
            FilterControl::Categories { column, .. }
            | FilterControl::NumberRange { column, .. }
            | FilterControl::DateRange { column, .. }
            | FilterControl::Pattern { column } => column,
        }
    }

    /// Whether `selection` has the shape this control edits.
    pub fn accepts(&self, selection: &Selection) -> bool {
        matches!(
            (self, selection),
            (FilterControl::Categories { .. }, Selection::Categories(_))
                | (FilterControl::NumberRange { .. }, Selection::NumberRange { .. })
                | (FilterControl::DateRange { .. }, Selection::DateRange { .. })
                | (FilterControl::Pattern { .. }, Selection::Pattern(_))
        )
    }

    /// The selection equivalent to "no narrowing yet" for this control.
    pub fn default_selection(&self) -> Selection {
        match self {
            FilterControl::Categories { options, .. } => {
                Selection::Categories(options.iter().cloned().collect())
            }
            FilterControl::NumberRange { min, max, .. } => Selection::NumberRange {
                min: *min,
                max: *max,
            },
            FilterControl::DateRange { min, max, .. } => Selection::DateRange {
                start: *min,
                end: *max,
            },
            FilterControl::Pattern { .. } => Selection::Pattern(String::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization pass
// ---------------------------------------------------------------------------

/// Parse a whole text column as timestamps. Succeeds only if every non-null cell
/// parses and the column does not mix zoned and zone-less values.
pub fn try_parse_temporal(column: &Column) -> Option<Column> {
    if column.dtype != ColumnType::Text || column.values.iter().all(CellValue::is_null) {
        return None;
    }

    let mut parsed = Vec::with_capacity(column.len());
    for value in &column.values {
        let cell = match value {
            CellValue::Null => CellValue::Null,
            CellValue::Text(s) => match temporal::parse_datetime(s)? {
                ParsedTime::Naive(dt) => CellValue::Timestamp(dt),
                ParsedTime::Zoned(dt) => CellValue::ZonedTimestamp(dt),
            },
            _ => return None,
        };
        parsed.push(cell);
    }

    let naive = parsed.iter().any(|v| matches!(v, CellValue::Timestamp(_)));
    let zoned = parsed.iter().any(|v| matches!(v, CellValue::ZonedTimestamp(_)));
    let dtype = match (naive, zoned) {
        (true, false) => ColumnType::Timestamp,
        (false, true) => ColumnType::ZonedTimestamp,
        _ => return None,
    };

    Some(Column {
        name: column.name.clone(),
        dtype,
        categorical: column.categorical,
        values: parsed,
    })
}

/// Drop the UTC offset from a zoned column, keeping wall-clock time.
fn strip_zone(column: &mut Column) {
    for v in &mut column.values {
        if let CellValue::ZonedTimestamp(dt) = v {
            *v = CellValue::Timestamp(dt.naive_local());
        }
    }
    column.dtype = ColumnType::Timestamp;
}

/// Return a copy of `dataset` with date-like text columns parsed and every
/// temporal column made zone-naive. Running it twice changes nothing further.
pub fn normalize(dataset: &Dataset) -> Dataset {
    let mut out = dataset.clone();
    for column in out.columns_mut() {
        if column.dtype == ColumnType::Text {
            if let Some(parsed) = try_parse_temporal(column) {
                log::debug!("column '{}' parsed as {:?}", column.name, parsed.dtype);
                *column = parsed;
            }
        }
        if column.dtype == ColumnType::ZonedTimestamp {
            strip_zone(column);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Kind inference and spec construction
// ---------------------------------------------------------------------------

/// Infer the kind of a (normalized) column.
pub fn infer_kind(column: &Column, options: &FilterOptions) -> ColumnKind {
    if column.categorical || column.distinct_count() < options.categorical_threshold {
        return ColumnKind::Categorical;
    }
    match column.dtype {
        ColumnType::Number => ColumnKind::Numeric,
        ColumnType::Timestamp | ColumnType::ZonedTimestamp => ColumnKind::Temporal,
        ColumnType::Text => ColumnKind::Textual,
    }
}

/// Describe the filter widget for a (normalized) column.
pub fn control_for(column: &Column, options: &FilterOptions) -> FilterControl {
    let name = column.name.clone();
    match infer_kind(column, options) {
        ColumnKind::Categorical => FilterControl::Categories {
            column: name,
            options: column.distinct_values().into_iter().collect(),
        },
        ColumnKind::Numeric => {
            // Numeric kind implies at least `threshold` distinct values, so bounds exist.
            let (min, max) = column.numeric_bounds().unwrap_or((0.0, 0.0));
            FilterControl::NumberRange {
                column: name,
                min,
                max,
                step: (max - min) / SLIDER_STEPS,
            }
        }
        ColumnKind::Temporal => match column.timestamp_bounds() {
            Some((min, max)) => FilterControl::DateRange {
                column: name,
                min,
                max,
            },
            None => FilterControl::Pattern { column: name },
        },
        ColumnKind::Textual => FilterControl::Pattern { column: name },
    }
}

/// Resolve the user's selection for `column` into a concrete [`FilterSpec`],
/// falling back to the kind's default when there is none or it does not fit.
pub fn build_spec(
    column: &Column,
    selection: Option<&Selection>,
    options: &FilterOptions,
) -> FilterSpec {
    let control = control_for(column, options);
    let kind = infer_kind(column, options);

    let selection = match selection {
        Some(sel) if sel.fits(kind) => sel.clone(),
        Some(sel) => {
            log::warn!(
                "ignoring {sel:?} for column '{}': column is {kind:?}",
                column.name
            );
            control.default_selection()
        }
        None => control.default_selection(),
    };

    let predicate = match selection {
        Selection::Categories(allowed) => Predicate::OneOf(allowed),
        Selection::NumberRange { min, max } => Predicate::Between { min, max },
        Selection::DateRange { start, end } => Predicate::During { start, end },
        Selection::Pattern(p) if p.is_empty() => Predicate::Any,
        Selection::Pattern(p) => Predicate::Matches(TextMatcher::new(&p)),
    };

    FilterSpec {
        column: column.name.clone(),
        kind,
        predicate,
    }
}

// ---------------------------------------------------------------------------
// Engine entry points
// ---------------------------------------------------------------------------

/// Filter widgets for each selected column, in selection order.
pub fn filter_controls(
    dataset: &Dataset,
    selected: &[String],
    options: &FilterOptions,
) -> Result<Vec<FilterControl>, FilterError> {
    let normalized = normalize(dataset);
    selected
        .iter()
        .map(|name| {
            normalized
                .column(name)
                .map(|col| control_for(col, options))
                .ok_or_else(|| FilterError::UnknownColumn(name.clone()))
        })
        .collect()
}

/// Normalize a copy of `dataset` and keep the rows that pass every selected
/// column's filter.
///
/// Kinds and defaults are derived from the normalized, unfiltered columns, so
/// the result does not depend on the order of `selected`. With no selected
/// columns this returns the normalized dataset unchanged.
pub fn apply_filters(
    dataset: &Dataset,
    selected: &[String],
    selections: &FilterSelections,
    options: &FilterOptions,
) -> Result<Dataset, FilterError> {
    let normalized = normalize(dataset);

    let specs = selected
        .iter()
        .map(|name| {
            let column = normalized
                .column(name)
                .ok_or_else(|| FilterError::UnknownColumn(name.clone()))?;
            Ok(build_spec(column, selections.get(name), options))
        })
        .collect::<Result<Vec<_>, FilterError>>()?;

    let mut positions: Vec<usize> = (0..normalized.len()).collect();
    for spec in specs.iter().filter(|s| s.is_active()) {
        let Some(column) = normalized.column(&spec.column) else {
            continue;
        };
        let before = positions.len();
        positions.retain(|&p| spec.matches(&column.values[p]));
        log::debug!(
            "filter on '{}' ({:?}): {before} -> {} rows",
            spec.column,
            spec.kind,
            positions.len()
        );
    }

    if positions.len() == normalized.len() {
        return Ok(normalized);
    }
    Ok(normalized.take(&positions))
}
