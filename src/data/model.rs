use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value. Cells start out as `Str` when the file is
/// parsed; declared numeric columns are coerced to `Int` / `Float` and the
/// date-like column is normalized back to `Str`.
///
/// Grouping and unique-value indexing put values in `BTreeSet`s and hash
/// maps, so `Value` must be `Ord` and `Hash` despite containing floats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

// -- Manual Eq/Ord/Hash so Value can key group maps and BTreeSets --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Int(_) => 0,
                Float(_) => 1,
                Str(_) => 2,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Str(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Value {
    /// Interpret the value as `f64` for aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(i) => Some(*i as f64),
            Value::Str(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnSpec – which columns need coercion on load
// ---------------------------------------------------------------------------

/// Selects numeric columns either by exact name or by the "name contains a
/// marker substring" convention used by wide files with repeated bracket
/// columns (age brackets, blood types, ...).
#[derive(Debug, Clone)]
pub enum NumericColumns {
    Named(String),
    Containing(String),
}

impl NumericColumns {
    pub(crate) fn matches(&self, column: &str) -> bool {
        match self {
            NumericColumns::Named(name) => column == name,
            NumericColumns::Containing(marker) => column.contains(marker),
        }
    }
}

/// Declares, per call site, which columns the loader must coerce.
#[derive(Debug, Clone, Default)]
pub struct ColumnSpec {
    /// A date-like key column to normalize to an 8-character digit string.
    pub date_column: Option<String>,
    /// Columns whose cells are coerced to `Int` / `Float`.
    pub numeric: Vec<NumericColumns>,
}

// ---------------------------------------------------------------------------
// Table – the loaded dataset
// ---------------------------------------------------------------------------

/// An immutable loaded table: ordered column names plus rows of cells.
///
/// Invariant: every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Header names, trimmed, in file order.
    pub columns: Vec<String>,
    /// Row-major cells.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Position of a column by (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column name), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Sorted set of unique values in a column. Useful for populating
    /// selection widgets and for diagnostics when a filter matches nothing.
    pub fn unique_values(&self, column: &str) -> Option<BTreeSet<Value>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r[idx].clone()).collect())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_ordering_is_total_over_floats() {
        let mut vals = vec![
            Value::Float(2.0),
            Value::Float(f64::NAN),
            Value::Float(1.0),
        ];
        vals.sort();
        assert_eq!(vals[0], Value::Float(1.0));
        assert_eq!(vals[1], Value::Float(2.0));
    }

    #[test]
    fn unique_values_deduplicates() {
        let table = Table {
            columns: vec!["line".into()],
            rows: vec![
                vec![Value::Str("2호선".into())],
                vec![Value::Str("1호선".into())],
                vec![Value::Str("2호선".into())],
            ],
        };
        let unique = table.unique_values("line").unwrap();
        assert_eq!(unique.len(), 2);
        assert!(table.unique_values("nope").is_none());
    }

    #[test]
    fn numeric_selector_matches_by_name_and_marker() {
        assert!(NumericColumns::Named("pop".into()).matches("pop"));
        assert!(!NumericColumns::Named("pop".into()).matches("pop_total"));
        assert!(NumericColumns::Containing("계_".into()).matches("2025_계_0~9세"));
    }
}
