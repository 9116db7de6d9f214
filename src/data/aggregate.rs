use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::model::{Table, Value};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Aggregation results
// ---------------------------------------------------------------------------

/// How to summarize the numeric columns of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agg {
    Sum,
    Mean,
}

/// One group of an [`AggregationResult`]: the group key (one value per
/// `group_by` column) and one summarized number per value column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: Vec<Value>,
    pub values: Vec<f64>,
}

impl AggregateRow {
    /// Human-readable group label for axis ticks and table rows.
    pub fn label(&self) -> String {
        self.key
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Groups in rank order: sorted descending by the first value column, ties
/// broken by first appearance in the table. The position in this sequence is
/// the rank the colorizer works from, so the order must be deterministic.
pub type AggregationResult = Vec<AggregateRow>;

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

fn require_column(table: &Table, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| Error::Column {
        column: name.to_string(),
        available: table.columns.clone(),
    })
}

fn cell_as_f64(table: &Table, row_no: usize, idx: usize) -> Result<f64> {
    let cell = &table.rows[row_no][idx];
    cell.as_f64().ok_or_else(|| Error::DataFormat {
        column: table.columns[idx].clone(),
        row: row_no,
        value: cell.to_string(),
    })
}

/// Group rows by exact equality on `group_by`, then sum or average each of
/// `value_columns` per group. An empty table yields an empty result.
pub fn aggregate(
    table: &Table,
    group_by: &[&str],
    value_columns: &[&str],
    agg: Agg,
) -> Result<AggregationResult> {
    if group_by.is_empty() {
        return Err(Error::Value("group_by must name at least one column".to_string()));
    }
    if value_columns.is_empty() {
        return Err(Error::Value("value_columns must name at least one column".to_string()));
    }

    let key_idx: Vec<usize> = group_by
        .iter()
        .map(|col| require_column(table, col))
        .collect::<Result<_>>()?;
    let value_idx: Vec<usize> = value_columns
        .iter()
        .map(|col| require_column(table, col))
        .collect::<Result<_>>()?;

    // Groups are appended in first-seen order; the stable sort below keeps
    // that order for ties.
    let mut groups: Vec<AggregateRow> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut slot_by_key: HashMap<Vec<Value>, usize> = HashMap::new();

    for (row_no, row) in table.rows.iter().enumerate() {
        let key: Vec<Value> = key_idx.iter().map(|&i| row[i].clone()).collect();
        let slot = match slot_by_key.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                slot_by_key.insert(key.clone(), slot);
                groups.push(AggregateRow {
                    key,
                    values: vec![0.0; value_idx.len()],
                });
                counts.push(0);
                slot
            }
        };
        for (j, &idx) in value_idx.iter().enumerate() {
            groups[slot].values[j] += cell_as_f64(table, row_no, idx)?;
        }
        counts[slot] += 1;
    }

    if agg == Agg::Mean {
        for (group, &count) in groups.iter_mut().zip(&counts) {
            for value in &mut group.values {
                *value /= count as f64;
            }
        }
    }

    groups.sort_by(|a, b| b.values[0].total_cmp(&a.values[0]));
    Ok(groups)
}

/// Select the rows where every `filters` entry matches exactly, then sum each
/// of `value_columns` across the selection ("horizontal" per-category
/// breakdowns: age brackets for one district, blood types over all rows).
///
/// Returns `(column, total)` pairs in `value_columns` order, or an empty
/// sequence when no row matched.
pub fn filter_and_sum(
    table: &Table,
    filters: &BTreeMap<String, Value>,
    value_columns: &[&str],
) -> Result<Vec<(String, f64)>> {
    let filter_idx: Vec<(usize, &Value)> = filters
        .iter()
        .map(|(col, val)| require_column(table, col).map(|i| (i, val)))
        .collect::<Result<_>>()?;
    let value_idx: Vec<usize> = value_columns
        .iter()
        .map(|col| require_column(table, col))
        .collect::<Result<_>>()?;

    let mut totals = vec![0.0; value_idx.len()];
    let mut matched = false;

    for (row_no, row) in table.rows.iter().enumerate() {
        if filter_idx.iter().any(|&(i, expected)| &row[i] != expected) {
            continue;
        }
        matched = true;
        for (j, &idx) in value_idx.iter().enumerate() {
            totals[j] += cell_as_f64(table, row_no, idx)?;
        }
    }

    if !matched {
        return Ok(Vec::new());
    }
    Ok(value_columns
        .iter()
        .map(|col| col.to_string())
        .zip(totals)
        .collect())
}
