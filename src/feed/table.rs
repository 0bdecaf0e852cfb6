//! Row extraction for the provider's `{resultSets: [{headers, rowSet}]}` shape.

use crate::error::StatsError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Provider response shape ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets", default)]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    pub row_set: Vec<Vec<Value>>,
}

// ── Rows ─────────────────────────────────────────────────────────────

/// One provider row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatRow(Map<String, Value>);

impl StatRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.0.get(column).and_then(Value::as_f64)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    /// Numeric column, or `NoData` naming the column when it is missing,
    /// null, or not a number.
    pub fn require_f64(&self, column: &str) -> Result<f64, StatsError> {
        self.get_f64(column)
            .ok_or_else(|| StatsError::NoData(format!("column {} missing or not numeric", column)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// In-memory row list for a single result set.
#[derive(Debug, Clone, Default)]
pub struct StatTable {
    pub name: String,
    pub rows: Vec<StatRow>,
}

impl From<ResultSet> for StatTable {
    fn from(set: ResultSet) -> Self {
        let rows = set
            .row_set
            .into_iter()
            .map(|row| {
                StatRow(
                    set.headers
                        .iter()
                        .cloned()
                        .zip(row)
                        .collect::<Map<String, Value>>(),
                )
            })
            .collect();
        Self { name: set.name, rows }
    }
}

fn result_sets(response: &Value) -> Result<Vec<ResultSet>, StatsError> {
    let parsed = StatsResponse::deserialize(response)
        .map_err(|e| StatsError::Decode(format!("unexpected result set shape: {}", e)))?;
    Ok(parsed.result_sets)
}

impl StatTable {
    /// Table for the first result set in the response.
    pub fn from_response(response: &Value) -> Result<Self, StatsError> {
        result_sets(response)?
            .into_iter()
            .next()
            .map(StatTable::from)
            .ok_or_else(|| StatsError::NoData("response has no result sets".to_string()))
    }

    /// Table for the result set called `name`.
    pub fn named(response: &Value, name: &str) -> Result<Self, StatsError> {
        result_sets(response)?
            .into_iter()
            .find(|s| s.name == name)
            .map(StatTable::from)
            .ok_or_else(|| StatsError::NoData(format!("result set {} not found", name)))
    }

    /// Rows whose `column` contains `needle`, ignoring case. Rows without a
    /// string in that column never match.
    pub fn filter_contains(&self, column: &str, needle: &str) -> Vec<&StatRow> {
        let needle = needle.to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                row.get_str(column)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn first_row(&self) -> Result<&StatRow, StatsError> {
        self.rows
            .first()
            .ok_or_else(|| StatsError::NoData(format!("result set {} has no rows", self.name)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows of the first result set in `response`.
pub fn to_rows(response: &Value) -> Result<Vec<StatRow>, StatsError> {
    Ok(StatTable::from_response(response)?.rows)
}
