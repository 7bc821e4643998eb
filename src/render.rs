use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

use crate::table::Table;
use crate::types::TypeInfo;
use crate::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Rows included in a preview; `None` renders every row.
    pub preview_rows: Option<usize>,
    /// Attach a per-column type report.
    pub report: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            preview_rows: Some(5),
            report: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub name: String,
    #[serde(flatten)]
    pub info: TypeInfo,
}

/// The document handed back after inference or an override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub column_types: Map<String, JsonValue>,
    pub preview_data: Vec<Map<String, JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnReport>>,
}

impl InferenceResponse {
    pub fn from_table(table: &Table, options: &RenderOptions) -> Self {
        let rows = options.preview_rows.unwrap_or_else(|| table.row_count());
        InferenceResponse {
            column_types: column_types(table),
            preview_data: preview(table, rows),
            columns: options.report.then(|| column_report(table)),
        }
    }
}

/// Column name -> canonical type name, in column order.
pub fn column_types(table: &Table) -> Map<String, JsonValue> {
    table
        .columns()
        .iter()
        .map(|c| (c.name().to_string(), JsonValue::from(c.dtype().name())))
        .collect()
}

/// First `limit` rows as JSON objects.
pub fn preview(table: &Table, limit: usize) -> Vec<Map<String, JsonValue>> {
    (0..table.row_count().min(limit))
        .map(|row| {
            table
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), cell_to_json(&c.values()[row])))
                .collect()
        })
        .collect()
}

pub fn column_report(table: &Table) -> Vec<ColumnReport> {
    table
        .columns()
        .iter()
        .map(|c| ColumnReport {
            name: c.name().to_string(),
            info: TypeInfo::for_type(c.dtype()),
        })
        .collect()
}

/// JSON-safe form of a cell: timestamps as ISO-8601, missing and
/// non-finite numbers as null.
pub fn cell_to_json(cell: &Value) -> JsonValue {
    match cell {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::DateTime(_) | Value::Text(_) => JsonValue::String(cell.to_string()),
    }
}
