mod coerce;
mod dates;
mod infer;
mod render;
mod table;
mod types;
mod value;

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

pub use coerce::coerce;
pub use dates::{parse_datetime, to_iso};
pub use infer::{InferenceOptions, classify};
pub use render::{
    ColumnReport, InferenceResponse, RenderOptions, cell_to_json, column_report, column_types,
    preview,
};
pub use table::{Column, Table};
pub use types::{SemanticType, TypeInfo, TypeOption, UnknownType};
pub use value::{MISSING_TOKENS, Value, is_missing_token};

#[derive(Debug, Error)]
pub enum TypecastError {
    #[error("Empty dataset provided")]
    EmptyDataset,
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
    #[error("Unsupported file type {0}. Please upload CSV or Excel files.")]
    UnsupportedFileType(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    #[error("Failed to convert column \"{column}\" to type {target}: {details}")]
    Conversion {
        column: String,
        target: String,
        details: String,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Excel error: {0}")]
    Excel(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller-supplied type overrides together with the rows to rebuild the
/// table from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideRequest {
    #[serde(default)]
    pub column_types: Map<String, JsonValue>,
    #[serde(default)]
    pub preview_data: Vec<Map<String, JsonValue>>,
}

/// Classifies every column of `table`, preserving column order.
pub fn infer_table(table: &Table, options: &InferenceOptions) -> Result<Table, TypecastError> {
    let columns: Vec<Column> = table
        .columns()
        .par_iter()
        .map(|column| classify(column, options))
        .collect();
    info!(
        "inferred types for {} column(s) over {} row(s)",
        columns.len(),
        table.row_count()
    );
    Table::new(columns)
}

/// Rebuilds the table from the request rows and applies every override in
/// request order. The first hard failure aborts the whole request.
pub fn apply_overrides(request: &OverrideRequest) -> Result<Table, TypecastError> {
    if request.column_types.is_empty() || request.preview_data.is_empty() {
        return Err(TypecastError::UnsupportedInput(
            "Missing required data".to_string(),
        ));
    }

    let mut table = Table::from_records(&request.preview_data)?;
    for (name, requested) in &request.column_types {
        let target = match requested {
            JsonValue::String(s) => SemanticType::from_request(s),
            _ => SemanticType::Text,
        };
        let column = table
            .column(name)
            .ok_or_else(|| TypecastError::UnknownColumn(name.clone()))?;
        let converted = coerce(column, target)?;
        table.replace_column(converted)?;
    }
    info!(
        "applied {} type override(s) over {} row(s)",
        request.column_types.len(),
        table.row_count()
    );
    Ok(table)
}
