use calamine::{Data, Reader, open_workbook_auto};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::TypecastError;
use crate::types::SemanticType;
use crate::value::Value;

/// A named, typed sequence of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: SemanticType,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: SemanticType, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Untyped column straight from an upload: every cell kept as text.
    pub fn raw<S: Into<String>>(name: impl Into<String>, cells: impl IntoIterator<Item = S>) -> Self {
        Column::new(
            name,
            SemanticType::Text,
            cells.into_iter().map(|c| Value::Text(c.into())).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> SemanticType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cells that are not the sentinel or a missing token.
    pub fn non_missing(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_missing())
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    pub(crate) fn with_values(&self, dtype: SemanticType, values: Vec<Value>) -> Column {
        Column::new(self.name.clone(), dtype, values)
    }
}

/// Ordered columns of identical length; rows are positional.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TypecastError> {
        if columns.is_empty() {
            return Err(TypecastError::EmptyDataset);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(TypecastError::DuplicateColumn(column.name().to_string()));
            }
        }
        let rows = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(TypecastError::UnsupportedInput(format!(
                "column \"{}\" has {} rows, expected {}",
                bad.name(),
                bad.len(),
                rows
            )));
        }
        Ok(Table { columns })
    }

    /// Builds an untyped table from a header row and string records.
    /// Repeated header names get `.1`, `.2`, ... suffixes.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TypecastError> {
        if headers.is_empty() || rows.is_empty() {
            return Err(TypecastError::EmptyDataset);
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != headers.len()) {
            return Err(TypecastError::UnsupportedInput(format!(
                "row {} has {} fields, expected {}",
                idx + 1,
                row.len(),
                headers.len()
            )));
        }

        let names = dedupe_headers(headers);
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(col_idx, name)| Column::raw(name, rows.iter().map(|row| row[col_idx].clone())))
            .collect();
        Table::new(columns)
    }

    /// Reads an upload, dispatching on its extension.
    pub fn from_path(path: &Path) -> Result<Self, TypecastError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Table::from_csv(path),
            "xlsx" | "xls" => Table::from_excel(path),
            other => Err(TypecastError::UnsupportedFileType(format!(".{other}"))),
        }
    }

    pub fn from_csv(path: &Path) -> Result<Self, TypecastError> {
        let file = std::fs::File::open(path)?;
        Table::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TypecastError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.iter().map(String::from).collect();
        let rows = rdr
            .records()
            .map(|r| -> Result<Vec<String>, TypecastError> {
                Ok(r?.iter().map(String::from).collect())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Table::from_rows(headers, rows)
    }

    /// First worksheet of a workbook; its first row holds the headers.
    pub fn from_excel(path: &Path) -> Result<Self, TypecastError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| TypecastError::Excel(e.to_string()))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| TypecastError::Excel("workbook has no worksheets".to_string()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| TypecastError::Excel(e.to_string()))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(excel_cell_to_string).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(excel_cell_to_string).collect())
            .collect();
        Table::from_rows(headers, rows)
    }

    /// Rebuilds a table from JSON row objects. Column order follows the
    /// first row; every row must carry the same keys.
    pub fn from_records(records: &[Map<String, JsonValue>]) -> Result<Self, TypecastError> {
        let first = records.first().ok_or(TypecastError::EmptyDataset)?;
        let names: Vec<&String> = first.keys().collect();
        for (idx, record) in records.iter().enumerate() {
            if record.len() != names.len() || names.iter().any(|n| !record.contains_key(*n)) {
                return Err(TypecastError::UnsupportedInput(format!(
                    "inconsistent columns in row {}",
                    idx + 1
                )));
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let cells: Vec<&JsonValue> = records.iter().map(|r| &r[name.as_str()]).collect();
                json_column(name, &cells)
            })
            .collect();
        Table::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Swaps in a converted column with the same name and length.
    pub fn replace_column(&mut self, column: Column) -> Result<(), TypecastError> {
        let rows = self.row_count();
        let slot = self
            .columns
            .iter_mut()
            .find(|c| c.name() == column.name())
            .ok_or_else(|| TypecastError::UnknownColumn(column.name().to_string()))?;
        if column.len() != rows {
            return Err(TypecastError::UnsupportedInput(format!(
                "column \"{}\" has {} rows, expected {}",
                column.name(),
                column.len(),
                rows
            )));
        }
        *slot = column;
        Ok(())
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .map(|header| {
            let mut name = header.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{header}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

fn excel_cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| crate::dates::to_iso(&d))
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{e:?}"),
    }
}

/// Picks the storage a JSON column naturally has: all-integer, all-number
/// and all-boolean columns keep their scalars, anything else becomes text.
fn json_column(name: &str, cells: &[&JsonValue]) -> Column {
    let present: Vec<&JsonValue> = cells.iter().copied().filter(|c| !c.is_null()).collect();

    if !present.is_empty() && present.iter().all(|c| c.is_i64()) {
        let values = cells
            .iter()
            .map(|c| c.as_i64().map_or(Value::Null, Value::Int))
            .collect();
        return Column::new(name, SemanticType::Integer, values);
    }
    if !present.is_empty() && present.iter().all(|c| c.is_number()) {
        let values = cells
            .iter()
            .map(|c| c.as_f64().map_or(Value::Null, crate::value::float_value))
            .collect();
        return Column::new(name, SemanticType::Float, values);
    }
    if !present.is_empty() && present.iter().all(|c| c.is_boolean()) {
        let values = cells
            .iter()
            .map(|c| c.as_bool().map_or(Value::Null, Value::Bool))
            .collect();
        return Column::new(name, SemanticType::Boolean, values);
    }

    let values = cells
        .iter()
        .map(|c| match c {
            JsonValue::Null => Value::Null,
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Bool(b) => Value::Text(b.to_string()),
            JsonValue::Number(n) => Value::Text(n.to_string()),
            other => Value::Text(other.to_string()),
        })
        .collect();
    Column::new(name, SemanticType::Text, values)
}
