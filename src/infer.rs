//! Column type classifier.
//!
//! Each column runs through a fixed, ordered list of rules; the first rule
//! that accepts the whole column produces the converted column. A single
//! nonconforming cell vetoes a rule and the column falls through to the next
//! one, ending at `Text`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::table::Column;
use crate::types::SemanticType;
use crate::value::{self, Value};

/// Thresholds used by the categorical rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Distinct/total ratio must be strictly below this.
    pub categorical_threshold: f64,
    /// Minimum non-missing count before the ratio test applies.
    pub categorical_min_count: usize,
    /// Columns of single-character codes qualify up to this many distinct values.
    pub single_char_max_distinct: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions {
            categorical_threshold: 0.5,
            categorical_min_count: 10,
            single_char_max_distinct: 10,
        }
    }
}

type RuleFn = fn(&Column, &InferenceOptions) -> Option<Column>;

struct Rule {
    name: &'static str,
    apply: RuleFn,
}

const RULES: [Rule; 5] = [
    Rule { name: "passthrough", apply: passthrough },
    Rule { name: "boolean", apply: boolean },
    Rule { name: "numeric", apply: numeric },
    Rule { name: "datetime", apply: datetime },
    Rule { name: "categorical", apply: categorical },
];

/// Infers the best-fit type of `column` and returns it re-expressed in that
/// type. Never fails: a column no rule accepts stays `Text`.
pub fn classify(column: &Column, options: &InferenceOptions) -> Column {
    let column = strip_text(column);
    for rule in &RULES {
        if let Some(converted) = (rule.apply)(&column, options) {
            debug!(
                "column \"{}\": {} rule matched -> {}",
                column.name(),
                rule.name,
                converted.dtype()
            );
            return converted;
        }
    }
    debug!("column \"{}\": no rule matched, keeping text", column.name());
    column.with_values(SemanticType::Text, null_missing(&column))
}

fn strip_text(column: &Column) -> Column {
    if column.dtype() != SemanticType::Text {
        return column.clone();
    }
    let values = column
        .values()
        .iter()
        .map(|v| match v {
            Value::Text(s) => Value::Text(s.trim().to_string()),
            other => other.clone(),
        })
        .collect();
    column.with_values(SemanticType::Text, values)
}

fn passthrough(column: &Column, _: &InferenceOptions) -> Option<Column> {
    matches!(column.dtype(), SemanticType::DateTime | SemanticType::Boolean).then(|| column.clone())
}

fn boolean(column: &Column, _: &InferenceOptions) -> Option<Column> {
    let mut present = column.non_missing().peekable();
    present.peek()?;
    let qualifies = match column.dtype() {
        SemanticType::Integer | SemanticType::Float => {
            present.all(|v| matches!(v.as_number(), Some(x) if x == 0.0 || x == 1.0))
        }
        SemanticType::Text => present.all(|v| matches!(v, Value::Text(s) if value::is_bool_token(s))),
        _ => false,
    };
    if !qualifies {
        return None;
    }
    Some(to_boolean(column))
}

fn numeric(column: &Column, _: &InferenceOptions) -> Option<Column> {
    if column.dtype() == SemanticType::DateTime {
        return None;
    }
    let mut parsed = Vec::with_capacity(column.len());
    for cell in column.values() {
        if cell.is_missing() {
            parsed.push(None);
            continue;
        }
        match cell.as_number() {
            Some(x) if x.is_nan() => parsed.push(None),
            Some(x) => parsed.push(Some(x)),
            None => {
                debug!("column \"{}\": numeric rule vetoed by {:?}", column.name(), cell);
                return None;
            }
        }
    }

    let present: Vec<f64> = parsed.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    // 0/1 spellings the token table misses ("1.0", "00") settle on Boolean
    // here, so a second pass through the boolean rule changes nothing.
    if present.iter().all(|x| *x == 0.0 || *x == 1.0) {
        let values = parsed
            .iter()
            .map(|x| x.map_or(Value::Null, |x| Value::Bool(x == 1.0)))
            .collect();
        return Some(column.with_values(SemanticType::Boolean, values));
    }
    if present.iter().all(|x| value::integral(*x).is_some()) {
        let values = parsed
            .iter()
            .map(|x| x.and_then(value::integral).map_or(Value::Null, Value::Int))
            .collect();
        return Some(column.with_values(SemanticType::Integer, values));
    }
    let values = parsed.iter().map(|x| x.map_or(Value::Null, Value::Float)).collect();
    Some(column.with_values(SemanticType::Float, values))
}

fn datetime(column: &Column, _: &InferenceOptions) -> Option<Column> {
    if column.dtype() != SemanticType::Text {
        return None;
    }
    let mut values = Vec::with_capacity(column.len());
    let mut seen = 0usize;
    for cell in column.values() {
        if cell.is_missing() {
            values.push(Value::Null);
            continue;
        }
        let dt = cell.as_datetime()?;
        seen += 1;
        values.push(Value::DateTime(dt));
    }
    (seen > 0).then(|| column.with_values(SemanticType::DateTime, values))
}

fn categorical(column: &Column, options: &InferenceOptions) -> Option<Column> {
    if column.dtype() == SemanticType::Categorical {
        return Some(column.clone());
    }

    let present: Vec<&Value> = column.non_missing().collect();
    if present.is_empty() {
        return None;
    }
    let distinct: HashSet<String> = present.iter().map(|v| v.distinct_key()).collect();

    let single_char_codes = column.dtype() == SemanticType::Text
        && distinct.len() <= options.single_char_max_distinct
        && distinct.iter().all(|s| s.chars().count() == 1);
    let low_cardinality = present.len() >= options.categorical_min_count
        && (distinct.len() as f64 / present.len() as f64) < options.categorical_threshold;

    if !(single_char_codes || low_cardinality) {
        return None;
    }
    Some(column.with_values(SemanticType::Categorical, null_missing(column)))
}

fn null_missing(column: &Column) -> Vec<Value> {
    column
        .values()
        .iter()
        .map(|v| if v.is_missing() { Value::Null } else { v.clone() })
        .collect()
}

/// Maps every cell through the boolean table; anything unmapped becomes null.
pub(crate) fn to_boolean(column: &Column) -> Column {
    let values = column
        .values()
        .iter()
        .map(|v| {
            if v.is_missing() {
                Value::Null
            } else {
                v.as_bool().map_or(Value::Null, Value::Bool)
            }
        })
        .collect();
    column.with_values(SemanticType::Boolean, values)
}
