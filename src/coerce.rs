//! Forced conversion of a column to a caller-chosen type.
//!
//! Datetime conversion is all-or-nothing: one unparsable cell rejects the
//! column. Numeric and boolean conversion never fail; cells that do not
//! convert become null.

use log::warn;

use crate::TypecastError;
use crate::dates;
use crate::infer::to_boolean;
use crate::table::Column;
use crate::types::SemanticType;
use crate::value::{self, Value};

pub fn coerce(column: &Column, target: SemanticType) -> Result<Column, TypecastError> {
    let converted = match target {
        SemanticType::DateTime => to_datetime(column)?,
        SemanticType::Integer => to_integer(column),
        SemanticType::Float => to_float(column),
        SemanticType::Boolean => to_boolean(column),
        SemanticType::Categorical => {
            column.with_values(SemanticType::Categorical, column.values().to_vec())
        }
        SemanticType::Text => to_text(column),
    };

    let lost = lost_cells(column, &converted);
    if lost > 0 {
        warn!(
            "column \"{}\": {} value(s) could not be converted to {} and were set to null",
            column.name(),
            lost,
            target
        );
    }
    Ok(converted)
}

fn to_datetime(column: &Column) -> Result<Column, TypecastError> {
    let values = column
        .values()
        .iter()
        .map(|cell| {
            if cell.is_missing() {
                return Ok(Value::Null);
            }
            let parsed = match cell {
                Value::DateTime(dt) => Ok(*dt),
                Value::Text(s) => dates::parse_strict(s),
                other => Err(format!("cannot interpret {other} as a date/time")),
            };
            parsed
                .map(Value::DateTime)
                .map_err(|details| TypecastError::Conversion {
                    column: column.name().to_string(),
                    target: SemanticType::DateTime.name().to_string(),
                    details,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(column.with_values(SemanticType::DateTime, values))
}

fn to_integer(column: &Column) -> Column {
    let values = column
        .values()
        .iter()
        .map(|cell| {
            numeric_cell(cell)
                .and_then(value::integral)
                .map_or(Value::Null, Value::Int)
        })
        .collect();
    column.with_values(SemanticType::Integer, values)
}

fn to_float(column: &Column) -> Column {
    let values = column
        .values()
        .iter()
        .map(|cell| numeric_cell(cell).map_or(Value::Null, value::float_value))
        .collect();
    column.with_values(SemanticType::Float, values)
}

fn to_text(column: &Column) -> Column {
    let values = column
        .values()
        .iter()
        .map(|cell| cell.to_text().map_or(Value::Null, Value::Text))
        .collect();
    column.with_values(SemanticType::Text, values)
}

fn numeric_cell(cell: &Value) -> Option<f64> {
    if cell.is_missing() {
        None
    } else {
        cell.as_number()
    }
}

fn lost_cells(before: &Column, after: &Column) -> usize {
    before
        .values()
        .iter()
        .zip(after.values())
        .filter(|(b, a)| !b.is_missing() && a.is_missing())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::{InferenceOptions, classify};

    #[test]
    fn test_integer_soft_failure() {
        let score = Column::raw("Score", ["90", "abc", "70"]);
        let col = coerce(&score, SemanticType::Integer).unwrap();
        assert_eq!(col.dtype(), SemanticType::Integer);
        assert_eq!(col.values(), &[Value::Int(90), Value::Null, Value::Int(70)]);
    }

    #[test]
    fn test_integer_all_bad_still_succeeds() {
        let col = coerce(&Column::raw("c", ["x", "y"]), SemanticType::Integer).unwrap();
        assert!(col.values().iter().all(|v| *v == Value::Null));
    }

    #[test]
    fn test_integer_drops_fractional_values() {
        let col = coerce(&Column::raw("c", ["1.0", "2.5"]), SemanticType::Integer).unwrap();
        assert_eq!(col.values(), &[Value::Int(1), Value::Null]);
    }

    #[test]
    fn test_float_soft_failure() {
        let col = coerce(&Column::raw("c", ["1.25", "oops", "NA", "3"]), SemanticType::Float)
            .unwrap();
        assert_eq!(
            col.values(),
            &[Value::Float(1.25), Value::Null, Value::Null, Value::Float(3.0)]
        );
    }

    #[test]
    fn test_datetime_is_all_or_nothing() {
        let column = Column::raw("when", ["2024-01-01", "not-a-date"]);
        let err = coerce(&column, SemanticType::DateTime).unwrap_err();
        match err {
            TypecastError::Conversion { column, target, details } => {
                assert_eq!(column, "when");
                assert_eq!(target, "datetime");
                assert!(details.contains("not-a-date"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_datetime_success_keeps_missing() {
        let col = coerce(&Column::raw("when", ["2024-01-01", ""]), SemanticType::DateTime).unwrap();
        assert_eq!(col.dtype(), SemanticType::DateTime);
        assert_eq!(col.values()[0].to_string(), "2024-01-01T00:00:00");
        assert_eq!(col.values()[1], Value::Null);
    }

    #[test]
    fn test_datetime_rejects_numbers() {
        let column = Column::new("n", SemanticType::Integer, vec![Value::Int(5)]);
        assert!(matches!(
            coerce(&column, SemanticType::DateTime),
            Err(TypecastError::Conversion { .. })
        ));
    }

    #[test]
    fn test_boolean_table() {
        let col = coerce(&Column::raw("b", ["1", "0", "maybe", "Y"]), SemanticType::Boolean)
            .unwrap();
        assert_eq!(
            col.values(),
            &[Value::Bool(true), Value::Bool(false), Value::Null, Value::Bool(true)]
        );

        let numeric = Column::new(
            "b",
            SemanticType::Integer,
            vec![Value::Int(1), Value::Int(0), Value::Int(7)],
        );
        let col = coerce(&numeric, SemanticType::Boolean).unwrap();
        assert_eq!(col.values(), &[Value::Bool(true), Value::Bool(false), Value::Null]);
    }

    #[test]
    fn test_categorical_retags_only() {
        let column = Column::raw("c", ["x", "NA", "y"]);
        let col = coerce(&column, SemanticType::Categorical).unwrap();
        assert_eq!(col.dtype(), SemanticType::Categorical);
        assert_eq!(col.values(), column.values());
    }

    #[test]
    fn test_integer_text_round_trip() {
        let original = Column::raw("Score", ["90", "abc", "-7", "n/a"]);
        let ints = coerce(&original, SemanticType::Integer).unwrap();
        let back = coerce(&ints, SemanticType::Text).unwrap();
        assert_eq!(
            back.values(),
            &[Value::text("90"), Value::Null, Value::text("-7"), Value::Null]
        );
    }

    #[test]
    fn test_integer_text_round_trip_is_canonical() {
        let original = Column::raw("Score", [" 90", "007", "1e3"]);
        let ints = coerce(&original, SemanticType::Integer).unwrap();
        let back = coerce(&ints, SemanticType::Text).unwrap();
        assert_eq!(
            back.values(),
            &[Value::text("90"), Value::text("7"), Value::text("1000")]
        );
    }

    #[test]
    fn test_text_stringifies_typed_values() {
        let column = classify(
            &Column::raw("d", ["2021-01-01", "2021-02-02"]),
            &InferenceOptions::default(),
        );
        let col = coerce(&column, SemanticType::Text).unwrap();
        assert_eq!(col.values()[1], Value::text("2021-02-02T00:00:00"));
    }
}
