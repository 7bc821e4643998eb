use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical category of a column, independent of how its cells are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Integer,
    Float,
    Boolean,
    DateTime,
    Categorical,
    Text,
}

impl SemanticType {
    pub const ALL: [SemanticType; 6] = [
        SemanticType::Text,
        SemanticType::Integer,
        SemanticType::Float,
        SemanticType::DateTime,
        SemanticType::Boolean,
        SemanticType::Categorical,
    ];

    /// Canonical lowercase name used in responses and requests.
    pub fn name(self) -> &'static str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Boolean => "boolean",
            SemanticType::DateTime => "datetime",
            SemanticType::Categorical => "categorical",
            SemanticType::Text => "text",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            SemanticType::Integer => "Integer",
            SemanticType::Float => "Decimal",
            SemanticType::Boolean => "Boolean",
            SemanticType::DateTime => "Date/Time",
            SemanticType::Categorical => "Category",
            SemanticType::Text => "Text",
        }
    }

    /// Maps a requested type name onto a target. Unrecognized names fall back
    /// to `Text`, matching the coercion default.
    pub fn from_request(name: &str) -> SemanticType {
        name.parse().unwrap_or(SemanticType::Text)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl fmt::Display for UnknownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type name: {}", self.0)
    }
}

impl std::error::Error for UnknownType {}

impl FromStr for SemanticType {
    type Err = UnknownType;

    /// Accepts canonical names and the dtype spellings older clients send
    /// (`Int64`, `float64`, `datetime64[ns]`, `category`, `object`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "int64" | "int32" => SemanticType::Integer,
            "float" | "float64" | "float32" | "decimal" => SemanticType::Float,
            "boolean" | "bool" => SemanticType::Boolean,
            "datetime" | "datetime64[ns]" | "datetime64" | "date" => SemanticType::DateTime,
            "categorical" | "category" => SemanticType::Categorical,
            "text" | "object" | "string" | "str" => SemanticType::Text,
            _ => return Err(UnknownType(s.to_string())),
        };
        Ok(ty)
    }
}

/// One entry of a type picker: machine value plus label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOption {
    pub value: String,
    pub label: String,
}

/// Per-column type description returned alongside a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub inferred_type: String,
    pub display_type: String,
    pub possible_types: Vec<TypeOption>,
}

impl TypeInfo {
    pub fn for_type(ty: SemanticType) -> Self {
        TypeInfo {
            inferred_type: ty.name().to_string(),
            display_type: ty.label().to_string(),
            possible_types: SemanticType::ALL
                .iter()
                .map(|t| TypeOption {
                    value: t.name().to_string(),
                    label: t.label().to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_dtype_names() {
        assert_eq!("integer".parse::<SemanticType>().unwrap(), SemanticType::Integer);
        assert_eq!("Int64".parse::<SemanticType>().unwrap(), SemanticType::Integer);
        assert_eq!("float64".parse::<SemanticType>().unwrap(), SemanticType::Float);
        assert_eq!("bool".parse::<SemanticType>().unwrap(), SemanticType::Boolean);
        assert_eq!(
            "datetime64[ns]".parse::<SemanticType>().unwrap(),
            SemanticType::DateTime
        );
        assert_eq!("category".parse::<SemanticType>().unwrap(), SemanticType::Categorical);
        assert_eq!("object".parse::<SemanticType>().unwrap(), SemanticType::Text);
        assert!("complex128".parse::<SemanticType>().is_err());
    }

    #[test]
    fn test_unknown_request_defaults_to_text() {
        assert_eq!(SemanticType::from_request("whatever"), SemanticType::Text);
    }

    #[test]
    fn test_type_info_lists_every_target() {
        let info = TypeInfo::for_type(SemanticType::Float);
        assert_eq!(info.inferred_type, "float");
        assert_eq!(info.display_type, "Decimal");
        assert_eq!(info.possible_types.len(), SemanticType::ALL.len());
        assert_eq!(
            serde_json::to_value(SemanticType::DateTime).unwrap(),
            serde_json::json!("datetime")
        );
    }
}
