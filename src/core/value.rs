//! Typed values carried by global variables and data ports.
//!
//! Values are a closed tagged variant. Every value knows its own
//! [`DataType`], and every data type knows how to parse a textual literal
//! into a value of that type. Editors work with literals, executors work
//! with values; coercion between types goes through the literal form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a literal or type name cannot be interpreted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("Unknown data type '{0}'")]
    UnknownType(String),

    #[error("'{literal}' is not a valid {data_type} literal")]
    InvalidLiteral { literal: String, data_type: DataType },
}

/// Type descriptor of a [`Value`].
///
/// `Object` is the catch-all type and accepts any value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Float,
    Bool,
    Str,
    List,
    Dict,
    Object,
}

impl DataType {
    /// Canonical name used for display and round-tripping.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Object => "object",
        }
    }

    /// Check whether a value may be stored under this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Object => true,
            other => value.data_type() == *other,
        }
    }

    /// Two port types may be linked when they are equal or either side is
    /// `object`.
    pub fn is_compatible_with(&self, other: DataType) -> bool {
        *self == other || *self == Self::Object || other == Self::Object
    }

    /// Parse a textual literal into a value of this type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hierstate::core::{DataType, Value};
    ///
    /// assert_eq!(DataType::Int.parse_literal(" 42 ").unwrap(), Value::Int(42));
    /// assert_eq!(DataType::Str.parse_literal("5").unwrap(), Value::Str("5".into()));
    /// assert!(DataType::Float.parse_literal("abc").is_err());
    /// ```
    pub fn parse_literal(&self, literal: &str) -> Result<Value, ValueError> {
        let invalid = || ValueError::InvalidLiteral {
            literal: literal.to_string(),
            data_type: *self,
        };
        let trimmed = literal.trim();

        match self {
            Self::Int => trimmed.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
            Self::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid()),
            Self::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            Self::Str => Ok(Value::Str(literal.to_string())),
            Self::List => match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(json @ serde_json::Value::Array(_)) => Ok(Value::from(json)),
                _ => Err(invalid()),
            },
            Self::Dict => match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(json @ serde_json::Value::Object(_)) => Ok(Value::from(json)),
                _ => Err(invalid()),
            },
            Self::Object => Ok(serde_json::from_str::<serde_json::Value>(trimmed)
                .map(Value::from)
                .unwrap_or_else(|_| Value::Str(literal.to_string()))),
        }
    }

    /// Convert a value to this type by rendering it as a literal and
    /// parsing that literal again.
    pub fn coerce(&self, value: &Value) -> Result<Value, ValueError> {
        if self.accepts(value) {
            return Ok(value.clone());
        }
        self.parse_literal(&value.to_literal())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(Self::Int),
            "float" | "double" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            "str" | "string" => Ok(Self::Str),
            "list" | "array" => Ok(Self::List),
            "dict" | "map" => Ok(Self::Dict),
            "object" | "any" => Ok(Self::Object),
            _ => Err(ValueError::UnknownType(s.to_string())),
        }
    }
}

/// A dynamically typed value.
///
/// Cloning a value produces a fully independent deep copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    #[default]
    None,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Vec<Value>),
    Dict(BTreeMap<String, Value>),
}

impl Value {
    /// Type descriptor of this value. `None` is typed as `object`.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::None => DataType::Object,
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::Bool(_) => DataType::Bool,
            Self::Str(_) => DataType::Str,
            Self::List(_) => DataType::List,
            Self::Dict(_) => DataType::Dict,
        }
    }

    /// Render the value as a literal that [`DataType::parse_literal`]
    /// accepts for the value's own type.
    pub fn to_literal(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => format!("{x:.1}"),
            Self::Float(x) => x.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Str(s) => s.clone(),
            Self::None | Self::List(_) | Self::Dict(_) => {
                serde_json::Value::from(self.clone()).to_string()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Dict(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Dict(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::None => Self::Null,
            Value::Int(i) => Self::from(i),
            Value::Float(x) => serde_json::Number::from_f64(x)
                .map(Self::Number)
                .unwrap_or(Self::Null),
            Value::Bool(b) => Self::Bool(b),
            Value::Str(s) => Self::String(s),
            Value::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Dict(map) => Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}
