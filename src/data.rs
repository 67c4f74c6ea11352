use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Other,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Other => "other",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["text", "integer", "float", "boolean", "timestamp", "other"]
    }

    /// Kinds the coercion engine produces values for.
    pub fn is_coercion_target(&self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Integer | FieldKind::Float | FieldKind::Timestamp
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "text" | "string" | "str" => Ok(FieldKind::Text),
            "integer" | "int" => Ok(FieldKind::Integer),
            "float" | "double" => Ok(FieldKind::Float),
            "boolean" | "bool" => Ok(FieldKind::Boolean),
            "timestamp" | "datetime" | "time" => Ok(FieldKind::Timestamp),
            "other" => Ok(FieldKind::Other),
            _ => Err(anyhow!(
                "Unknown field kind '{value}'. Supported kinds: {}",
                FieldKind::variants().join(", ")
            )),
        }
    }
}

/// A scalar field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<FixedOffset>),
    /// Structured data the copier moves around but never inspects.
    Other(serde_json::Value),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Text(_) => FieldKind::Text,
            Value::Integer(_) => FieldKind::Integer,
            Value::Float(_) => FieldKind::Float,
            Value::Boolean(_) => FieldKind::Boolean,
            Value::Timestamp(_) => FieldKind::Timestamp,
            Value::Other(_) => FieldKind::Other,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::Other(json) => json.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}
