//! Schema-driven records.
//!
//! A [`RecordSchema`] lists the fields of a record in YAML: name, kind and
//! the optional `alias` / `date_format` annotations. A [`DynamicRecord`]
//! pairs a schema with a value map and implements [`Record`], so records
//! only known at run time copy exactly like structs using
//! [`impl_record!`](crate::impl_record).
//!
//! Values move in and out as JSON objects. Timestamps are RFC 3339 strings,
//! `other` fields hold arbitrary JSON. Fields missing from the input object
//! stay unset and are not copied.

use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::BufReader,
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail, ensure};
use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    data::{FieldKind, Value},
    error::CopyError,
    record::{FieldDescriptor, Record},
    time_format::TimeFormat,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldMeta {
            name: name.into(),
            kind,
            alias: None,
            date_format: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub fields: Vec<FieldMeta>,
}

impl RecordSchema {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: RecordSchema =
            serde_yaml::from_reader(reader).context("Parsing record schema YAML")?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let schema: RecordSchema =
            serde_yaml::from_str(yaml).context("Parsing record schema YAML")?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing record schema to YAML string")
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Rejects duplicate names and unregistered `date_format` annotations.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            ensure!(!field.name.is_empty(), "Schema contains a field with an empty name");
            ensure!(
                seen.insert(field.name.as_str()),
                "Field '{}' is declared more than once",
                field.name
            );
            if let Some(pattern) = field.date_format.as_deref() {
                TimeFormat::from_pattern(pattern)
                    .with_context(|| format!("Validating date_format of field '{}'", field.name))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    schema: RecordSchema,
    values: BTreeMap<String, Value>,
}

impl DynamicRecord {
    pub fn new(schema: RecordSchema) -> Self {
        DynamicRecord {
            schema,
            values: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Sets a field, checking it exists and holds `value`'s kind.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), CopyError> {
        let Some(meta) = self.schema.field(name) else {
            return Err(CopyError::UnknownSlot {
                slot: name.to_string(),
            });
        };
        if meta.kind != value.kind() {
            return Err(CopyError::IncompatibleValue {
                slot: name.to_string(),
                expected: meta.kind,
                found: value.kind(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Builds a record from a JSON object. Keys not in the schema are
    /// ignored; `null` leaves the field unset.
    pub fn from_json(schema: RecordSchema, json: &JsonValue) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| anyhow!("Record input must be a JSON object"))?;
        let mut record = DynamicRecord::new(schema);
        let mut values = BTreeMap::new();
        for meta in &record.schema.fields {
            match object.get(&meta.name) {
                None | Some(JsonValue::Null) => {}
                Some(raw) => {
                    let value = json_to_value(raw, meta.kind)
                        .with_context(|| format!("Reading field '{}'", meta.name))?;
                    values.insert(meta.name.clone(), value);
                }
            }
        }
        record.values = values;
        Ok(record)
    }

    /// Renders the set fields as a JSON object.
    pub fn to_json(&self) -> Result<JsonValue> {
        let mut object = Map::new();
        for meta in &self.schema.fields {
            if let Some(value) = self.values.get(&meta.name) {
                object.insert(meta.name.clone(), value_to_json(value)?);
            }
        }
        Ok(JsonValue::Object(object))
    }
}

impl Record for DynamicRecord {
    fn descriptors(&self) -> Vec<FieldDescriptor<'_>> {
        self.schema
            .fields
            .iter()
            .filter_map(|meta| {
                let value = self.values.get(&meta.name)?.clone();
                let mut descriptor = FieldDescriptor::new(&meta.name, value);
                if let Some(alias) = meta.alias.as_deref() {
                    descriptor = descriptor.alias(alias);
                }
                if let Some(pattern) = meta.date_format.as_deref() {
                    descriptor = descriptor.date_format(pattern);
                }
                Some(descriptor)
            })
            .collect()
    }

    fn slot_kind(&self, name: &str) -> Option<FieldKind> {
        self.schema.field(name).map(|meta| meta.kind)
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), CopyError> {
        self.set(name, value)
    }
}

pub fn json_to_value(raw: &JsonValue, kind: FieldKind) -> Result<Value> {
    let value = match (kind, raw) {
        (FieldKind::Text, JsonValue::String(s)) => Value::Text(s.clone()),
        (FieldKind::Integer, JsonValue::Number(n)) => Value::Integer(
            n.as_i64()
                .ok_or_else(|| anyhow!("Expected an integer but found {n}"))?,
        ),
        (FieldKind::Float, JsonValue::Number(n)) => Value::Float(
            n.as_f64()
                .ok_or_else(|| anyhow!("Expected a float but found {n}"))?,
        ),
        (FieldKind::Boolean, JsonValue::Bool(b)) => Value::Boolean(*b),
        (FieldKind::Timestamp, JsonValue::String(s)) => Value::Timestamp(
            DateTime::parse_from_rfc3339(s)
                .with_context(|| format!("Parsing '{s}' as an RFC 3339 timestamp"))?,
        ),
        (FieldKind::Other, other) => Value::Other(other.clone()),
        (kind, other) => bail!("Expected {kind} value but found {other}"),
    };
    Ok(value)
}

pub fn value_to_json(value: &Value) -> Result<JsonValue> {
    let json = match value {
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Integer(i) => JsonValue::Number(Number::from(*i)),
        Value::Float(f) => JsonValue::Number(
            Number::from_f64(*f).ok_or_else(|| anyhow!("Float {f} cannot be written as JSON"))?,
        ),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Timestamp(ts) => JsonValue::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::Other(json) => json.clone(),
    };
    Ok(json)
}
