use sealconf_core::{
    storage::{CodecError, StructuredCodec, TextFormat},
    Document, Value,
};

use crate::json::{document_from_json, document_to_json};

/// Codec persisting documents as TOML, with a JSON bridge for interchange.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlCodec;

impl StructuredCodec for TomlCodec {
    fn encode(&self, document: &Document) -> Result<String, CodecError> {
        toml::to_string(&table_to_toml(document)).map_err(|e| CodecError::Encode {
            format: TextFormat::Canonical,
            reason: e.to_string(),
        })
    }

    fn decode(&self, text: &str) -> Result<Document, CodecError> {
        let table: toml::Table = toml::from_str(text).map_err(|e| CodecError::Decode {
            format: TextFormat::Canonical,
            reason: e.to_string(),
        })?;
        table_from_toml(table)
    }

    fn to_json_text(&self, document: &Document) -> Result<String, CodecError> {
        let object = serde_json::Value::Object(document_to_json(document)?);
        serde_json::to_string_pretty(&object).map_err(|e| CodecError::Encode {
            format: TextFormat::Json,
            reason: e.to_string(),
        })
    }

    fn from_json_text(&self, text: &str) -> Result<Document, CodecError> {
        let parsed: serde_json::Value =
            serde_json::from_str(text).map_err(|e| CodecError::Decode {
                format: TextFormat::Json,
                reason: e.to_string(),
            })?;

        match parsed {
            serde_json::Value::Object(map) => document_from_json(map),
            other => Err(CodecError::Decode {
                format: TextFormat::Json,
                reason: format!("top-level value must be an object, found {}", json_kind(&other)),
            }),
        }
    }
}

fn table_to_toml(document: &Document) -> toml::Table {
    document
        .iter()
        .map(|(key, value)| (key.clone(), value_to_toml(value)))
        .collect()
}

fn value_to_toml(value: &Value) -> toml::Value {
    match value {
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Integer(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::Boolean(b) => toml::Value::Boolean(*b),
        Value::Array(items) => toml::Value::Array(items.iter().map(value_to_toml).collect()),
        Value::Table(table) => toml::Value::Table(table_to_toml(table)),
    }
}

fn table_from_toml(table: toml::Table) -> Result<Document, CodecError> {
    table
        .into_iter()
        .map(|(key, value)| value_from_toml(&key, value).map(|value| (key, value)))
        .collect()
}

fn value_from_toml(key: &str, value: toml::Value) -> Result<Value, CodecError> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Boolean(b),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| value_from_toml(key, item))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Table(table_from_toml(table)?),
        toml::Value::Datetime(dt) => {
            return Err(CodecError::Decode {
                format: TextFormat::Canonical,
                reason: format!("datetime {dt} under '{key}' is not a supported value"),
            })
        }
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
