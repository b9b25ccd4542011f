//! Conversions between `serde_json` values and the document model.

use sealconf_core::{
    storage::{CodecError, TextFormat},
    Document, Value,
};
use serde_json::{Map, Number};

/// Converts a parsed JSON value. `null` and integers outside `i64` have no
/// document representation and are rejected.
pub fn value_from_json(value: serde_json::Value) -> Result<Value, CodecError> {
    match value {
        serde_json::Value::Null => Err(decode_err("null values are not supported")),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_json::Value::Number(n) => number_from_json(&n),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(value_from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(map) => document_from_json(map).map(Value::Table),
    }
}

pub fn document_from_json(map: Map<String, serde_json::Value>) -> Result<Document, CodecError> {
    map.into_iter()
        .map(|(key, value)| value_from_json(value).map(|value| (key, value)))
        .collect()
}

pub fn value_to_json(value: &Value) -> Result<serde_json::Value, CodecError> {
    Ok(match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| CodecError::Encode {
                format: TextFormat::Json,
                reason: format!("non-finite float {f} has no JSON form"),
            })?,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Array(items) => serde_json::Value::Array(
            items.iter().map(value_to_json).collect::<Result<_, _>>()?,
        ),
        Value::Table(table) => serde_json::Value::Object(document_to_json(table)?),
    })
}

pub fn document_to_json(document: &Document) -> Result<Map<String, serde_json::Value>, CodecError> {
    document
        .iter()
        .map(|(key, value)| value_to_json(value).map(|value| (key.clone(), value)))
        .collect()
}

fn number_from_json(n: &Number) -> Result<Value, CodecError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Integer(i));
    }
    if n.is_u64() {
        return Err(decode_err(&format!("integer {n} is out of range")));
    }
    n.as_f64()
        .map(Value::Float)
        .ok_or_else(|| decode_err(&format!("unrepresentable number {n}")))
}

fn decode_err(reason: &str) -> CodecError {
    CodecError::Decode {
        format: TextFormat::Json,
        reason: reason.to_string(),
    }
}
