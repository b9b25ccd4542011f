use std::collections::BTreeMap;

use crate::storage::StoreError;

/// A configuration document: string keys mapped to values, arbitrarily nested.
pub type Document = BTreeMap<String, Value>;

/// Values a document can hold.
///
/// This is the codec-independent value set; codecs convert their native
/// representations into it and reject anything that falls outside.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<Value>),
    Table(Document),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Document> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<Document> for Value {
    fn from(table: Document) -> Self {
        Value::Table(table)
    }
}

/// Shallow merge: every top-level entry of `partial` replaces the entry of the
/// same name in `current` wholesale. Nested tables are not merged.
pub fn replace_top_level_sections(current: &mut Document, partial: Document) {
    current.extend(partial);
}

/// Sets `value` at `key_path` inside `document`.
///
/// Every segment but the last must name an existing table; the last segment is
/// inserted or overwritten. On error `document` is left untouched.
pub fn set_at_key_path<S: AsRef<str>>(
    document: &mut Document,
    key_path: &[S],
    value: Value,
) -> Result<(), StoreError> {
    let (leaf, parents) = key_path.split_last().ok_or(StoreError::EmptyKeyPath)?;

    let mut current = document;
    for segment in parents {
        let segment = segment.as_ref();
        current = current
            .get_mut(segment)
            .and_then(Value::as_table_mut)
            .ok_or_else(|| StoreError::KeyPathNotFound {
                segment: segment.to_string(),
                path: key_path.iter().map(|s| s.as_ref().to_string()).collect(),
            })?;
    }

    current.insert(leaf.as_ref().to_string(), value);
    Ok(())
}
