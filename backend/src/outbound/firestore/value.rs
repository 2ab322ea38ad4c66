//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type, for
//! example `{"stringValue": "carl"}`. Documents carry a `fields` map of such
//! values. Integers travel as decimal strings.

use serde_json::{Map, Number, Value, json};

use crate::domain::ports::UserStoreError;

/// Encode a JSON value as a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

/// Encode every entry of a JSON object as a Firestore `fields` map.
pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

/// Decode a Firestore typed value into plain JSON.
///
/// # Errors
///
/// Returns [`UserStoreError::Serialization`] when the value is not a
/// single-key typed object or carries an unsupported type.
pub fn decode_value(value: &Value) -> Result<Value, UserStoreError> {
    let Some((kind, inner)) = value.as_object().and_then(single_entry) else {
        return Err(UserStoreError::serialization(format!(
            "expected a typed Firestore value, got {value}"
        )));
    };
    match kind {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed(kind, inner)),
        "integerValue" => decode_integer(inner).ok_or_else(|| malformed(kind, inner)),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| malformed(kind, inner)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|text| Value::String(text.to_owned()))
            .ok_or_else(|| malformed(kind, inner)),
        "arrayValue" => {
            let Some(array) = inner.as_object() else {
                return Err(malformed(kind, inner));
            };
            match array.get("values") {
                None => Ok(Value::Array(Vec::new())),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                Some(other) => Err(malformed(kind, other)),
            }
        }
        "mapValue" => {
            let Some(map) = inner.as_object() else {
                return Err(malformed(kind, inner));
            };
            match map.get("fields") {
                None => Ok(Value::Object(Map::new())),
                Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
                Some(other) => Err(malformed(kind, other)),
            }
        }
        other => Err(UserStoreError::serialization(format!(
            "unsupported Firestore value type {other}"
        ))),
    }
}

/// Decode a Firestore `fields` map into a plain JSON object.
///
/// # Errors
///
/// Returns the first [`UserStoreError::Serialization`] raised by
/// [`decode_value`].
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, UserStoreError> {
    fields
        .iter()
        .map(|(name, value)| decode_value(value).map(|decoded| (name.clone(), decoded)))
        .collect()
}

fn single_entry(object: &Map<String, Value>) -> Option<(&str, &Value)> {
    let mut entries = object.iter();
    let (kind, inner) = entries.next()?;
    entries.next().is_none().then_some((kind.as_str(), inner))
}

fn decode_integer(inner: &Value) -> Option<Value> {
    match inner {
        Value::String(text) => text.parse::<i64>().ok().map(Value::from),
        Value::Number(number) => number.as_i64().map(Value::from),
        _ => None,
    }
}

fn malformed(kind: &str, inner: &Value) -> UserStoreError {
    UserStoreError::serialization(format!("malformed Firestore {kind}: {inner}"))
}
