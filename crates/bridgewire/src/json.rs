//! Conversion between JSON documents and wire values.
//!
//! JSON has no byte buffer, typed array or non-string key, so those kinds
//! use small tagged objects:
//!
//! - `{"$bytes": "<hex>"}` for a byte buffer
//! - `{"$int32": [..]}`, `{"$int64": [..]}`, `{"$float64": [..]}` for typed
//!   arrays
//! - `{"$map": [[key, value], ..]}` for a map with any key kind
//! - `{"$record": "<name>", "fields": [..]}` for a decoded record (output
//!   only)

use bridgewire_codec::Value;
use bytes::Bytes;
use serde_json::{json, Map, Number, Value as Json};

use crate::exit::{CliError, CliResult, USAGE};

/// Build a wire value from JSON. Integers become ints, other numbers floats.
pub fn to_value(json: &Json) -> CliResult<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => number_to_value(n)?,
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(to_value).collect::<CliResult<_>>()?),
        Json::Object(object) => object_to_value(object)?,
    })
}

fn number_to_value(n: &Number) -> CliResult<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Int(i));
    }
    if n.is_u64() {
        return Err(usage(format!("integer {n} does not fit in 64 bits")));
    }
    n.as_f64()
        .map(Value::Float)
        .ok_or_else(|| usage(format!("unsupported number {n}")))
}

fn object_to_value(object: &Map<String, Json>) -> CliResult<Value> {
    if let (1, Some((key, inner))) = (object.len(), object.iter().next()) {
        let int32 = |n: &Number| n.as_i64().and_then(|i| i32::try_from(i).ok());
        match key.as_str() {
            "$bytes" => return bytes_from_json(inner),
            "$int32" => return typed_array(inner, key, int32).map(Value::Int32Array),
            "$int64" => return typed_array(inner, key, Number::as_i64).map(Value::Int64Array),
            "$float64" => return typed_array(inner, key, Number::as_f64).map(Value::Float64Array),
            "$map" => return map_from_pairs(inner),
            _ => {}
        }
    }

    let pairs = object
        .iter()
        .map(|(key, value)| Ok((Value::String(key.clone()), to_value(value)?)))
        .collect::<CliResult<_>>()?;
    Ok(Value::Map(pairs))
}

fn bytes_from_json(inner: &Json) -> CliResult<Value> {
    let text = inner
        .as_str()
        .ok_or_else(|| usage("$bytes must be a hex string"))?;
    let raw = hex::decode(text).map_err(|err| usage(format!("$bytes is not valid hex: {err}")))?;
    Ok(Value::Bytes(Bytes::from(raw)))
}

fn typed_array<T>(
    inner: &Json,
    marker: &str,
    element: impl Fn(&Number) -> Option<T>,
) -> CliResult<Vec<T>> {
    let items = inner
        .as_array()
        .ok_or_else(|| usage(format!("{marker} must be an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_number()
                .and_then(&element)
                .ok_or_else(|| usage(format!("{marker} element {item} out of range")))
        })
        .collect()
}

fn map_from_pairs(inner: &Json) -> CliResult<Value> {
    let items = inner
        .as_array()
        .ok_or_else(|| usage("$map must be an array of [key, value] pairs"))?;
    let pairs = items
        .iter()
        .map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([key, value]) => Ok((to_value(key)?, to_value(value)?)),
            _ => Err(usage(format!("$map entry {pair} is not a [key, value] pair"))),
        })
        .collect::<CliResult<_>>()?;
    Ok(Value::Map(pairs))
}

/// Render a wire value as JSON, using the tagged objects above where plain
/// JSON cannot represent the kind. Non-finite floats render as null.
pub fn from_value(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => json!(i),
        Value::Float(f) => float(*f),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => json!({ "$bytes": hex::encode(b) }),
        Value::Int32Array(items) => json!({ "$int32": items }),
        Value::Int64Array(items) => json!({ "$int64": items }),
        Value::Float64Array(items) => {
            json!({ "$float64": items.iter().map(|f| float(*f)).collect::<Vec<_>>() })
        }
        Value::List(items) => Json::Array(items.iter().map(from_value).collect()),
        Value::Map(pairs) => map_to_json(pairs),
        Value::Record(record) => json!({
            "$record": record.name,
            "fields": record.fields.iter().map(from_value).collect::<Vec<_>>(),
        }),
    }
}

fn float(f: f64) -> Json {
    Number::from_f64(f).map_or(Json::Null, Json::Number)
}

fn map_to_json(pairs: &[(Value, Value)]) -> Json {
    let string_keys = pairs.iter().all(|(key, _)| matches!(key, Value::String(_)));
    let mut seen = std::collections::HashSet::new();
    let unique = pairs
        .iter()
        .all(|(key, _)| seen.insert(key.as_str().unwrap_or_default()));

    if string_keys && unique && !is_reserved_marker(pairs) {
        let object = pairs
            .iter()
            .filter_map(|(key, value)| Some((key.as_str()?.to_string(), from_value(value))))
            .collect();
        return Json::Object(object);
    }

    let entries = pairs
        .iter()
        .map(|(key, value)| json!([from_value(key), from_value(value)]))
        .collect::<Vec<_>>();
    json!({ "$map": entries })
}

/// A one-entry string map whose key is a marker must stay tagged, or it
/// would read back as a different kind.
fn is_reserved_marker(pairs: &[(Value, Value)]) -> bool {
    matches!(
        pairs,
        [(Value::String(key), _)] if key.starts_with('$')
    )
}

fn usage(message: impl Into<String>) -> CliError {
    CliError::new(USAGE, message)
}
