//! Secret masking for request/response bodies before they reach the logs.

use serde_json::{Map, Value};

const MASK: &str = "***";

/// Return true if a key holds a secret that must never be logged.
fn is_secret_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "securitycredential" | "access_token"
    )
}

/// Mask secrets in an already encoded JSON body. Bodies that are not JSON
/// are logged as a string with their length only, since they may carry secrets.
pub fn secure_bytes(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => secure_value(&value),
        Err(_) => Value::String(format!("<{} bytes, not json>", body.len())),
    }
}

/// Recursively replace secret string fields with `***`.
pub fn secure_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut masked = Map::with_capacity(map.len());
            for (k, v) in map {
                let new_val = match v {
                    Value::String(_) if is_secret_key(k) => Value::String(MASK.to_string()),
                    _ => secure_value(v),
                };
                masked.insert(k.clone(), new_val);
            }
            Value::Object(masked)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(secure_value).collect()),
        _ => value.clone(),
    }
}
