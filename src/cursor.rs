//! Opaque pagination cursor.
//!
//! A cursor wraps the store's native start key without interpreting it:
//! the key is serialized to JSON and encoded as URL-safe base64 so it can
//! travel through query strings untouched.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

// ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token received from a client.
    pub fn new(token: impl Into<String>) -> Self {
        Cursor(token.into())
    }

    pub fn from_start_key(key: &Value) -> Self {
        // ---
        // Serializing a `Value` cannot fail.
        let json = key.to_string();
        Cursor(URL_SAFE_NO_PAD.encode(json.as_bytes()))
    }

    /// Recover the store's start key. Any decoding failure is an invalid cursor.
    pub fn decode(&self) -> Result<Value, ValidationError> {
        // ---
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.trim())
            .map_err(|_| ValidationError::InvalidCursor)?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(key @ Value::Object(_)) => Ok(key),
            _ => Err(ValidationError::InvalidCursor),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn cursor_is_query_string_safe() {
        // ---
        let key = json!({"sensorId": "tank/7 ?&=", "timestamp": "2025-01-01T00:00:00.000000000Z"});
        let cursor = Cursor::from_start_key(&key);
        let token = serde_json::to_value(&cursor).unwrap();

        assert!(token
            .as_str()
            .unwrap()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(cursor.decode().unwrap(), key);
    }

    #[test]
    fn corrupted_cursors_are_rejected() {
        // ---
        for token in ["", "not base64!", "e30x", "bnVsbA", "WzEsMl0"] {
            assert_eq!(
                Cursor::new(token).decode(),
                Err(ValidationError::InvalidCursor),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn cursor_serializes_as_plain_string() {
        // ---
        let cursor = Cursor::new("abc");
        assert_eq!(serde_json::to_string(&cursor).unwrap(), r#""abc""#);
    }
}
