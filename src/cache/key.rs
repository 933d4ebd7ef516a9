//! Key Validation Module
//!
//! Checks cache keys against the key grammar shared by every backend.
//!
//! A key must start with an ASCII letter, an underscore or a byte >= 0x7F,
//! followed by any number of ASCII letters, digits, underscores or bytes
//! >= 0x7F. Multi-byte UTF-8 characters are made of bytes >= 0x80, so any
//! non-ASCII character is accepted.

use std::sync::LazyLock;

use regex::bytes::Regex;
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Validate ==
/// Validates a cache key.
///
/// # Returns
/// - `Err(InvalidKeyType)` if the key is empty
/// - `Ok(false)` if the key breaks the grammar (callers treat this as a miss)
/// - `Ok(true)` if the key is usable
pub fn validate(key: &str) -> Result<bool> {
    if key.is_empty() {
        return Err(CacheError::InvalidKeyType(
            "Key must be a non-empty string".to_string(),
        ));
    }

    Ok(matches_grammar(key))
}

// == Key From JSON ==
/// Extracts a key from a JSON value, rejecting anything that is not a string.
///
/// Only the type half of the check happens here; pass the result through
/// [`validate`] for the emptiness and grammar checks.
pub fn key_from_value(key: &Value) -> Result<&str> {
    key.as_str().ok_or_else(|| {
        CacheError::InvalidKeyType(format!("Key must be a string, got {}", json_type(key)))
    })
}

/// Validates every key up front, failing on the first hard error.
pub fn validate_all<'a, I>(keys: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for key in keys {
        validate(key)?;
    }
    Ok(())
}

/// Key grammar, matched byte-wise so any byte >= 0x7F is allowed.
static KEY_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^[A-Za-z_\x7f-\xff][A-Za-z0-9_\x7f-\xff]*$").unwrap()
});

fn matches_grammar(key: &str) -> bool {
    KEY_GRAMMAR.is_match(key.as_bytes())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
