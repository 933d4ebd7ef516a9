//! Batch Helpers
//!
//! Repeats a single-key operation over a collection of keys and folds the
//! per-key results. Every key is attempted even after a failure.

use serde_json::{Map, Value};

use crate::cache::key;
use crate::error::Result;

/// Returns true only if every result is true. Consumes the whole iterator.
pub fn all_true<I>(results: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    results.into_iter().fold(true, |acc, ok| acc & ok)
}

/// Runs `op` for each key and collects the values in input order.
///
/// Keys are checked for hard errors before `op` runs for any of them.
pub fn collect_values<F>(keys: &[&str], mut op: F) -> Result<Map<String, Value>>
where
    F: FnMut(&str) -> Result<Value>,
{
    key::validate_all(keys.iter().copied())?;

    let mut values = Map::with_capacity(keys.len());
    for &key in keys {
        values.insert(key.to_string(), op(key)?);
    }
    Ok(values)
}

/// Runs `op` for each key and reports whether all of them succeeded.
///
/// Keys are checked for hard errors before `op` runs for any of them.
pub fn fold_results<'a, I, F>(keys: I, mut op: F) -> Result<bool>
where
    I: IntoIterator<Item = &'a str> + Clone,
    F: FnMut(&'a str) -> Result<bool>,
{
    key::validate_all(keys.clone())?;

    let results = keys
        .into_iter()
        .map(|key| op(key))
        .collect::<Result<Vec<bool>>>()?;

    Ok(all_true(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_true() {
        assert!(all_true(Vec::<bool>::new()));
        assert!(all_true([true, true]));
        assert!(!all_true([true, false, true]));
    }

    #[test]
    fn test_fold_attempts_every_key() {
        let mut seen = Vec::new();
        let ok = fold_results(["a", "b", "c"], |key| {
            seen.push(key.to_string());
            Ok(key != "b")
        })
        .unwrap();

        assert!(!ok);
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[test]
    fn test_fold_rejects_empty_key_before_running() {
        let mut calls = 0;
        let result = fold_results(["a", ""], |_| {
            calls += 1;
            Ok(true)
        });

        assert!(result.is_err());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_collect_values_preserves_order() {
        let values = collect_values(&["z", "a", "m"], |key| Ok(json!(key.to_uppercase()))).unwrap();
        let keys: Vec<&String> = values.keys().collect();

        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(values["a"], json!("A"));
    }
}
