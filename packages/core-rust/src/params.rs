//! Caller-supplied parameter maps.
//!
//! Parameters stay an untyped JSON object only at the request boundary and
//! through normalization, renaming, and positioning. `serde_json` is built with
//! `preserve_order`, so iteration follows insertion order.

use serde_json::{Map, Value};

/// Insertion-ordered mapping of parameter name to JSON value.
pub type Params = Map<String, Value>;

/// Builds a `Params` map from `(key, value)` pairs.
///
/// Mostly a test and fixture convenience; later pairs overwrite earlier ones.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Moves the value stored under `from` to `to`, if present.
///
/// Returns `true` when a value was moved. An existing value under `to` is
/// overwritten.
pub fn move_key(params: &mut Params, from: &str, to: &str) -> bool {
    if from == to {
        return params.contains_key(from);
    }
    match params.remove(from) {
        Some(value) => {
            params.insert(to.to_string(), value);
            true
        }
        None => false,
    }
}
