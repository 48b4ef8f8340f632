//! Parameter normalization shared by the execute and query paths.
//!
//! Two rules, applied per key in input order:
//!
//! 1. **Alias**: a few caller-facing names are rewritten to their canonical
//!    name (`limit` -> `count`, `content` -> `message`, ...).
//! 2. **Numeric coercion**: canonical keys that conventionally hold small
//!    non-negative integers have numeric values rewritten to decimal text,
//!    because the platform operations take these as text. Non-numeric values
//!    are left alone.
//!
//! Coercion is keyed on the post-alias name, so `{limit: 10}` becomes
//! `{count: "10"}`.

use serde_json::Value;

use crate::params::Params;

/// Canonical key holding a result count or limit.
pub const COUNT_KEY: &str = "count";

/// Canonical key holding a message body.
pub const MESSAGE_KEY: &str = "message";

/// Caller-facing key -> canonical key.
pub const KEY_ALIASES: &[(&str, &str)] = &[
    ("limit", COUNT_KEY),
    ("content", MESSAGE_KEY),
    ("text", MESSAGE_KEY),
    ("serverId", "guildId"),
];

/// Canonical keys whose numeric values are coerced to text.
pub const NUMERIC_TEXT_KEYS: &[&str] = &[
    COUNT_KEY,
    "position",
    "volume",
    "userLimit",
    "slowmode",
    "duration",
    "maxAge",
    "maxUses",
    "deleteMessageDays",
    "autoArchiveDuration",
];

/// Returns the canonical name for `key`, or `key` itself when it has no alias.
#[must_use]
pub fn canonical_key(key: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |&(_, canonical)| canonical)
}

/// Returns true if `key` is one of the numeric-to-text coercion keys.
#[must_use]
pub fn is_numeric_text_key(key: &str) -> bool {
    NUMERIC_TEXT_KEYS.contains(&key)
}

/// Normalizes a caller-supplied parameter map.
///
/// When two input keys collapse onto the same canonical key (`content` and
/// `message`, say), the one later in input order wins.
#[must_use]
pub fn normalize(params: Params) -> Params {
    let mut out = Params::with_capacity(params.len());
    for (key, value) in params {
        let key = canonical_key(&key).to_string();
        let value = match value {
            Value::Number(n) if is_numeric_text_key(&key) => Value::String(n.to_string()),
            other => other,
        };
        out.insert(key, value);
    }
    out
}
