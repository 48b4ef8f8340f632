//! Argument positioning: normalized parameter map -> ordered argument list.
//!
//! Each operation declares the parameter keys it takes, in order. The
//! positioner emits the value of each declared key, `null` when absent.
//!
//! **Packed options.** The declared key [`OPTIONS_SLOT`] is synthetic: the
//! optional sub-keys in [`PACKED_OPTION_KEYS`] found in the parameters are
//! copied into a fresh object that is emitted at the slot's position, or
//! `null` when none of them is present.
//!
//! Keys that are neither declared nor packed are dropped.

use serde_json::{Map, Value};

use crate::operation::OperationKind;
use crate::params::Params;

/// Declared key marking the packed-options slot.
pub const OPTIONS_SLOT: &str = "options";

/// Optional sub-keys gathered into the packed-options slot, in emission order.
pub const PACKED_OPTION_KEYS: &[&str] = &[
    "topic",
    "nsfw",
    "slowmode",
    "userLimit",
    "bitrate",
    "parentId",
    "isPrivate",
    "allowedRoles",
];

/// Orders `params` according to `order`, packing `option_keys` into the
/// [`OPTIONS_SLOT`] position when the order declares one.
#[must_use]
pub fn position_args(order: &[&str], option_keys: &[&str], params: &Params) -> Vec<Value> {
    order
        .iter()
        .map(|&key| {
            if key == OPTIONS_SLOT {
                pack_options(option_keys, params)
            } else {
                params.get(key).cloned().unwrap_or(Value::Null)
            }
        })
        .collect()
}

fn pack_options(option_keys: &[&str], params: &Params) -> Value {
    let packed: Map<String, Value> = option_keys
        .iter()
        .filter_map(|&key| params.get(key).map(|v| (key.to_string(), v.clone())))
        .collect();
    if packed.is_empty() {
        Value::Null
    } else {
        Value::Object(packed)
    }
}

impl OperationKind {
    /// Returns true if this operation declares a packed-options slot.
    #[must_use]
    pub fn packs_options(self) -> bool {
        self.arg_order().contains(&OPTIONS_SLOT)
    }

    /// Returns true if `key` reaches this operation, either as a declared
    /// argument or as a packed option sub-key.
    #[must_use]
    pub fn takes_key(self, key: &str) -> bool {
        self.accepts(key) || (self.packs_options() && PACKED_OPTION_KEYS.contains(&key))
    }

    /// Positional argument list for this operation.
    #[must_use]
    pub fn positional_args(self, params: &Params) -> Vec<Value> {
        position_args(self.arg_order(), PACKED_OPTION_KEYS, params)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::operation::ChannelOptions;
    use crate::params::params;

    #[test]
    fn emits_declared_keys_in_order() {
        let p = params([("message", json!("hi")), ("channelId", json!("123"))]);
        let args = OperationKind::SendMessage.positional_args(&p);
        assert_eq!(args, vec![json!("123"), json!("hi")]);
    }

    #[test]
    fn absent_keys_become_null() {
        let p = params([("channelId", json!("123"))]);
        let args = OperationKind::GetMessages.positional_args(&p);
        assert_eq!(args, vec![json!("123"), Value::Null]);
    }

    #[test]
    fn packs_present_option_keys_and_drops_unrelated() {
        let p = params([
            ("topic", json!("t")),
            ("nsfw", json!(true)),
            ("unrelated", json!("x")),
        ]);
        let args = position_args(&["name", OPTIONS_SLOT], &["topic", "nsfw"], &p);
        assert_eq!(args, vec![Value::Null, json!({"topic": "t", "nsfw": true})]);
    }

    #[test]
    fn options_slot_null_when_no_sub_keys_present() {
        let p = params([("name", json!("general"))]);
        let args = OperationKind::CreateTextChannel.positional_args(&p);
        assert_eq!(args, vec![Value::Null, json!("general"), Value::Null]);
    }

    #[test]
    fn option_keys_emitted_in_declared_order() {
        let p = params([("bitrate", json!(64_000)), ("topic", json!("t"))]);
        let args = OperationKind::CreateVoiceChannel.positional_args(&p);
        let packed = args[2].as_object().unwrap();
        let keys: Vec<&str> = packed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["topic", "bitrate"]);
    }

    #[test]
    fn packed_keys_match_channel_options_fields() {
        let full = ChannelOptions {
            topic: Some(String::new()),
            nsfw: Some(false),
            slowmode: Some(String::new()),
            user_limit: Some(String::new()),
            bitrate: Some(0),
            parent_id: Some(String::new()),
            is_private: Some(false),
            allowed_roles: Some(Vec::new()),
        };
        let value = serde_json::to_value(full).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, PACKED_OPTION_KEYS);
    }

    #[test]
    fn takes_key_covers_packed_options_only_for_packing_operations() {
        assert!(OperationKind::CreateTextChannel.takes_key("topic"));
        assert!(OperationKind::CreateTextChannel.takes_key("name"));
        assert!(!OperationKind::SendMessage.takes_key("topic"));
    }
}
