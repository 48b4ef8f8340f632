//! Human-readable registry description.

use std::fmt::{self, Display, Formatter};

use crate::error::DispatchError;
use crate::position::PACKED_OPTION_KEYS;
use crate::registry::{ActionDef, ActionRegistry, CategoryDef, Rename, ResourceDef, Target};

/// Describes one category, or every category and resource when `category`
/// is `None`.
///
/// # Errors
///
/// `DispatchError::InvalidCategory` when `category` is not registered, with
/// the same message `execute` produces.
pub fn describe(registry: &ActionRegistry, category: Option<&str>) -> Result<String, DispatchError> {
    match category {
        Some(name) => Ok(CategoryText(registry.check_category(name)?).to_string()),
        None => Ok(RegistryText(registry).to_string()),
    }
}

struct RegistryText<'a>(&'a ActionRegistry);

impl Display for RegistryText<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for def in self.0.categories() {
            writeln!(f, "{}", CategoryText(def))?;
        }
        writeln!(f, "Resources:")?;
        for def in self.0.resources() {
            write_resource(f, def)?;
        }
        Ok(())
    }
}

struct CategoryText<'a>(&'a CategoryDef);

impl Display for CategoryText<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let def = self.0;
        writeln!(f, "{}: {}", def.name, def.summary)?;
        if let Some(resource) = def.default_resource {
            writeln!(f, "  query '{}' reads resource '{resource}'", def.name)?;
        }
        for action in def.actions {
            write_action(f, action)?;
        }
        Ok(())
    }
}

fn write_action(f: &mut Formatter<'_>, action: &ActionDef) -> fmt::Result {
    writeln!(f, "  {}: {}", action.name, action.summary)?;
    match action.target {
        Target::Fixed(kind) => writeln!(f, "    -> {}", kind.signature())?,
        Target::Dynamic {
            discriminator,
            candidates,
            ..
        } => {
            writeln!(f, "    routed on '{discriminator}':")?;
            for kind in candidates {
                writeln!(f, "    -> {}", kind.signature())?;
            }
        }
    }
    if action.target.candidates().iter().any(|k| k.packs_options()) {
        writeln!(f, "    options: {}", PACKED_OPTION_KEYS.join(", "))?;
    }
    write_renames(f, action.renames)
}

fn write_resource(f: &mut Formatter<'_>, def: &ResourceDef) -> fmt::Result {
    writeln!(f, "  {}: {}", def.name, def.summary)?;
    writeln!(f, "    -> {}", def.operation.signature())?;
    write_renames(f, def.renames)
}

fn write_renames(f: &mut Formatter<'_>, renames: &[Rename]) -> fmt::Result {
    if renames.is_empty() {
        return Ok(());
    }
    let pairs: Vec<String> = renames
        .iter()
        .map(|r| format!("{} as {}", r.from, r.to))
        .collect();
    writeln!(f, "    accepts: {}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ActionRegistry {
        ActionRegistry::builtin().unwrap()
    }

    #[test]
    fn describes_single_category_with_signatures() {
        let text = describe(&registry(), Some("message")).unwrap();
        assert!(text.starts_with("message: "));
        assert!(text.contains("sendMessage(channelId, message)"));
        assert!(text.contains("accepts: replyTo as messageId"));
    }

    #[test]
    fn dynamic_actions_list_every_candidate() {
        let text = describe(&registry(), Some("channel")).unwrap();
        assert!(text.contains("routed on 'type'"));
        assert!(text.contains("createVoiceChannel("));
        assert!(text.contains("createForumChannel("));
        assert!(text.contains("options: topic, nsfw"));
    }

    #[test]
    fn describes_everything_without_category() {
        let text = describe(&registry(), None).unwrap();
        assert!(text.contains("Resources:"));
        assert!(text.contains("voice: "));
        assert!(text.contains("message_search: "));
        assert!(text.contains("  query 'channel' reads resource 'channels'"));
        assert!(text.contains("  channel_info: "));
    }

    #[test]
    fn unknown_category_matches_execute_error() {
        let reg = registry();
        let err = describe(&reg, Some("nope")).unwrap_err();
        assert_eq!(err, reg.check_category("nope").unwrap_err());
        assert!(err.to_string().starts_with("Invalid category 'nope'"));
    }
}
