//! Error taxonomy for dispatch, resolution, registry construction, and binding.

use thiserror::Error;

/// Errors surfaced by the dispatch layer.
///
/// Every variant is recovered into a failed `ExecutionResult`; none escapes
/// `execute`, `query`, or `batch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Invalid category '{category}'. Valid categories: {}", .valid.join(", "))]
    InvalidCategory {
        category: String,
        valid: Vec<&'static str>,
    },
    #[error("Invalid action '{action}' for category '{category}'. Valid actions: {}", .valid.join(", "))]
    InvalidAction {
        category: String,
        action: String,
        valid: Vec<&'static str>,
    },
    #[error("Invalid resource '{resource}'. Valid resources: {}", .valid.join(", "))]
    InvalidResource {
        resource: String,
        valid: Vec<&'static str>,
    },
    #[error("Invalid parameters for {operation}: {reason}")]
    InvalidParameters { operation: String, reason: String },
    /// Registry inconsistency: validation passed but resolution did not.
    #[error("Failed to resolve {target}: {reason}")]
    ResolutionFailure { target: String, reason: String },
    #[error("{operation} failed: {message}")]
    UnderlyingOperationFailure {
        operation: &'static str,
        message: String,
    },
}

/// Errors from resolving a request against the action registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unknown action '{action}' in category '{category}'")]
    UnknownAction { category: String, action: String },
    #[error("unknown resource '{0}'")]
    UnknownResource(String),
    /// A dynamic resolver did not recognise the value of its discriminator key.
    #[error("unsupported {key} '{value}', expected one of: {}", .expected.join(", "))]
    Discriminator {
        key: &'static str,
        value: String,
        expected: &'static [&'static str],
    },
}

/// Errors from building an `ActionRegistry` out of static tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate category '{0}'")]
    DuplicateCategory(&'static str),
    #[error("duplicate action '{action}' in category '{category}'")]
    DuplicateAction {
        category: &'static str,
        action: &'static str,
    },
    #[error("duplicate resource '{0}'")]
    DuplicateResource(&'static str),
    #[error("{owner} renames '{from}' to '{to}', which {operation} does not accept")]
    DanglingRename {
        owner: String,
        from: &'static str,
        to: &'static str,
        operation: &'static str,
    },
    #[error("category '{category}' defaults to unregistered resource '{resource}'")]
    UnknownDefaultResource {
        category: &'static str,
        resource: &'static str,
    },
    #[error("{owner} renames '{from}', which normalization always rewrites to '{canonical}'")]
    AliasedRename {
        owner: String,
        from: &'static str,
        canonical: &'static str,
    },
    #[error("category '{category}' is shadowed by a resource of the same name (default: {default:?})")]
    ShadowedCategory {
        category: &'static str,
        default: Option<&'static str>,
    },
    #[error("{owner} declares no candidate operations")]
    NoCandidates { owner: String },
}

/// Errors from binding a positional argument list to a typed operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("missing required parameter '{key}'")]
    Missing { key: &'static str },
    #[error("parameter '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_category_lists_valid_names() {
        let err = DispatchError::InvalidCategory {
            category: "nope".into(),
            valid: vec!["message", "channel"],
        };
        assert_eq!(
            err.to_string(),
            "Invalid category 'nope'. Valid categories: message, channel"
        );
    }

    #[test]
    fn discriminator_error_lists_expected_values() {
        let err = ResolveError::Discriminator {
            key: "type",
            value: "stage".into(),
            expected: &["text", "voice"],
        };
        assert_eq!(
            err.to_string(),
            "unsupported type 'stage', expected one of: text, voice"
        );
    }
}
