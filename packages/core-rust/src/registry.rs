//! Action registry: `(category, action)` and `resource` -> underlying operation.
//!
//! The registry is built once from static tables (see [`crate::catalog`]),
//! checked for consistency at construction, and then shared read-only.
//!
//! Resolution of an action:
//!
//! 1. look up the category, then the action within it;
//! 2. pick the operation, either the action's fixed target or the result of
//!    its dynamic resolver run on the already-normalized parameters;
//! 3. apply the action's rename table (after dynamic resolution, so resolvers
//!    see pre-rename keys).
//!
//! Resolution of a query is the same without step 2's dynamic branch.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::{DispatchError, RegistryError, ResolveError};
use crate::normalize::canonical_key;
use crate::operation::OperationKind;
use crate::params::{move_key, Params};

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

/// Dynamic resolver: inspects normalized parameters, picks an operation, and
/// may strip or move the keys it consumed for routing.
pub type Resolver = fn(&mut Params) -> Result<OperationKind, ResolveError>;

/// How an action picks its underlying operation.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Fixed(OperationKind),
    Dynamic {
        /// Parameter key the resolver routes on (for help text).
        discriminator: &'static str,
        /// Every operation the resolver may return.
        candidates: &'static [OperationKind],
        resolve: Resolver,
    },
}

impl Target {
    /// Operations this target can resolve to.
    #[must_use]
    pub fn candidates(&self) -> &[OperationKind] {
        match self {
            Target::Fixed(kind) => std::slice::from_ref(kind),
            Target::Dynamic { candidates, .. } => candidates,
        }
    }
}

/// Moves a caller key to the key the operation expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    pub from: &'static str,
    pub to: &'static str,
}

/// One action within a category.
#[derive(Debug, Clone, Copy)]
pub struct ActionDef {
    pub name: &'static str,
    pub summary: &'static str,
    pub target: Target,
    pub renames: &'static [Rename],
}

/// A named group of actions.
#[derive(Debug, Clone, Copy)]
pub struct CategoryDef {
    pub name: &'static str,
    pub summary: &'static str,
    pub actions: &'static [ActionDef],
    /// Resource queried when the category name itself is used as a resource.
    pub default_resource: Option<&'static str>,
}

impl CategoryDef {
    /// Looks up an action by name.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&'static ActionDef> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Action names in declaration order.
    #[must_use]
    pub fn action_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name).collect()
    }
}

/// A named readable entity.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub name: &'static str,
    pub summary: &'static str,
    pub operation: OperationKind,
    pub renames: &'static [Rename],
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub operation: OperationKind,
    pub params: Params,
}

/// Registry introspection: category -> action names, plus resource names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpIndex {
    pub categories: BTreeMap<&'static str, Vec<&'static str>>,
    pub resources: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

/// Immutable registry of categories, actions, and query resources.
#[derive(Debug)]
pub struct ActionRegistry {
    categories: Vec<&'static CategoryDef>,
    category_index: HashMap<&'static str, usize>,
    resources: Vec<&'static ResourceDef>,
    resource_index: HashMap<&'static str, usize>,
}

impl ActionRegistry {
    /// Builds a registry from static tables.
    ///
    /// # Errors
    ///
    /// Rejects duplicate category, action, or resource names; renames whose
    /// source is an alias normalization always rewrites; renames whose target
    /// key none of the candidate operations accepts; dynamic targets without
    /// candidates; category defaults naming an unregistered resource; and
    /// categories whose name is taken by a resource other than their default.
    pub fn new(
        categories: &'static [CategoryDef],
        resources: &'static [ResourceDef],
    ) -> Result<Self, RegistryError> {
        let mut resource_index = HashMap::with_capacity(resources.len());
        for (i, resource) in resources.iter().enumerate() {
            if resource_index.insert(resource.name, i).is_some() {
                return Err(RegistryError::DuplicateResource(resource.name));
            }
            check_renames(
                &format!("resource '{}'", resource.name),
                resource.renames,
                std::slice::from_ref(&resource.operation),
            )?;
        }

        let mut category_index = HashMap::with_capacity(categories.len());
        for (i, category) in categories.iter().enumerate() {
            if category_index.insert(category.name, i).is_some() {
                return Err(RegistryError::DuplicateCategory(category.name));
            }
            if let Some(resource) = category.default_resource {
                if !resource_index.contains_key(resource) {
                    return Err(RegistryError::UnknownDefaultResource {
                        category: category.name,
                        resource,
                    });
                }
            }
            if resource_index.contains_key(category.name)
                && category.default_resource != Some(category.name)
            {
                return Err(RegistryError::ShadowedCategory {
                    category: category.name,
                    default: category.default_resource,
                });
            }
            let mut seen = HashSet::with_capacity(category.actions.len());
            for action in category.actions {
                if !seen.insert(action.name) {
                    return Err(RegistryError::DuplicateAction {
                        category: category.name,
                        action: action.name,
                    });
                }
                let owner = format!("action '{}.{}'", category.name, action.name);
                let candidates = action.target.candidates();
                if candidates.is_empty() {
                    return Err(RegistryError::NoCandidates { owner });
                }
                check_renames(&owner, action.renames, candidates)?;
            }
        }

        Ok(Self {
            categories: categories.iter().collect(),
            category_index,
            resources: resources.iter().collect(),
            resource_index,
        })
    }

    /// Builds the registry from the builtin catalog.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the builtin tables are inconsistent.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(crate::catalog::CATEGORIES, crate::catalog::RESOURCES)
    }

    // ----- Lookups -----

    /// Looks up a category by name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&'static CategoryDef> {
        self.category_index.get(name).map(|&i| self.categories[i])
    }

    /// Looks up a registered resource by name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&'static ResourceDef> {
        self.resource_index.get(name).map(|&i| self.resources[i])
    }

    /// Looks up the resource a query names: a registered resource, or the
    /// default resource of a category with that name.
    #[must_use]
    pub fn query_target(&self, name: &str) -> Option<&'static ResourceDef> {
        self.resource(name).or_else(|| {
            self.category(name)
                .and_then(|c| c.default_resource)
                .and_then(|r| self.resource(r))
        })
    }

    /// Category names in registration order.
    #[must_use]
    pub fn category_names(&self) -> Vec<&'static str> {
        self.categories.iter().map(|c| c.name).collect()
    }

    /// Action names of `category`, or `None` if the category is unknown.
    #[must_use]
    pub fn action_names(&self, category: &str) -> Option<Vec<&'static str>> {
        self.category(category).map(CategoryDef::action_names)
    }

    /// Resource names in registration order.
    #[must_use]
    pub fn resource_names(&self) -> Vec<&'static str> {
        self.resources.iter().map(|r| r.name).collect()
    }

    /// Every name `query` accepts: resources, then categories that default
    /// to a resource under a different name.
    #[must_use]
    pub fn query_names(&self) -> Vec<&'static str> {
        let aliases = self
            .categories
            .iter()
            .filter(|c| c.default_resource.is_some_and(|r| r != c.name))
            .map(|c| c.name);
        self.resource_names().into_iter().chain(aliases).collect()
    }

    /// Iterates categories in registration order.
    pub fn categories(&self) -> impl Iterator<Item = &'static CategoryDef> + '_ {
        self.categories.iter().copied()
    }

    /// Iterates resources in registration order.
    pub fn resources(&self) -> impl Iterator<Item = &'static ResourceDef> + '_ {
        self.resources.iter().copied()
    }

    /// Category -> actions map plus resource names.
    #[must_use]
    pub fn help(&self) -> HelpIndex {
        HelpIndex {
            categories: self
                .categories
                .iter()
                .map(|c| (c.name, c.action_names()))
                .collect(),
            resources: self.resource_names(),
        }
    }

    // ----- Validation -----

    /// Validates a category name.
    ///
    /// # Errors
    ///
    /// `DispatchError::InvalidCategory` listing every registered category.
    pub fn check_category(&self, category: &str) -> Result<&'static CategoryDef, DispatchError> {
        self.category(category)
            .ok_or_else(|| DispatchError::InvalidCategory {
                category: category.to_string(),
                valid: self.category_names(),
            })
    }

    /// Validates a category and action name pair.
    ///
    /// # Errors
    ///
    /// `DispatchError::InvalidCategory` or `DispatchError::InvalidAction`,
    /// each listing the valid names.
    pub fn check_action(
        &self,
        category: &str,
        action: &str,
    ) -> Result<&'static ActionDef, DispatchError> {
        let def = self.check_category(category)?;
        def.action(action).ok_or_else(|| DispatchError::InvalidAction {
            category: category.to_string(),
            action: action.to_string(),
            valid: def.action_names(),
        })
    }

    /// Validates a query resource name.
    ///
    /// # Errors
    ///
    /// `DispatchError::InvalidResource` listing every queryable name.
    pub fn check_resource(&self, resource: &str) -> Result<&'static ResourceDef, DispatchError> {
        self.query_target(resource)
            .ok_or_else(|| DispatchError::InvalidResource {
                resource: resource.to_string(),
                valid: self.query_names(),
            })
    }

    // ----- Resolution -----

    /// Resolves an action to its operation and renamed parameters.
    ///
    /// `params` must already be normalized.
    ///
    /// # Errors
    ///
    /// `ResolveError::UnknownCategory` / `UnknownAction` for names not in the
    /// registry, or whatever the action's dynamic resolver rejects.
    pub fn resolve_action(
        &self,
        category: &str,
        action: &str,
        mut params: Params,
    ) -> Result<Resolved, ResolveError> {
        let def = self
            .category(category)
            .ok_or_else(|| ResolveError::UnknownCategory(category.to_string()))?
            .action(action)
            .ok_or_else(|| ResolveError::UnknownAction {
                category: category.to_string(),
                action: action.to_string(),
            })?;

        let operation = match def.target {
            Target::Fixed(kind) => kind,
            Target::Dynamic { resolve, .. } => resolve(&mut params)?,
        };
        apply_renames(&mut params, def.renames);

        debug!(category, action, operation = operation.name(), "resolved action");
        Ok(Resolved { operation, params })
    }

    /// Resolves a query to its operation and renamed filters.
    ///
    /// # Errors
    ///
    /// `ResolveError::UnknownResource` if neither a resource nor a category
    /// default matches `resource`.
    pub fn resolve_query(&self, resource: &str, mut filters: Params) -> Result<Resolved, ResolveError> {
        let def = self
            .query_target(resource)
            .ok_or_else(|| ResolveError::UnknownResource(resource.to_string()))?;
        apply_renames(&mut filters, def.renames);

        debug!(resource, operation = def.operation.name(), "resolved query");
        Ok(Resolved {
            operation: def.operation,
            params: filters,
        })
    }
}

fn apply_renames(params: &mut Params, renames: &[Rename]) {
    for rename in renames {
        move_key(params, rename.from, rename.to);
    }
}

fn check_renames(
    owner: &str,
    renames: &'static [Rename],
    candidates: &[OperationKind],
) -> Result<(), RegistryError> {
    for rename in renames {
        let canonical = canonical_key(rename.from);
        if canonical != rename.from {
            return Err(RegistryError::AliasedRename {
                owner: owner.to_string(),
                from: rename.from,
                canonical,
            });
        }
        if !candidates.iter().any(|k| k.takes_key(rename.to)) {
            return Err(RegistryError::DanglingRename {
                owner: owner.to_string(),
                from: rename.from,
                to: rename.to,
                operation: candidates.first().map_or("", |k| k.name()),
            });
        }
    }
    Ok(())
}
