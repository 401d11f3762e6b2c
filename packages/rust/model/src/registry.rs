//! The schema registry: documentable entity kinds and relationship
//! categories.
//!
//! Registration is the single mutation point for schema state. It runs once
//! during application initialization, before any entity is created; both
//! registration calls are idempotent on identical config and fail with
//! [`FuncRefError::ConfigurationConflict`] on differing config.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use funcref_shared::types::{KIND_CLASS, KIND_FUNCTION};
use funcref_shared::{FuncRefError, Result};

/// Name of the source-file relationship category.
pub const CATEGORY_SOURCE_FILE: &str = "source-file";

/// Name of the `@package` relationship category.
pub const CATEGORY_PACKAGE: &str = "package";

/// Name of the `@since` relationship category.
pub const CATEGORY_SINCE: &str = "since";

// ---------------------------------------------------------------------------
// Kind configuration
// ---------------------------------------------------------------------------

/// Auxiliary features an entity kind supports, each independently togglable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSupports {
    pub comments: bool,
    pub custom_fields: bool,
    pub editor: bool,
    pub excerpt: bool,
    pub page_attributes: bool,
    pub revisions: bool,
    pub title: bool,
}

impl KindSupports {
    /// Every auxiliary feature enabled.
    pub fn all() -> Self {
        Self {
            comments: true,
            custom_fields: true,
            editor: true,
            excerpt: true,
            page_attributes: true,
            revisions: true,
            title: true,
        }
    }
}

/// Configuration for a documentable entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindConfig {
    /// Unique kind name, e.g. `function`.
    pub name: String,
    /// Human-readable plural label.
    pub label: String,
    /// Whether entities of this kind may have a parent of the same kind.
    pub hierarchical: bool,
    /// Whether an archive listing exists for this kind.
    pub has_archive: bool,
    /// Default URL-path prefix for entity pages of this kind.
    pub url_prefix: String,
    /// Supported auxiliary features.
    pub supports: KindSupports,
}

// ---------------------------------------------------------------------------
// Category configuration
// ---------------------------------------------------------------------------

/// Configuration for a relationship category (a term taxonomy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Unique category name, e.g. `source-file`.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Entity kinds this category applies to. Every named kind must be
    /// registered before the category is.
    pub applies_to: BTreeSet<String>,
    /// Whether terms may have parent terms.
    pub hierarchical: bool,
    /// URL-path prefix for term archive pages, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
    /// Whether assignment order is significant.
    pub sorted: bool,
}

// ---------------------------------------------------------------------------
// SchemaRegistry
// ---------------------------------------------------------------------------

/// Process-wide schema state, held explicitly and passed by reference
/// rather than kept in a global.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    kinds: BTreeMap<String, KindConfig>,
    categories: BTreeMap<String, CategoryConfig>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a documentable entity kind.
    ///
    /// Registering the same name twice with identical config is a no-op;
    /// differing config is a fatal [`FuncRefError::ConfigurationConflict`].
    pub fn register_entity_kind(&mut self, config: KindConfig) -> Result<()> {
        if let Some(existing) = self.kinds.get(&config.name) {
            if *existing == config {
                debug!(kind = %config.name, "entity kind already registered, no-op");
                return Ok(());
            }
            return Err(FuncRefError::conflict(
                &config.name,
                "entity kind re-registered with differing settings",
            ));
        }

        debug!(kind = %config.name, hierarchical = config.hierarchical, "registered entity kind");
        self.kinds.insert(config.name.clone(), config);
        Ok(())
    }

    /// Register a relationship category.
    ///
    /// Every kind in `applies_to` must already be registered; idempotence
    /// and conflict rules match [`Self::register_entity_kind`].
    pub fn register_relationship_category(&mut self, config: CategoryConfig) -> Result<()> {
        for kind in &config.applies_to {
            if !self.kinds.contains_key(kind) {
                return Err(FuncRefError::unknown_kind(kind));
            }
        }

        if let Some(existing) = self.categories.get(&config.name) {
            if *existing == config {
                debug!(category = %config.name, "category already registered, no-op");
                return Ok(());
            }
            return Err(FuncRefError::conflict(
                &config.name,
                "relationship category re-registered with differing settings",
            ));
        }

        debug!(category = %config.name, "registered relationship category");
        self.categories.insert(config.name.clone(), config);
        Ok(())
    }

    /// Look up a registered entity kind.
    pub fn entity_kind(&self, name: &str) -> Option<&KindConfig> {
        self.kinds.get(name)
    }

    /// Look up a registered relationship category.
    pub fn relationship_category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.get(name)
    }

    /// Whether `name` is a registered kind.
    pub fn is_registered_kind(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Registered categories that apply to the given kind.
    pub fn categories_for(&self, kind: &str) -> impl Iterator<Item = &CategoryConfig> {
        self.categories
            .values()
            .filter(move |c| c.applies_to.contains(kind))
    }
}

// ---------------------------------------------------------------------------
// Builtin schema
// ---------------------------------------------------------------------------

/// Register the builtin `function`/`class` kinds and the three builtin
/// relationship categories (source file, `@package`, `@since`).
pub fn register_builtin_schema(registry: &mut SchemaRegistry) -> Result<()> {
    // Functions may be hierarchical (namespaced/overloaded forms).
    registry.register_entity_kind(KindConfig {
        name: KIND_FUNCTION.into(),
        label: "Functions".into(),
        hierarchical: true,
        has_archive: true,
        url_prefix: "functions".into(),
        supports: KindSupports::all(),
    })?;

    registry.register_entity_kind(KindConfig {
        name: KIND_CLASS.into(),
        label: "Classes".into(),
        hierarchical: false,
        has_archive: true,
        url_prefix: "classes".into(),
        supports: KindSupports {
            page_attributes: false,
            ..KindSupports::all()
        },
    })?;

    let both: BTreeSet<String> = [KIND_FUNCTION.to_string(), KIND_CLASS.to_string()].into();

    registry.register_relationship_category(CategoryConfig {
        name: CATEGORY_SOURCE_FILE.into(),
        label: "Files".into(),
        applies_to: both.clone(),
        hierarchical: true,
        url_prefix: Some("files".into()),
        sorted: false,
    })?;

    registry.register_relationship_category(CategoryConfig {
        name: CATEGORY_PACKAGE.into(),
        label: "@package".into(),
        applies_to: both.clone(),
        hierarchical: true,
        url_prefix: None,
        sorted: false,
    })?;

    registry.register_relationship_category(CategoryConfig {
        name: CATEGORY_SINCE.into(),
        label: "@since".into(),
        applies_to: both,
        hierarchical: true,
        url_prefix: None,
        sorted: false,
    })?;

    Ok(())
}
