//! Core domain types for FuncRef documentation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind name for documented functions.
pub const KIND_FUNCTION: &str = "function";

/// Kind name for documented classes.
pub const KIND_CLASS: &str = "class";

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for entity identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new time-sortable entity identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Argument
// ---------------------------------------------------------------------------

/// A single documented parameter of a function or class member.
///
/// Arguments are positional; their order mirrors the source signature and is
/// preserved end-to-end through sanitization and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Declared type. May be a union expressed as pipe-separated
    /// alternatives, e.g. `"int|string"`.
    #[serde(rename = "type")]
    pub type_: String,
    /// Parameter name as written in the signature.
    pub name: String,
    /// Free-form description from the doc block. Unsanitized on ingest.
    #[serde(default)]
    pub desc: String,
}

// ---------------------------------------------------------------------------
// SourceRef
// ---------------------------------------------------------------------------

/// Reference to the source location an entity was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Path of the originating file, relative to the repository root.
    pub path: String,
    /// 1-based line number of the declaration, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A documentable unit: a function or a class.
///
/// Created and updated by the import phase from pre-parsed metadata;
/// read-only at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier (UUID v7).
    pub id: EntityId,
    /// Registered kind name this entity belongs to.
    pub kind: String,
    /// Symbol name (e.g. the function name).
    pub title: String,
    /// Short description extracted from the doc block summary line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Long description — the stored body text the renderer wraps.
    #[serde(default)]
    pub body: String,
    /// Documented parameters in signature order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
    /// Declared return type; may be a pipe-separated union.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Where the symbol was parsed from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceRef>,
    /// Opaque pre-rendered signature fragment. When absent the renderer
    /// derives one from `return_type` and `arguments`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype: Option<String>,
    /// Parent entity for hierarchical kinds (e.g. namespaced functions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an entity; the store assigns id and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntity {
    /// Registered kind name.
    pub kind: String,
    /// Symbol name.
    pub title: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Long description body.
    #[serde(default)]
    pub body: String,
    /// Documented parameters in signature order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
    /// Declared return type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Originating source location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceRef>,
    /// Pre-rendered signature fragment, if the importer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype: Option<String>,
    /// Parent entity for hierarchical kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
}
