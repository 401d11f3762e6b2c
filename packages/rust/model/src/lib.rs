//! Entity-kind/relationship schema and the in-memory content model.
//!
//! The schema registry is constructed once at application startup and is
//! read-only thereafter; entity and term stores take writes only during the
//! single-writer import phase and are read-only at render time.

pub mod registry;
pub mod store;

pub use registry::{
    CATEGORY_PACKAGE, CATEGORY_SINCE, CATEGORY_SOURCE_FILE, CategoryConfig, KindConfig,
    KindSupports, SchemaRegistry, register_builtin_schema,
};
pub use store::{EntityStore, Term, TermStore};
