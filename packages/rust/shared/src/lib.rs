//! Shared types, error model, and configuration for FuncRef.
//!
//! This crate is the foundation depended on by all other FuncRef crates.
//! It provides:
//! - [`FuncRefError`] — the unified error type
//! - Domain types ([`Entity`], [`Argument`], [`SourceRef`], [`EntityId`])
//! - Configuration ([`FuncRefConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    FuncRefConfig, RenderConfig, SanitizeConfig, SourceLinksConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{FuncRefError, Result};
pub use types::{Argument, Entity, EntityId, NewEntity, SourceRef};
