//! Application configuration for FuncRef.
//!
//! User config lives at `~/.funcref/funcref.toml`. Embedding applications
//! override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FuncRefError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "funcref.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".funcref";

// ---------------------------------------------------------------------------
// Config structs (matching funcref.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuncRefConfig {
    /// Rendering settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Source link settings.
    #[serde(default)]
    pub source_links: SourceLinksConfig,

    /// Sanitization settings.
    #[serde(default)]
    pub sanitize: SanitizeConfig,
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Localized connective inserted between union type alternatives.
    #[serde(default = "default_type_separator_label")]
    pub type_separator_label: String,

    /// CSS class prefix used for all generated fragments.
    #[serde(default = "default_css_prefix")]
    pub css_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            type_separator_label: default_type_separator_label(),
            css_prefix: default_css_prefix(),
        }
    }
}

fn default_type_separator_label() -> String {
    " or ".into()
}
fn default_css_prefix() -> String {
    "funcref".into()
}

/// `[source_links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLinksConfig {
    /// Repository browse URL that source file paths are joined to.
    /// When unset, no source links are emitted.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Fragment template for the line anchor; `{line}` is substituted.
    #[serde(default = "default_line_anchor")]
    pub line_anchor: String,
}

impl Default for SourceLinksConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            line_anchor: default_line_anchor(),
        }
    }
}

fn default_line_anchor() -> String {
    "#L{line}".into()
}

/// `[sanitize]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Tag names merged into the sanitizer's allow-list.
    #[serde(default)]
    pub extra_allowed_tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.funcref/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FuncRefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.funcref/funcref.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<FuncRefConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(FuncRefConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<FuncRefConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FuncRefError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FuncRefError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FuncRefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = FuncRefConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FuncRefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FuncRefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
