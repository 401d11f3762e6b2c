//! Fragment helpers: prototype, paragraph wrapping, source links.

use funcref_shared::Entity;
use funcref_shared::config::{RenderConfig, SourceLinksConfig};
use funcref_sanitize::humanize_with;
use tracing::warn;
use url::Url;

/// Render the signature prototype fragment for an entity.
///
/// When the importer supplied a pre-rendered prototype it is used verbatim;
/// otherwise one is derived from the return type and argument list, with
/// union return types humanized the same way argument types are.
pub fn prototype(entity: &Entity, config: &RenderConfig) -> String {
    if let Some(pre_rendered) = &entity.prototype {
        return pre_rendered.clone();
    }

    let prefix = &config.css_prefix;
    let mut signature = String::new();

    if let Some(ret) = &entity.return_type {
        signature.push_str(&humanize_with(ret, &config.type_separator_label, prefix));
        signature.push(' ');
    }

    signature.push_str(&entity.title);
    if entity.arguments.is_empty() {
        signature.push_str("()");
    } else {
        let params: Vec<String> = entity
            .arguments
            .iter()
            .map(|arg| format!("{} {}", arg.type_, arg.name))
            .collect();
        signature.push_str(&format!("( {} )", params.join(", ")));
    }

    format!("<p class=\"{prefix}-prototype\"><code>{signature}</code></p>")
}

/// Wrap blank-line-separated chunks of text in paragraph tags.
///
/// Empty input stays empty — no wrapper markup around an empty field.
/// Text that already begins with a block tag is assumed wrapped and is
/// returned as-is so repeated rendering does not nest paragraphs.
pub fn autop(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("<p>") || trimmed.starts_with("<p ") {
        return text.to_string();
    }

    trimmed
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| format!("<p>{chunk}</p>"))
        .collect()
}

/// Build the source link URL for an entity, when possible.
///
/// Requires both a source ref on the entity and a configured base URL;
/// a line number is appended using the configured anchor template.
pub fn source_link(entity: &Entity, config: &SourceLinksConfig) -> Option<String> {
    let source_ref = entity.source_ref.as_ref()?;
    let base = config.base_url.as_deref()?;

    let base_url = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => {
            warn!(base, error = %e, "invalid source link base URL, skipping source link");
            return None;
        }
    };

    let mut joined = match base_url.join(&source_ref.path) {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!(path = %source_ref.path, error = %e, "could not join source path");
            return None;
        }
    };

    if let Some(line) = source_ref.line {
        joined.push_str(&config.line_anchor.replace("{line}", &line.to_string()));
    }
    Some(joined)
}
