//! The ordered sanitization pipeline.
//!
//! The builtin stage order is fixed: markup filtering runs before
//! auto-linking so injected anchors are not re-escaped, texturizing runs
//! after tag balancing so it never sees malformed fragments, and slash
//! stripping runs last because it reverses storage-layer artifacts that
//! earlier passes must not reintroduce. Callers may append custom stages
//! but never reorder the builtins.

use std::sync::Arc;

use funcref_shared::config::SanitizeConfig;
use tracing::trace;

use crate::stages;

/// A single text→text transform in the pipeline.
#[derive(Clone)]
pub enum Stage {
    /// Strip markup not on the allow-list; remove `script`/`style` outright.
    FilterMarkup { extra_allowed: Vec<String> },
    /// Wrap bare URLs in anchor tags.
    AutoLink,
    /// Close unclosed tags, drop stray closers.
    BalanceTags,
    /// Smart quotes, dashes, ellipses.
    Texturize,
    /// Emoticons to canonical glyphs.
    ConvertSmilies,
    /// Bare `&` to `&amp;`, drop stray control characters.
    EncodeBareEntities,
    /// Collapse storage-layer backslash escaping to a fixed point.
    StripSlashes,
    /// Caller-supplied stage, appended after the builtins.
    Custom {
        name: String,
        transform: Arc<dyn Fn(&str) -> String + Send + Sync>,
    },
}

impl Stage {
    /// Stable stage name, used for tracing.
    pub fn name(&self) -> &str {
        match self {
            Stage::FilterMarkup { .. } => "filter_markup",
            Stage::AutoLink => "auto_link",
            Stage::BalanceTags => "balance_tags",
            Stage::Texturize => "texturize",
            Stage::ConvertSmilies => "convert_smilies",
            Stage::EncodeBareEntities => "encode_bare_entities",
            Stage::StripSlashes => "strip_slashes",
            Stage::Custom { name, .. } => name,
        }
    }

    /// Apply this stage. Stages never fail; malformed input degrades to
    /// best-effort output.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Stage::FilterMarkup { extra_allowed } => stages::filter_markup(text, extra_allowed),
            Stage::AutoLink => stages::auto_link(text),
            Stage::BalanceTags => stages::balance_tags(text),
            Stage::Texturize => stages::texturize(text),
            Stage::ConvertSmilies => stages::convert_smilies(text),
            Stage::EncodeBareEntities => stages::encode_bare_entities(text),
            Stage::StripSlashes => stages::strip_slashes(text),
            Stage::Custom { transform, .. } => transform(text),
        }
    }
}

// Custom stages hold trait objects, so Debug is by name only.
impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name()).finish()
    }
}

/// The ordered sanitization pipeline: the seven builtins plus any appended
/// custom stages.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_config(&SanitizeConfig::default())
    }
}

impl Pipeline {
    /// Build the builtin pipeline, honoring the `[sanitize]` config section.
    pub fn with_config(config: &SanitizeConfig) -> Self {
        Self {
            stages: vec![
                Stage::FilterMarkup {
                    extra_allowed: config.extra_allowed_tags.clone(),
                },
                Stage::AutoLink,
                Stage::BalanceTags,
                Stage::Texturize,
                Stage::ConvertSmilies,
                Stage::EncodeBareEntities,
                Stage::StripSlashes,
            ],
        }
    }

    /// Append a caller-supplied stage after the builtins.
    pub fn push_custom(
        &mut self,
        name: impl Into<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        self.stages.push(Stage::Custom {
            name: name.into(),
            transform: Arc::new(transform),
        });
    }

    /// Stage names in application order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Run the full pipeline on a text fragment. Never fails; empty input
    /// stays empty.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for stage in &self.stages {
            result = stage.apply(&result);
            trace!(stage = stage.name(), len = result.len(), "stage applied");
        }
        result
    }
}

/// Sanitize a text fragment with the default pipeline.
pub fn sanitize(text: &str) -> String {
    Pipeline::default().apply(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_order_is_fixed() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "filter_markup",
                "auto_link",
                "balance_tags",
                "texturize",
                "convert_smilies",
                "encode_bare_entities",
                "strip_slashes",
            ]
        );
    }

    #[test]
    fn custom_stage_appends_after_builtins() {
        let mut pipeline = Pipeline::default();
        pipeline.push_custom("shout", |t| t.to_uppercase());
        assert_eq!(pipeline.stage_names().last(), Some(&"shout"));
        assert_eq!(pipeline.apply("quiet text"), "QUIET TEXT");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "<script>alert(1)</script>Plain & \"quoted\" text with https://example.com/a?b=1&c=2 :)",
            "unclosed <em>emphasis -- and it's... over",
            r#"slash \'escaped\' storage text"#,
            "",
            "   \n\t  ",
            "already <a href=\"https://example.com\">https://example.com</a> linked",
        ];
        for input in inputs {
            let once = sanitize(input);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn sanitize_empty_is_empty() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn sanitize_whitespace_keeps_no_wrapper() {
        let result = sanitize("   ");
        assert!(!result.contains('<'));
    }

    #[test]
    fn sanitize_end_to_end() {
        let result = sanitize("<script>x</script>Bar desc");
        assert_eq!(result, "Bar desc");
    }
}
