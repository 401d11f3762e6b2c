//! The content-expansion renderer.

use tracing::instrument;

use funcref_model::SchemaRegistry;
use funcref_sanitize::{Pipeline, humanize_with, sanitize_arguments};
use funcref_shared::config::FuncRefConfig;
use funcref_shared::types::{KIND_CLASS, KIND_FUNCTION};
use funcref_shared::{Entity, FuncRefError, Result};

use crate::hooks::RenderHooks;
use crate::template;

/// Assembles the full replacement text for a displayed entity.
///
/// Stateless per call: the registry and hooks are written once at startup
/// and read-only thereafter, so concurrent renders share no mutable state.
pub struct Renderer<'a> {
    registry: &'a SchemaRegistry,
    config: FuncRefConfig,
    hooks: RenderHooks,
    pipeline: Pipeline,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a SchemaRegistry, config: FuncRefConfig) -> Self {
        let pipeline = Pipeline::with_config(&config.sanitize);
        Self {
            registry,
            config,
            hooks: RenderHooks::default(),
            pipeline,
        }
    }

    /// Extension points. Register filters during startup, before the first
    /// render call.
    pub fn hooks_mut(&mut self) -> &mut RenderHooks {
        &mut self.hooks
    }

    /// The sanitization pipeline, for appending custom stages at startup.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Expand the stored body of an entity with its reference fragments.
    ///
    /// Only `function` and `class` entities are expanded; other registered
    /// kinds pass the body through unchanged. An unregistered kind is an
    /// [`FuncRefError::UnknownEntityKind`] the caller should log and skip.
    #[instrument(skip_all, fields(kind = %entity.kind, title = %entity.title))]
    pub fn render(&self, entity: &Entity, stored_body: &str) -> Result<String> {
        if !self.registry.is_registered_kind(&entity.kind) {
            return Err(FuncRefError::unknown_kind(&entity.kind));
        }
        if entity.kind != KIND_FUNCTION && entity.kind != KIND_CLASS {
            return Ok(stored_body.to_string());
        }

        let before = self.hooks.before_fragment.apply(self.before_fragment(entity));
        let after = self.hooks.after_fragment.apply(self.after_fragment(entity));

        Ok(format!("{before}{stored_body}{after}"))
    }

    /// Prototype + sanitized short description + the opening of the
    /// long-description container. The container is deliberately left open:
    /// the stored body *is* the long description and nests inside it.
    fn before_fragment(&self, entity: &Entity) -> String {
        let prefix = &self.config.render.css_prefix;
        let excerpt = entity
            .excerpt
            .as_deref()
            .map(|text| self.pipeline.apply(text))
            .unwrap_or_default();

        let mut before = template::prototype(entity, &self.config.render);
        before.push_str(&format!("<p class=\"{prefix}-description\">{excerpt}</p>"));
        before.push_str(&format!("<div class=\"{prefix}-longdesc\">"));
        before
    }

    /// Close the long-description container, then the argument list and the
    /// source link. The argument section always renders, even with zero
    /// arguments, so the output shape stays consistent.
    fn after_fragment(&self, entity: &Entity) -> String {
        let prefix = &self.config.render.css_prefix;
        let label = &self.config.render.type_separator_label;

        let mut after = String::from("</div>");
        after.push_str(&format!("<div class=\"{prefix}-arguments\"><h3>Arguments</h3>"));

        let args = sanitize_arguments(&entity.arguments, &self.pipeline);
        let args = self.hooks.args.apply(args);
        for arg in &args {
            let type_html = self
                .hooks
                .type_string
                .apply(humanize_with(&arg.type_, label, prefix));
            after.push_str(&format!("<div class=\"{prefix}-arg\">"));
            after.push_str(&format!(
                "<h4><code><span class=\"type\">{type_html}</span> <span class=\"variable\">{}</span></code></h4>",
                arg.name
            ));
            after.push_str(&template::autop(&arg.desc));
            after.push_str("</div>");
        }
        after.push_str("</div>");

        if let Some(link) = template::source_link(entity, &self.config.source_links) {
            after.push_str(&format!("<a href=\"{link}\">Source</a>"));
        }
        after
    }
}
