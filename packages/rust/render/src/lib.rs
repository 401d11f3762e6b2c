//! Content-expansion rendering for documentation entities.
//!
//! Given an entity and its stored body text, the renderer assembles a
//! deterministic fragment around the body: prototype, short description,
//! long-description container, argument list, and source link. Four typed
//! filter chains let embedding applications customize the output without
//! touching the assembly logic.

mod hooks;
mod render;
mod template;

pub use hooks::{FilterChain, RenderHooks};
pub use render::Renderer;
pub use template::{autop, prototype, source_link};
