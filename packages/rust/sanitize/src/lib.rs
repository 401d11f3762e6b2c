//! Text sanitization for documentation fragments.
//!
//! Raw doc-block text can carry unsafe markup, so every scalar text field
//! destined for page output runs through an ordered pipeline of transforms
//! before rendering. The pipeline is idempotent: re-sanitizing already
//! sanitized text changes nothing, which matters because content is
//! re-rendered on every view.

mod args;
mod humanize;
mod pipeline;
mod stages;

pub use args::{sanitize_argument, sanitize_arguments};
pub use humanize::{humanize, humanize_with};
pub use pipeline::{Pipeline, Stage, sanitize};
