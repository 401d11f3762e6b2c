//! Argument sanitization.
//!
//! Raw doc-block metadata could introduce unsafe markup into the page, so
//! every scalar field of every argument runs through the pipeline before
//! rendering. Order and count are preserved: sanitization never reorders
//! or drops arguments.

use funcref_shared::Argument;

use crate::Pipeline;

/// Sanitize every scalar field of a single argument.
pub fn sanitize_argument(arg: &Argument, pipeline: &Pipeline) -> Argument {
    Argument {
        type_: pipeline.apply(&arg.type_),
        name: pipeline.apply(&arg.name),
        desc: pipeline.apply(&arg.desc),
    }
}

/// Sanitize a slice of arguments, preserving positional order.
pub fn sanitize_arguments(args: &[Argument], pipeline: &Pipeline) -> Vec<Argument> {
    args.iter()
        .map(|arg| sanitize_argument(arg, pipeline))
        .collect()
}
