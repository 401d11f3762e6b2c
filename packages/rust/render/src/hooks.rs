//! Typed filter chains — the renderer's extension points.
//!
//! Each extension point is an ordered list of pure transform functions with
//! a fixed input/output type, registered at startup and invoked in
//! registration order at the documented point in the render flow.

use std::sync::Arc;

use funcref_shared::Argument;

/// An ordered chain of `T -> T` transforms.
#[derive(Clone)]
pub struct FilterChain<T> {
    filters: Vec<Arc<dyn Fn(T) -> T + Send + Sync>>,
}

impl<T> FilterChain<T> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Register a transform; transforms run in registration order.
    pub fn push(&mut self, f: impl Fn(T) -> T + Send + Sync + 'static) {
        self.filters.push(Arc::new(f));
    }

    /// Run every registered transform over `value`.
    pub fn apply(&self, value: T) -> T {
        self.filters.iter().fold(value, |acc, f| f(acc))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<T> Default for FilterChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for FilterChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}

/// The four documented render extension points.
#[derive(Debug, Clone, Default)]
pub struct RenderHooks {
    /// After argument sanitization, before rendering.
    pub args: FilterChain<Vec<Argument>>,
    /// After type-string humanization.
    pub type_string: FilterChain<String>,
    /// After the `before` fragment is fully assembled.
    pub before_fragment: FilterChain<String>,
    /// After the `after` fragment is fully assembled.
    pub after_fragment: FilterChain<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_apply_in_registration_order() {
        let mut chain: FilterChain<String> = FilterChain::new();
        chain.push(|s| format!("{s}a"));
        chain.push(|s| format!("{s}b"));
        assert_eq!(chain.apply("x".to_string()), "xab");
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain: FilterChain<String> = FilterChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply("unchanged".to_string()), "unchanged");
    }

    #[test]
    fn args_chain_may_rewrite_arguments() {
        let mut chain: FilterChain<Vec<Argument>> = FilterChain::new();
        chain.push(|mut args| {
            for arg in &mut args {
                arg.desc = arg.desc.trim().to_string();
            }
            args
        });
        let result = chain.apply(vec![Argument {
            type_: "int".into(),
            name: "$n".into(),
            desc: "  padded  ".into(),
        }]);
        assert_eq!(result[0].desc, "padded");
    }
}
