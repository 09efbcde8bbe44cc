//! Projection through an external mapper.
//!
//! When a projected specification has no selector, the evaluator hands the
//! query to a [`ProjectionProvider`] together with the members to expand and
//! an opaque [`ProjectionConfig`]. The config is never inspected here; only
//! the provider knows its concrete type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use queryspec_core::SpecResult;

use super::ast::QueryAst;

/// An opaque, shareable projection configuration handle.
#[derive(Clone)]
pub struct ProjectionConfig(Arc<dyn Any + Send + Sync>);

impl ProjectionConfig {
    /// Wraps a provider-specific configuration.
    pub fn new<C: Any + Send + Sync>(config: C) -> Self {
        Self(Arc::new(config))
    }

    /// Returns the configuration if it is of type `C`.
    pub fn downcast_ref<C: Any>(&self) -> Option<&C> {
        self.0.downcast_ref::<C>()
    }
}

impl fmt::Debug for ProjectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProjectionConfig(..)")
    }
}

/// Maps a query over an entity into a query over a projection type.
pub trait ProjectionProvider: Send + Sync {
    /// Rewrites `query` to produce `target_type` items.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider has no mapping to `target_type`.
    fn project(
        &self,
        query: QueryAst,
        target_type: &str,
        members_to_expand: &[String],
        config: Option<&ProjectionConfig>,
    ) -> SpecResult<QueryAst>;
}
