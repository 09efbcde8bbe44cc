//! Eager-load includes.
//!
//! String includes are added verbatim; expression includes are resolved to
//! dotted paths, following `then_include` chains back to their root. With
//! `cache_include_paths` on, resolved paths are memoized per entity and
//! navigation chain, so every specification declaring the same chain shares
//! one entry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use queryspec_core::SpecResult;

use super::QueryEvaluator;
use crate::query::Query;
use crate::record::Record;
use crate::specification::{IncludeExpression, Specification};

/// Applies include strings and include expressions.
#[derive(Debug, Default)]
pub struct IncludeEvaluator {
    cache: Option<RwLock<HashMap<(&'static str, String), Arc<str>>>>,
}

impl IncludeEvaluator {
    /// Creates an include evaluator, with or without the path cache.
    pub fn new(cache_include_paths: bool) -> Self {
        Self {
            cache: cache_include_paths.then(|| RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of cached paths.
    pub fn cached_paths(&self) -> usize {
        self.cache
            .as_ref()
            .map_or(0, |c| c.read().unwrap_or_else(PoisonError::into_inner).len())
    }

    fn resolve<T>(&self, entity: &'static str, spec: &Specification<T>, include: &IncludeExpression) -> SpecResult<Arc<str>> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::from(spec.include_path(include)?));
        };
        let key = (entity, spec.include_key(include)?);
        if let Some(path) = cache.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            return Ok(Arc::clone(path));
        }
        let path: Arc<str> = Arc::from(spec.include_path(include)?);
        cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&path));
        tracing::trace!(entity, path = %path, "include path cached");
        Ok(path)
    }
}

impl<T: Record + 'static> QueryEvaluator<T> for IncludeEvaluator {
    fn name(&self) -> &'static str {
        "include"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        let mut query = spec
            .include_strings()
            .iter()
            .fold(query, |q, path| q.include(path.as_str()));
        for include in spec.include_expressions() {
            let path = self.resolve(T::entity_name(), spec, include)?;
            query = query.include(&*path);
        }
        Ok(query)
    }
}
