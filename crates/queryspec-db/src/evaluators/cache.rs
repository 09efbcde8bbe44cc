//! Result-cache hints.

use std::time::Duration;

use queryspec_core::{CacheExpirationMode, Settings, SpecResult};

use super::QueryEvaluator;
use crate::query::{CacheHint, Query};
use crate::record::Record;
use crate::specification::{CacheExpiration, Specification};

/// Turns the specification's caching switch into a [`CacheHint`].
///
/// An enabled cache without an explicit expiration falls back to the
/// evaluator's default, taken from [`Settings`] at construction.
#[derive(Debug, Clone, Copy)]
pub struct CacheEvaluator {
    default_expiration: CacheExpiration,
}

impl CacheEvaluator {
    /// Creates a cache evaluator with the given default expiration.
    pub const fn new(mode: CacheExpirationMode, timeout: Duration) -> Self {
        Self {
            default_expiration: CacheExpiration { mode, timeout },
        }
    }

    /// Creates a cache evaluator with the defaults from `settings`.
    pub const fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.default_cache_expiration, settings.default_cache_timeout())
    }
}

impl Default for CacheEvaluator {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl<T: Record + 'static> QueryEvaluator<T> for CacheEvaluator {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        let hint = match spec.is_cache_enabled() {
            None => return Ok(query),
            Some(false) => CacheHint::Disabled,
            Some(true) => {
                let CacheExpiration { mode, timeout } = spec.cache_expiration().unwrap_or(self.default_expiration);
                CacheHint::Enabled { mode, timeout }
            }
        };
        Ok(query.with_cache(hint))
    }
}
