//! The evaluator pipeline.
//!
//! Each evaluator owns one concern of a [`Specification`] and applies it
//! either to a translatable [`Query`] ([`QueryEvaluator`]) or to a vector of
//! materialized items ([`InMemoryEvaluator`]). The orchestrator in
//! [`crate::evaluator`] folds a sorted registry of them over its input.
//!
//! Evaluators are stateless unit structs (the include evaluator's path cache
//! aside) implemented for every record type, so one registry instance per
//! `T` is all that is ever built.
//!
//! | Evaluator | Query | In-memory | Criteria |
//! |-----------|:-----:|:---------:|:--------:|
//! | [`WhereEvaluator`] | yes | yes | yes |
//! | [`SearchEvaluator`] | yes | yes | yes |
//! | [`IncludeEvaluator`] | yes | | |
//! | [`OrderEvaluator`] | yes | yes | |
//! | [`GroupByEvaluator`] | yes | yes | |
//! | [`AsNoTrackingEvaluator`] | yes | | yes |
//! | [`AsTrackingEvaluator`] | yes | | yes |
//! | [`AsNoTrackingWithIdentityResolutionEvaluator`] | yes | | yes |
//! | [`AsSplitQueryEvaluator`] | yes | | yes |
//! | [`IgnoreQueryFiltersEvaluator`] | yes | | yes |
//! | [`CacheEvaluator`] | yes | | |
//! | [`PaginationEvaluator`] | yes | yes | |

pub mod cache;
pub mod filter;
pub mod group_by;
pub mod ignore_query_filters;
pub mod include;
pub mod order;
pub mod paginate;
pub mod search;
pub mod split_query;
pub mod tracking;

use std::sync::Arc;

use queryspec_core::{Settings, SpecResult};

use crate::query::Query;
use crate::record::Record;
use crate::specification::Specification;

pub use cache::CacheEvaluator;
pub use filter::WhereEvaluator;
pub use group_by::GroupByEvaluator;
pub use ignore_query_filters::IgnoreQueryFiltersEvaluator;
pub use include::IncludeEvaluator;
pub use order::OrderEvaluator;
pub use paginate::PaginationEvaluator;
pub use search::SearchEvaluator;
pub use split_query::AsSplitQueryEvaluator;
pub use tracking::{AsNoTrackingEvaluator, AsNoTrackingWithIdentityResolutionEvaluator, AsTrackingEvaluator};

/// Applies one concern of a specification to a translatable query.
pub trait QueryEvaluator<T>: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `true` if this evaluator narrows or flags the query without
    /// shaping its results, i.e. it belongs in criteria-only evaluation.
    fn is_criteria_evaluator(&self) -> bool;

    /// Position in the pipeline. Lower runs first; ties keep registration
    /// order.
    fn application_order(&self) -> i32 {
        0
    }

    /// Applies this evaluator's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the specification is inconsistent for this
    /// concern.
    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>>;
}

/// Applies one concern of a specification to materialized items.
pub trait InMemoryEvaluator<T>: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &'static str;

    /// Position in the pipeline. Lower runs first; ties keep registration
    /// order.
    fn application_order(&self) -> i32 {
        0
    }

    /// Applies this evaluator's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the specification is inconsistent for this
    /// concern, or if evaluating an expression fails.
    fn evaluate(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>>;
}

/// The standard query evaluators, in registration order.
pub fn default_query_evaluators<T: Record + 'static>(settings: &Settings) -> Vec<Arc<dyn QueryEvaluator<T>>> {
    vec![
        Arc::new(WhereEvaluator),
        Arc::new(SearchEvaluator),
        Arc::new(IncludeEvaluator::new(settings.cache_include_paths)),
        Arc::new(OrderEvaluator),
        Arc::new(GroupByEvaluator),
        Arc::new(AsNoTrackingEvaluator),
        Arc::new(AsTrackingEvaluator),
        Arc::new(AsNoTrackingWithIdentityResolutionEvaluator),
        Arc::new(AsSplitQueryEvaluator),
        Arc::new(IgnoreQueryFiltersEvaluator),
        Arc::new(CacheEvaluator::from_settings(settings)),
        Arc::new(PaginationEvaluator),
    ]
}

/// The standard in-memory evaluators, in registration order.
pub fn default_in_memory_evaluators<T: Record + 'static>() -> Vec<Arc<dyn InMemoryEvaluator<T>>> {
    vec![
        Arc::new(WhereEvaluator),
        Arc::new(SearchEvaluator),
        Arc::new(OrderEvaluator),
        Arc::new(GroupByEvaluator),
        Arc::new(PaginationEvaluator),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;

    #[test]
    fn test_default_registry_shape() {
        let query = default_query_evaluators::<Row>(&Settings::default());
        let names: Vec<&str> = query.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "where",
                "search",
                "include",
                "order",
                "group_by",
                "as_no_tracking",
                "as_tracking",
                "as_no_tracking_with_identity_resolution",
                "as_split_query",
                "ignore_query_filters",
                "cache",
                "paginate",
            ]
        );
        let criteria: Vec<&str> = query
            .iter()
            .filter(|e| e.is_criteria_evaluator())
            .map(|e| e.name())
            .collect();
        assert_eq!(
            criteria,
            vec![
                "where",
                "search",
                "as_no_tracking",
                "as_tracking",
                "as_no_tracking_with_identity_resolution",
                "as_split_query",
                "ignore_query_filters",
            ]
        );
        assert_eq!(query.last().unwrap().application_order(), i32::MAX);

        let in_memory = default_in_memory_evaluators::<Row>();
        let names: Vec<&str> = in_memory.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["where", "search", "order", "group_by", "paginate"]);
    }
}
