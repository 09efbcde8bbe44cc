//! Split-query loading.

use queryspec_core::SpecResult;

use super::QueryEvaluator;
use crate::query::Query;
use crate::record::Record;
use crate::specification::Specification;

/// Requests that collection includes load with separate statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsSplitQueryEvaluator;

impl<T: Record + 'static> QueryEvaluator<T> for AsSplitQueryEvaluator {
    fn name(&self) -> &'static str {
        "as_split_query"
    }

    fn is_criteria_evaluator(&self) -> bool {
        true
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        Ok(if spec.is_as_split_query() { query.as_split_query() } else { query })
    }
}
