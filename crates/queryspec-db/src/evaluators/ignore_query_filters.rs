//! Global query filter bypass.

use queryspec_core::SpecResult;

use super::QueryEvaluator;
use crate::query::Query;
use crate::record::Record;
use crate::specification::Specification;

/// Marks the query as bypassing globally configured filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreQueryFiltersEvaluator;

impl<T: Record + 'static> QueryEvaluator<T> for IgnoreQueryFiltersEvaluator {
    fn name(&self) -> &'static str {
        "ignore_query_filters"
    }

    fn is_criteria_evaluator(&self) -> bool {
        true
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        Ok(if spec.is_ignoring_query_filters() {
            query.ignore_query_filters()
        } else {
            query
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;

    #[test]
    fn test_flag_is_copied() {
        let mut spec = Specification::<Row>::new();
        spec.query().ignore_query_filters();
        let q = IgnoreQueryFiltersEvaluator.apply(Query::<Row>::new(), &spec).unwrap();
        assert!(q.ast().ignore_query_filters);
    }
}
