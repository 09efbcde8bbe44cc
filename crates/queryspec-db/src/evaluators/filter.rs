//! Filters.

use queryspec_core::SpecResult;

use super::{InMemoryEvaluator, QueryEvaluator};
use crate::query::Query;
use crate::record::Record;
use crate::specification::Specification;

/// Applies every `where` expression. Filters are ANDed.
///
/// In query mode each filter becomes a [`QueryOp::Filter`](crate::query::QueryOp::Filter);
/// in memory the compiled predicates run against each item.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereEvaluator;

impl<T: Record + 'static> QueryEvaluator<T> for WhereEvaluator {
    fn name(&self) -> &'static str {
        "where"
    }

    fn is_criteria_evaluator(&self) -> bool {
        true
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        Ok(spec
            .where_expressions()
            .iter()
            .fold(query, |q, expr| q.filter(expr.filter.clone())))
    }
}

impl<T: Record + 'static> InMemoryEvaluator<T> for WhereEvaluator {
    fn name(&self) -> &'static str {
        "where"
    }

    fn evaluate(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>> {
        if spec.where_expressions().is_empty() {
            return Ok(items);
        }
        let mut kept = Vec::with_capacity(items.len());
        'items: for item in items {
            for expr in spec.where_expressions() {
                if !(expr.predicate)(&item)? {
                    continue 'items;
                }
            }
            kept.push(item);
        }
        tracing::trace!(kept = kept.len(), "where filters applied");
        Ok(kept)
    }
}
