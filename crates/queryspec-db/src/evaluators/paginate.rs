//! Skip/take paging. Always the last evaluator to run.

use queryspec_core::SpecResult;

use super::{InMemoryEvaluator, QueryEvaluator};
use crate::query::sequence;
use crate::query::Query;
use crate::record::Record;
use crate::specification::Specification;

/// Applies skip and take when paging is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationEvaluator;

impl<T: Record + 'static> QueryEvaluator<T> for PaginationEvaluator {
    fn name(&self) -> &'static str {
        "paginate"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn application_order(&self) -> i32 {
        i32::MAX
    }

    fn apply(&self, mut query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        if !spec.is_paging_enabled() {
            return Ok(query);
        }
        if let Some(skip) = spec.skip() {
            query = query.skip(skip);
        }
        if let Some(take) = spec.take() {
            query = query.take(take);
        }
        Ok(query)
    }
}

impl<T: Record + 'static> InMemoryEvaluator<T> for PaginationEvaluator {
    fn name(&self) -> &'static str {
        "paginate"
    }

    fn application_order(&self) -> i32 {
        i32::MAX
    }

    fn evaluate(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>> {
        if !spec.is_paging_enabled() {
            return Ok(items);
        }
        Ok(sequence::page(items, spec.skip().unwrap_or(0), spec.take()))
    }
}
