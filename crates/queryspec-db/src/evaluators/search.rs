//! `LIKE` search criteria.
//!
//! Criteria sharing a group id are ORed; distinct groups are ANDed. A blank
//! search term (empty or whitespace only) matches everything and is skipped.

use queryspec_core::SpecResult;

use super::{InMemoryEvaluator, QueryEvaluator};
use crate::expr::{compose, Expr, Lambda};
use crate::query::Query;
use crate::record::Record;
use crate::specification::{SearchCriteria, Specification};

/// Applies search criteria as `LIKE` filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEvaluator;

/// `x => selector(x) LIKE term`
fn like_lambda(criteria: &SearchCriteria) -> Lambda {
    Lambda::from_parts(
        criteria.selector.param,
        Expr::Like {
            input: Box::new(criteria.selector.body.clone()),
            pattern: Box::new(Expr::val(criteria.search_term.as_str())),
        },
    )
}

/// One ORed predicate per search group, in first-appearance order.
pub(crate) fn group_predicates(criterias: &[SearchCriteria]) -> Vec<Lambda> {
    let mut groups: Vec<(i32, Lambda)> = Vec::new();
    for criteria in criterias.iter().filter(|c| !c.search_term.trim().is_empty()) {
        let lambda = like_lambda(criteria);
        match groups.iter_mut().find(|(id, _)| *id == criteria.search_group) {
            Some((_, chain)) => *chain = compose::or(chain, &lambda),
            None => groups.push((criteria.search_group, lambda)),
        }
    }
    groups.into_iter().map(|(_, chain)| chain).collect()
}

impl<T: Record + 'static> QueryEvaluator<T> for SearchEvaluator {
    fn name(&self) -> &'static str {
        "search"
    }

    fn is_criteria_evaluator(&self) -> bool {
        true
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        Ok(group_predicates(spec.search_criterias())
            .into_iter()
            .fold(query, Query::filter))
    }
}

impl<T: Record + 'static> InMemoryEvaluator<T> for SearchEvaluator {
    fn name(&self) -> &'static str {
        "search"
    }

    fn evaluate(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>> {
        let groups = group_predicates(spec.search_criterias());
        if groups.is_empty() {
            return Ok(items);
        }
        let mut kept = Vec::with_capacity(items.len());
        'items: for item in items {
            for group in &groups {
                if !group.test(&item)? {
                    continue 'items;
                }
            }
            kept.push(item);
        }
        tracing::trace!(groups = groups.len(), kept = kept.len(), "search applied");
        Ok(kept)
    }
}
