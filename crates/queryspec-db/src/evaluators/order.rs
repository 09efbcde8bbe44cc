//! Ordering.
//!
//! A specification holds at most one primary ordering, declared before any
//! secondary one. Both modes validate the chain the same way before
//! applying it.

use queryspec_core::{SpecError, SpecResult};

use super::{InMemoryEvaluator, QueryEvaluator};
use crate::expr::Lambda;
use crate::query::sequence;
use crate::query::Query;
use crate::record::Record;
use crate::specification::{OrderExpression, Specification};

/// Applies `order_by` / `then_by` chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderEvaluator;

/// Checks the chain shape.
///
/// # Errors
///
/// [`SpecError::DuplicateOrderChain`] for more than one primary ordering,
/// [`SpecError::MissingPrimaryOrder`] when the chain starts with a secondary
/// one.
pub fn validate_order_chain(orders: &[OrderExpression]) -> SpecResult<()> {
    if orders.iter().filter(|o| o.order_type.is_primary()).count() > 1 {
        return Err(SpecError::DuplicateOrderChain);
    }
    match orders.first() {
        Some(first) if !first.order_type.is_primary() => Err(SpecError::MissingPrimaryOrder),
        _ => Ok(()),
    }
}

impl<T: Record + 'static> QueryEvaluator<T> for OrderEvaluator {
    fn name(&self) -> &'static str {
        "order"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        let orders = spec.order_expressions();
        validate_order_chain(orders)?;
        Ok(orders.iter().fold(query, |q, order| {
            let key = order.key_selector.clone();
            let descending = order.order_type.is_descending();
            if order.order_type.is_primary() {
                q.order_by(key, descending)
            } else {
                q.then_by(key, descending)
            }
        }))
    }
}

impl<T: Record + 'static> InMemoryEvaluator<T> for OrderEvaluator {
    fn name(&self) -> &'static str {
        "order"
    }

    fn evaluate(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>> {
        let orders = spec.order_expressions();
        validate_order_chain(orders)?;
        let keys: Vec<(&Lambda, bool)> = orders
            .iter()
            .map(|o| (&o.key_selector, o.order_type.is_descending()))
            .collect();
        sequence::sort(items, &keys, &|item: &T, key: &Lambda| key.invoke(item))
    }
}
