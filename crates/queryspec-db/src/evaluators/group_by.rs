//! Grouping.

use queryspec_core::SpecResult;

use super::{InMemoryEvaluator, QueryEvaluator};
use crate::expr::Lambda;
use crate::query::sequence;
use crate::query::Query;
use crate::record::Record;
use crate::specification::Specification;

/// Groups by the specification's key, then flattens the groups back into one
/// sequence. Groups appear in the order their first member did.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupByEvaluator;

impl<T: Record + 'static> QueryEvaluator<T> for GroupByEvaluator {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn is_criteria_evaluator(&self) -> bool {
        false
    }

    fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
        Ok(match spec.group_by_expression() {
            Some(key) => query.group_flatten(key.clone()),
            None => query,
        })
    }
}

impl<T: Record + 'static> InMemoryEvaluator<T> for GroupByEvaluator {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn evaluate(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>> {
        match spec.group_by_expression() {
            Some(key) => sequence::group_flatten(items, key, &|item: &T, key: &Lambda| key.invoke(item)),
            None => Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryOp;
    use crate::record::Row;
    use crate::value::Value;

    #[test]
    fn test_groups_in_first_appearance_order() {
        let rows: Vec<Row> = [("x", 1), ("y", 2), ("x", 3), ("z", 4), ("y", 5)]
            .into_iter()
            .map(|(k, n)| Row::from_pairs([("k", Value::from(k)), ("n", Value::Int(n))]))
            .collect();
        let mut spec = Specification::<Row>::new();
        spec.query().group_by(Lambda::member("k"));
        let out = InMemoryEvaluator::evaluate(&GroupByEvaluator, rows, &spec).unwrap();
        let ns: Vec<i64> = out.iter().map(|r| r.get("n").unwrap()).collect();
        assert_eq!(ns, vec![1, 3, 2, 5, 4]);
    }

    #[test]
    fn test_query_mode() {
        let mut spec = Specification::<Row>::new();
        let key = Lambda::member("k");
        spec.query().group_by(key.clone());
        let q = QueryEvaluator::apply(&GroupByEvaluator, Query::<Row>::new(), &spec).unwrap();
        assert_eq!(q.ops(), &[QueryOp::GroupFlatten(key)]);

        let empty = Specification::<Row>::new();
        let q = QueryEvaluator::apply(&GroupByEvaluator, Query::<Row>::new(), &empty).unwrap();
        assert!(q.ops().is_empty());
    }
}
