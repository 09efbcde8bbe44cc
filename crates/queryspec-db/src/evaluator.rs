//! The specification evaluator.
//!
//! [`SpecificationEvaluator`] owns two registries, one of
//! [`QueryEvaluator`]s and one of [`InMemoryEvaluator`]s, each sorted once
//! by application order at construction. Evaluating a specification is a
//! left fold of the relevant registry over the input.
//!
//! # Examples
//!
//! ```
//! use queryspec_db::evaluator::SpecificationEvaluator;
//! use queryspec_db::expr::Lambda;
//! use queryspec_db::record::Row;
//! use queryspec_db::specification::Specification;
//! use queryspec_db::value::Value;
//!
//! let items: Vec<Row> = (1..=10).map(|n| Row::from_pairs([("x", Value::Int(n))])).collect();
//! let mut spec = Specification::<Row>::new();
//! spec.query()
//!     .filter(Lambda::new(|r| r.member("x").gt(5)))
//!     .order_by(Lambda::member("x"))
//!     .skip(1)
//!     .take(2);
//!
//! let evaluator = SpecificationEvaluator::<Row>::new();
//! let out = evaluator.evaluate(items, &spec).unwrap();
//! let xs: Vec<i64> = out.iter().map(|r| r.get("x").unwrap()).collect();
//! assert_eq!(xs, vec![7, 8]);
//! ```

use std::sync::Arc;

use queryspec_core::logging::evaluation_span;
use queryspec_core::{Settings, SpecError, SpecResult, SETTINGS};

use crate::evaluators::{default_in_memory_evaluators, default_query_evaluators, InMemoryEvaluator, QueryEvaluator};
use crate::expr::{compose_updates, Lambda};
use crate::query::sequence;
use crate::query::{ProjectionProvider, Query};
use crate::record::Record;
use crate::specification::{ProjectedSpecification, Specification, UpdateSpecification};
use crate::validator::Validator;
use crate::value::{FromValue, Value};

/// Evaluates specifications against queries and in-memory collections.
pub struct SpecificationEvaluator<T> {
    query_evaluators: Vec<Arc<dyn QueryEvaluator<T>>>,
    in_memory_evaluators: Vec<Arc<dyn InMemoryEvaluator<T>>>,
    projection_provider: Option<Arc<dyn ProjectionProvider>>,
    validator: Validator,
}

impl<T> Clone for SpecificationEvaluator<T> {
    fn clone(&self) -> Self {
        Self {
            query_evaluators: self.query_evaluators.clone(),
            in_memory_evaluators: self.in_memory_evaluators.clone(),
            projection_provider: self.projection_provider.clone(),
            validator: self.validator,
        }
    }
}

impl<T> std::fmt::Debug for SpecificationEvaluator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecificationEvaluator")
            .field(
                "query_evaluators",
                &self.query_evaluators.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field(
                "in_memory_evaluators",
                &self.in_memory_evaluators.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("has_projection_provider", &self.projection_provider.is_some())
            .finish()
    }
}

impl<T: Record + 'static> Default for SpecificationEvaluator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs configuration errors before they are returned.
fn report<V>(result: SpecResult<V>, entity: &str) -> SpecResult<V> {
    if let Err(err) = &result {
        if err.is_configuration_error() {
            tracing::warn!(entity, error = %err, "Specification rejected");
        }
    }
    result
}

impl<T: Record + 'static> SpecificationEvaluator<T> {
    /// Creates an evaluator with the standard registries, configured from
    /// the global [`SETTINGS`].
    pub fn new() -> Self {
        Self::with_settings(SETTINGS.get_or_default())
    }

    /// Creates an evaluator with the standard registries.
    pub fn with_settings(settings: &Settings) -> Self {
        Self::with_evaluators(default_query_evaluators(settings), default_in_memory_evaluators())
    }

    /// Creates an evaluator over custom registries.
    ///
    /// Both registries are sorted by application order; evaluators with
    /// equal order keep their relative position.
    pub fn with_evaluators(
        mut query_evaluators: Vec<Arc<dyn QueryEvaluator<T>>>,
        mut in_memory_evaluators: Vec<Arc<dyn InMemoryEvaluator<T>>>,
    ) -> Self {
        query_evaluators.sort_by_key(|e| e.application_order());
        in_memory_evaluators.sort_by_key(|e| e.application_order());
        Self {
            query_evaluators,
            in_memory_evaluators,
            projection_provider: None,
            validator: Validator::new(),
        }
    }

    /// Sets the provider used for projections without a selector.
    #[must_use]
    pub fn with_projection_provider(mut self, provider: Arc<dyn ProjectionProvider>) -> Self {
        self.projection_provider = Some(provider);
        self
    }

    /// Returns the query evaluators in application order.
    pub fn query_evaluators(&self) -> &[Arc<dyn QueryEvaluator<T>>] {
        &self.query_evaluators
    }

    /// Returns the in-memory evaluators in application order.
    pub fn in_memory_evaluators(&self) -> &[Arc<dyn InMemoryEvaluator<T>>] {
        &self.in_memory_evaluators
    }

    fn fold_query(&self, query: Query<T>, spec: &Specification<T>, criteria_only: bool) -> SpecResult<Query<T>> {
        let mut query = query;
        for evaluator in &self.query_evaluators {
            if criteria_only && !evaluator.is_criteria_evaluator() {
                continue;
            }
            query = evaluator.apply(query, spec)?;
            tracing::trace!(evaluator = evaluator.name(), ops = query.ops().len(), "Applied query evaluator");
        }
        Ok(query)
    }

    /// Applies `spec` to `query`.
    ///
    /// With `criteria_only`, only the evaluators that narrow or flag the
    /// query run: ordering, includes, grouping, caching, and paging are
    /// left out.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an evaluator.
    pub fn get_query(&self, query: Query<T>, spec: &Specification<T>, criteria_only: bool) -> SpecResult<Query<T>> {
        let span = evaluation_span(T::entity_name(), "query");
        let _guard = span.enter();
        tracing::debug!(criteria_only, "Evaluating specification");
        report(self.fold_query(query, spec, criteria_only), T::entity_name())
    }

    fn project_query<R>(&self, query: Query<T>, spec: &ProjectedSpecification<T, R>) -> SpecResult<Query<R>> {
        if spec.selector().is_some() && spec.selector_many().is_some() {
            return Err(SpecError::ConcurrentSelectors);
        }
        let query = self.fold_query(query, spec.specification(), false)?;
        if let Some(selector) = spec.selector() {
            return Ok(query.select(selector.clone()));
        }
        if let Some(selector) = spec.selector_many() {
            return Ok(query.select_many(selector.clone()));
        }
        let provider = self
            .projection_provider
            .as_ref()
            .ok_or_else(|| SpecError::ProjectionUnavailable(std::any::type_name::<R>().to_string()))?;
        let target_type = std::any::type_name::<R>();
        tracing::debug!(target_type, "Projecting through provider");
        let ast = provider.project(
            query.into_ast(),
            target_type,
            spec.members_to_expand(),
            spec.projection_config(),
        )?;
        Ok(Query::from_ast(ast))
    }

    fn update_query(&self, query: Query<T>, spec: &UpdateSpecification<T>) -> SpecResult<(Query<T>, Lambda)> {
        let query = self.fold_query(query, spec.specification(), true)?;
        let instruction = compose_updates(spec.update_expressions())?;
        tracing::debug!(
            instructions = spec.update_expressions().len(),
            composed = %instruction,
            "Composed update instructions"
        );
        Ok((query, instruction))
    }

    /// Applies `spec` to `query` and projects the result.
    ///
    /// The selector conflict is checked before anything else runs. A
    /// `selector` becomes a `Select`, a `selector_many` a `SelectMany`; with
    /// neither, the configured [`ProjectionProvider`] maps the query to `R`.
    ///
    /// # Errors
    ///
    /// [`SpecError::ConcurrentSelectors`] when both selectors are set,
    /// [`SpecError::ProjectionUnavailable`] when neither is set and no
    /// provider is configured, and any evaluator or provider error.
    pub fn get_projected_query<R>(&self, query: Query<T>, spec: &ProjectedSpecification<T, R>) -> SpecResult<Query<R>> {
        let span = evaluation_span(T::entity_name(), "projected_query");
        let _guard = span.enter();
        report(self.project_query(query, spec), T::entity_name())
    }

    /// Applies the criteria of `spec` to `query` and composes its update
    /// instructions into one.
    ///
    /// # Errors
    ///
    /// [`SpecError::EmptyUpdateInstructions`] when no instruction was
    /// declared, and any evaluator error.
    pub fn get_update_query(&self, query: Query<T>, spec: &UpdateSpecification<T>) -> SpecResult<(Query<T>, Lambda)> {
        let span = evaluation_span(T::entity_name(), "update_query");
        let _guard = span.enter();
        report(self.update_query(query, spec), T::entity_name())
    }

    fn fold_in_memory(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>> {
        let mut items = items;
        for evaluator in &self.in_memory_evaluators {
            items = evaluator.evaluate(items, spec)?;
            tracing::trace!(evaluator = evaluator.name(), items = items.len(), "Applied in-memory evaluator");
        }
        Ok(match spec.post_processing_action() {
            Some(action) => action(items),
            None => items,
        })
    }

    /// Applies `spec` to materialized items, then its post-processing step.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an evaluator.
    pub fn evaluate(&self, items: Vec<T>, spec: &Specification<T>) -> SpecResult<Vec<T>> {
        let span = evaluation_span(T::entity_name(), "in_memory");
        let _guard = span.enter();
        tracing::debug!(items = items.len(), "Evaluating specification");
        report(self.fold_in_memory(items, spec), T::entity_name())
    }

    fn project_in_memory<R: FromValue>(&self, items: Vec<T>, spec: &ProjectedSpecification<T, R>) -> SpecResult<Vec<R>> {
        let (selector, flatten) = match (spec.selector(), spec.selector_many()) {
            (Some(_), Some(_)) => return Err(SpecError::ConcurrentSelectors),
            (Some(selector), None) => (selector, false),
            (None, Some(selector)) => (selector, true),
            (None, None) => return Err(SpecError::SelectorNotFound),
        };
        let items = self.fold_in_memory(items, spec.specification())?;
        let mut values: Vec<Value> = Vec::with_capacity(items.len());
        for item in &items {
            let selected = selector.invoke(item)?;
            if flatten {
                sequence::flatten_selected(selected, &mut values)?;
            } else {
                values.push(selected);
            }
        }
        let projected = values.iter().map(R::from_value).collect::<SpecResult<Vec<R>>>()?;
        Ok(match spec.post_processing_action() {
            Some(action) => action(projected),
            None => projected,
        })
    }

    /// Applies `spec` to materialized items and projects each one.
    ///
    /// The base post-processing step runs before projection and the
    /// projected one after.
    ///
    /// # Errors
    ///
    /// [`SpecError::ConcurrentSelectors`] when both selectors are set,
    /// [`SpecError::SelectorNotFound`] when neither is, and any evaluation
    /// or conversion error.
    pub fn evaluate_projected<R: FromValue>(&self, items: Vec<T>, spec: &ProjectedSpecification<T, R>) -> SpecResult<Vec<R>> {
        let span = evaluation_span(T::entity_name(), "in_memory_projected");
        let _guard = span.enter();
        report(self.project_in_memory(items, spec), T::entity_name())
    }

    /// Returns `true` if `item` passes every filter of `spec`.
    ///
    /// # Errors
    ///
    /// Propagates filter evaluation errors.
    pub fn is_satisfied_by(&self, item: &T, spec: &Specification<T>) -> SpecResult<bool> {
        self.validator.is_satisfied_by(item, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, SetPropertyCalls};
    use crate::query::{MemoryQueryProvider, ProjectionConfig, QueryAst, QueryOp, QueryProvider, TrackingMode};
    use crate::record::Row;

    fn numbers() -> Vec<Row> {
        (1..=10)
            .map(|n| {
                Row::from_pairs([
                    ("x", Value::Int(n)),
                    ("name", Value::from(format!("item{n}"))),
                    ("tags", Value::List(vec![Value::Int(n), Value::Int(-n)])),
                ])
            })
            .collect()
    }

    fn xs(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|r| r.get("x").unwrap()).collect()
    }

    fn paged_spec() -> Specification<Row> {
        let mut spec = Specification::<Row>::new();
        spec.query()
            .filter(Lambda::new(|r| r.member("x").gt(5)))
            .order_by(Lambda::member("x"))
            .include_path("owner")
            .skip(1)
            .take(2);
        spec
    }

    #[test]
    fn test_in_memory_pipeline() {
        let out = SpecificationEvaluator::<Row>::new().evaluate(numbers(), &paged_spec()).unwrap();
        assert_eq!(xs(&out), vec![7, 8]);
    }

    #[test]
    fn test_query_pipeline_matches_in_memory() {
        let evaluator = SpecificationEvaluator::<Row>::new();
        let spec = paged_spec();
        let q = evaluator.get_query(Query::new(), &spec, false).unwrap();
        let via_query = MemoryQueryProvider::new(numbers()).execute(&q).unwrap();
        assert_eq!(xs(&via_query), vec![7, 8]);
        assert_eq!(q.ast().includes, vec!["owner"]);
        assert_eq!(q.ast().tracking, TrackingMode::NoTracking);
        assert!(matches!(q.ops().last(), Some(QueryOp::Take(2))));
    }

    #[test]
    fn test_criteria_only_skips_shaping() {
        let evaluator = SpecificationEvaluator::<Row>::new();
        let q = evaluator.get_query(Query::new(), &paged_spec(), true).unwrap();
        assert_eq!(q.ops().len(), 1);
        assert!(matches!(q.ops()[0], QueryOp::Filter(_)));
        assert!(q.ast().includes.is_empty());
    }

    #[test]
    fn test_paginate_runs_last_regardless_of_registration() {
        let mut query = default_query_evaluators::<Row>(&Settings::default());
        query.rotate_right(1);
        assert_eq!(query[0].name(), "paginate");
        let evaluator = SpecificationEvaluator::with_evaluators(query, default_in_memory_evaluators());
        assert_eq!(evaluator.query_evaluators().last().unwrap().name(), "paginate");
        assert_eq!(evaluator.query_evaluators()[0].name(), "where");
    }

    #[test]
    fn test_post_processing() {
        let mut spec = Specification::<Row>::new();
        spec.query().take(3).post_process(|mut rows| {
            rows.reverse();
            rows
        });
        let out = SpecificationEvaluator::<Row>::new().evaluate(numbers(), &spec).unwrap();
        assert_eq!(xs(&out), vec![3, 2, 1]);
    }

    #[test]
    fn test_projected_query_select() {
        let evaluator = SpecificationEvaluator::<Row>::new();
        let mut spec = ProjectedSpecification::<Row, String>::new();
        spec.query()
            .filter(Lambda::new(|r| r.member("x").le(2)))
            .select(Lambda::member("name"));
        let q = evaluator.get_projected_query(Query::new(), &spec).unwrap();
        assert!(matches!(q.ops().last(), Some(QueryOp::Select(_))));
        let names = MemoryQueryProvider::new(numbers()).execute_projected(&q).unwrap();
        assert_eq!(names, vec!["item1".to_string(), "item2".to_string()]);
    }

    #[test]
    fn test_both_selectors_fail_before_evaluation() {
        let evaluator = SpecificationEvaluator::<Row>::new();
        let mut spec = ProjectedSpecification::<Row, i64>::new();
        // The duplicate primary order would fail too; the selector check wins.
        spec.query()
            .order_by(Lambda::member("x"))
            .order_by(Lambda::member("name"))
            .select(Lambda::member("x"))
            .select_many(Lambda::member("tags"));
        assert!(matches!(
            evaluator.get_projected_query(Query::new(), &spec),
            Err(SpecError::ConcurrentSelectors)
        ));
        assert!(matches!(
            evaluator.evaluate_projected(numbers(), &spec),
            Err(SpecError::ConcurrentSelectors)
        ));
    }

    #[test]
    fn test_projection_unavailable_without_provider() {
        let evaluator = SpecificationEvaluator::<Row>::new();
        let spec = ProjectedSpecification::<Row, i64>::new();
        assert!(matches!(
            evaluator.get_projected_query(Query::new(), &spec),
            Err(SpecError::ProjectionUnavailable(_))
        ));
        assert!(matches!(
            evaluator.evaluate_projected(numbers(), &spec),
            Err(SpecError::SelectorNotFound)
        ));
    }

    struct ExpandingProvider;

    impl ProjectionProvider for ExpandingProvider {
        fn project(
            &self,
            mut query: QueryAst,
            target_type: &str,
            members_to_expand: &[String],
            config: Option<&ProjectionConfig>,
        ) -> SpecResult<QueryAst> {
            let prefix = config.and_then(|c| c.downcast_ref::<&'static str>()).copied().unwrap_or("");
            query.includes.extend(members_to_expand.iter().map(|m| format!("{prefix}{m}")));
            query.entity = format!("{}->{target_type}", query.entity);
            Ok(query)
        }
    }

    #[test]
    fn test_projection_provider_fallback() {
        let evaluator = SpecificationEvaluator::<Row>::new().with_projection_provider(Arc::new(ExpandingProvider));
        let mut spec = ProjectedSpecification::<Row, i64>::new();
        spec.query()
            .expand_members(["owner"])
            .project_with(ProjectionConfig::new("dto."));
        let q = evaluator.get_projected_query(Query::new(), &spec).unwrap();
        assert_eq!(q.entity(), "row->i64");
        assert_eq!(q.ast().includes, vec!["dto.owner"]);
    }

    #[test]
    fn test_evaluate_projected_select_many() {
        let mut spec = ProjectedSpecification::<Row, i64>::new();
        spec.query()
            .filter(Lambda::new(|r| r.member("x").le(2)))
            .select_many(Lambda::member("tags"))
            .post_process_results(|mut v| {
                v.sort_unstable();
                v
            });
        let out = SpecificationEvaluator::<Row>::new().evaluate_projected(numbers(), &spec).unwrap();
        assert_eq!(out, vec![-2, -1, 1, 2]);
    }

    #[test]
    fn test_update_query() {
        let mut spec = UpdateSpecification::<Row>::new();
        spec.query()
            .filter(Lambda::new(|r| r.member("x").equals(3)))
            .set_property(Lambda::new(|c| c.set("a", 1)))
            .set_property(Lambda::new(|c| c.set_property("b", Lambda::new(|e| e.member("x") * Expr::val(2)))));
        let (q, instruction) = SpecificationEvaluator::<Row>::new().get_update_query(Query::new(), &spec).unwrap();
        assert_eq!(q.ops().len(), 1);

        let rows = MemoryQueryProvider::new(numbers()).execute(&q).unwrap();
        let calls = SetPropertyCalls::new().apply(&instruction).unwrap();
        assert_eq!(
            calls.resolve(&rows[0]).unwrap(),
            vec![("a".to_string(), Value::Int(1)), ("b".to_string(), Value::Int(6))]
        );
    }

    #[test]
    fn test_update_without_instructions() {
        let spec = UpdateSpecification::<Row>::new();
        assert!(matches!(
            SpecificationEvaluator::<Row>::new().get_update_query(Query::new(), &spec),
            Err(SpecError::EmptyUpdateInstructions)
        ));
    }

    #[test]
    fn test_is_satisfied_by() {
        let evaluator = SpecificationEvaluator::<Row>::new();
        let spec = paged_spec();
        let rows = numbers();
        assert!(evaluator.is_satisfied_by(&rows[9], &spec).unwrap());
        assert!(!evaluator.is_satisfied_by(&rows[0], &spec).unwrap());
    }
}
