//! The fluent specification builder.
//!
//! Every method appends to (or toggles) the borrowed specification and
//! hands the builder back, so a whole specification is declared in one
//! chain. Nothing is validated here; conflicting declarations such as two
//! primary orderings are reported when the specification is evaluated.

use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use queryspec_core::{CacheExpirationMode, SETTINGS};

use super::{
    CacheExpiration, IncludeExpression, IncludeKind, OrderExpression, OrderType, PaginationFilter,
    SearchCriteria, Specification, WhereExpression, DEFAULT_SEARCH_GROUP,
};
use crate::expr::Lambda;
use crate::query::ProjectionConfig;
use crate::record::Record;

/// Populates a specification.
///
/// `S` is the specification being built: a plain [`Specification<T>`] or a
/// type wrapping one, such as
/// [`ProjectedSpecification`](super::ProjectedSpecification).
pub struct SpecificationBuilder<'a, T, S = Specification<T>> {
    pub(crate) target: &'a mut S,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T, S> SpecificationBuilder<'a, T, S>
where
    T: Record + 'static,
    S: AsMut<Specification<T>>,
{
    pub(crate) fn new(target: &'a mut S) -> Self {
        Self {
            target,
            _marker: PhantomData,
        }
    }

    fn spec(&mut self) -> &mut Specification<T> {
        self.target.as_mut()
    }

    // ── Filtering ────────────────────────────────────────────────────

    /// Adds a filter. Filters are ANDed.
    pub fn filter(mut self, predicate: Lambda) -> Self {
        let compiled = predicate.compile::<T>();
        self.spec().where_expressions.push(WhereExpression {
            filter: predicate,
            predicate: compiled,
        });
        self
    }

    /// Adds a filter when `condition` holds.
    pub fn filter_if(self, condition: bool, predicate: Lambda) -> Self {
        if condition {
            self.filter(predicate)
        } else {
            self
        }
    }

    /// Adds a `LIKE` search in the default group.
    pub fn search(self, selector: Lambda, search_term: impl Into<String>) -> Self {
        self.search_in_group(selector, search_term, DEFAULT_SEARCH_GROUP)
    }

    /// Adds a `LIKE` search in the given group.
    pub fn search_in_group(
        mut self,
        selector: Lambda,
        search_term: impl Into<String>,
        search_group: i32,
    ) -> Self {
        self.spec().search_criterias.push(SearchCriteria {
            selector,
            search_term: search_term.into(),
            search_group,
        });
        self
    }

    /// Adds a `LIKE` search in the default group when `condition` holds.
    pub fn search_if(self, condition: bool, selector: Lambda, search_term: impl Into<String>) -> Self {
        if condition {
            self.search(selector, search_term)
        } else {
            self
        }
    }

    // ── Ordering ─────────────────────────────────────────────────────

    fn order(mut self, key_selector: Lambda, order_type: OrderType) -> Self {
        self.spec().order_expressions.push(OrderExpression {
            key_selector,
            order_type,
        });
        self
    }

    /// Orders ascending by the key.
    pub fn order_by(self, key: Lambda) -> Self {
        self.order(key, OrderType::OrderBy)
    }

    /// Orders descending by the key.
    pub fn order_by_descending(self, key: Lambda) -> Self {
        self.order(key, OrderType::OrderByDescending)
    }

    /// Adds an ascending secondary ordering.
    pub fn then_by(self, key: Lambda) -> Self {
        self.order(key, OrderType::ThenBy)
    }

    /// Adds a descending secondary ordering.
    pub fn then_by_descending(self, key: Lambda) -> Self {
        self.order(key, OrderType::ThenByDescending)
    }

    // ── Includes and grouping ────────────────────────────────────────

    /// Eager-loads a navigation of the root entity.
    pub fn include(mut self, navigation: Lambda) -> Self {
        self.spec()
            .include_expressions
            .push(IncludeExpression::new(navigation, IncludeKind::Include, None));
        self
    }

    /// Eager-loads a navigation of the previously included entity.
    pub fn then_include(mut self, navigation: Lambda) -> Self {
        let spec = self.spec();
        let previous = spec.include_expressions.last().map(|e| e.id);
        spec.include_expressions
            .push(IncludeExpression::new(navigation, IncludeKind::ThenInclude, previous));
        self
    }

    /// Eager-loads a dotted navigation path.
    pub fn include_path(mut self, path: impl Into<String>) -> Self {
        self.spec().include_strings.push(path.into());
        self
    }

    /// Groups by the key, then flattens the groups back.
    pub fn group_by(mut self, key: Lambda) -> Self {
        self.spec().group_by = Some(key);
        self
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Skips the first `n` items and enables paging.
    pub fn skip(mut self, n: usize) -> Self {
        let spec = self.spec();
        spec.skip = Some(n);
        spec.is_paging_enabled = true;
        spec.pagination = OnceLock::new();
        self
    }

    /// Keeps at most `n` items and enables paging.
    pub fn take(mut self, n: usize) -> Self {
        let spec = self.spec();
        spec.take = Some(n);
        spec.is_paging_enabled = true;
        spec.pagination = OnceLock::new();
        self
    }

    /// Sets skip/take from a page and enables paging.
    pub fn paginate(mut self, filter: PaginationFilter) -> Self {
        let spec = self.spec();
        spec.skip = Some(filter.skip());
        spec.take = Some(filter.take());
        spec.is_paging_enabled = true;
        spec.pagination = OnceLock::from(filter);
        self
    }

    // ── Shaping ──────────────────────────────────────────────────────

    /// Sets the step applied to in-memory results after every evaluator.
    pub fn post_process(mut self, action: impl Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static) -> Self {
        self.spec().post_processing_action = Some(Arc::new(action));
        self
    }

    /// Names members an external projection should expand.
    pub fn expand_members<I, M>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.spec()
            .members_to_expand
            .extend(members.into_iter().map(Into::into));
        self
    }

    /// Attaches an opaque configuration for an external projection.
    pub fn project_with(mut self, config: ProjectionConfig) -> Self {
        self.spec().projection_config = Some(config);
        self
    }

    // ── Behavior flags ───────────────────────────────────────────────

    fn tracking(mut self, no_tracking: bool, tracking: bool, identity_resolution: bool) -> Self {
        let spec = self.spec();
        spec.as_no_tracking = no_tracking;
        spec.as_tracking = tracking;
        spec.as_no_tracking_with_identity_resolution = identity_resolution;
        self
    }

    /// Requests untracked results.
    pub fn as_no_tracking(self) -> Self {
        self.tracking(true, false, false)
    }

    /// Requests change-tracked results.
    pub fn as_tracking(self) -> Self {
        self.tracking(false, true, false)
    }

    /// Requests untracked results with identity resolution.
    pub fn as_no_tracking_with_identity_resolution(self) -> Self {
        self.tracking(false, false, true)
    }

    /// Loads collection includes with separate statements.
    pub fn as_split_query(mut self) -> Self {
        self.spec().as_split_query = true;
        self
    }

    /// Bypasses global query filters.
    pub fn ignore_query_filters(mut self) -> Self {
        self.spec().ignore_query_filters = true;
        self
    }

    /// Enables result caching with the given expiration.
    pub fn enable_cache(mut self, mode: CacheExpirationMode, timeout: Duration) -> Self {
        let spec = self.spec();
        spec.cache_enabled = Some(true);
        spec.cache_expiration = Some(CacheExpiration { mode, timeout });
        self
    }

    /// Enables result caching with the globally configured defaults.
    pub fn enable_cache_default(self) -> Self {
        let settings = SETTINGS.get_or_default();
        self.enable_cache(settings.default_cache_expiration, settings.default_cache_timeout())
    }

    /// Disables result caching.
    pub fn disable_cache(mut self) -> Self {
        let spec = self.spec();
        spec.cache_enabled = Some(false);
        spec.cache_expiration = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::record::Row;

    #[test]
    fn test_filter_appends() {
        let mut spec = Specification::<Row>::new();
        spec.query()
            .filter(Lambda::new(|x| x.member("a").gt(1)))
            .filter(Lambda::new(|x| x.member("b").gt(2)))
            .filter_if(false, Lambda::new(|_| Expr::val(false)));
        assert_eq!(spec.where_expressions().len(), 2);
    }

    #[test]
    fn test_search_groups() {
        let mut spec = Specification::<Row>::new();
        spec.query()
            .search(Lambda::member("name"), "a%")
            .search_in_group(Lambda::member("city"), "%o", 2)
            .search_if(false, Lambda::member("x"), "y");
        let groups: Vec<i32> = spec.search_criterias().iter().map(|c| c.search_group).collect();
        assert_eq!(groups, vec![DEFAULT_SEARCH_GROUP, 2]);
        assert_eq!(spec.search_criterias()[1].search_term, "%o");
    }

    #[test]
    fn test_order_entries_recorded_in_order() {
        let mut spec = Specification::<Row>::new();
        spec.query()
            .order_by(Lambda::member("a"))
            .then_by_descending(Lambda::member("b"))
            .order_by_descending(Lambda::member("c"));
        let types: Vec<OrderType> = spec.order_expressions().iter().map(|o| o.order_type).collect();
        assert_eq!(
            types,
            vec![OrderType::OrderBy, OrderType::ThenByDescending, OrderType::OrderByDescending]
        );
    }

    #[test]
    fn test_skip_take_derive_pagination() {
        let mut spec = Specification::<Row>::new();
        spec.query().skip(30).take(15);
        assert!(spec.is_paging_enabled());
        let page = spec.pagination_filter().unwrap();
        assert_eq!(page.page_number(), 3);
        assert_eq!(page.page_size(), 15);

        // Changing take invalidates the derived page.
        spec.query().take(10);
        assert_eq!(spec.pagination_filter().unwrap().page_number(), 4);
    }

    #[test]
    fn test_paginate_overwrites_skip_take() {
        let mut spec = Specification::<Row>::new();
        spec.query().skip(3).take(7).paginate(PaginationFilter::new(2, 25));
        assert_eq!(spec.skip(), Some(25));
        assert_eq!(spec.take(), Some(25));
        assert_eq!(spec.pagination_filter(), Some(PaginationFilter::new(2, 25)));
    }

    #[test]
    fn test_tracking_modes_exclusive() {
        let mut spec = Specification::<Row>::new();
        spec.query().as_tracking();
        assert!(spec.is_as_tracking() && !spec.is_as_no_tracking());
        spec.query().as_no_tracking_with_identity_resolution();
        assert!(spec.is_as_no_tracking_with_identity_resolution());
        assert!(!spec.is_as_tracking() && !spec.is_as_no_tracking());
        spec.query().as_no_tracking();
        assert!(spec.is_as_no_tracking() && !spec.is_as_no_tracking_with_identity_resolution());
    }

    #[test]
    fn test_cache_toggles() {
        let mut spec = Specification::<Row>::new();
        spec.query().enable_cache(CacheExpirationMode::Sliding, Duration::from_secs(5));
        assert_eq!(spec.is_cache_enabled(), Some(true));
        assert_eq!(
            spec.cache_expiration(),
            Some(CacheExpiration {
                mode: CacheExpirationMode::Sliding,
                timeout: Duration::from_secs(5)
            })
        );
        spec.query().disable_cache();
        assert_eq!(spec.is_cache_enabled(), Some(false));
        assert_eq!(spec.cache_expiration(), None);

        spec.query().enable_cache_default();
        assert_eq!(spec.is_cache_enabled(), Some(true));
        assert!(spec.cache_expiration().is_some());
    }

    #[test]
    fn test_shaping_and_flags() {
        let mut spec = Specification::<Row>::new();
        spec.query()
            .post_process(|mut rows| {
                rows.reverse();
                rows
            })
            .expand_members(["orders", "address"])
            .project_with(ProjectionConfig::new("cfg"))
            .include_path("orders.items")
            .group_by(Lambda::member("k"))
            .as_split_query()
            .ignore_query_filters();
        assert!(spec.post_processing_action().is_some());
        assert_eq!(spec.members_to_expand(), ["orders", "address"]);
        assert!(spec.projection_config().is_some());
        assert_eq!(spec.include_strings(), ["orders.items"]);
        assert!(spec.group_by_expression().is_some());
        assert!(spec.is_as_split_query());
        assert!(spec.is_ignoring_query_filters());
    }
}
