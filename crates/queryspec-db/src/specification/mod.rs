//! Query specifications.
//!
//! A [`Specification<T>`] is a declarative description of a query over `T`:
//! filters, search criteria, ordering, includes, grouping, pagination,
//! behavior flags, and post-processing. It holds no connection state and is
//! immutable from the evaluators' point of view; it is populated through
//! [`SpecificationBuilder`], obtained from [`Specification::query`].
//!
//! # Examples
//!
//! ```
//! use queryspec_db::expr::Lambda;
//! use queryspec_db::record::Row;
//! use queryspec_db::specification::Specification;
//!
//! let mut spec = Specification::<Row>::new();
//! spec.query()
//!     .filter(Lambda::new(|x| x.member("active").equals(true)))
//!     .search(Lambda::member("name"), "%ann%")
//!     .order_by(Lambda::member("name"))
//!     .skip(20)
//!     .take(10);
//!
//! assert_eq!(spec.where_expressions().len(), 1);
//! assert_eq!(spec.pagination_filter().unwrap().page_number(), 3);
//! ```

pub mod builder;
pub mod pagination;
pub mod projected;
pub mod update;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use queryspec_core::{CacheExpirationMode, SpecError, SpecResult};

use crate::expr::{Lambda, Predicate};
use crate::query::ProjectionConfig;
use crate::record::Record;
use crate::validator::Validator;

pub use builder::SpecificationBuilder;
pub use pagination::{PaginationFilter, DEFAULT_PAGE_SIZE};
pub use projected::ProjectedSpecification;
pub use update::{UpdateSpecification, UpdateSpecificationBuilder};

/// The search group used when none is given.
pub const DEFAULT_SEARCH_GROUP: i32 = 1;

/// A post-processing step applied to in-memory results.
pub type PostProcessing<T> = Arc<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;

/// A filter in both forms: the inspectable tree and its compiled predicate.
pub struct WhereExpression<T> {
    /// The expression tree, translated in query mode.
    pub filter: Lambda,
    /// The compiled predicate, run in memory.
    pub predicate: Predicate<T>,
}

impl<T> Clone for WhereExpression<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for WhereExpression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhereExpression")
            .field("filter", &self.filter.to_string())
            .finish_non_exhaustive()
    }
}

/// One `LIKE` search: a selected field, a pattern, and a group.
///
/// Criteria in the same group are ORed; groups are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    /// Selects the string being searched.
    pub selector: Lambda,
    /// The `LIKE` pattern.
    pub search_term: String,
    /// The group id.
    pub search_group: i32,
}

/// The kind of an ordering entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    /// Primary ascending.
    OrderBy,
    /// Primary descending.
    OrderByDescending,
    /// Secondary ascending.
    ThenBy,
    /// Secondary descending.
    ThenByDescending,
}

impl OrderType {
    /// Returns `true` for `OrderBy` and `OrderByDescending`.
    pub const fn is_primary(&self) -> bool {
        matches!(self, Self::OrderBy | Self::OrderByDescending)
    }

    /// Returns `true` for the descending variants.
    pub const fn is_descending(&self) -> bool {
        matches!(self, Self::OrderByDescending | Self::ThenByDescending)
    }
}

/// One ordering entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderExpression {
    /// The ordering key.
    pub key_selector: Lambda,
    /// Primary or secondary, ascending or descending.
    pub order_type: OrderType,
}

/// Whether an include starts a chain or continues one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    /// Starts from the root entity.
    Include,
    /// Continues from the previously declared include.
    ThenInclude,
}

/// One eager-load navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeExpression {
    /// A process-unique id that `then_include` entries link back to.
    pub id: u64,
    /// The navigation member path, e.g. `|o| o.items`.
    pub navigation: Lambda,
    /// Whether this entry starts or continues a chain.
    pub kind: IncludeKind,
    /// The id of the entry this one continues from.
    pub previous: Option<u64>,
}

impl IncludeExpression {
    pub(crate) fn new(navigation: Lambda, kind: IncludeKind, previous: Option<u64>) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT.fetch_add(1, Ordering::Relaxed),
            navigation,
            kind,
            previous,
        }
    }
}

/// How long a cached result lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheExpiration {
    /// Absolute or sliding expiration.
    pub mode: CacheExpirationMode,
    /// The expiration timeout.
    pub timeout: Duration,
}

/// A declarative query over `T`.
pub struct Specification<T> {
    pub(crate) where_expressions: Vec<WhereExpression<T>>,
    pub(crate) search_criterias: Vec<SearchCriteria>,
    pub(crate) order_expressions: Vec<OrderExpression>,
    pub(crate) include_expressions: Vec<IncludeExpression>,
    pub(crate) include_strings: Vec<String>,
    pub(crate) group_by: Option<Lambda>,
    pub(crate) skip: Option<usize>,
    pub(crate) take: Option<usize>,
    pub(crate) pagination: OnceLock<PaginationFilter>,
    pub(crate) is_paging_enabled: bool,
    pub(crate) post_processing_action: Option<PostProcessing<T>>,
    pub(crate) members_to_expand: Vec<String>,
    pub(crate) projection_config: Option<ProjectionConfig>,
    pub(crate) as_no_tracking: bool,
    pub(crate) as_tracking: bool,
    pub(crate) as_no_tracking_with_identity_resolution: bool,
    pub(crate) as_split_query: bool,
    pub(crate) ignore_query_filters: bool,
    pub(crate) cache_enabled: Option<bool>,
    pub(crate) cache_expiration: Option<CacheExpiration>,
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self {
            where_expressions: Vec::new(),
            search_criterias: Vec::new(),
            order_expressions: Vec::new(),
            include_expressions: Vec::new(),
            include_strings: Vec::new(),
            group_by: None,
            skip: None,
            take: None,
            pagination: OnceLock::new(),
            is_paging_enabled: false,
            post_processing_action: None,
            members_to_expand: Vec::new(),
            projection_config: None,
            as_no_tracking: true,
            as_tracking: false,
            as_no_tracking_with_identity_resolution: false,
            as_split_query: false,
            ignore_query_filters: false,
            cache_enabled: None,
            cache_expiration: None,
        }
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            where_expressions: self.where_expressions.clone(),
            search_criterias: self.search_criterias.clone(),
            order_expressions: self.order_expressions.clone(),
            include_expressions: self.include_expressions.clone(),
            include_strings: self.include_strings.clone(),
            group_by: self.group_by.clone(),
            skip: self.skip,
            take: self.take,
            pagination: self.pagination.clone(),
            is_paging_enabled: self.is_paging_enabled,
            post_processing_action: self.post_processing_action.clone(),
            members_to_expand: self.members_to_expand.clone(),
            projection_config: self.projection_config.clone(),
            as_no_tracking: self.as_no_tracking,
            as_tracking: self.as_tracking,
            as_no_tracking_with_identity_resolution: self.as_no_tracking_with_identity_resolution,
            as_split_query: self.as_split_query,
            ignore_query_filters: self.ignore_query_filters,
            cache_enabled: self.cache_enabled,
            cache_expiration: self.cache_expiration,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("where_expressions", &self.where_expressions)
            .field("search_criterias", &self.search_criterias)
            .field("order_expressions", &self.order_expressions)
            .field("include_expressions", &self.include_expressions)
            .field("include_strings", &self.include_strings)
            .field("group_by", &self.group_by)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("is_paging_enabled", &self.is_paging_enabled)
            .field("has_post_processing", &self.post_processing_action.is_some())
            .field("members_to_expand", &self.members_to_expand)
            .field("as_no_tracking", &self.as_no_tracking)
            .field("as_tracking", &self.as_tracking)
            .field(
                "as_no_tracking_with_identity_resolution",
                &self.as_no_tracking_with_identity_resolution,
            )
            .field("as_split_query", &self.as_split_query)
            .field("ignore_query_filters", &self.ignore_query_filters)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_expiration", &self.cache_expiration)
            .finish_non_exhaustive()
    }
}

impl<T> AsMut<Self> for Specification<T> {
    fn as_mut(&mut self) -> &mut Self {
        self
    }
}

impl<T> Specification<T> {
    /// Creates an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the filters, in declaration order.
    pub fn where_expressions(&self) -> &[WhereExpression<T>] {
        &self.where_expressions
    }

    /// Returns the search criteria, in declaration order.
    pub fn search_criterias(&self) -> &[SearchCriteria] {
        &self.search_criterias
    }

    /// Returns the ordering entries, in declaration order.
    pub fn order_expressions(&self) -> &[OrderExpression] {
        &self.order_expressions
    }

    /// Returns the include expressions, in declaration order.
    pub fn include_expressions(&self) -> &[IncludeExpression] {
        &self.include_expressions
    }

    /// Returns the string include paths, in declaration order.
    pub fn include_strings(&self) -> &[String] {
        &self.include_strings
    }

    /// Returns the grouping key, if any.
    pub const fn group_by_expression(&self) -> Option<&Lambda> {
        self.group_by.as_ref()
    }

    /// Returns the number of items to skip.
    pub const fn skip(&self) -> Option<usize> {
        self.skip
    }

    /// Returns the maximum number of items to return.
    pub const fn take(&self) -> Option<usize> {
        self.take
    }

    /// Returns the page view of skip/take, derived on first read, or `None`
    /// when paging is disabled.
    pub fn pagination_filter(&self) -> Option<PaginationFilter> {
        if !self.is_paging_enabled {
            return None;
        }
        Some(*self.pagination.get_or_init(|| {
            PaginationFilter::from_skip_take(self.skip.unwrap_or(0), self.take.unwrap_or(0))
        }))
    }

    /// Returns `true` when skip/take apply.
    pub const fn is_paging_enabled(&self) -> bool {
        self.is_paging_enabled
    }

    /// Returns the in-memory post-processing step, if any.
    pub fn post_processing_action(&self) -> Option<&PostProcessing<T>> {
        self.post_processing_action.as_ref()
    }

    /// Returns the members an external projection should expand.
    pub fn members_to_expand(&self) -> &[String] {
        &self.members_to_expand
    }

    /// Returns the opaque projection configuration, if any.
    pub const fn projection_config(&self) -> Option<&ProjectionConfig> {
        self.projection_config.as_ref()
    }

    /// Returns `true` if results should not be change-tracked.
    pub const fn is_as_no_tracking(&self) -> bool {
        self.as_no_tracking
    }

    /// Returns `true` if results should be change-tracked.
    pub const fn is_as_tracking(&self) -> bool {
        self.as_tracking
    }

    /// Returns `true` for untracked results with identity resolution.
    pub const fn is_as_no_tracking_with_identity_resolution(&self) -> bool {
        self.as_no_tracking_with_identity_resolution
    }

    /// Returns `true` if collection includes load with separate statements.
    pub const fn is_as_split_query(&self) -> bool {
        self.as_split_query
    }

    /// Returns `true` if global query filters are bypassed.
    pub const fn is_ignoring_query_filters(&self) -> bool {
        self.ignore_query_filters
    }

    /// Returns the caching switch: `None` when never set.
    pub const fn is_cache_enabled(&self) -> Option<bool> {
        self.cache_enabled
    }

    /// Returns the cache expiration, if one was given.
    pub const fn cache_expiration(&self) -> Option<CacheExpiration> {
        self.cache_expiration
    }

    /// Resolves the dotted navigation path of an include expression,
    /// following `ThenInclude` entries back to their root.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Unsupported`] when a navigation is not a member
    /// path, and [`SpecError::Evaluation`] when a `ThenInclude` has nothing
    /// to continue from.
    pub fn include_path(&self, include: &IncludeExpression) -> SpecResult<String> {
        let segments = include.navigation.member_path().filter(|p| !p.is_empty()).ok_or_else(|| {
            SpecError::Unsupported(format!(
                "include navigation must be a member path, got {}",
                include.navigation
            ))
        })?;
        let own = segments.join(".");
        match self.include_parent(include)? {
            Some(parent) => Ok(format!("{}.{own}", self.include_path(parent)?)),
            None => Ok(own),
        }
    }

    /// Identifies an include chain by the shape of each navigation from the
    /// root down, independent of which specification instance declared it.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Evaluation`] when a `ThenInclude` has nothing
    /// to continue from.
    pub fn include_key(&self, include: &IncludeExpression) -> SpecResult<String> {
        let own = include.navigation.shape();
        match self.include_parent(include)? {
            Some(parent) => Ok(format!("{} -> {own}", self.include_key(parent)?)),
            None => Ok(own),
        }
    }

    fn include_parent(&self, include: &IncludeExpression) -> SpecResult<Option<&IncludeExpression>> {
        match (include.kind, include.previous) {
            (IncludeKind::Include, _) => Ok(None),
            (IncludeKind::ThenInclude, Some(previous)) => self
                .include_expressions
                .iter()
                .find(|e| e.id == previous)
                .map(Some)
                .ok_or_else(|| SpecError::Evaluation(format!("include {previous} not found in specification"))),
            (IncludeKind::ThenInclude, None) => Err(SpecError::Evaluation(format!(
                "then_include({}) has no preceding include",
                include.navigation
            ))),
        }
    }
}

impl<T: Record + 'static> Specification<T> {
    /// Starts populating this specification.
    pub fn query(&mut self) -> SpecificationBuilder<'_, T> {
        SpecificationBuilder::new(self)
    }

    /// Returns `true` if `item` passes every filter.
    ///
    /// # Errors
    ///
    /// Propagates filter evaluation errors.
    pub fn is_satisfied_by(&self, item: &T) -> SpecResult<bool> {
        Validator::new().is_satisfied_by(item, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;
    use crate::value::Value;

    #[test]
    fn test_defaults() {
        let spec = Specification::<Row>::new();
        assert!(spec.is_as_no_tracking());
        assert!(!spec.is_as_tracking());
        assert!(!spec.is_paging_enabled());
        assert_eq!(spec.pagination_filter(), None);
        assert_eq!(spec.is_cache_enabled(), None);
        assert!(spec.where_expressions().is_empty());
    }

    #[test]
    fn test_order_type() {
        assert!(OrderType::OrderBy.is_primary());
        assert!(OrderType::OrderByDescending.is_descending());
        assert!(!OrderType::ThenBy.is_primary());
        assert!(!OrderType::ThenBy.is_descending());
    }

    #[test]
    fn test_include_path_chain() {
        let mut spec = Specification::<Row>::new();
        spec.query()
            .include(Lambda::member("orders"))
            .then_include(Lambda::member("items"))
            .then_include(Lambda::new(|i| i.member("product").member("vendor")));
        let paths: Vec<String> = spec
            .include_expressions()
            .iter()
            .map(|e| spec.include_path(e).unwrap())
            .collect();
        assert_eq!(
            paths,
            vec!["orders", "orders.items", "orders.items.product.vendor"]
        );
    }

    #[test]
    fn test_include_path_rejects_non_member() {
        let mut spec = Specification::<Row>::new();
        spec.query().include(Lambda::new(|x| x.member("a").equals(1)));
        let include = &spec.include_expressions()[0];
        assert!(matches!(spec.include_path(include), Err(SpecError::Unsupported(_))));
    }

    #[test]
    fn test_include_key_is_shared_across_instances() {
        let build = || {
            let mut spec = Specification::<Row>::new();
            spec.query()
                .include(Lambda::member("orders"))
                .then_include(Lambda::member("items"));
            spec
        };
        let (a, b) = (build(), build());
        let keys = |spec: &Specification<Row>| -> Vec<String> {
            spec.include_expressions()
                .iter()
                .map(|e| spec.include_key(e).unwrap())
                .collect()
        };
        assert_eq!(keys(&a), keys(&b));
        assert_eq!(keys(&a), vec!["p0.orders", "p0.orders -> p0.items"]);
        // A chain continuing from a different root is a different key.
        let mut other = Specification::<Row>::new();
        other
            .query()
            .include(Lambda::member("invoices"))
            .then_include(Lambda::member("items"));
        assert_ne!(keys(&other)[1], keys(&a)[1]);
    }

    #[test]
    fn test_orphan_then_include() {
        let mut spec = Specification::<Row>::new();
        spec.query().then_include(Lambda::member("items"));
        let include = &spec.include_expressions()[0];
        assert!(spec.include_path(include).is_err());
        assert!(spec.include_key(include).is_err());
    }

    #[test]
    fn test_is_satisfied_by() {
        let mut spec = Specification::<Row>::new();
        spec.query().filter(Lambda::new(|x| x.member("n").gt(1)));
        assert!(spec.is_satisfied_by(&Row::from_pairs([("n", Value::Int(2))])).unwrap());
        assert!(!spec.is_satisfied_by(&Row::from_pairs([("n", Value::Int(0))])).unwrap());
    }

    #[test]
    fn test_clone_shares_predicates() {
        let mut spec = Specification::<Row>::new();
        spec.query().filter(Lambda::new(|x| x.member("n").gt(1)));
        let copy = spec.clone();
        assert!(Arc::ptr_eq(
            &spec.where_expressions()[0].predicate,
            &copy.where_expressions()[0].predicate
        ));
    }
}
