//! The translatable query representation.
//!
//! A [`Query<T>`] is a typed handle over an untyped [`QueryAst`]: the entity
//! name, an ordered list of [`QueryOp`]s, and a handful of behavior flags
//! (includes, tracking, split queries, global filters, caching). Evaluators
//! append to it; backends translate it.
//!
//! The op list is order-sensitive: a filter after `Take` filters the page,
//! not the table. Backends that cannot express a given order reject it.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use queryspec_core::CacheExpirationMode;

use crate::expr::Lambda;
use crate::record::Record;

/// One query operation.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOp {
    /// Keep items for which the predicate holds.
    Filter(Lambda),
    /// Start a new ordering on the key.
    OrderBy {
        /// The ordering key.
        key: Lambda,
        /// Sort descending.
        descending: bool,
    },
    /// Refine the current ordering with a secondary key.
    ThenBy {
        /// The ordering key.
        key: Lambda,
        /// Sort descending.
        descending: bool,
    },
    /// Group by the key, then flatten the groups back into one sequence.
    GroupFlatten(Lambda),
    /// Skip the first `n` items.
    Skip(usize),
    /// Keep at most `n` items.
    Take(usize),
    /// Project each item.
    Select(Lambda),
    /// Project each item to a list and flatten.
    SelectMany(Lambda),
}

impl QueryOp {
    /// Returns `true` for `Skip` and `Take`.
    pub const fn is_paging(&self) -> bool {
        matches!(self, Self::Skip(_) | Self::Take(_))
    }
}

/// Change-tracking behavior requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingMode {
    /// Results are tracked for change detection.
    #[default]
    Tracking,
    /// Results are read-only snapshots.
    NoTracking,
    /// Read-only, but one instance per identity within the result.
    NoTrackingWithIdentityResolution,
}

/// Result-caching hint for a query-cache provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheHint {
    /// The specification said nothing; the provider decides.
    #[default]
    Unset,
    /// Cache results.
    Enabled {
        /// Expiration policy.
        mode: CacheExpirationMode,
        /// Expiration timeout.
        timeout: Duration,
    },
    /// Never cache results.
    Disabled,
}

/// The untyped query tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryAst {
    /// The entity (table / collection) the query reads.
    pub entity: String,
    /// Operations in application order.
    pub ops: Vec<QueryOp>,
    /// Related-data paths to eager-load, without duplicates.
    pub includes: Vec<String>,
    /// Change-tracking mode.
    pub tracking: TrackingMode,
    /// Load collection includes with separate statements.
    pub split_query: bool,
    /// Bypass globally configured query filters.
    pub ignore_query_filters: bool,
    /// Result-cache hint.
    pub cache: CacheHint,
}

impl QueryAst {
    /// Creates an empty query over the named entity.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if any op projects the items.
    pub fn is_projected(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, QueryOp::Select(_) | QueryOp::SelectMany(_)))
    }
}

/// A translatable query whose items are of type `T`.
///
/// # Examples
///
/// ```
/// use queryspec_db::expr::Lambda;
/// use queryspec_db::query::{Query, QueryOp};
/// use queryspec_db::record::Row;
///
/// let q = Query::<Row>::new()
///     .filter(Lambda::new(|x| x.member("age").gt(18)))
///     .take(10);
/// assert_eq!(q.entity(), "row");
/// assert_eq!(q.ops().len(), 2);
/// assert!(matches!(q.ops()[1], QueryOp::Take(10)));
/// ```
pub struct Query<T> {
    ast: QueryAst,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Query<T> {
    /// Creates an empty query over `T`'s entity.
    pub fn new() -> Self {
        Self::from_ast(QueryAst::new(T::entity_name()))
    }
}

impl<T: Record> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Query<T> {
    /// Wraps an untyped tree.
    pub const fn from_ast(ast: QueryAst) -> Self {
        Self {
            ast,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped tree.
    pub const fn ast(&self) -> &QueryAst {
        &self.ast
    }

    /// Unwraps into the untyped tree.
    pub fn into_ast(self) -> QueryAst {
        self.ast
    }

    /// Returns the entity name.
    pub fn entity(&self) -> &str {
        &self.ast.entity
    }

    /// Returns the operations in application order.
    pub fn ops(&self) -> &[QueryOp] {
        &self.ast.ops
    }

    fn push(mut self, op: QueryOp) -> Self {
        self.ast.ops.push(op);
        self
    }

    /// Appends a filter.
    #[must_use]
    pub fn filter(self, predicate: Lambda) -> Self {
        self.push(QueryOp::Filter(predicate))
    }

    /// Appends a primary ordering.
    #[must_use]
    pub fn order_by(self, key: Lambda, descending: bool) -> Self {
        self.push(QueryOp::OrderBy { key, descending })
    }

    /// Appends a secondary ordering.
    #[must_use]
    pub fn then_by(self, key: Lambda, descending: bool) -> Self {
        self.push(QueryOp::ThenBy { key, descending })
    }

    /// Appends a group-and-flatten step.
    #[must_use]
    pub fn group_flatten(self, key: Lambda) -> Self {
        self.push(QueryOp::GroupFlatten(key))
    }

    /// Appends a skip.
    #[must_use]
    pub fn skip(self, n: usize) -> Self {
        self.push(QueryOp::Skip(n))
    }

    /// Appends a take.
    #[must_use]
    pub fn take(self, n: usize) -> Self {
        self.push(QueryOp::Take(n))
    }

    /// Adds an eager-load path. Duplicate paths are ignored.
    #[must_use]
    pub fn include(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.ast.includes.contains(&path) {
            self.ast.includes.push(path);
        }
        self
    }

    /// Sets the tracking mode.
    #[must_use]
    pub const fn with_tracking(mut self, mode: TrackingMode) -> Self {
        self.ast.tracking = mode;
        self
    }

    /// Requests split-query loading.
    #[must_use]
    pub const fn as_split_query(mut self) -> Self {
        self.ast.split_query = true;
        self
    }

    /// Bypasses global query filters.
    #[must_use]
    pub const fn ignore_query_filters(mut self) -> Self {
        self.ast.ignore_query_filters = true;
        self
    }

    /// Sets the cache hint.
    #[must_use]
    pub const fn with_cache(mut self, hint: CacheHint) -> Self {
        self.ast.cache = hint;
        self
    }

    /// Projects each item, producing a query over `R`.
    #[must_use]
    pub fn select<R>(self, selector: Lambda) -> Query<R> {
        self.push(QueryOp::Select(selector)).cast()
    }

    /// Projects each item to a list and flattens, producing a query over `R`.
    #[must_use]
    pub fn select_many<R>(self, selector: Lambda) -> Query<R> {
        self.push(QueryOp::SelectMany(selector)).cast()
    }

    /// Reinterprets the item type without changing the tree.
    pub fn cast<R>(self) -> Query<R> {
        Query::from_ast(self.ast)
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self::from_ast(self.ast.clone())
    }
}

impl<T> PartialEq for Query<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ast == other.ast
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("item", &std::any::type_name::<T>())
            .field("ast", &self.ast)
            .finish()
    }
}
