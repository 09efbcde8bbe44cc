//! Specifications whose results are projected to another type.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::builder::SpecificationBuilder;
use super::Specification;
use crate::expr::Lambda;
use crate::record::Record;

/// A post-processing step applied to projected in-memory results.
pub type ProjectedPostProcessing<R> = Arc<dyn Fn(Vec<R>) -> Vec<R> + Send + Sync>;

/// A [`Specification<T>`] producing `R` items.
///
/// Derefs to the wrapped specification. The projection is either a
/// `selector` (one `R` per item) or a `selector_many` (a list of `R` per
/// item, flattened); setting both is reported at evaluation time. With
/// neither, query-mode evaluation falls back to the configured
/// [`ProjectionProvider`](crate::query::ProjectionProvider).
///
/// # Examples
///
/// ```
/// use queryspec_db::expr::Lambda;
/// use queryspec_db::record::Row;
/// use queryspec_db::specification::ProjectedSpecification;
///
/// let mut spec = ProjectedSpecification::<Row, String>::new();
/// spec.query()
///     .filter(Lambda::new(|x| x.member("active").equals(true)))
///     .select(Lambda::member("name"));
/// assert!(spec.selector().is_some());
/// assert_eq!(spec.where_expressions().len(), 1);
/// ```
pub struct ProjectedSpecification<T, R> {
    spec: Specification<T>,
    pub(crate) selector: Option<Lambda>,
    pub(crate) selector_many: Option<Lambda>,
    pub(crate) post_processing_action: Option<ProjectedPostProcessing<R>>,
}

impl<T, R> Default for ProjectedSpecification<T, R> {
    fn default() -> Self {
        Self {
            spec: Specification::default(),
            selector: None,
            selector_many: None,
            post_processing_action: None,
        }
    }
}

impl<T, R> Clone for ProjectedSpecification<T, R> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            selector: self.selector.clone(),
            selector_many: self.selector_many.clone(),
            post_processing_action: self.post_processing_action.clone(),
        }
    }
}

impl<T, R> fmt::Debug for ProjectedSpecification<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedSpecification")
            .field("spec", &self.spec)
            .field("selector", &self.selector)
            .field("selector_many", &self.selector_many)
            .field("has_post_processing", &self.post_processing_action.is_some())
            .finish()
    }
}

impl<T, R> Deref for ProjectedSpecification<T, R> {
    type Target = Specification<T>;

    fn deref(&self) -> &Self::Target {
        &self.spec
    }
}

impl<T, R> DerefMut for ProjectedSpecification<T, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.spec
    }
}

impl<T, R> AsMut<Specification<T>> for ProjectedSpecification<T, R> {
    fn as_mut(&mut self) -> &mut Specification<T> {
        &mut self.spec
    }
}

impl<T, R> ProjectedSpecification<T, R> {
    /// Creates an empty projected specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing specification.
    pub const fn from_specification(spec: Specification<T>) -> Self {
        Self {
            spec,
            selector: None,
            selector_many: None,
            post_processing_action: None,
        }
    }

    /// Returns the wrapped specification.
    pub const fn specification(&self) -> &Specification<T> {
        &self.spec
    }

    /// Returns the one-to-one selector, if any.
    pub const fn selector(&self) -> Option<&Lambda> {
        self.selector.as_ref()
    }

    /// Returns the one-to-many selector, if any.
    pub const fn selector_many(&self) -> Option<&Lambda> {
        self.selector_many.as_ref()
    }

    /// Returns the projected post-processing step, if any.
    pub fn post_processing_action(&self) -> Option<&ProjectedPostProcessing<R>> {
        self.post_processing_action.as_ref()
    }
}

impl<T: Record + 'static, R> ProjectedSpecification<T, R> {
    /// Starts populating this specification.
    pub fn query(&mut self) -> SpecificationBuilder<'_, T, Self> {
        SpecificationBuilder::new(self)
    }
}

impl<T, R> SpecificationBuilder<'_, T, ProjectedSpecification<T, R>>
where
    T: Record + 'static,
{
    /// Projects each item to one `R`.
    pub fn select(self, selector: Lambda) -> Self {
        self.target.selector = Some(selector);
        self
    }

    /// Projects each item to a list of `R`, flattened.
    pub fn select_many(self, selector: Lambda) -> Self {
        self.target.selector_many = Some(selector);
        self
    }

    /// Sets the step applied to projected in-memory results.
    pub fn post_process_results(self, action: impl Fn(Vec<R>) -> Vec<R> + Send + Sync + 'static) -> Self {
        self.target.post_processing_action = Some(Arc::new(action));
        self
    }
}
