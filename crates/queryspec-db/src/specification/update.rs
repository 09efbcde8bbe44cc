//! Bulk-update specifications.
//!
//! An [`UpdateSpecification<T>`] selects rows with filters and search
//! criteria only, and carries ordered update instructions of the shape
//! `|calls| calls.set_property("x", |e| ...)`. Its builder exposes nothing
//! that a bulk update cannot honor: no ordering, paging, includes, or
//! grouping.
//!
//! ```
//! use queryspec_db::expr::{Expr, Lambda};
//! use queryspec_db::record::Row;
//! use queryspec_db::specification::UpdateSpecification;
//!
//! let mut spec = UpdateSpecification::<Row>::new();
//! spec.query()
//!     .filter(Lambda::new(|x| x.member("status").equals("pending")))
//!     .set_property(Lambda::new(|c| c.set("status", "expired")))
//!     .set_property(Lambda::new(|c| {
//!         c.set_property("retries", Lambda::new(|e| e.member("retries") + Expr::val(1)))
//!     }));
//! assert_eq!(spec.update_expressions().len(), 2);
//! ```

use std::fmt;
use std::ops::Deref;

use super::builder::SpecificationBuilder;
use super::Specification;
use crate::expr::Lambda;
use crate::record::Record;

/// A filter-only specification with update instructions.
pub struct UpdateSpecification<T> {
    spec: Specification<T>,
    update_expressions: Vec<Lambda>,
}

impl<T> Default for UpdateSpecification<T> {
    fn default() -> Self {
        Self {
            spec: Specification::default(),
            update_expressions: Vec::new(),
        }
    }
}

impl<T> Clone for UpdateSpecification<T> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            update_expressions: self.update_expressions.clone(),
        }
    }
}

impl<T> fmt::Debug for UpdateSpecification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSpecification")
            .field("spec", &self.spec)
            .field("update_expressions", &self.update_expressions)
            .finish()
    }
}

impl<T> Deref for UpdateSpecification<T> {
    type Target = Specification<T>;

    fn deref(&self) -> &Self::Target {
        &self.spec
    }
}

impl<T> UpdateSpecification<T> {
    /// Creates an empty update specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the filter part.
    pub const fn specification(&self) -> &Specification<T> {
        &self.spec
    }

    /// Returns the update instructions in declaration order.
    pub fn update_expressions(&self) -> &[Lambda] {
        &self.update_expressions
    }
}

impl<T: Record + 'static> UpdateSpecification<T> {
    /// Starts populating this specification.
    pub fn query(&mut self) -> UpdateSpecificationBuilder<'_, T> {
        UpdateSpecificationBuilder { target: self }
    }
}

/// Populates an [`UpdateSpecification`].
pub struct UpdateSpecificationBuilder<'a, T> {
    target: &'a mut UpdateSpecification<T>,
}

impl<T: Record + 'static> UpdateSpecificationBuilder<'_, T> {
    fn with_spec(self, f: impl FnOnce(SpecificationBuilder<'_, T>)) -> Self {
        f(SpecificationBuilder::new(&mut self.target.spec));
        self
    }

    /// Adds a filter. Filters are ANDed.
    pub fn filter(self, predicate: Lambda) -> Self {
        self.with_spec(|b| {
            b.filter(predicate);
        })
    }

    /// Adds a filter when `condition` holds.
    pub fn filter_if(self, condition: bool, predicate: Lambda) -> Self {
        self.with_spec(|b| {
            b.filter_if(condition, predicate);
        })
    }

    /// Adds a `LIKE` search in the default group.
    pub fn search(self, selector: Lambda, search_term: impl Into<String>) -> Self {
        self.with_spec(|b| {
            b.search(selector, search_term);
        })
    }

    /// Adds a `LIKE` search in the given group.
    pub fn search_in_group(self, selector: Lambda, search_term: impl Into<String>, search_group: i32) -> Self {
        self.with_spec(|b| {
            b.search_in_group(selector, search_term, search_group);
        })
    }

    /// Requests untracked evaluation.
    pub fn as_no_tracking(self) -> Self {
        self.with_spec(|b| {
            b.as_no_tracking();
        })
    }

    /// Requests change-tracked evaluation.
    pub fn as_tracking(self) -> Self {
        self.with_spec(|b| {
            b.as_tracking();
        })
    }

    /// Requests untracked evaluation with identity resolution.
    pub fn as_no_tracking_with_identity_resolution(self) -> Self {
        self.with_spec(|b| {
            b.as_no_tracking_with_identity_resolution();
        })
    }

    /// Bypasses global query filters.
    pub fn ignore_query_filters(self) -> Self {
        self.with_spec(|b| {
            b.ignore_query_filters();
        })
    }

    /// Appends an update instruction.
    pub fn set_property(self, instruction: Lambda) -> Self {
        self.target.update_expressions.push(instruction);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;

    #[test]
    fn test_builder_records_filters_and_updates() {
        let mut spec = UpdateSpecification::<Row>::new();
        spec.query()
            .filter(Lambda::new(|x| x.member("id").gt(10)))
            .search(Lambda::member("name"), "a%")
            .ignore_query_filters()
            .set_property(Lambda::new(|c| c.set("x", 1)))
            .set_property(Lambda::new(|c| c.set("y", 2)));
        assert_eq!(spec.where_expressions().len(), 1);
        assert_eq!(spec.search_criterias().len(), 1);
        assert!(spec.is_ignoring_query_filters());
        assert_eq!(spec.update_expressions().len(), 2);
    }

    #[test]
    fn test_tracking_toggle() {
        let mut spec = UpdateSpecification::<Row>::new();
        spec.query().as_tracking();
        assert!(spec.is_as_tracking());
        assert!(!spec.is_as_no_tracking());
    }
}
