//! In-memory validation against a specification's filters.

use queryspec_core::SpecResult;

use crate::record::Record;
use crate::specification::Specification;

/// Checks single items against the `where` expressions of a specification.
///
/// Only filters take part: search criteria, ordering, and paging describe a
/// result set, not a property of one item. A specification with no filters
/// is satisfied by everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Creates a validator.
    pub const fn new() -> Self {
        Self
    }

    /// Returns `true` if `item` passes every filter of `spec`.
    ///
    /// Evaluation stops at the first failing filter.
    ///
    /// # Errors
    ///
    /// Propagates filter evaluation errors.
    pub fn is_satisfied_by<T: Record>(&self, item: &T, spec: &Specification<T>) -> SpecResult<bool> {
        for expr in spec.where_expressions() {
            if !(expr.predicate)(item)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
