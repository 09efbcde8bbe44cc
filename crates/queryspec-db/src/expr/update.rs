//! Update instruction accumulator.
//!
//! An update instruction is a lambda over a [`SetPropertyCalls`] accumulator
//! whose body is a chain of `set_property` calls:
//!
//! ```
//! use queryspec_db::expr::{Lambda, SetPropertyCalls};
//! use queryspec_db::record::Row;
//! use queryspec_db::value::Value;
//!
//! let raise = Lambda::new(|c| {
//!     c.set_property("salary", Lambda::new(|e| e.member("salary") * queryspec_db::expr::Expr::val(2)))
//!         .set("reviewed", true)
//! });
//! let calls = SetPropertyCalls::new().apply(&raise).unwrap();
//! let row = Row::from_pairs([("salary", Value::Int(10))]);
//! assert_eq!(
//!     calls.resolve(&row).unwrap(),
//!     vec![("salary".to_string(), Value::Int(20)), ("reviewed".to_string(), Value::Bool(true))]
//! );
//! ```

use queryspec_core::{SpecError, SpecResult};

use super::node::{Expr, Lambda, ParamId};
use crate::record::Record;
use crate::value::Value;

/// One recorded property assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// The property being set.
    pub property: String,
    /// Computes the new value from the entity being updated.
    pub value: Lambda,
}

/// The ordered list of property assignments an update performs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetPropertyCalls {
    assignments: Vec<Assignment>,
}

impl SetPropertyCalls {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an assignment.
    #[must_use]
    pub fn set_property(mut self, property: impl Into<String>, value: Lambda) -> Self {
        self.assignments.push(Assignment {
            property: property.into(),
            value,
        });
        self
    }

    /// Returns the recorded assignments in call order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns `true` if nothing has been assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Runs an update instruction against this accumulator.
    ///
    /// # Errors
    ///
    /// Returns an error if the instruction body is not a `set_property`
    /// chain rooted at its own parameter.
    pub fn apply(self, instruction: &Lambda) -> SpecResult<Self> {
        apply_chain(&instruction.body, instruction.param, self)
    }

    /// Computes the assigned values for one record.
    ///
    /// A property assigned more than once keeps its position from the first
    /// assignment and the value of the last.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors from the value lambdas.
    pub fn resolve(&self, record: &dyn Record) -> SpecResult<Vec<(String, Value)>> {
        let mut resolved: Vec<(String, Value)> = Vec::with_capacity(self.assignments.len());
        for assignment in &self.assignments {
            let value = assignment.value.invoke(record)?;
            match resolved.iter_mut().find(|(p, _)| *p == assignment.property) {
                Some(slot) => slot.1 = value,
                None => resolved.push((assignment.property.clone(), value)),
            }
        }
        Ok(resolved)
    }
}

fn apply_chain(expr: &Expr, param: ParamId, start: SetPropertyCalls) -> SpecResult<SetPropertyCalls> {
    match expr {
        Expr::Param(id) if *id == param => Ok(start),
        Expr::Param(id) => Err(SpecError::UnboundParameter(id.to_string())),
        Expr::SetProperty {
            target,
            property,
            value,
        } => Ok(apply_chain(target, param, start)?.set_property(property.clone(), (**value).clone())),
        other => Err(SpecError::Evaluation(format!(
            "Update instruction must be a set_property chain, got {other}"
        ))),
    }
}
