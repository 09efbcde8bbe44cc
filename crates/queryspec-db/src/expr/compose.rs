//! Lambda composition.
//!
//! Predicates compose by rebinding the right-hand lambda onto the left-hand
//! parameter, so the result is again a single-parameter lambda that query
//! translators can consume directly. Update instructions compose by threading
//! the accumulator of one instruction into the next.

use queryspec_core::{SpecError, SpecResult};

use super::node::{BinaryOp, Expr, Lambda, ParamId};
use super::rewrite::substitute;

fn combine(left: &Lambda, right: &Lambda, op: BinaryOp) -> Lambda {
    let rhs = substitute(right, Expr::Param(left.param));
    Lambda::from_parts(
        left.param,
        Expr::Binary {
            op,
            lhs: Box::new(left.body.clone()),
            rhs: Box::new(rhs),
        },
    )
}

/// `x => left(x) && right(x)`
pub fn and(left: &Lambda, right: &Lambda) -> Lambda {
    combine(left, right, BinaryOp::And)
}

/// `x => left(x) || right(x)`
pub fn or(left: &Lambda, right: &Lambda) -> Lambda {
    combine(left, right, BinaryOp::Or)
}

/// Composes update instructions into one whose effect equals applying them
/// in order.
///
/// A single instruction is returned unchanged. Two instructions keep the
/// first one's parameter; three or more are folded over a fresh parameter.
///
/// # Errors
///
/// Returns [`SpecError::EmptyUpdateInstructions`] when `instructions` is
/// empty.
///
/// # Examples
///
/// ```
/// use queryspec_db::expr::{compose_updates, Lambda, SetPropertyCalls};
///
/// let a = Lambda::new(|c| c.set("x", 1));
/// let b = Lambda::new(|c| c.set("y", 2));
/// let composed = compose_updates(&[a.clone(), b.clone()]).unwrap();
///
/// let one_by_one = SetPropertyCalls::new().apply(&a).unwrap().apply(&b).unwrap();
/// let at_once = SetPropertyCalls::new().apply(&composed).unwrap();
/// assert_eq!(one_by_one, at_once);
/// ```
pub fn compose_updates(instructions: &[Lambda]) -> SpecResult<Lambda> {
    match instructions {
        [] => Err(SpecError::EmptyUpdateInstructions),
        [single] => Ok(single.clone()),
        [first, second] => Ok(Lambda::from_parts(
            first.param,
            substitute(second, first.body.clone()),
        )),
        many => {
            let param = ParamId::fresh();
            let body = many.iter().fold(Expr::Param(param), |acc, instruction| {
                substitute(instruction, acc)
            });
            Ok(Lambda::from_parts(param, body))
        }
    }
}

impl Lambda {
    /// Combines two predicates with logical AND.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        and(self, other)
    }

    /// Combines two predicates with logical OR.
    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        or(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;
    use crate::value::Value;

    fn row(n: i64) -> Row {
        Row::from_pairs([("n", Value::Int(n))])
    }

    #[test]
    fn test_and_rebinds_right_param() {
        let a = Lambda::new(|x| x.member("n").gt(2));
        let b = Lambda::new(|y| y.member("n").lt(8));
        let both = and(&a, &b);
        assert_eq!(both.param, a.param);
        assert_eq!(
            both.body,
            Expr::Param(a.param).member("n").gt(2) & Expr::Param(a.param).member("n").lt(8)
        );
        assert!(both.test(&row(5)).unwrap());
        assert!(!both.test(&row(9)).unwrap());
    }

    #[test]
    fn test_or() {
        let a = Lambda::new(|x| x.member("n").equals(1));
        let b = Lambda::new(|x| x.member("n").equals(3));
        let either = a.or(&b);
        assert!(either.test(&row(1)).unwrap());
        assert!(either.test(&row(3)).unwrap());
        assert!(!either.test(&row(2)).unwrap());
    }

    #[test]
    fn test_compose_empty_fails() {
        assert!(matches!(
            compose_updates(&[]),
            Err(SpecError::EmptyUpdateInstructions)
        ));
    }

    #[test]
    fn test_compose_single_is_identity() {
        let a = Lambda::new(|c| c.set("x", 1));
        assert_eq!(compose_updates(&[a.clone()]).unwrap(), a);
    }

    #[test]
    fn test_compose_two_keeps_first_param() {
        let a = Lambda::new(|c| c.set("x", 1));
        let b = Lambda::new(|c| c.set("y", 2));
        let composed = compose_updates(&[a.clone(), b]).unwrap();
        assert_eq!(composed.param, a.param);
    }

    #[test]
    fn test_compose_many_uses_fresh_param() {
        let updates: Vec<Lambda> = ["a", "b", "c"]
            .iter()
            .map(|p| Lambda::new(|c| c.set(*p, 0)))
            .collect();
        let composed = compose_updates(&updates).unwrap();
        assert!(updates.iter().all(|u| u.param != composed.param));
        let mut path = Vec::new();
        let mut cursor = &composed.body;
        while let Expr::SetProperty {
            target, property, ..
        } = cursor
        {
            path.push(property.clone());
            cursor = target;
        }
        assert_eq!(path, vec!["c", "b", "a"]);
        assert_eq!(*cursor, Expr::Param(composed.param));
    }
}
