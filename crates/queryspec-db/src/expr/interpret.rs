//! In-memory interpretation of expression trees.
//!
//! The interpreter evaluates an [`Expr`] against a [`Scope`] that binds each
//! lambda parameter to either a [`Record`] or a plain [`Value`]. Comparisons
//! follow object semantics rather than SQL three-valued logic: `null == null`
//! is true, and an ordering comparison involving `null` is false.

use std::sync::Arc;

use queryspec_core::{SpecError, SpecResult};

use super::node::{BinaryOp, Expr, Lambda, ParamId};
use crate::record::Record;
use crate::value::Value;

/// A compiled boolean predicate over `T`.
pub type Predicate<T> = Arc<dyn Fn(&T) -> SpecResult<bool> + Send + Sync>;

/// A compiled value selector over `T`.
pub type Selector<T> = Arc<dyn Fn(&T) -> SpecResult<Value> + Send + Sync>;

/// What a parameter is bound to.
#[derive(Clone)]
pub enum Binding<'a> {
    /// An entity; member access resolves through [`Record::field`].
    Record(&'a dyn Record),
    /// A plain value.
    Value(Value),
}

/// Parameter bindings for one evaluation.
#[derive(Clone, Default)]
pub struct Scope<'a> {
    bindings: Vec<(ParamId, Binding<'a>)>,
}

impl<'a> Scope<'a> {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope binding `param` to a record.
    pub fn with_record(param: ParamId, record: &'a dyn Record) -> Self {
        Self::new().bind(param, Binding::Record(record))
    }

    /// Creates a scope binding `param` to a value.
    pub fn with_value(param: ParamId, value: Value) -> Self {
        Self::new().bind(param, Binding::Value(value))
    }

    /// Adds a binding. Later bindings shadow earlier ones.
    #[must_use]
    pub fn bind(mut self, param: ParamId, binding: Binding<'a>) -> Self {
        self.bindings.push((param, binding));
        self
    }

    fn lookup(&self, param: ParamId) -> Option<&Binding<'a>> {
        self.bindings
            .iter()
            .rev()
            .find(|(id, _)| *id == param)
            .map(|(_, b)| b)
    }
}

/// Evaluates an expression.
///
/// # Errors
///
/// Returns [`SpecError::UnboundParameter`] for a parameter missing from the
/// scope, [`SpecError::InvalidSearchPattern`] for a malformed `like`
/// pattern, and [`SpecError::Evaluation`] for type errors and unknown fields.
pub fn evaluate(expr: &Expr, scope: &Scope<'_>) -> SpecResult<Value> {
    match expr {
        Expr::Param(id) => match scope.lookup(*id) {
            Some(Binding::Value(v)) => Ok(v.clone()),
            Some(Binding::Record(record)) => Ok(record_to_value(*record)),
            None => Err(SpecError::UnboundParameter(id.to_string())),
        },
        Expr::Const(v) => Ok(v.clone()),
        Expr::Member { target, name } => {
            if let Expr::Param(id) = target.as_ref() {
                if let Some(Binding::Record(record)) = scope.lookup(*id) {
                    return record
                        .field(name)
                        .ok_or_else(|| SpecError::Evaluation(format!("Unknown field '{name}'")));
                }
            }
            let base = evaluate(target, scope)?;
            Ok(base.member(name).unwrap_or(Value::Null))
        }
        Expr::Binary { op, lhs, rhs } => match op {
            BinaryOp::And => Ok(Value::Bool(
                evaluate_bool(lhs, scope)? && evaluate_bool(rhs, scope)?,
            )),
            BinaryOp::Or => Ok(Value::Bool(
                evaluate_bool(lhs, scope)? || evaluate_bool(rhs, scope)?,
            )),
            _ => {
                let l = evaluate(lhs, scope)?;
                let r = evaluate(rhs, scope)?;
                apply_binary(*op, &l, &r)
            }
        },
        Expr::Not(inner) => match evaluate(inner, scope)? {
            Value::Null => Ok(Value::Null),
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(SpecError::Evaluation(format!(
                "Cannot negate a value of type {}",
                other.type_name()
            ))),
        },
        Expr::IsNull(inner) => Ok(Value::Bool(evaluate(inner, scope)?.is_null())),
        Expr::Like { input, pattern } => {
            let input = evaluate(input, scope)?;
            let pattern = evaluate(pattern, scope)?;
            let pattern = match pattern {
                Value::Null => return Ok(Value::Bool(false)),
                Value::String(p) => p,
                other => {
                    return Err(SpecError::Evaluation(format!(
                        "Search pattern must be a string, got {}",
                        other.type_name()
                    )))
                }
            };
            match input {
                Value::Null => Ok(Value::Bool(false)),
                Value::String(s) => Ok(Value::Bool(crate::search::like(&s, &pattern)?)),
                other => Ok(Value::Bool(crate::search::like(&other.to_string(), &pattern)?)),
            }
        }
        Expr::Object(fields) => fields
            .iter()
            .map(|(name, e)| Ok((name.clone(), evaluate(e, scope)?)))
            .collect::<SpecResult<_>>()
            .map(Value::Object),
        Expr::List(items) => items
            .iter()
            .map(|e| evaluate(e, scope))
            .collect::<SpecResult<_>>()
            .map(Value::List),
        Expr::SetProperty { property, .. } => Err(SpecError::Evaluation(format!(
            "set_property(\"{property}\") can only be applied to an update accumulator"
        ))),
    }
}

/// Evaluates an expression as a condition. `null` counts as false.
///
/// # Errors
///
/// Fails like [`evaluate`], or when the result is neither a boolean nor null.
pub fn evaluate_bool(expr: &Expr, scope: &Scope<'_>) -> SpecResult<bool> {
    as_condition(evaluate(expr, scope)?)
}

/// Interprets an evaluated value as a condition. `null` counts as false.
pub(crate) fn as_condition(value: Value) -> SpecResult<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        other => Err(SpecError::Evaluation(format!(
            "Expected a boolean condition, got {}",
            other.type_name()
        ))),
    }
}

fn record_to_value(record: &dyn Record) -> Value {
    Value::Object(
        record
            .field_values()
            .into_iter()
            .map(|(name, v)| (name.into_owned(), v))
            .collect(),
    )
}

fn apply_binary(op: BinaryOp, l: &Value, r: &Value) -> SpecResult<Value> {
    let result = match op {
        BinaryOp::Eq => Value::Bool(values_equal(l, r)),
        BinaryOp::Ne => Value::Bool(!values_equal(l, r)),
        BinaryOp::Lt => Value::Bool(l.compare(r).is_some_and(|o| o.is_lt())),
        BinaryOp::Le => Value::Bool(l.compare(r).is_some_and(|o| o.is_le())),
        BinaryOp::Gt => Value::Bool(l.compare(r).is_some_and(|o| o.is_gt())),
        BinaryOp::Ge => Value::Bool(l.compare(r).is_some_and(|o| o.is_ge())),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => arithmetic(op, l, r)?,
        BinaryOp::And | BinaryOp::Or => {
            let (a, b) = (as_condition(l.clone())?, as_condition(r.clone())?);
            Value::Bool(if op == BinaryOp::And { a && b } else { a || b })
        }
    };
    Ok(result)
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l.is_null(), r.is_null()) {
        (true, true) => true,
        (false, false) => l.loose_eq(r),
        _ => false,
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> SpecResult<Value> {
    match (l, r) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                _ if *b == 0 => {
                    return Err(SpecError::Evaluation("Division by zero".to_string()));
                }
                _ => a.checked_div(*b),
            };
            result
                .map(Value::Int)
                .ok_or_else(|| SpecError::Evaluation(format!("Integer overflow in {a} {} {b}", op.symbol())))
        }
        (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
            Ok(Value::String(format!("{a}{b}")))
        }
        _ => match (as_f64(l), as_f64(r)) {
            (Some(a), Some(b)) => Ok(Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ => a / b,
            })),
            _ => Err(SpecError::Evaluation(format!(
                "Cannot apply '{}' to {} and {}",
                op.symbol(),
                l.type_name(),
                r.type_name()
            ))),
        },
    }
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

impl Lambda {
    /// Invokes the lambda with its parameter bound to `record`.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors.
    pub fn invoke(&self, record: &dyn Record) -> SpecResult<Value> {
        evaluate(&self.body, &Scope::with_record(self.param, record))
    }

    /// Invokes the lambda with its parameter bound to `value`.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors.
    pub fn invoke_with(&self, value: Value) -> SpecResult<Value> {
        evaluate(&self.body, &Scope::with_value(self.param, value))
    }

    /// Evaluates the lambda as a predicate over `record`.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors, or fails if the body is not boolean.
    pub fn test(&self, record: &dyn Record) -> SpecResult<bool> {
        evaluate_bool(&self.body, &Scope::with_record(self.param, record))
    }

    /// Compiles the lambda into a reusable predicate.
    pub fn compile<T: Record + 'static>(&self) -> Predicate<T> {
        let lambda = self.clone();
        Arc::new(move |item: &T| lambda.test(item))
    }

    /// Compiles the lambda into a reusable selector.
    pub fn compile_selector<T: Record + 'static>(&self) -> Selector<T> {
        let lambda = self.clone();
        Arc::new(move |item: &T| lambda.invoke(item))
    }
}
