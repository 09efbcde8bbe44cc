//! Expression tree nodes.
//!
//! An [`Expr`] is an abstract syntax tree over a single-parameter [`Lambda`].
//! Parameters are identified by [`ParamId`], which is unique for the life of
//! the process, so two lambdas never capture each other's parameters by
//! accident and parameter substitution is a plain id comparison.
//!
//! # Examples
//!
//! ```
//! use queryspec_db::expr::Lambda;
//!
//! // |x| x.age > 18 && x.name != "root"
//! let adult = Lambda::new(|x| x.clone().member("age").gt(18) & x.member("name").not_equals("root"));
//! assert_eq!(adult.to_string(), format!("{} => (({0}.age > 18) && ({0}.name != \"root\"))", adult.param));
//! ```

use std::fmt;
use std::ops;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::Value;

/// The identity of a lambda parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u64);

impl ParamId {
    /// The parameter [`Lambda::shape`] rebinds every lambda to. Never
    /// returned by [`ParamId::fresh`].
    const SHAPE: Self = Self(0);

    /// Allocates a parameter id never handed out before.
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// Addition (string concatenation for strings).
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

impl BinaryOp {
    /// Returns the display symbol of this operator.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A reference to a lambda parameter.
    Param(ParamId),
    /// A constant value.
    Const(Value),
    /// Member access: `target.name`.
    Member {
        /// The expression whose member is read.
        target: Box<Expr>,
        /// The member name.
        name: String,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Logical negation.
    Not(Box<Expr>),
    /// `expr IS NULL`.
    IsNull(Box<Expr>),
    /// SQL-style `LIKE` pattern match.
    Like {
        /// The string being matched.
        input: Box<Expr>,
        /// The pattern.
        pattern: Box<Expr>,
    },
    /// An anonymous object: `{ name: expr, ... }`.
    Object(Vec<(String, Expr)>),
    /// A list of expressions.
    List(Vec<Expr>),
    /// One step of a fluent update chain: `target.set_property(property, value)`.
    SetProperty {
        /// The accumulator the call is made on.
        target: Box<Expr>,
        /// The property being assigned.
        property: String,
        /// Computes the new value from the entity being updated.
        value: Box<Lambda>,
    },
}

/// Conversion into an expression operand.
pub trait IntoExpr {
    /// Converts `self` into an expression.
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for Value {
    fn into_expr(self) -> Expr {
        Expr::Const(self)
    }
}

macro_rules! into_expr_via_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Const(Value::from(self))
                }
            }
        )*
    };
}

into_expr_via_value!(bool, i32, i64, u32, f64, &str, String, uuid::Uuid, chrono::NaiveDate);

impl Expr {
    /// Creates a constant expression.
    pub fn val(v: impl Into<Value>) -> Self {
        Self::Const(v.into())
    }

    /// Member access on this expression.
    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member {
            target: Box::new(self),
            name: name.into(),
        }
    }

    fn binary(self, op: BinaryOp, rhs: impl IntoExpr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into_expr()),
        }
    }

    /// `self == rhs`
    #[must_use]
    pub fn equals(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    /// `self != rhs`
    #[must_use]
    pub fn not_equals(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Ne, rhs)
    }

    /// `self < rhs`
    #[must_use]
    pub fn lt(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    /// `self <= rhs`
    #[must_use]
    pub fn le(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Le, rhs)
    }

    /// `self > rhs`
    #[must_use]
    pub fn gt(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    /// `self >= rhs`
    #[must_use]
    pub fn ge(self, rhs: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Ge, rhs)
    }

    /// `self IS NULL`
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull(Box::new(self))
    }

    /// `self LIKE pattern`
    #[must_use]
    pub fn like(self, pattern: impl IntoExpr) -> Self {
        Self::Like {
            input: Box::new(self),
            pattern: Box::new(pattern.into_expr()),
        }
    }

    /// Builds an anonymous object expression.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Expr)>,
        K: Into<String>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Appends a `set_property` call computed from the updated entity.
    #[must_use]
    pub fn set_property(self, property: impl Into<String>, value: Lambda) -> Self {
        Self::SetProperty {
            target: Box::new(self),
            property: property.into(),
            value: Box::new(value),
        }
    }

    /// Appends a `set_property` call assigning a constant.
    #[must_use]
    pub fn set(self, property: impl Into<String>, value: impl IntoExpr) -> Self {
        let value = value.into_expr();
        self.set_property(property, Lambda::new(|_| value))
    }

    /// Returns the chain of member names if this is `param.a.b...`.
    pub fn member_path(&self, param: ParamId) -> Option<Vec<String>> {
        match self {
            Self::Param(id) if *id == param => Some(Vec::new()),
            Self::Member { target, name } => {
                let mut path = target.member_path(param)?;
                path.push(name.clone());
                Some(path)
            }
            _ => None,
        }
    }
}

impl ops::BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::And, rhs)
    }
}

impl ops::BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Or, rhs)
    }
}

impl ops::Not for Expr {
    type Output = Self;

    fn not(self) -> Self::Output {
        // Double negation cancellation
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

impl ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Add, rhs)
    }
}

impl ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Sub, rhs)
    }
}

impl ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Mul, rhs)
    }
}

impl ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Div, rhs)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Param(id) => write!(f, "{id}"),
            Self::Const(Value::String(s)) => write!(f, "{s:?}"),
            Self::Const(v) => write!(f, "{v}"),
            Self::Member { target, name } => write!(f, "{target}.{name}"),
            Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::IsNull(inner) => write!(f, "({inner} is null)"),
            Self::Like { input, pattern } => write!(f, "like({input}, {pattern})"),
            Self::Object(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, expr)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {expr}")?;
                }
                write!(f, " }}")
            }
            Self::List(items) => {
                write!(f, "[")?;
                for (i, expr) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{expr}")?;
                }
                write!(f, "]")
            }
            Self::SetProperty {
                target,
                property,
                value,
            } => write!(f, "{target}.set_property({property:?}, {value})"),
        }
    }
}

/// A single-parameter lambda: `param => body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    /// The parameter bound by this lambda.
    pub param: ParamId,
    /// The lambda body.
    pub body: Expr,
}

impl Lambda {
    /// Builds a lambda over a fresh parameter.
    pub fn new(build: impl FnOnce(Expr) -> Expr) -> Self {
        let param = ParamId::fresh();
        Self {
            param,
            body: build(Expr::Param(param)),
        }
    }

    /// Builds a lambda from an existing parameter and body.
    pub const fn from_parts(param: ParamId, body: Expr) -> Self {
        Self { param, body }
    }

    /// `|x| x.name`
    pub fn member(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(|x| x.member(name))
    }

    /// `|x| x`
    pub fn identity() -> Self {
        Self::new(|x| x)
    }

    /// Returns the member chain if the body is `param.a.b...`.
    pub fn member_path(&self) -> Option<Vec<String>> {
        self.body.member_path(self.param)
    }

    /// Renders the body over a fixed placeholder parameter, so lambdas that
    /// differ only in their parameter render identically.
    pub fn shape(&self) -> String {
        super::rewrite::substitute(self, Expr::Param(ParamId::SHAPE)).to_string()
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.param, self.body)
    }
}
