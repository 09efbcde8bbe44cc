//! Expression trees.
//!
//! Filters, selectors, ordering keys, and update instructions are all
//! captured as [`Lambda`] values: an inspectable [`Expr`] body over a single
//! parameter. The same tree is interpreted in memory (see [`interpret`]) and
//! translated into query operations or SQL by the query layer.
//!
//! - [`node`] - the AST and its fluent builders
//! - [`rewrite`] - the [`ExprRewriter`] visitor and parameter substitution
//! - [`interpret`] - evaluation against records and compiled predicates
//! - [`compose`] - predicate and update-instruction composition
//! - [`update`] - the [`SetPropertyCalls`] accumulator

pub mod compose;
pub mod interpret;
pub mod node;
pub mod rewrite;
pub mod update;

pub use compose::{and, compose_updates, or};
pub use interpret::{evaluate, evaluate_bool, Binding, Predicate, Scope, Selector};
pub use node::{BinaryOp, Expr, IntoExpr, Lambda, ParamId};
pub use rewrite::{substitute, walk_expr, ExprRewriter, ReplaceParameter};
pub use update::{Assignment, SetPropertyCalls};
