//! Expression rewriting.
//!
//! [`ExprRewriter`] walks a tree and rebuilds it bottom-up. Implementors
//! override only the hooks they care about; everything else is copied
//! through by [`walk_expr`].

use super::node::{Expr, Lambda, ParamId};

/// A tree-to-tree transformation over [`Expr`].
pub trait ExprRewriter {
    /// Rewrites an expression. The default walks into children.
    fn rewrite(&mut self, expr: &Expr) -> Expr {
        walk_expr(self, expr)
    }

    /// Rewrites a parameter reference. The default leaves it unchanged.
    fn rewrite_param(&mut self, id: ParamId) -> Expr {
        Expr::Param(id)
    }
}

/// Rebuilds `expr`, sending every child through `rewriter`.
pub fn walk_expr<R: ExprRewriter + ?Sized>(rewriter: &mut R, expr: &Expr) -> Expr {
    match expr {
        Expr::Param(id) => rewriter.rewrite_param(*id),
        Expr::Const(v) => Expr::Const(v.clone()),
        Expr::Member { target, name } => Expr::Member {
            target: Box::new(rewriter.rewrite(target)),
            name: name.clone(),
        },
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op: *op,
            lhs: Box::new(rewriter.rewrite(lhs)),
            rhs: Box::new(rewriter.rewrite(rhs)),
        },
        Expr::Not(inner) => Expr::Not(Box::new(rewriter.rewrite(inner))),
        Expr::IsNull(inner) => Expr::IsNull(Box::new(rewriter.rewrite(inner))),
        Expr::Like { input, pattern } => Expr::Like {
            input: Box::new(rewriter.rewrite(input)),
            pattern: Box::new(rewriter.rewrite(pattern)),
        },
        Expr::Object(fields) => Expr::Object(
            fields
                .iter()
                .map(|(name, e)| (name.clone(), rewriter.rewrite(e)))
                .collect(),
        ),
        Expr::List(items) => Expr::List(items.iter().map(|e| rewriter.rewrite(e)).collect()),
        Expr::SetProperty {
            target,
            property,
            value,
        } => Expr::SetProperty {
            target: Box::new(rewriter.rewrite(target)),
            property: property.clone(),
            value: Box::new(Lambda::from_parts(value.param, rewriter.rewrite(&value.body))),
        },
    }
}

/// Replaces every reference to one parameter with an expression.
///
/// # Examples
///
/// ```
/// use queryspec_db::expr::{Expr, ExprRewriter, Lambda, ReplaceParameter};
///
/// let f = Lambda::new(|x| x.member("age").gt(5));
/// let g = Lambda::new(|y| y);
/// let mut replace = ReplaceParameter::new(f.param, Expr::Param(g.param));
/// let rebound = replace.rewrite(&f.body);
/// assert_eq!(rebound, Expr::Param(g.param).member("age").gt(5));
/// ```
#[derive(Debug, Clone)]
pub struct ReplaceParameter {
    from: ParamId,
    to: Expr,
}

impl ReplaceParameter {
    /// Creates a rewriter replacing `from` with `to`.
    pub const fn new(from: ParamId, to: Expr) -> Self {
        Self { from, to }
    }
}

impl ExprRewriter for ReplaceParameter {
    fn rewrite_param(&mut self, id: ParamId) -> Expr {
        if id == self.from {
            self.to.clone()
        } else {
            Expr::Param(id)
        }
    }
}

/// Returns `lambda.body` with its parameter replaced by `replacement`.
pub fn substitute(lambda: &Lambda, replacement: Expr) -> Expr {
    ReplaceParameter::new(lambda.param, replacement).rewrite(&lambda.body)
}
