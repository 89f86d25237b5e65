//! Query translator: compiles `SELECT DISTINCT <items> FROM <src> [WHERE
//! <expr>]` query bodies into a [`RelationRHS`] — a row variable, its
//! type, and the body fragments accumulated so far.
//!
//! Grounded on the teacher's treatment of a query body as a single
//! threaded, owned accumulator (`semantic::resolver::Resolver` holding a
//! `Context` by value) — re-architected per spec §9's design note as an
//! owned builder returned by value from each compilation step, rather
//! than mutated in place, so a stale reference can't survive past the
//! point where its scope was exited.

pub(crate) mod catalog_support;
mod from;
mod predicate;
mod select;

use sqlparser::ast::{Query as SqlQuery, Select, SetExpr};

use crate::context::TranslationContext;
use crate::error::{Error, Result};
use crate::ir::BodyFragment;

/// A partially-constructed query: the row variable naming its current
/// row, the type-def name of that row, and the body fragments compiled
/// so far.
#[derive(Debug, Clone)]
pub struct RelationRHS {
    pub row_var: String,
    pub row_type: String,
    pub body: Vec<BodyFragment>,
}

impl RelationRHS {
    /// A use-site reference to the row variable — safe to call any
    /// number of times.
    pub fn row_ref(&self) -> crate::ir::Expr {
        crate::ir::Expr::var(self.row_var.clone())
    }
}

/// Accepts only `SELECT DISTINCT <items> FROM <src> [WHERE <expr>]`.
pub fn compile_query(ctx: &mut TranslationContext, query: &SqlQuery) -> Result<RelationRHS> {
    if query.with.is_some() {
        return Err(Error::unsupported("WITH"));
    }
    if query.order_by.as_ref().is_some_and(|o| !o.exprs.is_empty()) {
        return Err(Error::unsupported("ORDER BY"));
    }
    if query.limit.is_some() {
        return Err(Error::unsupported("LIMIT"));
    }

    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select.as_ref(),
        _ => return Err(Error::unsupported("set operations (UNION/EXCEPT/INTERSECT)")),
    };

    compile_select(ctx, select)
}

fn compile_select(ctx: &mut TranslationContext, select: &Select) -> Result<RelationRHS> {
    if !select.distinct {
        return Err(Error::unsupported("non-DISTINCT SELECT"));
    }
    if select.from.is_empty() {
        return Err(Error::unsupported("SELECT without FROM"));
    }
    if select.from.len() > 1 || !select.from[0].joins.is_empty() {
        return Err(Error::unsupported("joins"));
    }

    let mut rhs = from::compile_from(ctx, &select.from[0].relation)?;

    if let Some(predicate) = &select.selection {
        let (cond, _ty) = predicate::translate_predicate(ctx, predicate)?;
        rhs.body.push(BodyFragment::Condition(cond));
    }

    select::compile_projection(ctx, rhs, &select.projection)
}
