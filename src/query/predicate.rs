//! Translates `sqlparser` scalar expressions (`WHERE` predicates, column
//! references, literals) into row-variable-calculus [`Expr`]s.

use sqlparser::ast::{BinaryOperator, Expr as SqlExpr, Value as SqlValue};

use crate::context::TranslationContext;
use crate::error::{Error, Result};
use crate::ir::{BinOp, Expr, Literal, Type};

/// Translates a scalar expression, returning both the compiled
/// expression and its static type (needed by the caller to type-check
/// comparisons and projected field types).
pub fn translate_predicate(ctx: &mut TranslationContext, expr: &SqlExpr) -> Result<(Expr, Type)> {
    match expr {
        SqlExpr::Nested(inner) => translate_predicate(ctx, inner),
        SqlExpr::Identifier(ident) => ctx.resolve_column(&ident.value),
        SqlExpr::CompoundIdentifier(parts) => {
            let [qualifier, column] = parts.as_slice() else {
                return Err(Error::unsupported("deeply-qualified column reference"));
            };
            ctx.resolve_qualified_column(&qualifier.value, &column.value)
        }
        SqlExpr::Value(value) => translate_literal(value),
        SqlExpr::BinaryOp { left, op, right } => translate_binary_op(ctx, left, op, right),
        other => Err(Error::unsupported(format!("expression: {other}"))),
    }
}

fn translate_literal(value: &SqlValue) -> Result<(Expr, Type)> {
    match value {
        SqlValue::Boolean(b) => Ok((Expr::Literal(Literal::Bool(*b)), Type::Bool)),
        SqlValue::Number(text, _) => {
            Ok((Expr::Literal(Literal::Int(text.clone())), Type::Signed(64)))
        }
        SqlValue::SingleQuotedString(s) => {
            Ok((Expr::Literal(Literal::Str(s.clone())), Type::Str))
        }
        other => Err(Error::unsupported(format!("literal: {other}"))),
    }
}

fn translate_binary_op(
    ctx: &mut TranslationContext,
    left: &SqlExpr,
    op: &BinaryOperator,
    right: &SqlExpr,
) -> Result<(Expr, Type)> {
    let ir_op = match op {
        BinaryOperator::Eq => BinOp::Eq,
        BinaryOperator::NotEq => BinOp::NotEq,
        BinaryOperator::Lt => BinOp::Lt,
        BinaryOperator::LtEq => BinOp::LtEq,
        BinaryOperator::Gt => BinOp::Gt,
        BinaryOperator::GtEq => BinOp::GtEq,
        BinaryOperator::And => BinOp::And,
        BinaryOperator::Or => BinOp::Or,
        other => return Err(Error::unsupported(format!("operator: {other}"))),
    };

    let (lhs, lhs_ty) = translate_predicate(ctx, left)?;
    let (rhs, rhs_ty) = translate_predicate(ctx, right)?;

    // A nullable column's static type is `Nullable(T)` while a literal's is
    // the bare `T` (spec §4.6's wrapper is a wire/value concern, not a
    // comparability one) — strip the wrapper before checking agreement.
    if !matches!(ir_op, BinOp::And | BinOp::Or) && strip_nullable(&lhs_ty) != strip_nullable(&rhs_ty) {
        return Err(Error::arity_or_type(format!(
            "comparison between mismatched types {lhs_ty:?} and {rhs_ty:?}"
        )));
    }

    Ok((Expr::bin_op(ir_op, lhs, rhs), Type::Bool))
}

fn strip_nullable(ty: &Type) -> &Type {
    match ty {
        Type::Nullable(inner) => inner,
        other => other,
    }
}
