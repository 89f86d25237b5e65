//! Compiles a projection list into either a pass-through (`SELECT
//! DISTINCT *`) or a struct-constructor binding that introduces a fresh
//! row type and row variable for the projected tuple.
//!
//! Field-name derivation follows a fixed precedence: an explicit `AS`
//! alias wins; otherwise an unqualified or qualified column reference
//! keeps its own name; anything else (a computed expression) falls back
//! to a fresh `col_k` name. [`catalog_support`](super::catalog_support)
//! re-runs this same precedence independently, so a change here must be
//! mirrored there.

use sqlparser::ast::{Expr as SqlExpr, SelectItem};

use crate::context::TranslationContext;
use crate::error::{Error, Result};
use crate::ir::{
    Atom, BodyFragment, Declaration, Expr, Field, Relation, RelationRole, Rule, StructType, TypeDef,
};

use super::RelationRHS;

/// Compiles an itemized projection the same way a parenthesized subquery
/// FROM-source is compiled (spec §4.3): the filtered, projected tuple is
/// registered as its own `Internal` relation with its own rule, and the
/// caller is handed back a fresh `RelationRHS` over that relation — a
/// single fresh row variable bound by one literal atom — so `CREATE VIEW`
/// only ever has to bind one more variable to it, regardless of how deep
/// the accumulated body got.
pub fn compile_projection(
    ctx: &mut TranslationContext,
    rhs: RelationRHS,
    projection: &[SelectItem],
) -> Result<RelationRHS> {
    if let [SelectItem::Wildcard(_)] = projection {
        return Ok(rhs);
    }

    let mut fields = Vec::with_capacity(projection.len());
    let mut ctors = Vec::with_capacity(projection.len());
    for item in projection {
        let (name, sql_expr) = match item {
            SelectItem::UnnamedExpr(expr) => (derive_name(ctx, expr), expr),
            SelectItem::ExprWithAlias { expr, alias } => (alias.value.clone(), expr),
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                return Err(Error::unsupported("`*` mixed with other projection items"))
            }
        };
        let (expr, ty) = crate::query::predicate::translate_predicate(ctx, sql_expr)?;
        fields.push(Field { name: name.clone(), ty });
        ctors.push((name, expr));
    }

    let struct_ty = StructType { fields };
    if struct_ty.has_duplicate_names() {
        return Err(Error::arity_or_type("duplicate projected column name"));
    }

    let suffix = ctx.fresh_global_name("tmp");
    let type_name = format!("T{suffix}");
    ctx.add_declaration(Declaration::TypeDef(TypeDef {
        name: type_name.clone(),
        ty: struct_ty,
    }))?;

    let bound_row_var = ctx.fresh_local_name("v");
    let mut body = rhs.body;
    body.push(BodyFragment::Condition(Expr::assign(
        Expr::var_decl(bound_row_var.clone()),
        Expr::StructCtor(type_name.clone(), ctors),
    )));

    ctx.add_declaration(Declaration::Relation(Relation {
        name: suffix.clone(),
        role: RelationRole::Internal,
        row_type: type_name.clone(),
    }))?;
    ctx.add_declaration(Declaration::Rule(Rule {
        head: Atom::new(suffix.clone(), Expr::var(bound_row_var)),
        body,
    }))?;

    let out_var = ctx.fresh_local_name("v");
    Ok(RelationRHS {
        body: vec![BodyFragment::Literal(Atom::new(
            suffix,
            Expr::var(out_var.clone()),
        ))],
        row_var: out_var,
        row_type: type_name,
    })
}

/// Derives a projected column's name when no `AS` alias is given: the
/// expression's own column name if it is a bare (possibly qualified)
/// identifier, otherwise a fresh synthetic name.
fn derive_name(ctx: &mut TranslationContext, expr: &SqlExpr) -> String {
    match expr {
        SqlExpr::Identifier(ident) => ident.value.clone(),
        SqlExpr::CompoundIdentifier(parts) => parts
            .last()
            .map(|p| p.value.clone())
            .unwrap_or_else(|| ctx.fresh_local_name("col")),
        _ => ctx.fresh_local_name("col"),
    }
}
