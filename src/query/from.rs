//! Compiles a single `FROM` source — a named table/view, or a
//! parenthesized subquery — into a [`RelationRHS`] whose body starts
//! with exactly one literal atom.

use sqlparser::ast::TableFactor;

use crate::context::TranslationContext;
use crate::error::{Error, Result};
use crate::ir::{Atom, BodyFragment, Declaration, Expr, Relation, RelationRole, Rule};

use super::RelationRHS;

pub fn compile_from(ctx: &mut TranslationContext, source: &TableFactor) -> Result<RelationRHS> {
    match source {
        TableFactor::Table { name, alias, args, .. } => {
            if args.is_some() {
                return Err(Error::unsupported("table-valued functions"));
            }
            let table_name = name
                .0
                .last()
                .ok_or_else(|| Error::unsupported("empty table name"))?
                .value
                .clone();
            let relation = ctx.resolve_source_relation(&table_name)?;
            let relation_name = relation.name.clone();
            let row_type = relation.row_type.clone();

            let row_var = ctx.fresh_local_name("v");
            let qualifier = alias
                .as_ref()
                .map(|a| a.name.value.clone())
                .unwrap_or_else(|| table_name.clone());
            ctx.enter_scope_as(row_var.clone(), row_type.clone(), qualifier);

            Ok(RelationRHS {
                body: vec![BodyFragment::Literal(Atom::new(
                    relation_name,
                    Expr::var(row_var.clone()),
                ))],
                row_var,
                row_type,
            })
        }
        TableFactor::Derived {
            subquery, alias, ..
        } => {
            // spec §4.3: a parenthesized subquery source is bound through
            // its own fresh `Internal` relation and rule — the same
            // algorithm an itemized projection uses (`select::compile_projection`)
            // — rather than forwarding the inner `RelationRHS` verbatim, so
            // the outer query only ever joins against one literal atom.
            let inner = super::compile_query(ctx, subquery)?;
            let inner_row_ref = inner.row_ref();
            let row_type = inner.row_type.clone();
            let mut body = inner.body;

            let suffix = ctx.fresh_global_name("tmp");
            let bound_row_var = ctx.fresh_local_name("v");
            body.push(BodyFragment::Condition(Expr::assign(
                Expr::var_decl(bound_row_var.clone()),
                inner_row_ref,
            )));

            ctx.add_declaration(Declaration::Relation(Relation {
                name: suffix.clone(),
                role: RelationRole::Internal,
                row_type: row_type.clone(),
            }))?;
            ctx.add_declaration(Declaration::Rule(Rule {
                head: Atom::new(suffix.clone(), Expr::var(bound_row_var)),
                body,
            }))?;

            let out_var = ctx.fresh_local_name("v");
            match alias {
                Some(alias) => {
                    ctx.enter_scope_as(out_var.clone(), row_type.clone(), alias.name.value.clone())
                }
                None => ctx.enter_scope(out_var.clone(), row_type.clone()),
            }

            Ok(RelationRHS {
                body: vec![BodyFragment::Literal(Atom::new(suffix, Expr::var(out_var.clone())))],
                row_var: out_var,
                row_type,
            })
        }
        other => Err(Error::unsupported(format!("FROM source: {other}"))),
    }
}
