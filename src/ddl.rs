//! DDL translator: compiles `CREATE TABLE`/`CREATE VIEW` statements into
//! the IR accumulated on a [`TranslationContext`] (spec §4.2).
//!
//! Grounded on the teacher's top-level `resolve`/`lower` passes, which
//! walk a list of top-level statements and fold each into the shared
//! context in turn; generalized here to the two DDL statement kinds this
//! core supports.

use sqlparser::ast::{ColumnOption, Statement, TableConstraint};

use crate::context::TranslationContext;
use crate::error::{Error, Result};
use crate::ir::{Atom, BodyFragment, Declaration, Field, Relation, RelationRole, Rule, StructType, TypeDef};

/// Parses and translates an ordered list of DDL statement strings,
/// accumulating into `ctx` in order. A `CREATE TABLE` is translated into
/// a type-def and an `Input` relation; a `CREATE VIEW` compiles its query
/// body and emits an `Output` relation plus exactly one binding rule.
pub fn translate_all(ctx: &mut TranslationContext, ddl: &[String]) -> Result<()> {
    use crate::dialects::DdlDialect;
    use sqlparser::parser::Parser;

    for stmt_text in ddl {
        let statements = Parser::parse_sql(&DdlDialect {}, stmt_text)?;
        for statement in statements {
            translate_statement(ctx, &statement)?;
        }
    }
    Ok(())
}

fn translate_statement(ctx: &mut TranslationContext, statement: &Statement) -> Result<()> {
    match statement {
        Statement::CreateTable {
            name,
            columns,
            constraints,
            ..
        } => translate_create_table(ctx, name, columns, constraints),
        Statement::CreateView { name, query, .. } => translate_create_view(ctx, name, query),
        other => Err(Error::unsupported(format!("DDL statement: {other}"))),
    }
}

fn translate_create_table(
    ctx: &mut TranslationContext,
    name: &sqlparser::ast::ObjectName,
    columns: &[sqlparser::ast::ColumnDef],
    constraints: &[TableConstraint],
) -> Result<()> {
    let table_name = name
        .0
        .last()
        .ok_or_else(|| Error::unsupported("empty table name"))?
        .value
        .clone();

    let mut pk_columns: Vec<String> = columns
        .iter()
        .filter(|col| {
            col.options
                .iter()
                .any(|o| matches!(o.option, ColumnOption::Unique { is_primary: true }))
        })
        .map(|col| col.name.value.clone())
        .collect();
    for constraint in constraints {
        if let TableConstraint::Unique {
            columns,
            is_primary: true,
            ..
        } = constraint
        {
            pk_columns = columns.iter().map(|c| c.value.clone()).collect();
        }
    }
    if pk_columns.is_empty() {
        return Err(Error::arity_or_type(format!(
            "table `{table_name}` declares no primary key"
        )));
    }

    // A primary-key column is never nullable, whether or not it also
    // carries an explicit `NOT NULL`.
    let mut fields = Vec::with_capacity(columns.len());
    for col in columns {
        let sql_type = crate::catalog::lower_sql_type(&col.data_type)?;
        let not_null = col
            .options
            .iter()
            .any(|o| matches!(o.option, ColumnOption::NotNull))
            || pk_columns.iter().any(|pk| pk.eq_ignore_ascii_case(&col.name.value));

        let mut ty = sql_type.ir_type();
        if !not_null {
            ty = crate::codec::nullable_wrapper_type(ty);
        }
        fields.push(Field {
            name: col.name.value.clone(),
            ty,
        });
    }

    let type_name = crate::naming::table_type_name(&table_name);
    let relation_name = crate::naming::table_relation_name(&table_name);

    ctx.add_declaration(Declaration::TypeDef(TypeDef {
        name: type_name.clone(),
        ty: StructType { fields },
    }))?;
    ctx.add_declaration(Declaration::Relation(Relation {
        name: relation_name,
        role: RelationRole::Input,
        row_type: type_name,
    }))?;
    Ok(())
}

fn translate_create_view(
    ctx: &mut TranslationContext,
    name: &sqlparser::ast::ObjectName,
    query: &sqlparser::ast::Query,
) -> Result<()> {
    let view_name = name
        .0
        .last()
        .ok_or_else(|| Error::unsupported("empty view name"))?
        .value
        .clone();

    ctx.reset_local_namespace();
    let rhs = crate::query::compile_query(ctx, query)?;

    ctx.add_declaration(Declaration::Relation(Relation {
        name: view_name.clone(),
        role: RelationRole::Output,
        row_type: rhs.row_type,
    }))?;
    ctx.add_declaration(Declaration::Rule(Rule {
        head: Atom::new(view_name, rhs.row_ref()),
        body: rhs.body,
    }))?;
    Ok(())
}
