//! Re-derives a `CREATE VIEW` query's field list for the catalog, using
//! the catalog's own table metadata instead of the IR — the catalog
//! build pass runs independently of (and does not share state with) the
//! IR query translator in [`super::select`], so this mirrors that
//! translator's naming precedence rather than calling into it.
//!
//! Simplification: an unaliased, non-column projection item (a literal
//! or computed expression) gets a synthetic `col_k` name numbered from a
//! counter private to this call. It is not guaranteed to match the
//! number the real translator assigns in [`super::select`] when several
//! such items appear in one view — the catalog only needs a stable,
//! collision-free name for such a column, not numeric parity, since
//! views built this way expose no primary key for DML to depend on.

use sqlparser::ast::{Expr as SqlExpr, Query, SelectItem, SetExpr, TableFactor, Value as SqlValue};

use crate::catalog::{Catalog, ColumnMeta, SqlScalarType, TableMeta};
use crate::error::{Error, Result};

pub fn derive_view_fields(catalog: &Catalog, query: &Query) -> Result<TableMeta> {
    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select.as_ref(),
        _ => return Err(Error::unsupported("set operations in CREATE VIEW")),
    };
    if select.from.len() != 1 || !select.from[0].joins.is_empty() {
        return Err(Error::unsupported("CREATE VIEW over more than one table"));
    }
    let table_name = match &select.from[0].relation {
        TableFactor::Table { name, .. } => name
            .0
            .last()
            .ok_or_else(|| Error::unsupported("empty table name"))?
            .value
            .clone(),
        other => return Err(Error::unsupported(format!("FROM source: {other}"))),
    };
    let source = catalog.require_table(&table_name)?;

    if let [SelectItem::Wildcard(_)] = select.projection.as_slice() {
        return Ok(source.clone());
    }

    let mut col_counter = 0usize;
    let mut columns = Vec::with_capacity(select.projection.len());
    for item in &select.projection {
        let (name, expr) = match item {
            SelectItem::UnnamedExpr(expr) => (derive_name(&mut col_counter, expr), expr),
            SelectItem::ExprWithAlias { expr, alias } => (alias.value.clone(), expr),
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                return Err(Error::unsupported("`*` mixed with other projection items"))
            }
        };
        let (sql_type, nullable) = infer_meta(source, expr)?;
        columns.push(ColumnMeta {
            name,
            sql_type,
            nullable,
        });
    }

    Ok(TableMeta {
        columns,
        primary_key: Vec::new(),
    })
}

fn derive_name(col_counter: &mut usize, expr: &SqlExpr) -> String {
    match expr {
        SqlExpr::Identifier(ident) => ident.value.clone(),
        SqlExpr::CompoundIdentifier(parts) => parts
            .last()
            .map(|p| p.value.clone())
            .unwrap_or_else(|| fresh_col(col_counter)),
        _ => fresh_col(col_counter),
    }
}

fn fresh_col(col_counter: &mut usize) -> String {
    let name = format!("col{col_counter}");
    *col_counter += 1;
    name
}

fn infer_meta(source: &TableMeta, expr: &SqlExpr) -> Result<(SqlScalarType, bool)> {
    match expr {
        SqlExpr::Nested(inner) => infer_meta(source, inner),
        SqlExpr::Identifier(ident) => {
            let col = source
                .column(&ident.value)
                .ok_or_else(|| Error::unknown("column", ident.value.clone()))?;
            Ok((col.sql_type, col.nullable))
        }
        SqlExpr::CompoundIdentifier(parts) => {
            let column = parts
                .last()
                .ok_or_else(|| Error::unsupported("empty qualified column reference"))?;
            let col = source
                .column(&column.value)
                .ok_or_else(|| Error::unknown("column", column.value.clone()))?;
            Ok((col.sql_type, col.nullable))
        }
        SqlExpr::Value(SqlValue::Boolean(_)) => Ok((SqlScalarType::Boolean, false)),
        SqlExpr::Value(SqlValue::Number(..)) => Ok((SqlScalarType::Integer, false)),
        SqlExpr::Value(SqlValue::SingleQuotedString(_)) => Ok((SqlScalarType::Varchar, false)),
        SqlExpr::BinaryOp { .. } => Ok((SqlScalarType::Boolean, false)),
        other => Err(Error::unsupported(format!("expression in view projection: {other}"))),
    }
}
