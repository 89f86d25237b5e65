//! The metadata catalog: an ordered, immutable mapping from user table
//! name to field layout, nullability and primary-key columns, built once
//! at initialization alongside (but independently of) the IR program —
//! see spec §2's "DDL list is parsed twice" data-flow note.

use indexmap::IndexMap;
use sqlparser::ast::{ColumnOption, DataType, Statement, TableConstraint};
use sqlparser::dialect::Dialect;
use sqlparser::parser::Parser;

use crate::error::{Error, Result};
use crate::ir::Type;

/// The four scalar SQL types this core understands; shared between DDL
/// column lowering (§4.2) and the value codec (§4.6), since both need to
/// agree on exactly the same mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SqlScalarType {
    Boolean,
    Integer,
    Bigint,
    Varchar,
}

impl SqlScalarType {
    pub fn ir_type(self) -> Type {
        match self {
            SqlScalarType::Boolean => Type::Bool,
            SqlScalarType::Integer => Type::Signed(64),
            SqlScalarType::Bigint => Type::ArbitraryInt,
            SqlScalarType::Varchar => Type::Str,
        }
    }
}

/// Lowers a `sqlparser` column type into the four scalar kinds this core
/// supports. Any other declared type is a fatal translation error.
pub fn lower_sql_type(data_type: &DataType) -> Result<SqlScalarType> {
    match data_type {
        DataType::Boolean => Ok(SqlScalarType::Boolean),
        DataType::Int(_) | DataType::Integer(_) => Ok(SqlScalarType::Integer),
        DataType::BigInt(_) => Ok(SqlScalarType::Bigint),
        DataType::Varchar(_) => Ok(SqlScalarType::Varchar),
        other => Err(Error::arity_or_type(format!(
            "unsupported column type in DDL: {other}"
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
    pub sql_type: SqlScalarType,
    pub nullable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TableMeta {
    pub columns: Vec<ColumnMeta>,
    pub primary_key: Vec<String>,
}

impl TableMeta {
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Canonicalizes a user-supplied table name to the catalog's key form:
/// upper-case, as spec §3 requires.
pub fn canonical_table_name(name: &str) -> String {
    name.to_uppercase()
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: IndexMap<String, TableMeta>,
}

impl Catalog {
    /// Builds the catalog from the same ordered DDL string list given to
    /// the DDL translator, independently re-parsing each statement.
    pub fn build(ddl: &[String], dialect: &dyn Dialect) -> Result<Catalog> {
        let mut catalog = Catalog::default();
        for stmt_text in ddl {
            let statements = Parser::parse_sql(dialect, stmt_text)?;
            for statement in statements {
                catalog.ingest_statement(&statement)?;
            }
        }
        Ok(catalog)
    }

    fn ingest_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::CreateTable {
                name,
                columns,
                constraints,
                ..
            } => {
                let table_name = canonical_table_name(
                    &name
                        .0
                        .last()
                        .ok_or_else(|| Error::unsupported("empty table name"))?
                        .value,
                );

                let mut meta = TableMeta::default();
                meta.primary_key = columns
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
                        meta.primary_key = columns.iter().map(|c| c.value.clone()).collect();
                    }
                }

                for col in columns {
                    let sql_type = lower_sql_type(&col.data_type)?;
                    let not_null = col
                        .options
                        .iter()
                        .any(|o| matches!(o.option, ColumnOption::NotNull))
                        || meta
                            .primary_key
                            .iter()
                            .any(|pk| pk.eq_ignore_ascii_case(&col.name.value));
                    meta.columns.push(ColumnMeta {
                        name: col.name.value.clone(),
                        sql_type,
                        nullable: !not_null,
                    });
                }

                self.tables.insert(table_name, meta);
            }
            Statement::CreateView { name, query, .. } => {
                let table_name = canonical_table_name(
                    &name
                        .0
                        .last()
                        .ok_or_else(|| Error::unsupported("empty view name"))?
                        .value,
                );
                let meta = self.view_fields(query)?;
                self.tables.insert(table_name, meta);
            }
            _ => {}
        }
        Ok(())
    }

    /// Derives a view's field list by re-running the same
    /// column-naming precedence rules the query translator uses
    /// (spec §4.3), but without emitting any IR — the catalog only
    /// needs names, types and nullability.
    fn view_fields(&self, query: &sqlparser::ast::Query) -> Result<TableMeta> {
        crate::query::catalog_support::derive_view_fields(self, query)
    }

    pub fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.get(&canonical_table_name(name))
    }

    pub fn require_table(&self, name: &str) -> Result<&TableMeta> {
        self.table(name)
            .ok_or_else(|| Error::unknown("table", canonical_table_name(name)))
    }

    /// Canonical (upper-case) names of every declared table and view, in
    /// declaration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }
}
