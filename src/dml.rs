//! DML dispatcher: parses and executes the restricted `INSERT`/`DELETE`/
//! `SELECT` grammar (spec §4.4) against the engine, framing each batch
//! as a transaction and maintaining the materialized views from the
//! post-commit change stream (spec §4.5).

use std::collections::HashMap;

use itertools::Itertools;
use sqlparser::ast::{
    BinaryOperator, Expr as SqlExpr, Ident, ObjectName, SelectItem, SetExpr, Statement,
    TableFactor,
};
use sqlparser::parser::Parser;

use crate::catalog::{Catalog, ColumnMeta, TableMeta};
use crate::codec::{self, ClientValue};
use crate::dialects::DdlDialect;
use crate::dialects::DmlDialect;
use crate::engine::{Command, CommandKind, Engine, RelationId};
use crate::error::{Error, Result};
use crate::ir::{Program, RelationRole};
use crate::naming;
use crate::views::{ClientRecord, MaterializedViews};

/// The result of dispatching one DML statement: `SELECT` yields its
/// rows, `INSERT`/`DELETE` yield nothing.
pub enum StatementResult {
    Rows(Vec<ClientRecord>),
    Ack,
}

/// Owns the compiled program, the catalog, the materialized views and
/// the engine connection, and dispatches client DML batches against
/// them.
pub struct Dispatcher<E: Engine> {
    program: Program,
    catalog: Catalog,
    views: MaterializedViews,
    engine: E,
    relation_ids: HashMap<String, RelationId>,
}

impl<E: Engine> Dispatcher<E> {
    /// Compiles the given DDL statements and wires up `engine` —
    /// resolving every emitted relation's id up front and registering an
    /// (initially empty) materialized view for every catalog table.
    pub fn new(ddl: &[String], mut engine: E) -> Result<Self> {
        let mut ctx = crate::context::TranslationContext::new();
        crate::ddl::translate_all(&mut ctx, ddl)?;
        let program = ctx.into_program();
        let catalog = Catalog::build(ddl, &DdlDialect {})?;

        let views = MaterializedViews::new();
        for table_name in catalog.table_names() {
            views.register(table_name);
        }

        let mut relation_ids = HashMap::new();
        for relation in &program.relations {
            let id = engine.get_table_id(&relation.name)?;
            relation_ids.insert(relation.name.clone(), id);
        }

        Ok(Dispatcher {
            program,
            catalog,
            views,
            engine,
            relation_ids,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Executes a single DML statement, with its own positional bindings,
    /// as its own one-statement batch.
    pub fn execute(&mut self, sql: &str, bindings: &[ClientValue]) -> Result<StatementResult> {
        Ok(self
            .execute_batch(std::slice::from_ref(&(sql.to_string(), bindings.to_vec())))?
            .into_iter()
            .next()
            .unwrap())
    }

    /// Executes an ordered batch of `(sqlText, bindings)` pairs (spec §6's
    /// client boundary) as one transaction: every `INSERT`/`DELETE` is
    /// staged, then applied and committed together; if any statement fails
    /// to parse or validate, the transaction is rolled back and nothing is
    /// applied. Each statement's positional bindings are consumed strictly
    /// left-to-right across that whole statement, not reset per row.
    pub fn execute_batch(
        &mut self,
        statements: &[(String, Vec<ClientValue>)],
    ) -> Result<Vec<StatementResult>> {
        log::debug!("starting a {}-statement batch", statements.len());
        self.engine.transaction_start()?;

        match self.stage_batch(statements) {
            Ok((results, commands)) => {
                log::debug!("applying {} staged command(s)", commands.len());
                if let Err(e) = self.engine.apply_updates(&commands) {
                    log::warn!("rolling back batch: apply_updates failed: {e}");
                    self.engine.transaction_rollback()?;
                    return Err(e);
                }
                let mut ingest_err = None;
                self.engine
                    .transaction_commit_dump_changes(&mut |command| {
                        if let Err(e) = self.ingest_change(command) {
                            ingest_err = Some(e);
                        }
                        Ok(())
                    })?;
                if let Some(e) = ingest_err {
                    return Err(e);
                }
                Ok(results)
            }
            Err(e) => {
                log::warn!("rolling back batch: {e}");
                self.engine.transaction_rollback()?;
                Err(e)
            }
        }
    }

    fn stage_batch(
        &self,
        statements: &[(String, Vec<ClientValue>)],
    ) -> Result<(Vec<StatementResult>, Vec<Command>)> {
        let mut results = Vec::with_capacity(statements.len());
        let mut commands = Vec::new();
        for (stmt_text, bindings) in statements {
            let parsed = Parser::parse_sql(&DmlDialect {}, stmt_text)?;
            let statement = parsed
                .into_iter()
                .next()
                .ok_or_else(|| Error::unsupported("empty statement"))?;
            let mut bindings = Bindings::new(bindings);
            results.push(self.dispatch_statement(&statement, &mut bindings, &mut commands)?);
        }
        Ok((results, commands))
    }

    fn dispatch_statement(
        &self,
        statement: &Statement,
        bindings: &mut Bindings,
        commands: &mut Vec<Command>,
    ) -> Result<StatementResult> {
        match statement {
            Statement::Query(query) => Ok(StatementResult::Rows(self.dispatch_select(query)?)),
            Statement::Insert {
                table_name,
                columns,
                source,
                ..
            } => {
                self.dispatch_insert(table_name, columns, source, bindings, commands)?;
                Ok(StatementResult::Ack)
            }
            Statement::Delete {
                from, selection, ..
            } => {
                self.dispatch_delete(from, selection.as_ref(), bindings, commands)?;
                Ok(StatementResult::Ack)
            }
            other => Err(Error::unsupported(format!("DML statement: {other}"))),
        }
    }

    fn dispatch_select(&self, query: &sqlparser::ast::Query) -> Result<Vec<ClientRecord>> {
        if query.with.is_some() || query.order_by.as_ref().is_some_and(|o| !o.exprs.is_empty())
            || query.limit.is_some()
        {
            return Err(Error::unsupported("ORDER BY/LIMIT/WITH in client SELECT"));
        }
        let select = match query.body.as_ref() {
            SetExpr::Select(select) => select.as_ref(),
            _ => return Err(Error::unsupported("set operations in client SELECT")),
        };
        if !matches!(select.projection.as_slice(), [SelectItem::Wildcard(_)]) {
            return Err(Error::unsupported("client SELECT must be `SELECT * FROM ...`"));
        }
        if select.selection.is_some() {
            return Err(Error::unsupported("WHERE in client SELECT"));
        }
        if select.from.len() != 1 || !select.from[0].joins.is_empty() {
            return Err(Error::unsupported("joins in client SELECT"));
        }
        let table_name = match &select.from[0].relation {
            TableFactor::Table { name, .. } => object_name_tail(name)?,
            other => return Err(Error::unsupported(format!("FROM source: {other}"))),
        };
        self.catalog.require_table(&table_name)?;
        Ok(self.views.snapshot(&crate::catalog::canonical_table_name(&table_name)))
    }

    fn dispatch_insert(
        &self,
        table_name: &ObjectName,
        columns: &[Ident],
        source: &sqlparser::ast::Query,
        bindings: &mut Bindings,
        commands: &mut Vec<Command>,
    ) -> Result<()> {
        let table_name = object_name_tail(table_name)?;
        let table = self.catalog.require_table(&table_name)?;
        self.require_input_relation(&table_name)?;

        let rows = match source.body.as_ref() {
            SetExpr::Values(values) => &values.rows,
            _ => return Err(Error::unsupported("INSERT source must be VALUES")),
        };

        let relation_name = naming::table_relation_name(&table_name);
        let relation_id = self.relation_id(&relation_name)?;

        for row in rows {
            let ordered = order_insert_row(table, columns, row)?;
            let mut record = Vec::with_capacity(ordered.len());
            for (column, expr) in table.columns.iter().zip(ordered) {
                record.push(encode_row_element(column, expr, bindings)?);
            }
            commands.push(Command::insert(relation_id, record));
        }
        Ok(())
    }

    fn dispatch_delete(
        &self,
        from: &[sqlparser::ast::TableWithJoins],
        selection: Option<&SqlExpr>,
        bindings: &mut Bindings,
        commands: &mut Vec<Command>,
    ) -> Result<()> {
        if from.len() != 1 {
            return Err(Error::unsupported("DELETE over more than one table"));
        }
        let table_name = match &from[0].relation {
            TableFactor::Table { name, .. } => object_name_tail(name)?,
            other => return Err(Error::unsupported(format!("DELETE target: {other}"))),
        };
        let table = self.catalog.require_table(&table_name)?;
        self.require_input_relation(&table_name)?;

        let selection = selection
            .ok_or_else(|| Error::unsupported("DELETE requires a WHERE clause on the primary key"))?;
        let equalities = flatten_conjunction(selection)?;

        let mut by_column: HashMap<String, &SqlExpr> = HashMap::new();
        for (column, value) in equalities {
            if by_column.insert(column.to_uppercase(), value).is_some() {
                return Err(Error::arity_or_type(format!(
                    "column `{column}` constrained more than once in DELETE WHERE"
                )));
            }
        }

        if by_column.len() != table.primary_key.len() {
            return Err(Error::arity_or_type(
                "DELETE WHERE must constrain exactly the primary-key columns",
            ));
        }

        let mut key_record = Vec::with_capacity(table.primary_key.len());
        for pk_col in &table.primary_key {
            let expr = by_column
                .remove(&pk_col.to_uppercase())
                .ok_or_else(|| Error::arity_or_type(format!("missing primary-key column `{pk_col}` in DELETE WHERE")))?;
            let column = table
                .column(pk_col)
                .ok_or_else(|| Error::invariant(format!("primary key names unknown column `{pk_col}`")))?;
            key_record.push(encode_row_element(column, expr, bindings)?);
        }
        if !by_column.is_empty() {
            return Err(Error::arity_or_type(
                "DELETE WHERE constrains a column outside the primary key",
            ));
        }

        let relation_name = naming::table_relation_name(&table_name);
        let relation_id = self.relation_id(&relation_name)?;
        commands.push(Command::delete_key(relation_id, key_record));
        Ok(())
    }

    fn require_input_relation(&self, table_name: &str) -> Result<()> {
        let relation_name = naming::table_relation_name(table_name);
        match self.program.relation(&relation_name) {
            Some(r) if r.role == RelationRole::Input => Ok(()),
            _ => Err(Error::unsupported(format!(
                "`{table_name}` is not a mutable table"
            ))),
        }
    }

    fn relation_id(&self, relation_name: &str) -> Result<RelationId> {
        self.relation_ids
            .get(relation_name)
            .copied()
            .ok_or_else(|| Error::invariant(format!("no engine id cached for `{relation_name}`")))
    }

    fn ingest_change(&mut self, command: Command) -> Result<()> {
        let ir_name = self.engine.get_table_name(command.relation)?;
        let relation = self
            .program
            .relation(&ir_name)
            .ok_or_else(|| Error::invariant(format!("change stream named unknown relation `{ir_name}`")))?;
        let table_name = match relation.role {
            RelationRole::Input => naming::strip_prefix_to_table_name(&ir_name)
                .ok_or_else(|| Error::invariant(format!("malformed input relation name `{ir_name}`")))?,
            RelationRole::Output => ir_name.to_uppercase(),
            RelationRole::Internal => {
                return Err(Error::invariant("change stream reported an internal relation"))
            }
        };

        let client_record: ClientRecord = command
            .record
            .into_iter()
            .map(|v| v.into_client_value())
            .collect();

        match command.kind {
            CommandKind::Insert => self.views.insert(&table_name, client_record),
            CommandKind::DeleteVal => self.views.remove(&table_name, &client_record),
            CommandKind::DeleteKey => {
                return Err(Error::invariant(
                    "engine reported a DeleteKey command in its commit change stream",
                ))
            }
        }
        Ok(())
    }
}

/// A cursor over one statement's positional bindings, consumed strictly
/// left-to-right across the whole statement (spec §4.4's supplement):
/// `INSERT INTO t VALUES (?, ?), (?, ?)` draws from the same cursor across
/// all rows rather than resetting it per row.
struct Bindings<'a> {
    values: &'a [ClientValue],
    next: usize,
}

impl<'a> Bindings<'a> {
    fn new(values: &'a [ClientValue]) -> Self {
        Bindings { values, next: 0 }
    }

    fn next(&mut self) -> Result<&'a ClientValue> {
        let value = self
            .values
            .get(self.next)
            .ok_or_else(|| Error::arity_or_type("not enough bindings for the placeholders in this statement"))?;
        self.next += 1;
        Ok(value)
    }
}

/// Encodes one `VALUES`/`WHERE` row element: a `?` placeholder draws the
/// next positional binding, anything else is parsed as a literal token.
fn encode_row_element(column: &ColumnMeta, expr: &SqlExpr, bindings: &mut Bindings) -> Result<crate::codec::EngineValue> {
    match expr {
        SqlExpr::Value(sqlparser::ast::Value::Placeholder(_)) => {
            codec::encode_client_value(column, bindings.next()?)
        }
        _ => codec::encode_literal(column, expr),
    }
}

fn object_name_tail(name: &ObjectName) -> Result<String> {
    name.0
        .last()
        .map(|i| i.value.clone())
        .ok_or_else(|| Error::unsupported("empty table name"))
}

/// Reorders an `INSERT` row's expressions to the table's declared
/// column order. An empty `columns` list means the row already follows
/// that order.
fn order_insert_row<'a>(
    table: &TableMeta,
    columns: &[Ident],
    row: &'a [SqlExpr],
) -> Result<Vec<&'a SqlExpr>> {
    if columns.is_empty() {
        if row.len() != table.columns.len() {
            return Err(Error::arity_or_type(format!(
                "expected {} values, got {}",
                table.columns.len(),
                row.len()
            )));
        }
        return Ok(row.iter().collect());
    }

    if columns.len() != row.len() || columns.len() != table.columns.len() {
        return Err(Error::arity_or_type(format!(
            "INSERT column list arity mismatch: expected columns [{}]",
            table.columns.iter().map(|c| c.name.as_str()).join(", ")
        )));
    }

    let mut by_name: HashMap<String, &SqlExpr> = HashMap::new();
    for (ident, expr) in columns.iter().zip(row) {
        if by_name.insert(ident.value.to_uppercase(), expr).is_some() {
            return Err(Error::arity_or_type(format!(
                "column `{}` listed more than once in INSERT",
                ident.value
            )));
        }
    }

    table
        .columns
        .iter()
        .map(|col| {
            by_name
                .remove(&col.name.to_uppercase())
                .ok_or_else(|| Error::arity_or_type(format!("INSERT is missing column `{}`", col.name)))
        })
        .collect()
}

/// Splits a top-level `AND`-chain into its `column = value` conjuncts.
/// Either side of `=` may be the column identifier (spec §4.4).
fn flatten_conjunction(expr: &SqlExpr) -> Result<Vec<(&str, &SqlExpr)>> {
    match expr {
        SqlExpr::BinaryOp { left, op: BinaryOperator::And, right } => {
            let mut out = flatten_conjunction(left)?;
            out.extend(flatten_conjunction(right)?);
            Ok(out)
        }
        SqlExpr::BinaryOp { left, op: BinaryOperator::Eq, right } => {
            match (left.as_ref(), right.as_ref()) {
                (SqlExpr::Identifier(ident), _) => Ok(vec![(ident.value.as_str(), right.as_ref())]),
                (_, SqlExpr::Identifier(ident)) => Ok(vec![(ident.value.as_str(), left.as_ref())]),
                _ => Err(Error::unsupported(format!(
                    "DELETE predicate `{left} = {right}` has no column identifier on either side"
                ))),
            }
        }
        other => Err(Error::unsupported(format!(
            "DELETE WHERE must be an AND of `column = value`: {other}"
        ))),
    }
}
