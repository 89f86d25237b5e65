//! Translation context: the single owned value threaded through DDL and
//! query compilation — fresh-name generators, the scope stack, the
//! type-def/relation registry, and the program accumulator.
//!
//! Grounded on the teacher's `semantic::Context`/`semantic::module::Module`
//! (a single struct holding name counters, declarations and a lookup
//! table), generalized to the flatter registry this IR needs — there is
//! no nested-module namespacing here, just type-defs and relations by
//! name.

use std::collections::HashSet;

use crate::error::{Error, Reason, Result};
use crate::ir::{Declaration, Expr, Program, Relation, Type, TypeDef};

/// One entry of the scope stack: a row variable and the type-def name of
/// its row. Entered when a `FROM` clause introduces a source relation or
/// subquery, and stays live for that query body's compilation.
#[derive(Debug, Clone)]
struct ScopeEntry {
    var: String,
    row_type: String,
    /// The user-facing name this scope is addressable by in a qualified
    /// column reference (`qualifier.column`) — the table name or its
    /// `AS` alias. Defaults to `var` when no qualifier is meaningful.
    qualifier: String,
}

pub struct TranslationContext {
    program: Program,
    type_def_names: HashSet<String>,
    relation_names: HashSet<String>,
    global_counter: usize,
    local_counter: usize,
    scopes: Vec<ScopeEntry>,
}

impl TranslationContext {
    pub fn new() -> Self {
        TranslationContext {
            program: Program::default(),
            type_def_names: HashSet::new(),
            relation_names: HashSet::new(),
            global_counter: 0,
            local_counter: 0,
            scopes: Vec::new(),
        }
    }

    pub fn into_program(self) -> Program {
        self.program
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Appends a type-def, relation, or rule to the emitted program.
    /// Type-defs and relations are checked against the fresh-name
    /// uniqueness invariant; rules are not named and always accepted.
    pub fn add_declaration(&mut self, decl: Declaration) -> Result<()> {
        match &decl {
            Declaration::TypeDef(t) => {
                if !self.type_def_names.insert(t.name.clone()) {
                    return Err(Error::invariant(format!(
                        "duplicate type-def name `{}`",
                        t.name
                    )));
                }
            }
            Declaration::Relation(r) => {
                if !self.relation_names.insert(r.name.clone()) {
                    return Err(Error::invariant(format!(
                        "duplicate relation name `{}`",
                        r.name
                    )));
                }
                if !self.type_def_names.contains(&r.row_type) {
                    return Err(Error::invariant(format!(
                        "relation `{}` references unregistered type-def `{}`",
                        r.name, r.row_type
                    )));
                }
            }
            Declaration::Rule(_) => {}
        }
        self.program.push(decl);
        Ok(())
    }

    pub fn lookup_relation(&self, name: &str) -> Result<&Relation> {
        self.program
            .relation(name)
            .ok_or_else(|| Error::unknown("relation", name))
    }

    /// Resolves a `FROM`-clause table reference to its relation: first as
    /// an `Input` relation under the compiler's `R`-prefixed name (a real
    /// table), then as the literal name (a previously-declared view's
    /// `Output` relation, which carries no prefix — spec §4.2).
    pub fn resolve_source_relation(&self, table_name: &str) -> Result<&Relation> {
        let prefixed = crate::naming::table_relation_name(table_name);
        if let Some(relation) = self.program.relation(&prefixed) {
            return Ok(relation);
        }
        if let Some(relation) = self.program.relation(table_name) {
            return Ok(relation);
        }
        Err(Error::unknown("table", table_name))
    }

    pub fn lookup_type_def(&self, name: &str) -> Result<&TypeDef> {
        self.program
            .type_def(name)
            .ok_or_else(|| Error::unknown("type-def", name))
    }

    /// A fresh name in the global namespace (emitted relation/type
    /// names), e.g. `fresh_global_name("tmp")` -> `"tmp0"`, `"tmp1"`, ...
    pub fn fresh_global_name(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}{}", self.global_counter);
        self.global_counter += 1;
        name
    }

    /// A fresh name in the per-query local namespace (row variables,
    /// synthetic column names). A single monotonic counter is shared
    /// across all local prefixes so `v0`, `col1`, `v2` are all distinct
    /// regardless of which prefix is requested in what order.
    pub fn fresh_local_name(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}{}", self.local_counter);
        self.local_counter += 1;
        name
    }

    /// Resets the local namespace. Called once per top-level query
    /// compilation (i.e. once per `CREATE VIEW`), since the local space
    /// is scoped to a single query per spec §3.
    pub fn reset_local_namespace(&mut self) {
        self.local_counter = 0;
        self.scopes.clear();
    }

    pub fn enter_scope(&mut self, var: impl Into<String>, row_type: impl Into<String>) {
        let var = var.into();
        self.scopes.push(ScopeEntry {
            qualifier: var.clone(),
            var,
            row_type: row_type.into(),
        });
    }

    /// Like [`Self::enter_scope`], but addressable by `qualifier` in a
    /// qualified column reference rather than by the internal row
    /// variable — used for a named `FROM` source, which clients refer to
    /// by table name or alias, never by the row variable the compiler
    /// allocated for it.
    pub fn enter_scope_as(
        &mut self,
        var: impl Into<String>,
        row_type: impl Into<String>,
        qualifier: impl Into<String>,
    ) {
        self.scopes.push(ScopeEntry {
            var: var.into(),
            row_type: row_type.into(),
            qualifier: qualifier.into(),
        });
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Resolves an unqualified column reference against the innermost
    /// scope whose row type has a field of that name.
    pub fn resolve_column(&self, column: &str) -> Result<(Expr, Type)> {
        for scope in self.scopes.iter().rev() {
            let type_def = self.lookup_type_def(&scope.row_type)?;
            if let Some(field) = type_def.ty.field(column) {
                let expr = Expr::var(scope.var.clone()).field(column.to_string());
                return Ok((expr, field.ty.clone()));
            }
        }
        Err(Error::unknown("column", column))
    }

    /// Resolves a `table.column`-qualified reference against the scope
    /// introduced for `table` (or its alias).
    pub fn resolve_qualified_column(&self, qualifier: &str, column: &str) -> Result<(Expr, Type)> {
        let scope = self
            .scopes
            .iter()
            .rev()
            .find(|s| s.qualifier.eq_ignore_ascii_case(qualifier))
            .ok_or_else(|| Error::unknown("table reference", qualifier))?;
        let type_def = self.lookup_type_def(&scope.row_type)?;
        let field = type_def
            .ty
            .field(column)
            .ok_or_else(|| Error::unknown("column", format!("{qualifier}.{column}")))?;
        Ok((
            Expr::var(scope.var.clone()).field(column.to_string()),
            field.ty.clone(),
        ))
    }

    /// Returns the row type name of the innermost scope, if any — used
    /// when an unqualified `*` needs to resolve against "the" current
    /// source relation.
    pub fn innermost_row_type(&self) -> Option<&str> {
        self.scopes.last().map(|s| s.row_type.as_str())
    }
}

impl Default for TranslationContext {
    fn default() -> Self {
        Self::new()
    }
}
