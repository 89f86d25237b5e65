//! A relational-database facade over a deductive engine: compiles SQL
//! `CREATE TABLE`/`CREATE VIEW` statements into a relational IR, then
//! dispatches a restricted `INSERT`/`DELETE`/`SELECT` subset against an
//! [`Engine`] implementation, maintaining per-table materialized views
//! from the engine's post-commit change stream.
//!
//! ```text
//! DDL strings ──▶ TranslationContext ──▶ Program (IR)  ─┐
//!                         │                              ├─▶ Dispatcher ──▶ Engine
//!                         ▼                              │
//!                      Catalog  ────────────────────────┘
//! ```

pub mod catalog;
pub mod codec;
pub mod context;
pub mod ddl;
pub mod dialects;
pub mod dml;
pub mod engine;
pub mod error;
pub mod ir;
pub mod naming;
pub mod query;
pub mod views;

pub use catalog::Catalog;
pub use context::TranslationContext;
pub use dml::{Dispatcher, StatementResult};
pub use engine::{Command, CommandKind, Engine, RelationId};
pub use error::{Error, Reason, Result};
pub use ir::Program;

/// Parses and compiles an ordered list of `CREATE TABLE`/`CREATE VIEW`
/// statements into the relational IR, without wiring up an engine. Most
/// callers want [`Dispatcher::new`] instead; this is exposed for tools
/// that only need the compiled IR (e.g. a schema inspector).
pub fn compile(ddl: &[String]) -> Result<Program> {
    let mut ctx = TranslationContext::new();
    ddl::translate_all(&mut ctx, ddl)?;
    Ok(ctx.into_program())
}

/// Initializes `env_logger` exactly once, even across many tests in the
/// same binary. Safe to call from every test that wants log output on
/// failure.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    static INIT: once_cell::sync::OnceCell<()> = once_cell::sync::OnceCell::new();
    INIT.get_or_init(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
