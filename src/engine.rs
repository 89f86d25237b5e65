//! The deductive engine as an external collaborator: a narrow trait
//! covering exactly the commands this facade issues (spec §6), so the
//! crate is testable against an in-memory double without a real engine
//! wired in.
//!
//! Grounded on the teacher's pattern of describing an external
//! collaborator (its target database connection) as a trait object
//! behind a thin adapter, rather than depending on a concrete client
//! directly.

use crate::codec::EngineValue;
use crate::error::Result;

/// Opaque relation identifier assigned by the engine.
pub type RelationId = u64;

/// A positional record: one [`EngineValue`] per field, in the row type's
/// declaration order.
pub type Record = Vec<EngineValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Insert,
    /// Delete matching this exact record value.
    DeleteVal,
    /// Delete by primary-key prefix; only ever sent to the engine, never
    /// observed in a commit's change stream.
    DeleteKey,
}

#[derive(Debug, Clone)]
pub struct Command {
    pub relation: RelationId,
    pub kind: CommandKind,
    pub record: Record,
}

impl Command {
    pub fn insert(relation: RelationId, record: Record) -> Self {
        Command {
            relation,
            kind: CommandKind::Insert,
            record,
        }
    }

    pub fn delete_key(relation: RelationId, record: Record) -> Self {
        Command {
            relation,
            kind: CommandKind::DeleteKey,
            record,
        }
    }
}

/// The subset of the engine's command interface this facade depends on.
///
/// A batch is: `transaction_start`, zero or more `apply_updates` calls,
/// then exactly one of `transaction_commit_dump_changes` (success) or
/// `transaction_rollback` (any statement in the batch failed).
pub trait Engine {
    fn get_table_id(&self, relation_name: &str) -> Result<RelationId>;
    fn get_table_name(&self, relation_id: RelationId) -> Result<String>;

    fn transaction_start(&mut self) -> Result<()>;
    fn apply_updates(&mut self, commands: &[Command]) -> Result<()>;

    /// Commits the open transaction and reports every changed record via
    /// `on_change`, in the order the engine produced them.
    fn transaction_commit_dump_changes(
        &mut self,
        on_change: &mut dyn FnMut(Command) -> Result<()>,
    ) -> Result<()>;

    fn transaction_rollback(&mut self) -> Result<()>;
}
