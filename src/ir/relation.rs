//! Relations: named, typed sets of records the engine stores.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationRole {
    /// Externally mutable — the client may insert/delete into it.
    Input,
    /// Anonymous intermediate produced by query translation.
    Internal,
    /// Externally readable via the change stream.
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub role: RelationRole,
    /// Name of a previously-registered type-def; the relation's row type.
    pub row_type: String,
}
