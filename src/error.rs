//! Error type for translation and DML dispatch failures.
//!
//! Mirrors the teacher's `Error`/`Reason` split (a typed `Reason` plus an
//! optional pointer back to the offending construct) without the
//! source-span machinery, which needs a lexer this crate doesn't have —
//! `sqlparser`'s AST is already past that stage.

use std::fmt;

/// One of the six error kinds spec'd for this compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Malformed SQL that `sqlparser` itself rejected.
    ParseError(String),
    /// Syntactically valid but outside the supported grammar subset.
    Unsupported(String),
    /// Reference to a non-declared table, column, or pk column.
    UnknownObject { kind: &'static str, name: String },
    /// Insert row shape, delete pk coverage, or an unknown SQL type in DDL.
    ArityOrType(String),
    /// Propagated verbatim from the engine.
    Engine(String),
    /// Unexpected change-command kind, duplicate emitted name, and other
    /// things that should be structurally impossible.
    Invariant(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::ParseError(s) => write!(f, "parse error: {s}"),
            Reason::Unsupported(s) => write!(f, "unsupported construct: {s}"),
            Reason::UnknownObject { kind, name } => write!(f, "unknown {kind}: {name}"),
            Reason::ArityOrType(s) => write!(f, "{s}"),
            Reason::Engine(s) => write!(f, "engine error: {s}"),
            Reason::Invariant(s) => write!(f, "invariant violation: {s}"),
        }
    }
}

/// A translation or dispatch failure, carrying a rendering of the
/// offending AST node when one is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub reason: Reason,
    pub node: Option<String>,
}

impl Error {
    pub fn new(reason: Reason) -> Self {
        Error { reason, node: None }
    }

    pub fn with_node(mut self, node: impl fmt::Display) -> Self {
        self.node = Some(node.to_string());
        self
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        Error::new(Reason::Unsupported(what.into()))
    }

    pub fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        Error::new(Reason::UnknownObject {
            kind,
            name: name.into(),
        })
    }

    pub fn arity_or_type(what: impl Into<String>) -> Self {
        Error::new(Reason::ArityOrType(what.into()))
    }

    pub fn invariant(what: impl Into<String>) -> Self {
        Error::new(Reason::Invariant(what.into()))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(node) = &self.node {
            write!(f, " (at {node})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<sqlparser::parser::ParserError> for Error {
    fn from(e: sqlparser::parser::ParserError) -> Self {
        Error::new(Reason::ParseError(e.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
