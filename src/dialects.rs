//! The two SQL dialects this facade speaks: a permissive one for DDL
//! (`CREATE TABLE`/`CREATE VIEW`) and a stricter one for client DML
//! (`INSERT`/`DELETE`/`SELECT`). Both delegate to `sqlparser`'s generic
//! tokenization rules; they are kept as distinct types — rather than one
//! dialect reused for both jobs — because the DDL and DML parse passes
//! are conceptually separate stages in this system (spec §1/§2), and a
//! distinct `Dialect` impl per stage keeps that boundary visible in the
//! type system instead of only in comments.

use sqlparser::dialect::Dialect;

/// Dialect used to parse `CREATE TABLE`/`CREATE VIEW` DDL strings.
#[derive(Debug, Default)]
pub struct DdlDialect {}

impl Dialect for DdlDialect {
    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_identifier_part(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
    }
}

/// Dialect used to parse client-submitted DML strings
/// (`INSERT`/`DELETE`/`SELECT`).
#[derive(Debug, Default)]
pub struct DmlDialect {}

impl Dialect for DmlDialect {
    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_identifier_part(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
    }
}
