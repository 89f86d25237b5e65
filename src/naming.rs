//! The compiler naming convention (spec §6). These functions are part of
//! the wire contract with the engine and must stay exactly as specified:
//! other components (the catalog, the change-ingest callback) depend on
//! being able to invert them.

/// `T` → row type name `Ttable-lowercased`.
pub fn table_type_name(table: &str) -> String {
    format!("T{}", table.to_lowercase())
}

/// `T` → relation name `Rtable-lowercased`.
pub fn table_relation_name(table: &str) -> String {
    format!("R{}", table.to_lowercase())
}

/// Inverse of [`table_relation_name`] / [`table_type_name`]: strip the
/// one-character prefix and upper-case what remains, for client-facing
/// table names.
pub fn strip_prefix_to_table_name(prefixed: &str) -> Option<String> {
    let mut chars = prefixed.chars();
    chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_uppercase())
}

/// The fully-qualified nullable-wrapper tags (spec §6); part of the
/// external contract, not implementation-defined.
pub const NULLABLE_SOME_TAG: &str = "ddlog_std::Some";
pub const NULLABLE_NONE_TAG: &str = "ddlog_std::None";
