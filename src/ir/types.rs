//! Scalar and struct types of the IR, and the type-def registry entries.

use serde::{Deserialize, Serialize};

/// A closed variant of the types a field or expression can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Bool,
    /// Signed integer of the given bit width (currently always 64 from DDL).
    Signed(u8),
    /// Arbitrary-precision integer (`bigint`).
    ArbitraryInt,
    Str,
    /// Reference to a previously-registered type-def, by name.
    Named(String),
    Struct(StructType),
    /// A column declared without `NOT NULL`; wraps the underlying scalar
    /// in the engine's `ddlog_std::Option` convention (spec §4.6).
    Nullable(Box<Type>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// An ordered list of fields; declaration order is the canonical tuple
/// order used by the engine codec.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructType {
    pub fields: Vec<Field>,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_duplicate_names(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        !self.fields.iter().all(|f| seen.insert(f.name.as_str()))
    }
}

/// Binds a unique type name to a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub ty: StructType,
}
