//! Relational IR
//!
//! Strictly-typed, immutable nodes describing the compiled output of the
//! DDL translator: scalar/struct types, type-defs, relations, rules in a
//! row-variable calculus, and the expressions that build them.

mod expr;
mod program;
mod relation;
mod rule;
mod types;

pub use expr::{BinOp, Expr, Literal};
pub use program::{Declaration, Program};
pub use relation::{Relation, RelationRole};
pub use rule::{Atom, BodyFragment, Rule};
pub use types::{Field, StructType, Type, TypeDef};
