//! Row-variable calculus expressions.
//!
//! [`Expr::Var`] and [`Expr::VarDecl`] look interchangeable but are not:
//! only a `VarDecl` may appear as the left-hand side of an [`Expr::Assign`],
//! and the translation context refuses to emit a second one for the same
//! name — see the declaration-site/use-site note in the module docs of
//! `crate::context`.

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::types::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    /// Decimal text, kept un-evaluated so precision is never lost between
    /// the 64-bit and arbitrary-precision integer paths.
    Int(String),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, EnumAsInner, Serialize, Deserialize)]
pub enum Expr {
    /// Use-site reference to a row variable.
    Var(String),
    /// Declaration-site reference; only valid as the left side of an
    /// [`Expr::Assign`] and only once per variable.
    VarDecl(String),
    Literal(Literal),
    FieldAccess(Box<Expr>, String),
    /// Builds a value of the named struct type from ordered field
    /// assignments.
    StructCtor(String, Vec<(String, Expr)>),
    /// `var <lhs> = <rhs>` as a condition fragment; `lhs` must be a
    /// `VarDecl`.
    Assign(Box<Expr>, Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn var_decl(name: impl Into<String>) -> Self {
        Expr::VarDecl(name.into())
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        Expr::FieldAccess(Box::new(self), name.into())
    }

    pub fn assign(lhs: Expr, rhs: Expr) -> Self {
        debug_assert!(
            lhs.as_var_decl().is_some(),
            "Assign left side must be a declaration-site variable"
        );
        Expr::Assign(Box::new(lhs), Box::new(rhs))
    }

    pub fn bin_op(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinOp(op, Box::new(lhs), Box::new(rhs))
    }

    /// The static type of this expression, if it can be derived without a
    /// type-def registry (literals and compound expressions over them).
    /// Field accesses and struct constructors need the registry and are
    /// typed by the caller instead.
    pub fn literal_type(&self) -> Option<Type> {
        match self {
            Expr::Literal(Literal::Bool(_)) => Some(Type::Bool),
            Expr::Literal(Literal::Int(_)) => Some(Type::Signed(64)),
            Expr::Literal(Literal::Str(_)) => Some(Type::Str),
            Expr::BinOp(op, ..) if matches!(op, BinOp::And | BinOp::Or) => Some(Type::Bool),
            Expr::BinOp(..) => Some(Type::Bool),
            _ => None,
        }
    }
}
