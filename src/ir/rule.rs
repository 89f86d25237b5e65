//! Rules: `head :- body₁, body₂, …`.

use serde::{Deserialize, Serialize};

use super::expr::Expr;

/// A `(relation-name, row-expression)` pair appearing as a head or a
/// positive body literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub relation: String,
    pub row: Expr,
}

impl Atom {
    pub fn new(relation: impl Into<String>, row: Expr) -> Self {
        Atom {
            relation: relation.into(),
            row,
        }
    }
}

/// Body fragments are either positive literal atoms or condition
/// expressions (filters and assignment-bindings). Negated literals are
/// not part of this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyFragment {
    Literal(Atom),
    Condition(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub head: Atom,
    pub body: Vec<BodyFragment>,
}
