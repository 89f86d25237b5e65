//! The emitted program: an ordered accumulation of type-defs, relations
//! and rules.

use serde::{Deserialize, Serialize};

use super::relation::Relation;
use super::rule::Rule;
use super::types::TypeDef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Declaration {
    TypeDef(TypeDef),
    Relation(Relation),
    Rule(Rule),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub type_defs: Vec<TypeDef>,
    pub relations: Vec<Relation>,
    pub rules: Vec<Rule>,
}

impl Program {
    pub fn push(&mut self, decl: Declaration) {
        match decl {
            Declaration::TypeDef(t) => self.type_defs.push(t),
            Declaration::Relation(r) => self.relations.push(r),
            Declaration::Rule(r) => self.rules.push(r),
        }
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.type_defs.iter().find(|t| t.name == name)
    }
}
