//! Shared vocabulary between the lexer, parser and SSA builder

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned identifier id, dense from 0 within one compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentId(pub u32);

impl fmt::Display for IdentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ident#{}", self.0)
    }
}

/// Relational operator of a `relation` production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Ge,
    Le,
    Gt,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Ge => ">=",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
        };
        write!(f, "{}", s)
    }
}
