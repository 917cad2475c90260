//! Instruction opcodes and their classification sets

use serde::{Deserialize, Serialize};
use smpl_common::RelOp;
use std::fmt;

/// The closed set of IR operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // comparison
    Cmp,
    // address computation (base + offset for array elements)
    Adda,
    // memory
    Load,
    Store,
    // SSA merge
    Phi,
    // control
    End,
    Bra,
    Bne,
    Beq,
    Ble,
    Blt,
    Bge,
    Bgt,
    // I/O
    Read,
    Write,
    Writenl,
    // function
    Call,
    Arg,
    Ret,
    // pseudo
    Nop,
    Empty,
}

impl Opcode {
    /// `ADD` and `MUL` match with swapped operands during CSE
    pub fn is_commutative(&self) -> bool {
        matches!(self, Opcode::Add | Opcode::Mul)
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Opcode::Read | Opcode::Write | Opcode::Writenl)
    }

    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Opcode::Bra
                | Opcode::Bne
                | Opcode::Beq
                | Opcode::Ble
                | Opcode::Blt
                | Opcode::Bge
                | Opcode::Bgt
        )
    }

    pub fn is_mem(&self) -> bool {
        matches!(self, Opcode::Load | Opcode::Store)
    }

    pub fn is_func(&self) -> bool {
        matches!(self, Opcode::Call | Opcode::Arg | Opcode::Ret)
    }

    /// Instructions with side effects or control meaning are kept out of the
    /// per-block CSE lists entirely
    pub fn skips_cse(&self) -> bool {
        self.is_io()
            || self.is_branch()
            || self.is_func()
            || matches!(self, Opcode::Phi | Opcode::Nop | Opcode::Empty | Opcode::End)
    }

    /// The per-opcode list key: stores are chained with loads so a later load
    /// can detect a killing store
    pub fn cse_key(&self) -> Opcode {
        if *self == Opcode::Store {
            Opcode::Load
        } else {
            *self
        }
    }

    /// Conditional branch taken when the relation holds
    pub fn from_relop(relop: RelOp) -> Opcode {
        match relop {
            RelOp::Eq => Opcode::Beq,
            RelOp::Ne => Opcode::Bne,
            RelOp::Lt => Opcode::Blt,
            RelOp::Ge => Opcode::Bge,
            RelOp::Le => Opcode::Ble,
            RelOp::Gt => Opcode::Bgt,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Cmp => "cmp",
            Opcode::Adda => "adda",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Phi => "phi",
            Opcode::End => "end",
            Opcode::Bra => "bra",
            Opcode::Bne => "bne",
            Opcode::Beq => "beq",
            Opcode::Ble => "ble",
            Opcode::Blt => "blt",
            Opcode::Bge => "bge",
            Opcode::Bgt => "bgt",
            Opcode::Read => "read",
            Opcode::Write => "write",
            Opcode::Writenl => "writenl",
            Opcode::Call => "call",
            Opcode::Arg => "arg",
            Opcode::Ret => "ret",
            Opcode::Nop => "nop",
            Opcode::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relop_mapping() {
        assert_eq!(Opcode::from_relop(RelOp::Eq), Opcode::Beq);
        assert_eq!(Opcode::from_relop(RelOp::Ne), Opcode::Bne);
        assert_eq!(Opcode::from_relop(RelOp::Lt), Opcode::Blt);
        assert_eq!(Opcode::from_relop(RelOp::Ge), Opcode::Bge);
        assert_eq!(Opcode::from_relop(RelOp::Le), Opcode::Ble);
        assert_eq!(Opcode::from_relop(RelOp::Gt), Opcode::Bgt);
    }

    #[test]
    fn classification_sets() {
        assert!(Opcode::Add.is_commutative());
        assert!(Opcode::Mul.is_commutative());
        assert!(!Opcode::Sub.is_commutative());
        assert!(!Opcode::Div.is_commutative());

        assert!(Opcode::Read.is_io() && Opcode::Write.is_io() && Opcode::Writenl.is_io());
        assert!(Opcode::Bra.is_branch() && Opcode::Bgt.is_branch());
        assert!(Opcode::Load.is_mem() && Opcode::Store.is_mem());
        assert!(Opcode::Call.is_func() && Opcode::Arg.is_func() && Opcode::Ret.is_func());

        assert!(!Opcode::Load.skips_cse());
        assert!(!Opcode::Store.skips_cse());
        assert!(Opcode::Phi.skips_cse());
        assert!(Opcode::Write.skips_cse());
        assert_eq!(Opcode::Store.cse_key(), Opcode::Load);
        assert_eq!(Opcode::Add.cse_key(), Opcode::Add);
    }
}
