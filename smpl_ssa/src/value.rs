//! The IR value universe
//!
//! Every SSA entity (constant, frame pointer, instruction, call, lazy branch
//! target) is a `Value` in the arena, identified by a dense `ValueId`.
//! Equality of IR values is equality of (CSE-effective) ids.

use crate::{BlockId, Opcode};
use smpl_common::IdentId;
use std::cell::Cell;
use std::fmt;

/// Handle of a value in the `Ir` arena, dense from 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A use of a value.
///
/// Rebinding a scalar stores a *clone* of the defining value in the block's
/// value table, with the identifier stamped on the clone; operands then
/// reference that clone. `Operand` is that clone: the underlying value id
/// plus the identifier the use was obtained under. The stamp is what lets
/// loop φ-insertion rewrite exactly the uses of one version of a named
/// scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub value: ValueId,
    pub ident: Option<IdentId>,
}

impl Operand {
    pub fn new(value: ValueId) -> Self {
        Self { value, ident: None }
    }

    pub fn with_ident(value: ValueId, ident: IdentId) -> Self {
        Self { value, ident: Some(ident) }
    }
}

/// A computed instruction
#[derive(Debug)]
pub struct Inst {
    pub op: Opcode,
    pub x: Option<Operand>,
    pub y: Option<Operand>,
    /// Identifier this instruction defines or touches: the bound scalar for a
    /// φ, the named array for a load/store
    pub ident: Option<IdentId>,
    /// Previous instruction with the same CSE key, forming the per-opcode
    /// linked list the CSE search walks
    pub op_last: Option<ValueId>,
    /// Owning basic block
    pub bb: BlockId,
    /// Memoized CSE result; cleared once at the end of construction
    pub(crate) cs: Cell<Option<Option<ValueId>>>,
}

impl Inst {
    pub(crate) fn new(op: Opcode, x: Option<Operand>, y: Option<Operand>, ident: Option<IdentId>, bb: BlockId) -> Self {
        Self { op, x, y, ident, op_last: None, bb, cs: Cell::new(None) }
    }
}

/// A call of a user-defined function; never a common subexpression, never a
/// kill target
#[derive(Debug)]
pub struct CallInst {
    pub name: String,
    pub args: Vec<Operand>,
    pub bb: BlockId,
}

/// What a lazy branch target points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    /// First instruction of the block (a NOP is inserted if it is empty)
    FirstOf(BlockId),
    /// First instruction of whatever block structurally follows this one;
    /// the `next` edge need only be set by the time the target is resolved
    FirstOfNext(BlockId),
}

/// A deferred reference to the first instruction of a block, used as branch
/// target before the target block is populated
#[derive(Debug)]
pub struct MetaRef {
    pub kind: MetaKind,
    pub(crate) target: Cell<Option<ValueId>>,
}

impl MetaRef {
    pub(crate) fn new(kind: MetaKind) -> Self {
        Self { kind, target: Cell::new(None) }
    }

    /// The resolved target, if resolution has happened
    pub fn target(&self) -> Option<ValueId> {
        self.target.get()
    }
}

/// A value in the arena
#[derive(Debug)]
pub enum Value {
    Const(i32),
    FramePointer { offset: i32 },
    Inst(Inst),
    Call(CallInst),
    Meta(MetaRef),
}

impl Value {
    pub fn as_inst(&self) -> Option<&Inst> {
        match self {
            Value::Inst(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallInst> {
        match self {
            Value::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_const(&self) -> Option<i32> {
        match self {
            Value::Const(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_frame_pointer(&self) -> bool {
        matches!(self, Value::FramePointer { .. })
    }
}
