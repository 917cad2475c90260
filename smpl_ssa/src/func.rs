//! Per-function compilation context

use crate::{BlockId, ValueId, VarType};
use hashbrown::HashMap;
use smpl_common::IdentId;

/// Handle of a function context in the `Ir` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

/// One function under construction: its block skeleton, frame pointer,
/// constant pool and declared variables
#[derive(Debug)]
pub struct Func {
    pub name: String,
    pub is_void: bool,
    pub params: Vec<IdentId>,
    /// Outermost super block, from the constant block to the end block
    pub super_block: BlockId,
    /// Holds the frame pointer, pooled constants, ARG bindings and array
    /// base addresses; first block of the function (`prev` sentinel)
    pub const_block: BlockId,
    /// Super block the statement sequence builds into
    pub body_block: BlockId,
    /// Last block of the function (`next` sentinel)
    pub end_block: BlockId,
    pub frame_pointer: ValueId,
    /// Constant pool: one `Const` value per distinct number
    pub(crate) consts: Vec<(i32, ValueId)>,
    /// Declared variables of this scope and their types
    pub var_types: HashMap<IdentId, VarType>,
}

impl Func {
    pub fn lookup_const(&self, num: i32) -> Option<ValueId> {
        self.consts.iter().find(|(n, _)| *n == num).map(|(_, v)| *v)
    }

    pub fn var_type(&self, ident: IdentId) -> Option<&VarType> {
        self.var_types.get(&ident)
    }
}
