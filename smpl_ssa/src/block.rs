//! The hierarchical block graph
//!
//! Basic blocks (plain, branching, joining) hold instructions, a value table
//! and the CSE bookkeeping; super blocks group a region (if/while/function
//! body) with one entry and one exit. All edges are arena handles.

use crate::{Opcode, Operand, ValueId};
use hashbrown::{HashMap, HashSet};
use smpl_common::IdentId;

/// Handle of a block in the `Ir` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// Per-block mapping from identifier to its current SSA definition
///
/// `set` stamps the identifier onto the stored operand, leaving the defining
/// value untouched — rebinding a scalar to another scalar's value must not
/// mutate the original instruction's identifier.
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    table: HashMap<IdentId, Operand>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, ident: IdentId, operand: Operand) {
        self.table.insert(ident, Operand::with_ident(operand.value, ident));
    }

    pub fn get(&self, ident: IdentId) -> Option<Operand> {
        self.table.get(&ident).copied()
    }

    pub fn has(&self, ident: IdentId) -> bool {
        self.table.contains_key(&ident)
    }

    /// Identifiers bound in this table, sorted for deterministic iteration
    pub fn ids(&self) -> Vec<IdentId> {
        let mut ids: Vec<IdentId> = self.table.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Kind-specific data of a basic block
#[derive(Debug)]
pub enum BasicKind {
    Plain,
    Branch {
        /// The non-fall-through successor (else arm, loop body)
        branch_block: Option<BlockId>,
    },
    Join {
        /// The incoming arm that is not the structural predecessor
        joining_block: Option<BlockId>,
        /// φ instructions, placed before the regular instructions
        phi_insts: Vec<ValueId>,
    },
}

/// A straight-line sequence of instructions entered only at the top
#[derive(Debug)]
pub struct BasicBlock {
    pub id: BlockId,
    /// Dense numbering of basic blocks only, used for display ("BB3")
    pub bbid: u32,
    pub kind: BasicKind,
    pub insts: Vec<ValueId>,
    pub value_table: ValueTable,
    /// Head of the per-opcode CSE list of this block
    pub cs_table: HashMap<Opcode, ValueId>,
    /// Explicit predecessor for CSE lookup when the natural previous block is
    /// not the dominator (a join skipping the arms of its if)
    pub last_cs_block: Option<BlockId>,
    /// Stores from conditional arms that must invalidate matching loads in
    /// subsequent blocks
    pub kill_stores: HashSet<ValueId>,
    /// Structural predecessor; `prev == id` marks the first block of a function
    pub prev: Option<BlockId>,
    /// Structural successor; `next == id` marks the last block of a function
    pub next: Option<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId, bbid: u32, kind: BasicKind) -> Self {
        Self {
            id,
            bbid,
            kind,
            insts: Vec::new(),
            value_table: ValueTable::new(),
            cs_table: HashMap::new(),
            last_cs_block: None,
            kill_stores: HashSet::new(),
            prev: None,
            next: None,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.kind, BasicKind::Plain)
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, BasicKind::Branch { .. })
    }

    pub fn is_join(&self) -> bool {
        matches!(self.kind, BasicKind::Join { .. })
    }

    pub fn branch_block(&self) -> Option<BlockId> {
        match self.kind {
            BasicKind::Branch { branch_block } => branch_block,
            _ => None,
        }
    }

    pub fn joining_block(&self) -> Option<BlockId> {
        match self.kind {
            BasicKind::Join { joining_block, .. } => joining_block,
            _ => None,
        }
    }

    pub fn phi_insts(&self) -> &[ValueId] {
        match &self.kind {
            BasicKind::Join { phi_insts, .. } => phi_insts,
            _ => &[],
        }
    }

    /// φ instructions followed by the regular instructions
    pub fn all_insts(&self) -> Vec<ValueId> {
        let mut all = self.phi_insts().to_vec();
        all.extend_from_slice(&self.insts);
        all
    }
}

/// A region with one entry and one exit, containing nested blocks
#[derive(Debug)]
pub struct SuperBlock {
    pub id: BlockId,
    /// Human-readable description, e.g. "while statement"
    pub name: String,
    pub head: Option<BlockId>,
    pub tail: Option<BlockId>,
    pub prev: Option<BlockId>,
    pub next: Option<BlockId>,
}

impl SuperBlock {
    pub(crate) fn new(id: BlockId, name: String) -> Self {
        Self { id, name, head: None, tail: None, prev: None, next: None }
    }
}

/// A block in the arena: either a basic block or a super block
#[derive(Debug)]
pub enum Block {
    Basic(BasicBlock),
    Super(SuperBlock),
}

impl Block {
    pub fn id(&self) -> BlockId {
        match self {
            Block::Basic(bb) => bb.id,
            Block::Super(sb) => sb.id,
        }
    }

    pub fn prev(&self) -> Option<BlockId> {
        match self {
            Block::Basic(bb) => bb.prev,
            Block::Super(sb) => sb.prev,
        }
    }

    pub fn next(&self) -> Option<BlockId> {
        match self {
            Block::Basic(bb) => bb.next,
            Block::Super(sb) => sb.next,
        }
    }

    pub fn as_basic(&self) -> Option<&BasicBlock> {
        match self {
            Block::Basic(bb) => Some(bb),
            Block::Super(_) => None,
        }
    }

    pub fn as_super(&self) -> Option<&SuperBlock> {
        match self {
            Block::Basic(_) => None,
            Block::Super(sb) => Some(sb),
        }
    }
}
