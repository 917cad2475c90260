//! The IR arena and its construction/optimization operations
//!
//! One `Ir` owns every value and block of a compilation. Handles (`ValueId`,
//! `BlockId`) are dense indexes; identity of an SSA value is its id. The
//! common-subexpression search and the lazy branch targets memoize through
//! `Cell`s so queries stay `&self`; the single mutation point that resolution
//! needs (inserting a NOP into an empty block) runs in `finalize`.

use crate::{
    BasicBlock, BasicKind, Block, BlockId, CallInst, Func, FuncId, Inst, MetaKind, MetaRef,
    Opcode, Operand, SuperBlock, Value, ValueId,
};
use hashbrown::HashSet;
use log::debug;
use smpl_common::IdentId;

/// The IR under construction: value arena, block arena, function contexts
#[derive(Debug, Default)]
pub struct Ir {
    values: Vec<Value>,
    blocks: Vec<Block>,
    next_bbid: u32,
    funcs: Vec<Func>,
}

impl Ir {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- arena access ----

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The block as a basic block; panics on a super block (internal misuse)
    pub fn basic(&self, id: BlockId) -> &BasicBlock {
        match self.block(id) {
            Block::Basic(bb) => bb,
            Block::Super(_) => panic!("block {:?} is not a basic block", id),
        }
    }

    pub fn basic_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        match &mut self.blocks[id.0 as usize] {
            Block::Basic(bb) => bb,
            Block::Super(_) => panic!("block {:?} is not a basic block", id),
        }
    }

    pub fn super_block(&self, id: BlockId) -> &SuperBlock {
        match self.block(id) {
            Block::Super(sb) => sb,
            Block::Basic(_) => panic!("block {:?} is not a super block", id),
        }
    }

    fn super_block_mut(&mut self, id: BlockId) -> &mut SuperBlock {
        match &mut self.blocks[id.0 as usize] {
            Block::Super(sb) => sb,
            Block::Basic(_) => panic!("block {:?} is not a super block", id),
        }
    }

    pub fn funcs(&self) -> &[Func] {
        &self.funcs
    }

    pub fn func(&self, id: FuncId) -> &Func {
        &self.funcs[id.0 as usize]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut Func {
        &mut self.funcs[id.0 as usize]
    }

    // ---- allocation ----

    fn alloc_value(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(value);
        id
    }

    fn alloc_block(&mut self, kind: BasicKind) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        let bbid = self.next_bbid;
        self.next_bbid += 1;
        self.blocks.push(Block::Basic(BasicBlock::new(id, bbid, kind)));
        id
    }

    pub fn new_plain_block(&mut self) -> BlockId {
        self.alloc_block(BasicKind::Plain)
    }

    pub fn new_branch_block(&mut self) -> BlockId {
        self.alloc_block(BasicKind::Branch { branch_block: None })
    }

    pub fn new_join_block(&mut self) -> BlockId {
        self.alloc_block(BasicKind::Join { joining_block: None, phi_insts: Vec::new() })
    }

    pub fn new_super_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::Super(SuperBlock::new(id, name.into())));
        id
    }

    /// Create a function skeleton: constant block (holding the frame
    /// pointer), body super block and end block, wired with the sentinel
    /// encoding for first/last
    pub fn new_function(
        &mut self,
        name: impl Into<String>,
        is_void: bool,
        super_label: impl Into<String>,
        body_label: impl Into<String>,
    ) -> FuncId {
        let name = name.into();
        let const_block = self.new_plain_block();
        let end_block = self.new_plain_block();
        let body_block = self.new_super_block(body_label);
        let super_block = self.new_super_block(super_label);

        let frame_pointer = self.alloc_value(Value::FramePointer { offset: 0 });
        self.basic_mut(const_block).insts.push(frame_pointer);

        self.set_prev(const_block, const_block); // to itself, meaning the first
        self.set_next(const_block, body_block);
        self.set_prev(end_block, body_block);
        self.set_next(end_block, end_block); // to itself, meaning the last

        let sb = self.super_block_mut(super_block);
        sb.head = Some(const_block);
        sb.tail = Some(end_block);

        let id = FuncId(self.funcs.len() as u32);
        debug!("function context {:?} for {}", id, name);
        self.funcs.push(Func {
            name,
            is_void,
            params: Vec::new(),
            super_block,
            const_block,
            body_block,
            end_block,
            frame_pointer,
            consts: Vec::new(),
            var_types: hashbrown::HashMap::new(),
        });
        id
    }

    // ---- constants and the frame pointer ----

    /// Pooled per function: returns the existing `Const` for `num` if any,
    /// else creates one and appends it to the function's constant block
    pub fn add_const(&mut self, func: FuncId, num: i32) -> ValueId {
        if let Some(existing) = self.func(func).lookup_const(num) {
            return existing;
        }
        let id = self.alloc_value(Value::Const(num));
        let const_block = self.func(func).const_block;
        self.basic_mut(const_block).insts.push(id);
        self.func_mut(func).consts.push((num, id));
        id
    }

    pub fn frame_offset(&self, func: FuncId) -> i32 {
        match self.value(self.func(func).frame_pointer) {
            Value::FramePointer { offset } => *offset,
            _ => unreachable!("frame pointer handle points at a non-frame-pointer value"),
        }
    }

    /// Advance the function's stack offset; monotonically nondecreasing
    pub fn advance_frame(&mut self, func: FuncId, by: i32) {
        let fp = self.func(func).frame_pointer;
        match &mut self.values[fp.0 as usize] {
            Value::FramePointer { offset } => *offset += by,
            _ => unreachable!("frame pointer handle points at a non-frame-pointer value"),
        }
    }

    // ---- instruction emission ----

    /// Append an instruction to a basic block, maintaining the per-opcode
    /// CSE lists: the previous instruction with the same key (searched
    /// through the CSE predecessor chain) becomes `op_last`, and the new
    /// instruction is installed as the block's head for that key
    pub fn add_inst(
        &mut self,
        bb: BlockId,
        op: Opcode,
        x: Option<Operand>,
        y: Option<Operand>,
        ident: Option<IdentId>,
    ) -> ValueId {
        let mut inst = Inst::new(op, x, y, ident, bb);
        if !op.skips_cse() {
            let key = op.cse_key();
            inst.op_last = self.find_op_last(bb, key);
            let id = self.alloc_value(Value::Inst(inst));
            let block = self.basic_mut(bb);
            block.cs_table.insert(key, id);
            block.insts.push(id);
            id
        } else {
            let id = self.alloc_value(Value::Inst(inst));
            self.basic_mut(bb).insts.push(id);
            id
        }
    }

    fn find_op_last(&self, bb: BlockId, key: Opcode) -> Option<ValueId> {
        let mut block = Some(bb);
        while let Some(b) = block {
            if let Some(&head) = self.basic(b).cs_table.get(&key) {
                return Some(head);
            }
            block = self.prev_cs_block(b);
        }
        None
    }

    /// Append a φ instruction to a join block's φ list
    pub fn add_phi(&mut self, join: BlockId, x: Operand, y: Operand, ident: IdentId) -> ValueId {
        let inst = Inst::new(Opcode::Phi, Some(x), Some(y), Some(ident), join);
        let id = self.alloc_value(Value::Inst(inst));
        match &mut self.basic_mut(join).kind {
            BasicKind::Join { phi_insts, .. } => phi_insts.push(id),
            _ => panic!("φ inserted into a non-join block"),
        }
        id
    }

    pub fn add_nop(&mut self, bb: BlockId) -> ValueId {
        let inst = Inst::new(Opcode::Nop, None, None, None, bb);
        let id = self.alloc_value(Value::Inst(inst));
        self.basic_mut(bb).insts.push(id);
        id
    }

    /// Append a call instruction; calls stay out of all CSE bookkeeping
    pub fn add_call(&mut self, bb: BlockId, name: impl Into<String>, args: Vec<Operand>) -> ValueId {
        let id = self.alloc_value(Value::Call(CallInst { name: name.into(), args, bb }));
        self.basic_mut(bb).insts.push(id);
        id
    }

    /// Create a lazy reference to the first instruction of `block`
    pub fn meta_first_of(&mut self, block: BlockId) -> ValueId {
        self.alloc_value(Value::Meta(MetaRef::new(MetaKind::FirstOf(block))))
    }

    /// Create a lazy reference to the first instruction of the block that
    /// structurally follows `block`
    pub fn meta_first_of_next(&mut self, block: BlockId) -> ValueId {
        self.alloc_value(Value::Meta(MetaRef::new(MetaKind::FirstOfNext(block))))
    }

    // ---- linkage ----

    /// Set the structural predecessor; on a super block this also patches the
    /// underlying first basic block so linear traversal works at any level
    pub fn set_prev(&mut self, block: BlockId, prev: BlockId) {
        let is_super = matches!(self.block(block), Block::Super(_));
        match &mut self.blocks[block.0 as usize] {
            Block::Basic(bb) => bb.prev = Some(prev),
            Block::Super(sb) => sb.prev = Some(prev),
        }
        if is_super {
            if let Some(first) = self.first_basic(block) {
                self.basic_mut(first).prev = Some(prev);
            }
        }
    }

    /// Set the structural successor; see `set_prev`
    pub fn set_next(&mut self, block: BlockId, next: BlockId) {
        let is_super = matches!(self.block(block), Block::Super(_));
        match &mut self.blocks[block.0 as usize] {
            Block::Basic(bb) => bb.next = Some(next),
            Block::Super(sb) => sb.next = Some(next),
        }
        if is_super {
            if let Some(last) = self.last_basic(block) {
                self.basic_mut(last).next = Some(next);
            }
        }
    }

    pub fn set_branch_block(&mut self, branch: BlockId, target: BlockId) {
        match &mut self.basic_mut(branch).kind {
            BasicKind::Branch { branch_block } => *branch_block = Some(target),
            _ => panic!("branch target set on a non-branch block"),
        }
    }

    pub fn set_joining_block(&mut self, join: BlockId, arm: BlockId) {
        match &mut self.basic_mut(join).kind {
            BasicKind::Join { joining_block, .. } => *joining_block = Some(arm),
            _ => panic!("joining arm set on a non-join block"),
        }
    }

    pub fn set_last_cs_block(&mut self, block: BlockId, pred: BlockId) {
        self.basic_mut(block).last_cs_block = Some(pred);
    }

    pub fn set_super_head(&mut self, sb: BlockId, head: BlockId) {
        self.super_block_mut(sb).head = Some(head);
    }

    pub fn set_super_tail(&mut self, sb: BlockId, tail: BlockId) {
        self.super_block_mut(sb).tail = Some(tail);
    }

    /// First basic block of a block, drilling through nested super blocks
    pub fn first_basic(&self, block: BlockId) -> Option<BlockId> {
        match self.block(block) {
            Block::Basic(bb) => Some(bb.id),
            Block::Super(sb) => sb.head.and_then(|h| self.first_basic(h)),
        }
    }

    /// Last basic block of a block, drilling through nested super blocks
    pub fn last_basic(&self, block: BlockId) -> Option<BlockId> {
        match self.block(block) {
            Block::Basic(bb) => Some(bb.id),
            Block::Super(sb) => sb.tail.and_then(|t| self.last_basic(t)),
        }
    }

    /// Is this the first block of its function (sentinel `prev == self`)?
    pub fn is_first(&self, block: BlockId) -> bool {
        self.block(block).prev() == Some(block)
    }

    /// Is this the last block of its function (sentinel `next == self`)?
    pub fn is_last(&self, block: BlockId) -> bool {
        self.block(block).next() == Some(block)
    }

    /// Previous basic block in structural order, resolving super blocks and
    /// treating the sentinel as "no predecessor"
    pub fn prev_bb(&self, block: BlockId) -> Option<BlockId> {
        match self.block(block).prev() {
            Some(p) if p != block => match self.block(p) {
                Block::Super(_) => self.last_basic(p),
                Block::Basic(_) => Some(p),
            },
            _ => None,
        }
    }

    /// Next basic block in structural order, resolving super blocks and
    /// treating the sentinel as "no successor"
    pub fn next_bb(&self, block: BlockId) -> Option<BlockId> {
        match self.block(block).next() {
            Some(n) if n != block => match self.block(n) {
                Block::Super(_) => self.first_basic(n),
                Block::Basic(_) => Some(n),
            },
            _ => None,
        }
    }

    // ---- value tables and scoped lookup ----

    /// The chain of blocks inside a super block, most recent first: tail back
    /// to head following `prev`, with each join's joining arm spliced in
    /// right after it
    fn super_chain(&self, sb: BlockId) -> Vec<BlockId> {
        let (head, tail) = {
            let s = self.super_block(sb);
            (s.head, s.tail)
        };
        let (Some(head), Some(tail)) = (head, tail) else {
            return Vec::new();
        };
        let mut chain = Vec::new();
        let mut block = tail;
        while block != head {
            chain.push(block);
            if let Block::Basic(bb) = self.block(block) {
                if let Some(arm) = bb.joining_block() {
                    chain.push(arm);
                }
            }
            block = self
                .block(block)
                .prev()
                .expect("super block chain broken: no prev before reaching head");
        }
        chain.push(head);
        chain
    }

    /// Binding of `ident` at the end of `block`; a super block answers from
    /// the merged tables of its contained chain (later blocks win)
    pub fn block_binding(&self, block: BlockId, ident: IdentId) -> Option<Operand> {
        match self.block(block) {
            Block::Basic(bb) => bb.value_table.get(ident),
            Block::Super(_) => {
                for b in self.super_chain(block) {
                    if let Some(op) = self.block_binding(b, ident) {
                        return Some(op);
                    }
                }
                None
            }
        }
    }

    /// Identifiers bound anywhere in `block` (for a super block: in its
    /// contained chain), sorted
    pub fn block_bound_idents(&self, block: BlockId) -> Vec<IdentId> {
        fn collect(ir: &Ir, block: BlockId, out: &mut Vec<IdentId>) {
            match ir.block(block) {
                Block::Basic(bb) => out.extend(bb.value_table.ids()),
                Block::Super(_) => {
                    for b in ir.super_chain(block) {
                        collect(ir, b, out);
                    }
                }
            }
        }
        let mut ids = Vec::new();
        collect(self, block, &mut ids);
        ids.sort();
        ids.dedup();
        ids
    }

    /// Dominator-chain lookup: examine the block's own table, then recurse
    /// into `prev`, stopping at the function entry sentinel
    pub fn lookup_value_table(&self, block: BlockId, ident: IdentId) -> Option<Operand> {
        let mut cur = Some(block);
        while let Some(b) = cur {
            if let Some(op) = self.block_binding(b, ident) {
                return Some(op);
            }
            cur = match self.block(b).prev() {
                Some(p) if p != b => Some(p),
                _ => None,
            };
        }
        None
    }

    // ---- CSE engine ----

    /// CSE predecessor: the explicit override if set, else the structural
    /// previous basic block
    pub fn prev_cs_block(&self, block: BlockId) -> Option<BlockId> {
        self.basic(block).last_cs_block.or_else(|| self.prev_bb(block))
    }

    fn operand_eq(&self, a: Option<Operand>, b: Option<Operand>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.effective_id(a.value) == self.effective_id(b.value),
            _ => false,
        }
    }

    /// Two instructions compute the same thing: same opcode and equal
    /// operands, or swapped operands for a commutative opcode
    pub fn is_common_subexpression(&self, a: ValueId, b: ValueId) -> bool {
        let (Some(ai), Some(bi)) = (self.value(a).as_inst(), self.value(b).as_inst()) else {
            return false;
        };
        if ai.op != bi.op {
            return false;
        }
        if self.operand_eq(ai.x, bi.x) && self.operand_eq(ai.y, bi.y) {
            return true;
        }
        ai.op.is_commutative() && self.operand_eq(ai.x, bi.y) && self.operand_eq(ai.y, bi.x)
    }

    /// Does `b` kill the memory operation `a`? Stores to the same named
    /// array invalidate prior loads of that array; a store that is itself
    /// redundant does not kill
    fn is_cs_kill(&self, a: &Inst, b: ValueId) -> bool {
        if !a.op.is_mem() || a.ident.is_none() {
            return false;
        }
        let Some(bi) = self.value(b).as_inst() else {
            return false; // calls conservatively kill nothing
        };
        bi.op == Opcode::Store && bi.ident == a.ident && self.get_cs(b).is_none()
    }

    fn kill_in_block(&self, block: BlockId, a: &Inst) -> bool {
        self.basic(block).kill_stores.iter().any(|&s| self.is_cs_kill(a, s))
    }

    /// The representative earlier equivalent instruction, if any. Memoized;
    /// the memo is cleared once at the end of construction so later queries
    /// recompute against the finalized graph.
    pub fn get_cs(&self, id: ValueId) -> Option<ValueId> {
        let inst = self.value(id).as_inst()?;
        if inst.op.skips_cse() {
            return None;
        }
        if let Some(memo) = inst.cs.get() {
            return memo;
        }
        let result = self.compute_cs(id, inst);
        inst.cs.set(Some(result));
        result
    }

    fn compute_cs(&self, id: ValueId, inst: &Inst) -> Option<ValueId> {
        let key = inst.op.cse_key();
        let mut block = inst.bb;
        let mut cursor = inst.op_last;
        loop {
            // scan this block's segment of the per-opcode list
            while let Some(c) = cursor {
                let ci = self
                    .value(c)
                    .as_inst()
                    .expect("per-opcode CSE list links a non-instruction");
                if ci.bb != block {
                    break;
                }
                if c != id && self.is_common_subexpression(id, c) {
                    return Some(c);
                }
                if self.is_cs_kill(inst, c) {
                    return None;
                }
                cursor = ci.op_last;
            }
            // continue in the CSE predecessor, honoring its kill set first
            block = self.prev_cs_block(block)?;
            if inst.op.is_mem() && self.kill_in_block(block, inst) {
                return None;
            }
            cursor = self.basic(block).cs_table.get(&key).copied();
        }
    }

    /// The observable id with CSE: the representative's id if the value has
    /// one (chased transitively), else its own. Stores keep their own id —
    /// a redundant store is marked but never substituted. A lazy branch
    /// target answers with its resolved target.
    pub fn effective_id(&self, id: ValueId) -> ValueId {
        match self.value(id) {
            Value::Inst(inst) => {
                if inst.op == Opcode::Store {
                    return id;
                }
                match self.get_cs(id) {
                    Some(cs) => self.effective_id(cs),
                    None => id,
                }
            }
            Value::Meta(meta) => match meta.target() {
                Some(target) => self.effective_id(target),
                None => id,
            },
            _ => id,
        }
    }

    // ---- structural queries ----

    /// First instruction of a basic block; a join answers with its first φ
    pub fn first_inst(&self, bb: BlockId) -> Option<ValueId> {
        let block = self.basic(bb);
        block.phi_insts().first().copied().or_else(|| block.insts.first().copied())
    }

    /// All basic blocks contained in `block`: the block itself, or for a
    /// super block the head-to-tail chain plus every branch target subtree
    pub fn collect_bbs(&self, block: BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_bbs_into(block, &mut out, &mut seen);
        out
    }

    fn collect_bbs_into(&self, block: BlockId, out: &mut Vec<BlockId>, seen: &mut HashSet<BlockId>) {
        if !seen.insert(block) {
            return;
        }
        match self.block(block) {
            Block::Basic(bb) => out.push(bb.id),
            Block::Super(sb) => {
                let (Some(head), Some(tail)) = (sb.head, sb.tail) else {
                    return;
                };
                let mut cur = head;
                loop {
                    self.collect_bbs_into(cur, out, seen);
                    if let Block::Basic(bb) = self.block(cur) {
                        if let Some(target) = bb.branch_block() {
                            self.collect_bbs_into(target, out, seen);
                        }
                    }
                    if cur == tail {
                        break;
                    }
                    cur = self
                        .block(cur)
                        .next()
                        .expect("super block chain broken: no next before reaching tail");
                }
            }
        }
    }

    /// Stores anywhere inside `block`, for a join's kill set
    pub fn collect_stores(&self, block: BlockId) -> Vec<ValueId> {
        let mut stores = Vec::new();
        for bb in self.collect_bbs(block) {
            for &vid in &self.basic(bb).insts {
                if let Some(inst) = self.value(vid).as_inst() {
                    if inst.op == Opcode::Store {
                        stores.push(vid);
                    }
                }
            }
        }
        stores
    }

    pub fn add_kill_stores(&mut self, join: BlockId, stores: &[ValueId]) {
        self.basic_mut(join).kill_stores.extend(stores.iter().copied());
    }

    /// Rewrite every use of one version of a named scalar: operands matching
    /// `from` by effective id *and* carrying the `from_ident` stamp become
    /// `to`. Visits every instruction (φs included) of every basic block
    /// inside `block`.
    pub fn replace_operand(&mut self, block: BlockId, from: ValueId, from_ident: IdentId, to: ValueId) {
        let from_eff = self.effective_id(from);
        let matches = |ir: &Ir, o: &Option<Operand>| -> bool {
            o.map_or(false, |o| o.ident == Some(from_ident) && ir.effective_id(o.value) == from_eff)
        };
        let replacement = Operand::with_ident(to, from_ident);

        enum Fix {
            Operands { x: bool, y: bool },
            Args(Vec<usize>),
        }

        for bb in self.collect_bbs(block) {
            for vid in self.basic(bb).all_insts() {
                let fix = match self.value(vid) {
                    Value::Inst(inst) => {
                        let x = matches(self, &inst.x);
                        let y = matches(self, &inst.y);
                        (x || y).then_some(Fix::Operands { x, y })
                    }
                    Value::Call(call) => {
                        let args: Vec<usize> = call
                            .args
                            .iter()
                            .enumerate()
                            .filter(|(_, a)| matches(self, &Some(**a)))
                            .map(|(i, _)| i)
                            .collect();
                        (!args.is_empty()).then_some(Fix::Args(args))
                    }
                    _ => None,
                };
                match (fix, &mut self.values[vid.0 as usize]) {
                    (Some(Fix::Operands { x, y }), Value::Inst(inst)) => {
                        if x {
                            inst.x = Some(replacement);
                        }
                        if y {
                            inst.y = Some(replacement);
                        }
                    }
                    (Some(Fix::Args(args)), Value::Call(call)) => {
                        for i in args {
                            call.args[i] = replacement;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    // ---- finalization ----

    /// Resolve a lazy branch target to a concrete instruction, inserting a
    /// NOP into the target block if it is empty
    pub fn resolve_meta(&mut self, id: ValueId) -> ValueId {
        let kind = match self.value(id) {
            Value::Meta(meta) => {
                if let Some(target) = meta.target() {
                    return target;
                }
                meta.kind
            }
            _ => panic!("resolve_meta on a non-meta value"),
        };
        let target_bb = match kind {
            MetaKind::FirstOf(block) => self
                .first_basic(block)
                .expect("branch target region has no basic block"),
            MetaKind::FirstOfNext(block) => self
                .next_bb(block)
                .expect("branch past the end of the block list"),
        };
        let target = match self.first_inst(target_bb) {
            Some(inst) => inst,
            None => self.add_nop(target_bb),
        };
        match self.value(id) {
            Value::Meta(meta) => meta.target.set(Some(target)),
            _ => unreachable!(),
        }
        target
    }

    /// Resolve every outstanding lazy branch target and drop all memoized
    /// CSE conclusions so the next query recomputes against the complete
    /// graph
    pub fn finalize(&mut self) {
        let metas: Vec<ValueId> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| matches!(v, Value::Meta(_)))
            .map(|(i, _)| ValueId(i as u32))
            .collect();
        for id in metas {
            self.resolve_meta(id);
        }
        for value in &self.values {
            if let Value::Inst(inst) = value {
                inst.cs.set(None);
            }
        }
        debug!(
            "finalized IR: {} values, {} blocks, {} functions",
            self.values.len(),
            self.blocks.len(),
            self.funcs.len()
        );
    }
}
