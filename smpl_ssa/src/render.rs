//! Human-readable text rendering of the IR
//!
//! Values print as `id: op (x) (y) [cs: id]`; operand ids are the
//! CSE-effective ids, the leading id is the value's own.

use crate::{Ir, Value, ValueId};
use std::fmt::Write;

impl Ir {
    pub fn render_value(&self, id: ValueId) -> String {
        match self.value(id) {
            Value::Const(n) => format!("{}: const #{}", id, n),
            Value::FramePointer { .. } => format!("{}: fp", id),
            Value::Call(call) => {
                let mut s = format!("{}: call {}", id, call.name);
                for arg in &call.args {
                    write!(s, " ({})", self.effective_id(arg.value)).unwrap();
                }
                s
            }
            Value::Meta(meta) => match meta.target() {
                Some(target) => format!("{}: -> ({})", id, self.effective_id(target)),
                None => format!("{}: -> ?", id),
            },
            Value::Inst(inst) => {
                let mut s = format!("{}: {}", id, inst.op);
                if let Some(x) = inst.x {
                    write!(s, " ({})", self.effective_id(x.value)).unwrap();
                }
                if let Some(y) = inst.y {
                    write!(s, " ({})", self.effective_id(y.value)).unwrap();
                }
                if let Some(cs) = self.get_cs(id) {
                    write!(s, " [cs: {}]", self.effective_id(cs)).unwrap();
                }
                s
            }
        }
    }

    pub fn render_block(&self, bb: crate::BlockId) -> String {
        let block = self.basic(bb);
        let mut s = format!("BB{}:\n", block.bbid);
        let insts = block.all_insts();
        if insts.is_empty() {
            s.push_str("  empty\n");
        } else {
            for inst in insts {
                s.push_str("  ");
                s.push_str(&self.render_value(inst));
                s.push('\n');
            }
        }
        s
    }

    /// Dump every function's basic blocks in numbering order
    pub fn render(&self) -> String {
        let mut s = String::new();
        for func in self.funcs() {
            writeln!(s, "{}:", self.super_block(func.super_block).name).unwrap();
            let mut bbs = self.collect_bbs(func.super_block);
            bbs.sort_by_key(|&bb| self.basic(bb).bbid);
            for bb in bbs {
                s.push_str(&self.render_block(bb));
            }
            s.push('\n');
        }
        s
    }
}
