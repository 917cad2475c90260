//! φ-insertion at the join points of structured control flow
//!
//! Runs exactly when the building of a construct's arms has finished,
//! comparing the incoming value tables and emitting φ instructions for every
//! identifier whose definitions differ.

use crate::{BlockId, FuncId, Ir, Operand, ValueId};
use log::debug;
use smpl_common::IdentId;

/// What φ-insertion produced: the φs, and identifiers that were read
/// uninitialized (the caller turns those into warnings; a `Const(0)` was
/// substituted)
#[derive(Debug, Default)]
pub struct PhiOutcome {
    pub phis: Vec<ValueId>,
    pub uninitialized: Vec<IdentId>,
}

/// Insert φs into the join block of an `if`.
///
/// `arms` are the arm regions whose bindings may have changed (then, and else
/// when present). The left φ operand comes from the joining side of the join
/// block, the right from its structural predecessor; identifiers bound to the
/// same value on both sides need no merge.
pub fn insert_branch_phis(ir: &mut Ir, func: FuncId, join: BlockId, arms: &[BlockId]) -> PhiOutcome {
    let mut changed: Vec<IdentId> = Vec::new();
    for &arm in arms {
        changed.extend(ir.block_bound_idents(arm));
    }
    changed.sort();
    changed.dedup();

    let joining = ir
        .basic(join)
        .joining_block()
        .expect("join block of an if has no joining arm");
    let prev = ir.block(join).prev().expect("join block of an if has no predecessor");

    let mut outcome = PhiOutcome::default();
    for ident in changed {
        let left = lookup_or_zero(ir, func, joining, ident, &mut outcome);
        let right = lookup_or_zero(ir, func, prev, ident, &mut outcome);

        if ir.effective_id(left.value) == ir.effective_id(right.value) {
            continue;
        }

        let phi = ir.add_phi(join, left, right, ident);
        ir.basic_mut(join).value_table.set(ident, Operand::new(phi));
        debug!("branch φ {:?} for {:?}", phi, ident);
        outcome.phis.push(phi);
    }
    outcome
}

/// Insert φs into the join block at a `while` head and rewrite every use of
/// the pre-loop value inside the relation block and the body to the φ.
pub fn insert_loop_phis(
    ir: &mut Ir,
    func: FuncId,
    join: BlockId,
    rel: BlockId,
    body: BlockId,
) -> PhiOutcome {
    let changed = ir.block_bound_idents(body);
    let outside = ir.block(join).prev().expect("loop join has no predecessor");

    let mut outcome = PhiOutcome::default();
    for ident in changed {
        let Some(left) = ir.lookup_value_table(body, ident) else {
            unreachable!("identifier changed in the loop body has no binding there");
        };
        let right = lookup_or_zero(ir, func, outside, ident, &mut outcome);

        if ir.effective_id(left.value) == ir.effective_id(right.value) {
            continue;
        }

        let phi = ir.add_phi(join, left, right, ident);
        ir.basic_mut(join).value_table.set(ident, Operand::new(phi));
        debug!("loop φ {:?} for {:?}", phi, ident);
        outcome.phis.push(phi);

        // every use of the pre-loop value in the subgraph governed by the
        // loop now refers to the φ
        ir.replace_operand(rel, right.value, ident, phi);
        ir.replace_operand(body, right.value, ident, phi);
    }
    outcome
}

fn lookup_or_zero(
    ir: &mut Ir,
    func: FuncId,
    block: BlockId,
    ident: IdentId,
    outcome: &mut PhiOutcome,
) -> Operand {
    match ir.lookup_value_table(block, ident) {
        Some(op) => op,
        None => {
            outcome.uninitialized.push(ident);
            Operand::new(ir.add_const(func, 0))
        }
    }
}
