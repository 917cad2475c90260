//! End-to-end scenarios: literal source in, IR facts out

use pretty_assertions::assert_eq;
use smpl_parser::{compile_source, Compilation};
use smpl_ssa::{FuncId, Ir, Opcode, Value, ValueId};

fn compile(src: &str) -> Compilation {
    compile_source(src, "test.smpl").expect("compilation should succeed")
}

fn insts_with_op(ir: &Ir, op: Opcode) -> Vec<ValueId> {
    (0..ir.value_count() as u32)
        .map(ValueId)
        .filter(|&v| ir.value(v).as_inst().map_or(false, |i| i.op == op))
        .collect()
}

fn the_inst(ir: &Ir, op: Opcode) -> ValueId {
    let found = insts_with_op(ir, op);
    assert_eq!(found.len(), 1, "expected exactly one {} instruction", op);
    found[0]
}

fn operand_x(ir: &Ir, v: ValueId) -> ValueId {
    ir.value(v).as_inst().unwrap().x.unwrap().value
}

fn operand_y(ir: &Ir, v: ValueId) -> ValueId {
    ir.value(v).as_inst().unwrap().y.unwrap().value
}

fn const_id(ir: &Ir, func: FuncId, n: i32) -> ValueId {
    ir.func(func).lookup_const(n).expect("constant should be pooled")
}

#[test]
fn s1_straight_line_add_and_write() {
    let c = compile("main var a; { let a <- 1+2; call OutputNum(a) }.");
    let ir = &c.ir;

    assert!(ir.func(c.main).lookup_const(1).is_some());
    assert!(ir.func(c.main).lookup_const(2).is_some());
    assert!(ir.func(c.main).lookup_const(0).is_none());

    let add = the_inst(ir, Opcode::Add);
    assert_eq!(operand_x(ir, add), const_id(ir, c.main, 1));
    assert_eq!(operand_y(ir, add), const_id(ir, c.main, 2));

    let write = the_inst(ir, Opcode::Write);
    assert_eq!(ir.effective_id(operand_x(ir, write)), add);

    assert!(insts_with_op(ir, Opcode::Phi).is_empty());
    assert!(insts_with_op(ir, Opcode::Load).is_empty());
    assert!(insts_with_op(ir, Opcode::Store).is_empty());
    the_inst(ir, Opcode::End);

    // frame pointer, two constants, add, write, end
    assert_eq!(ir.value_count(), 6);
    assert!(c.diagnostics.is_empty());
}

#[test]
fn s2_repeated_expression_is_a_cse_hit() {
    let c = compile("main var a, b; { let a <- call InputNum(); let b <- a+a; call OutputNum(a+a) }.");
    let ir = &c.ir;

    let read = the_inst(ir, Opcode::Read);
    let adds = insts_with_op(ir, Opcode::Add);
    assert_eq!(adds.len(), 2);
    for &add in &adds {
        assert_eq!(operand_x(ir, add), read);
        assert_eq!(operand_y(ir, add), read);
    }
    assert_eq!(ir.get_cs(adds[0]), None);
    assert_eq!(ir.get_cs(adds[1]), Some(adds[0]));
    assert_eq!(ir.effective_id(adds[1]), adds[0]);

    // the write sees only the first add
    let write = the_inst(ir, Opcode::Write);
    assert_eq!(ir.effective_id(operand_x(ir, write)), adds[0]);
}

#[test]
fn s3_if_else_inserts_one_phi() {
    let c = compile(
        "main var x; { let x <- 1; if 0 < 2 then let x <- 2 else let x <- 3 fi; call OutputNum(x) }.",
    );
    let ir = &c.ir;
    let x = c.names.lookup("x").unwrap();

    let phi = the_inst(ir, Opcode::Phi);
    // left operand from the else arm, right from the then arm
    assert_eq!(operand_x(ir, phi), const_id(ir, c.main, 3));
    assert_eq!(operand_y(ir, phi), const_id(ir, c.main, 2));
    assert_eq!(ir.value(phi).as_inst().unwrap().ident, Some(x));

    let cmp = the_inst(ir, Opcode::Cmp);
    assert_eq!(operand_x(ir, cmp), const_id(ir, c.main, 0));
    assert_eq!(operand_y(ir, cmp), const_id(ir, c.main, 2));

    // "<" turns into BLT on the relation's result
    let blt = the_inst(ir, Opcode::Blt);
    assert_eq!(operand_x(ir, blt), cmp);
    // two unconditional branches: fall-through to else, then-arm jump to join
    assert_eq!(insts_with_op(ir, Opcode::Bra).len(), 2);

    let write = the_inst(ir, Opcode::Write);
    assert_eq!(ir.effective_id(operand_x(ir, write)), phi);
    assert!(c.diagnostics.is_empty());
}

#[test]
fn s4_while_phi_rewrites_relation_and_body() {
    let c = compile("main var i; { let i <- 0; while i < 10 do let i <- i + 1 od; call OutputNum(i) }.");
    let ir = &c.ir;
    let i = c.names.lookup("i").unwrap();

    let phi = the_inst(ir, Opcode::Phi);
    let add = the_inst(ir, Opcode::Add);
    // PHI(i from the body, 0 from before the loop)
    assert_eq!(operand_x(ir, phi), add);
    assert_eq!(operand_y(ir, phi), const_id(ir, c.main, 0));
    assert_eq!(ir.value(phi).as_inst().unwrap().ident, Some(i));

    // the relation and the body use the phi, not the pre-loop constant
    let cmp = the_inst(ir, Opcode::Cmp);
    assert_eq!(operand_x(ir, cmp), phi);
    assert_eq!(operand_y(ir, cmp), const_id(ir, c.main, 10));
    assert_eq!(operand_x(ir, add), phi);
    assert_eq!(operand_y(ir, add), const_id(ir, c.main, 1));

    // conditional branch enters the body at the add
    let blt = the_inst(ir, Opcode::Blt);
    assert_eq!(ir.effective_id(operand_y(ir, blt)), add);

    // one branch loops back to the phi, the other exits to the write
    let write = the_inst(ir, Opcode::Write);
    let bra_targets: Vec<ValueId> = insts_with_op(ir, Opcode::Bra)
        .iter()
        .map(|&b| ir.effective_id(operand_x(ir, b)))
        .collect();
    assert_eq!(bra_targets.len(), 2);
    assert!(bra_targets.contains(&phi));
    assert!(bra_targets.contains(&write));

    assert_eq!(ir.effective_id(operand_x(ir, write)), phi);
}

#[test]
fn s5_uninitialized_read_warns_and_substitutes_zero() {
    let c = compile("main var a; { let a <- a + 1; call OutputNum(a) }.");
    let ir = &c.ir;
    let a = c.names.lookup("a").unwrap();

    assert_eq!(c.diagnostics.warning_count(), 1);
    let warning = c.diagnostics.warnings().next().unwrap();
    assert!(warning.message.contains("uninitialized"), "message: {}", warning.message);

    let add = the_inst(ir, Opcode::Add);
    let x = c.ir.value(add).as_inst().unwrap().x.unwrap();
    assert_eq!(x.value, const_id(ir, c.main, 0));
    assert_eq!(x.ident, Some(a));
    assert_eq!(operand_y(ir, add), const_id(ir, c.main, 1));

    let write = the_inst(ir, Opcode::Write);
    assert_eq!(ir.effective_id(operand_x(ir, write)), add);
}

fn eval_const(ir: &Ir, v: ValueId) -> i32 {
    match ir.value(v) {
        Value::Const(n) => *n,
        Value::Inst(inst) => {
            let x = eval_const(ir, inst.x.unwrap().value);
            let y = eval_const(ir, inst.y.unwrap().value);
            match inst.op {
                Opcode::Add => x + y,
                Opcode::Sub => x - y,
                Opcode::Mul => x * y,
                Opcode::Div => x / y,
                other => panic!("not a constant expression: {}", other),
            }
        }
        other => panic!("not a constant expression: {:?}", other),
    }
}

#[test]
fn s6_array_store_load_and_kill() {
    let c = compile("main array[3][4] b; { let b[1][2] <- 7; call OutputNum(b[1][2]) }.");
    let ir = &c.ir;
    let b = c.names.lookup("b").unwrap();

    // declaration reserved 3*4*4 = 48 bytes and based the array at FP+0
    assert_eq!(ir.frame_offset(c.main), 48);
    let const_block = ir.func(c.main).const_block;
    let base = insts_with_op(ir, Opcode::Add)
        .into_iter()
        .find(|&v| ir.value(v).as_inst().unwrap().bb == const_block)
        .expect("array base address in the constant block");
    assert_eq!(operand_x(ir, base), ir.func(c.main).frame_pointer);
    assert_eq!(operand_y(ir, base), const_id(ir, c.main, 0));

    // the store writes 7 through an ADDA off the base
    let store = the_inst(ir, Opcode::Store);
    let store_inst = ir.value(store).as_inst().unwrap();
    assert_eq!(ir.effective_id(store_inst.x.unwrap().value), const_id(ir, c.main, 7));
    assert_eq!(store_inst.ident, Some(b));
    let store_adda = store_inst.y.unwrap().value;
    assert!(matches!(ir.value(store_adda).as_inst().unwrap().op, Opcode::Adda));

    // byte offset (1*4+2)*4 = 24
    assert_eq!(eval_const(ir, operand_y(ir, store_adda)), 24);

    // the read emits its own address chain, which CSEs against the store's
    let addas = insts_with_op(ir, Opcode::Adda);
    assert_eq!(addas.len(), 2);
    assert_eq!(ir.get_cs(addas[1]), Some(addas[0]));

    // but the load must not CSE across the store of the same array
    let load = the_inst(ir, Opcode::Load);
    let load_inst = ir.value(load).as_inst().unwrap();
    assert_eq!(load_inst.ident, Some(b));
    assert_eq!(ir.get_cs(load), None);
    assert_eq!(eval_const(ir, operand_y(ir, load_inst.x.unwrap().value)), 24);

    let write = the_inst(ir, Opcode::Write);
    assert_eq!(ir.effective_id(operand_x(ir, write)), load);
}

#[test]
fn text_rendering_shows_ids_opcodes_and_cse_marks() {
    let c = compile("main var a, b; { let a <- call InputNum(); let b <- a+a; call OutputNum(a+a) }.");
    let dump = c.ir.render();
    assert!(dump.contains("computation block:"), "dump:\n{}", dump);
    assert!(dump.contains(": fp"), "dump:\n{}", dump);
    assert!(dump.contains(": read"), "dump:\n{}", dump);
    assert!(dump.contains("[cs: "), "dump:\n{}", dump);
    assert!(dump.contains(": end"), "dump:\n{}", dump);
}

#[test]
fn dot_rendering_clusters_super_blocks() {
    let c = compile("main var i; { let i <- 0; while i < 10 do let i <- i + 1 od; call OutputNum(i) }.");
    let dot = smpl_ssa::dot::render_dot(&c.ir);
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("subgraph cluster_"));
    assert!(dot.contains("while statement"));
    assert!(dot.contains("[label=\"branch\", color=blue]"));
    assert!(dot.contains("BB"));
}
