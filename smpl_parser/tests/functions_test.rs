//! User-defined functions: contexts, parameters, calls, returns

use pretty_assertions::assert_eq;
use smpl_parser::{compile_source, Compilation};
use smpl_ssa::{Ir, Opcode, Value, ValueId};

fn compile(src: &str) -> Compilation {
    compile_source(src, "test.smpl").expect("compilation should succeed")
}

fn insts_with_op(ir: &Ir, op: Opcode) -> Vec<ValueId> {
    (0..ir.value_count() as u32)
        .map(ValueId)
        .filter(|&v| ir.value(v).as_inst().map_or(false, |i| i.op == op))
        .collect()
}

fn calls(ir: &Ir) -> Vec<ValueId> {
    (0..ir.value_count() as u32)
        .map(ValueId)
        .filter(|&v| matches!(ir.value(v), Value::Call(_)))
        .collect()
}

#[test]
fn void_function_declares_args_in_its_constant_block() {
    let c = compile(
        "main var a; \
         void function foo(p, q); { call OutputNum(p + q) }; \
         { let a <- call InputNum(); call foo(a, 1); call OutputNum(a) }.",
    );
    let ir = &c.ir;
    assert_eq!(ir.funcs().len(), 2);

    let foo = &ir.funcs()[1];
    assert_eq!(foo.name, "foo");
    assert!(foo.is_void);
    assert_eq!(foo.params.len(), 2);

    // one ARG Const(i) per formal parameter, placed in foo's constant block
    let args = insts_with_op(ir, Opcode::Arg);
    assert_eq!(args.len(), 2);
    for (i, &arg) in args.iter().enumerate() {
        let inst = ir.value(arg).as_inst().unwrap();
        assert_eq!(inst.bb, foo.const_block);
        assert_eq!(ir.value(inst.x.unwrap().value).as_const(), Some(i as i32));
    }

    // the parameters are bound to the ARGs inside the body
    let p = c.names.lookup("p").unwrap();
    let q = c.names.lookup("q").unwrap();
    let add = insts_with_op(ir, Opcode::Add)[0];
    let add_inst = ir.value(add).as_inst().unwrap();
    assert_eq!(add_inst.x.unwrap().value, args[0]);
    assert_eq!(add_inst.x.unwrap().ident, Some(p));
    assert_eq!(add_inst.y.unwrap().value, args[1]);
    assert_eq!(add_inst.y.unwrap().ident, Some(q));

    // the call site records name and arguments; void yields no value
    let call_sites = calls(ir);
    assert_eq!(call_sites.len(), 1);
    let Value::Call(call) = ir.value(call_sites[0]) else { unreachable!() };
    assert_eq!(call.name, "foo");
    assert_eq!(call.args.len(), 2);
    let read = insts_with_op(ir, Opcode::Read)[0];
    assert_eq!(call.args[0].value, read);
    assert_eq!(ir.value(call.args[1].value).as_const(), Some(1));
}

#[test]
fn constant_pools_are_per_function() {
    let c = compile(
        "main var a; \
         function inc(x); { return x + 1 }; \
         { let a <- 1 + 1; call OutputNum(a) }.",
    );
    let ir = &c.ir;
    let main_one = ir.funcs()[0].lookup_const(1).unwrap();
    let inc_one = ir.funcs()[1].lookup_const(1).unwrap();
    assert_ne!(main_one, inc_one);
}

#[test]
fn non_void_call_feeds_an_expression() {
    let c = compile(
        "main var a; \
         function double(x); { return x + x }; \
         { let a <- call double(7); call OutputNum(a) }.",
    );
    let ir = &c.ir;

    // RET carries the body's add
    let ret = insts_with_op(ir, Opcode::Ret);
    assert_eq!(ret.len(), 1);
    let add = insts_with_op(ir, Opcode::Add)[0];
    let ret_inst = ir.value(ret[0]).as_inst().unwrap();
    assert_eq!(ir.effective_id(ret_inst.x.unwrap().value), add);

    // the call's value is what the write consumes
    let call_sites = calls(ir);
    assert_eq!(call_sites.len(), 1);
    let write = insts_with_op(ir, Opcode::Write)[0];
    let write_x = ir.value(write).as_inst().unwrap().x.unwrap().value;
    assert_eq!(ir.effective_id(write_x), call_sites[0]);
}

#[test]
fn return_without_value_emits_a_bare_ret() {
    let c = compile(
        "main void function nothing(); { return }; { call nothing; call OutputNewLine() }.",
    );
    let ir = &c.ir;
    let ret = insts_with_op(ir, Opcode::Ret);
    assert_eq!(ret.len(), 1);
    assert!(ir.value(ret[0]).as_inst().unwrap().x.is_none());
    assert_eq!(insts_with_op(ir, Opcode::Writenl).len(), 1);
}

#[test]
fn simple_recursion_resolves() {
    let c = compile(
        "main var a; \
         function f(x); { return call f(x) }; \
         { let a <- call f(1); call OutputNum(a) }.",
    );
    assert_eq!(calls(&c.ir).len(), 2);
}

#[test]
fn calls_are_never_common_subexpressions() {
    let c = compile(
        "main var a, b; \
         function f(x); { return x }; \
         { let a <- call f(1); let b <- call f(1); call OutputNum(a + b) }.",
    );
    let ir = &c.ir;
    let sites = calls(ir);
    assert_eq!(sites.len(), 2);
    // identical calls keep distinct identities
    assert_ne!(ir.effective_id(sites[0]), ir.effective_id(sites[1]));
    assert_eq!(ir.get_cs(sites[0]), None);
    assert_eq!(ir.get_cs(sites[1]), None);
}

#[test]
fn function_locals_are_scoped_to_the_function() {
    let c = compile(
        "main var a; \
         void function show(); var t; { let t <- 5; call OutputNum(t) }; \
         { let a <- 1; call show() }.",
    );
    let ir = &c.ir;
    let t = c.names.lookup("t").unwrap();
    let a = c.names.lookup("a").unwrap();
    assert!(ir.funcs()[1].var_type(t).is_some());
    assert!(ir.funcs()[1].var_type(a).is_none());
    assert!(ir.funcs()[0].var_type(t).is_none());
}
