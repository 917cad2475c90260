//! Graphviz rendering of the block graph
//!
//! One record-shaped node per basic block, one cluster per super block
//! (nested), fall-through edges plain, branch edges colored and labeled.

use crate::{Block, BlockId, Ir};
use hashbrown::HashSet;
use std::fmt::Write;

/// Render the whole IR as a DOT digraph
pub fn render_dot(ir: &Ir) -> String {
    let mut out = String::from("digraph ir {\n  node [shape=record];\n");
    let mut visited = HashSet::new();
    for func in ir.funcs() {
        emit_block(ir, func.super_block, &mut out, 1, &mut visited);
    }
    for func in ir.funcs() {
        for bb in ir.collect_bbs(func.super_block) {
            let block = ir.basic(bb);
            if let Some(next) = ir.next_bb(bb) {
                writeln!(out, "  BB{}:s -> BB{}:n;", block.bbid, ir.basic(next).bbid).unwrap();
            }
            if let Some(target) = block.branch_block() {
                if let Some(head) = ir.first_basic(target) {
                    writeln!(
                        out,
                        "  BB{}:s -> BB{}:n [label=\"branch\", color=blue];",
                        block.bbid,
                        ir.basic(head).bbid
                    )
                    .unwrap();
                }
            }
        }
    }
    out.push_str("}\n");
    out
}

fn emit_block(ir: &Ir, block: BlockId, out: &mut String, depth: usize, visited: &mut HashSet<BlockId>) {
    if !visited.insert(block) {
        return;
    }
    let pad = "  ".repeat(depth);
    match ir.block(block) {
        Block::Basic(bb) => {
            let insts = bb.all_insts();
            let label = if insts.is_empty() {
                "empty".to_string()
            } else {
                insts
                    .iter()
                    .map(|&v| escape(&ir.render_value(v)))
                    .collect::<Vec<_>>()
                    .join("|")
            };
            writeln!(out, "{}BB{} [label=\"BB{} | {{{}}}\"];", pad, bb.bbid, bb.bbid, label).unwrap();
        }
        Block::Super(sb) => {
            let name = if sb.name.is_empty() {
                format!("super block {}", sb.id.0)
            } else {
                sb.name.clone()
            };
            writeln!(out, "{}subgraph cluster_{} {{", pad, sb.id.0).unwrap();
            writeln!(out, "{}  label=\"{}\";", pad, name).unwrap();
            if let (Some(head), Some(tail)) = (sb.head, sb.tail) {
                let mut cur = head;
                loop {
                    emit_block(ir, cur, out, depth + 1, visited);
                    if let Block::Basic(bb) = ir.block(cur) {
                        if let Some(target) = bb.branch_block() {
                            emit_block(ir, target, out, depth + 1, visited);
                        }
                    }
                    if cur == tail {
                        break;
                    }
                    cur = ir
                        .block(cur)
                        .next()
                        .expect("super block chain broken: no next before reaching tail");
                }
            }
            writeln!(out, "{}}}", pad).unwrap();
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('|', "\\|")
        .replace('<', "\\<")
        .replace('>', "\\>")
}
