//! Syntax analysis for the smpl language
//!
//! The parser is the emission driver of the compiler: there is no AST, each
//! nonterminal emits SSA values into the current basic block as it parses.

pub mod parser;
pub mod trace;

pub use parser::*;
pub use trace::*;
