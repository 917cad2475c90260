//! Lexical analysis for the smpl language
//!
//! Produces a token stream tagged with source locations and maintains a
//! unique integer id per distinct identifier name (`NameTable`).

pub mod lexer;
pub mod names;
pub mod token;

pub use lexer::*;
pub use names::*;
pub use token::*;
