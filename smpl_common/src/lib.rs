//! Shared utilities and error types for the smpl compiler
//!
//! This crate provides common functionality used across all compiler components:
//! - Error types and handling utilities
//! - Source location tracking and caret rendering
//! - Diagnostic message collection
//! - Shared vocabulary (identifier ids, relational operators)

pub mod diagnostics;
pub mod error;
pub mod idents;
pub mod source;
pub mod span;

pub use diagnostics::*;
pub use error::*;
pub use idents::*;
pub use source::*;
pub use span::*;
