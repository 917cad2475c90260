//! Error handling utilities for the smpl compiler

use thiserror::Error;

/// The main error type for the smpl compiler
///
/// Every fatal variant carries a message that already embeds the source
/// location rendered by [`crate::SourceFile::locate`].
#[derive(Error, Debug, Clone)]
pub enum SmplError {
    #[error("Scan error: {message}")]
    Lex { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Redefined identifier: {message}")]
    RedefinedIdent { message: String },

    #[error("Undefined identifier: {message}")]
    UndefinedIdent { message: String },

    #[error("Type mismatch: {message}")]
    TypeMismatch { message: String },

    #[error("Arity mismatch: {message}")]
    ArityMismatch { message: String },

    #[error("Array index out of bound: {message}")]
    ConstOutOfBoundIndex { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Result type alias for smpl compiler operations
pub type SmplResult<T> = Result<T, SmplError>;

impl SmplError {
    pub fn lex(message: impl Into<String>) -> Self {
        Self::Lex { message: message.into() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }

    pub fn redefined_ident(message: impl Into<String>) -> Self {
        Self::RedefinedIdent { message: message.into() }
    }

    pub fn undefined_ident(message: impl Into<String>) -> Self {
        Self::UndefinedIdent { message: message.into() }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch { message: message.into() }
    }

    pub fn arity_mismatch(message: impl Into<String>) -> Self {
        Self::ArityMismatch { message: message.into() }
    }

    pub fn const_out_of_bound_index(message: impl Into<String>) -> Self {
        Self::ConstOutOfBoundIndex { message: message.into() }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io { message: message.into() }
    }
}
