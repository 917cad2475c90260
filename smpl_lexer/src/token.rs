//! Token definitions for the smpl language

use serde::{Deserialize, Serialize};
use smpl_common::{IdentId, RelOp, Span};
use std::fmt;

/// Token types in the smpl language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    // Literals
    Number(i32),

    // Identifiers (interned in the lexer's NameTable)
    Ident(IdentId),

    // Keywords
    KeywordMain,
    KeywordVar,
    KeywordArray,
    KeywordVoid,
    KeywordFunction,
    KeywordLet,
    KeywordCall,
    KeywordIf,
    KeywordThen,
    KeywordElse,
    KeywordFi,
    KeywordWhile,
    KeywordDo,
    KeywordOd,
    KeywordReturn,

    // Operators
    Times,        // *
    Divide,       // /
    Plus,         // +
    Minus,        // -
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    Becomes,      // <-

    // Delimiters
    Period,       // .
    Comma,        // ,
    Semicolon,    // ;
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }

    // Special
    EndOfFile,
}

impl TokenType {
    /// The relational operator this token denotes, if any
    pub fn relop(&self) -> Option<RelOp> {
        match self {
            TokenType::Equal => Some(RelOp::Eq),
            TokenType::NotEqual => Some(RelOp::Ne),
            TokenType::Less => Some(RelOp::Lt),
            TokenType::GreaterEqual => Some(RelOp::Ge),
            TokenType::LessEqual => Some(RelOp::Le),
            TokenType::Greater => Some(RelOp::Gt),
            _ => None,
        }
    }

    pub fn is_relop(&self) -> bool {
        self.relop().is_some()
    }

    /// Tokens that may start a `statement` production
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenType::KeywordLet
                | TokenType::KeywordCall
                | TokenType::KeywordIf
                | TokenType::KeywordWhile
                | TokenType::KeywordReturn
        )
    }

    /// Tokens that may start an `expression` production
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            TokenType::Ident(_) | TokenType::Number(_) | TokenType::LeftParen | TokenType::KeywordCall
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Number(n) => write!(f, "{}", n),
            TokenType::Ident(id) => write!(f, "{}", id),
            _ => {
                let token_str = match self {
                    TokenType::KeywordMain => "main",
                    TokenType::KeywordVar => "var",
                    TokenType::KeywordArray => "array",
                    TokenType::KeywordVoid => "void",
                    TokenType::KeywordFunction => "function",
                    TokenType::KeywordLet => "let",
                    TokenType::KeywordCall => "call",
                    TokenType::KeywordIf => "if",
                    TokenType::KeywordThen => "then",
                    TokenType::KeywordElse => "else",
                    TokenType::KeywordFi => "fi",
                    TokenType::KeywordWhile => "while",
                    TokenType::KeywordDo => "do",
                    TokenType::KeywordOd => "od",
                    TokenType::KeywordReturn => "return",
                    TokenType::Times => "*",
                    TokenType::Divide => "/",
                    TokenType::Plus => "+",
                    TokenType::Minus => "-",
                    TokenType::Equal => "==",
                    TokenType::NotEqual => "!=",
                    TokenType::Less => "<",
                    TokenType::LessEqual => "<=",
                    TokenType::Greater => ">",
                    TokenType::GreaterEqual => ">=",
                    TokenType::Becomes => "<-",
                    TokenType::Period => ".",
                    TokenType::Comma => ",",
                    TokenType::Semicolon => ";",
                    TokenType::LeftParen => "(",
                    TokenType::RightParen => ")",
                    TokenType::LeftBracket => "[",
                    TokenType::RightBracket => "]",
                    TokenType::LeftBrace => "{",
                    TokenType::RightBrace => "}",
                    TokenType::EndOfFile => "EOF",
                    _ => unreachable!(),
                };
                write!(f, "{}", token_str)
            }
        }
    }
}

/// A token with its source location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub ty: TokenType,
    pub span: Span,
}

impl Token {
    pub fn new(ty: TokenType, span: Span) -> Self {
        Self { ty, span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" at {}", self.ty, self.span)
    }
}

pub fn keyword(text: &str) -> Option<TokenType> {
    let tt = match text {
        "main" => TokenType::KeywordMain,
        "var" => TokenType::KeywordVar,
        "array" => TokenType::KeywordArray,
        "void" => TokenType::KeywordVoid,
        "function" => TokenType::KeywordFunction,
        "let" => TokenType::KeywordLet,
        "call" => TokenType::KeywordCall,
        "if" => TokenType::KeywordIf,
        "then" => TokenType::KeywordThen,
        "else" => TokenType::KeywordElse,
        "fi" => TokenType::KeywordFi,
        "while" => TokenType::KeywordWhile,
        "do" => TokenType::KeywordDo,
        "od" => TokenType::KeywordOd,
        "return" => TokenType::KeywordReturn,
        _ => return None,
    };
    Some(tt)
}
