//! Lexer implementation for the smpl language

use crate::{keyword, NameTable, Token, TokenType};
use smpl_common::{SmplError, SmplResult, SourceFile, Span};

/// Character-walking lexer for the smpl language
///
/// Malformed input is a fatal scan error carrying a located message; the
/// token stream of a successful run always ends with `EndOfFile`.
pub struct Lexer<'a> {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    file: &'a SourceFile,
    names: NameTable,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &str, file: &'a SourceFile) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            file,
            names: NameTable::new(),
        }
    }

    /// Take the identifier table out of the lexer once tokenizing is done
    pub fn into_names(self) -> NameTable {
        self.names
    }

    pub fn names_mut(&mut self) -> &mut NameTable {
        &mut self.names
    }

    /// Tokenize the entire input into a vector of tokens
    pub fn tokenize(&mut self) -> SmplResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        tokens.push(Token::new(TokenType::EndOfFile, Span::point(self.line, self.column)));
        Ok(tokens)
    }

    fn next_token(&mut self) -> SmplResult<Token> {
        let (start_line, start_column) = (self.line, self.column);

        let token_type = match self.current_char() {
            c if c.is_ascii_digit() => self.scan_number(start_line, start_column)?,
            c if c.is_ascii_alphabetic() => self.scan_identifier_or_keyword(),

            '*' => { self.advance(); TokenType::Times }
            '/' => { self.advance(); TokenType::Divide }
            '+' => { self.advance(); TokenType::Plus }
            '-' => { self.advance(); TokenType::Minus }
            '.' => { self.advance(); TokenType::Period }
            ',' => { self.advance(); TokenType::Comma }
            ';' => { self.advance(); TokenType::Semicolon }
            '(' => { self.advance(); TokenType::LeftParen }
            ')' => { self.advance(); TokenType::RightParen }
            '[' => { self.advance(); TokenType::LeftBracket }
            ']' => { self.advance(); TokenType::RightBracket }
            '{' => { self.advance(); TokenType::LeftBrace }
            '}' => { self.advance(); TokenType::RightBrace }

            '<' => {
                self.advance();
                match self.peek() {
                    Some('=') => { self.advance(); TokenType::LessEqual }
                    Some('-') => { self.advance(); TokenType::Becomes }
                    _ => TokenType::Less,
                }
            }
            '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                }
            }
            // "=" and "!" only exist as the first half of "==" and "!="
            '=' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenType::Equal
                } else {
                    return Err(self.error(start_line, start_column, "Expecting \"==\", found lone \"=\""));
                }
            }
            '!' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenType::NotEqual
                } else {
                    return Err(self.error(start_line, start_column, "Expecting \"!=\", found lone \"!\""));
                }
            }

            c => {
                self.advance();
                return Err(self.error(
                    start_line,
                    start_column,
                    &format!("Unexpected character: '{}'", c),
                ));
            }
        };

        let len = self.column.saturating_sub(start_column).max(1);
        Ok(Token::new(token_type, Span::new(start_line, start_column, len)))
    }

    fn scan_number(&mut self, start_line: u32, start_column: u32) -> SmplResult<TokenType> {
        let mut value: i64 = 0;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            value = value * 10 + (c as i64 - '0' as i64);
            if value > i32::MAX as i64 {
                return Err(self.error(start_line, start_column, "Number literal too large"));
            }
            self.advance();
        }
        Ok(TokenType::Number(value as i32))
    }

    fn scan_identifier_or_keyword(&mut self) -> TokenType {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            text.push(c);
            self.advance();
        }

        match keyword(&text) {
            Some(tt) => tt,
            None => TokenType::Ident(self.names.add_name(&text)),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => self.advance(),
                '\n' => self.advance_line(),
                _ => break,
            }
        }
    }

    fn error(&self, line: u32, column: u32, msg: &str) -> SmplError {
        SmplError::lex(format!("{}\n{}", self.file.locate(Span::point(line, column)), msg))
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn current_char(&self) -> char {
        self.chars[self.position]
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
        self.column += 1;
    }

    fn advance_line(&mut self) {
        self.position += 1;
        self.line += 1;
        self.column = 1;
    }
}
