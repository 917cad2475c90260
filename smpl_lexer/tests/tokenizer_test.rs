//! Tokenizer integration tests

use pretty_assertions::assert_eq;
use smpl_common::{SmplError, SourceFile};
use smpl_lexer::{Lexer, TokenType};

fn tokenize(input: &str) -> Vec<TokenType> {
    let source = SourceFile::new("test.smpl", input);
    let mut lexer = Lexer::new(input, &source);
    lexer
        .tokenize()
        .expect("tokenization should succeed")
        .into_iter()
        .map(|t| t.ty)
        .collect()
}

fn tokenize_err(input: &str) -> SmplError {
    let source = SourceFile::new("test.smpl", input);
    let mut lexer = Lexer::new(input, &source);
    lexer.tokenize().expect_err("tokenization should fail")
}

#[test]
fn assignment_statement() {
    use TokenType::*;
    let tokens = tokenize("let a <- 1;");
    assert_eq!(tokens.len(), 6);
    assert_eq!(tokens[0], KeywordLet);
    assert!(matches!(tokens[1], Ident(_)));
    assert_eq!(tokens[2], Becomes);
    assert_eq!(tokens[3], Number(1));
    assert_eq!(tokens[4], Semicolon);
    assert_eq!(tokens[5], EndOfFile);
}

#[test]
fn all_keywords() {
    use TokenType::*;
    let tokens =
        tokenize("main var array void function let call if then else fi while do od return");
    let expected = [
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
        EndOfFile,
    ];
    assert_eq!(tokens, expected);
}

#[test]
fn operators_and_delimiters() {
    use TokenType::*;
    let tokens = tokenize("* / + - == != < <= > >= <- . , ; ( ) [ ] { }");
    let expected = [
        Times,
        Divide,
        Plus,
        Minus,
        Equal,
        NotEqual,
        Less,
        LessEqual,
        Greater,
        GreaterEqual,
        Becomes,
        Period,
        Comma,
        Semicolon,
        LeftParen,
        RightParen,
        LeftBracket,
        RightBracket,
        LeftBrace,
        RightBrace,
        EndOfFile,
    ];
    assert_eq!(tokens, expected);
}

#[test]
fn becomes_is_not_less_than() {
    use TokenType::*;
    // no whitespace required between "<" forms and what follows
    assert_eq!(tokenize("a<-b")[1], Becomes);
    assert_eq!(tokenize("a<=b")[1], LessEqual);
    assert_eq!(tokenize("a<b")[1], Less);
}

#[test]
fn numbers_accumulate_decimal_digits() {
    assert_eq!(tokenize("0 7 42 123456")[..4], [
        TokenType::Number(0),
        TokenType::Number(7),
        TokenType::Number(42),
        TokenType::Number(123456),
    ]);
}

#[test]
fn identifiers_are_interned_consistently() {
    let source = SourceFile::new("test.smpl", "alpha beta alpha");
    let mut lexer = Lexer::new("alpha beta alpha", &source);
    let tokens = lexer.tokenize().unwrap();
    let names = lexer.into_names();

    let TokenType::Ident(first) = tokens[0].ty else { panic!("expected identifier") };
    let TokenType::Ident(second) = tokens[1].ty else { panic!("expected identifier") };
    let TokenType::Ident(third) = tokens[2].ty else { panic!("expected identifier") };

    assert_eq!(first, third);
    assert_ne!(first, second);
    assert_eq!(names.name(first), "alpha");
    assert_eq!(names.name(second), "beta");
}

#[test]
fn identifiers_may_contain_digits() {
    let tokens = tokenize("x1 y2z3");
    assert!(matches!(tokens[0], TokenType::Ident(_)));
    assert!(matches!(tokens[1], TokenType::Ident(_)));
    assert_eq!(tokens.len(), 3); // two identifiers + EOF
}

#[test]
fn lone_exclamation_is_a_scan_error() {
    let err = tokenize_err("a ! b");
    assert!(matches!(err, SmplError::Lex { .. }), "got {:?}", err);
}

#[test]
fn lone_equals_is_a_scan_error() {
    let err = tokenize_err("a = b");
    assert!(matches!(err, SmplError::Lex { .. }), "got {:?}", err);
}

#[test]
fn unknown_character_is_a_scan_error() {
    let err = tokenize_err("a % b");
    let SmplError::Lex { message } = &err else { panic!("expected scan error, got {:?}", err) };
    assert!(message.contains("Unexpected character"), "message: {}", message);
    // the message carries a caret-rendered source location
    assert!(message.contains("test.smpl(1:3)"), "message: {}", message);
}

#[test]
fn positions_track_lines_and_columns() {
    let input = "let a\nlet bee";
    let source = SourceFile::new("test.smpl", input);
    let mut lexer = Lexer::new(input, &source);
    let tokens = lexer.tokenize().unwrap();

    assert_eq!(tokens[0].span.line, 1);
    assert_eq!(tokens[0].span.column, 1);
    assert_eq!(tokens[2].span.line, 2);
    assert_eq!(tokens[2].span.column, 1);
    // "bee" starts at column 5 of line 2 and is three characters long
    assert_eq!(tokens[3].span.line, 2);
    assert_eq!(tokens[3].span.column, 5);
    assert_eq!(tokens[3].span.len, 3);
}

#[test]
fn number_overflow_is_a_scan_error() {
    let err = tokenize_err("9999999999999");
    assert!(matches!(err, SmplError::Lex { .. }));
}
