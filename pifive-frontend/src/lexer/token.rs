//! Token definitions for the pifive lexer
//!
//! This module defines token types and the Token struct.

use pifive_common::{SourceLocation, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token types of the Python subset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    // Literals
    IntLiteral(u64),               // magnitude; a leading '-' is its own token
    StringLiteral(String),

    // Identifiers and keywords
    Identifier(String),

    // Keywords
    Def, Return, If, Elif, Else, While, Pass, True, False,

    // Operators
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    SlashSlash,     // //
    Percent,        // %
    Ampersand,      // &
    Pipe,           // |
    Caret,          // ^
    Tilde,          // ~
    LeftShift,      // <<
    RightShift,     // >>
    Equal,          // =
    Less,           // <
    Greater,        // >
    LessEqual,      // <=
    GreaterEqual,   // >=
    EqualEqual,     // ==
    BangEqual,      // !=

    // Augmented assignment operators
    PlusEqual,        // +=
    MinusEqual,       // -=
    StarEqual,        // *=
    SlashEqual,       // /=
    SlashSlashEqual,  // //=
    PercentEqual,     // %=
    AmpersandEqual,   // &=
    PipeEqual,        // |=
    CaretEqual,       // ^=
    LeftShiftEqual,   // <<=
    RightShiftEqual,  // >>=

    // Delimiters
    LeftParen,      // (
    RightParen,     // )
    Comma,          // ,
    Colon,          // :
    Semicolon,      // ;

    // Layout
    Newline,
    Indent,
    Dedent,
    EndOfFile,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::IntLiteral(n) => write!(f, "{n}"),
            TokenType::StringLiteral(s) => write!(f, "\"{s}\""),
            TokenType::Identifier(s) => write!(f, "{s}"),

            TokenType::Def => write!(f, "def"),
            TokenType::Return => write!(f, "return"),
            TokenType::If => write!(f, "if"),
            TokenType::Elif => write!(f, "elif"),
            TokenType::Else => write!(f, "else"),
            TokenType::While => write!(f, "while"),
            TokenType::Pass => write!(f, "pass"),
            TokenType::True => write!(f, "True"),
            TokenType::False => write!(f, "False"),

            TokenType::Plus => write!(f, "+"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Star => write!(f, "*"),
            TokenType::Slash => write!(f, "/"),
            TokenType::SlashSlash => write!(f, "//"),
            TokenType::Percent => write!(f, "%"),
            TokenType::Ampersand => write!(f, "&"),
            TokenType::Pipe => write!(f, "|"),
            TokenType::Caret => write!(f, "^"),
            TokenType::Tilde => write!(f, "~"),
            TokenType::LeftShift => write!(f, "<<"),
            TokenType::RightShift => write!(f, ">>"),
            TokenType::Equal => write!(f, "="),
            TokenType::Less => write!(f, "<"),
            TokenType::Greater => write!(f, ">"),
            TokenType::LessEqual => write!(f, "<="),
            TokenType::GreaterEqual => write!(f, ">="),
            TokenType::EqualEqual => write!(f, "=="),
            TokenType::BangEqual => write!(f, "!="),

            TokenType::PlusEqual => write!(f, "+="),
            TokenType::MinusEqual => write!(f, "-="),
            TokenType::StarEqual => write!(f, "*="),
            TokenType::SlashEqual => write!(f, "/="),
            TokenType::SlashSlashEqual => write!(f, "//="),
            TokenType::PercentEqual => write!(f, "%="),
            TokenType::AmpersandEqual => write!(f, "&="),
            TokenType::PipeEqual => write!(f, "|="),
            TokenType::CaretEqual => write!(f, "^="),
            TokenType::LeftShiftEqual => write!(f, "<<="),
            TokenType::RightShiftEqual => write!(f, ">>="),

            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::Comma => write!(f, ","),
            TokenType::Colon => write!(f, ":"),
            TokenType::Semicolon => write!(f, ";"),

            TokenType::Newline => write!(f, "newline"),
            TokenType::Indent => write!(f, "indent"),
            TokenType::Dedent => write!(f, "dedent"),
            TokenType::EndOfFile => write!(f, "end of file"),
        }
    }
}

/// A token with its location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, span: SourceSpan) -> Self {
        Self { token_type, span }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self {
            token_type: TokenType::EndOfFile,
            span: SourceSpan::new(location.clone(), location),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.token_type, self.span.start)
    }
}
