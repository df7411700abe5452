//! pifive - Frontend
//!
//! Turns Python-subset source text into an AST:
//! - Lexer: tokens, including `Indent`/`Dedent`/`Newline` layout tokens
//! - Parser: recursive descent over the token stream
//! - AST: module, statement and expression nodes with source spans

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{
    BinaryOp, CompareOp, Constant, Expression, ExpressionKind, FunctionDef, Module, NameContext,
    Statement, StatementKind, UnaryOp,
};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{ParseError, Parser};

use log::debug;
use pifive_common::CompilerError;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Parse source code into an AST
    pub fn parse_source(source: &str, filename: &str) -> Result<Module, CompilerError> {
        let tokens = Self::tokenize(source, filename)?;
        debug!("{}: {} tokens", filename, tokens.len());

        let mut parser = Parser::new(tokens);
        let module = parser.parse_module()?;
        debug!("{}: {} top-level statements", filename, module.body.len());

        Ok(module)
    }

    /// Tokenize source code
    pub fn tokenize(source: &str, filename: &str) -> Result<Vec<Token>, CompilerError> {
        Lexer::with_filename(source, filename).tokenize()
    }
}
