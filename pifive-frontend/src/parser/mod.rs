//! Recursive Descent Parser
//!
//! Parses the token stream produced by the lexer into a `Module`.
//! Statements live in `statements.rs`, expressions (one function per
//! precedence level) in `expressions.rs`.

pub mod errors;
pub mod expressions;
pub mod statements;

use crate::ast::*;
use crate::lexer::{Token, TokenType};
use pifive_common::{CompilerError, SourceLocation, SourceSpan};
use std::collections::VecDeque;

pub use errors::ParseError;

/// Parser for the Python subset
pub struct Parser {
    pub(crate) tokens: VecDeque<Token>,
    eof_location: SourceLocation,
}

impl Parser {
    /// Create a new parser
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof_location = tokens
            .last()
            .map(|t| t.span.end.clone())
            .unwrap_or_else(SourceLocation::dummy);

        Self {
            tokens: tokens.into(),
            eof_location,
        }
    }

    /// Peek at current token without consuming
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Peek at the current token type
    pub(crate) fn peek_type(&self) -> Option<&TokenType> {
        self.peek().map(|t| &t.token_type)
    }

    /// Get current token and advance
    pub(crate) fn advance(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Check if current token matches expected type
    pub(crate) fn check(&self, token_type: &TokenType) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.token_type) == std::mem::discriminant(token_type)
        } else {
            matches!(token_type, TokenType::EndOfFile)
        }
    }

    /// Consume token if it matches expected type
    pub(crate) fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect and consume a specific token type
    pub(crate) fn expect(&mut self, token_type: TokenType, context: &str) -> Result<Token, ParseError> {
        match self.advance() {
            Some(token)
                if std::mem::discriminant(&token.token_type) == std::mem::discriminant(&token_type) =>
            {
                Ok(token)
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: format!("'{}' in {}", token_type, context),
                found: token,
            }),
            None => Err(ParseError::UnexpectedEndOfFile {
                expected: format!("'{}' in {}", token_type, context),
                location: self.eof_location.clone(),
            }),
        }
    }

    /// Expect an identifier and return its name with its span
    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<(String, SourceSpan), ParseError> {
        match self.advance() {
            Some(Token { token_type: TokenType::Identifier(name), span }) => Ok((name, span)),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: format!("identifier in {}", context),
                found: token,
            }),
            None => Err(ParseError::UnexpectedEndOfFile {
                expected: format!("identifier in {}", context),
                location: self.eof_location.clone(),
            }),
        }
    }

    /// Get current location for error reporting
    pub(crate) fn current_location(&self) -> SourceLocation {
        match self.peek() {
            Some(token) => token.span.start.clone(),
            None => self.eof_location.clone(),
        }
    }

    /// Error for a token that cannot start what we are parsing
    pub(crate) fn unexpected(&mut self, expected: &str) -> ParseError {
        match self.advance() {
            Some(found) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found,
            },
            None => ParseError::UnexpectedEndOfFile {
                expected: expected.to_string(),
                location: self.eof_location.clone(),
            },
        }
    }

    /// Parse a complete module
    pub fn parse_module(&mut self) -> Result<Module, CompilerError> {
        let start_location = self.current_location();
        let mut body = Vec::new();

        while !self.check(&TokenType::EndOfFile) {
            if self.match_token(&TokenType::Newline) {
                continue;
            }
            body.extend(self.parse_statement_line()?);
        }

        Ok(Module {
            body,
            span: SourceSpan::new(start_location, self.eof_location.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Result<Module, CompilerError> {
        let tokens = Lexer::new(input).tokenize()?;
        Parser::new(tokens).parse_module()
    }

    fn parse_expression_from_str(input: &str) -> Expression {
        let tokens = Lexer::new(input).tokenize().unwrap();
        Parser::new(tokens).parse_expression().unwrap()
    }

    #[test]
    fn test_parse_integer_literal() {
        let expr = parse_expression_from_str("42");
        assert_eq!(expr.kind, ExpressionKind::Constant(Constant::Int(42)));
    }

    #[test]
    fn test_most_negative_literal() {
        let expr = parse_expression_from_str("-9223372036854775808");
        assert_eq!(expr.kind, ExpressionKind::Constant(Constant::Int(i64::MIN)));

        let tokens = Lexer::new("9223372036854775808").tokenize().unwrap();
        let err = Parser::new(tokens).parse_expression().unwrap_err();
        assert!(matches!(err, ParseError::InvalidExpression { .. }));
    }

    #[test]
    fn test_parse_identifier() {
        let expr = parse_expression_from_str("variable");
        assert_eq!(expr.as_name(), Some("variable"));
    }

    #[test]
    fn test_precedence_mul_binds_tighter_than_add() {
        let expr = parse_expression_from_str("1 + 2 * 3");
        match expr.kind {
            ExpressionKind::BinOp { op: BinaryOp::Add, left, right } => {
                assert_eq!(left.kind, ExpressionKind::Constant(Constant::Int(1)));
                assert!(matches!(right.kind, ExpressionKind::BinOp { op: BinaryOp::Mul, .. }));
            }
            other => panic!("Expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        let expr = parse_expression_from_str("10 - 4 - 3");
        match expr.kind {
            ExpressionKind::BinOp { op: BinaryOp::Sub, left, right } => {
                assert!(matches!(left.kind, ExpressionKind::BinOp { op: BinaryOp::Sub, .. }));
                assert_eq!(right.kind, ExpressionKind::Constant(Constant::Int(3)));
            }
            other => panic!("Expected subtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_call() {
        let expr = parse_expression_from_str("foo(1, b)");
        match expr.kind {
            ExpressionKind::Call { func, args } => {
                assert_eq!(func.as_name(), Some("foo"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected function call, got {:?}", other),
        }
    }

    #[test]
    fn test_chained_comparison_keeps_all_operators() {
        let expr = parse_expression_from_str("a < b <= c");
        match expr.kind {
            ExpressionKind::Compare { ops, comparators, .. } => {
                assert_eq!(ops, vec![CompareOp::Less, CompareOp::LessEqual]);
                assert_eq!(comparators.len(), 2);
            }
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_binds_looser_than_arithmetic() {
        let expr = parse_expression_from_str("n - 1 == 0");
        match expr.kind {
            ExpressionKind::Compare { left, ops, .. } => {
                assert_eq!(ops, vec![CompareOp::Equal]);
                assert!(matches!(left.kind, ExpressionKind::BinOp { op: BinaryOp::Sub, .. }));
            }
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_minus() {
        let expr = parse_expression_from_str("-5");
        match expr.kind {
            ExpressionKind::UnaryOp { op: UnaryOp::Minus, operand } => {
                assert_eq!(operand.kind, ExpressionKind::Constant(Constant::Int(5)));
            }
            other => panic!("Expected unary minus, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_target_is_store() {
        let module = parse("x = 42\n").unwrap();
        match &module.body[0].kind {
            StatementKind::Assign { targets, value } => {
                assert_eq!(targets.len(), 1);
                assert_eq!(
                    targets[0].kind,
                    ExpressionKind::Name { id: "x".to_string(), ctx: NameContext::Store }
                );
                assert_eq!(value.kind, ExpressionKind::Constant(Constant::Int(42)));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_targets_are_preserved() {
        let module = parse("a = b = 1\n").unwrap();
        match &module.body[0].kind {
            StatementKind::Assign { targets, .. } => assert_eq!(targets.len(), 2),
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_augmented_assignment() {
        let module = parse("i += 1\n").unwrap();
        match &module.body[0].kind {
            StatementKind::AugAssign { target, op, .. } => {
                assert_eq!(target.as_name(), Some("i"));
                assert_eq!(*op, BinaryOp::Add);
            }
            other => panic!("Expected augmented assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_semicolon_separated_statements() {
        let module = parse("a = 1; b = 2; a = b\n").unwrap();
        assert_eq!(module.body.len(), 3);
    }

    #[test]
    fn test_if_elif_else_nests() {
        let source = "if a < 1:\n    x = 1\nelif a < 2:\n    x = 2\nelse:\n    x = 3\n";
        let module = parse(source).unwrap();
        assert_eq!(module.body.len(), 1);
        match &module.body[0].kind {
            StatementKind::If { orelse, .. } => {
                assert_eq!(orelse.len(), 1);
                match &orelse[0].kind {
                    StatementKind::If { orelse: inner, .. } => assert_eq!(inner.len(), 1),
                    other => panic!("Expected nested if, got {:?}", other),
                }
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_one_line_block() {
        let module = parse("while x: x = x - 1\n").unwrap();
        match &module.body[0].kind {
            StatementKind::While { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("Expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_function_definition() {
        let source = "def add(a, b):\n    return a + b\n";
        let module = parse(source).unwrap();
        match &module.body[0].kind {
            StatementKind::FunctionDef(def) => {
                assert_eq!(def.name, "add");
                assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(def.body.len(), 1);
                assert!(def.body[0].is_return());
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_return() {
        let module = parse("def f():\n    return\n").unwrap();
        match &module.body[0].kind {
            StatementKind::FunctionDef(def) => {
                assert_eq!(def.body[0].kind, StatementKind::Return(None));
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_colon_reports_location() {
        let err = parse("if x\n    y = 1\n").unwrap_err();
        match err {
            CompilerError::ParseError { location, message } => {
                assert_eq!(location.line, 1);
                assert!(message.contains("':'"), "message was: {}", message);
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_indent() {
        let err = parse("x = 1\n    y = 2\n").unwrap_err();
        assert!(matches!(err, CompilerError::ParseError { .. }));
    }
}
