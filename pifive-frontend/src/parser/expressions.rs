//! Expression parsing
//!
//! One method per precedence level, loosest first:
//! comparison, `|`, `^`, `&`, shifts, `+ -`, `* / // %`, unary, call, atom.

use super::{ParseError, Parser};
use crate::ast::*;
use crate::lexer::TokenType;
use pifive_common::SourceSpan;

impl Parser {
    /// Parse an expression
    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_comparison()
    }

    /// Comparisons chain: `a < b <= c` keeps every operator in one node
    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_bitwise_or()?;

        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.peek_type().and_then(compare_operator) {
            self.advance();
            ops.push(op);
            comparators.push(self.parse_bitwise_or()?);
        }

        if ops.is_empty() {
            return Ok(left);
        }

        let span = match comparators.last() {
            Some(last) => left.span.extend(&last.span),
            None => left.span.clone(),
        };
        Ok(Expression::new(
            ExpressionKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            span,
        ))
    }

    fn parse_bitwise_or(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_bitwise_xor, |t| match t {
            TokenType::Pipe => Some(BinaryOp::BitOr),
            _ => None,
        })
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_bitwise_and, |t| match t {
            TokenType::Caret => Some(BinaryOp::BitXor),
            _ => None,
        })
    }

    fn parse_bitwise_and(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_shift, |t| match t {
            TokenType::Ampersand => Some(BinaryOp::BitAnd),
            _ => None,
        })
    }

    fn parse_shift(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_additive, |t| match t {
            TokenType::LeftShift => Some(BinaryOp::LeftShift),
            TokenType::RightShift => Some(BinaryOp::RightShift),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_multiplicative, |t| match t {
            TokenType::Plus => Some(BinaryOp::Add),
            TokenType::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_unary, |t| match t {
            TokenType::Star => Some(BinaryOp::Mul),
            TokenType::Slash => Some(BinaryOp::Div),
            TokenType::SlashSlash => Some(BinaryOp::FloorDiv),
            TokenType::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    /// Left-associative binary level: `operand (op operand)*`
    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expression, ParseError>,
        operator: fn(&TokenType) -> Option<BinaryOp>,
    ) -> Result<Expression, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = self.peek_type().and_then(operator) {
            self.advance();
            let right = operand(self)?;
            let span = left.span.extend(&right.span);
            left = Expression::new(
                ExpressionKind::BinOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let op = match self.peek_type() {
            Some(TokenType::Minus) => UnaryOp::Minus,
            Some(TokenType::Plus) => UnaryOp::Plus,
            Some(TokenType::Tilde) => UnaryOp::Invert,
            _ => return self.parse_call(),
        };

        let start = self.current_location();
        self.advance();

        // i64::MIN only exists negated
        if op == UnaryOp::Minus && self.peek_type() == Some(&TokenType::IntLiteral(i64::MIN.unsigned_abs())) {
            if let Some(token) = self.advance() {
                let span = SourceSpan::new(start, token.span.end);
                return Ok(Expression::new(ExpressionKind::Constant(Constant::Int(i64::MIN)), span));
            }
        }

        let operand = self.parse_unary()?;
        let span = SourceSpan::new(start, operand.span.end.clone());

        Ok(Expression::new(
            ExpressionKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// Postfix calls: `atom ( '(' args ')' )*`
    fn parse_call(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_atom()?;

        while self.match_token(&TokenType::LeftParen) {
            let mut args = Vec::new();
            if !self.check(&TokenType::RightParen) {
                loop {
                    args.push(self.parse_expression()?);
                    if !self.match_token(&TokenType::Comma) || self.check(&TokenType::RightParen) {
                        break;
                    }
                }
            }
            let close = self.expect(TokenType::RightParen, "function call")?;

            let span = SourceSpan::new(expr.span.start.clone(), close.span.end);
            expr = Expression::new(
                ExpressionKind::Call {
                    func: Box::new(expr),
                    args,
                },
                span,
            );
        }

        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expression, ParseError> {
        let token = match self.advance() {
            Some(token) => token,
            None => return Err(self.unexpected("expression")),
        };

        let kind = match token.token_type {
            TokenType::IntLiteral(magnitude) => match i64::try_from(magnitude) {
                Ok(value) => ExpressionKind::Constant(Constant::Int(value)),
                Err(_) => {
                    return Err(ParseError::InvalidExpression {
                        message: format!("integer literal {} does not fit in 64 bits", magnitude),
                        location: token.span.start,
                    })
                }
            },
            TokenType::True => ExpressionKind::Constant(Constant::Bool(true)),
            TokenType::False => ExpressionKind::Constant(Constant::Bool(false)),
            TokenType::StringLiteral(value) => ExpressionKind::Constant(Constant::Str(value)),
            TokenType::Identifier(id) => ExpressionKind::Name {
                id,
                ctx: NameContext::Load,
            },
            TokenType::LeftParen => {
                let inner = self.parse_expression()?;
                let close = self.expect(TokenType::RightParen, "parenthesized expression")?;
                let span = SourceSpan::new(token.span.start, close.span.end);
                return Ok(Expression::new(inner.kind, span));
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: token,
                })
            }
        };

        Ok(Expression::new(kind, token.span))
    }
}

fn compare_operator(token_type: &TokenType) -> Option<CompareOp> {
    let op = match token_type {
        TokenType::Less => CompareOp::Less,
        TokenType::LessEqual => CompareOp::LessEqual,
        TokenType::Greater => CompareOp::Greater,
        TokenType::GreaterEqual => CompareOp::GreaterEqual,
        TokenType::EqualEqual => CompareOp::Equal,
        TokenType::BangEqual => CompareOp::NotEqual,
        _ => return None,
    };
    Some(op)
}
