//! Statement parsing
//!
//! A logical line is either one compound statement (`def`, `if`, `while`)
//! or a `;`-separated list of simple statements ended by `Newline`.

use super::{ParseError, Parser};
use crate::ast::*;
use crate::lexer::TokenType;
use pifive_common::{SourceLocation, SourceSpan};

impl Parser {
    /// Parse one logical line, which may hold several simple statements
    pub fn parse_statement_line(&mut self) -> Result<Vec<Statement>, ParseError> {
        match self.peek_type() {
            Some(TokenType::Def) => Ok(vec![self.parse_function_def()?]),
            Some(TokenType::If) => Ok(vec![self.parse_if_statement()?]),
            Some(TokenType::While) => Ok(vec![self.parse_while_statement()?]),
            Some(TokenType::Indent) => Err(self.unexpected("statement (unexpected indent)")),
            _ => self.parse_simple_statements(),
        }
    }

    /// simple_stmt (';' simple_stmt)* [';'] NEWLINE
    fn parse_simple_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![self.parse_simple_statement()?];

        while self.match_token(&TokenType::Semicolon) {
            if self.check(&TokenType::Newline) {
                break;
            }
            statements.push(self.parse_simple_statement()?);
        }

        self.expect(TokenType::Newline, "end of statement")?;
        Ok(statements)
    }

    fn parse_simple_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();

        match self.peek_type() {
            Some(TokenType::Pass) => {
                let token = self.expect(TokenType::Pass, "pass statement")?;
                Ok(Statement::new(StatementKind::Pass, token.span))
            }
            Some(TokenType::Return) => {
                let token = self.expect(TokenType::Return, "return statement")?;
                if self.check(&TokenType::Newline) || self.check(&TokenType::Semicolon) {
                    return Ok(Statement::new(StatementKind::Return(None), token.span));
                }
                let value = self.parse_expression()?;
                let span = SourceSpan::new(start, value.span.end.clone());
                Ok(Statement::new(StatementKind::Return(Some(value)), span))
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// Expression statement, assignment or augmented assignment
    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let first = self.parse_expression()?;

        if let Some(op) = self.peek_type().and_then(augmented_operator) {
            self.advance();
            let target = into_store_target(first)?;
            let value = self.parse_expression()?;
            let span = target.span.extend(&value.span);
            return Ok(Statement::new(StatementKind::AugAssign { target, op, value }, span));
        }

        if !self.check(&TokenType::Equal) {
            let span = first.span.clone();
            return Ok(Statement::new(StatementKind::Expr(first), span));
        }

        // a = b = ... = value: every expression but the last is a target
        let mut targets = Vec::new();
        let mut value = first;
        while self.match_token(&TokenType::Equal) {
            targets.push(into_store_target(value)?);
            value = self.parse_expression()?;
        }

        let span = targets[0].span.extend(&value.span);
        Ok(Statement::new(StatementKind::Assign { targets, value }, span))
    }

    /// Parse the suite after a ':'
    fn parse_block(&mut self, context: &str) -> Result<Vec<Statement>, ParseError> {
        self.expect(TokenType::Colon, context)?;

        if !self.match_token(&TokenType::Newline) {
            return self.parse_simple_statements();
        }

        self.expect(TokenType::Indent, context)?;
        let mut body = Vec::new();
        while !self.check(&TokenType::Dedent) && !self.check(&TokenType::EndOfFile) {
            body.extend(self.parse_statement_line()?);
        }
        self.expect(TokenType::Dedent, context)?;

        Ok(body)
    }

    fn parse_function_def(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect(TokenType::Def, "function definition")?.span.start;
        let (name, _) = self.expect_identifier("function definition")?;

        self.expect(TokenType::LeftParen, "parameter list")?;
        let mut params = Vec::new();
        if !self.check(&TokenType::RightParen) {
            loop {
                let (param, _) = self.expect_identifier("parameter list")?;
                params.push(param);
                if !self.match_token(&TokenType::Comma) || self.check(&TokenType::RightParen) {
                    break;
                }
            }
        }
        self.expect(TokenType::RightParen, "parameter list")?;

        let body = self.parse_block("function definition")?;
        let span = block_span(start, &body);

        Ok(Statement::new(
            StatementKind::FunctionDef(FunctionDef { name, params, body }),
            span,
        ))
    }

    /// `if`, and the `elif` continuation of an if chain
    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        if !self.match_token(&TokenType::If) && !self.match_token(&TokenType::Elif) {
            return Err(self.unexpected("'if' or 'elif'"));
        }

        let test = self.parse_expression()?;
        let body = self.parse_block("if statement")?;

        let orelse = if self.check(&TokenType::Elif) {
            vec![self.parse_if_statement()?]
        } else if self.match_token(&TokenType::Else) {
            self.parse_block("else clause")?
        } else {
            Vec::new()
        };

        let span = block_span(start, if orelse.is_empty() { &body } else { &orelse });
        Ok(Statement::new(StatementKind::If { test, body, orelse }, span))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect(TokenType::While, "while statement")?.span.start;
        let test = self.parse_expression()?;
        let body = self.parse_block("while statement")?;

        let span = block_span(start, &body);
        Ok(Statement::new(StatementKind::While { test, body }, span))
    }
}

fn augmented_operator(token_type: &TokenType) -> Option<BinaryOp> {
    let op = match token_type {
        TokenType::PlusEqual => BinaryOp::Add,
        TokenType::MinusEqual => BinaryOp::Sub,
        TokenType::StarEqual => BinaryOp::Mul,
        TokenType::SlashEqual => BinaryOp::Div,
        TokenType::SlashSlashEqual => BinaryOp::FloorDiv,
        TokenType::PercentEqual => BinaryOp::Mod,
        TokenType::AmpersandEqual => BinaryOp::BitAnd,
        TokenType::PipeEqual => BinaryOp::BitOr,
        TokenType::CaretEqual => BinaryOp::BitXor,
        TokenType::LeftShiftEqual => BinaryOp::LeftShift,
        TokenType::RightShiftEqual => BinaryOp::RightShift,
        _ => return None,
    };
    Some(op)
}

/// Only plain names can be assigned to
fn into_store_target(expr: Expression) -> Result<Expression, ParseError> {
    match expr.kind {
        ExpressionKind::Name { id, .. } => Ok(Expression::new(
            ExpressionKind::Name { id, ctx: NameContext::Store },
            expr.span,
        )),
        _ => Err(ParseError::InvalidExpression {
            message: "cannot assign to expression".to_string(),
            location: expr.span.start,
        }),
    }
}

fn block_span(start: SourceLocation, body: &[Statement]) -> SourceSpan {
    match body.last() {
        Some(last) => SourceSpan::new(start, last.span.end.clone()),
        None => SourceSpan::from_location(start),
    }
}
