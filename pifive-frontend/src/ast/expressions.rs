//! Expression AST nodes

use super::ops::{BinaryOp, CompareOp, UnaryOp};
use pifive_common::SourceSpan;
use serde::{Deserialize, Serialize};

/// Whether a name is read or bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameContext {
    Load,
    Store,
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Constant(Constant),

    Name {
        id: String,
        ctx: NameContext,
    },

    BinOp {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },

    UnaryOp {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// `left ops[0] comparators[0] ops[1] comparators[1] ...`
    Compare {
        left: Box<Expression>,
        ops: Vec<CompareOp>,
        comparators: Vec<Expression>,
    },

    Call {
        func: Box<Expression>,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    /// Name of a plain `Name` node
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Name { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Callee name of a call whose callee is a plain name
    pub fn called_name(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Call { func, .. } => func.as_name(),
            _ => None,
        }
    }
}
