//! Statement AST nodes, function definitions and the module root

use super::expressions::Expression;
use super::ops::BinaryOp;
use pifive_common::SourceSpan;
use serde::{Deserialize, Serialize};

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<Statement>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    FunctionDef(FunctionDef),

    Return(Option<Expression>),

    /// `t1 = t2 = ... = value`
    Assign {
        targets: Vec<Expression>,
        value: Expression,
    },

    /// `target op= value`
    AugAssign {
        target: Expression,
        op: BinaryOp,
        value: Expression,
    },

    /// `elif` chains are nested `If` nodes in `orelse`
    If {
        test: Expression,
        body: Vec<Statement>,
        orelse: Vec<Statement>,
    },

    While {
        test: Expression,
        body: Vec<Statement>,
    },

    Expr(Expression),

    Pass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
}

impl Statement {
    pub fn new(kind: StatementKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    pub fn is_return(&self) -> bool {
        matches!(self.kind, StatementKind::Return(_))
    }
}
