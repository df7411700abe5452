//! Operator definitions
//!
//! Binary, unary and comparison operators, with their source spelling
//! (`Display`) and a descriptive name used in assembly comments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add, Sub, Mul, Div, FloorDiv, Mod,

    // Bitwise
    BitAnd, BitOr, BitXor, LeftShift, RightShift,
}

impl BinaryOp {
    /// Human readable name of the operation
    pub fn describe(&self) -> &'static str {
        match self {
            BinaryOp::Add => "addition",
            BinaryOp::Sub => "subtraction",
            BinaryOp::Mul => "multiplication",
            BinaryOp::Div => "division",
            BinaryOp::FloorDiv => "floor division",
            BinaryOp::Mod => "remainder",
            BinaryOp::BitAnd => "bitwise and",
            BinaryOp::BitOr => "bitwise or",
            BinaryOp::BitXor => "bitwise xor",
            BinaryOp::LeftShift => "left shift",
            BinaryOp::RightShift => "right shift",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
        };
        write!(f, "{}", op_str)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus, Minus, Invert,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Invert => "~",
        };
        write!(f, "{}", op_str)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Less, LessEqual, Greater, GreaterEqual, Equal, NotEqual,
}

impl CompareOp {
    /// Human readable name of the comparison
    pub fn describe(&self) -> &'static str {
        match self {
            CompareOp::Less => "less than",
            CompareOp::LessEqual => "less than or equal",
            CompareOp::Greater => "greater than",
            CompareOp::GreaterEqual => "greater than or equal",
            CompareOp::Equal => "equal",
            CompareOp::NotEqual => "not equal",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        };
        write!(f, "{}", op_str)
    }
}
