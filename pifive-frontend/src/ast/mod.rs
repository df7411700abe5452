//! Abstract Syntax Tree definitions for the Python subset
//!
//! The node set is closed: every construct the parser can produce is a
//! variant of `StatementKind` or `ExpressionKind`, so the code generator
//! matches exhaustively instead of dispatching on node names at runtime.
//! Shapes the generator rejects (several assignment targets, chained
//! comparisons, non-name callees) are still representable so they can be
//! reported with a location.

pub mod ops;
pub mod expressions;
pub mod statements;

pub use ops::{BinaryOp, CompareOp, UnaryOp};
pub use expressions::{Constant, Expression, ExpressionKind, NameContext};
pub use statements::{FunctionDef, Module, Statement, StatementKind};
