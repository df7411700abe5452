//! Expression lowering
//!
//! Every function here leaves exactly one value on the evaluation stack.

use super::{calls, CodegenContext};
use crate::asm::{AsmInst, Reg};
use pifive_common::{CompilerError, SourceLocation};
use pifive_frontend::ast::{BinaryOp, CompareOp, Constant, Expression, ExpressionKind, UnaryOp};

pub fn lower_expression(ctx: &mut CodegenContext, expr: &Expression) -> Result<(), CompilerError> {
    let location = &expr.span.start;

    match &expr.kind {
        ExpressionKind::Constant(constant) => lower_constant(ctx, constant, location),

        ExpressionKind::Name { id, .. } => lower_name_load(ctx, id, location),

        ExpressionKind::BinOp { left, op, right } => {
            lower_expression(ctx, left)?;
            lower_expression(ctx, right)?;
            combine_binary(ctx, *op)
        }

        ExpressionKind::UnaryOp { op, operand } => lower_unary(ctx, *op, operand),

        ExpressionKind::Compare { left, ops, comparators } => {
            let (op, right) = match (ops.as_slice(), comparators.as_slice()) {
                ([op], [right]) => (*op, right),
                _ => {
                    return Err(CompilerError::malformed(
                        "chained comparisons are not supported",
                        location.clone(),
                    ))
                }
            };
            lower_expression(ctx, left)?;
            lower_expression(ctx, right)?;
            combine_compare(ctx, op)
        }

        ExpressionKind::Call { func, args } => calls::lower_call(ctx, func, args, location),
    }
}

fn lower_constant(ctx: &mut CodegenContext, constant: &Constant, location: &SourceLocation) -> Result<(), CompilerError> {
    match constant {
        Constant::Int(value) => lower_literal(ctx, *value),
        Constant::Bool(value) => lower_literal(ctx, i64::from(*value)),
        Constant::Str(_) => Err(CompilerError::unsupported("string literal", location.clone())),
    }
}

/// Materialize an immediate and push it
pub fn lower_literal(ctx: &mut CodegenContext, value: i64) -> Result<(), CompilerError> {
    let reg = ctx.allocate_temp()?;
    ctx.sink.load_immediate(reg, value);
    ctx.sink.push(reg);
    ctx.pool.free(reg);
    Ok(())
}

/// Push the value of a variable, loading it from its slot if needed.
/// The variable keeps its register afterwards.
pub fn lower_name_load(ctx: &mut CodegenContext, name: &str, location: &SourceLocation) -> Result<(), CompilerError> {
    let var = ctx.resolve_local(name, location)?;
    let reg = match ctx.scopes.variable(var).active_reg() {
        Some(reg) => reg,
        None => ctx.reload(var)?,
    };
    ctx.sink.push(reg);
    Ok(())
}

/// Pop right and left operands, apply `op`, push the result
pub fn combine_binary(ctx: &mut CodegenContext, op: BinaryOp) -> Result<(), CompilerError> {
    let right = ctx.pop_temp()?;
    let left = ctx.pop_temp()?;

    ctx.sink.comment(format!("{} ({})", op.describe(), op));
    ctx.sink.emit(binary_instruction(op, left, right));

    ctx.pool.free(right);
    ctx.sink.push(left);
    ctx.pool.free(left);
    Ok(())
}

fn binary_instruction(op: BinaryOp, rd: Reg, rs: Reg) -> AsmInst {
    match op {
        BinaryOp::Add => AsmInst::Add(rd, rd, rs),
        BinaryOp::Sub => AsmInst::Sub(rd, rd, rs),
        BinaryOp::Mul => AsmInst::Mul(rd, rd, rs),
        BinaryOp::Div | BinaryOp::FloorDiv => AsmInst::Div(rd, rd, rs),
        BinaryOp::Mod => AsmInst::Rem(rd, rd, rs),
        BinaryOp::BitAnd => AsmInst::And(rd, rd, rs),
        BinaryOp::BitOr => AsmInst::Or(rd, rd, rs),
        BinaryOp::BitXor => AsmInst::Xor(rd, rd, rs),
        BinaryOp::LeftShift => AsmInst::Sll(rd, rd, rs),
        BinaryOp::RightShift => AsmInst::Sra(rd, rd, rs),
    }
}

fn lower_unary(ctx: &mut CodegenContext, op: UnaryOp, operand: &Expression) -> Result<(), CompilerError> {
    // -N is a single immediate
    if let (UnaryOp::Minus, ExpressionKind::Constant(Constant::Int(value))) = (op, &operand.kind) {
        return lower_literal(ctx, value.wrapping_neg());
    }

    lower_expression(ctx, operand)?;
    if op == UnaryOp::Plus {
        return Ok(());
    }

    let reg = ctx.pop_temp()?;
    match op {
        UnaryOp::Minus => ctx.sink.emit(AsmInst::Neg(reg, reg)),
        UnaryOp::Invert => ctx.sink.emit(AsmInst::Not(reg, reg)),
        UnaryOp::Plus => {}
    }
    ctx.sink.push(reg);
    ctx.pool.free(reg);
    Ok(())
}

/// Pop right and left operands and push 1 if `left op right` holds, else 0
pub fn combine_compare(ctx: &mut CodegenContext, op: CompareOp) -> Result<(), CompilerError> {
    let right = ctx.pop_temp()?;
    let left = ctx.pop_temp()?;
    let result = ctx.allocate_temp()?;
    let label = ctx.scopes.next_label(ctx.current, "cmp");

    ctx.sink.comment(format!("compare: {} ({})", op.describe(), op));
    ctx.sink.load_immediate(result, 1);
    ctx.sink.emit(branch_instruction(op, left, right, label.clone()));
    ctx.pool.free(right);
    ctx.pool.free(left);
    ctx.sink.load_immediate(result, 0);
    ctx.sink.label(&label);

    ctx.sink.push(result);
    ctx.pool.free(result);
    Ok(())
}

fn branch_instruction(op: CompareOp, rs1: Reg, rs2: Reg, label: String) -> AsmInst {
    match op {
        CompareOp::Less => AsmInst::Blt(rs1, rs2, label),
        CompareOp::LessEqual => AsmInst::Ble(rs1, rs2, label),
        CompareOp::Greater => AsmInst::Bgt(rs1, rs2, label),
        CompareOp::GreaterEqual => AsmInst::Bge(rs1, rs2, label),
        CompareOp::Equal => AsmInst::Beq(rs1, rs2, label),
        CompareOp::NotEqual => AsmInst::Bne(rs1, rs2, label),
    }
}
