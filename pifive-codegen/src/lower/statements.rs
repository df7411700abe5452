//! Statement and control-flow lowering

use super::expressions::{combine_binary, lower_expression, lower_name_load};
use super::{functions, CodegenContext};
use crate::abi::CallingConvention;
use crate::scope::VarRef;
use pifive_common::{CompilerError, SourceLocation};
use pifive_frontend::ast::{BinaryOp, Expression, Statement, StatementKind};

pub fn lower_block(ctx: &mut CodegenContext, body: &[Statement]) -> Result<(), CompilerError> {
    for stmt in body {
        lower_statement(ctx, stmt)?;
    }
    Ok(())
}

pub fn lower_statement(ctx: &mut CodegenContext, stmt: &Statement) -> Result<(), CompilerError> {
    let location = &stmt.span.start;

    match &stmt.kind {
        StatementKind::FunctionDef(def) => functions::lower_function_def(ctx, def, location),
        StatementKind::Return(value) => lower_return(ctx, value.as_ref(), location),
        StatementKind::Assign { targets, value } => lower_assign(ctx, targets, value, location),
        StatementKind::AugAssign { target, op, value } => lower_aug_assign(ctx, target, *op, value, location),
        StatementKind::If { test, body, orelse } => lower_if(ctx, test, body, orelse),
        StatementKind::While { test, body } => lower_while(ctx, test, body),
        StatementKind::Expr(expr) => lower_expression_statement(ctx, expr),
        StatementKind::Pass => Ok(()),
    }
}

fn target_name<'a>(target: &'a Expression, location: &SourceLocation) -> Result<&'a str, CompilerError> {
    target
        .as_name()
        .ok_or_else(|| CompilerError::malformed("assignment target must be a name", location.clone()))
}

/// Pop the evaluation stack into the register of `var`, binding one if needed
fn pop_into_variable(ctx: &mut CodegenContext, var: VarRef) -> Result<(), CompilerError> {
    let reg = match ctx.scopes.variable(var).active_reg() {
        Some(reg) => reg,
        None => ctx.allocate_temp()?,
    };
    ctx.sink.comment(format!("assign {} in {}", ctx.scopes.variable(var).name, reg));
    ctx.sink.pop(reg);
    ctx.scopes.bind(var, reg);
    Ok(())
}

fn lower_assign(
    ctx: &mut CodegenContext,
    targets: &[Expression],
    value: &Expression,
    location: &SourceLocation,
) -> Result<(), CompilerError> {
    let [target] = targets else {
        return Err(CompilerError::malformed("multiple assignment targets", location.clone()));
    };
    let name = target_name(target, location)?;

    let var = ctx.define_local(name, location)?;
    lower_expression(ctx, value)?;
    pop_into_variable(ctx, var)
}

fn lower_aug_assign(
    ctx: &mut CodegenContext,
    target: &Expression,
    op: BinaryOp,
    value: &Expression,
    location: &SourceLocation,
) -> Result<(), CompilerError> {
    let name = target_name(target, location)?;

    let var = ctx.resolve_local(name, location)?;
    lower_name_load(ctx, name, location)?;
    lower_expression(ctx, value)?;
    combine_binary(ctx, op)?;
    pop_into_variable(ctx, var)
}

fn lower_if(
    ctx: &mut CodegenContext,
    test: &Expression,
    body: &[Statement],
    orelse: &[Statement],
) -> Result<(), CompilerError> {
    let else_label = ctx.scopes.next_label(ctx.current, "else");

    lower_expression(ctx, test)?;
    ctx.synchronise();
    let cond = ctx.pop_temp()?;
    ctx.sink.branch_if_zero(cond, &else_label);
    ctx.pool.free(cond);

    let outer = ctx.enter_block();
    lower_block(ctx, body)?;
    ctx.synchronise();
    ctx.leave_block(outer);

    let outer = ctx.enter_block();
    if orelse.is_empty() {
        ctx.sink.label(&else_label);
    } else {
        let end_label = ctx.scopes.next_label(outer, "endif");
        ctx.sink.jump(&end_label);
        ctx.sink.label(&else_label);
        lower_block(ctx, orelse)?;
        ctx.synchronise();
        ctx.sink.label(&end_label);
    }
    ctx.leave_block(outer);
    Ok(())
}

fn lower_while(ctx: &mut CodegenContext, test: &Expression, body: &[Statement]) -> Result<(), CompilerError> {
    let outer = ctx.enter_block();
    let top_label = ctx.scopes.next_label(ctx.current, "while");
    let break_label = ctx.scopes.next_label(ctx.current, "break");

    ctx.synchronise();
    ctx.sink.label(&top_label);
    lower_expression(ctx, test)?;
    let cond = ctx.pop_temp()?;
    ctx.sink.branch_if_zero(cond, &break_label);
    ctx.pool.free(cond);

    lower_block(ctx, body)?;
    ctx.synchronise();
    ctx.sink.jump(&top_label);
    ctx.sink.label(&break_label);

    ctx.leave_block(outer);
    Ok(())
}

fn lower_return(
    ctx: &mut CodegenContext,
    value: Option<&Expression>,
    location: &SourceLocation,
) -> Result<(), CompilerError> {
    let frame = ctx
        .current_frame()
        .cloned()
        .ok_or_else(|| CompilerError::malformed("'return' outside function", location.clone()))?;

    match value {
        Some(expr) => {
            lower_expression(ctx, expr)?;
            ctx.sink.pop(CallingConvention::RETURN_REG);
        }
        None => ctx.sink.load_immediate(CallingConvention::RETURN_REG, 0),
    }
    ctx.sink.epilogue(&frame);
    Ok(())
}

fn lower_expression_statement(ctx: &mut CodegenContext, expr: &Expression) -> Result<(), CompilerError> {
    if expr.called_name() == Some(ctx.entry_point.as_str()) {
        ctx.sink.comment(format!("call to entry point {} omitted", ctx.entry_point));
        return Ok(());
    }

    lower_expression(ctx, expr)?;
    ctx.sink.pop(CallingConvention::RETURN_REG);
    Ok(())
}
