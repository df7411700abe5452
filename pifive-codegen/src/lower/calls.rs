//! Call lowering
//!
//! Arguments are evaluated right to left onto the evaluation stack, then
//! popped left to right into the callee's parameter registers. Variables in
//! registers a callee may clobber are spilled before the pops and reloaded
//! into fresh temporaries after the call.

use super::expressions::lower_expression;
use super::CodegenContext;
use crate::abi::CallingConvention;
use crate::asm::{AsmInst, Reg};
use crate::scope::VarRef;
use log::debug;
use pifive_common::{CompilerError, SourceLocation};
use pifive_frontend::ast::Expression;

/// Name of the print intrinsic
pub const PRINT_INTRINSIC: &str = "print";
/// Runtime routine `print` lowers to
pub const PRINT_ROUTINE: &str = "printf";
/// Label of the `"%ld\n"` format string
pub const PRINT_FORMAT_LABEL: &str = "print_fmt";

pub fn lower_call(
    ctx: &mut CodegenContext,
    func: &Expression,
    args: &[Expression],
    location: &SourceLocation,
) -> Result<(), CompilerError> {
    let name = func
        .as_name()
        .ok_or_else(|| CompilerError::unsupported("call of a non-name expression", location.clone()))?;

    if name == PRINT_INTRINSIC {
        return lower_print(ctx, args, location);
    }

    let symbol = ctx
        .scopes
        .resolve_function(ctx.current, name)
        .map_err(|e| CodegenContext::scope_error(e, location))?
        .clone();

    if args.len() != symbol.arity() {
        return Err(CompilerError::ArityMismatch {
            expected: symbol.arity(),
            name: symbol.name,
            found: args.len(),
            location: location.clone(),
        });
    }

    for arg in args.iter().rev() {
        lower_expression(ctx, arg)?;
    }

    debug!("call {} with {} argument(s)", symbol.name, args.len());
    let spilled = spill_caller_clobbered(ctx);

    let param_regs: Vec<Reg> = symbol.params.iter().map(|p| p.reg).collect();
    for param in &symbol.params {
        ctx.sink.comment(format!("argument {} in {}", param.name, param.reg));
    }
    pop_into_fixed(ctx, &param_regs)?;
    ctx.sink.call(&symbol.label);
    release_fixed(ctx, &param_regs);

    reload_all(ctx, &spilled)?;
    ctx.sink.push(symbol.ret);
    Ok(())
}

/// `print(e)`: `printf("%ld\n", e)`, evaluating to 0
fn lower_print(ctx: &mut CodegenContext, args: &[Expression], location: &SourceLocation) -> Result<(), CompilerError> {
    let [arg] = args else {
        return Err(CompilerError::ArityMismatch {
            name: PRINT_INTRINSIC.to_string(),
            expected: 1,
            found: args.len(),
            location: location.clone(),
        });
    };

    lower_expression(ctx, arg)?;
    let spilled = spill_caller_clobbered(ctx);

    ctx.sink.comment("print");
    pop_into_fixed(ctx, &[Reg::A1])?;
    ctx.sink.emit(AsmInst::La(CallingConvention::RETURN_REG, PRINT_FORMAT_LABEL.to_string()));
    ctx.sink.call(PRINT_ROUTINE);
    release_fixed(ctx, &[Reg::A1]);
    ctx.uses_print = true;

    reload_all(ctx, &spilled)?;
    ctx.sink.push(Reg::Zero);
    Ok(())
}

/// Spill every active variable a callee may clobber, in chain order
fn spill_caller_clobbered(ctx: &mut CodegenContext) -> Vec<VarRef> {
    let victims: Vec<VarRef> = ctx
        .scopes
        .active_variables(ctx.current)
        .into_iter()
        .filter(|&var| {
            ctx.scopes
                .variable(var)
                .active_reg()
                .is_some_and(CallingConvention::is_caller_clobbered)
        })
        .collect();

    for &var in &victims {
        ctx.spill(var);
    }
    victims
}

/// Pop successive stack values into the given registers, holding them
/// until `release_fixed`
fn pop_into_fixed(ctx: &mut CodegenContext, regs: &[Reg]) -> Result<(), CompilerError> {
    for &reg in regs {
        if !ctx.pool.take(reg) {
            return Err(CompilerError::InternalError {
                message: format!("argument register {} is still bound at a call", reg),
            });
        }
        ctx.sink.pop(reg);
    }
    Ok(())
}

fn release_fixed(ctx: &mut CodegenContext, regs: &[Reg]) {
    for &reg in regs {
        ctx.pool.free(reg);
    }
}

fn reload_all(ctx: &mut CodegenContext, vars: &[VarRef]) -> Result<(), CompilerError> {
    for &var in vars {
        ctx.reload(var)?;
    }
    Ok(())
}
