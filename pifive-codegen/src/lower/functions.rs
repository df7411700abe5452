//! Function definition lowering and frame sizing

use super::statements::lower_block;
use super::CodegenContext;
use crate::abi::{CallingConvention, Frame};
use crate::asm::RegClass;
use crate::scope::{FunctionSymbol, Parameter, ScopeId};
use log::{debug, trace};
use pifive_common::{CompilerError, SourceLocation};
use pifive_frontend::ast::{FunctionDef, Statement, StatementKind};
use std::collections::HashSet;

/// Number of frame slots a function needs: its parameters plus every
/// distinct name stored in its body (nested `if`/`while` bodies included,
/// nested function bodies excluded) that `is_resolvable` does not know.
pub fn count_locals(def: &FunctionDef, is_resolvable: impl Fn(&str) -> bool) -> usize {
    let mut stored = Vec::new();
    collect_stored_names(&def.body, &mut stored);

    let params: HashSet<&str> = def.params.iter().map(String::as_str).collect();
    let locals: HashSet<&str> = stored
        .into_iter()
        .filter(|&name| !params.contains(name) && !is_resolvable(name))
        .collect();

    def.params.len() + locals.len()
}

fn collect_stored_names<'a>(body: &'a [Statement], out: &mut Vec<&'a str>) {
    for stmt in body {
        match &stmt.kind {
            StatementKind::Assign { targets, .. } => {
                out.extend(targets.iter().filter_map(|t| t.as_name()));
            }
            StatementKind::AugAssign { target, .. } => out.extend(target.as_name()),
            StatementKind::If { body, orelse, .. } => {
                collect_stored_names(body, out);
                collect_stored_names(orelse, out);
            }
            StatementKind::While { body, .. } => collect_stored_names(body, out),
            StatementKind::FunctionDef(_)
            | StatementKind::Return(_)
            | StatementKind::Expr(_)
            | StatementKind::Pass => {}
        }
    }
}

/// Module-level functions keep their name; any other definition is
/// qualified as `{enclosing scope}_{name}_sc_{scope ordinal}`
fn function_label(ctx: &CodegenContext, outer: ScopeId, scope: ScopeId, name: &str) -> String {
    if outer == ctx.scopes.global() {
        name.to_string()
    } else {
        format!("{}_{}_sc_{}", ctx.scopes.scope(outer).name, name, scope.index())
    }
}

pub fn lower_function_def(
    ctx: &mut CodegenContext,
    def: &FunctionDef,
    location: &SourceLocation,
) -> Result<(), CompilerError> {
    CallingConvention::check_param_count(def.params.len())
        .map_err(|e| CompilerError::unsupported(format!("function '{}': {}", def.name, e), location.clone()))?;

    let mut seen = HashSet::new();
    if let Some(dup) = def.params.iter().find(|p| !seen.insert(p.as_str())) {
        return Err(CompilerError::malformed(
            format!("duplicate parameter '{}' in function '{}'", dup, def.name),
            location.clone(),
        ));
    }

    let outer = ctx.current;
    let slots = count_locals(def, |name| ctx.scopes.resolve_variable(outer, name).is_ok());
    let frame = Frame::new(slots)
        .map_err(|e| CompilerError::unsupported(format!("function '{}': {}", def.name, e), location.clone()))?;
    debug!("lowering function {} ({} slot(s), {} byte frame)", def.name, slots, frame.size);

    // No register of the enclosing code survives the definition
    ctx.synchronise();

    // A definition nested in a function body is jumped over
    let skip_label = if ctx.frames.is_empty() {
        None
    } else {
        let label = ctx.scopes.next_label(outer, "enddef");
        ctx.sink.jump(&label);
        Some(label)
    };

    let mut params = Vec::with_capacity(def.params.len());
    for name in &def.params {
        let reg = ctx
            .pool
            .allocate(RegClass::Argument)
            .ok_or_else(|| CompilerError::RegisterExhausted {
                class: RegClass::Argument.to_string(),
            })?;
        params.push(Parameter { name: name.clone(), reg });
    }

    let scope = ctx.scopes.push_function_scope(outer, &def.name);
    let label = function_label(ctx, outer, scope, &def.name);

    let symbol = FunctionSymbol {
        name: def.name.clone(),
        label: label.clone(),
        params: params.clone(),
        ret: CallingConvention::RETURN_REG,
    };
    ctx.scopes
        .define_function(outer, symbol)
        .map_err(|e| CodegenContext::scope_error(e, location))?;

    for param in &params {
        ctx.scopes.declare_parameter(scope, &param.name, param.reg);
        trace!("parameter {} of {} in {}", param.name, def.name, param.reg);
    }
    ctx.current = scope;
    ctx.frames.push(frame.clone());

    ctx.sink.function_header(&label);
    ctx.sink.prologue(&frame);
    lower_block(ctx, &def.body)?;
    if !def.body.last().is_some_and(Statement::is_return) {
        ctx.sink.comment("implicit return 0");
        ctx.sink.load_immediate(CallingConvention::RETURN_REG, 0);
        ctx.sink.epilogue(&frame);
    }

    ctx.release_current();
    ctx.frames.pop();
    ctx.current = outer;
    ctx.sink.function_footer(&label);
    if let Some(label) = skip_label {
        ctx.sink.label(&label);
    }
    trace!("registers in use after {}: {:?}", def.name, ctx.pool.in_use());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pifive_common::SourceSpan;
    use pifive_frontend::ast::{Constant, Expression, ExpressionKind, NameContext};

    fn store(name: &str) -> Statement {
        let target = Expression::new(
            ExpressionKind::Name { id: name.to_string(), ctx: NameContext::Store },
            SourceSpan::dummy(),
        );
        let value = Expression::new(ExpressionKind::Constant(Constant::Int(1)), SourceSpan::dummy());
        Statement::new(StatementKind::Assign { targets: vec![target], value }, SourceSpan::dummy())
    }

    fn def(name: &str, params: &[&str], body: Vec<Statement>) -> FunctionDef {
        FunctionDef {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
        }
    }

    #[test]
    fn test_count_locals_params_and_distinct_stores() {
        let f = def("f", &["n"], vec![store("a"), store("b"), store("a"), store("n")]);
        assert_eq!(count_locals(&f, |_| false), 3);
    }

    #[test]
    fn test_count_locals_descends_into_blocks_not_defs() {
        let test = Expression::new(ExpressionKind::Constant(Constant::Bool(true)), SourceSpan::dummy());
        let nested_if = Statement::new(
            StatementKind::If { test: test.clone(), body: vec![store("x")], orelse: vec![store("y")] },
            SourceSpan::dummy(),
        );
        let nested_while = Statement::new(
            StatementKind::While { test, body: vec![store("x"), store("z")] },
            SourceSpan::dummy(),
        );
        let nested_def = Statement::new(
            StatementKind::FunctionDef(def("g", &[], vec![store("hidden")])),
            SourceSpan::dummy(),
        );
        let f = def("f", &[], vec![nested_if, nested_while, nested_def]);
        assert_eq!(count_locals(&f, |_| false), 3);
    }

    #[test]
    fn test_count_locals_skips_resolvable_names() {
        let f = def("f", &[], vec![store("g"), store("local")]);
        assert_eq!(count_locals(&f, |name| name == "g"), 1);
    }
}
