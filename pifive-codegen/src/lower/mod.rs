//! Lowering Engine
//!
//! Walks the AST once, in source order, emitting RISC-V through the
//! instruction sink. Every expression leaves exactly one 8-byte value on the
//! evaluation stack (the machine stack below the current frame); statements
//! pop what they consume.
//!
//! Variables live in registers while they are *active* and in their frame
//! slot otherwise. Before every control-flow join and before every call all
//! live registers are written back ("synchronised"), so the register state
//! known at compile time matches every runtime path into a label.

pub mod calls;
pub mod expressions;
pub mod functions;
pub mod statements;

use crate::abi::Frame;
use crate::asm::{AsmInst, Reg, RegClass};
use crate::regpool::RegisterPool;
use crate::scope::{ScopeArena, ScopeError, ScopeId, VarRef};
use crate::sink::InstructionSink;
use crate::CodegenOptions;
use log::debug;
use pifive_common::{CompilerError, SourceLocation};
use pifive_frontend::ast::Module;

/// Mutable state of one compilation
pub struct CodegenContext {
    pub pool: RegisterPool,
    pub scopes: ScopeArena,
    pub sink: InstructionSink,
    /// Innermost scope of the code being lowered
    pub current: ScopeId,
    /// Frames of the functions being lowered, innermost last
    pub frames: Vec<Frame>,
    /// `print` was used, so the format string must be emitted
    pub uses_print: bool,
    pub entry_point: String,
}

impl CodegenContext {
    pub fn new(options: &CodegenOptions) -> Self {
        let scopes = ScopeArena::new();
        Self {
            pool: RegisterPool::new(),
            current: scopes.global(),
            scopes,
            sink: InstructionSink::new(options.emit_comments),
            frames: Vec::new(),
            uses_print: false,
            entry_point: options.entry_point.clone(),
        }
    }

    /// Attach a source location to a scope lookup failure
    pub fn scope_error(err: ScopeError, location: &SourceLocation) -> CompilerError {
        match err {
            ScopeError::UndefinedVariable(name) => CompilerError::UndefinedName {
                kind: "variable",
                name,
                location: location.clone(),
            },
            ScopeError::UndefinedFunction(name) => CompilerError::UndefinedName {
                kind: "function",
                name,
                location: location.clone(),
            },
            ScopeError::DuplicateFunction(name) => CompilerError::DuplicateFunction {
                name,
                location: location.clone(),
            },
        }
    }

    /// Resolve a variable that code in the current frame can address
    pub fn resolve_local(&self, name: &str, location: &SourceLocation) -> Result<VarRef, CompilerError> {
        let var = self
            .scopes
            .resolve_variable(self.current, name)
            .map_err(|e| Self::scope_error(e, location))?;
        self.check_same_frame(var, location)?;
        Ok(var)
    }

    /// Define (or find) the binding a store to `name` writes to
    pub fn define_local(&mut self, name: &str, location: &SourceLocation) -> Result<VarRef, CompilerError> {
        let var = self.scopes.define_variable(self.current, name);
        self.check_same_frame(var, location)?;
        Ok(var)
    }

    /// Slots are `fp`-relative, so only variables of the current frame are addressable
    fn check_same_frame(&self, var: VarRef, location: &SourceLocation) -> Result<(), CompilerError> {
        let owner = self.scopes.scope(var.scope).function_root();
        let here = self.scopes.scope(self.current).function_root();
        if owner != here {
            return Err(CompilerError::unsupported(
                format!(
                    "variable '{}' belongs to the frame of '{}'",
                    self.scopes.variable(var).name,
                    self.scopes.scope(owner).name
                ),
                location.clone(),
            ));
        }
        Ok(())
    }

    /// A free temporary, spilling a variable if every temporary is bound
    pub fn allocate_temp(&mut self) -> Result<Reg, CompilerError> {
        if let Some(reg) = self.pool.allocate(RegClass::Temporary) {
            return Ok(reg);
        }

        if let Some(victim) = self.spill_candidate() {
            self.spill(victim);
        }

        self.pool
            .allocate(RegClass::Temporary)
            .ok_or_else(|| CompilerError::RegisterExhausted {
                class: RegClass::Temporary.to_string(),
            })
    }

    /// First active temporary-bound variable, outermost scope first
    fn spill_candidate(&self) -> Option<VarRef> {
        let chain = self.scopes.chain(self.current);
        chain.into_iter().rev().find_map(|scope| {
            self.scopes
                .scope(scope)
                .variables()
                .iter()
                .position(|v| matches!(v.active_reg().and_then(Reg::class), Some(RegClass::Temporary)))
                .map(|index| VarRef { scope, index })
        })
    }

    /// Write an active variable back to its slot and free its register
    pub fn spill(&mut self, var: VarRef) {
        let variable = self.scopes.variable(var);
        let Some(reg) = variable.active_reg() else {
            return;
        };
        let (name, slot) = (variable.name.clone(), variable.slot);

        debug!("spill '{}' from {} to slot {}", name, reg, slot);
        self.sink.comment(format!("spill {} from {}", name, reg));
        self.sink.store_slot(reg, slot);
        self.scopes.unbind(var, &mut self.pool);
    }

    /// Load an inactive variable from its slot into a fresh temporary
    pub fn reload(&mut self, var: VarRef) -> Result<Reg, CompilerError> {
        let reg = self.allocate_temp()?;
        let variable = self.scopes.variable(var);
        debug!("reload '{}' from slot {} into {}", variable.name, variable.slot, reg);
        self.sink.comment(format!("reload {} into {}", variable.name, reg));
        self.sink.load_slot(reg, variable.slot);
        self.scopes.bind(var, reg);
        Ok(reg)
    }

    /// Spill every active variable visible from the current scope
    pub fn synchronise(&mut self) {
        for var in self.scopes.active_variables(self.current) {
            self.spill(var);
        }
    }

    /// Pop the top of the evaluation stack into a fresh temporary
    pub fn pop_temp(&mut self) -> Result<Reg, CompilerError> {
        let reg = self.allocate_temp()?;
        self.sink.pop(reg);
        Ok(reg)
    }

    /// Enter a block scope, returning the scope to restore
    pub fn enter_block(&mut self) -> ScopeId {
        let outer = self.current;
        self.current = self.scopes.push_block_scope(outer);
        outer
    }

    /// Release the current block scope and return to `outer`. Names first
    /// bound in the block stay visible, inactive, in `outer`.
    pub fn leave_block(&mut self, outer: ScopeId) {
        self.release_current();
        self.scopes.hoist_variables(self.current);
        self.current = outer;
    }

    fn release_current(&mut self) {
        for (name, reg) in self.scopes.release_scope_registers(self.current, &mut self.pool) {
            self.sink.comment(format!("free {} ({})", reg, name));
        }
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

/// Lower a whole module into the text section
pub fn lower_module(ctx: &mut CodegenContext, module: &Module) -> Result<(), CompilerError> {
    ctx.sink.emit(AsmInst::Text);
    statements::lower_block(ctx, &module.body)
}
