//! Scope and Symbol Table
//!
//! Scopes live in an arena and refer to their parent by index. Function
//! scopes own the frame slot table of their function; block scopes (the
//! arms of an `if`, the body of a `while`) share it and only bound the
//! liveness of the variables first bound inside them. When a block ends its
//! variables move to the enclosing scope, inactive, and live on until the
//! function ends.
//!
//! Name resolution always walks the whole chain, so a store inside a block
//! to a name bound further out writes through to that binding.

use crate::asm::Reg;
use crate::regpool::RegisterPool;
use log::trace;
use std::collections::HashMap;
use thiserror::Error;

/// Name of the module-level scope
pub const GLOBAL_SCOPE_NAME: &str = "global";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("undefined function '{0}'")]
    UndefinedFunction(String),

    #[error("function '{0}' is already defined in this scope")]
    DuplicateFunction(String),
}

/// Index of a scope in the arena; doubles as the scope ordinal in labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A variable binding, addressed by owning scope and position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub scope: ScopeId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub declared_type: Option<String>,
    /// Last register the value lived in
    pub reg: Option<Reg>,
    /// `reg` currently holds the live value
    pub active: bool,
    /// Frame slot index, see `Frame::slot_offset`
    pub slot: usize,
}

impl Variable {
    /// Register holding the live value, if any
    pub fn active_reg(&self) -> Option<Reg> {
        if self.active {
            self.reg
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub reg: Reg,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub name: String,
    /// Assembly label of the entry point
    pub label: String,
    pub params: Vec<Parameter>,
    pub ret: Reg,
}

impl FunctionSymbol {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    /// Function (or global) scope whose frame this scope lives in
    function_root: ScopeId,
    variables: Vec<Variable>,
    variable_index: HashMap<String, usize>,
    functions: HashMap<String, FunctionSymbol>,
    label_serial: usize,
    /// Per-name slot table, only populated on function roots
    frame_slots: HashMap<String, usize>,
}

impl Scope {
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn function_root(&self) -> ScopeId {
        self.function_root
    }
}

#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Arena holding only the global scope
    pub fn new() -> Self {
        let global = Scope {
            name: GLOBAL_SCOPE_NAME.to_string(),
            parent: None,
            function_root: ScopeId(0),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            functions: HashMap::new(),
            label_serial: 0,
            frame_slots: HashMap::new(),
        };
        Self { scopes: vec![global] }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    fn push_scope(&mut self, name: String, parent: ScopeId, function_root: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name,
            parent: Some(parent),
            function_root: function_root.unwrap_or(id),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            functions: HashMap::new(),
            label_serial: 0,
            frame_slots: HashMap::new(),
        });
        trace!("scope: created {} ({})", id.0, self.scopes[id.0].name);
        id
    }

    /// New function scope with its own frame
    pub fn push_function_scope(&mut self, parent: ScopeId, name: &str) -> ScopeId {
        self.push_scope(name.to_string(), parent, None)
    }

    /// New block scope sharing the name and frame of `parent`
    pub fn push_block_scope(&mut self, parent: ScopeId) -> ScopeId {
        let name = self.scopes[parent.0].name.clone();
        let root = self.scopes[parent.0].function_root;
        self.push_scope(name, parent, Some(root))
    }

    /// Scopes from `scope` out to the global scope
    pub fn chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            chain.push(id);
            current = self.scopes[id.0].parent;
        }
        chain
    }

    pub fn variable(&self, var: VarRef) -> &Variable {
        &self.scopes[var.scope.0].variables[var.index]
    }

    pub fn variable_mut(&mut self, var: VarRef) -> &mut Variable {
        &mut self.scopes[var.scope.0].variables[var.index]
    }

    /// Slot of `name` in the frame `scope` belongs to, assigned on first use
    fn frame_slot(&mut self, scope: ScopeId, name: &str) -> usize {
        let root_id = self.scopes[scope.0].function_root;
        let root = &mut self.scopes[root_id.0];
        let next = root.frame_slots.len();
        *root.frame_slots.entry(name.to_string()).or_insert(next)
    }

    /// Number of slots handed out in the frame `scope` belongs to
    pub fn frame_slot_count(&self, scope: ScopeId) -> usize {
        self.scopes[self.scopes[scope.0].function_root.0].frame_slots.len()
    }

    fn insert_variable(&mut self, scope: ScopeId, name: &str, reg: Option<Reg>) -> VarRef {
        let slot = self.frame_slot(scope, name);
        let owner = &mut self.scopes[scope.0];
        let index = owner.variables.len();
        owner.variables.push(Variable {
            name: name.to_string(),
            declared_type: None,
            reg,
            active: reg.is_some(),
            slot,
        });
        owner.variable_index.insert(name.to_string(), index);
        VarRef { scope, index }
    }

    /// Existing binding visible from `scope`, or a new one owned by `scope`
    pub fn define_variable(&mut self, scope: ScopeId, name: &str) -> VarRef {
        if let Ok(var) = self.resolve_variable(scope, name) {
            return var;
        }
        let var = self.insert_variable(scope, name, None);
        trace!("scope: defined '{}' in {} (slot {})", name, scope.0, self.variable(var).slot);
        var
    }

    /// Parameters always bind in `scope`, shadowing outer names
    pub fn declare_parameter(&mut self, scope: ScopeId, name: &str, reg: Reg) -> VarRef {
        self.insert_variable(scope, name, Some(reg))
    }

    pub fn resolve_variable(&self, scope: ScopeId, name: &str) -> Result<VarRef, ScopeError> {
        for id in self.chain(scope) {
            if let Some(&index) = self.scopes[id.0].variable_index.get(name) {
                return Ok(VarRef { scope: id, index });
            }
        }
        Err(ScopeError::UndefinedVariable(name.to_string()))
    }

    pub fn define_function(&mut self, scope: ScopeId, symbol: FunctionSymbol) -> Result<(), ScopeError> {
        let functions = &mut self.scopes[scope.0].functions;
        if functions.contains_key(&symbol.name) {
            return Err(ScopeError::DuplicateFunction(symbol.name));
        }
        functions.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn resolve_function(&self, scope: ScopeId, name: &str) -> Result<&FunctionSymbol, ScopeError> {
        self.chain(scope)
            .into_iter()
            .find_map(|id| self.scopes[id.0].functions.get(name))
            .ok_or_else(|| ScopeError::UndefinedFunction(name.to_string()))
    }

    pub fn next_label_serial(&mut self, scope: ScopeId) -> usize {
        let owner = &mut self.scopes[scope.0];
        let serial = owner.label_serial;
        owner.label_serial += 1;
        serial
    }

    /// `{purpose}_{scope name}_sc_{scope ordinal}_lab_{serial}`
    pub fn next_label(&mut self, scope: ScopeId, purpose: &str) -> String {
        let serial = self.next_label_serial(scope);
        format!("{}_{}_sc_{}_lab_{}", purpose, self.scopes[scope.0].name, scope.0, serial)
    }

    /// Mark a variable inactive and give its register back to the pool
    pub fn unbind(&mut self, var: VarRef, pool: &mut RegisterPool) -> Option<Reg> {
        let variable = self.variable_mut(var);
        let reg = variable.active_reg()?;
        variable.active = false;
        pool.free(reg);
        Some(reg)
    }

    /// Bind a variable to `reg` and mark it active
    pub fn bind(&mut self, var: VarRef, reg: Reg) {
        let variable = self.variable_mut(var);
        variable.reg = Some(reg);
        variable.active = true;
    }

    /// Free the registers of the active variables owned by `scope` itself
    pub fn release_scope_registers(&mut self, scope: ScopeId, pool: &mut RegisterPool) -> Vec<(String, Reg)> {
        let mut released = Vec::new();
        for index in 0..self.scopes[scope.0].variables.len() {
            let var = VarRef { scope, index };
            if let Some(reg) = self.unbind(var, pool) {
                released.push((self.variable(var).name.clone(), reg));
            }
        }
        trace!("scope: released {} register(s) of scope {}", released.len(), scope.0);
        released
    }

    /// Move the variables of a finished block into its parent scope.
    /// References into `block` are invalid afterwards.
    pub fn hoist_variables(&mut self, block: ScopeId) {
        let Some(parent) = self.scopes[block.0].parent else {
            return;
        };
        let moved = std::mem::take(&mut self.scopes[block.0].variables);
        self.scopes[block.0].variable_index.clear();

        let target = &mut self.scopes[parent.0];
        for variable in moved {
            trace!("scope: '{}' outlives block {} in {}", variable.name, block.0, parent.0);
            target.variable_index.insert(variable.name.clone(), target.variables.len());
            target.variables.push(variable);
        }
    }

    /// Active variables visible from `scope`: innermost scope first,
    /// definition order within a scope
    pub fn active_variables(&self, scope: ScopeId) -> Vec<VarRef> {
        self.chain(scope)
            .into_iter()
            .flat_map(|id| {
                self.scopes[id.0]
                    .variables
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.active)
                    .map(move |(index, _)| VarRef { scope: id, index })
            })
            .collect()
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
