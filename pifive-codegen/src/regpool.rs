//! Register Pool
//!
//! Tracks which registers are available for allocation. Only members of a
//! `RegClass` are ever handed out. Running out of registers is not an error
//! here: `allocate` returns `None` and the lowering engine spills.

use crate::asm::{Reg, RegClass, NUM_REGS};
use log::trace;

#[derive(Debug, Clone)]
pub struct RegisterPool {
    available: [bool; NUM_REGS],
}

impl RegisterPool {
    /// All class members start available, everything else is never available
    pub fn new() -> Self {
        let mut available = [false; NUM_REGS];
        for class in RegClass::ALL {
            for reg in class.members() {
                available[reg.ordinal()] = true;
            }
        }
        Self { available }
    }

    /// First free member of `class` in declared order
    pub fn allocate(&mut self, class: RegClass) -> Option<Reg> {
        let reg = class
            .members()
            .iter()
            .copied()
            .find(|reg| self.available[reg.ordinal()])?;
        self.available[reg.ordinal()] = false;
        trace!("pool: allocated {} ({})", reg, class);
        Some(reg)
    }

    /// Mark a specific register allocated. Returns false if it was not free.
    pub fn take(&mut self, reg: Reg) -> bool {
        if reg.class().is_none() || !self.available[reg.ordinal()] {
            return false;
        }
        self.available[reg.ordinal()] = false;
        trace!("pool: took {}", reg);
        true
    }

    /// Return a register to the pool. Freeing twice is harmless; registers
    /// outside every class stay unavailable.
    pub fn free(&mut self, reg: Reg) {
        if reg.class().is_some() {
            self.available[reg.ordinal()] = true;
            trace!("pool: freed {}", reg);
        }
    }

    pub fn is_available(&self, reg: Reg) -> bool {
        self.available[reg.ordinal()]
    }

    pub fn is_class_available(&self, class: RegClass) -> bool {
        class.members().iter().any(|reg| self.available[reg.ordinal()])
    }

    /// Allocatable registers currently handed out, in ordinal order
    pub fn in_use(&self) -> Vec<Reg> {
        Reg::ALL
            .into_iter()
            .filter(|reg| reg.class().is_some() && !self.available[reg.ordinal()])
            .collect()
    }
}

impl Default for RegisterPool {
    fn default() -> Self {
        Self::new()
    }
}
