//! RV64 ABI Implementation
//!
//! Calling convention constants and the stack frame layout used for every
//! generated function, with prologue/epilogue generation.

use crate::asm::{AsmInst, Reg, RegClass};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbiError {
    #[error("Too many parameters: {0} (maximum: {1})")]
    TooManyParameters(usize, usize),

    #[error("Stack frame too large: {0} bytes (maximum: {1})")]
    FrameTooLarge(i64, i64),
}

/// Calling convention
///
/// - a0: return value, and the format string for `printf`
/// - a1-a7: parameters, one fixed register per declared parameter
/// - t0-t6: caller-clobbered temporaries
/// - ra, fp: saved by every prologue
/// - sp: top of the evaluation stack
pub struct CallingConvention;

impl CallingConvention {
    /// One argument-class register per parameter
    pub const MAX_PARAMS: usize = 7;

    pub const RETURN_REG: Reg = Reg::A0;
    pub const STACK_PTR: Reg = Reg::Sp;
    pub const FRAME_PTR: Reg = Reg::Fp;
    pub const RETURN_ADDR: Reg = Reg::Ra;

    /// Registers a callee may clobber
    pub fn is_caller_clobbered(reg: Reg) -> bool {
        matches!(reg.class(), Some(RegClass::Temporary | RegClass::Argument))
    }

    pub fn check_param_count(count: usize) -> Result<(), AbiError> {
        if count > Self::MAX_PARAMS {
            return Err(AbiError::TooManyParameters(count, Self::MAX_PARAMS));
        }
        Ok(())
    }
}

/// Stack Frame Layout
///
/// The stack grows downward. After the prologue `fp` holds the caller's
/// `sp` and the frame spans `[fp - size, fp)`:
///
/// ```text
///   fp - 8          saved ra
///   fp - 16         saved fp
///   fp - 24 - 8*i   local slot i (parameters first)
/// ```
///
/// The evaluation stack grows below `fp - size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Number of 8-byte local slots
    pub slots: usize,

    /// Total frame size in bytes
    pub size: i64,
}

impl Frame {
    /// Bytes reserved for saved `ra` and `fp`
    pub const HEADER_SIZE: i64 = 16;
    pub const SLOT_SIZE: i64 = 8;
    /// Largest frame addressable with a 12-bit signed immediate
    pub const MAX_SIZE: i64 = 2047;

    pub fn new(slots: usize) -> Result<Self, AbiError> {
        let size = Self::HEADER_SIZE + Self::SLOT_SIZE * slots as i64;
        if size > Self::MAX_SIZE {
            return Err(AbiError::FrameTooLarge(size, Self::MAX_SIZE));
        }
        Ok(Self { slots, size })
    }

    /// `fp`-relative offset of a local slot
    pub fn slot_offset(slot: usize) -> i64 {
        -(Self::HEADER_SIZE + Self::SLOT_SIZE + Self::SLOT_SIZE * slot as i64)
    }

    /// Generate function prologue
    pub fn gen_prologue(&self) -> Vec<AsmInst> {
        let sp = CallingConvention::STACK_PTR;
        let fp = CallingConvention::FRAME_PTR;
        vec![
            AsmInst::AddI(sp, sp, -self.size),
            AsmInst::Sd(CallingConvention::RETURN_ADDR, self.size - 8, sp),
            AsmInst::Sd(fp, self.size - 16, sp),
            AsmInst::AddI(fp, sp, self.size),
        ]
    }

    /// Generate function epilogue, ending in `ret`
    pub fn gen_epilogue(&self) -> Vec<AsmInst> {
        let sp = CallingConvention::STACK_PTR;
        let fp = CallingConvention::FRAME_PTR;
        vec![
            AsmInst::Ld(CallingConvention::RETURN_ADDR, self.size - 8, sp),
            AsmInst::Ld(fp, self.size - 16, sp),
            AsmInst::AddI(sp, sp, self.size),
            AsmInst::Ret,
        ]
    }
}
