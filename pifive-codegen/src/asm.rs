//! RISC-V Assembly Instruction Definitions
//!
//! This module defines the RV64IM integer register file, the allocation
//! classes the generator draws from, and the instructions, pseudo-ops and
//! directives it emits.

use std::fmt;

/// RV64 integer registers, in ordinal order (`Reg::T0 as usize == 5`)
///
/// `fp` is the ABI alias of `s0`; the generator always spells it `fp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    Zero, Ra, Sp, Gp, Tp,
    T0, T1, T2,
    Fp, S1,
    A0, A1, A2, A3, A4, A5, A6, A7,
    S2, S3, S4, S5, S6, S7, S8, S9, S10, S11,
    T3, T4, T5, T6,
}

/// Number of integer registers
pub const NUM_REGS: usize = 32;

impl Reg {
    /// Every register, indexed by ordinal
    pub const ALL: [Reg; NUM_REGS] = [
        Reg::Zero, Reg::Ra, Reg::Sp, Reg::Gp, Reg::Tp,
        Reg::T0, Reg::T1, Reg::T2,
        Reg::Fp, Reg::S1,
        Reg::A0, Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5, Reg::A6, Reg::A7,
        Reg::S2, Reg::S3, Reg::S4, Reg::S5, Reg::S6, Reg::S7, Reg::S8, Reg::S9, Reg::S10, Reg::S11,
        Reg::T3, Reg::T4, Reg::T5, Reg::T6,
    ];

    /// Register number `xN`
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Reg> {
        Self::ALL.get(ordinal).copied()
    }

    /// ABI name
    pub fn name(self) -> &'static str {
        match self {
            Reg::Zero => "zero",
            Reg::Ra => "ra",
            Reg::Sp => "sp",
            Reg::Gp => "gp",
            Reg::Tp => "tp",
            Reg::T0 => "t0",
            Reg::T1 => "t1",
            Reg::T2 => "t2",
            Reg::Fp => "fp",
            Reg::S1 => "s1",
            Reg::A0 => "a0",
            Reg::A1 => "a1",
            Reg::A2 => "a2",
            Reg::A3 => "a3",
            Reg::A4 => "a4",
            Reg::A5 => "a5",
            Reg::A6 => "a6",
            Reg::A7 => "a7",
            Reg::S2 => "s2",
            Reg::S3 => "s3",
            Reg::S4 => "s4",
            Reg::S5 => "s5",
            Reg::S6 => "s6",
            Reg::S7 => "s7",
            Reg::S8 => "s8",
            Reg::S9 => "s9",
            Reg::S10 => "s10",
            Reg::S11 => "s11",
            Reg::T3 => "t3",
            Reg::T4 => "t4",
            Reg::T5 => "t5",
            Reg::T6 => "t6",
        }
    }

    /// The class this register is allocated from, if any
    pub fn class(self) -> Option<RegClass> {
        RegClass::ALL
            .into_iter()
            .find(|class| class.members().contains(&self))
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Allocation classes
///
/// `a0` (return value), `ra`, `sp`, `fp`, `zero`, `gp` and `tp` belong to no
/// class and are never handed out by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegClass {
    /// Caller-clobbered scratch registers `t0..t6`
    Temporary,
    /// `s1..s11`, reserved
    CalleeSaved,
    /// `a1..a7`, one per declared parameter
    Argument,
}

impl RegClass {
    pub const ALL: [RegClass; 3] = [RegClass::Temporary, RegClass::CalleeSaved, RegClass::Argument];

    /// Members in allocation order
    pub fn members(self) -> &'static [Reg] {
        match self {
            RegClass::Temporary => &[Reg::T0, Reg::T1, Reg::T2, Reg::T3, Reg::T4, Reg::T5, Reg::T6],
            RegClass::CalleeSaved => &[
                Reg::S1, Reg::S2, Reg::S3, Reg::S4, Reg::S5, Reg::S6,
                Reg::S7, Reg::S8, Reg::S9, Reg::S10, Reg::S11,
            ],
            RegClass::Argument => &[Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5, Reg::A6, Reg::A7],
        }
    }
}

impl fmt::Display for RegClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegClass::Temporary => write!(f, "temporary"),
            RegClass::CalleeSaved => write!(f, "callee-saved"),
            RegClass::Argument => write!(f, "argument"),
        }
    }
}

/// RISC-V assembly lines
///
/// Instructions and directives render tab-indented, labels flush left.
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // Arithmetic
    Add(Reg, Reg, Reg),           // rd = rs1 + rs2
    Sub(Reg, Reg, Reg),           // rd = rs1 - rs2
    Mul(Reg, Reg, Reg),           // rd = rs1 * rs2
    Div(Reg, Reg, Reg),           // rd = rs1 / rs2 (signed)
    Rem(Reg, Reg, Reg),           // rd = rs1 % rs2 (signed)
    AddI(Reg, Reg, i64),          // rd = rs1 + imm
    Neg(Reg, Reg),                // rd = -rs

    // Logical
    And(Reg, Reg, Reg),
    Or(Reg, Reg, Reg),
    Xor(Reg, Reg, Reg),
    Sll(Reg, Reg, Reg),           // rd = rs1 << rs2
    Sra(Reg, Reg, Reg),           // rd = rs1 >> rs2 (arithmetic)
    Not(Reg, Reg),                // rd = ~rs

    // Memory
    Ld(Reg, i64, Reg),            // rd = mem[base + offset]
    Sd(Reg, i64, Reg),            // mem[base + offset] = rs
    Li(Reg, i64),
    La(Reg, String),

    // Control flow
    Beq(Reg, Reg, String),
    Bne(Reg, Reg, String),
    Blt(Reg, Reg, String),
    Ble(Reg, Reg, String),
    Bgt(Reg, Reg, String),
    Bge(Reg, Reg, String),
    Beqz(Reg, String),
    J(String),
    Call(String),
    Ret,

    // Directives
    Text,
    Section(String),
    Align(u32),
    Globl(String),
    TypeFunction(String),         // .type name, @function
    SizeFunction(String),         // .size name, .-name
    StringData(String),           // .string "..."

    Label(String),
    Comment(String),
}

impl AsmInst {
    /// True for lines that carry no machine code
    pub fn is_comment(&self) -> bool {
        matches!(self, AsmInst::Comment(_))
    }
}

fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Arithmetic
            AsmInst::Add(rd, rs1, rs2) => write!(f, "\tadd {}, {}, {}", rd, rs1, rs2),
            AsmInst::Sub(rd, rs1, rs2) => write!(f, "\tsub {}, {}, {}", rd, rs1, rs2),
            AsmInst::Mul(rd, rs1, rs2) => write!(f, "\tmul {}, {}, {}", rd, rs1, rs2),
            AsmInst::Div(rd, rs1, rs2) => write!(f, "\tdiv {}, {}, {}", rd, rs1, rs2),
            AsmInst::Rem(rd, rs1, rs2) => write!(f, "\trem {}, {}, {}", rd, rs1, rs2),
            AsmInst::AddI(rd, rs, imm) => write!(f, "\taddi {}, {}, {}", rd, rs, imm),
            AsmInst::Neg(rd, rs) => write!(f, "\tneg {}, {}", rd, rs),

            // Logical
            AsmInst::And(rd, rs1, rs2) => write!(f, "\tand {}, {}, {}", rd, rs1, rs2),
            AsmInst::Or(rd, rs1, rs2) => write!(f, "\tor {}, {}, {}", rd, rs1, rs2),
            AsmInst::Xor(rd, rs1, rs2) => write!(f, "\txor {}, {}, {}", rd, rs1, rs2),
            AsmInst::Sll(rd, rs1, rs2) => write!(f, "\tsll {}, {}, {}", rd, rs1, rs2),
            AsmInst::Sra(rd, rs1, rs2) => write!(f, "\tsra {}, {}, {}", rd, rs1, rs2),
            AsmInst::Not(rd, rs) => write!(f, "\tnot {}, {}", rd, rs),

            // Memory
            AsmInst::Ld(rd, offset, base) => write!(f, "\tld {}, {}({})", rd, offset, base),
            AsmInst::Sd(rs, offset, base) => write!(f, "\tsd {}, {}({})", rs, offset, base),
            AsmInst::Li(rd, imm) => write!(f, "\tli {}, {}", rd, imm),
            AsmInst::La(rd, label) => write!(f, "\tla {}, {}", rd, label),

            // Control flow
            AsmInst::Beq(rs1, rs2, label) => write!(f, "\tbeq {}, {}, {}", rs1, rs2, label),
            AsmInst::Bne(rs1, rs2, label) => write!(f, "\tbne {}, {}, {}", rs1, rs2, label),
            AsmInst::Blt(rs1, rs2, label) => write!(f, "\tblt {}, {}, {}", rs1, rs2, label),
            AsmInst::Ble(rs1, rs2, label) => write!(f, "\tble {}, {}, {}", rs1, rs2, label),
            AsmInst::Bgt(rs1, rs2, label) => write!(f, "\tbgt {}, {}, {}", rs1, rs2, label),
            AsmInst::Bge(rs1, rs2, label) => write!(f, "\tbge {}, {}, {}", rs1, rs2, label),
            AsmInst::Beqz(rs, label) => write!(f, "\tbeqz {}, {}", rs, label),
            AsmInst::J(label) => write!(f, "\tj {}", label),
            AsmInst::Call(label) => write!(f, "\tcall {}", label),
            AsmInst::Ret => write!(f, "\tret"),

            // Directives
            AsmInst::Text => write!(f, "\t.text"),
            AsmInst::Section(name) => write!(f, "\t.section {}", name),
            AsmInst::Align(n) => write!(f, "\t.align {}", n),
            AsmInst::Globl(name) => write!(f, "\t.globl {}", name),
            AsmInst::TypeFunction(name) => write!(f, "\t.type {}, @function", name),
            AsmInst::SizeFunction(name) => write!(f, "\t.size {}, .-{}", name, name),
            AsmInst::StringData(text) => write!(f, "\t.string \"{}\"", escape_string(text)),

            AsmInst::Label(label) => write!(f, "{}:", label),
            AsmInst::Comment(text) => write!(f, "\t# {}", text),
        }
    }
}
