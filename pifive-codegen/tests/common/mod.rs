//! Test harness: compile Python source and run the result on a small
//! RV64IM interpreter that understands the generator's output.

#![allow(dead_code)]

use pifive_codegen::{generate, AsmInst, Assembly, CodegenOptions, Reg};
use pifive_common::CompilerError;
use pifive_frontend::Frontend;
use std::collections::HashMap;

/// Return address that stops the machine when `ret` jumps to it
const HALT_ADDRESS: i64 = -1;
const STACK_TOP: i64 = 0x10000;
const MAX_STEPS: usize = 1_000_000;
/// Written to every caller-clobbered register by `printf`
const CLOBBER: i64 = 0x5ca1ab1e;

pub fn compile_with(source: &str, options: &CodegenOptions) -> Result<Assembly, CompilerError> {
    let module = Frontend::parse_source(source, "test.py")?;
    generate(&module, options)
}

pub fn compile(source: &str) -> Assembly {
    match compile_with(source, &CodegenOptions::default()) {
        Ok(asm) => asm,
        Err(err) => panic!("compilation failed: {}", err),
    }
}

pub fn compile_err(source: &str) -> CompilerError {
    match compile_with(source, &CodegenOptions::default()) {
        Ok(asm) => panic!("expected an error, got:\n{}", asm),
        Err(err) => err,
    }
}

/// Values printed by `main`
pub fn run(source: &str) -> Vec<i64> {
    let asm = compile(source);
    let mut machine = Machine::new(&asm.text);
    if let Err(message) = machine.run("main") {
        panic!("{}\n{}", message, asm);
    }
    machine.output
}

/// Text-section lines that are real instructions
pub fn executable(asm: &Assembly) -> Vec<&AsmInst> {
    asm.text
        .iter()
        .filter(|inst| {
            !matches!(
                inst,
                AsmInst::Comment(_)
                    | AsmInst::Label(_)
                    | AsmInst::Text
                    | AsmInst::Section(_)
                    | AsmInst::Align(_)
                    | AsmInst::Globl(_)
                    | AsmInst::TypeFunction(_)
                    | AsmInst::SizeFunction(_)
                    | AsmInst::StringData(_)
            )
        })
        .collect()
}

pub struct Machine<'a> {
    program: &'a [AsmInst],
    labels: HashMap<&'a str, usize>,
    regs: [i64; 32],
    memory: HashMap<i64, i64>,
    pc: usize,
    pub output: Vec<i64>,
    /// Every `li` immediate executed, in order
    pub loaded_immediates: Vec<i64>,
}

impl<'a> Machine<'a> {
    pub fn new(program: &'a [AsmInst]) -> Self {
        let labels = program
            .iter()
            .enumerate()
            .filter_map(|(index, inst)| match inst {
                AsmInst::Label(name) => Some((name.as_str(), index)),
                _ => None,
            })
            .collect();

        Self {
            program,
            labels,
            regs: [0; 32],
            memory: HashMap::new(),
            pc: 0,
            output: Vec::new(),
            loaded_immediates: Vec::new(),
        }
    }

    fn reg(&self, reg: Reg) -> i64 {
        self.regs[reg.ordinal()]
    }

    fn set(&mut self, reg: Reg, value: i64) {
        if reg != Reg::Zero {
            self.regs[reg.ordinal()] = value;
        }
    }

    fn target(&self, label: &str) -> Result<usize, String> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| format!("undefined label '{}'", label))
    }

    fn load(&self, address: i64) -> Result<i64, String> {
        if address % 8 != 0 {
            return Err(format!("misaligned load at {:#x}", address));
        }
        Ok(self.memory.get(&address).copied().unwrap_or(0))
    }

    fn store(&mut self, address: i64, value: i64) -> Result<(), String> {
        if address % 8 != 0 {
            return Err(format!("misaligned store at {:#x}", address));
        }
        self.memory.insert(address, value);
        Ok(())
    }

    fn branch(&mut self, taken: bool, label: &str) -> Result<(), String> {
        if taken {
            self.pc = self.target(label)?;
        }
        Ok(())
    }

    fn call_printf(&mut self) {
        self.output.push(self.reg(Reg::A1));
        for reg in Reg::ALL {
            if pifive_codegen::abi::CallingConvention::is_caller_clobbered(reg) {
                self.set(reg, CLOBBER);
            }
        }
        self.set(Reg::A0, 0);
    }

    /// Call `entry` and run until it returns
    pub fn run(&mut self, entry: &str) -> Result<(), String> {
        self.pc = self.target(entry)?;
        self.set(Reg::Sp, STACK_TOP);
        self.set(Reg::Ra, HALT_ADDRESS);

        let program = self.program;
        for _ in 0..MAX_STEPS {
            let Some(inst) = program.get(self.pc) else {
                return Err(format!("fell off the end of the program at {}", self.pc));
            };
            self.pc += 1;

            match inst {
                AsmInst::Add(rd, a, b) => self.set(*rd, self.reg(*a).wrapping_add(self.reg(*b))),
                AsmInst::Sub(rd, a, b) => self.set(*rd, self.reg(*a).wrapping_sub(self.reg(*b))),
                AsmInst::Mul(rd, a, b) => self.set(*rd, self.reg(*a).wrapping_mul(self.reg(*b))),
                AsmInst::Div(rd, a, b) => {
                    let (a, b) = (self.reg(*a), self.reg(*b));
                    self.set(*rd, if b == 0 { -1 } else { a.wrapping_div(b) });
                }
                AsmInst::Rem(rd, a, b) => {
                    let (a, b) = (self.reg(*a), self.reg(*b));
                    self.set(*rd, if b == 0 { a } else { a.wrapping_rem(b) });
                }
                AsmInst::AddI(rd, rs, imm) => self.set(*rd, self.reg(*rs).wrapping_add(*imm)),
                AsmInst::Neg(rd, rs) => self.set(*rd, self.reg(*rs).wrapping_neg()),
                AsmInst::And(rd, a, b) => self.set(*rd, self.reg(*a) & self.reg(*b)),
                AsmInst::Or(rd, a, b) => self.set(*rd, self.reg(*a) | self.reg(*b)),
                AsmInst::Xor(rd, a, b) => self.set(*rd, self.reg(*a) ^ self.reg(*b)),
                AsmInst::Sll(rd, a, b) => self.set(*rd, self.reg(*a).wrapping_shl((self.reg(*b) & 63) as u32)),
                AsmInst::Sra(rd, a, b) => self.set(*rd, self.reg(*a).wrapping_shr((self.reg(*b) & 63) as u32)),
                AsmInst::Not(rd, rs) => self.set(*rd, !self.reg(*rs)),

                AsmInst::Ld(rd, offset, base) => {
                    let value = self.load(self.reg(*base) + offset)?;
                    self.set(*rd, value);
                }
                AsmInst::Sd(rs, offset, base) => self.store(self.reg(*base) + offset, self.reg(*rs))?,
                AsmInst::Li(rd, imm) => {
                    self.loaded_immediates.push(*imm);
                    self.set(*rd, *imm);
                }
                AsmInst::La(rd, _) => self.set(*rd, 0),

                AsmInst::Beq(a, b, label) => self.branch(self.reg(*a) == self.reg(*b), label)?,
                AsmInst::Bne(a, b, label) => self.branch(self.reg(*a) != self.reg(*b), label)?,
                AsmInst::Blt(a, b, label) => self.branch(self.reg(*a) < self.reg(*b), label)?,
                AsmInst::Ble(a, b, label) => self.branch(self.reg(*a) <= self.reg(*b), label)?,
                AsmInst::Bgt(a, b, label) => self.branch(self.reg(*a) > self.reg(*b), label)?,
                AsmInst::Bge(a, b, label) => self.branch(self.reg(*a) >= self.reg(*b), label)?,
                AsmInst::Beqz(rs, label) => self.branch(self.reg(*rs) == 0, label)?,
                AsmInst::J(label) => self.pc = self.target(label)?,
                AsmInst::Call(name) if name == "printf" => self.call_printf(),
                AsmInst::Call(name) => {
                    self.set(Reg::Ra, self.pc as i64);
                    self.pc = self.target(name)?;
                }
                AsmInst::Ret => {
                    let ra = self.reg(Reg::Ra);
                    if ra == HALT_ADDRESS {
                        return Ok(());
                    }
                    self.pc = usize::try_from(ra).map_err(|_| format!("bad return address {}", ra))?;
                }

                AsmInst::Text
                | AsmInst::Section(_)
                | AsmInst::Align(_)
                | AsmInst::Globl(_)
                | AsmInst::TypeFunction(_)
                | AsmInst::SizeFunction(_)
                | AsmInst::StringData(_)
                | AsmInst::Label(_)
                | AsmInst::Comment(_) => {}
            }
        }
        Err(format!("no halt after {} steps", MAX_STEPS))
    }

    /// Stack pointer after `run`
    pub fn stack_pointer(&self) -> i64 {
        self.reg(Reg::Sp)
    }
}

pub const INITIAL_STACK_POINTER: i64 = STACK_TOP;
