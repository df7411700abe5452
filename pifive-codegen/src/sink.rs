//! Instruction Sink
//!
//! Append-only list of emitted lines. Comments are dropped unless enabled,
//! so switching them on never changes the instruction lines.

use crate::abi::{CallingConvention, Frame};
use crate::asm::{AsmInst, Reg};

/// Bytes per evaluation-stack entry
const STACK_ENTRY: i64 = 8;

#[derive(Debug, Clone, Default)]
pub struct InstructionSink {
    instructions: Vec<AsmInst>,
    emit_comments: bool,
}

impl InstructionSink {
    pub fn new(emit_comments: bool) -> Self {
        Self {
            instructions: Vec::new(),
            emit_comments,
        }
    }

    pub fn emit(&mut self, inst: AsmInst) {
        self.instructions.push(inst);
    }

    pub fn emit_all(&mut self, insts: impl IntoIterator<Item = AsmInst>) {
        self.instructions.extend(insts);
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        if self.emit_comments {
            self.instructions.push(AsmInst::Comment(text.into()));
        }
    }

    pub fn label(&mut self, name: &str) {
        self.emit(AsmInst::Label(name.to_string()));
    }

    /// Push `reg` onto the evaluation stack
    pub fn push(&mut self, reg: Reg) {
        let sp = CallingConvention::STACK_PTR;
        self.emit(AsmInst::AddI(sp, sp, -STACK_ENTRY));
        self.emit(AsmInst::Sd(reg, 0, sp));
    }

    /// Pop the top of the evaluation stack into `reg`
    pub fn pop(&mut self, reg: Reg) {
        let sp = CallingConvention::STACK_PTR;
        self.emit(AsmInst::Ld(reg, 0, sp));
        self.emit(AsmInst::AddI(sp, sp, STACK_ENTRY));
    }

    pub fn load_immediate(&mut self, reg: Reg, value: i64) {
        self.emit(AsmInst::Li(reg, value));
    }

    /// Store `reg` to a local slot of the current frame
    pub fn store_slot(&mut self, reg: Reg, slot: usize) {
        self.emit(AsmInst::Sd(reg, Frame::slot_offset(slot), CallingConvention::FRAME_PTR));
    }

    /// Load a local slot of the current frame into `reg`
    pub fn load_slot(&mut self, reg: Reg, slot: usize) {
        self.emit(AsmInst::Ld(reg, Frame::slot_offset(slot), CallingConvention::FRAME_PTR));
    }

    pub fn branch_if_zero(&mut self, reg: Reg, label: &str) {
        self.emit(AsmInst::Beqz(reg, label.to_string()));
    }

    pub fn jump(&mut self, label: &str) {
        self.emit(AsmInst::J(label.to_string()));
    }

    pub fn call(&mut self, function: &str) {
        self.emit(AsmInst::Call(function.to_string()));
    }

    /// `.align`, `.globl`, `.type` and the entry label
    pub fn function_header(&mut self, name: &str) {
        self.emit(AsmInst::Align(1));
        self.emit(AsmInst::Globl(name.to_string()));
        self.emit(AsmInst::TypeFunction(name.to_string()));
        self.label(name);
    }

    pub fn function_footer(&mut self, name: &str) {
        self.emit(AsmInst::SizeFunction(name.to_string()));
    }

    pub fn prologue(&mut self, frame: &Frame) {
        self.emit_all(frame.gen_prologue());
    }

    pub fn epilogue(&mut self, frame: &Frame) {
        self.emit_all(frame.gen_epilogue());
    }

    pub fn instructions(&self) -> &[AsmInst] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn into_instructions(self) -> Vec<AsmInst> {
        self.instructions
    }
}
