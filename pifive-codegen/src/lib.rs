//! pifive - Code Generation
//!
//! Lowers a parsed module to RV64IM assembly in a single pass:
//!
//! - `asm`: register file, allocation classes and assembly lines
//! - `regpool`: register availability
//! - `scope`: scope arena, variable bindings, function symbols and labels
//! - `abi`: calling convention and frame layout
//! - `sink`: the ordered list of emitted lines
//! - `lower`: the tree walker

pub mod abi;
pub mod asm;
pub mod lower;
pub mod regpool;
pub mod scope;
pub mod sink;

pub use asm::{AsmInst, Reg, RegClass};
pub use lower::CodegenContext;

use pifive_common::CompilerError;
use pifive_frontend::ast::Module;
use std::fmt;

/// Code generator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenOptions {
    /// Annotate the output with `#` comments
    pub emit_comments: bool,
    /// Function whose bare call statements are omitted
    pub entry_point: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            emit_comments: false,
            entry_point: "main".to_string(),
        }
    }
}

/// Generated program: text section followed by data section
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub text: Vec<AsmInst>,
    pub data: Vec<AsmInst>,
}

impl Assembly {
    /// Every line of the program, in output order
    pub fn instructions(&self) -> impl Iterator<Item = &AsmInst> {
        self.text.iter().chain(self.data.iter())
    }

    /// One string per line, without trailing newlines
    pub fn lines(&self) -> Vec<String> {
        self.instructions().map(|inst| inst.to_string()).collect()
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for inst in self.instructions() {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}

/// Main entry point for code generation
pub fn generate(module: &Module, options: &CodegenOptions) -> Result<Assembly, CompilerError> {
    let mut ctx = CodegenContext::new(options);
    lower::lower_module(&mut ctx, module)?;

    let data = if ctx.uses_print {
        vec![
            AsmInst::Section(".rodata".to_string()),
            AsmInst::Label(lower::calls::PRINT_FORMAT_LABEL.to_string()),
            AsmInst::StringData("%ld\n".to_string()),
        ]
    } else {
        Vec::new()
    };

    Ok(Assembly {
        text: ctx.sink.into_instructions(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pifive_common::SourceSpan;

    #[test]
    fn test_empty_module() {
        let module = Module { body: Vec::new(), span: SourceSpan::dummy() };
        let asm = generate(&module, &CodegenOptions::default()).unwrap();
        assert_eq!(asm.lines(), vec!["\t.text"]);
        assert_eq!(asm.to_string(), "\t.text\n");
    }

    #[test]
    fn test_default_options() {
        let options = CodegenOptions::default();
        assert!(!options.emit_comments);
        assert_eq!(options.entry_point, "main");
    }
}
