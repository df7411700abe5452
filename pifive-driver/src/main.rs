//! pifive Compiler Driver
//!
//! Reads a Python-subset source file, lowers it to RV64IM assembly and
//! writes the result to a file or to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log::info;
use pifive_codegen::{generate, AsmInst, Assembly, CodegenOptions};
use pifive_common::CompilerError;
use pifive_frontend::Frontend;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pifive", version, about = "Python subset to RISC-V compiler")]
struct Cli {
    /// Input Python source file
    input: PathBuf,

    /// Output assembly file
    #[arg(short, long, default_value = "output.s")]
    output: PathBuf,

    /// Print the assembly to stdout instead of writing it
    #[arg(short, long)]
    print: bool,

    /// Annotate the assembly with comments
    #[arg(short, long)]
    comments: bool,

    /// Function whose bare calls are omitted
    #[arg(long, value_name = "NAME", default_value = "main")]
    entry: String,

    /// Print the parsed AST as JSON and stop
    #[arg(long)]
    dump_ast: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = run(&cli) {
        eprintln!("{} {:#}", "error:".bright_red().bold(), err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let filename = cli.input.display().to_string();

    let module = Frontend::parse_source(&source, &filename).map_err(|e| with_source_line(e, &source))?;
    info!("parsed {} top-level statement(s)", module.body.len());

    if cli.dump_ast {
        println!("{}", serde_json::to_string_pretty(&module)?);
        return Ok(());
    }

    let options = CodegenOptions {
        emit_comments: cli.comments,
        entry_point: cli.entry.clone(),
    };
    let asm = generate(&module, &options).map_err(|e| with_source_line(e, &source))?;

    if cli.print {
        for inst in asm.instructions() {
            println!("{}", colorize(inst));
        }
    } else {
        fs::write(&cli.output, asm.to_string())
            .with_context(|| format!("failed to write {}", cli.output.display()))?;
        println!(
            "{} {} ({} lines)",
            "Wrote".bright_green().bold(),
            cli.output.display(),
            line_count(&asm)
        );
    }
    Ok(())
}

/// Attach the offending source line to errors that carry a location
fn with_source_line(err: CompilerError, source: &str) -> anyhow::Error {
    let Some(location) = err.location() else {
        return err.into();
    };
    let Some(line) = source.lines().nth(location.line.saturating_sub(1) as usize) else {
        return err.into();
    };
    let caret = format!("{}^", " ".repeat(location.column.saturating_sub(1) as usize));
    anyhow::anyhow!("{}\n  | {}\n  | {}", err, line, caret)
}

fn line_count(asm: &Assembly) -> usize {
    asm.instructions().count()
}

fn colorize(inst: &AsmInst) -> String {
    let line = inst.to_string();
    match inst {
        AsmInst::Label(_) => line.bright_yellow().bold().to_string(),
        AsmInst::Comment(_) => line.bright_black().to_string(),
        AsmInst::Text
        | AsmInst::Section(_)
        | AsmInst::Align(_)
        | AsmInst::Globl(_)
        | AsmInst::TypeFunction(_)
        | AsmInst::SizeFunction(_)
        | AsmInst::StringData(_) => line.bright_blue().to_string(),
        _ => match line.trim_start().split_once(' ') {
            Some((mnemonic, operands)) => format!("\t{} {}", mnemonic.bright_cyan(), operands),
            None => format!("\t{}", line.trim_start().bright_cyan()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pifive_codegen::Reg;
    use pifive_common::SourceLocation;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pifive", "prog.py"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("prog.py"));
        assert_eq!(cli.output, PathBuf::from("output.s"));
        assert_eq!(cli.entry, "main");
        assert!(!cli.print && !cli.comments && !cli.dump_ast && !cli.verbose);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["pifive", "prog.py", "-p", "-c", "-o", "a.s", "--entry", "start"]).unwrap();
        assert!(cli.print);
        assert!(cli.comments);
        assert_eq!(cli.output, PathBuf::from("a.s"));
        assert_eq!(cli.entry, "start");
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["pifive"]).is_err());
    }

    #[test]
    fn test_source_line_is_attached() {
        let err = CompilerError::UndefinedName {
            kind: "variable",
            name: "y".to_string(),
            location: SourceLocation::new("prog.py", 2, 11),
        };
        let rendered = format!("{:#}", with_source_line(err, "def main():\n    print(y)\n"));
        assert!(rendered.contains("    print(y)"), "{rendered}");
        assert!(rendered.contains("          ^"), "{rendered}");
        assert!(rendered.starts_with("Undefined variable 'y' at prog.py:2:11\n"), "{rendered}");
        assert!(rendered.ends_with("  |     print(y)\n  |           ^"), "{rendered}");
    }

    #[test]
    fn test_colorize_keeps_text() {
        colored::control::set_override(false);
        let inst = AsmInst::Li(Reg::T0, 5);
        assert_eq!(colorize(&inst), "\tli t0, 5");
        assert_eq!(colorize(&AsmInst::Ret), "\tret");
        assert_eq!(colorize(&AsmInst::Label("main".to_string())), "main:");
    }
}
