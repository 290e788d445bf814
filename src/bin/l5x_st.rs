//! Binary entry point: dispatches [`l5x_st_compiler::cli::Cli`] to the
//! [`l5x_st_compiler::compiler::Compiler`] pipelines (SPEC_FULL §6).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use l5x_st_compiler::cli::{discover_l5x_files, l5x_source, Cli, Command, L5xSource};
use l5x_st_compiler::compiler::{Compiler, ConversionReport, CoreError};
use l5x_st_compiler::xml_io;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::L5x2st {
            input,
            directory,
            output,
            use_ir,
            verbose,
        } => run_l5x2st(input, directory, output, use_ir, verbose),
        Command::St2l5x {
            input,
            output,
            use_ir,
            verbose,
        } => run_st2l5x(input, output, use_ir, verbose),
    }
}

fn run_l5x2st(
    input: Option<PathBuf>,
    directory: Option<PathBuf>,
    output: PathBuf,
    use_ir: bool,
    verbose: bool,
) -> ExitCode {
    let source = match l5x_source(input, directory) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let compiler = Compiler::new();

    let st = match source {
        L5xSource::File(path) => {
            if verbose {
                eprintln!("Converting {} to {}", path.display(), output.display());
            }
            let text = match read_to_string(&path) {
                Ok(t) => t,
                Err(e) => return fail(&e.to_string()),
            };
            let root = match xml_io::parse(&text) {
                Ok(r) => r,
                Err(e) => return fail(&e.to_string()),
            };
            let result = if use_ir {
                compiler.l5x_to_st_via_ir(&root)
            } else {
                compiler.l5x_to_st(&root)
            };
            match result {
                Ok((st, report)) => {
                    print_diagnostics(&report, verbose);
                    st
                }
                Err(e) => return fail(&e.to_string()),
            }
        }
        L5xSource::Directory(dir) => {
            if verbose {
                eprintln!(
                    "Converting all L5X files in {} to {}",
                    dir.display(),
                    output.display()
                );
            }
            let files = match discover_l5x_files(&dir) {
                Ok(f) => f,
                Err(e) => return fail(&format!("{}: {e}", dir.display())),
            };
            let mut elements = Vec::new();
            for path in &files {
                let text = match read_to_string(path) {
                    Ok(t) => t,
                    Err(e) => return fail(&e.to_string()),
                };
                let root = match xml_io::parse(&text) {
                    Ok(r) => r,
                    Err(e) => return fail(&format!("{}: {e}", path.display())),
                };
                elements.push((path.display().to_string(), root));
            }
            let (st, reports) = compiler.consolidate_directory(&elements);
            for (name, report) in &reports {
                if verbose {
                    eprintln!("-- {name} --");
                }
                print_diagnostics(report, verbose);
            }
            st
        }
    };

    if let Err(e) = write_file(&output, st) {
        return fail(&e.to_string());
    }

    println!("Successfully converted to {}", output.display());
    ExitCode::SUCCESS
}

fn run_st2l5x(input: PathBuf, output: PathBuf, use_ir: bool, verbose: bool) -> ExitCode {
    let source = match read_to_string(&input) {
        Ok(s) => s,
        Err(e) => return fail(&e.to_string()),
    };

    let compiler = Compiler::new();

    if use_ir {
        if verbose {
            eprintln!("IR/guardrail mode enabled: ST -> L5X -> IR -> validate");
        }
        match compiler.st_to_l5x_via_ir(&source) {
            Ok((xml, report)) => {
                print_diagnostics(&report, verbose);
                if let Err(e) = write_file(&output, xml) {
                    return fail(&e.to_string());
                }
                println!(
                    "IR validation passed. Successfully converted {} to {}",
                    input.display(),
                    output.display()
                );
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e.to_string()),
        }
    } else {
        let (xml, report) = compiler.st_to_l5x(&source);
        print_diagnostics(&report, verbose);
        if let Err(e) = write_file(&output, xml) {
            return fail(&e.to_string());
        }
        println!(
            "Successfully converted {} to {}",
            input.display(),
            output.display()
        );
        ExitCode::SUCCESS
    }
}

/// Reads a file, wrapping any I/O failure as a [`CoreError::Io`] naming the path.
fn read_to_string(path: &std::path::Path) -> Result<String, CoreError> {
    std::fs::read_to_string(path).map_err(|e| CoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Writes a file, wrapping any I/O failure as a [`CoreError::Io`] naming the path.
fn write_file(path: &std::path::Path, contents: String) -> Result<(), CoreError> {
    std::fs::write(path, contents).map_err(|e| CoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn print_diagnostics(report: &ConversionReport, verbose: bool) {
    if !verbose {
        return;
    }
    for d in &report.diagnostics {
        eprintln!("{d}");
    }
    if let Some(score) = report.fidelity_score {
        eprintln!("fidelity: {score:.3}");
    }
}

fn fail(message: &str) -> ExitCode {
    eprintln!("Error: {message}");
    ExitCode::FAILURE
}
