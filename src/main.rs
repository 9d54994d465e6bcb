// File: src/main.rs
//
// Command-line entry point for the Ember interpreter. With a script path
// it compiles and runs the file; with no arguments it starts the REPL.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use colored::Colorize;

use ember::repl::Repl;
use ember::vm::Vm;

#[derive(Parser)]
#[command(
    name = "ember",
    about = "Ember: a small scripting language on a bytecode VM",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Script to run; starts an interactive session when omitted.
    script: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match cli.script {
        Some(path) => run_file(&path),
        None => match Repl::new() {
            Ok(mut repl) => {
                if let Err(error) = repl.run() {
                    eprintln!("{} {}", "error:".red().bold(), error);
                    process::exit(1);
                }
            }
            Err(error) => {
                eprintln!("{} failed to start REPL: {}", "error:".red().bold(), error);
                process::exit(1);
            }
        },
    }
}

/// Exit codes: 65 for compile errors, 70 for runtime errors, 74 when the
/// script cannot be read.
fn run_file(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!(
                "{} could not read '{}': {}",
                "error:".red().bold(),
                path.display(),
                error
            );
            process::exit(74);
        }
    };

    let mut vm = Vm::new();
    if let Err(error) = vm.interpret(&source) {
        eprint!("{}", error);
        process::exit(error.exit_code());
    }
}
