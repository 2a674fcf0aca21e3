use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use twine::{RunEnvironment, MEMORY_DEFAULT};

/// Twine is a small interpreter toolchain for a tiny textual instruction set.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a program file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program file and report machine state after every step
    Run {
        /// Program file to run
        name: PathBuf,
        /// Number of memory cells available to the program
        #[arg(short = 'M', long, default_value_t = MEMORY_DEFAULT)]
        memory: usize,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
    /// Check a program file for malformed lines without running it
    Check {
        /// Program file to check
        name: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                memory,
                minimal,
            } => run(&name, memory, minimal),
            Command::Check { name } => {
                file_message("Checking", &name);
                let contents = fs::read_to_string(&name).into_diagnostic()?;
                twine::check_program(&contents)?;
                message("Success", "no errors found!");
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, MEMORY_DEFAULT, false)
    } else {
        println!("\n~ twine v{VERSION} ~");
        println!("{}", LOGO.cyan().bold());
        println!("{SHORT_INFO}");
        Ok(())
    }
}

fn run(name: &PathBuf, memory: usize, minimal: bool) -> Result<()> {
    // The only fatal failure: the program file cannot be read
    let contents = fs::read_to_string(name).into_diagnostic()?;

    if !minimal {
        file_message("Running", name);
    }
    let mut program = RunEnvironment::new(contents, memory);
    program.run();
    if !minimal {
        file_message("Completed", name);
    }
    Ok(())
}

fn file_message(left: &str, right: &PathBuf) {
    message(left, &format!("target {}", right.display()));
}

fn message(left: &str, right: &str) {
    println!("{:>12} {right}", left.green());
}

const LOGO: &str = r#"
  _             _
 | |___      __(_)_ __   ___
 | __\ \ /\ / /| | '_ \ / _ \
 | |_ \ V  V / | | | | |  __/
  \__| \_/\_/  |_|_| |_|\___|"#;

const SHORT_INFO: &str = r"
Welcome to twine, an interpreter for a tiny textual instruction set
(MOV, ADD, SUB, MUL, DIV, HLT over four registers and a flat memory).
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
