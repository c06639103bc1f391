//! Moa CLI: type inference for Moa source files.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use log::info;

use moa::diagnostics::print_error;
use moa::error::Result;
use moa::infer::convert;
use moa::parser::ast::Program;
use moa::parser::parse_source;
use moa::parser::pretty::{print_expr, typed_sexp};

/// How the typed program is printed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Output {
    /// Source with each statement preceded by its type
    Annotated,
    /// One typed S-expression per statement
    Tree,
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    let mut output = Output::Annotated;
    let mut input = None;
    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "-V" | "--version" => {
                println!("moa {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            "--tree" => output = Output::Tree,
            other if other.starts_with("--") => {
                eprintln!("Unknown option '{}'", other);
                return ExitCode::from(1);
            }
            other => input = Some(other.to_string()),
        }
    }

    let Some(input) = input else {
        eprintln!("Usage: moa [--tree] <file.moa> | moa [--tree] -");
        eprintln!("       moa --help");
        return ExitCode::from(1);
    };

    let (source, filename) = if input == "-" {
        let mut source = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {}", e);
            return ExitCode::from(1);
        }
        (source, "<stdin>".to_string())
    } else {
        match fs::read_to_string(&input) {
            Ok(source) => (source, input),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", input, e);
                return ExitCode::from(1);
            }
        }
    };

    match run_inference(&source) {
        Ok(program) => {
            print_program(&program, output);
            ExitCode::SUCCESS
        }
        Err(error) => {
            if print_error(&filename, &source, &error).is_err() {
                eprintln!("{}", error);
            }
            ExitCode::from(1)
        }
    }
}

fn print_help() {
    println!(
        r#"moa - type inference for the Moa language

USAGE:
    moa <file.moa>       Check types in a Moa file
    moa -                Read from stdin

OPTIONS:
    --tree               Print typed S-expressions instead of source
    -h, --help           Print help information
    -V, --version        Print version information

DESCRIPTION:
    Infers a type for every expression of a Moa program:

    - Numeric literals start as the class num and narrow to int or float
    - Functions are products of parameter and result types: (int int)
    - Parameters used as records are checked against classes and builtins
    - Thrown values are tracked as error unions: string|string

    Set RUST_LOG=moa=debug or RUST_LOG=moa=trace to follow unification.

EXAMPLES:
    moa example.moa              Check types in example.moa
    echo "1 + 2.0" | moa -       Check types from stdin
"#
    );
}

fn run_inference(source: &str) -> Result<Program> {
    let program = parse_source(source)?;
    info!("parsed {} statements", program.statements.len());
    convert(&program)
}

fn print_program(program: &Program, output: Output) {
    println!(
        "// Program type: {}",
        program.ty.as_deref().unwrap_or("void")
    );
    println!();
    for stmt in &program.statements {
        match output {
            Output::Annotated => {
                if let Some(ty) = &stmt.ty {
                    println!("// {}", ty);
                }
                println!("{}", print_expr(stmt));
            }
            Output::Tree => println!("{}", typed_sexp(stmt)),
        }
    }
}
