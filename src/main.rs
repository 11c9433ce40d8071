//! Program inspection CLI.
//!
//! Decodes enveloped programs and prints their listing or hash.
//!
//! # Usage
//! ```text
//! xcvm decode <file> [--hex]
//! xcvm hash <file> [--hex]
//! ```
//!
//! # Options
//! - `--hex`: the file holds the program as hex text instead of raw bytes
//!
//! # Environment
//! - `XCVM_LOG`: minimum log level (`debug`, `info`, `warn`, `error`)

use std::env;
use std::fs;
use std::path::Path;
use std::process;
use xcvm::program::{Program, codec};
use xcvm::types::bytes::from_hex;
use xcvm::{error, info};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let command = args[1].as_str();
    if !matches!(command, "decode" | "hash") {
        error!("Unknown command: {command}\n");
        print_usage(&args[0]);
        process::exit(1);
    }

    let mut input_path: Option<&str> = None;
    let mut hex = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--hex" => {
                hex = true;
                i += 1;
            }
            other if other.starts_with('-') => {
                error!("Unexpected argument: {other}\n");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if input_path.is_some() {
                    error!("Only one input file is accepted");
                    process::exit(1);
                }
                input_path = Some(path);
                i += 1;
            }
        }
    }

    let Some(input_path) = input_path else {
        error!("{command} requires an input file");
        process::exit(1);
    };

    if !Path::new(input_path).exists() {
        error!("Input file does not exist: {input_path}");
        process::exit(1);
    }

    let program = load_program(input_path, hex);

    match command {
        "decode" => print!("{program}"),
        _ => println!("{}", program.hash()),
    }
}

/// Reads and decodes `path`, exiting on any failure.
fn load_program(path: &str, hex: bool) -> Program {
    let raw = fs::read(path).unwrap_or_else(|e| {
        error!("Failed to read {path}: {e}");
        process::exit(1);
    });

    let bytes = if hex {
        let text = String::from_utf8_lossy(&raw);
        from_hex(text.trim()).unwrap_or_else(|| {
            error!("{path} does not contain valid hex");
            process::exit(1);
        })
    } else {
        raw
    };

    match codec::decode(&bytes) {
        Ok(program) => {
            info!(
                "Decoded {path}: {} bytes, {} instructions, spawn depth {}",
                bytes.len(),
                program.instructions.len(),
                program.depth()
            );
            program
        }
        Err(e) => {
            error!("Invalid program in {path}: {e}");
            process::exit(1);
        }
    }
}

const USAGE: &str = "\
XCVM program inspector

USAGE:
    {program} <COMMAND> <file> [OPTIONS]

COMMANDS:
    decode    Print the instruction listing of an encoded program
    hash      Print the program hash

OPTIONS:
    --hex         Input file holds hex text instead of raw bytes
    -h, --help    Print this help message

ENVIRONMENT:
    XCVM_LOG    Minimum log level: debug, info, warn or error (default info)

EXAMPLES:
    {program} decode program.bin
    {program} hash program.hex --hex
";

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
