#![deny(unused_must_use)]
#![warn(clippy::pedantic)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]

use ccc::args::Args;
use ccc::codegen;
use ccc::diag::Diagnostics;
use ccc::lexer;
use ccc::parser;
use ccc::semantic;

use std::fs;
use std::process::exit;

use anyhow::{anyhow, Result};

fn main() -> Result<()> {
    let args = Args::parse();

    if !fs::exists(&args.input)? {
        return Err(anyhow!(
            "Input file '{}' does not exist",
            args.input.display()
        ));
    }

    if args.verbose {
        println!("Reading file: {}", args.input.display());
    }
    let source = fs::read_to_string(&args.input)?;

    let mut diag = Diagnostics::new(&args.input.to_string_lossy());

    if args.verbose {
        println!("Performing lexical analysis...");
    }
    let tokens = lexer::lex(&source, &mut diag);
    abort_on_errors(&mut diag);

    if args.verbose {
        println!("Performing syntax analysis...");
    }
    let program = parser::parse(&tokens, &mut diag);
    abort_on_errors(&mut diag);

    if args.verbose {
        println!("Performing semantic analysis...");
    }
    semantic::analyze(&program, &mut diag);
    abort_on_errors(&mut diag);

    if args.verbose {
        println!("Generating COIL code...");
    }
    let object = codegen::generate(&program, args.opt_level, &mut diag);
    abort_on_errors(&mut diag);

    if args.verbose {
        println!("Writing output to: {}", args.output.display());
    }
    fs::write(&args.output, object.encode())?;

    // surviving warnings and infos still print on success
    diag.flush();

    if args.verbose {
        println!(
            "Compilation successful: {} -> {}",
            args.input.display(),
            args.output.display()
        );
    }

    Ok(())
}

/// Gate between phases: print everything accumulated and stop with a
/// nonzero exit once any error has been recorded.
fn abort_on_errors(diag: &mut Diagnostics) {
    if diag.has_errors() {
        diag.flush();
        exit(1);
    }
}
