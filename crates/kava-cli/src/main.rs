// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Kava command-line interface.
//!
//! A thin driver over `kava-core`: it reads a source file (or stdin), runs
//! the scanner/parser, and prints tokens, the canonical emit, the normalized
//! emit, or a numeric evaluation. Diagnostics render through miette with the
//! offending source window.

use std::io::Read;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use kava_core::eval::debug_eval;
use kava_core::parse_source;
use kava_core::source_analysis::{scan, scan_with_layout};
use kava_core::unparse::{emit, emit_common};
use miette::{IntoDiagnostic, Result, WrapErr};

/// Kava: a CoffeeScript-flavored scripting language front-end
#[derive(Debug, Parser)]
#[command(name = "kava")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a file and dump its token stream
    Tokens {
        /// Source file, or `-` for stdin
        path: Utf8PathBuf,

        /// Insert block markers at indentation shifts
        #[arg(long)]
        layout: bool,
    },

    /// Parse a file and print the canonical bracket-annotated form
    Parse {
        /// Source file, or `-` for stdin
        path: Utf8PathBuf,
    },

    /// Parse a file and print the normalized form
    Emit {
        /// Source file, or `-` for stdin
        path: Utf8PathBuf,
    },

    /// Parse an expression and evaluate it numerically
    Eval {
        /// The expression text
        expression: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing only when RUST_LOG asks for it, so normal output
    // stays clean.
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    let cli = Cli::parse();
    match cli.command {
        Command::Tokens { path, layout } => tokens(&path, layout),
        Command::Parse { path } => parse(&path),
        Command::Emit { path } => emit_file(&path),
        Command::Eval { expression } => eval(&expression),
    }
}

fn read_source(path: &Utf8PathBuf) -> Result<String> {
    if path.as_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .into_diagnostic()
            .wrap_err("failed to read stdin")?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {path}"))
    }
}

fn tokens(path: &Utf8PathBuf, layout: bool) -> Result<()> {
    let source = read_source(path)?;
    let result = if layout {
        scan_with_layout(&source)
    } else {
        scan(&source)
    };
    let tokens = result.map_err(|error| miette::Report::new(error).with_source_code(source))?;
    for token in tokens {
        let span = token.span();
        println!("{:>5}..{:<5} {:?} {:?}", span.start(), span.end(), token.kind(), token.text());
    }
    Ok(())
}

fn parse(path: &Utf8PathBuf) -> Result<()> {
    let source = read_source(path)?;
    let block =
        parse_source(&source).map_err(|error| miette::Report::new(error).with_source_code(source))?;
    println!("{}", emit(&block));
    Ok(())
}

fn emit_file(path: &Utf8PathBuf) -> Result<()> {
    let source = read_source(path)?;
    let block =
        parse_source(&source).map_err(|error| miette::Report::new(error).with_source_code(source))?;
    println!("{}", emit_common(&block));
    Ok(())
}

fn eval(expression: &str) -> Result<()> {
    let block = parse_source(expression)
        .map_err(|error| miette::Report::new(error).with_source_code(expression.to_string()))?;
    for statement in &block.expressions {
        match debug_eval(statement) {
            Some(value) => println!("{value}"),
            None => println!("(not a numeric expression)"),
        }
    }
    Ok(())
}
