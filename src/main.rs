//! oval-session - resolve and validate OVAL content
//!
//! Command line front end for loading OVAL definitions from a standalone
//! document or a SCAP source data stream collection.

use std::error::Error as _;

use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use oval_session::cli::{Cli, Commands};
use oval_session::commands;
use oval_session::error::OvalError;

fn report(error: &OvalError) {
    eprintln!("Error: {error}");
    let mut cause = error.source();
    while let Some(inner) = cause {
        eprintln!("  Caused by: {inner}");
        cause = inner.source();
    }
    if let Some(help) = error.help() {
        eprintln!("  Help: {help}");
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}
