//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - load: Options shared by every command that loads a session
//! - validate: Validate command arguments
//! - info: Info command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};

pub mod completions;
pub mod info;
pub mod load;
pub mod validate;

pub use completions::CompletionsArgs;
pub use info::InfoArgs;
pub use load::LoadArgs;
pub use validate::ValidateArgs;

/// oval-session - resolve and validate OVAL content
///
/// Load OVAL definitions from a standalone document or from a SCAP source data stream.
#[derive(Parser, Debug)]
#[command(
    name = "oval-session",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resolve and validate OVAL definitions and SCAP source data streams",
    long_about = "oval-session resolves one input file, either an OVAL Definitions document or a \
                  SCAP source data stream collection, into a validated definition model.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  oval-session validate oval.xml                  \x1b[90m# Structural checks\x1b[0m\n   \
                  oval-session validate ssg-ds.xml --full         \x1b[90m# Add business rules\x1b[0m\n   \
                  oval-session info ssg-ds.xml --oval-id <ID>     \x1b[90m# Pick one OVAL component\x1b[0m\n   \
                  oval-session info oval.xml --json               \x1b[90m# Machine readable summary\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a definitions document or data stream
    Validate(ValidateArgs),

    /// Load the input and summarize the resolved definitions
    Info(InfoArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
