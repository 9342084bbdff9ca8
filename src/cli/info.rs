use std::path::PathBuf;

use clap::Parser;

use super::LoadArgs;

/// Arguments for the info command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Summarize a definitions document:\n    oval-session info oval.xml\n\n\
                  Summarize a data stream as JSON:\n    oval-session info ssg-ds.xml --json\n\n\
                  Skip validation:\n    oval-session info ssg-ds.xml --skip-valid")]
pub struct InfoArgs {
    /// OVAL Definitions document or SCAP source data stream
    pub file: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not validate before loading
    #[arg(long)]
    pub skip_valid: bool,

    /// Validate business rules too
    #[arg(long, conflicts_with = "skip_valid")]
    pub full: bool,

    #[command(flatten)]
    pub load: LoadArgs,
}
