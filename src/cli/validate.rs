use std::path::PathBuf;

use clap::Parser;

use super::LoadArgs;

/// Arguments for the validate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Validate a definitions document:\n    oval-session validate oval.xml\n\n\
                  Validate a data stream and its OVAL component with business rules:\n    oval-session validate ssg-ds.xml --full\n\n\
                  Validate one of several OVAL components:\n    oval-session validate ssg-ds.xml --oval-id scap_org.example_cref_oval.xml")]
pub struct ValidateArgs {
    /// OVAL Definitions document or SCAP source data stream
    pub file: PathBuf,

    /// Also check business rules (schematron)
    #[arg(long)]
    pub full: bool,

    #[command(flatten)]
    pub load: LoadArgs,
}
