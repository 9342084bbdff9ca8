use std::path::PathBuf;

use clap::Args;

use crate::bundle::SelectionPolicy;

/// Options for building and loading a session
///
/// Every option left unset falls back to the configuration file, if one is
/// given, and then to the session defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Data stream to use when the input holds several
    #[arg(long, value_name = "ID")]
    pub datastream_id: Option<String>,

    /// OVAL component (or component-ref) id to use when the data stream holds several
    #[arg(long, value_name = "ID")]
    pub oval_id: Option<String>,

    /// External variables file
    #[arg(long, value_name = "FILE")]
    pub variables: Option<PathBuf>,

    /// Directives file
    #[arg(long, value_name = "FILE")]
    pub directives: Option<PathBuf>,

    /// Where evaluation results should be written
    #[arg(long, value_name = "FILE")]
    pub results: Option<String>,

    /// Where the report should be written
    #[arg(long, value_name = "FILE")]
    pub report: Option<String>,

    /// What to do when no id was given and several candidates exist
    #[arg(long, value_enum, value_name = "POLICY")]
    pub selection: Option<SelectionPolicy>,

    /// Session configuration file (YAML)
    #[arg(long, value_name = "FILE", env = "OVAL_SESSION_CONFIG")]
    pub config: Option<PathBuf>,
}
