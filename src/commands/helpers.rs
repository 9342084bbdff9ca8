//! Command helper utilities

use std::path::Path;

use crate::cli::LoadArgs;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::session::Session;

/// Build a session for `file` from the configuration file and the command line
///
/// Settings from `--config` are applied first; every option given on the
/// command line then overrides its configured counterpart.
pub fn open_session(file: &Path, load: &LoadArgs) -> Result<Session> {
    let mut session = Session::new(file)?;

    if let Some(ref config_path) = load.config {
        let config = SessionConfig::from_file(config_path)?;
        config.apply(&mut session);
    }

    if load.datastream_id.is_some() {
        session.set_bundle_id(load.datastream_id.as_deref());
    }
    if load.oval_id.is_some() {
        session.set_component_id(load.oval_id.as_deref());
    }
    if load.variables.is_some() {
        session.set_variables(load.variables.as_deref());
    }
    if load.directives.is_some() {
        session.set_directives(load.directives.as_deref());
    }
    if load.results.is_some() {
        session.set_results_export(load.results.as_deref());
    }
    if load.report.is_some() {
        session.set_report_export(load.report.as_deref());
    }
    if let Some(policy) = load.selection {
        session.set_selection_policy(policy);
    }

    Ok(session)
}
