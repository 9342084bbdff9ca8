//! Session configuration file (YAML)
//!
//! ```yaml
//! validation:
//!   enabled: true
//!   full: false
//! datastream_id: scap_org.example_datastream_1
//! component_id: scap_org.example_cref_oval.xml
//! variables: external-variables.xml
//! directives: directives.xml
//! export:
//!   results: results.xml
//!   report: report.html
//! selection: strict
//! ```
//!
//! Relative `variables` and `directives` paths are resolved against the
//! directory of the configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bundle::SelectionPolicy;
use crate::error::{self, Result};
use crate::session::Session;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub enabled: bool,
    pub full: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub results: Option<String>,
    pub report: Option<String>,
}

/// Settings applied to a [`Session`] before loading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub validation: ValidationConfig,
    pub datastream_id: Option<String>,
    pub component_id: Option<String>,
    pub variables: Option<PathBuf>,
    pub directives: Option<PathBuf>,
    pub export: ExportConfig,
    pub selection: SelectionPolicy,
}

impl SessionConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Read configuration from a file
    ///
    /// # Errors
    ///
    /// - `OvalError::ConfigReadFailed` if the file cannot be read
    /// - `OvalError::ConfigParseFailed` if it is not a valid configuration
    pub fn from_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| error::config::read_failed(&origin, e.to_string()))?;
        let mut config: Self = serde_yaml::from_str(&yaml)
            .map_err(|e| error::config::parse_failed(&origin, e.to_string()))?;

        if let Some(base) = path.parent() {
            for file in [&mut config.variables, &mut config.directives]
                .into_iter()
                .flatten()
            {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
        tracing::debug!(path = %origin, "loaded session configuration");
        Ok(config)
    }

    /// Serialize configuration to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Configure `session` with every setting of this configuration
    pub fn apply(&self, session: &mut Session) {
        session.set_validation(self.validation.enabled, self.validation.full);
        session.set_bundle_id(self.datastream_id.as_deref());
        session.set_component_id(self.component_id.as_deref());
        session.set_variables(self.variables.as_deref());
        session.set_directives(self.directives.as_deref());
        session.set_results_export(self.export.results.as_deref());
        session.set_report_export(self.export.report.as_deref());
        session.set_selection_policy(self.selection);
    }
}
