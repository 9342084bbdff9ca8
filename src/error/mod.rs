//! Error types and handling for oval-session
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`source`]: Input reading and document kind errors
//! - [`validation`]: Type mismatch and validation failures
//! - [`bundle`]: Data stream resolution errors
//! - [`import`]: Definition model import failures
//! - [`config`]: Configuration errors

pub mod bundle;
pub mod config;
pub mod import;
pub mod source;
pub mod validation;

pub use import::ImportError;

use miette::Diagnostic;
use thiserror::Error;

use crate::source::DocumentKind;

/// Main error type for session operations
#[derive(Error, Diagnostic, Debug)]
pub enum OvalError {
    // Source errors
    #[error("Unable to read input '{origin}': {reason}")]
    #[diagnostic(
        code(oval::source::unreadable),
        help("Check that the file exists, is readable and is UTF-8 encoded XML")
    )]
    UnreadableInput { origin: String, reason: String },

    #[error(
        "Unsupported document '{origin}': expected OVAL Definitions or Source Data Stream but found {kind}"
    )]
    #[diagnostic(
        code(oval::source::unsupported_kind),
        help("The input must be an OVAL Definitions document or a SCAP source data stream")
    )]
    UnsupportedDocumentKind { origin: String, kind: DocumentKind },

    // Validation errors
    #[error("Type mismatch: {origin}. Expecting {expected} but found {actual}")]
    #[diagnostic(code(oval::validation::type_mismatch))]
    TypeMismatch {
        origin: String,
        expected: DocumentKind,
        actual: DocumentKind,
    },

    #[error("Validation of '{origin}' failed with {errors} error(s)")]
    #[diagnostic(
        code(oval::validation::failed),
        help("Diagnostics were reported through the configured sink")
    )]
    ValidationFailed { origin: String, errors: usize },

    // Bundle errors
    #[error("Failed to parse data stream collection '{origin}': {reason}")]
    #[diagnostic(code(oval::bundle::parse_failed))]
    BundleParseError { origin: String, reason: String },

    #[error("Multiple data streams found ({candidates}) and none was selected")]
    #[diagnostic(
        code(oval::bundle::ambiguous_datastream),
        help("Select one with --datastream-id")
    )]
    AmbiguousDatastream { candidates: String },

    #[error("Data stream '{id}' not found")]
    #[diagnostic(code(oval::bundle::datastream_not_found))]
    DatastreamNotFound { id: String },

    #[error("Multiple '{role}' components found ({candidates}) and none was selected")]
    #[diagnostic(
        code(oval::bundle::ambiguous_component),
        help("Select one with --oval-id")
    )]
    AmbiguousComponent { role: String, candidates: String },

    #[error("Component '{id}' was not found in '{role}' container")]
    #[diagnostic(code(oval::bundle::component_not_found))]
    ComponentNotFound { role: String, id: String },

    #[error("Internal error: component '{href}' was not found in the data stream session cache")]
    #[diagnostic(code(oval::bundle::internal_resolution))]
    InternalResolutionError { href: String },

    // Model errors
    #[error("Failed to import the OVAL Definitions from '{origin}'")]
    #[diagnostic(code(oval::model::import_failed))]
    ModelImportFailed {
        origin: String,
        #[source]
        cause: ImportError,
    },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(oval::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(oval::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(oval::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for OvalError {
    fn from(err: std::io::Error) -> Self {
        OvalError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for OvalError {
    fn from(err: serde_yaml::Error) -> Self {
        OvalError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for OvalError {
    fn from(err: serde_json::Error) -> Self {
        OvalError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, OvalError>;
