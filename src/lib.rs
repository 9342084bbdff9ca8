//! oval-session - resolve OVAL definitions from documents and data streams
//!
//! A [`Session`] is created for one input file, either an OVAL Definitions
//! document or a SCAP source data stream collection. Loading it optionally
//! validates the input, extracts the OVAL component from a data stream and
//! imports a [`DefinitionModel`].
//!
//! ```no_run
//! use oval_session::{DiagnosticBuffer, Session};
//!
//! let diagnostics = DiagnosticBuffer::default();
//! let mut session = Session::new("ssg-rhel9-ds.xml")?;
//! session.set_validation(true, false);
//! session.set_diagnostic_sink(Some(Box::new(diagnostics.clone())));
//! session.load_definitions()?;
//!
//! let model = session.model().expect("loaded");
//! println!("{} definitions", model.definitions().len());
//! # Ok::<(), oval_session::error::OvalError>(())
//! ```

pub mod bundle;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod source;
pub mod ui;
pub mod validate;

#[cfg(test)]
mod test_fixtures;

pub use bundle::{BundleSession, ComponentRole, SelectionPolicy, open_bundle};
pub use config::SessionConfig;
pub use error::{OvalError, Result};
pub use model::DefinitionModel;
pub use session::Session;
pub use source::{DocumentKind, Source, SourceHandle};
pub use validate::{DiagnosticBuffer, DiagnosticSink, Severity, ValidationRecord};
