//! Document validation
//!
//! This module handles:
//! - Type checks: a source must be of the kind the caller expects
//! - Structural (schema) checks through a [`ValidationEngine`]
//! - Business rule (schematron) checks in full validation mode
//! - Forwarding every reported problem to a caller supplied [`DiagnosticSink`]
//!
//! Validation never changes a source's content; at most it fills the cached
//! document kind.

pub mod datastream;
pub mod definitions;
pub mod engine;
pub mod sink;

pub use engine::{BuiltinEngine, ValidationEngine};
pub use sink::{DiagnosticBuffer, DiagnosticSink, NullSink, Severity, ValidationRecord};

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::source::{DocumentKind, Source};

/// How thoroughly a document is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Structural schema checks only
    #[default]
    Basic,
    /// Structural checks plus business rules
    Full,
}

impl ValidationLevel {
    pub fn from_full(full: bool) -> Self {
        if full {
            ValidationLevel::Full
        } else {
            ValidationLevel::Basic
        }
    }
}

/// Sink adapter that counts fatal records and stamps them with the
/// document's origin on their way to the caller's sink
struct CountingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    origin: &'a str,
    errors: usize,
}

impl DiagnosticSink for CountingSink<'_> {
    fn report(&mut self, record: &ValidationRecord) {
        if record.severity.is_fatal() {
            self.errors += 1;
        }
        if record.origin.is_some() {
            self.inner.report(record);
        } else {
            self.inner.report(&record.clone().in_document(self.origin));
        }
    }
}

/// Validate `source` as a document of kind `expected`
///
/// Fails with `OvalError::TypeMismatch` without running the engine when the
/// source classifies as a different kind. Otherwise every problem the engine
/// finds is forwarded to `sink` before this returns.
///
/// # Errors
///
/// - `OvalError::TypeMismatch` if the source is not of the expected kind
/// - `OvalError::UnreadableInput` if the content cannot be read
/// - `OvalError::ValidationFailed` if the engine reports a fatal problem
pub fn validate(
    source: &Source,
    expected: DocumentKind,
    level: ValidationLevel,
    engine: &dyn ValidationEngine,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    let origin = source.readable_origin();
    let actual = source.kind();
    if actual != expected {
        return Err(error::validation::type_mismatch(origin, expected, actual));
    }

    let bytes = source.bytes()?;
    tracing::debug!(%origin, kind = %expected, ?level, "validating");

    let mut counter = CountingSink {
        inner: sink,
        origin: &origin,
        errors: 0,
    };
    if engine.validate(bytes, expected, level, &mut counter) {
        tracing::debug!(%origin, "validation passed");
        Ok(())
    } else {
        let errors = counter.errors;
        tracing::warn!(%origin, errors, "validation failed");
        Err(error::validation::failed(origin, errors))
    }
}
