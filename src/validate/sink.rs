//! Diagnostic records and the sinks that receive them

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

/// Severity of a validation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// Only errors make a document invalid
    pub fn is_fatal(self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single problem found while validating a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRecord {
    pub severity: Severity,
    /// Readable origin of the validated document; filled in by [`validate`](super::validate)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: String,
}

impl ValidationRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            origin: None,
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn in_document(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

impl fmt::Display for ValidationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut location: Vec<String> = self.origin.iter().cloned().collect();
        location.extend(self.line.map(|l| l.to_string()));
        if self.line.is_some() {
            location.extend(self.column.map(|c| c.to_string()));
        }
        if !location.is_empty() {
            write!(f, "{}: ", location.join(":"))?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Receiver of validation records
///
/// A sink is only ever called synchronously from inside a validation call.
pub trait DiagnosticSink {
    fn report(&mut self, record: &ValidationRecord);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&ValidationRecord),
{
    fn report(&mut self, record: &ValidationRecord) {
        self(record);
    }
}

/// Sink used when the caller configured none; records only reach the log
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, record: &ValidationRecord) {
        tracing::debug!(%record, "validation record (no sink configured)");
    }
}

/// Sink collecting records into a shared buffer
///
/// Clones share the same buffer, so one clone can be handed to a session
/// while another is kept to inspect what was reported.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBuffer {
    records: Rc<RefCell<Vec<ValidationRecord>>>,
}

impl DiagnosticBuffer {
    pub fn records(&self) -> Vec<ValidationRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.severity.is_fatal())
            .count()
    }
}

impl DiagnosticSink for DiagnosticBuffer {
    fn report(&mut self, record: &ValidationRecord) {
        self.records.borrow_mut().push(record.clone());
    }
}
