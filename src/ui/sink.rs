//! Diagnostic sink printing validation records to the terminal

use console::{Style, Term};

use crate::validate::{DiagnosticSink, Severity, ValidationRecord};

/// Sink writing each record to stderr with the document it belongs to
///
/// Records stamped with their own origin (an extracted component, say) are
/// labelled with it; the rest fall back to the origin given at construction.
pub struct ConsoleSink {
    term: Term,
    origin: String,
    warnings: usize,
    errors: usize,
}

impl ConsoleSink {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            term: Term::stderr(),
            origin: origin.into(),
            warnings: 0,
            errors: 0,
        }
    }

    pub fn render(&self, record: &ValidationRecord) -> String {
        let label = match record.severity {
            Severity::Error => Style::new().for_stderr().red().bold().apply_to("error"),
            Severity::Warning => Style::new().for_stderr().yellow().bold().apply_to("warning"),
        };
        let origin = record.origin.as_deref().unwrap_or(&self.origin);
        let location = match (record.line, record.column) {
            (Some(line), Some(column)) => format!("{origin}:{line}:{column}"),
            (Some(line), None) => format!("{origin}:{line}"),
            _ => origin.to_string(),
        };
        format!(
            "{label}: {} {}",
            record.message,
            Style::new().for_stderr().dim().apply_to(format!("({location})"))
        )
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl DiagnosticSink for ConsoleSink {
    fn report(&mut self, record: &ValidationRecord) {
        match record.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        if let Err(e) = self.term.write_line(&self.render(record)) {
            tracing::warn!(error = %e, "failed to print validation record");
        }
    }
}
