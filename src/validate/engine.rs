//! Validation engines
//!
//! The engine contract is deliberately small: bytes in, records out, and a
//! verdict. [`BuiltinEngine`] checks OVAL Definitions and source data stream
//! documents; callers with a full XSD/schematron toolchain can plug their own
//! engine into a [`Session`](crate::session::Session).

use roxmltree::{Document, Node};

use super::sink::{DiagnosticSink, Severity, ValidationRecord};
use super::{ValidationLevel, datastream, definitions};
use crate::source::DocumentKind;

/// Schema and schematron validation engine
pub trait ValidationEngine {
    /// Check `document` as a document of `kind`
    ///
    /// Every problem found is reported to `sink`. Returns `true` iff no fatal
    /// problem was reported.
    fn validate(
        &self,
        document: &[u8],
        kind: DocumentKind,
        level: ValidationLevel,
        sink: &mut dyn DiagnosticSink,
    ) -> bool;
}

/// Engine shipped with the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngine;

impl ValidationEngine for BuiltinEngine {
    fn validate(
        &self,
        document: &[u8],
        kind: DocumentKind,
        level: ValidationLevel,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        let mut reporter = Reporter::new(sink);

        let text = match std::str::from_utf8(document) {
            Ok(text) => text,
            Err(e) => {
                reporter.report(ValidationRecord::new(
                    Severity::Error,
                    format!("document is not valid UTF-8: {e}"),
                ));
                return false;
            }
        };

        let doc = match Document::parse(text) {
            Ok(doc) => doc,
            Err(e) => {
                let pos = e.pos();
                reporter.report(
                    ValidationRecord::new(Severity::Error, format!("malformed XML: {e}"))
                        .at(pos.row, pos.col),
                );
                return false;
            }
        };

        let mut checker = Checker {
            doc: &doc,
            reporter,
        };
        match kind {
            DocumentKind::DefinitionsDocument => {
                definitions::check_structure(&mut checker);
                if level == ValidationLevel::Full {
                    definitions::check_rules(&mut checker);
                }
            }
            DocumentKind::Bundle => {
                datastream::check_structure(&mut checker);
                if level == ValidationLevel::Full {
                    datastream::check_rules(&mut checker);
                }
            }
            DocumentKind::Unknown => {
                checker.error(doc.root_element(), "document kind is not supported");
            }
        }

        checker.reporter.errors == 0
    }
}

/// Forwards records to a sink and counts the fatal ones
pub(crate) struct Reporter<'s> {
    sink: &'s mut dyn DiagnosticSink,
    errors: usize,
}

impl<'s> Reporter<'s> {
    fn new(sink: &'s mut dyn DiagnosticSink) -> Self {
        Self { sink, errors: 0 }
    }

    fn report(&mut self, record: ValidationRecord) {
        if record.severity.is_fatal() {
            self.errors += 1;
        }
        self.sink.report(&record);
    }
}

/// A parsed document being checked, plus the reporter findings go to
pub(crate) struct Checker<'d, 'input, 's> {
    pub(crate) doc: &'d Document<'input>,
    reporter: Reporter<'s>,
}

impl<'d, 'input> Checker<'d, 'input, '_> {
    pub(crate) fn error(&mut self, node: Node<'_, '_>, message: impl Into<String>) {
        self.emit(Severity::Error, node, message);
    }

    pub(crate) fn warning(&mut self, node: Node<'_, '_>, message: impl Into<String>) {
        self.emit(Severity::Warning, node, message);
    }

    fn emit(&mut self, severity: Severity, node: Node<'_, '_>, message: impl Into<String>) {
        let pos = self.doc.text_pos_at(node.range().start);
        self.reporter
            .report(ValidationRecord::new(severity, message).at(pos.row, pos.col));
    }

    /// Report an error unless `node` carries attribute `name`; returns its value
    pub(crate) fn required_attr<'a>(&mut self, node: Node<'a, '_>, name: &str) -> Option<&'a str> {
        let value = node.attribute(name);
        if value.is_none() {
            self.error(
                node,
                format!(
                    "element <{}> is missing required attribute '{name}'",
                    node.tag_name().name()
                ),
            );
        }
        value
    }

    pub(crate) fn root(&self) -> Node<'d, 'input> {
        self.doc.root_element()
    }
}

/// Element children of `node`
pub(crate) fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// First element child of `node` with the given local name
pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    elements(node).find(|n| n.tag_name().name() == name)
}
