//! Document kind detection
//!
//! Classification looks only at the root element of a document. It streams
//! the input with `quick-xml` and stops at the first start tag, so even large
//! data stream collections are classified without building a tree.

use std::fmt;

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use serde::Serialize;

/// Namespace of OVAL Definitions 5.x documents
pub const OVAL_DEFINITIONS_NS: &str = "http://oval.mitre.org/XMLSchema/oval-definitions-5";

/// Namespaces of SCAP source data stream collections
pub const SOURCE_DATASTREAM_NS: [&str; 2] = [
    "http://scap.nist.gov/schema/scap/source/1.2",
    "http://scap.nist.gov/schema/scap/source/1.3",
];

/// Kind of an input document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A standalone OVAL Definitions document
    DefinitionsDocument,
    /// A SCAP source data stream collection
    Bundle,
    /// Anything else; no pipeline stage accepts it
    Unknown,
}

impl DocumentKind {
    /// Whether a session can be built on top of this kind
    pub fn is_session_input(self) -> bool {
        matches!(self, DocumentKind::DefinitionsDocument | DocumentKind::Bundle)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::DefinitionsDocument => "OVAL Definitions",
            DocumentKind::Bundle => "Source Data Stream",
            DocumentKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Classify raw document bytes by their root element
///
/// Returns [`DocumentKind::Unknown`] for empty input, non-XML content and any
/// root element that is not recognized.
pub fn classify_bytes(bytes: &[u8]) -> DocumentKind {
    let mut reader = NsReader::from_reader(bytes);

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(start))) | Ok((ns, Event::Empty(start))) => {
                let local = start.local_name();
                let namespace = match ns {
                    ResolveResult::Bound(Namespace(ns)) => std::str::from_utf8(ns).ok(),
                    _ => None,
                };
                return kind_of_root(local.as_ref(), namespace);
            }
            Ok((_, Event::Eof)) => return DocumentKind::Unknown,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "document is not well-formed XML");
                return DocumentKind::Unknown;
            }
        }
    }
}

fn kind_of_root(local_name: &[u8], namespace: Option<&str>) -> DocumentKind {
    match (local_name, namespace) {
        (b"oval_definitions", Some(OVAL_DEFINITIONS_NS)) => DocumentKind::DefinitionsDocument,
        (b"data-stream-collection", Some(ns)) if SOURCE_DATASTREAM_NS.contains(&ns) => {
            DocumentKind::Bundle
        }
        _ => DocumentKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{datastream_collection, definitions_document, DatastreamSpec};

    #[test]
    fn test_classify_definitions() {
        let xml = definitions_document("oval:org.example:def:1");
        assert_eq!(
            classify_bytes(xml.as_bytes()),
            DocumentKind::DefinitionsDocument
        );
    }

    #[test]
    fn test_classify_datastream() {
        let xml = datastream_collection(&DatastreamSpec::single_checks());
        assert_eq!(classify_bytes(xml.as_bytes()), DocumentKind::Bundle);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let xml = datastream_collection(&DatastreamSpec::single_checks());
        let first = classify_bytes(xml.as_bytes());
        for _ in 0..3 {
            assert_eq!(classify_bytes(xml.as_bytes()), first);
        }
    }

    #[test]
    fn test_classify_skips_prolog_and_comments() {
        let xml = format!(
            "<?xml version=\"1.0\"?>\n<!-- generated -->\n{}",
            definitions_document("oval:org.example:def:1")
                .trim_start_matches("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        assert_eq!(
            classify_bytes(xml.as_bytes()),
            DocumentKind::DefinitionsDocument
        );
    }

    #[test]
    fn test_classify_wrong_namespace() {
        let xml = r#"<oval_definitions xmlns="urn:example:not-oval"/>"#;
        assert_eq!(classify_bytes(xml.as_bytes()), DocumentKind::Unknown);
    }

    #[test]
    fn test_classify_other_scap_documents() {
        let xml = r#"<oval_variables xmlns="http://oval.mitre.org/XMLSchema/oval-variables-5"/>"#;
        assert_eq!(classify_bytes(xml.as_bytes()), DocumentKind::Unknown);
    }

    #[test]
    fn test_classify_garbage() {
        assert_eq!(classify_bytes(b""), DocumentKind::Unknown);
        assert_eq!(classify_bytes(b"plain text"), DocumentKind::Unknown);
        assert_eq!(classify_bytes(b"<<<"), DocumentKind::Unknown);
    }

    #[test]
    fn test_session_input_kinds() {
        assert!(DocumentKind::DefinitionsDocument.is_session_input());
        assert!(DocumentKind::Bundle.is_session_input());
        assert!(!DocumentKind::Unknown.is_session_input());
    }
}
