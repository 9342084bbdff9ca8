//! Input documents
//!
//! A [`Source`] is a document together with its provenance:
//! - a file on disk (read lazily on first access)
//! - an in-memory buffer
//! - a component extracted from a data stream collection
//!
//! ## Module Organization
//!
//! - `handle.rs`: `Source`, `SourceHandle` and `Provenance`
//! - `kind.rs`: `DocumentKind` and root element classification

pub mod handle;
pub mod kind;

pub use handle::{Provenance, Source, SourceHandle};
pub use kind::{DocumentKind, OVAL_DEFINITIONS_NS, SOURCE_DATASTREAM_NS, classify_bytes};
