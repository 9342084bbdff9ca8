//! Source handles: a document plus where it came from

use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Serialize;

use super::kind::{DocumentKind, classify_bytes};
use crate::error::{self, Result};

/// Shared handle to a [`Source`]
///
/// In the definitions-only case the session's main source and its definitions
/// source are the same handle, so handles are reference counted. A handle is
/// released when its last owner drops it.
pub type SourceHandle = Rc<Source>;

/// Where a document came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Provenance {
    /// A file on disk, read lazily
    File { path: PathBuf },
    /// An in-memory buffer with a caller supplied label
    Memory { label: String },
    /// A component carved out of a data stream collection
    Extracted {
        /// Readable origin of the collection
        bundle: String,
        /// Id of the component-ref that selected the component
        component_ref: String,
        /// Id of the embedded component (or the file it points to)
        component_id: String,
        /// The component-ref's `xlink:href`
        href: String,
    },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::File { path } => write!(f, "{}", path.display()),
            Provenance::Memory { label } => f.write_str(label),
            Provenance::Extracted {
                bundle,
                component_id,
                ..
            } => write!(f, "{bundle}/{component_id}"),
        }
    }
}

/// An input document
///
/// Provenance is fixed at construction. Content is read on first access and
/// the outcome, including a failed read, is memoized. The document kind is
/// computed once from the content and cached.
pub struct Source {
    provenance: Provenance,
    content: OnceCell<std::result::Result<Vec<u8>, String>>,
    kind: OnceCell<DocumentKind>,
}

impl Source {
    /// Create a handle for a file; nothing is read until the content is needed
    pub fn from_file(path: impl Into<PathBuf>) -> SourceHandle {
        Rc::new(Self {
            provenance: Provenance::File { path: path.into() },
            content: OnceCell::new(),
            kind: OnceCell::new(),
        })
    }

    /// Create a handle for an in-memory document
    pub fn from_bytes(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> SourceHandle {
        Rc::new(Self::with_content(
            Provenance::Memory {
                label: label.into(),
            },
            bytes.into(),
        ))
    }

    pub(crate) fn with_content(provenance: Provenance, bytes: Vec<u8>) -> Self {
        Self {
            provenance,
            content: OnceCell::from(Ok(bytes)),
            kind: OnceCell::new(),
        }
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Human readable origin used in diagnostics and error messages
    pub fn readable_origin(&self) -> String {
        self.provenance.to_string()
    }

    /// Path of the file backing this source, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.provenance {
            Provenance::File { path } => Some(path),
            _ => None,
        }
    }

    /// Raw document bytes
    ///
    /// # Errors
    ///
    /// Returns `OvalError::UnreadableInput` if the backing file cannot be read.
    pub fn bytes(&self) -> Result<&[u8]> {
        let content = self.content.get_or_init(|| match &self.provenance {
            Provenance::File { path } => {
                tracing::debug!(path = %path.display(), "reading source");
                std::fs::read(path).map_err(|e| e.to_string())
            }
            Provenance::Memory { .. } | Provenance::Extracted { .. } => Ok(Vec::new()),
        });

        content
            .as_deref()
            .map_err(|reason| error::source::unreadable(self.readable_origin(), reason.clone()))
    }

    /// Document text
    ///
    /// # Errors
    ///
    /// Returns `OvalError::UnreadableInput` if the content cannot be read or is
    /// not valid UTF-8.
    pub fn text(&self) -> Result<&str> {
        let bytes = self.bytes()?;
        std::str::from_utf8(bytes).map_err(|e| {
            error::source::unreadable(self.readable_origin(), format!("not valid UTF-8: {e}"))
        })
    }

    /// Document kind, classified on first call and cached afterwards
    ///
    /// Unreadable content classifies as [`DocumentKind::Unknown`].
    pub fn kind(&self) -> DocumentKind {
        *self.kind.get_or_init(|| {
            let kind = self
                .bytes()
                .map(classify_bytes)
                .unwrap_or(DocumentKind::Unknown);
            tracing::debug!(origin = %self.provenance, %kind, "classified source");
            kind
        })
    }

    /// BLAKE3 digest of the content
    ///
    /// # Errors
    ///
    /// Returns `OvalError::UnreadableInput` if the content cannot be read.
    pub fn digest(&self) -> Result<String> {
        let bytes = self.bytes()?;
        Ok(format!("blake3:{}", blake3::hash(bytes).to_hex()))
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("provenance", &self.provenance)
            .field("kind", &self.kind.get())
            .finish_non_exhaustive()
    }
}
