//! Input reading and document kind errors

use super::OvalError;
use crate::source::DocumentKind;

/// Creates an unreadable input error
pub fn unreadable(origin: impl Into<String>, reason: impl Into<String>) -> OvalError {
    OvalError::UnreadableInput {
        origin: origin.into(),
        reason: reason.into(),
    }
}

/// Creates an unsupported document kind error
pub fn unsupported_kind(origin: impl Into<String>, kind: DocumentKind) -> OvalError {
    OvalError::UnsupportedDocumentKind {
        origin: origin.into(),
        kind,
    }
}
