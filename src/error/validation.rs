//! Validation errors

use super::OvalError;
use crate::source::DocumentKind;

/// Creates a type mismatch error
pub fn type_mismatch(
    origin: impl Into<String>,
    expected: DocumentKind,
    actual: DocumentKind,
) -> OvalError {
    OvalError::TypeMismatch {
        origin: origin.into(),
        expected,
        actual,
    }
}

/// Creates a validation failed error
pub fn failed(origin: impl Into<String>, errors: usize) -> OvalError {
    OvalError::ValidationFailed {
        origin: origin.into(),
        errors,
    }
}
