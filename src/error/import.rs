//! Definition model import errors
//!
//! These describe why a structurally readable document could not be turned
//! into a [`DefinitionModel`](crate::model::DefinitionModel). They are carried
//! as the source of [`OvalError::ModelImportFailed`](super::OvalError).

use thiserror::Error;

use crate::source::DocumentKind;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("not an OVAL Definitions document (found {found})")]
    WrongKind { found: DocumentKind },

    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),

    #[error("<{element}> at line {line} is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: String,
        line: u32,
    },

    #[error("<{element}> at line {line} is missing required element <{child}>")]
    MissingElement {
        element: String,
        child: String,
        line: u32,
    },

    #[error("invalid value '{value}' for '{attribute}' at line {line}")]
    InvalidValue {
        attribute: String,
        value: String,
        line: u32,
    },

    #[error("duplicate id '{id}'")]
    DuplicateId { id: String },

    #[error("'{from}' references undefined '{to}'")]
    DanglingReference { from: String, to: String },

    #[error("<criteria> at line {line} is nested deeper than {limit} levels")]
    NestingTooDeep { line: u32, limit: usize },

    #[error("circular extend_definition chain: {chain}")]
    CircularReference { chain: String },
}
