//! Configuration file handling
//!
//! This module contains data structures for:
//! - `session.yaml` - defaults applied to a session before loading

pub mod session;

pub use session::{ExportConfig, SessionConfig, ValidationConfig};
