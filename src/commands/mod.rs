//! Command implementations for the oval-session CLI

pub mod completions;
pub mod helpers;
pub mod info;
pub mod validate;
pub mod version;
