//! Version command implementation

use crate::error::Result;
use crate::source::{OVAL_DEFINITIONS_NS, SOURCE_DATASTREAM_NS};

/// Run version command
pub fn run() -> Result<()> {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!();
    println!("Supported documents:");
    println!("  OVAL Definitions: {OVAL_DEFINITIONS_NS}");
    for namespace in SOURCE_DATASTREAM_NS {
        println!("  Source Data Stream: {namespace}");
    }
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());

    Ok(())
}

fn rustc_version() -> &'static str {
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
