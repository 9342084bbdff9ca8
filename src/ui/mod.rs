//! Terminal presentation layer
//!
//! - [`sink`]: Prints validation records as they are reported
//! - [`formatter`]: Renders a loaded session as text or JSON

pub mod formatter;
pub mod sink;

pub use formatter::{JsonFormatter, SessionSummary, SimpleFormatter, SummaryFormatter};
pub use sink::ConsoleSink;
