//! Validate command implementation
//!
//! Loads the input with validation forced on. For a data stream both the
//! collection and the OVAL component it resolves to are validated.

use console::Style;

use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::ui::ConsoleSink;

use super::helpers::open_session;

/// Run validate command
pub fn run(args: ValidateArgs) -> Result<()> {
    let mut session = open_session(&args.file, &args.load)?;
    let full = args.full || session.full_validation_enabled();
    session.set_validation(true, full);

    let origin = session.main_source().readable_origin();
    session.set_diagnostic_sink(Some(Box::new(ConsoleSink::new(origin.as_str()))));
    session.load_definitions()?;

    let level = if full { "full" } else { "basic" };
    println!(
        "{} {} {}",
        Style::new().green().bold().apply_to("Valid:"),
        origin,
        Style::new().dim().apply_to(format!("({level} validation)"))
    );
    session.destroy();

    Ok(())
}
