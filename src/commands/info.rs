//! Info command implementation

use crate::cli::InfoArgs;
use crate::error::Result;
use crate::ui::{ConsoleSink, JsonFormatter, SessionSummary, SimpleFormatter, SummaryFormatter};

use super::helpers::open_session;

/// Run info command
pub fn run(args: InfoArgs) -> Result<()> {
    let mut session = open_session(&args.file, &args.load)?;
    if args.skip_valid {
        session.set_validation(false, false);
    } else {
        let full = args.full || session.full_validation_enabled();
        session.set_validation(true, full);
        let origin = session.main_source().readable_origin();
        session.set_diagnostic_sink(Some(Box::new(ConsoleSink::new(origin))));
    }

    session.load_definitions()?;

    let formatter: Box<dyn SummaryFormatter> = if args.json {
        Box::new(JsonFormatter)
    } else {
        Box::new(SimpleFormatter)
    };
    if let Some(summary) = SessionSummary::from_session(&session)? {
        println!("{}", formatter.format(&summary)?);
    }
    session.destroy();

    Ok(())
}
