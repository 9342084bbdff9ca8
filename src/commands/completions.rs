//! Shell completions command

use clap::CommandFactory;

use crate::cli::CompletionsArgs;
use crate::error::Result;

/// Generate shell completions
pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = <crate::cli::Cli as CommandFactory>::command();
    clap_complete::generate(
        args.shell,
        &mut cmd,
        "oval-session",
        &mut std::io::stdout().lock(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    #[test]
    fn test_completions_every_shell() {
        for shell in [
            Shell::Bash,
            Shell::Elvish,
            Shell::Fish,
            Shell::PowerShell,
            Shell::Zsh,
        ] {
            assert!(run(CompletionsArgs { shell }).is_ok());
        }
    }
}
