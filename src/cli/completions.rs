use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    oval-session completions --shell bash > ~/.bash_completion.d/oval-session\n\n\
                  Generate zsh completions:\n    oval-session completions --shell zsh > ~/.zfunc/_oval-session\n\n\
                  Generate fish completions:\n    oval-session completions --shell fish > ~/.config/fish/completions/oval-session.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(long, value_enum)]
    pub shell: Shell,
}
