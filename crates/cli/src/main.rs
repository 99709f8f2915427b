// lmatch - match two collections of labels that name the same things differently

mod exit_codes;
mod labels;
mod matching;
mod output;
mod prompt;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use labelmatch_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use matching::MatchArgs;

#[derive(Parser)]
#[command(name = "lmatch")]
#[command(about = "Approximate one-to-one matching of label collections")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match LEFT labels to RIGHT labels (exit 0 = done, exit 1 = unmatched with --strict)
    #[command(after_help = "\
Examples:
  lmatch match crm_columns.csv erp_columns.csv
  lmatch match left.txt right.txt --lower-case --strip default --json
  lmatch match left.json right.json --strategy global_greedy --floor 0.7
  lmatch match left.txt right.txt -c columns.toml --strategy interactive --show-auto")]
    Match(MatchArgs),

    /// Validate a match config without running
    #[command(after_help = "\
Examples:
  lmatch validate columns.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Print the similarity of two strings (0-1)
    Score {
        a: String,
        b: String,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit: ",
        env!("LMATCH_BUILD"),
        "\ntarget: ",
        env!("LMATCH_TARGET")
    )
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        None => Err(CliError::args("no command given").with_hint("lmatch --help")),
        Some(Commands::Match(args)) => matching::cmd_match(args),
        Some(Commands::Validate { config }) => matching::cmd_validate(config),
        Some(Commands::Score { a, b, json }) => matching::cmd_score(a, b, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the registry's exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::InputUniqueness { .. } => {
                Some("each input file must list every label once".to_string())
            }
            ReconError::Collision { .. } => {
                Some("drop --lower-case or pass a narrower --strip set".to_string())
            }
            ReconError::EmptyNormalization => {
                Some("add --lower-case, or omit --strip none".to_string())
            }
            ReconError::UnsupportedMode(_) => {
                Some("set single_match_only = true; only one-to-one matching is available".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
