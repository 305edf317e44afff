// desalink - resolve transmigration village names to gazetteer codes

mod dataset;
mod exit_codes;
mod resolve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "desalink")]
#[command(about = "Link transmigration village names to administrative gazetteer codes")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every query in the config's query list against the gazetteer
    #[command(after_help = "\
Exit code 62 means the run finished but unmatched queries remain and the \
config sets fail_on_unmatched = true.

Examples:
  desalink run transmigrasi.toml
  desalink run transmigrasi.toml --json > report.json
  desalink run transmigrasi.toml --output-dir out/
  RUST_LOG=debug desalink run transmigrasi.toml --quiet")]
    Run {
        /// Path to the resolution config (.toml)
        config: PathBuf,

        /// Print the full report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Directory for [output] files (default: the config's directory)
        #[arg(long, env = "DESALINK_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Suppress the stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Parse and validate a config without running
    #[command(after_help = "\
Examples:
  desalink validate transmigrasi.toml")]
    Validate {
        /// Path to the resolution config (.toml)
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  desalink-resolve ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(EXIT_USAGE) } else { ExitCode::from(EXIT_SUCCESS) };
        }
    };

    // RUST_LOG wins; --quiet only lowers the default
    let quiet = matches!(cli.command, Commands::Run { quiet: true, .. });
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if quiet { "error" } else { "warn" }),
    )
    .format_timestamp(None)
    .init();

    let result = match cli.command {
        Commands::Run { config, json, output_dir, quiet } => resolve::cmd_run(config, json, output_dir, quiet),
        Commands::Validate { config } => resolve::cmd_validate(config),
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
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
