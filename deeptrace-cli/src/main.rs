//! DeepTrace CLI - offline deepfake analysis and ledger lookups.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use deeptrace_core::DEFAULT_FRAME_COUNT;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Pretty-printed JSON, same shape as the HTTP API
    Json,
}

/// When to emit ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Unsupported file type (only .mp4 and .avi)
  65  File hash is not hexadecimal
  66  Cannot read input file
  74  Cannot write output";

#[derive(Parser)]
#[command(name = "deeptrace")]
#[command(author, version, about = "Deterministic deepfake analysis for video files", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Print only the essential result
    #[arg(short, long, global = true)]
    quiet: bool,

    /// When to use colors
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a video file (MP4 or AVI) without contacting a server
    Analyze {
        /// Path to the video file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of frames to score
        #[arg(short = 'n', long, default_value_t = DEFAULT_FRAME_COUNT)]
        frames: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Look up a file hash on the ledger
    Verify {
        /// Hex-encoded SHA-256 of the file
        #[arg(value_name = "FILEHASH")]
        filehash: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_logging(verbose: bool, quiet: bool, color: ColorChoice) {
    let default_filter = if verbose {
        "deeptrace=debug,deeptrace_core=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_ansi(color != ColorChoice::Never)
        .init();
}

fn init_color(color: ColorChoice) {
    match color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    init_color(cli.color);
    init_logging(cli.verbose, cli.quiet, cli.color);

    let result = match cli.command {
        Commands::Analyze {
            file,
            frames,
            format,
        } => commands::analyze::execute(&file, frames, format, cli.quiet),
        Commands::Verify { filehash, format } => {
            commands::verify::execute(&filehash, format, cli.quiet)
        }
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            let exit = ExitCode::from_anyhow(&err);
            if let Some(message) = &exit.message {
                eprintln!("{} {}", "Error:".red().bold(), message);
            }
            std::process::ExitCode::from(exit.code)
        }
    }
}
