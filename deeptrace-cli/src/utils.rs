//! Common utility functions shared across CLI commands.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Write one line of machine-readable output to stdout.
pub fn write_line(line: impl Display) -> Result<()> {
    write_line_to(&mut std::io::stdout().lock(), line)
}

/// Write one line, turning a closed or failing stream into an error.
pub fn write_line_to(out: &mut impl Write, line: impl Display) -> Result<()> {
    writeln!(out, "{}", line).context("Failed to write output")
}

/// Format a timestamp as a human-readable UTC string.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Abbreviate a long hex string as `head...tail` for display.
pub fn short_hash(hash: &str) -> String {
    const KEEP: usize = 12;
    if hash.len() <= KEEP * 2 {
        hash.to_string()
    } else {
        format!("{}...{}", &hash[..KEEP], &hash[hash.len() - KEEP..])
    }
}

/// Render a 0-1 score as a percentage with two decimals.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
