//! Verify command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use deeptrace_core::verify_digest;
use tracing::info;

use crate::utils::{format_timestamp, write_line};
use crate::OutputFormat;

/// Execute the verify command.
///
/// A digest that is not verified is still a successful lookup.
pub fn execute(filehash: &str, format: OutputFormat, quiet: bool) -> Result<()> {
    let verification = verify_digest(filehash, Utc::now()).context("Invalid file hash")?;
    let record = &verification.record;

    info!(
        filehash = %verification.filehash,
        verified = record.verified,
        "Ledger lookup"
    );

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&verification)
                .context("Failed to serialize verification to JSON")?;
            write_line(json)?;
        }
        OutputFormat::Text if quiet => write_line(record.verified)?,
        OutputFormat::Text => {
            println!();
            if record.verified {
                println!("{}", "╔════════════════════════════════════════╗".green());
                println!(
                    "{}",
                    "║               VERIFIED                 ║".green().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".green());
            } else {
                println!("{}", "╔════════════════════════════════════════╗".yellow());
                println!(
                    "{}",
                    "║             NOT VERIFIED               ║".yellow().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".yellow());
            }
            println!();
            println!("   {} {}", "File hash:".dimmed(), verification.filehash);
            println!("   {} {}", "Contract:".dimmed(), record.contract_address);
            println!("   {} {}", "Transaction:".dimmed(), record.tx_hash);
            println!("   {} {}", "Network:".dimmed(), record.network);
            println!(
                "   {} {}",
                "Checked:".dimmed(),
                format_timestamp(&record.timestamp)
            );
            println!();
        }
    }

    Ok(())
}
