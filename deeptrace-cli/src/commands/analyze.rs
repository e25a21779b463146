//! Analyze command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use deeptrace_core::{validate_filename, AnalysisResult, MediaAnalysis, MODEL_ID, TEMPORARY_JOB_ID};
use tracing::{debug, info};

use crate::utils::{format_percent, format_timestamp, short_hash, write_line};
use crate::OutputFormat;

/// Execute the analyze command.
///
/// Nothing is persisted; the result always carries the temporary job id.
pub fn execute(file: &Path, frames: usize, format: OutputFormat, quiet: bool) -> Result<()> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    // Reject before reading the file
    validate_filename(&filename).with_context(|| format!("Cannot analyze {}", file.display()))?;

    let content =
        std::fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;

    info!(path = %file.display(), bytes = content.len(), "Read file");

    let result = MediaAnalysis::run(&filename, &content, frames, Utc::now())?
        .into_result(TEMPORARY_JOB_ID);

    debug!(
        filehash = %result.filehash,
        likelihood = result.deepfake_likelihood,
        verified = result.verification.verified,
        "Analysis complete"
    );

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .context("Failed to serialize analysis to JSON")?;
            write_line(json)?;
        }
        OutputFormat::Text if quiet => write_line(result.deepfake_likelihood)?,
        OutputFormat::Text => print_summary(&result),
    }

    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let (min, max) = confidence_range(result);

    println!();
    println!("{}", "╔════════════════════════════════════════╗".cyan());
    println!(
        "{}",
        "║           ANALYSIS COMPLETE            ║".cyan().bold()
    );
    println!("{}", "╚════════════════════════════════════════╝".cyan());
    println!();
    println!(
        "   {} {} ({} bytes)",
        "File:".dimmed(),
        result.filename,
        result.filesize
    );
    println!("   {} {}", "SHA-256:".dimmed(), result.filehash);
    println!(
        "   {} {}",
        "Deepfake likelihood:".dimmed(),
        format_percent(result.deepfake_likelihood).bold()
    );
    println!(
        "   {} {} (min {}, max {})",
        "Frames scored:".dimmed(),
        result.frame_scores.len(),
        format_percent(min),
        format_percent(max)
    );
    println!(
        "   {} {} (benchmark accuracy {})",
        "Model:".dimmed(),
        MODEL_ID,
        format_percent(result.accuracy)
    );
    println!(
        "   {} {}",
        "Analyzed:".dimmed(),
        format_timestamp(&result.analyzed_at)
    );
    println!();

    let ledger = &result.verification;
    let status = if ledger.verified {
        "VERIFIED".green().bold()
    } else {
        "NOT VERIFIED".yellow().bold()
    };
    println!("   {} {}", "Ledger:".dimmed(), status);
    println!(
        "   {} {} on {}",
        "Transaction:".dimmed(),
        short_hash(&ledger.tx_hash),
        ledger.network
    );
    println!();
}

/// Lowest and highest frame confidence, both 0 when no frames were scored.
fn confidence_range(result: &AnalysisResult) -> (f64, f64) {
    let mut confidences = result.frame_scores.iter().map(|s| s.confidence);
    match confidences.next() {
        Some(first) => confidences.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c))),
        None => (0.0, 0.0),
    }
}
