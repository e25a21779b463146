//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use deeptrace_core::DeeptraceError;

/// General error (catch-all).
pub const GENERAL_ERROR: u8 = 1;

/// Command line usage error (unsupported file type).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: u8 = 64;

/// Data format error (malformed file hash).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: u8 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: u8 = 66;

/// I/O error (stdout closed or not writable).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: u8 = 74;

/// Represents an exit code with optional error context.
#[derive(Debug)]
pub struct ExitCode {
    pub code: u8,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Pipeline errors carry their own classification
        let pipeline = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<DeeptraceError>());

        let code = match pipeline {
            Some(DeeptraceError::UnsupportedFileType(_)) => USAGE_ERROR,
            Some(DeeptraceError::InvalidDigest(_)) => DATA_ERROR,
            None if message.contains("Failed to read file") => INPUT_ERROR,
            None if message.contains("Failed to write") => IO_ERROR,
            None => GENERAL_ERROR,
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn classify(err: anyhow::Error) -> u8 {
        ExitCode::from_anyhow(&err).code
    }

    #[test]
    fn test_pipeline_errors_through_context() {
        let unsupported: Result<(), DeeptraceError> =
            Err(DeeptraceError::UnsupportedFileType("clip.mov".into()));
        let err = unsupported.context("Cannot analyze clip.mov").unwrap_err();
        assert_eq!(classify(err), USAGE_ERROR);

        let invalid: Result<(), DeeptraceError> =
            Err(DeeptraceError::InvalidDigest("bad".into()));
        let err = invalid.context("Invalid file hash").unwrap_err();
        assert_eq!(classify(err), DATA_ERROR);
    }

    #[test]
    fn test_message_based_classification() {
        assert_eq!(
            classify(anyhow::anyhow!("Failed to read file: missing.mp4")),
            INPUT_ERROR
        );
        assert_eq!(
            classify(anyhow::anyhow!("Failed to serialize analysis to JSON")),
            GENERAL_ERROR
        );
        assert_eq!(classify(anyhow::anyhow!("something else")), GENERAL_ERROR);
    }

    #[test]
    fn test_closed_output_is_io_error() {
        struct Closed;

        impl std::io::Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = crate::utils::write_line_to(&mut Closed, "{}").unwrap_err();
        assert_eq!(classify(err), IO_ERROR);
    }

    #[test]
    fn test_message_keeps_context_chain() {
        let invalid: Result<(), DeeptraceError> =
            Err(DeeptraceError::InvalidDigest("digest is empty".into()));
        let err = invalid.context("Invalid file hash").unwrap_err();
        let exit = ExitCode::from_anyhow(&err);
        assert_eq!(
            exit.message.as_deref(),
            Some("Invalid file hash: Invalid digest: digest is empty")
        );
    }
}
