use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeeptraceError {
    #[error("Unsupported file type: '{0}' (only MP4 or AVI files are supported)")]
    UnsupportedFileType(String),

    #[error("Invalid digest: {0}")]
    InvalidDigest(String),
}

pub type Result<T> = std::result::Result<T, DeeptraceError>;
