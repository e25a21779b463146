//! Multipart form parsing helpers
//!
//! Collects the `file` field of a multipart/form-data upload together with
//! its metadata. Other fields are ignored.

use axum::extract::Multipart;

use crate::error::ApiError;
use crate::validation::validate_file_size;

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

impl FileField {
    /// The client-supplied filename.
    ///
    /// The extension decides whether the upload is accepted, so a missing
    /// or empty filename is a client error.
    pub fn require_name(&self) -> Result<&str, ApiError> {
        match self.file_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(ApiError::bad_request(
                "Uploaded file has no filename. Send it with a filename in the 'file' field.",
            )),
        }
    }
}

/// Parsed multipart form fields
#[derive(Debug)]
pub struct MultipartFields {
    file: Option<FileField>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    ///
    /// The file field is rejected when it exceeds `max_file_size`.
    pub async fn parse(
        multipart: &mut Multipart,
        max_file_size: usize,
    ) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            if field.name() == Some(FILE_FIELD) {
                let content_type = field.content_type().map(|s| s.to_string());
                let file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                    .to_vec();

                validate_file_size(data.len(), max_file_size)?;

                file = Some(FileField {
                    data,
                    content_type,
                    file_name,
                });
            }
        }

        Ok(Self { file })
    }

    /// Take ownership of the file field (required)
    pub fn into_file(self) -> Result<FileField, ApiError> {
        self.file.ok_or_else(|| {
            ApiError::bad_request("No file provided. Use 'file' field in multipart form.")
        })
    }
}
