use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the image/OCR layer (preprocessing, engines, PDF handling)
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Document-level failures surfaced to callers of the processor
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Rejected before any processing (wrong file type for the document kind)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// OCR failed or no usable ID number was recovered; the user re-enters data manually
    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    /// A single certificate could not be read or parsed
    #[error("Certificate processing failed for {path}: {reason}")]
    CertificateProcessingFailure { path: PathBuf, reason: String },
}

impl DocumentError {
    pub fn requires_manual_entry(&self) -> bool {
        matches!(self, DocumentError::ExtractionFailure(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            DocumentError::ExtractionFailure(_) => "EXTRACTION_FAILURE",
            DocumentError::CertificateProcessingFailure { .. } => "CERTIFICATE_PROCESSING_FAILURE",
        }
    }
}

impl From<OcrError> for DocumentError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::UnsupportedFormat(msg) => DocumentError::UnsupportedFormat(msg),
            other => DocumentError::ExtractionFailure(other.to_string()),
        }
    }
}

/// Errors raised by the HTTP adapter itself
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(rename = "requiresManualEntry", skip_serializing_if = "std::ops::Not::not")]
    pub requires_manual_entry: bool,
}

impl From<&DocumentError> for ErrorResponse {
    fn from(err: &DocumentError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
            requires_manual_entry: err.requires_manual_entry(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, requires_manual_entry) = match &self {
            ApiError::Document(err) => {
                let status = match err {
                    DocumentError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    DocumentError::ExtractionFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    DocumentError::CertificateProcessingFailure { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                };
                (status, err.code(), err.requires_manual_entry())
            }
            ApiError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE", false),
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE", false),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", false),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", false),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            requires_manual_entry,
        });

        (status, body).into_response()
    }
}
