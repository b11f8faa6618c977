// src/errors.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorBody;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Invalid maven project, {descriptor} not found")]
    InvalidProject { descriptor: String },

    #[error("Invalid archive filename '{name}': {reason}")]
    InvalidFilename { name: String, reason: String },

    #[error("No archive file found in the upload")]
    MissingUpload,

    #[error("Upload exceeds the limit of {limit} bytes")]
    UploadTooLarge { limit: usize },

    #[error("Malformed upload: {0}")]
    Upload(String),

    #[error("Failed to extract archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to launch '{program}': {source}")]
    BuildLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Test execution failed: {output}")]
    BuildFailed { code: Option<i32>, output: String },

    #[error("Test execution timed out after {0}s")]
    BuildTimeout(u64),

    #[error("Test reports not generated")]
    ReportsMissing,

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;

impl RunnerError {
    /// True for failures caused by the uploaded content rather than by the service.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl ResponseError for RunnerError {
    fn status_code(&self) -> StatusCode {
        match self {
            RunnerError::InvalidProject { .. }
            | RunnerError::InvalidFilename { .. }
            | RunnerError::MissingUpload
            | RunnerError::Upload(_) => StatusCode::BAD_REQUEST,
            RunnerError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}
