use std::path::PathBuf;
use thiserror::Error;

use crate::models::ConfigError;

/// Main error type for taucoder
#[derive(Error, Debug)]
pub enum TaucoderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Download of job {job_id} failed: {source}")]
    Download {
        job_id: String,
        #[source]
        source: ApiError,
    },

    #[error("Job {0} is done but has no output URL")]
    MissingOutputUrl(String),
}

/// Errors related to the taucoder HTTP API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Failed to read input file {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(0)
        } else if err.is_connect() {
            ApiError::ConnectionRefused(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::HttpError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ApiError::ParseError(err.to_string())
        } else {
            ApiError::RequestFailed(err.to_string())
        }
    }
}

impl ApiError {
    /// Transport-level failures, as opposed to the service answering badly
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::ConnectionRefused(_)
                | ApiError::Timeout(_)
                | ApiError::RequestFailed(_)
                | ApiError::StreamError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TaucoderError>;
