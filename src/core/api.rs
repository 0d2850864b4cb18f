use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::{read_upload_parts, Connection};
use crate::error::ApiError;
use crate::models::{
    ApiConfig, CreateJobsResponse, EncoderOptions, ErrorResponse, JobStatusRequest,
    JobStatusResponse,
};

/// What the service answered to a create or status request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    /// HTTP 200 with a parsed body
    Success(T),
    /// Any other status, with the service's error message
    Failure { status: u16, message: String },
}

/// The three calls a run makes against the service
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submit every input file in a single job-create request
    async fn create_jobs(
        &self,
        inputs: &[PathBuf],
        options: &EncoderOptions,
    ) -> Result<ApiResponse<CreateJobsResponse>, ApiError>;

    /// Fetch the status of the given jobs in a single request
    async fn job_status(
        &self,
        job_ids: &[String],
    ) -> Result<ApiResponse<JobStatusResponse>, ApiError>;

    /// Fetch a job output and write it to `destination`, returning the byte count
    async fn download(&self, output_url: &str, destination: &Path) -> Result<u64, ApiError>;
}

/// HTTP client for the taucoder API
pub struct TaucoderClient {
    client: Client,
    connection: Connection,
    timeout_seconds: u64,
}

impl TaucoderClient {
    /// Create a new client with the given configuration and credential
    pub fn new(config: &ApiConfig, credential: &str) -> Result<Self, ApiError> {
        let connection = Connection::new(&config.base_url, credential)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            connection,
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    fn map_send_error(&self, err: reqwest::Error, target: &str) -> ApiError {
        if err.is_connect() {
            ApiError::ConnectionRefused(format!("Could not connect to {}", target))
        } else if err.is_timeout() {
            ApiError::Timeout(self.timeout_seconds)
        } else {
            ApiError::from(err)
        }
    }
}

#[async_trait]
impl JobApi for TaucoderClient {
    async fn create_jobs(
        &self,
        inputs: &[PathBuf],
        options: &EncoderOptions,
    ) -> Result<ApiResponse<CreateJobsResponse>, ApiError> {
        let url = self.connection.endpoint("job-create");
        let options_json =
            serde_json::to_string(options).map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let mut form = multipart::Form::new().text("options", options_json);
        for upload in read_upload_parts(inputs)? {
            debug!(
                "Adding image part {} ({}, {} bytes)",
                upload.file_name,
                upload.media_type,
                upload.bytes.len()
            );
            let part = multipart::Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(upload.media_type)
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
            form = form.part("image", part);
        }

        debug!("Sending job-create request to {} with {} image(s)", url, inputs.len());

        let response = self
            .client
            .post(&url)
            .headers(self.connection.auth_headers())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.connection.base_url()))?;

        read_response(response).await
    }

    async fn job_status(
        &self,
        job_ids: &[String],
    ) -> Result<ApiResponse<JobStatusResponse>, ApiError> {
        let url = self.connection.endpoint("job-status");
        let request = JobStatusRequest {
            job_ids: job_ids.to_vec(),
        };

        debug!("Sending job-status request for {} job(s)", job_ids.len());

        let response = self
            .client
            .post(&url)
            .headers(self.connection.auth_headers())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.connection.base_url()))?;

        read_response(response).await
    }

    async fn download(&self, output_url: &str, destination: &Path) -> Result<u64, ApiError> {
        // Output URLs carry their own access control, no auth header here
        let response = self
            .client
            .get(output_url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, output_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpError {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let write_error = |source| ApiError::WriteOutput {
            path: destination.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(destination).await.map_err(write_error)?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| ApiError::StreamError(e.to_string()))?;
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_error)?;

        debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

/// Turn an HTTP response into a parsed success body or the service's error
async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiResponse<T>, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    parse_response(status, &body)
}

fn parse_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<ApiResponse<T>, ApiError> {
    if status != StatusCode::OK {
        return Ok(ApiResponse::Failure {
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }

    serde_json::from_str(body)
        .map(ApiResponse::Success)
        .map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            ApiError::ParseError(format!("{} - {}", preview, e))
        })
}

/// Message to show for a non-200 answer
///
/// Prefers the `error` field of the JSON body, then the raw body, then the
/// status reason phrase.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed.error;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}
