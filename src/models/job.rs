use serde::{Deserialize, Serialize};

use super::JobStatus;

/// A server-side unit of work for one uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Identifier assigned by the service
    pub job_id: String,
    /// Name of the uploaded file, used to name the download
    #[serde(default)]
    pub input_filename: String,
    /// Absent in job-create responses, where every job is implicitly pending
    #[serde(default)]
    pub status: JobStatus,
    /// Only present once the job is done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,
}

impl Job {
    pub fn new(job_id: impl Into<String>, input_filename: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            input_filename: input_filename.into(),
            status: JobStatus::Pending,
            output_url: None,
        }
    }

    /// Mark the job done with its output location
    pub fn done(mut self, output_url: impl Into<String>) -> Self {
        self.status = JobStatus::Done;
        self.output_url = Some(output_url.into());
        self
    }

    pub fn failed(mut self) -> Self {
        self.status = JobStatus::Error;
        self.output_url = None;
        self
    }
}

/// Successful body of `POST /job-create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobsResponse {
    pub jobs: Vec<Job>,
}

impl CreateJobsResponse {
    pub fn job_ids(&self) -> Vec<String> {
        self.jobs.iter().map(|job| job.job_id.clone()).collect()
    }
}

/// Body of `POST /job-status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusRequest {
    pub job_ids: Vec<String>,
}

/// Successful body of `POST /job-status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub jobs: Vec<Job>,
}

/// Body returned by the service on non-200 responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
