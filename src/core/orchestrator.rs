// Job orchestration - create, poll until every job is terminal, download

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::core::{output_path, ApiResponse, JobApi, Sleeper};
use crate::error::{Result, TaucoderError};
use crate::models::{Config, EncoderOptions, Job, JobStatus};

/// Drives one run against the service
pub struct Orchestrator<A: JobApi, S: Sleeper> {
    api: A,
    sleeper: S,
    options: EncoderOptions,
    poll_interval: Duration,
}

/// A job whose output was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedJob {
    pub job_id: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Summary of a completed run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Distinct job ids returned by job-create
    pub submitted: usize,
    pub downloaded: Vec<DownloadedJob>,
    /// Jobs the service reported as `error`
    pub failed: Vec<String>,
    /// Status requests sent
    pub polls: usize,
    /// Status requests that did not yield a usable answer
    pub poll_failures: usize,
}

impl RunSummary {
    pub fn resolved(&self) -> usize {
        self.downloaded.len() + self.failed.len()
    }
}

/// How a run ended, short of a fatal error
#[derive(Debug)]
pub enum RunOutcome {
    /// job-create was refused; nothing was polled or downloaded
    CreateFailed { status: u16, message: String },
    /// Every submitted job reached a terminal state
    Completed(RunSummary),
}

impl<A: JobApi, S: Sleeper> Orchestrator<A, S> {
    pub fn new(api: A, sleeper: S, config: &Config) -> Self {
        Self {
            api,
            sleeper,
            options: config.encoder.clone(),
            poll_interval: Duration::from_secs(config.polling.interval_seconds),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Upload the inputs, then poll and download until every job is resolved
    ///
    /// Download failures abort the run; jobs not yet resolved are abandoned.
    pub async fn run(&self, inputs: &[PathBuf], output: &Path) -> Result<RunOutcome> {
        info!("Creating new jobs for {} input file(s)...", inputs.len());

        let jobs = match self.create_jobs(inputs).await? {
            ApiResponse::Success(jobs) => jobs,
            ApiResponse::Failure { status, message } => {
                error!("Job creation failed (HTTP {}): {}", status, message);
                return Ok(RunOutcome::CreateFailed { status, message });
            }
        };

        info!("{} job(s) created. Waiting for jobs to finish...", jobs.len());

        let summary = self.poll_until_resolved(&jobs, output).await?;
        Ok(RunOutcome::Completed(summary))
    }

    /// Submit every input in one job-create request
    pub async fn create_jobs(&self, inputs: &[PathBuf]) -> Result<ApiResponse<Vec<Job>>> {
        let response = self.api.create_jobs(inputs, &self.options).await?;
        Ok(match response {
            ApiResponse::Success(created) => ApiResponse::Success(created.jobs),
            ApiResponse::Failure { status, message } => ApiResponse::Failure { status, message },
        })
    }

    /// Poll the service until each of `jobs` is done (and downloaded) or errored
    ///
    /// There is no cap on the number of polls. A failed status request is
    /// logged and retried after the same interval.
    pub async fn poll_until_resolved(&self, jobs: &[Job], output: &Path) -> Result<RunSummary> {
        let mut job_ids: Vec<String> = Vec::with_capacity(jobs.len());
        let mut submitted: HashSet<&str> = HashSet::with_capacity(jobs.len());
        for job in jobs {
            if submitted.insert(job.job_id.as_str()) {
                job_ids.push(job.job_id.clone());
            } else {
                warn!("Service returned job {} more than once", job.job_id);
            }
        }

        let mut summary = RunSummary {
            submitted: job_ids.len(),
            ..RunSummary::default()
        };
        let mut resolved: HashSet<String> = HashSet::with_capacity(job_ids.len());

        while resolved.len() < job_ids.len() {
            self.sleeper.sleep(self.poll_interval).await;

            let outstanding: Vec<String> = job_ids
                .iter()
                .filter(|id| !resolved.contains(*id))
                .cloned()
                .collect();

            summary.polls += 1;
            let statuses = match self.api.job_status(&outstanding).await {
                Ok(ApiResponse::Success(response)) => response.jobs,
                Ok(ApiResponse::Failure { status, message }) => {
                    error!("Status request failed (HTTP {}): {}", status, message);
                    summary.poll_failures += 1;
                    continue;
                }
                Err(e) => {
                    if e.is_transport() {
                        warn!("Status request did not reach the service: {}", e);
                    } else {
                        error!("Status request failed: {}", e);
                    }
                    summary.poll_failures += 1;
                    continue;
                }
            };

            for job in statuses {
                if !submitted.contains(job.job_id.as_str()) {
                    debug!("Ignoring status for unknown job {}", job.job_id);
                    continue;
                }
                if resolved.contains(&job.job_id) {
                    continue;
                }

                match job.status {
                    JobStatus::Error => {
                        warn!("Job {} failed", job.job_id);
                        summary.failed.push(job.job_id.clone());
                        resolved.insert(job.job_id);
                    }
                    JobStatus::Done => {
                        let downloaded = self.download_job(&job, output).await?;
                        summary.downloaded.push(downloaded);
                        resolved.insert(job.job_id);
                    }
                    JobStatus::Pending => {
                        debug!("Job {} still pending", job.job_id);
                    }
                }
            }

            debug!("{}/{} job(s) resolved", resolved.len(), job_ids.len());
        }

        Ok(summary)
    }

    /// Write the output of a finished job under `output`
    pub async fn download_job(&self, job: &Job, output: &Path) -> Result<DownloadedJob> {
        let url = job
            .output_url
            .as_deref()
            .ok_or_else(|| TaucoderError::MissingOutputUrl(job.job_id.clone()))?;
        let path = output_path(job, output);

        info!("Job {} is done. Downloading to {}...", job.job_id, path.display());

        let bytes = self
            .api
            .download(url, &path)
            .await
            .map_err(|source| TaucoderError::Download {
                job_id: job.job_id.clone(),
                source,
            })?;

        info!("Downloaded {} bytes", bytes);

        Ok(DownloadedJob {
            job_id: job.job_id.clone(),
            path,
            bytes,
        })
    }
}
