//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use taucoder::core::{ApiResponse, JobApi, Sleeper};
use taucoder::error::ApiError;
use taucoder::models::{CreateJobsResponse, EncoderOptions, Job, JobStatusResponse};

/// Create a temp dir holding an `out/` directory and the given input images
pub fn create_test_inputs(names: &[&str]) -> (TempDir, Vec<PathBuf>, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out");
    fs::create_dir_all(&output).expect("Failed to create output dir");

    let inputs = names
        .iter()
        .map(|name| {
            let path = temp_dir.path().join(name);
            fs::write(&path, format!("bytes of {}", name)).expect("Failed to write input");
            path
        })
        .collect();

    (temp_dir, inputs, output)
}

/// One scripted answer to a status request
#[derive(Debug, Clone)]
pub enum StatusReply {
    Jobs(Vec<Job>),
    Failure { status: u16, message: String },
    Unreachable,
}

#[derive(Debug, Default)]
struct MockState {
    create_response: Option<ApiResponse<CreateJobsResponse>>,
    create_unreachable: bool,
    status_replies: VecDeque<StatusReply>,
    failing_urls: Vec<String>,
    create_calls: Vec<(Vec<PathBuf>, EncoderOptions)>,
    status_calls: Vec<Vec<String>>,
    downloads: Vec<(String, PathBuf)>,
}

/// Scripted `JobApi` that records every call
///
/// Clones share state, so a test can keep one handle while the orchestrator
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MockJobApi {
    state: Arc<Mutex<MockState>>,
}

impl MockJobApi {
    /// Mock whose job-create answers with the given jobs
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().create_response =
            Some(ApiResponse::Success(CreateJobsResponse { jobs }));
        mock
    }

    /// Mock whose job-create is refused
    pub fn with_create_failure(status: u16, message: &str) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().create_response = Some(ApiResponse::Failure {
            status,
            message: message.to_string(),
        });
        mock
    }

    /// Mock whose job-create never reaches the service
    pub fn unreachable() -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().create_unreachable = true;
        mock
    }

    /// Queue the answer for the next status request
    pub fn then_status(self, reply: StatusReply) -> Self {
        self.state.lock().unwrap().status_replies.push_back(reply);
        self
    }

    pub fn fail_download_of(self, url: &str) -> Self {
        self.state.lock().unwrap().failing_urls.push(url.to_string());
        self
    }

    pub fn create_calls(&self) -> Vec<(Vec<PathBuf>, EncoderOptions)> {
        self.state.lock().unwrap().create_calls.clone()
    }

    pub fn status_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().status_calls.clone()
    }

    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.state.lock().unwrap().downloads.clone()
    }
}

#[async_trait]
impl JobApi for MockJobApi {
    async fn create_jobs(
        &self,
        inputs: &[PathBuf],
        options: &EncoderOptions,
    ) -> Result<ApiResponse<CreateJobsResponse>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls.push((inputs.to_vec(), options.clone()));
        if state.create_unreachable {
            return Err(ApiError::ConnectionRefused("mock service".to_string()));
        }
        Ok(state
            .create_response
            .clone()
            .expect("create response not scripted"))
    }

    async fn job_status(
        &self,
        job_ids: &[String],
    ) -> Result<ApiResponse<JobStatusResponse>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.status_calls.push(job_ids.to_vec());
        let reply = state
            .status_replies
            .pop_front()
            .expect("status polled more often than scripted");

        match reply {
            StatusReply::Jobs(jobs) => Ok(ApiResponse::Success(JobStatusResponse { jobs })),
            StatusReply::Failure { status, message } => Ok(ApiResponse::Failure { status, message }),
            StatusReply::Unreachable => Err(ApiError::Timeout(30)),
        }
    }

    async fn download(&self, output_url: &str, destination: &Path) -> Result<u64, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .downloads
            .push((output_url.to_string(), destination.to_path_buf()));

        if state.failing_urls.iter().any(|url| url == output_url) {
            return Err(ApiError::HttpError {
                status: 404,
                message: "Not Found".to_string(),
            });
        }

        let body = format!("encoded from {}", output_url);
        fs::write(destination, &body).map_err(|source| ApiError::WriteOutput {
            path: destination.to_path_buf(),
            source,
        })?;
        Ok(body.len() as u64)
    }
}

/// Sleeper that returns immediately and records each requested wait
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Status entry for a job still being worked on
pub fn pending(job_id: &str, input_filename: &str) -> Job {
    Job::new(job_id, input_filename)
}

pub fn done(job_id: &str, input_filename: &str) -> Job {
    Job::new(job_id, input_filename).done(format!("https://cdn.example/{}.jpg", job_id))
}

pub fn errored(job_id: &str, input_filename: &str) -> Job {
    Job::new(job_id, input_filename).failed()
}

/// Requests seen by the fake service
#[derive(Debug, Clone, Default)]
pub struct FakeServiceLog {
    /// (authorization, options JSON, image parts as (file name, content type, size))
    pub creates: Vec<(Option<String>, Option<String>, Vec<(String, String, usize)>)>,
    /// (authorization, requested job ids)
    pub statuses: Vec<(Option<String>, Vec<String>)>,
    /// Authorization header of each download request
    pub downloads: Vec<Option<String>>,
}

#[derive(Default)]
struct FakeServiceState {
    base_url: String,
    log: FakeServiceLog,
    /// input file name by job id
    jobs: HashMap<String, String>,
    /// status polls seen per job id
    polls: HashMap<String, usize>,
}

/// Handle on a fake taucoder service running on a local port
#[derive(Clone)]
pub struct FakeService {
    pub api_url: String,
    state: Arc<Mutex<FakeServiceState>>,
}

impl FakeService {
    pub fn log(&self) -> FakeServiceLog {
        self.state.lock().unwrap().log.clone()
    }
}

/// Start a fake taucoder service
///
/// Each job reports `processing` on its first status poll. On later polls
/// jobs whose input file name starts with `bad` report `error`, all others
/// `done`. The service answers HTTP 400 to job-create requests without
/// image parts.
pub async fn spawn_fake_service() -> FakeService {
    use axum::routing::{get, post};
    use axum::Router;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake service");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let base_url = format!("http://{}", addr);

    let state = Arc::new(Mutex::new(FakeServiceState {
        base_url: base_url.clone(),
        ..FakeServiceState::default()
    }));

    let app = Router::new()
        .route("/api/v1/job-create", post(fake::job_create))
        .route("/api/v1/job-status", post(fake::job_status))
        .route("/files/{job_id}", get(fake::download))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake service error");
    });

    FakeService {
        api_url: format!("{}/api/v1", base_url),
        state,
    }
}

mod fake {
    use axum::extract::{Multipart, Path, State};
    use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
    use axum::Json;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    use super::FakeServiceState;

    type SharedState = State<Arc<Mutex<FakeServiceState>>>;

    fn authorization(headers: &HeaderMap) -> Option<String> {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
    }

    pub async fn job_create(
        State(state): SharedState,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> (StatusCode, Json<Value>) {
        let mut options = None;
        let mut images = Vec::new();

        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "options" => options = field.text().await.ok(),
                "image" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let content_type = field.content_type().unwrap_or("").to_string();
                    let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                    images.push((file_name, content_type, size));
                }
                _ => {}
            }
        }

        let mut state = state.lock().unwrap();
        state
            .log
            .creates
            .push((authorization(&headers), options, images.clone()));

        if images.is_empty() {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": "no images" })));
        }

        let mut jobs = Vec::new();
        for (file_name, _, _) in images {
            let job_id = format!("job-{}", state.jobs.len() + 1);
            state.jobs.insert(job_id.clone(), file_name.clone());
            jobs.push(json!({ "job_id": job_id, "input_filename": file_name }));
        }

        (StatusCode::OK, Json(json!({ "jobs": jobs })))
    }

    pub async fn job_status(
        State(state): SharedState,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let job_ids: Vec<String> = body["job_ids"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let mut state = state.lock().unwrap();
        state
            .log
            .statuses
            .push((authorization(&headers), job_ids.clone()));

        let base_url = state.base_url.clone();
        let mut jobs = Vec::new();
        for job_id in job_ids {
            let Some(file_name) = state.jobs.get(&job_id).cloned() else {
                continue;
            };
            let polls = state.polls.entry(job_id.clone()).or_insert(0);
            *polls += 1;

            let entry = if *polls == 1 {
                json!({ "job_id": job_id, "status": "processing", "input_filename": file_name })
            } else if file_name.starts_with("bad") {
                json!({ "job_id": job_id, "status": "error", "input_filename": file_name })
            } else {
                json!({
                    "job_id": job_id,
                    "status": "done",
                    "input_filename": file_name,
                    "output_url": format!("{}/files/{}", base_url, job_id),
                })
            };
            jobs.push(entry);
        }

        (StatusCode::OK, Json(json!({ "jobs": jobs })))
    }

    pub async fn download(
        State(state): SharedState,
        headers: HeaderMap,
        Path(job_id): Path<String>,
    ) -> Vec<u8> {
        state
            .lock()
            .unwrap()
            .log
            .downloads
            .push(authorization(&headers));
        format!("encoded {}", job_id).into_bytes()
    }
}
