use serde::{Deserialize, Serialize};

/// Status of a job as reported by the service
///
/// Only `done` and `error` carry meaning for the client; every other value
/// the service sends (queued, processing, ...) is treated as `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum JobStatus {
    /// Job is still being worked on
    #[default]
    Pending,
    /// Output is ready at the job's output URL
    Done,
    /// Service gave up on the job
    Error,
}

impl JobStatus {
    /// Parse a wire value, falling back to `Pending` for anything unknown
    pub fn from_wire(value: &str) -> Self {
        match value {
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            _ => JobStatus::Pending,
        }
    }

    /// Check if no further status change is expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

impl From<Option<String>> for JobStatus {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(JobStatus::from_wire).unwrap_or_default()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
