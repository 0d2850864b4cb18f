use std::path::{Path, PathBuf};

use crate::models::Job;

/// Where the output of a finished job is written
///
/// An existing directory receives `{input_filename}-{job_id}.jpg`. Any other
/// target is used verbatim, so every job in the run writes to the same file.
pub fn output_path(job: &Job, output: &Path) -> PathBuf {
    if output.is_dir() {
        output.join(format!("{}-{}.jpg", job.input_filename, job.job_id))
    } else {
        output.to_path_buf()
    }
}
