use std::path::{Path, PathBuf};

use crate::core::guess_media_type;
use crate::error::ApiError;

/// One `image` part of a job-create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPart {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl UploadPart {
    /// Read an input file into an upload part
    pub fn read(path: &Path) -> Result<Self, ApiError> {
        let bytes = std::fs::read(path).map_err(|source| ApiError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name: upload_file_name(path),
            media_type: guess_media_type(path),
            bytes,
        })
    }
}

/// Read every input file, in order, failing on the first unreadable one
pub fn read_upload_parts(paths: &[PathBuf]) -> Result<Vec<UploadPart>, ApiError> {
    paths.iter().map(|path| UploadPart::read(path)).collect()
}

/// File name sent for a part; the service echoes it back as `input_filename`
fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
