use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::ApiError;

/// Base URL and authorization header shared by every request in a run
#[derive(Debug, Clone)]
pub struct Connection {
    base_url: String,
    authorization: HeaderValue,
}

impl Connection {
    /// Build a connection for the given credential
    ///
    /// The credential is not validated; it is base64 encoded and sent as a
    /// basic auth header.
    pub fn new(base_url: &str, credential: &str) -> Result<Self, ApiError> {
        let encoded = BASE64.encode(credential.as_bytes());
        let mut authorization = HeaderValue::from_str(&format!("Basic {}", encoded))
            .map_err(|e| ApiError::InvalidCredential(e.to_string()))?;
        authorization.set_sensitive(true);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API endpoint such as `job-create`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }
}
