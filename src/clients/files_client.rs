use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::FilesResponse;

#[derive(Debug)]
pub enum FetchError {
    Request(reqwest::Error),
    Status { code: StatusCode, body: String },
    Malformed(serde_json::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Request(e) => write!(f, "listing request failed: {}", e),
            FetchError::Status { code, body } => write!(f, "listing returned {}: {}", code, body),
            FetchError::Malformed(e) => write!(f, "listing body is malformed: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e)
    }
}

/// Fetches the list of shareable document paths.
#[derive(Debug, Clone)]
pub struct FilesClient {
    client: Client,
    url: String,
}

impl FilesClient {
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// `GET /files`
    pub async fn list_paths(&self) -> Result<Vec<String>, FetchError> {
        debug!("Fetching document list from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(FetchError::Status { code: status, body });
        }

        let files: FilesResponse = serde_json::from_str(&body).map_err(FetchError::Malformed)?;
        info!("Fetched {} document paths", files.paths.len());
        Ok(files.paths)
    }
}
