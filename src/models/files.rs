use serde::{Deserialize, Serialize};

/// Body of `GET /files`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilesResponse {
    pub paths: Vec<String>,
}
