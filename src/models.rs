// src/models.rs
use serde::{Deserialize, Serialize};

/// An archive received from a client, held in memory until it is written
/// into the request's workspace.
#[derive(Debug, Clone)]
pub struct UploadedArchive {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResultsResponse {
    pub project_name: String,
    pub results: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
