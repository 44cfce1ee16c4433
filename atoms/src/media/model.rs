use serde::{Deserialize, Serialize};

/// One file of an upload request; `data` is base64 encoded.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UploadRequest {
    #[serde(default)]
    pub files: Vec<UploadFile>,
}

/// Stored references, in request order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}
