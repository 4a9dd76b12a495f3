use std::future::Future;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::persist::PersistError;

/// Workflow generation a command was issued for; echoed back on every event.
pub type Generation = u64;

/// Fallback when a failed job carries no error text.
pub const DEFAULT_JOB_FAILURE: &str = "Job processing failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadStarted {
        generation: Generation,
        byte_len: u64,
        content_type: String,
    },
    UploadCompleted {
        generation: Generation,
        result: Result<UploadedImage, WorkflowError>,
    },
    JobSubmitted {
        generation: Generation,
        job_id: String,
    },
    PollAttempt {
        generation: Generation,
        attempt: u32,
    },
    GenerationCompleted {
        generation: Generation,
        /// URL of the transformed image.
        result: Result<String, WorkflowError>,
    },
    DownloadCompleted {
        result: Result<PathBuf, WorkflowError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub destination_name: String,
    /// Stable public URL; never the signed upload URL.
    pub public_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Pending,
    Completed,
    Failed,
    Error,
}

impl RemoteStatus {
    /// Unknown or missing values are treated as still running.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("completed") => RemoteStatus::Completed,
            Some("failed") => RemoteStatus::Failed,
            Some("error") => RemoteStatus::Error,
            _ => RemoteStatus::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RemoteStatus::Pending)
    }
}

/// Parsed status response; `body` is the full JSON document as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusReport {
    pub status: RemoteStatus,
    pub body: Value,
}

impl JobStatusReport {
    pub fn from_body(body: Value) -> Self {
        let status = RemoteStatus::parse(body.get("status").and_then(Value::as_str));
        Self { status, body }
    }

    pub fn error_message(&self) -> String {
        match self.body.get("error") {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_JOB_FAILURE)
                .to_string(),
            _ => DEFAULT_JOB_FAILURE.to_string(),
        }
    }

    /// `result` may be a single item or a list; the first item wins.
    pub fn result_url(&self) -> Option<String> {
        let result = self.body.get("result")?;
        let item = match result {
            Value::Array(items) => items.first()?,
            other => other,
        };
        item.get("mediaUrl")
            .and_then(Value::as_str)
            .or_else(|| item.get("image").and_then(Value::as_str))
            .filter(|url| !url.is_empty())
            .map(ToOwned::to_owned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub model: String,
    pub tool_type: String,
    pub effect_id: String,
    pub image_url: String,
    pub user_id: String,
    pub remove_watermark: bool,
    pub is_private: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "jobId")]
    pub job_id: Option<Value>,
}

impl SubmitResponse {
    /// Accepts both string and numeric ids.
    pub fn job_id(&self) -> Option<String> {
        match self.job_id.as_ref()? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("failed to get upload URL: {0}")]
    UploadUrl(String),
    #[error("failed to upload file: {0}")]
    Transfer(String),
    #[error("failed to submit job: {0}")]
    Submission(String),
    #[error("status check failed: {0}")]
    StatusQuery(String),
    #[error("{message}")]
    JobFailed {
        status: RemoteStatus,
        message: String,
    },
    #[error("job timed out after {polls} status checks")]
    Timeout { polls: u32 },
    #[error("download failed (proxy: {proxy}; direct: {direct})")]
    Download { proxy: String, direct: String },
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("no image URL in response")]
    MissingResultUrl,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("could not read {path:?}: {message}")]
    ReadFile { path: PathBuf, message: String },
    #[error("response too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("could not save artifact: {0}")]
    Persist(String),
    #[error("cancelled")]
    Cancelled,
}

impl From<PersistError> for WorkflowError {
    fn from(err: PersistError) -> Self {
        WorkflowError::Persist(err.to_string())
    }
}

/// Races `fut` against `cancel`; a cancelled token wins ties.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, WorkflowError>
where
    F: Future<Output = Result<T, WorkflowError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WorkflowError::Cancelled),
        result = fut => result,
    }
}
