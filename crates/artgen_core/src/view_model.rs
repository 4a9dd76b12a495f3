use crate::{JobStatus, Notification, UiState};

pub const LABEL_GENERATE: &str = "Generate";
pub const LABEL_UPLOADING: &str = "Uploading...";
pub const LABEL_PROCESSING: &str = "Processing...";
pub const LABEL_GENERATE_AGAIN: &str = "Generate Again";
pub const LABEL_RETRY: &str = "Retry";
pub const LABEL_DOWNLOAD: &str = "Download";
pub const LABEL_DOWNLOADING: &str = "Downloading...";

pub const NO_UPLOAD_MESSAGE: &str = "Select an image and wait for the upload to finish first.";
pub const MANUAL_SAVE_MESSAGE: &str =
    "Download failed. Open the result URL and save the image manually.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub ui: UiState,
    pub generate_label: &'static str,
    pub generate_enabled: bool,
    pub download_label: &'static str,
    pub download_enabled: bool,
    pub reset_enabled: bool,
    pub preview: Option<PreviewView>,
    pub remote_url: Option<String>,
    pub job: Option<JobView>,
    pub result_url: Option<String>,
    pub notification: Option<Notification>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub file_name: String,
    /// Known once the engine has read the file.
    pub byte_len: Option<u64>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: Option<String>,
    pub status: JobStatus,
    pub polls: u32,
}
