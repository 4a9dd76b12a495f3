use std::path::PathBuf;

use crate::view_model::{self, AppViewModel, JobView, PreviewView};

/// Counter bumped whenever the current upload/job linkage is invalidated
/// (new file selected, reset). Results tagged with an older value are stale.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Previewing,
    Uploading,
    Ready,
    Generating,
    ResultShown,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }
}

/// Where an upload landed on the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub destination_name: String,
    pub remote_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub source: SelectedFile,
    pub remote: RemoteObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
    Error,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub generation: Generation,
    pub job_id: Option<String>,
    pub image_url: String,
    pub status: JobStatus,
    pub polls: u32,
    pub result_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Preview {
    byte_len: u64,
    content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    ui: UiState,
    generation: Generation,
    selected: Option<SelectedFile>,
    preview: Option<Preview>,
    asset: Option<UploadedAsset>,
    job: Option<Job>,
    last_generation_failed: bool,
    downloading: bool,
    notification: Option<Notification>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ui(&self) -> UiState {
        self.ui
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn asset(&self) -> Option<&UploadedAsset> {
        self.asset.as_ref()
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// URL of the finished artifact, if the current job produced one.
    pub fn result_url(&self) -> Option<&str> {
        self.job
            .as_ref()
            .filter(|job| job.status == JobStatus::Completed)
            .and_then(|job| job.result_url.as_deref())
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        let generate_label = match self.ui {
            UiState::Previewing | UiState::Uploading => view_model::LABEL_UPLOADING,
            UiState::Generating => view_model::LABEL_PROCESSING,
            UiState::ResultShown => view_model::LABEL_GENERATE_AGAIN,
            UiState::Ready if self.last_generation_failed => view_model::LABEL_RETRY,
            UiState::Idle | UiState::Ready | UiState::Error => view_model::LABEL_GENERATE,
        };
        let download_label = if self.downloading {
            view_model::LABEL_DOWNLOADING
        } else {
            view_model::LABEL_DOWNLOAD
        };

        AppViewModel {
            ui: self.ui,
            generate_label,
            generate_enabled: matches!(self.ui, UiState::Ready | UiState::ResultShown),
            download_label,
            download_enabled: self.result_url().is_some() && !self.downloading,
            reset_enabled: self.ui != UiState::Idle,
            preview: self.selected.as_ref().map(|file| PreviewView {
                file_name: file.file_name.clone(),
                byte_len: self.preview.as_ref().map(|p| p.byte_len),
                content_type: self.preview.as_ref().map(|p| p.content_type.clone()),
            }),
            remote_url: self.asset.as_ref().map(|a| a.remote.remote_url.clone()),
            job: self.job.as_ref().map(|job| JobView {
                job_id: job.job_id.clone(),
                status: job.status,
                polls: job.polls,
            }),
            result_url: self.result_url().map(ToOwned::to_owned),
            notification: self.notification.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Drops the previous asset and job and starts a new generation for `file`.
    pub(crate) fn select_file(&mut self, file: SelectedFile) -> Generation {
        self.invalidate();
        self.selected = Some(file);
        self.notification = None;
        self.ui = UiState::Previewing;
        self.generation
    }

    pub(crate) fn begin_upload(&mut self, byte_len: u64, content_type: String) {
        self.preview = Some(Preview {
            byte_len,
            content_type,
        });
        self.ui = UiState::Uploading;
        self.mark_dirty();
    }

    pub(crate) fn finish_upload(&mut self, remote: RemoteObject) {
        if let Some(source) = self.selected.clone() {
            self.asset = Some(UploadedAsset { source, remote });
            self.ui = UiState::Ready;
        } else {
            self.ui = UiState::Idle;
        }
        self.mark_dirty();
    }

    pub(crate) fn fail_upload(&mut self, message: &str) {
        self.asset = None;
        self.ui = UiState::Error;
        self.notify(Severity::Error, format!("Upload failed: {message}"));
    }

    pub(crate) fn start_job(&mut self, image_url: String) -> Generation {
        self.job = Some(Job {
            generation: self.generation,
            job_id: None,
            image_url,
            status: JobStatus::Pending,
            polls: 0,
            result_url: None,
        });
        self.last_generation_failed = false;
        self.notification = None;
        self.ui = UiState::Generating;
        self.mark_dirty();
        self.generation
    }

    pub(crate) fn job_mut(&mut self) -> Option<&mut Job> {
        self.dirty = true;
        self.job.as_mut()
    }

    pub(crate) fn complete_job(&mut self, result_url: String) {
        if let Some(job) = self.job.as_mut() {
            job.status = JobStatus::Completed;
            job.result_url = Some(result_url);
        }
        self.ui = UiState::ResultShown;
        self.mark_dirty();
    }

    pub(crate) fn fail_job(&mut self, status: JobStatus, message: &str) {
        if let Some(job) = self.job.as_mut() {
            job.status = status;
        }
        self.last_generation_failed = true;
        self.ui = UiState::Ready;
        self.notify(Severity::Error, format!("Generation failed: {message}"));
    }

    pub(crate) fn begin_download(&mut self) {
        self.downloading = true;
        self.notification = None;
        self.mark_dirty();
    }

    /// Returns false when no download was outstanding.
    pub(crate) fn end_download(&mut self) -> bool {
        std::mem::replace(&mut self.downloading, false)
    }

    pub(crate) fn reset(&mut self) {
        self.invalidate();
        self.ui = UiState::Idle;
        self.notification = None;
    }

    pub(crate) fn notify(&mut self, severity: Severity, text: impl Into<String>) {
        self.notification = Some(Notification {
            severity,
            text: text.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn dismiss_notification(&mut self) {
        if self.notification.take().is_some() {
            self.mark_dirty();
        }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.selected = None;
        self.preview = None;
        self.asset = None;
        self.job = None;
        self.last_generation_failed = false;
        self.mark_dirty();
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
