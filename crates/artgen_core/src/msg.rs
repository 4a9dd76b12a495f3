use std::path::PathBuf;

use crate::{Generation, RemoteObject, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file or dropped one onto the upload zone.
    FileSelected(SelectedFile),
    /// Engine read the file and began transferring it.
    UploadStarted {
        generation: Generation,
        byte_len: u64,
        content_type: String,
    },
    /// Engine finished the upload attempt.
    UploadFinished {
        generation: Generation,
        result: Result<RemoteObject, String>,
    },
    /// User clicked Generate / Generate Again / Retry.
    GenerateClicked,
    /// Remote service accepted the job.
    JobSubmitted {
        generation: Generation,
        job_id: String,
    },
    /// One status query was issued for the running job.
    JobPolled { generation: Generation, attempt: u32 },
    /// Job reached a terminal state, or submission/polling gave up.
    JobFinished {
        generation: Generation,
        outcome: JobOutcome,
    },
    /// User clicked Download.
    DownloadClicked,
    /// Download attempt finished; `Ok` holds the saved path.
    DownloadFinished { result: Result<PathBuf, String> },
    /// User clicked Reset.
    ResetClicked,
    /// User acknowledged the current notification.
    DismissNotification,
    /// Fallback for placeholder wiring.
    NoOp,
}

/// How a generation ended, as far as the workflow cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { result_url: String },
    /// Server reported `failed`.
    Failed { message: String },
    /// Server reported `error`.
    Errored { message: String },
    /// Poll cap reached without a terminal status.
    TimedOut { polls: u32 },
    /// Submission, transport or response parsing failed.
    Aborted { message: String },
}
