use crate::{Generation, SelectedFile};

/// Side effects requested by `update`; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upload the selected file and report back with `Msg::UploadFinished`.
    StartUpload {
        generation: Generation,
        file: SelectedFile,
    },
    /// Submit a transformation job for the uploaded image and poll it.
    SubmitJob {
        generation: Generation,
        image_url: String,
    },
    /// Fetch the result artifact and save it locally.
    StartDownload { result_url: String },
    /// Abandon any upload or poll still running for an older generation.
    CancelInFlight,
}
