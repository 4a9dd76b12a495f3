//! Artgen core: pure workflow state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{JobOutcome, Msg};
pub use state::{
    AppState, Generation, Job, JobStatus, Notification, RemoteObject, SelectedFile, Severity,
    UiState, UploadedAsset,
};
pub use update::update;
pub use view_model::{
    AppViewModel, JobView, PreviewView, LABEL_DOWNLOAD, LABEL_DOWNLOADING, LABEL_GENERATE,
    LABEL_GENERATE_AGAIN, LABEL_PROCESSING, LABEL_RETRY, LABEL_UPLOADING, MANUAL_SAVE_MESSAGE,
    NO_UPLOAD_MESSAGE,
};
