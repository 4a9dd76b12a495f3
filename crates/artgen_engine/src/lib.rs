//! Artgen engine: remote-service clients and workflow effect execution.
mod api;
mod download;
mod engine;
mod id;
mod persist;
mod poll;
mod submit;
mod types;
mod upload;

pub use api::{ApiSettings, EffectConfig, ImageApi, PollSettings, ReqwestApi};
pub use download::download_artifact;
pub use engine::{ChannelProgressSink, EngineHandle, ProgressSink};
pub use id::{
    artifact_filename, destination_name, generate_id, DOWNLOAD_ID_LENGTH, UPLOAD_ID_LENGTH,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poll::poll_job;
pub use submit::submit_job;
pub use types::{
    EngineEvent, Generation, JobStatusReport, RemoteStatus, SubmitRequest, SubmitResponse,
    UploadedImage, WorkflowError, DEFAULT_JOB_FAILURE,
};
pub use upload::{upload_file, SourceFile};
