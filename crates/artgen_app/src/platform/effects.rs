use std::path::PathBuf;

use artgen_core::{Effect, JobOutcome, Msg, RemoteObject};
use artgen_engine::{
    ApiSettings, EngineEvent, EngineHandle, RemoteStatus, UploadedImage, WorkflowError,
};
use engine_logging::{engine_debug, engine_info};

/// Turns core effects into engine commands and engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ApiSettings, output_dir: PathBuf) -> Result<Self, WorkflowError> {
        engine_info!(
            "Starting engine: api={} output_dir={:?}",
            settings.api_base,
            output_dir
        );
        Ok(Self {
            engine: EngineHandle::new(settings, output_dir)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUpload { generation, file } => {
                    engine_info!("StartUpload generation={} path={:?}", generation, file.path);
                    self.engine.upload(generation, file.path);
                }
                Effect::SubmitJob {
                    generation,
                    image_url,
                } => {
                    engine_info!("SubmitJob generation={} image_url={}", generation, image_url);
                    self.engine.generate(generation, image_url);
                }
                Effect::StartDownload { result_url } => {
                    engine_info!("StartDownload url={}", result_url);
                    self.engine.download(result_url);
                }
                Effect::CancelInFlight => {
                    engine_debug!("CancelInFlight");
                    self.engine.cancel();
                }
            }
        }
    }

    /// Collects every event the engine has produced so far.
    pub fn drain(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadStarted {
            generation,
            byte_len,
            content_type,
        } => Msg::UploadStarted {
            generation,
            byte_len,
            content_type,
        },
        EngineEvent::UploadCompleted { generation, result } => Msg::UploadFinished {
            generation,
            result: result.map(remote_object).map_err(|err| err.to_string()),
        },
        EngineEvent::JobSubmitted { generation, job_id } => {
            Msg::JobSubmitted { generation, job_id }
        }
        EngineEvent::PollAttempt {
            generation,
            attempt,
        } => Msg::JobPolled {
            generation,
            attempt,
        },
        EngineEvent::GenerationCompleted { generation, result } => Msg::JobFinished {
            generation,
            outcome: match result {
                Ok(result_url) => JobOutcome::Completed { result_url },
                Err(err) => job_outcome(err),
            },
        },
        EngineEvent::DownloadCompleted { result } => Msg::DownloadFinished {
            result: result.map_err(|err| err.to_string()),
        },
    }
}

fn remote_object(image: UploadedImage) -> RemoteObject {
    RemoteObject {
        destination_name: image.destination_name,
        remote_url: image.public_url,
    }
}

fn job_outcome(err: WorkflowError) -> JobOutcome {
    match err {
        WorkflowError::JobFailed {
            status: RemoteStatus::Failed,
            message,
        } => JobOutcome::Failed { message },
        WorkflowError::JobFailed { message, .. } => JobOutcome::Errored { message },
        WorkflowError::Timeout { polls } => JobOutcome::TimedOut { polls },
        other => JobOutcome::Aborted {
            message: other.to_string(),
        },
    }
}
