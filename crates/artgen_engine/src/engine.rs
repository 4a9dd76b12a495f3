use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::{
    download_artifact, poll_job, submit_job, upload_file, ApiSettings, AtomicFileWriter,
    EngineEvent, Generation, ImageApi, ReqwestApi, SourceFile, WorkflowError,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Upload {
        generation: Generation,
        path: PathBuf,
    },
    Generate {
        generation: Generation,
        image_url: String,
    },
    Download {
        result_url: String,
    },
    Cancel,
}

/// Runs workflow steps on a background tokio runtime.
///
/// Commands are fire-and-forget; results come back as `EngineEvent`s tagged
/// with the generation they were issued for. `cancel` abandons every upload
/// and poll started before it; their events still arrive, carrying
/// `WorkflowError::Cancelled`.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

struct TaskContext {
    api: Arc<dyn ImageApi>,
    settings: ApiSettings,
    writer: AtomicFileWriter,
    cancel: CancellationToken,
    sink: ChannelProgressSink,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings, output_dir: PathBuf) -> Result<Self, WorkflowError> {
        let api = Arc::new(ReqwestApi::new(settings.clone())?);
        Ok(Self::with_api(api, settings, output_dir))
    }

    /// Same as `new` but with a caller-provided service implementation.
    pub fn with_api(api: Arc<dyn ImageApi>, settings: ApiSettings, output_dir: PathBuf) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let writer = AtomicFileWriter::new(output_dir);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut cancel = CancellationToken::new();
            while let Ok(command) = cmd_rx.recv() {
                if let EngineCommand::Cancel = command {
                    engine_debug!("Cancelling in-flight work");
                    cancel.cancel();
                    cancel = CancellationToken::new();
                    continue;
                }
                let ctx = TaskContext {
                    api: api.clone(),
                    settings: settings.clone(),
                    writer: writer.clone(),
                    cancel: cancel.clone(),
                    sink: ChannelProgressSink::new(event_tx.clone()),
                };
                runtime.spawn(async move {
                    handle_command(ctx, command).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn upload(&self, generation: Generation, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Upload {
            generation,
            path: path.into(),
        });
    }

    /// Submits a job for `image_url` and polls it to completion.
    pub fn generate(&self, generation: Generation, image_url: impl Into<String>) {
        self.send(EngineCommand::Generate {
            generation,
            image_url: image_url.into(),
        });
    }

    pub fn download(&self, result_url: impl Into<String>) {
        self.send(EngineCommand::Download {
            result_url: result_url.into(),
        });
    }

    pub fn cancel(&self) {
        self.send(EngineCommand::Cancel);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(ctx: TaskContext, command: EngineCommand) {
    match command {
        EngineCommand::Upload { generation, path } => {
            let result = run_upload(&ctx, generation, &path).await;
            if let Err(err) = &result {
                engine_warn!("Upload of {:?} failed: {}", path, err);
            }
            ctx.sink
                .emit(EngineEvent::UploadCompleted { generation, result });
        }
        EngineCommand::Generate {
            generation,
            image_url,
        } => {
            let result = run_generation(&ctx, generation, &image_url).await;
            if let Err(err) = &result {
                engine_warn!("Generation {} failed: {}", generation, err);
            }
            ctx.sink
                .emit(EngineEvent::GenerationCompleted { generation, result });
        }
        EngineCommand::Download { result_url } => {
            let result = download_artifact(
                ctx.api.as_ref(),
                &result_url,
                &ctx.writer,
                &ctx.settings.artifact_prefix,
            )
            .await;
            if let Err(err) = &result {
                engine_warn!("Download of {} failed: {}", result_url, err);
            }
            ctx.sink.emit(EngineEvent::DownloadCompleted { result });
        }
        EngineCommand::Cancel => {}
    }
}

async fn run_upload(
    ctx: &TaskContext,
    generation: Generation,
    path: &std::path::Path,
) -> Result<crate::UploadedImage, WorkflowError> {
    let file = SourceFile::load(path).await?;
    ctx.sink.emit(EngineEvent::UploadStarted {
        generation,
        byte_len: file.byte_len(),
        content_type: file.content_type.clone(),
    });
    upload_file(ctx.api.as_ref(), &file, &ctx.cancel).await
}

async fn run_generation(
    ctx: &TaskContext,
    generation: Generation,
    image_url: &str,
) -> Result<String, WorkflowError> {
    let job_id = submit_job(ctx.api.as_ref(), image_url, &ctx.cancel).await?;
    ctx.sink.emit(EngineEvent::JobSubmitted {
        generation,
        job_id: job_id.clone(),
    });

    let report = poll_job(
        ctx.api.as_ref(),
        &ctx.settings.poll,
        generation,
        &job_id,
        &ctx.sink,
        &ctx.cancel,
    )
    .await?;
    let result_url = report.result_url().ok_or(WorkflowError::MissingResultUrl)?;
    engine_info!("Generation {} produced {}", generation, result_url);
    Ok(result_url)
}
