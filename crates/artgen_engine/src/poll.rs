use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::types::cancellable;
use crate::{
    EngineEvent, Generation, ImageApi, JobStatusReport, PollSettings, ProgressSink, RemoteStatus,
    WorkflowError,
};

/// Polls the job until it reaches a terminal status or the poll cap.
///
/// Issues at most `settings.max_polls` status requests and sleeps
/// `settings.interval` between them (never after the last one). A failed
/// status request ends the poll immediately. Each request is reported to
/// `sink` as a `PollAttempt`.
pub async fn poll_job(
    api: &dyn ImageApi,
    settings: &PollSettings,
    generation: Generation,
    job_id: &str,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<JobStatusReport, WorkflowError> {
    for attempt in 1..=settings.max_polls {
        let report = cancellable(cancel, api.job_status(job_id)).await?;
        sink.emit(EngineEvent::PollAttempt {
            generation,
            attempt,
        });

        match report.status {
            RemoteStatus::Completed => {
                engine_info!("Job {} completed after {} checks", job_id, attempt);
                return Ok(report);
            }
            RemoteStatus::Failed | RemoteStatus::Error => {
                return Err(WorkflowError::JobFailed {
                    status: report.status,
                    message: report.error_message(),
                });
            }
            RemoteStatus::Pending => {
                engine_debug!("Job {} pending (check {})", job_id, attempt);
            }
        }

        if attempt < settings.max_polls {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WorkflowError::Cancelled),
                _ = tokio::time::sleep(settings.interval) => {}
            }
        }
    }

    Err(WorkflowError::Timeout {
        polls: settings.max_polls,
    })
}
