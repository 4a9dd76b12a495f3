use engine_logging::{engine_debug, engine_warn};

use crate::view_model::{MANUAL_SAVE_MESSAGE, NO_UPLOAD_MESSAGE};
use crate::{AppState, Effect, Generation, Job, JobOutcome, JobStatus, Msg, Severity, UiState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => {
            // Anything still running belongs to the previous file.
            let generation = state.select_file(file.clone());
            vec![
                Effect::CancelInFlight,
                Effect::StartUpload { generation, file },
            ]
        }
        Msg::UploadStarted {
            generation,
            byte_len,
            content_type,
        } => {
            if state.is_current(generation) && state.ui() == UiState::Previewing {
                state.begin_upload(byte_len, content_type);
            } else {
                engine_debug!("Dropping stale UploadStarted for generation {generation}");
            }
            Vec::new()
        }
        Msg::UploadFinished { generation, result } => {
            let uploading = matches!(state.ui(), UiState::Previewing | UiState::Uploading);
            if !state.is_current(generation) || !uploading {
                engine_debug!("Dropping stale UploadFinished for generation {generation}");
                return (state, Vec::new());
            }
            match result {
                Ok(remote) => state.finish_upload(remote),
                Err(message) => {
                    engine_warn!("Upload failed: {message}");
                    state.fail_upload(&message);
                }
            }
            Vec::new()
        }
        Msg::GenerateClicked => {
            let image_url = state.asset().map(|asset| asset.remote.remote_url.clone());
            match (state.ui(), image_url) {
                (_, None) => {
                    state.notify(Severity::Error, NO_UPLOAD_MESSAGE);
                    Vec::new()
                }
                (UiState::Ready | UiState::ResultShown, Some(image_url)) => {
                    let generation = state.start_job(image_url.clone());
                    vec![Effect::SubmitJob {
                        generation,
                        image_url,
                    }]
                }
                // Generate is disabled while a job is running.
                _ => Vec::new(),
            }
        }
        Msg::JobSubmitted { generation, job_id } => {
            if let Some(job) = current_job(&mut state, generation) {
                job.job_id = Some(job_id);
            }
            Vec::new()
        }
        Msg::JobPolled {
            generation,
            attempt,
        } => {
            if let Some(job) = current_job(&mut state, generation) {
                job.polls = attempt;
            }
            Vec::new()
        }
        Msg::JobFinished {
            generation,
            outcome,
        } => {
            if !state.is_current(generation) || state.ui() != UiState::Generating {
                engine_debug!("Dropping stale JobFinished for generation {generation}");
                return (state, Vec::new());
            }
            apply_outcome(&mut state, outcome);
            Vec::new()
        }
        Msg::DownloadClicked => match state.result_url() {
            Some(url) if !state.is_downloading() => {
                let result_url = url.to_string();
                state.begin_download();
                vec![Effect::StartDownload { result_url }]
            }
            _ => Vec::new(),
        },
        Msg::DownloadFinished { result } => {
            if !state.end_download() {
                return (state, Vec::new());
            }
            match result {
                Ok(path) => state.notify(Severity::Info, format!("Saved {}", path.display())),
                Err(message) => {
                    engine_warn!("Download failed: {message}");
                    state.notify(Severity::Error, MANUAL_SAVE_MESSAGE);
                }
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            state.reset();
            vec![Effect::CancelInFlight]
        }
        Msg::DismissNotification => {
            state.dismiss_notification();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn current_job(state: &mut AppState, generation: Generation) -> Option<&mut Job> {
    if !state.is_current(generation) || state.ui() != UiState::Generating {
        return None;
    }
    state.job_mut()
}

fn apply_outcome(state: &mut AppState, outcome: JobOutcome) {
    match outcome {
        JobOutcome::Completed { result_url } => state.complete_job(result_url),
        JobOutcome::Failed { message } => {
            engine_warn!("Job failed: {message}");
            state.fail_job(JobStatus::Failed, &message);
        }
        JobOutcome::Errored { message } => {
            engine_warn!("Job errored: {message}");
            state.fail_job(JobStatus::Error, &message);
        }
        JobOutcome::TimedOut { polls } => {
            engine_warn!("Job timed out after {polls} status checks");
            state.fail_job(JobStatus::TimedOut, "Job timed out");
        }
        JobOutcome::Aborted { message } => {
            engine_warn!("Job aborted: {message}");
            // The job never reached a terminal status on the server side.
            state.fail_job(JobStatus::Error, &message);
        }
    }
}
