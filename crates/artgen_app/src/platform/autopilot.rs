use artgen_core::{AppViewModel, Msg, Severity, UiState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Wait,
    Dispatch(Msg),
    /// The run is over; carries the final message for the user.
    Finish(Result<String, String>),
}

/// Drives upload, generate and download without user input.
///
/// Each step clicks at most once; a second visit to the same state after the
/// click means the attempt is over.
#[derive(Debug, Default)]
pub struct AutoPilot {
    generate_sent: bool,
    download_sent: bool,
}

impl AutoPilot {
    pub fn next(&mut self, view: &AppViewModel) -> Step {
        match view.ui {
            UiState::Idle | UiState::Previewing | UiState::Uploading | UiState::Generating => {
                Step::Wait
            }
            UiState::Error => Step::Finish(Err(notification_text(view, "Upload failed"))),
            UiState::Ready if !self.generate_sent => {
                self.generate_sent = true;
                Step::Dispatch(Msg::GenerateClicked)
            }
            UiState::Ready => Step::Finish(Err(notification_text(view, "Generation failed"))),
            UiState::ResultShown if !self.download_sent => {
                self.download_sent = true;
                Step::Dispatch(Msg::DownloadClicked)
            }
            UiState::ResultShown if !view.download_enabled => Step::Wait,
            UiState::ResultShown => match &view.notification {
                Some(note) if note.severity == Severity::Info => Step::Finish(Ok(note.text.clone())),
                _ => Step::Finish(Err(notification_text(view, "Download failed"))),
            },
        }
    }
}

fn notification_text(view: &AppViewModel, fallback: &str) -> String {
    view.notification
        .as_ref()
        .map(|note| note.text.clone())
        .unwrap_or_else(|| fallback.to_string())
}
