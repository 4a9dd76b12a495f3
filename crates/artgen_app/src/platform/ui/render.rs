use artgen_core::{AppViewModel, JobStatus, Notification, Severity, UiState};

/// Renders the view model as terminal lines, top to bottom.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!("State: {}", ui_label(view.ui))];

    if let Some(preview) = &view.preview {
        let details = match (preview.byte_len, &preview.content_type) {
            (Some(len), Some(content_type)) => {
                format!(" ({} bytes, {})", format_with_commas(len), content_type)
            }
            (Some(len), None) => format!(" ({} bytes)", format_with_commas(len)),
            _ => String::new(),
        };
        lines.push(format!("Image: {}{}", preview.file_name, details));
    }
    if let Some(url) = &view.remote_url {
        lines.push(format!("Uploaded: {url}"));
    }
    if let Some(job) = &view.job {
        let id = job.job_id.as_deref().unwrap_or("(submitting)");
        let checks = match job.polls {
            0 => String::new(),
            1 => ", 1 check".to_string(),
            n => format!(", {n} checks"),
        };
        lines.push(format!("Job: {id} ({}{checks})", status_label(job.status)));
    }
    if let Some(url) = &view.result_url {
        lines.push(format!("Result: {url}"));
    }

    lines.push(
        [
            button(view.generate_label, view.generate_enabled),
            button(view.download_label, view.download_enabled),
            button("Reset", view.reset_enabled),
        ]
        .join(" "),
    );

    if let Some(notification) = &view.notification {
        lines.push(format_notification(notification));
    }
    lines
}

fn ui_label(ui: UiState) -> &'static str {
    match ui {
        UiState::Idle => "Idle",
        UiState::Previewing => "Preparing upload",
        UiState::Uploading => "Uploading",
        UiState::Ready => "Ready",
        UiState::Generating => "Generating",
        UiState::ResultShown => "Result ready",
        UiState::Error => "Error",
    }
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
        JobStatus::Error => "error",
        JobStatus::TimedOut => "timed out",
    }
}

/// Enabled buttons are bracketed, disabled ones parenthesized.
fn button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[{label}]")
    } else {
        format!("({label})")
    }
}

fn format_notification(notification: &Notification) -> String {
    match notification.severity {
        Severity::Info => format!("* {}", notification.text),
        Severity::Error => format!("! {}", notification.text),
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use artgen_core::{
        update, AppState, JobOutcome, Msg, RemoteObject, SelectedFile, LABEL_GENERATE,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn drive(msgs: Vec<Msg>) -> AppViewModel {
        let mut state = AppState::new();
        for msg in msgs {
            state = update(state, msg).0;
        }
        state.view()
    }

    #[test]
    fn idle_view_shows_disabled_buttons() {
        let lines = render(&AppState::new().view());
        assert_eq!(
            lines,
            vec![
                "State: Idle".to_string(),
                format!("({LABEL_GENERATE}) (Download) (Reset)"),
            ]
        );
    }

    #[test]
    fn finished_job_lists_every_stage() {
        let view = drive(vec![
            Msg::FileSelected(SelectedFile::from_path("/photos/cat.png")),
            Msg::UploadStarted {
                generation: 1,
                byte_len: 2048,
                content_type: "image/png".to_string(),
            },
            Msg::UploadFinished {
                generation: 1,
                result: Ok(RemoteObject {
                    destination_name: "abc.png".to_string(),
                    remote_url: "https://contents.example.com/abc.png".to_string(),
                }),
            },
            Msg::GenerateClicked,
            Msg::JobSubmitted {
                generation: 1,
                job_id: "job-9".to_string(),
            },
            Msg::JobPolled {
                generation: 1,
                attempt: 3,
            },
            Msg::JobFinished {
                generation: 1,
                outcome: JobOutcome::Completed {
                    result_url: "https://cdn.example.com/out.jpg".to_string(),
                },
            },
        ]);

        assert_eq!(
            render(&view),
            vec![
                "State: Result ready",
                "Image: cat.png (2,048 bytes, image/png)",
                "Uploaded: https://contents.example.com/abc.png",
                "Job: job-9 (completed, 3 checks)",
                "Result: https://cdn.example.com/out.jpg",
                "[Generate Again] [Download] [Reset]",
            ]
        );
    }

    #[test]
    fn error_notification_is_flagged() {
        let view = drive(vec![Msg::GenerateClicked]);
        let lines = render(&view);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("! Select an image and wait for the upload to finish first.")
        );
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }
}
