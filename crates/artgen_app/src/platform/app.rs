use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use artgen_core::{update, AppState, AppViewModel, Msg, SelectedFile, UiState};
use artgen_engine::ApiSettings;
use engine_logging::{engine_debug, engine_info};

use super::autopilot::{AutoPilot, Step};
use super::effects::EffectRunner;
use super::ui::commands::{parse_command, Command};
use super::ui::{help, render};

const TICK: Duration = Duration::from_millis(50);

pub struct AppOptions {
    pub settings: ApiSettings,
    pub output_dir: PathBuf,
    pub initial_image: Option<PathBuf>,
    pub auto: bool,
}

enum Input {
    Line(String),
    Closed,
}

/// Runs until the user quits or, with `auto`, until the workflow ends.
/// Returns whether the session ended successfully.
pub fn run_app(options: AppOptions) -> anyhow::Result<bool> {
    let runner = EffectRunner::new(options.settings, options.output_dir)?;
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    if !options.auto {
        spawn_input_reader(input_tx.clone());
    }

    let mut app = App {
        state: AppState::new(),
        runner,
        autopilot: options.auto.then(AutoPilot::default),
        input_closed: false,
    };

    if !options.auto {
        println!("{}", help::PROMPT_HINT);
    }
    app.print_view(&app.state.view());
    if let Some(image) = options.initial_image {
        app.dispatch(Msg::FileSelected(SelectedFile::from_path(image)));
    }

    loop {
        match input_rx.recv_timeout(TICK) {
            Ok(Input::Line(line)) => {
                if !app.handle_line(&line) {
                    engine_info!("Quit requested");
                    return Ok(true);
                }
            }
            Ok(Input::Closed) => {
                engine_debug!("Input closed; exiting once idle");
                app.input_closed = true;
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
        }

        for msg in app.runner.drain() {
            app.dispatch(msg);
        }

        if let Some(outcome) = app.drive_autopilot() {
            return Ok(outcome);
        }
        if app.input_closed && !is_busy(&app.state) {
            return Ok(true);
        }
    }
}

struct App {
    state: AppState,
    runner: EffectRunner,
    autopilot: Option<AutoPilot>,
    input_closed: bool,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;
        self.runner.enqueue(effects);
        if was_dirty {
            self.print_view(&view);
        }
    }

    /// Returns false when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        let msg = match parse_command(line) {
            Command::Open(path) => Msg::FileSelected(SelectedFile::from_path(path)),
            Command::Generate => Msg::GenerateClicked,
            Command::Download => Msg::DownloadClicked,
            Command::Reset => Msg::ResetClicked,
            Command::Dismiss => Msg::DismissNotification,
            Command::Status => {
                self.print_view(&self.state.view());
                return true;
            }
            Command::Help => {
                for line in help::help_lines() {
                    println!("{line}");
                }
                return true;
            }
            Command::Quit => return false,
            Command::Empty => return true,
            Command::Unknown(text) => {
                println!("Unknown command: {text}. {}", help::PROMPT_HINT);
                return true;
            }
        };
        self.dispatch(msg);
        true
    }

    /// Returns the run's success once the autopilot is done.
    fn drive_autopilot(&mut self) -> Option<bool> {
        let pilot = self.autopilot.as_mut()?;
        match pilot.next(&self.state.view()) {
            Step::Wait => None,
            Step::Dispatch(msg) => {
                self.dispatch(msg);
                None
            }
            Step::Finish(Ok(text)) => {
                println!("{text}");
                Some(true)
            }
            Step::Finish(Err(text)) => {
                eprintln!("{text}");
                Some(false)
            }
        }
    }

    fn print_view(&self, view: &AppViewModel) {
        println!();
        for line in render::render(view) {
            println!("{line}");
        }
    }
}

fn is_busy(state: &AppState) -> bool {
    state.is_downloading()
        || matches!(
            state.ui(),
            UiState::Previewing | UiState::Uploading | UiState::Generating
        )
}

fn spawn_input_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });
}
