mod app;
mod autopilot;
mod config;
mod effects;
mod ui;

pub use app::{run_app, AppOptions};
pub use config::load_settings;
