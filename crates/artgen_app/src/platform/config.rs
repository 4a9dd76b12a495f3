use std::fs;
use std::path::Path;
use std::time::Duration;

use artgen_engine::ApiSettings;
use engine_logging::{engine_info, engine_warn};
use ron::extensions::Extensions;
use serde::Deserialize;

/// Optional overrides for `ApiSettings`; every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    api_base: Option<String>,
    content_base: Option<String>,
    user_id: Option<String>,
    model: Option<String>,
    tool_type: Option<String>,
    effect_id: Option<String>,
    remove_watermark: Option<bool>,
    is_private: Option<bool>,
    poll_interval_ms: Option<u64>,
    max_polls: Option<u32>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    max_download_bytes: Option<u64>,
    artifact_prefix: Option<String>,
}

/// Loads settings from a RON file, falling back to defaults.
///
/// A missing file is normal. An unreadable or malformed one is logged and
/// ignored as a whole.
pub fn load_settings(path: &Path) -> ApiSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ApiSettings::default();
        }
        Err(err) => {
            engine_warn!("Failed to read settings from {:?}: {}", path, err);
            return ApiSettings::default();
        }
    };

    let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
    let file: SettingsFile = match options.from_str(&content) {
        Ok(file) => file,
        Err(err) => {
            engine_warn!("Failed to parse settings from {:?}: {}", path, err);
            return ApiSettings::default();
        }
    };

    engine_info!("Loaded settings overrides from {:?}", path);
    apply(file, ApiSettings::default())
}

fn apply(file: SettingsFile, mut settings: ApiSettings) -> ApiSettings {
    if let Some(value) = file.api_base {
        settings.api_base = value;
    }
    if let Some(value) = file.content_base {
        settings.content_base = value;
    }
    if let Some(value) = file.user_id {
        settings.user_id = value;
    }
    if let Some(value) = file.model {
        settings.effect.model = value;
    }
    if let Some(value) = file.tool_type {
        settings.effect.tool_type = value;
    }
    if let Some(value) = file.effect_id {
        settings.effect.effect_id = value;
    }
    if let Some(value) = file.remove_watermark {
        settings.effect.remove_watermark = value;
    }
    if let Some(value) = file.is_private {
        settings.effect.is_private = value;
    }
    if let Some(ms) = file.poll_interval_ms {
        settings.poll.interval = Duration::from_millis(ms);
    }
    if let Some(value) = file.max_polls {
        settings.poll.max_polls = value;
    }
    if let Some(secs) = file.connect_timeout_secs {
        settings.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(value) = file.max_download_bytes {
        settings.max_download_bytes = value;
    }
    if let Some(value) = file.artifact_prefix {
        settings.artifact_prefix = value;
    }
    settings
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(&temp.path().join("absent.ron"));
        assert_eq!(settings, ApiSettings::default());
    }

    #[test]
    fn overrides_replace_only_named_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("artgen.ron");
        fs::write(
            &path,
            r#"(
                api_base: "http://localhost:8080",
                poll_interval_ms: 500,
                max_polls: 3,
                effect_id: "photoToSketch",
                is_private: false,
            )"#,
        )
        .unwrap();

        let settings = load_settings(&path);
        let defaults = ApiSettings::default();
        assert_eq!(settings.api_base, "http://localhost:8080");
        assert_eq!(settings.poll.interval, Duration::from_millis(500));
        assert_eq!(settings.poll.max_polls, 3);
        assert_eq!(settings.effect.effect_id, "photoToSketch");
        assert!(!settings.effect.is_private);
        assert_eq!(settings.content_base, defaults.content_base);
        assert_eq!(settings.user_id, defaults.user_id);
        assert_eq!(settings.effect.model, defaults.effect.model);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("artgen.ron");
        fs::write(&path, "(max_polls: \"many\"").unwrap();

        assert_eq!(load_settings(&path), ApiSettings::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("artgen.ron");
        fs::write(&path, "(max_polls: 3, polls_max: 4)").unwrap();

        assert_eq!(load_settings(&path), ApiSettings::default());
    }
}
