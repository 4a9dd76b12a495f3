use rand::{distr::Alphanumeric, Rng};

/// Length of the random prefix given to uploaded files.
pub const UPLOAD_ID_LENGTH: usize = 21;
/// Length of the random suffix given to saved artifacts.
pub const DOWNLOAD_ID_LENGTH: usize = 8;

const DEFAULT_EXTENSION: &str = "jpg";

/// Random identifier of exactly `length` characters from `[A-Za-z0-9]`.
///
/// Characters are drawn independently and uniformly; collisions are possible
/// and are not detected.
pub fn generate_id(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Remote object name: `{id}.{ext}`, keeping the original extension.
pub fn destination_name(original_name: &str, id: &str) -> String {
    let extension = match original_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    };
    format!("{id}.{extension}")
}

/// Local name for a downloaded result: `{prefix}{id}.jpg`.
pub fn artifact_filename(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}.{DEFAULT_EXTENSION}")
}
