use std::path::Path;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::id::{destination_name, generate_id, UPLOAD_ID_LENGTH};
use crate::types::cancellable;
use crate::{ImageApi, UploadedImage, WorkflowError};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A local file ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: String,
    /// Declared type sent with the transfer; sniffed from the leading bytes.
    pub content_type: String,
    pub bytes: Bytes,
}

impl SourceFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let content_type = infer::get(&bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub async fn load(path: &Path) -> Result<Self, WorkflowError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| WorkflowError::ReadFile {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Uploads `file` under a fresh random name and returns its public URL.
///
/// No retries: the first failing step is returned as-is.
pub async fn upload_file(
    api: &dyn ImageApi,
    file: &SourceFile,
    cancel: &CancellationToken,
) -> Result<UploadedImage, WorkflowError> {
    let destination = destination_name(&file.file_name, &generate_id(UPLOAD_ID_LENGTH));
    engine_debug!(
        "Requesting upload URL for {} ({} bytes, {})",
        destination,
        file.byte_len(),
        file.content_type
    );

    let signed_url = cancellable(cancel, api.request_upload_url(&destination)).await?;
    cancellable(
        cancel,
        api.put_object(&signed_url, file.bytes.clone(), &file.content_type),
    )
    .await?;

    let public_url = api.public_url(&destination);
    engine_info!("Uploaded {} as {}", file.file_name, public_url);
    Ok(UploadedImage {
        destination_name: destination,
        public_url,
    })
}
