use std::path::PathBuf;

use engine_logging::{engine_info, engine_warn};

use crate::id::{artifact_filename, generate_id, DOWNLOAD_ID_LENGTH};
use crate::{AtomicFileWriter, ImageApi, WorkflowError};

/// Fetches the result through the proxy, falling back to one direct fetch,
/// and saves it as `{prefix}XXXXXXXX.jpg` under the writer's directory.
pub async fn download_artifact(
    api: &dyn ImageApi,
    result_url: &str,
    writer: &AtomicFileWriter,
    prefix: &str,
) -> Result<PathBuf, WorkflowError> {
    let bytes = match api.fetch_via_proxy(result_url).await {
        Ok(bytes) => bytes,
        Err(proxy_err) => {
            engine_warn!("Proxy download failed, trying direct: {}", proxy_err);
            api.fetch_direct(result_url)
                .await
                .map_err(|direct_err| WorkflowError::Download {
                    proxy: proxy_err.to_string(),
                    direct: direct_err.to_string(),
                })?
        }
    };

    let filename = artifact_filename(prefix, &generate_id(DOWNLOAD_ID_LENGTH));
    let path = writer.write(&filename, &bytes)?;
    engine_info!("Saved {} bytes to {:?}", bytes.len(), path);
    Ok(path)
}
