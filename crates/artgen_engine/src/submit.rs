use engine_logging::engine_info;
use tokio_util::sync::CancellationToken;

use crate::types::cancellable;
use crate::{ImageApi, WorkflowError};

/// Submits one transformation job for `image_url` and returns its id. No retry.
pub async fn submit_job(
    api: &dyn ImageApi,
    image_url: &str,
    cancel: &CancellationToken,
) -> Result<String, WorkflowError> {
    let job_id = cancellable(cancel, api.submit_job(image_url)).await?;
    engine_info!("Submitted job {} for {}", job_id, image_url);
    Ok(job_id)
}
