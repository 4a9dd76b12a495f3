use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::{JobStatusReport, SubmitRequest, SubmitResponse, WorkflowError};

const ACCEPT_JSON: &str = "application/json, text/plain, */*";

/// Fixed effect configuration sent with every submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectConfig {
    pub model: String,
    pub tool_type: String,
    pub effect_id: String,
    pub remove_watermark: bool,
    pub is_private: bool,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            model: "image-effects".to_string(),
            tool_type: "image-effects".to_string(),
            effect_id: "photoToVectorArt".to_string(),
            remove_watermark: true,
            is_private: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_polls: 60,
        }
    }
}

impl PollSettings {
    /// Upper bound on time spent sleeping between status checks.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_polls
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub api_base: String,
    pub content_base: String,
    pub user_id: String,
    pub effect: EffectConfig,
    pub poll: PollSettings,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
    pub artifact_prefix: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.chromastudio.ai".to_string(),
            content_base: "https://contents.maxstudio.ai".to_string(),
            user_id: "DObRu1vyStbUynoQmTcHBlhs55z2".to_string(),
            effect: EffectConfig::default(),
            poll: PollSettings::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_download_bytes: 50 * 1024 * 1024,
            artifact_prefix: "vector_art_".to_string(),
        }
    }
}

/// The remote image-transformation service, one method per endpoint.
#[async_trait::async_trait]
pub trait ImageApi: Send + Sync {
    /// Signed, time-limited destination for `file_name`.
    async fn request_upload_url(&self, file_name: &str) -> Result<String, WorkflowError>;

    async fn put_object(
        &self,
        signed_url: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), WorkflowError>;

    /// Public URL an uploaded object is served from.
    fn public_url(&self, file_name: &str) -> String;

    /// Returns the job id.
    async fn submit_job(&self, image_url: &str) -> Result<String, WorkflowError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, WorkflowError>;

    async fn fetch_via_proxy(&self, url: &str) -> Result<Bytes, WorkflowError>;

    async fn fetch_direct(&self, url: &str) -> Result<Bytes, WorkflowError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    api_base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, WorkflowError> {
        let api_base = Url::parse(&settings.api_base)
            .map_err(|err| WorkflowError::InvalidUrl(format!("{}: {err}", settings.api_base)))?;
        if api_base.cannot_be_a_base() {
            return Err(WorkflowError::InvalidUrl(settings.api_base.clone()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| WorkflowError::Client(err.to_string()))?;

        Ok(Self {
            settings,
            api_base,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // `new` rejected cannot-be-a-base URLs, so path segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read_capped(&self, response: reqwest::Response) -> Result<Bytes, WorkflowError> {
        let max_bytes = self.settings.max_download_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(WorkflowError::TooLarge { max_bytes });
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| WorkflowError::Fetch(describe(&err)))?;
            if body.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(WorkflowError::TooLarge { max_bytes });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(body))
    }

    async fn fetch_bytes(&self, url: Url) -> Result<Bytes, WorkflowError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| WorkflowError::Fetch(describe(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::Fetch(status.to_string()));
        }
        self.read_capped(response).await
    }
}

#[async_trait::async_trait]
impl ImageApi for ReqwestApi {
    async fn request_upload_url(&self, file_name: &str) -> Result<String, WorkflowError> {
        let mut url = self.endpoint(&["get-emd-upload-url"]);
        url.query_pairs_mut().append_pair("fileName", file_name);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| WorkflowError::UploadUrl(describe(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::UploadUrl(status.to_string()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| WorkflowError::UploadUrl(describe(&err)))?;
        let signed_url = String::from_utf8_lossy(&body).trim().to_string();
        if signed_url.is_empty() {
            return Err(WorkflowError::UploadUrl("empty signed URL".to_string()));
        }
        Ok(signed_url)
    }

    async fn put_object(
        &self,
        signed_url: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), WorkflowError> {
        let url = Url::parse(signed_url)
            .map_err(|err| WorkflowError::Transfer(format!("invalid signed URL: {err}")))?;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|err| WorkflowError::Transfer(describe(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::Transfer(status.to_string()));
        }
        Ok(())
    }

    fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.settings.content_base.trim_end_matches('/'),
            file_name
        )
    }

    async fn submit_job(&self, image_url: &str) -> Result<String, WorkflowError> {
        let effect = &self.settings.effect;
        let request = SubmitRequest {
            model: effect.model.clone(),
            tool_type: effect.tool_type.clone(),
            effect_id: effect.effect_id.clone(),
            image_url: image_url.to_string(),
            user_id: self.settings.user_id.clone(),
            remove_watermark: effect.remove_watermark,
            is_private: effect.is_private,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|err| WorkflowError::Submission(err.to_string()))?;

        let response = self
            .client
            .post(self.endpoint(&["image-gen"]))
            .header(ACCEPT, ACCEPT_JSON)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|err| WorkflowError::Submission(describe(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::Submission(status.to_string()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| WorkflowError::Submission(describe(&err)))?;
        let parsed: SubmitResponse = serde_json::from_slice(&body)
            .map_err(|err| WorkflowError::InvalidResponse(err.to_string()))?;
        parsed
            .job_id()
            .ok_or_else(|| WorkflowError::InvalidResponse("missing jobId".to_string()))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, WorkflowError> {
        let url = self.endpoint(&["image-gen", &self.settings.user_id, job_id, "status"]);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(|err| WorkflowError::StatusQuery(describe(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::StatusQuery(status.to_string()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| WorkflowError::StatusQuery(describe(&err)))?;
        let value = serde_json::from_slice(&body)
            .map_err(|err| WorkflowError::InvalidResponse(err.to_string()))?;
        Ok(JobStatusReport::from_body(value))
    }

    async fn fetch_via_proxy(&self, url: &str) -> Result<Bytes, WorkflowError> {
        let mut proxy = self.endpoint(&["download-proxy"]);
        proxy.query_pairs_mut().append_pair("url", url);
        self.fetch_bytes(proxy).await
    }

    async fn fetch_direct(&self, url: &str) -> Result<Bytes, WorkflowError> {
        let mut direct =
            Url::parse(url).map_err(|err| WorkflowError::InvalidUrl(format!("{url}: {err}")))?;
        let cache_buster = chrono::Utc::now().timestamp_millis().to_string();
        direct.query_pairs_mut().append_pair("t", &cache_buster);
        self.fetch_bytes(direct).await
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
