use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracker_core::{EpisodeSummary, JobHandle, JobKind, LaunchRequest};
use url::Url;

use crate::{ApiError, ApiFailureKind, LaunchReceipt};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API root, e.g. `http://localhost:5055/api`.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    /// Generous by default: some launch endpoints wait on slow model backends.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5055/api".to_string(),
            auth_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(600),
        }
    }
}

/// Reads the raw status payload of a job.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, handle: &JobHandle) -> Result<Value, ApiError>;
}

/// Submits a validated launch request.
#[async_trait::async_trait]
pub trait JobStarter: Send + Sync {
    async fn submit(&self, request: &LaunchRequest) -> Result<LaunchReceipt, ApiError>;
}

#[async_trait::async_trait]
pub trait EpisodeSource: Send + Sync {
    async fn list_episodes(&self) -> Result<Vec<EpisodeSummary>, ApiError>;
}

/// HTTP client for the job endpoints.
#[derive(Debug, Clone)]
pub struct JobApi {
    client: reqwest::Client,
    base: Url,
    auth_token: Option<String>,
}

impl JobApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::new(ApiFailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                ApiFailureKind::InvalidUrl,
                format!("{base} cannot be used as an api root"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiFailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            base,
            auth_token: settings.auth_token.filter(|token| !token.is_empty()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(ApiFailureKind::InvalidUrl, "api root cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn post_json(&self, url: Url, body: &Value) -> Result<Value, ApiError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(ApiFailureKind::Decode, err.to_string()))?;
        let response = self
            .authorize(self.client.post(url))
            .header(CONTENT_TYPE, "application/json")
            .body(bytes)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl StatusSource for JobApi {
    async fn fetch_status(&self, handle: &JobHandle) -> Result<Value, ApiError> {
        let url = self.endpoint(&status_segments(handle))?;
        self.get_json(url).await
    }
}

#[async_trait::async_trait]
impl JobStarter for JobApi {
    async fn submit(&self, request: &LaunchRequest) -> Result<LaunchReceipt, ApiError> {
        let url = self.endpoint(launch_segments(request.kind()))?;
        let body = request
            .body()
            .map_err(|err| ApiError::new(ApiFailureKind::Decode, err.to_string()))?;
        let response = self.post_json(url, &body).await?;
        parse_receipt(&response)
    }
}

#[async_trait::async_trait]
impl EpisodeSource for JobApi {
    async fn list_episodes(&self) -> Result<Vec<EpisodeSummary>, ApiError> {
        let url = self.endpoint(&["podcasts", "episodes"])?;
        let value = self.get_json(url).await?;
        serde_json::from_value(value)
            .map_err(|err| ApiError::new(ApiFailureKind::Decode, err.to_string()))
    }
}

fn launch_segments(kind: JobKind) -> &'static [&'static str] {
    match kind {
        JobKind::EmbeddingRebuild => &["embeddings", "rebuild"],
        JobKind::PodcastGeneration => &["podcasts", "generate"],
    }
}

fn status_segments(handle: &JobHandle) -> Vec<&str> {
    match handle.kind() {
        JobKind::EmbeddingRebuild => vec!["embeddings", "rebuild", handle.id(), "status"],
        JobKind::PodcastGeneration => vec!["podcasts", "jobs", handle.id()],
    }
}

/// Launch responses name the identifier `job_id` or, for commands, `command_id`.
fn parse_receipt(value: &Value) -> Result<LaunchReceipt, ApiError> {
    let job_id = ["job_id", "command_id"]
        .iter()
        .filter_map(|key| value.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|id| !id.is_empty())
        .ok_or_else(|| ApiError::new(ApiFailureKind::MissingJobId, value.to_string()))?;

    Ok(LaunchReceipt {
        job_id: job_id.to_owned(),
        message: value
            .get("message")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        estimated_items: ["estimated_items", "total_items"]
            .iter()
            .filter_map(|key| value.get(*key))
            .find_map(Value::as_u64),
    })
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::new(
            ApiFailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::new(ApiFailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiFailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(ApiFailureKind::Decode, err.to_string());
    }
    ApiError::new(ApiFailureKind::Network, err.to_string())
}
