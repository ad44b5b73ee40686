//! GenerationClient - submits style-transfer jobs to the Veo API and collects the result.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{StatusCode, Url};

use super::api_key::ApiKey;
use super::encoder;
use super::error::{AuthFailure, GenerationError};
use super::job::{
    CreateJobRequest, ErrorEnvelope, GenerationJob, InlineMedia, Instance, JobPhase, Operation,
    OutputConfig, RemoteStatus,
};
use super::progress::{Progress, ProgressSink};
use super::prompt::build_prompt;
use super::result::ResultAsset;
use super::source::SourceAsset;
use super::style::Style;

/// Environment variable holding the API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback environment variable for the API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Default base URL for the Generative Language API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for video generation.
pub const DEFAULT_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Delay between status checks (10 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Status checks before giving up (15 minutes at the default interval).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 90;

/// Per-request timeout. Uploads carry the whole encoded video.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Largest generated video accepted from the result locator.
pub const DEFAULT_MAX_RESULT_BYTES: u64 = 512 * 1024 * 1024;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Settings for a [`GenerationClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub model: String,
    pub poll_interval: Duration,
    /// `None` polls until the service reports completion.
    pub max_poll_attempts: Option<u32>,
    pub request_timeout: Duration,
    pub max_result_bytes: u64,
    pub output: OutputConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: GEMINI_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            output: OutputConfig::default(),
        }
    }
}

/// A non-success HTTP response from the API.
#[derive(Debug)]
struct RemoteFailure {
    http_status: StatusCode,
    status: Option<RemoteStatus>,
    body: String,
}

impl RemoteFailure {
    async fn read(response: reqwest::Response) -> Self {
        let http_status = response.status();
        let body = response.text().await.unwrap_or_default();
        let status = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .map(|e| e.error);
        Self {
            http_status,
            status,
            body,
        }
    }

    /// The key was refused outright.
    fn is_auth_rejection(&self) -> bool {
        if matches!(
            self.http_status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return true;
        }
        self.status.as_ref().is_some_and(|s| {
            s.has_status("UNAUTHENTICATED")
                || s.has_status("PERMISSION_DENIED")
                || s.has_reason("API_KEY_INVALID")
        })
    }

    /// The service does not recognize the requested entity.
    fn is_not_found(&self) -> bool {
        self.http_status == StatusCode::NOT_FOUND
            || self
                .status
                .as_ref()
                .is_some_and(|s| s.has_status("NOT_FOUND"))
    }

    fn message(&self) -> String {
        match &self.status {
            Some(s) if !s.message.is_empty() => s.message.clone(),
            _ if !self.body.trim().is_empty() => self.body.trim().to_string(),
            _ => "Unknown error".to_string(),
        }
    }
}

/// Client for the long-running video generation API.
///
/// Holds no state between submissions; one client can serve many.
pub struct GenerationClient {
    api_key: ApiKey,
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl GenerationClient {
    /// Create a client with an explicit key and settings.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Auth(AuthFailure::Missing)` for an empty key.
    pub fn new(api_key: ApiKey, config: ClientConfig) -> Result<Self, GenerationError> {
        if api_key.is_empty() {
            return Err(GenerationError::Auth(AuthFailure::Missing));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            config,
            http_client,
        })
    }

    /// Create a client with default settings.
    pub fn with_api_key(api_key: impl Into<ApiKey>) -> Result<Self, GenerationError> {
        Self::new(api_key.into(), ClientConfig::default())
    }

    /// Create a client against a custom base URL, e.g. a mock server.
    pub fn with_base_url(
        api_key: impl Into<ApiKey>,
        base_url: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        Self::new(
            api_key.into(),
            ClientConfig {
                base_url: base_url.into(),
                ..ClientConfig::default()
            },
        )
    }

    /// Create a client by reading the key from `GEMINI_API_KEY` or `API_KEY`.
    pub fn from_env() -> Result<Self, GenerationError> {
        let key = std::env::var(GEMINI_API_KEY_ENV)
            .or_else(|_| std::env::var(API_KEY_ENV))
            .map_err(|_| GenerationError::Auth(AuthFailure::Missing))?;
        Self::with_api_key(key)
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Stylize a source video and download the generated result.
    ///
    /// 1. Encodes the source and builds the prompt
    /// 2. Creates the remote job
    /// 3. Polls every `poll_interval` until the job is done
    /// 4. Downloads the result
    ///
    /// `progress` is told about each step. Nothing is retried: any failure
    /// ends the submission and the caller starts over.
    ///
    /// # Errors
    ///
    /// - `Read` if the source cannot be read
    /// - `Auth` if the key is rejected or the job is no longer recognized
    /// - `Submit`/`Http` if the job cannot be created
    /// - `Poll` if a status check fails
    /// - `Timeout` if `max_poll_attempts` is exhausted
    /// - `JobFailed`, `ContentFiltered` or `MissingResult` if the job ends without a video
    /// - `Download` if the result cannot be fetched
    pub async fn submit(
        &self,
        asset: &SourceAsset,
        style: Style,
        progress: &mut impl ProgressSink,
    ) -> Result<ResultAsset, GenerationError> {
        let mut phase = JobPhase::Idle;
        let result = self.run(asset, style, progress, &mut phase).await;
        let terminal = if result.is_ok() {
            JobPhase::Succeeded
        } else {
            JobPhase::Failed
        };
        transition(&mut phase, terminal);
        if let Err(e) = &result {
            log::error!("Video generation failed: {}", e);
        }
        result
    }

    async fn run(
        &self,
        asset: &SourceAsset,
        style: Style,
        progress: &mut impl ProgressSink,
        phase: &mut JobPhase,
    ) -> Result<ResultAsset, GenerationError> {
        let payload = encoder::encode_file(asset.path()).await?;
        let prompt = build_prompt(style);

        transition(phase, JobPhase::Submitting);
        progress.report(&Progress::Started);
        log::info!(
            "Submitting {} ({} bytes) with style '{}' to {}",
            asset.path().display(),
            asset.size(),
            style.label(),
            self.config.model
        );
        let mut job = self
            .create_job(&prompt, &payload, asset.mime_type())
            .await?;
        drop(payload);
        log::info!("Generation submitted, job: {}", job.handle());

        transition(phase, JobPhase::Polling);
        progress.report(&Progress::Processing);

        let mut attempt = 0u32;
        while !job.is_done() {
            if let Some(max) = self.config.max_poll_attempts {
                if attempt >= max {
                    log::error!("Generation still running after {} status checks", attempt);
                    return Err(GenerationError::Timeout { attempts: attempt });
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
            let operation = self.poll_job(job.handle()).await?;
            attempt += 1;
            job.apply(operation);
            log::debug!("Status check {}: done={}", attempt, job.is_done());
            progress.report(&Progress::StillProcessing { attempt });
        }

        let uri = job.into_result_uri()?;
        progress.report(&Progress::FetchingResult);
        log::info!("Generation complete, downloading result");

        self.download_result(&uri).await
    }

    /// Send the creation request and return the new job.
    ///
    /// `payload_base64` may also be a `data:` URI; its prefix is stripped.
    pub async fn create_job(
        &self,
        prompt: &str,
        payload_base64: &str,
        mime_type: &str,
    ) -> Result<GenerationJob, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url(),
            self.config.model
        );

        let request_body = CreateJobRequest {
            instances: vec![Instance {
                prompt,
                image: InlineMedia {
                    bytes_base64_encoded: encoder::strip_data_uri_prefix(payload_base64),
                    mime_type,
                },
            }],
            parameters: &self.config.output,
        };

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let failure = RemoteFailure::read(response).await;
            if failure.is_auth_rejection() {
                log::warn!("Creation request rejected the API key: {}", failure.message());
                return Err(GenerationError::Auth(AuthFailure::Rejected));
            }
            return Err(GenerationError::Submit {
                status: failure.http_status.as_u16(),
                message: failure.message(),
            });
        }

        let operation: Operation = response.json().await?;
        if operation.name.trim().is_empty() {
            return Err(GenerationError::Submit {
                status: StatusCode::OK.as_u16(),
                message: "response did not include an operation name".to_string(),
            });
        }

        Ok(GenerationJob::from_operation(operation))
    }

    /// Fetch the current state of a job.
    ///
    /// A job the service no longer recognizes, or a rejected key, maps to
    /// `Auth`; every other failure maps to `Poll`.
    pub async fn poll_job(&self, handle: &str) -> Result<Operation, GenerationError> {
        let url = format!("{}/v1beta/{}", self.base_url(), handle);

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .send()
            .await
            .map_err(|e| {
                log::warn!("Status check request failed: {}", e);
                GenerationError::Poll(e.to_string())
            })?;

        if !response.status().is_success() {
            let failure = RemoteFailure::read(response).await;
            if failure.is_not_found() || failure.is_auth_rejection() {
                log::warn!("Status check no longer authorized: {}", failure.message());
                return Err(GenerationError::Auth(AuthFailure::Rejected));
            }
            return Err(GenerationError::Poll(format!(
                "status {}: {}",
                failure.http_status,
                failure.message()
            )));
        }

        response
            .json::<Operation>()
            .await
            .map_err(|e| GenerationError::Poll(format!("invalid status response: {}", e)))
    }

    /// Result locator with the API key appended as a query parameter.
    pub fn download_url(&self, uri: &str) -> Result<Url, GenerationError> {
        let mut url = Url::parse(uri).map_err(|e| GenerationError::Download {
            status: format!("invalid result URI '{}': {}", uri, e),
        })?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose());
        Ok(url)
    }

    /// Download the generated video into memory.
    ///
    /// A non-success status discards the body. Results larger than
    /// `max_result_bytes`, declared or streamed, are refused.
    pub async fn download_result(&self, uri: &str) -> Result<ResultAsset, GenerationError> {
        let url = self.download_url(uri)?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| GenerationError::Download {
                status: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            log::warn!("Result download failed with status {}", status);
            return Err(GenerationError::Download {
                status: status.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let limit = self.config.max_result_bytes;
        let too_large = || GenerationError::Download {
            status: format!("result exceeds the {} byte limit", limit),
        };

        let declared = response.content_length();
        if declared.is_some_and(|len| len > limit) {
            log::warn!("Result declares {:?} bytes, over the limit", declared);
            return Err(too_large());
        }

        let mut bytes = Vec::with_capacity(declared.unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| GenerationError::Download {
                status: format!("transfer interrupted: {}", e),
            })?;
            if (bytes.len() + chunk.len()) as u64 > limit {
                log::warn!("Result stream passed {} bytes", limit);
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        log::info!("Downloaded {} bytes", bytes.len());
        Ok(ResultAsset::new(bytes, content_type))
    }
}

fn transition(phase: &mut JobPhase, next: JobPhase) {
    log::debug!("Generation phase: {} -> {}", phase, next);
    *phase = next;
}
