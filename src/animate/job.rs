//! Wire types for the long-running generation API and the job they describe.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::GenerationError;

/// Output settings sent with every creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub sample_count: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_count: 1,
            resolution: "720p".to_string(),
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Request body for `models/{model}:predictLongRunning`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateJobRequest<'a> {
    pub instances: Vec<Instance<'a>>,
    pub parameters: &'a OutputConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Instance<'a> {
    pub prompt: &'a str,
    pub image: InlineMedia<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineMedia<'a> {
    pub bytes_base64_encoded: &'a str,
    pub mime_type: &'a str,
}

/// A long-running operation as returned by the create and poll calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    #[serde(default)]
    pub error: Option<RemoteStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
    #[serde(default)]
    pub rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

/// Structured error status used by the API, both in failed operations and
/// in non-success HTTP bodies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteStatus {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}

/// `{"error": {...}}` wrapper of an HTTP error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: RemoteStatus,
}

impl RemoteStatus {
    pub fn has_status(&self, status: &str) -> bool {
        self.status.as_deref() == Some(status)
    }

    pub fn has_reason(&self, reason: &str) -> bool {
        self.details
            .iter()
            .any(|d| d.reason.as_deref() == Some(reason))
    }
}

/// Lifecycle of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Submitting,
    Polling,
    Succeeded,
    Failed,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Succeeded | JobPhase::Failed)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobPhase::Idle => "idle",
            JobPhase::Submitting => "submitting",
            JobPhase::Polling => "polling",
            JobPhase::Succeeded => "succeeded",
            JobPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One in-flight remote generation.
///
/// Created from the creation response and updated only from poll responses.
#[derive(Debug, Clone, Default)]
pub struct GenerationJob {
    handle: String,
    done: bool,
    result_uri: Option<String>,
    failure: Option<RemoteStatus>,
    filtered_reasons: Vec<String>,
}

impl GenerationJob {
    pub fn from_operation(operation: Operation) -> Self {
        let mut job = Self {
            handle: operation.name.clone(),
            ..Self::default()
        };
        job.apply(operation);
        job
    }

    /// Fold a poll response into the job. The handle never changes.
    pub fn apply(&mut self, operation: Operation) {
        self.done = operation.done;
        self.failure = operation.error;

        let video_response = operation
            .response
            .and_then(|r| r.generate_video_response)
            .unwrap_or_default();
        self.result_uri = video_response
            .generated_samples
            .into_iter()
            .find_map(|s| s.video.and_then(|v| v.uri))
            .filter(|uri| !uri.trim().is_empty());
        self.filtered_reasons = video_response.rai_media_filtered_reasons;
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn result_uri(&self) -> Option<&str> {
        self.result_uri.as_deref()
    }

    pub fn failure(&self) -> Option<&RemoteStatus> {
        self.failure.as_ref()
    }

    /// Resolve a finished job into its result locator.
    pub fn into_result_uri(self) -> Result<String, GenerationError> {
        if let Some(failure) = self.failure {
            return Err(GenerationError::JobFailed {
                code: failure.code,
                message: failure.message,
            });
        }
        match self.result_uri {
            Some(uri) => Ok(uri),
            None if !self.filtered_reasons.is_empty() => Err(GenerationError::ContentFiltered {
                reasons: self.filtered_reasons,
            }),
            None => Err(GenerationError::MissingResult),
        }
    }
}
