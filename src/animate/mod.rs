//! Video stylization through the Veo generation API.
//!
//! A source clip is validated, base64-encoded and sent with a style prompt as
//! a long-running generation job. The job is polled until it finishes and the
//! generated video is downloaded into memory.

mod api_key;
mod client;
mod encoder;
mod error;
mod job;
mod progress;
mod prompt;
mod result;
mod source;
mod style;

pub use api_key::ApiKey;
pub use client::{
    ClientConfig, GenerationClient, API_KEY_ENV, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_MAX_RESULT_BYTES, DEFAULT_MODEL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT, GEMINI_API_BASE_URL, GEMINI_API_KEY_ENV,
};
pub use encoder::{encode_bytes, encode_file, strip_data_uri_prefix, ReadError};
pub use error::{AuthFailure, ErrorKind, GenerationError};
pub use job::{GenerationJob, JobPhase, Operation, OutputConfig, RemoteStatus};
pub use progress::{
    loading_message, NoProgress, Progress, ProgressSink, LOADING_MESSAGES,
    LOADING_MESSAGE_INTERVAL_SECS,
};
pub use prompt::build_prompt;
pub use result::ResultAsset;
pub use source::{
    parse_duration, DurationProbe, FfprobeProbe, SourceAsset, SourceError, SourceLimits,
    DEFAULT_MAX_DURATION_SECS, DEFAULT_MAX_FILE_BYTES, DURATION_TOLERANCE_SECS,
};
pub use style::{Style, StyleOption, STYLE_CATALOG};
