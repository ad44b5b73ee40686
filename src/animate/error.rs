//! Error taxonomy for generation requests.

use std::fmt;

use super::encoder::ReadError;

/// Why the credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No API key was supplied.
    Missing,
    /// The service rejected the key, or no longer recognizes the job it issued.
    Rejected,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::Missing => f.write_str("API key not found. Please select an API key."),
            AuthFailure::Rejected => {
                f.write_str("API key may be invalid. Please try selecting it again.")
            }
        }
    }
}

/// Coarse classification of a [`GenerationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Read,
    Auth,
    Submit,
    Poll,
    JobFailed,
    ContentFiltered,
    MissingResult,
    Download,
    Timeout,
    Http,
}

/// Errors that can occur while generating a stylized video.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("{0}")]
    Auth(AuthFailure),

    #[error("Failed to start video generation (status {status}): {message}")]
    Submit { status: u16, message: String },

    #[error("Failed to get video generation status: {0}")]
    Poll(String),

    #[error("Video generation failed: {message}")]
    JobFailed { code: Option<i64>, message: String },

    #[error("Generated video was blocked by safety filters: {}", .reasons.join("; "))]
    ContentFiltered { reasons: Vec<String> },

    #[error("Generated video URI not found in the response.")]
    MissingResult,

    #[error("Failed to download the generated video. Status: {status}")]
    Download { status: String },

    #[error("Video generation did not finish after {attempts} status checks.")]
    Timeout { attempts: u32 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Read(_) => ErrorKind::Read,
            GenerationError::Auth(_) => ErrorKind::Auth,
            GenerationError::Submit { .. } => ErrorKind::Submit,
            GenerationError::Poll(_) => ErrorKind::Poll,
            GenerationError::JobFailed { .. } => ErrorKind::JobFailed,
            GenerationError::ContentFiltered { .. } => ErrorKind::ContentFiltered,
            GenerationError::MissingResult => ErrorKind::MissingResult,
            GenerationError::Download { .. } => ErrorKind::Download,
            GenerationError::Timeout { .. } => ErrorKind::Timeout,
            GenerationError::Http(_) => ErrorKind::Http,
        }
    }

    /// True when the caller should send the user back to credential selection.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_messages() {
        assert_eq!(
            GenerationError::Auth(AuthFailure::Missing).to_string(),
            "API key not found. Please select an API key."
        );
        assert_eq!(
            GenerationError::Auth(AuthFailure::Rejected).to_string(),
            "API key may be invalid. Please try selecting it again."
        );
    }

    #[test]
    fn test_only_auth_is_auth() {
        assert!(GenerationError::Auth(AuthFailure::Rejected).is_auth());
        assert!(!GenerationError::Poll("boom".to_string()).is_auth());
        assert!(!GenerationError::MissingResult.is_auth());
        assert!(!GenerationError::Timeout { attempts: 3 }.is_auth());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            GenerationError::Download {
                status: "403 Forbidden".to_string()
            }
            .to_string(),
            "Failed to download the generated video. Status: 403 Forbidden"
        );
        assert_eq!(
            GenerationError::ContentFiltered {
                reasons: vec!["a".to_string(), "b".to_string()]
            }
            .to_string(),
            "Generated video was blocked by safety filters: a; b"
        );
        assert_eq!(
            GenerationError::Timeout { attempts: 90 }.to_string(),
            "Video generation did not finish after 90 status checks."
        );
    }
}
