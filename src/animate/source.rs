//! Source asset validation: size, declared type, and probed duration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Largest accepted upload (100 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Longest accepted clip as advertised to the user.
pub const DEFAULT_MAX_DURATION_SECS: f64 = 15.0;

/// Slack added to the duration limit; probed durations run slightly long.
pub const DURATION_TOLERANCE_SECS: f64 = 1.0;

const MIB: u64 = 1024 * 1024;

/// Errors raised while accepting a source video.
#[derive(Debug)]
pub enum SourceError {
    TooLarge { size: u64, limit: u64 },
    TooLong { duration_secs: f64, limit_secs: f64 },
    UnsupportedType(String),
    Probe(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::TooLarge { limit, .. } => write!(
                f,
                "File is too large. Please upload a video under {}MB.",
                format_mib(*limit)
            ),
            SourceError::TooLong { limit_secs, .. } => write!(
                f,
                "Video is longer than {} seconds. Please upload a shorter video.",
                limit_secs
            ),
            SourceError::UnsupportedType(mime) => write!(
                f,
                "Unsupported file type '{}'. Please upload an MP4 or MOV video.",
                mime
            ),
            SourceError::Probe(reason) => {
                write!(f, "Failed to probe video duration: {}", reason)
            }
            SourceError::Io { path, source } => {
                write!(f, "Cannot access '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Whole MiB print without decimals, anything else with one.
fn format_mib(bytes: u64) -> String {
    if bytes % MIB == 0 {
        (bytes / MIB).to_string()
    } else {
        format!("{:.1}", bytes as f64 / MIB as f64)
    }
}

/// Acceptance limits for source videos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceLimits {
    pub max_file_bytes: u64,
    /// Advertised limit; [`DURATION_TOLERANCE_SECS`] is allowed on top.
    pub max_duration_secs: f64,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
        }
    }
}

/// Reads the playback duration of a video file.
pub trait DurationProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64, SourceError>;
}

impl<F> DurationProbe for F
where
    F: Fn(&Path) -> Result<f64, SourceError>,
{
    fn probe_duration(&self, path: &Path) -> Result<f64, SourceError> {
        self(path)
    }
}

/// Duration probe backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: String,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }
}

impl FfprobeProbe {
    /// Use a specific ffprobe executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the ffprobe arguments that print only the container duration.
    pub fn args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.display().to_string(),
        ]
    }
}

impl DurationProbe for FfprobeProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64, SourceError> {
        let output = Command::new(&self.program)
            .args(Self::args(path))
            .output()
            .map_err(|e| SourceError::Probe(format!("could not run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Probe(stderr.trim().to_string()));
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse ffprobe's duration output (seconds as a decimal string).
pub fn parse_duration(output: &str) -> Result<f64, SourceError> {
    let trimmed = output.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| SourceError::Probe(format!("unexpected duration output '{}'", trimmed)))
}

/// A user-supplied video that passed the size and duration checks.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAsset {
    path: PathBuf,
    size: u64,
    mime_type: String,
    duration_secs: f64,
}

impl SourceAsset {
    /// Validate a video file and accept it as a source asset.
    ///
    /// The size limit is checked from file metadata first, so oversized
    /// files are rejected without being probed or read.
    pub fn open(
        path: &Path,
        probe: &impl DurationProbe,
        limits: SourceLimits,
    ) -> Result<Self, SourceError> {
        let metadata = std::fs::metadata(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let size = metadata.len();
        if size > limits.max_file_bytes {
            return Err(SourceError::TooLarge {
                size,
                limit: limits.max_file_bytes,
            });
        }

        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        if !mime_type.starts_with("video/") {
            return Err(SourceError::UnsupportedType(mime_type));
        }

        let duration_secs = probe.probe_duration(path)?;
        // Written so NaN is rejected too
        if !(duration_secs <= limits.max_duration_secs + DURATION_TOLERANCE_SECS) {
            return Err(SourceError::TooLong {
                duration_secs,
                limit_secs: limits.max_duration_secs,
            });
        }

        log::info!(
            "Accepted source {} ({} bytes, {}, {:.1}s)",
            path.display(),
            size,
            mime_type,
            duration_secs
        );

        Ok(Self {
            path: path.to_path_buf(),
            size,
            mime_type,
            duration_secs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Declared MIME type, guessed from the file extension.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse_video(dir: &tempfile::TempDir, name: &str, len: u64) -> PathBuf {
        let path = dir.path().join(name);
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(len).unwrap();
        path
    }

    fn fixed(secs: f64) -> impl Fn(&Path) -> Result<f64, SourceError> {
        move |_: &Path| Ok(secs)
    }

    #[test]
    fn test_accepts_file_at_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = sparse_video(&dir, "clip.mp4", DEFAULT_MAX_FILE_BYTES);

        let asset = SourceAsset::open(&path, &fixed(10.0), SourceLimits::default()).unwrap();
        assert_eq!(asset.size(), DEFAULT_MAX_FILE_BYTES);
        assert_eq!(asset.mime_type(), "video/mp4");
        assert_eq!(asset.duration_secs(), 10.0);
    }

    #[test]
    fn test_rejects_file_one_byte_over_limit_without_probing() {
        let dir = tempfile::tempdir().unwrap();
        let path = sparse_video(&dir, "clip.mp4", DEFAULT_MAX_FILE_BYTES + 1);
        let probe = |_: &Path| -> Result<f64, SourceError> { panic!("probe must not run") };

        let err = SourceAsset::open(&path, &probe, SourceLimits::default()).unwrap_err();
        assert!(matches!(err, SourceError::TooLarge { size, .. } if size == DEFAULT_MAX_FILE_BYTES + 1));
        assert_eq!(
            err.to_string(),
            "File is too large. Please upload a video under 100MB."
        );
    }

    #[test]
    fn test_duration_boundary_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = sparse_video(&dir, "clip.mov", 1024);

        let asset = SourceAsset::open(&path, &fixed(16.0), SourceLimits::default()).unwrap();
        assert_eq!(asset.mime_type(), "video/quicktime");

        let err = SourceAsset::open(&path, &fixed(16.5), SourceLimits::default()).unwrap_err();
        assert!(matches!(err, SourceError::TooLong { .. }));
        assert_eq!(
            err.to_string(),
            "Video is longer than 15 seconds. Please upload a shorter video."
        );
    }

    #[test]
    fn test_messages_follow_configured_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = sparse_video(&dir, "clip.mp4", 3 * MIB);
        let limits = SourceLimits {
            max_file_bytes: 2 * MIB + MIB / 2,
            max_duration_secs: 8.5,
        };

        let err = SourceAsset::open(&path, &fixed(1.0), limits).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File is too large. Please upload a video under 2.5MB."
        );

        let small = sparse_video(&dir, "small.mp4", 1024);
        let err = SourceAsset::open(&small, &fixed(9.6), limits).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Video is longer than 8.5 seconds. Please upload a shorter video."
        );
        assert!(SourceAsset::open(&small, &fixed(9.5), limits).is_ok());
    }

    #[test]
    fn test_rejects_nan_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = sparse_video(&dir, "clip.mp4", 1024);

        let err = SourceAsset::open(&path, &fixed(f64::NAN), SourceLimits::default()).unwrap_err();
        assert!(matches!(err, SourceError::TooLong { .. }));
    }

    #[test]
    fn test_rejects_non_video_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = sparse_video(&dir, "notes.txt", 10);

        let err = SourceAsset::open(&path, &fixed(1.0), SourceLimits::default()).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedType(ref m) if m == "text/plain"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp4");

        let err = SourceAsset::open(&path, &fixed(1.0), SourceLimits::default()).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10.005000\n").unwrap(), 10.005);
        assert!(parse_duration("N/A").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-1").is_err());
    }

    #[test]
    fn test_ffprobe_args_end_with_path() {
        let args = FfprobeProbe::args(Path::new("/tmp/in.mp4"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/in.mp4"));
        assert!(args.contains(&"format=duration".to_string()));
    }

    #[test]
    fn test_ffprobe_missing_binary_is_probe_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = sparse_video(&dir, "clip.mp4", 10);
        let probe = FfprobeProbe::with_program("definitely-not-ffprobe-binary");

        let err = probe.probe_duration(&path).unwrap_err();
        assert!(matches!(err, SourceError::Probe(_)));
    }
}
