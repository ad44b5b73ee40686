//! Configuration file handling for toon-reel.
//!
//! Loads configuration from `~/.config/toon-reel/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::animate::{
    ClientConfig, Style, SourceLimits, DEFAULT_MAX_DURATION_SECS, DEFAULT_MAX_FILE_BYTES,
};

const MIB: u64 = 1024 * 1024;

/// Configuration file structure for toon-reel.
/// Loaded from ~/.config/toon-reel/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub output: OutputDirConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GenerationConfig {
    pub poll_interval_secs: Option<u64>,
    /// 0 polls until the job finishes.
    pub max_poll_attempts: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub style: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LimitsConfig {
    pub max_file_mib: Option<u64>,
    pub max_duration_secs: Option<f64>,
    pub max_result_mib: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputDirConfig {
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Client settings from the file, with built-in defaults for anything unset.
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::default();
        if let Some(base_url) = &self.api.base_url {
            client.base_url = base_url.clone();
        }
        if let Some(model) = &self.api.model {
            client.model = model.clone();
        }
        if let Some(secs) = self.generation.poll_interval_secs {
            client.poll_interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = self.generation.max_poll_attempts {
            client.max_poll_attempts = (attempts > 0).then_some(attempts);
        }
        if let Some(secs) = self.generation.request_timeout_secs {
            client.request_timeout = Duration::from_secs(secs);
        }
        if let Some(mib) = self.limits.max_result_mib {
            client.max_result_bytes = mib.saturating_mul(MIB);
        }
        client
    }

    pub fn source_limits(&self) -> SourceLimits {
        SourceLimits {
            max_file_bytes: self
                .limits
                .max_file_mib
                .map(|mib| mib.saturating_mul(MIB))
                .unwrap_or(DEFAULT_MAX_FILE_BYTES),
            max_duration_secs: self
                .limits
                .max_duration_secs
                .unwrap_or(DEFAULT_MAX_DURATION_SECS),
        }
    }

    /// The configured default style, if any.
    pub fn style(&self) -> Result<Option<Style>, ConfigError> {
        match &self.generation.style {
            None => Ok(None),
            Some(slug) => Style::from_slug(slug)
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "generation.style".to_string(),
                    value: slug.clone(),
                }),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        key: String,
        value: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value '{}' for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("toon-reel").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/toon-reel/config.toml")
        })
}

/// Contents written by `toon-reel config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# toon-reel configuration

[api]
# Gemini API key (default: $GEMINI_API_KEY or $API_KEY)
# api_key = "..."
# model = "veo-3.1-fast-generate-preview"
# base_url = "https://generativelanguage.googleapis.com"

[generation]
# Default style: classic-anime, pixar-3d, american-cartoon, graphic-novel
style = "classic-anime"
# Seconds between status checks
poll_interval_secs = 10
# Status checks before giving up (0 = wait forever)
max_poll_attempts = 90
# Per-request timeout in seconds
request_timeout_secs = 300

[limits]
# Largest accepted upload
max_file_mib = 100
# Longest accepted clip; one extra second is tolerated
max_duration_secs = 15.0
# Largest generated video to download
max_result_mib = 512

[output]
# Directory for generated videos (default: next to the input)
# dir = "~/Movies/toon-reel"
"#;
