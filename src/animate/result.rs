//! ResultAsset - the downloaded generated video.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

/// Locally held bytes of a finished generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultAsset {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl ResultAsset {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Content type reported by the download response, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Hex-encoded SHA-256 of the video bytes.
    pub fn sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }

    /// Write the video to `dest`, creating parent directories as needed.
    pub async fn save(&self, dest: &Path) -> Result<PathBuf, std::io::Error> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::File::create(dest).await?;
        file.write_all(&self.bytes).await?;
        file.flush().await?;

        log::info!("Saved {} bytes to {}", self.bytes.len(), dest.display());
        Ok(dest.to_path_buf())
    }
}
