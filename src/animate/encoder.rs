//! Media encoder: raw video bytes to a transport-safe base64 payload.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};

/// The source file could not be read to completion.
#[derive(Debug, thiserror::Error)]
#[error("Unable to read source file '{}': {source}", .path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Read a file fully and return the base64 encoding of its bytes.
///
/// Either the whole payload is returned or an error; partial reads are never
/// encoded.
pub async fn encode_file(path: &Path) -> Result<String, ReadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(encode_bytes(&bytes))
}

/// Base64-encode an in-memory buffer (standard alphabet, padded).
pub fn encode_bytes(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Remove a `data:<mime>;base64,` prefix, if present.
pub fn strip_data_uri_prefix(payload: &str) -> &str {
    match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(payload),
        None => payload,
    }
}
