//! Remote blob store access.
//!
//! The catalog is persisted as whole JSON files in a versioned blob store. A file
//! is read together with its revision token, and any update must present the
//! token it was derived from.

mod collection;
mod github;
mod local;

pub use collection::*;
pub use github::GitHubStore;
pub use local::LocalDirStore;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// A versioned file as served by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Base64-encoded file bytes. May contain line breaks.
    pub content: String,
    /// Opaque revision token required to overwrite this file.
    pub revision: String,
}

impl RemoteFile {
    /// Decode the transported content into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, StoreError> {
        decode_content(&self.content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("revision conflict on {0}")]
    Conflict(String),
    #[error("remote store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// Generic "get file / put file" access to a single repository.
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get_file(&self, path: &str) -> Result<RemoteFile, StoreError>;

    /// Create or overwrite `path`. `revision` must be the token of the current
    /// file, or `None` when creating it. Returns the new revision token.
    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        revision: Option<&str>,
    ) -> Result<String, StoreError>;
}

pub(crate) fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn decode_content(content: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tolerates_line_breaks() {
        let encoded = encode_content(br#"[{"title":"x"}]"#);
        let (head, tail) = encoded.split_at(8);
        let wrapped = format!("{}\n{}\n", head, tail);

        let file = RemoteFile {
            content: wrapped,
            revision: "r1".to_string(),
        };
        assert_eq!(file.decode().unwrap(), br#"[{"title":"x"}]"#.to_vec());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_content("%%%not base64%%%"),
            Err(StoreError::Decode(_))
        ));
    }
}
