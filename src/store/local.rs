use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use super::{encode_content, BlobStore, RemoteFile, StoreError};

/// Blob store over a local directory, with the SHA-256 of the bytes as revision.
pub struct LocalDirStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalDirStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Mutex::new(()),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.is_empty() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn read_current(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.resolve(path)?).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn revision_of(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[async_trait]
impl BlobStore for LocalDirStore {
    fn backend_tag(&self) -> &'static str {
        "localdir"
    }

    async fn get_file(&self, path: &str) -> Result<RemoteFile, StoreError> {
        let bytes = self
            .read_current(path)
            .await?
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        Ok(RemoteFile {
            content: encode_content(&bytes),
            revision: revision_of(&bytes),
        })
    }

    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        revision: Option<&str>,
    ) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;

        let current = self.read_current(path).await?.map(|b| revision_of(&b));
        if current.as_deref() != revision {
            return Err(StoreError::Conflict(path.to_string()));
        }

        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, content).await?;

        tracing::debug!(path, message, "wrote local blob");
        Ok(revision_of(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_then_update_with_revision() {
        let dir = TempDir::new().unwrap();
        let store = LocalDirStore::new(dir.path().to_path_buf());

        assert!(matches!(
            store.get_file("database.json").await,
            Err(StoreError::NotFound(_))
        ));

        let rev1 = store
            .put_file("database.json", b"[]", "create", None)
            .await
            .unwrap();
        let file = store.get_file("database.json").await.unwrap();
        assert_eq!(file.revision, rev1);
        assert_eq!(file.decode().unwrap(), b"[]".to_vec());

        let rev2 = store
            .put_file("database.json", b"[1]", "update", Some(&rev1))
            .await
            .unwrap();
        assert_ne!(rev1, rev2);
    }

    #[tokio::test]
    async fn test_stale_or_missing_revision_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = LocalDirStore::new(dir.path().to_path_buf());
        let rev1 = store.put_file("a.json", b"[]", "m", None).await.unwrap();
        store
            .put_file("a.json", b"[2]", "m", Some(&rev1))
            .await
            .unwrap();

        let stale = store.put_file("a.json", b"[3]", "m", Some(&rev1)).await;
        assert!(matches!(stale, Err(StoreError::Conflict(_))));

        let blind = store.put_file("a.json", b"[3]", "m", None).await;
        assert!(matches!(blind, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_root() {
        let dir = TempDir::new().unwrap();
        let store = LocalDirStore::new(dir.path().join("inner"));
        let result = store.put_file("../outside.json", b"[]", "m", None).await;
        assert!(result.is_err());
        assert!(!dir.path().join("outside.json").exists());
    }
}
