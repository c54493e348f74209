//! File-backed key-value store
//!
//! Each key maps to one `<key>.json` file inside a data directory. Writes go
//! to a temporary sibling that is flushed to disk before being renamed into
//! place, so neither a reader nor a crash ever observes a half-written value.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::error::StoreError;
use super::KvStore;

/// Durable store rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                key: dir.display().to_string(),
                source,
            })?;

        tracing::debug!(dir = %dir.display(), "File store opened");

        Ok(Self { dir })
    }

    /// Data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Persist the directory entry created by a rename
    #[cfg(unix)]
    async fn sync_dir(&self) -> std::io::Result<()> {
        File::open(&self.dir).await?.sync_all().await
    }

    #[cfg(not(unix))]
    async fn sync_dir(&self) -> std::io::Result<()> {
        Ok(())
    }
}

impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        let mut file = File::create(&tmp).await.map_err(io_err)?;
        file.write_all(&value).await.map_err(io_err)?;
        // Data must be on disk before the rename makes it visible
        file.sync_all().await.map_err(io_err)?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        self.sync_dir().await.map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("leaderboard-rs-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_round_trip_and_missing() {
        let dir = temp_dir("roundtrip");
        let store = FileStore::open(&dir).await.unwrap();

        assert!(store.get("scores").await.unwrap().is_none());

        store.put("scores", Bytes::from_static(b"{}")).await.unwrap();
        let value = store.get("scores").await.unwrap().unwrap();
        assert_eq!(&value[..], b"{}");
        assert!(!dir.join("scores.json.tmp").exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let dir = temp_dir("replace");
        let store = FileStore::open(&dir).await.unwrap();

        store.put("scores", Bytes::from_static(b"{\"a\":1}")).await.unwrap();
        store.put("scores", Bytes::from_static(b"{}")).await.unwrap();

        let value = store.get("scores").await.unwrap().unwrap();
        assert_eq!(&value[..], b"{}");
        assert_eq!(tokio::fs::read(dir.join("scores.json")).await.unwrap(), b"{}");
        assert!(!dir.join("scores.json.tmp").exists());

        // A fresh handle on the same directory sees the durable value
        let reopened = FileStore::open(&dir).await.unwrap();
        assert_eq!(&reopened.get("scores").await.unwrap().unwrap()[..], b"{}");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let dir = temp_dir("invalid");
        let store = FileStore::open(&dir).await.unwrap();

        let result = store.get("../escape").await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));

        let result = store.put("", Bytes::new()).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
