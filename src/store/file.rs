//! On-disk store: one JSON file per record under `<nuker dir>/state/`.

use super::{StateStore, StoreError, StoreKey};
use crate::env;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct FileStore {
    nuker_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the state directory under `nuker_dir`
    pub async fn open(nuker_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let nuker_dir = nuker_dir.into();
        let state_dir = env::state_dir_path(&nuker_dir);
        async_fs::create_dir_all(&state_dir)
            .await
            .map_err(|source| StoreError::Setup {
                path: state_dir.clone(),
                source,
            })?;
        debug!("State directory ready: {}", state_dir.display());
        Ok(Self { nuker_dir })
    }

    pub fn state_dir(&self) -> PathBuf {
        env::state_dir_path(&self.nuker_dir)
    }

    fn record_path(&self, key: StoreKey) -> PathBuf {
        env::record_file_path(&self.nuker_dir, key.as_str())
    }

    async fn write_atomically(
        &self,
        key: StoreKey,
        path: &Path,
        bytes: &[u8],
    ) -> std::io::Result<()> {
        let temp_path = path.with_extension(env::store::TEMP_EXTENSION);

        let mut file = async_fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = async_fs::rename(&temp_path, path).await {
            let _ = async_fs::remove_file(&temp_path).await;
            return Err(e);
        }

        debug!("Wrote {} record ({} bytes)", key, bytes.len());
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn get(&self, key: StoreKey) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.record_path(key);
        let content = match async_fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { key, source }),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| StoreError::Malformed { key, source })
    }

    async fn set(&self, key: StoreKey, value: serde_json::Value) -> Result<(), StoreError> {
        let path = self.record_path(key);
        let bytes = serde_json::to_vec_pretty(&value)
            .map_err(|source| StoreError::Malformed { key, source })?;

        self.write_atomically(key, &path, &bytes)
            .await
            .map_err(|source| StoreError::Io { key, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{self, Cooldown, UsageStats};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let nuker_dir = temp_dir.path().join(".nuker");

        let usage = UsageStats { runs: 2, deleted: 7 };
        {
            let file_store = FileStore::open(&nuker_dir).await.unwrap();
            store::save(&file_store, StoreKey::Usage, &usage).await.unwrap();
        }

        let reopened = FileStore::open(&nuker_dir).await.unwrap();
        let loaded: Option<UsageStats> = store::load(&reopened, StoreKey::Usage).await.unwrap();
        assert_eq!(loaded, Some(usage));
        assert!(nuker_dir.join("state/usage.json").is_file());
        assert!(!nuker_dir.join("state/usage.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_record_reads_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let file_store = FileStore::open(temp_dir.path()).await.unwrap();

        let cooldown: Option<Cooldown> = store::load(&file_store, StoreKey::Cooldown)
            .await
            .unwrap();
        assert!(cooldown.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let file_store = FileStore::open(temp_dir.path()).await.unwrap();
        std::fs::write(file_store.state_dir().join("log.json"), b"{not json").unwrap();

        let err = file_store.get(StoreKey::Log).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { key: StoreKey::Log, .. }));
    }
}
