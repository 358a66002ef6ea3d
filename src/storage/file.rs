//! JSON-file backed store.
//!
//! All keys live in a single object written to `<path>`. Every write goes
//! through a temporary sibling file and a rename, so a crash never leaves a
//! half-written session behind. On unix the file is readable by its owner only.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::KeyValueStore;
use crate::error::StorageError;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(items)?;
        // a leftover temp file would keep its old mode
        match tokio::fs::remove_file(&tmp).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => return Err(err.into()),
            _ => {}
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        if items.remove(key).is_some() {
            self.write_all(&items).await?;
        }
        Ok(())
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        let before = items.len();
        for key in keys {
            items.remove(*key);
        }
        if items.len() != before {
            self.write_all(&items).await?;
        }
        Ok(())
    }
}
