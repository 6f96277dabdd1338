use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

use super::KeyValueStore;
use crate::error::Result;

/// Store persisted as a single JSON object file.
///
/// The file is read on first access and rewritten in full after every
/// mutation. A missing file is an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            items: Mutex::new(None),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!("Wrote {} keys to {}", items.len(), self.path.display());
        Ok(())
    }

    /// Apply `f` to the loaded map and persist the result
    async fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut guard = self.items.lock().await;
        let mut items = match guard.take() {
            Some(items) => items,
            None => self.read_file().await?,
        };
        f(&mut items);
        let written = self.write_file(&items).await;
        *guard = Some(items);
        written
    }

    /// Apply `f` to the loaded map without copying it
    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&BTreeMap<String, String>) -> T,
    {
        let mut guard = self.items.lock().await;
        let items = match guard.take() {
            Some(items) => items,
            None => self.read_file().await?,
        };
        Ok(f(guard.insert(items)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.read(|items| items.get(key).cloned()).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|items| {
            items.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.mutate(|items| {
            items.remove(key);
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.mutate(BTreeMap::clear).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.read(|items| items.keys().cloned().collect()).await
    }
}
