//! A single value mirrored to the key-value store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::watch;

use crate::storage::{get_json, set_json, KeyValueStore};

/// Binds one named value to the store.
///
/// Persistence is best effort: read and write failures are logged, and the
/// in-memory value stays authoritative for the session.
pub struct PersistedCell<T> {
    key: String,
    default: T,
    store: Arc<dyn KeyValueStore>,
    value: watch::Sender<T>,
    loaded: AtomicBool,
}

impl<T> PersistedCell<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(key: &str, default: T, store: Arc<dyn KeyValueStore>) -> Self {
        let (value, _) = watch::channel(default.clone());
        Self {
            key: key.to_string(),
            default,
            store,
            value,
            loaded: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored value once.
    ///
    /// A missing or unreadable value keeps the default. Calling this after
    /// the cell is loaded, or after a [`set`](Self::set), does nothing.
    pub async fn load(&self) {
        if self.is_loaded() {
            return;
        }

        match get_json::<T>(self.store.as_ref(), &self.key).await {
            Ok(Some(stored)) => {
                trace!("Loaded {} from store", self.key);
                self.value.send_replace(stored);
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load state for key {}: {}", self.key, e),
        }

        self.loaded.store(true, Ordering::SeqCst);
    }

    /// Whether [`load`](Self::load) has finished, successfully or not
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replace the value in memory, then write it to the store
    pub async fn set(&self, value: T) {
        self.value.send_replace(value.clone());
        self.loaded.store(true, Ordering::SeqCst);

        if let Err(e) = set_json(self.store.as_ref(), &self.key, &value).await {
            warn!("Failed to save state for key {}: {}", self.key, e);
        }
    }

    /// Remove the stored value and return to the default
    pub async fn reset(&self) {
        self.value.send_replace(self.default.clone());

        if let Err(e) = self.store.remove_item(&self.key).await {
            warn!("Failed to remove state for key {}: {}", self.key, e);
        }
    }

    /// Receive every change to the value
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }
}
