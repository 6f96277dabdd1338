//! Device-local key-value persistence
//!
//! All values are stored as JSON strings under plain string keys. The
//! [`KeyValueStore`] trait is the only seam the rest of the crate uses to
//! touch persistent state, so the app can inject a platform store, the
//! on-disk [`FileStore`] or the in-memory [`MemoryStore`].

mod file;
mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage keys shared by the app
pub mod keys {
    pub const AUTH_TOKEN: &str = "auth-token";
    pub const USER: &str = "user";
    pub const USER_PROFILE: &str = "user-profile";
    pub const LANGUAGE: &str = "language";
    pub const HAS_SELECTED_LANGUAGE: &str = "has-selected-language";
    pub const CURRENT_SCREEN: &str = "currentScreen";
    pub const HAS_SEEN_INTRO: &str = "has-seen-intro";
    pub const PROFILE_COMPLETED: &str = "profile-completed";
    pub const HAS_SEEN_WELCOME: &str = "has-seen-welcome";
}

/// Asynchronous string store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key
    async fn clear(&self) -> Result<()>;

    /// List the stored keys
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Read and decode a JSON value
pub async fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get_item(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON value
pub async fn set_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw).await
}
