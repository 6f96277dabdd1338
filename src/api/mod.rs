//! Gateway to the Sommelier REST and AI backend
//!
//! Every call attaches the stored bearer token (when present) and the
//! persisted language as `Accept-Language`. Calls made with
//! [`RequestMode::Queued`] are serialized through a [`RequestQueue`];
//! immediate calls run right away and may interleave with queued ones.

mod ai;
mod auth;
pub mod queue;
pub mod types;
mod wines;

use std::sync::Arc;

use log::warn;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::ClientOptions;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::i18n::Language;
use crate::storage::{get_json, keys, KeyValueStore};

pub use queue::RequestQueue;
pub use types::*;

/// How a request is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Send right away
    #[default]
    Immediate,
    /// Send through the FIFO pacing queue
    Queued,
}

/// Client for the Sommelier backend
pub struct SommelierClient {
    http_client: Client,
    store: Arc<dyn KeyValueStore>,
    options: ClientOptions,
    queue: RequestQueue,
}

impl SommelierClient {
    /// Create a client with default options
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sommelier_client::{api::SommelierClient, storage::MemoryStore};
    ///
    /// let client = SommelierClient::new(Arc::new(MemoryStore::new()));
    /// ```
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new_with_options(store, ClientOptions::default())
    }

    /// Create a client with custom options
    pub fn new_with_options(store: Arc<dyn KeyValueStore>, options: ClientOptions) -> Self {
        Self {
            http_client: Client::new(),
            queue: RequestQueue::new(options.queue_delay),
            store,
            options,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The store the token and language are read from
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url, path)
    }

    /// Stored bearer token. Read failures count as signed out.
    pub async fn token(&self) -> Option<String> {
        match get_json::<String>(self.store.as_ref(), keys::AUTH_TOKEN).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read {}: {}", keys::AUTH_TOKEN, e);
                None
            }
        }
    }

    /// Persisted language, or the configured default
    pub async fn language(&self) -> Language {
        match get_json::<Language>(self.store.as_ref(), keys::LANGUAGE).await {
            Ok(language) => language.unwrap_or(self.options.default_language),
            Err(e) => {
                warn!("Failed to read {}: {}", keys::LANGUAGE, e);
                self.options.default_language
            }
        }
    }

    /// Build and send one request
    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mode: RequestMode,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        let language = self.language().await;
        let mut fetch = Fetch::request(&self.http_client, method, &self.get_url(path))
            .header("Accept-Language", language.code())
            .header("X-Client-Info", &self.options.client_info)
            .timeout(self.options.request_timeout);

        if let Some(token) = self.token().await {
            fetch = fetch.bearer_auth(&token);
        }

        if let Some(body) = body {
            fetch = fetch.json(body)?;
        }

        match mode {
            RequestMode::Immediate => fetch.execute::<T>().await,
            RequestMode::Queued => {
                self.queue
                    .submit(async move { fetch.execute::<T>().await })
                    .await
            }
        }
    }
}
