//! Sommelier client core
//!
//! The headless core of the Sommelier wine app: persisted session state,
//! screen resolution, localization, and the client for the Sommelier REST and
//! AI backend. A UI layer renders the screens and reports user actions as
//! [`screen::Event`]s.

pub mod api;
pub mod cellar;
pub mod chat;
pub mod config;
pub mod error;
pub mod fetch;
pub mod i18n;
pub mod models;
pub mod screen;
pub mod state;
pub mod storage;
pub mod store;

use std::sync::Arc;

use log::info;

use crate::api::{LoginRequest, ProfileUpdate, SommelierClient};
use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::i18n::Language;
use crate::screen::{Event, Screen};
use crate::storage::KeyValueStore;
use crate::store::AppStore;

/// The main entry point: one backend client and one session store sharing a
/// key-value store
pub struct Sommelier {
    client: SommelierClient,
    app: AppStore,
}

impl Sommelier {
    /// Create a client core with default options
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sommelier_client::{storage::MemoryStore, Sommelier};
    ///
    /// let sommelier = Sommelier::new(Arc::new(MemoryStore::new()));
    /// ```
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new_with_options(store, ClientOptions::default())
    }

    /// Create a client core with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use sommelier_client::{config::ClientOptions, storage::MemoryStore, Sommelier};
    ///
    /// let options = ClientOptions::default().with_queue_delay(Duration::from_millis(100));
    /// let sommelier = Sommelier::new_with_options(Arc::new(MemoryStore::new()), options);
    /// ```
    pub fn new_with_options(store: Arc<dyn KeyValueStore>, options: ClientOptions) -> Self {
        let app = AppStore::new(store.clone()).with_default_language(options.default_language);
        Self {
            client: SommelierClient::new_with_options(store, options),
            app,
        }
    }

    pub fn client(&self) -> &SommelierClient {
        &self.client
    }

    pub fn app(&self) -> &AppStore {
        &self.app
    }

    /// Load the persisted session and return the screen to show
    pub async fn start(&self) -> Screen {
        self.app.load().await
    }

    pub async fn select_language(&self, language: Language) -> Screen {
        self.app.dispatch(Event::LanguageSelected(language)).await
    }

    /// Sign in and move past the auth screen
    pub async fn sign_in(&self, request: &LoginRequest) -> Result<Screen> {
        let session = self.client.login(request).await?;
        Ok(self.app.dispatch(Event::Authenticated(session.user)).await)
    }

    /// Save the profile-setup form for the signed-in user
    pub async fn save_profile(&self, first_name: &str, last_name: &str, wine_preferences: Vec<String>) -> Result<Screen> {
        let user = self
            .app
            .user()
            .ok_or_else(|| Error::general("no signed-in user"))?;

        let update = ProfileUpdate::for_user(&user, first_name, last_name, wine_preferences);
        self.client.update_profile(&update).await?;
        info!("Profile saved for {}", user.id);

        let user = user.with_profile(&update.first_name, &update.last_name, update.wine_preferences);
        Ok(self.app.dispatch(Event::ProfileSaved(user)).await)
    }

    pub async fn sign_out(&self) -> Screen {
        self.client.logout().await;
        self.app.dispatch(Event::LoggedOut).await
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::api::{RequestMode, SommelierClient};
    pub use crate::cellar::{Cellar, SortBy};
    pub use crate::chat::ChatSession;
    pub use crate::config::ClientOptions;
    pub use crate::error::{Error, Result};
    pub use crate::i18n::{Language, Localizer};
    pub use crate::models::{AuthUser, NewWine, Wine, WineType, WineUpdate};
    pub use crate::screen::{Event, Screen};
    pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
    pub use crate::store::AppStore;
    pub use crate::Sommelier;
}
