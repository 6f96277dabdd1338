//! Session controller
//!
//! [`AppStore`] owns every persisted screen flag. The UI reads the current
//! [`Screen`], subscribes to changes and reports what happened as an
//! [`Event`]; the store reduces the event, writes the changed flags and
//! publishes the new screen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{watch, Mutex};

use crate::i18n::{Language, Localizer, Translations};
use crate::models::{AuthUser, UserProfile};
use crate::screen::{reduce, resolve, Event, Screen, SessionSnapshot};
use crate::state::PersistedCell;
use crate::storage::{keys, KeyValueStore};

/// Single owner of the persisted session state
pub struct AppStore {
    store: Arc<dyn KeyValueStore>,
    translations: Arc<Translations>,
    default_language: Language,

    language: PersistedCell<Option<Language>>,
    has_selected_language: PersistedCell<bool>,
    has_seen_intro: PersistedCell<bool>,
    user: PersistedCell<Option<AuthUser>>,
    profile: PersistedCell<Option<UserProfile>>,
    profile_completed: PersistedCell<bool>,
    has_seen_welcome: PersistedCell<bool>,
    current_screen: PersistedCell<Screen>,
    editing_profile: AtomicBool,

    screen: watch::Sender<Screen>,
    dispatch_lock: Mutex<()>,
}

impl AppStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_translations(store, Translations::bundled())
    }

    pub fn with_translations(store: Arc<dyn KeyValueStore>, translations: Arc<Translations>) -> Self {
        let cell = |key: &str| PersistedCell::new(key, false, store.clone());
        let (screen, _) = watch::channel(Screen::default());

        Self {
            default_language: translations.fallback(),
            language: PersistedCell::new(keys::LANGUAGE, None, store.clone()),
            has_selected_language: cell(keys::HAS_SELECTED_LANGUAGE),
            has_seen_intro: cell(keys::HAS_SEEN_INTRO),
            user: PersistedCell::new(keys::USER, None, store.clone()),
            profile: PersistedCell::new(keys::USER_PROFILE, None, store.clone()),
            profile_completed: cell(keys::PROFILE_COMPLETED),
            has_seen_welcome: cell(keys::HAS_SEEN_WELCOME),
            current_screen: PersistedCell::new(keys::CURRENT_SCREEN, Screen::default(), store.clone()),
            editing_profile: AtomicBool::new(false),
            screen,
            dispatch_lock: Mutex::new(()),
            translations,
            store,
        }
    }

    /// Language used until one is selected
    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// Load every flag and publish the resolved screen
    pub async fn load(&self) -> Screen {
        let _guard = self.dispatch_lock.lock().await;

        self.language.load().await;
        self.has_selected_language.load().await;
        self.has_seen_intro.load().await;
        self.user.load().await;
        self.profile.load().await;
        self.profile_completed.load().await;
        self.has_seen_welcome.load().await;
        self.current_screen.load().await;

        let screen = resolve(&self.snapshot());
        if self.current_screen.get() != screen {
            info!("Stored screen {} resolves to {}", self.current_screen.get(), screen);
            self.current_screen.set(screen).await;
        }
        self.screen.send_replace(screen);
        screen
    }

    /// Whether every flag has been read from the store
    pub fn is_loaded(&self) -> bool {
        self.language.is_loaded()
            && self.has_selected_language.is_loaded()
            && self.has_seen_intro.is_loaded()
            && self.user.is_loaded()
            && self.profile.is_loaded()
            && self.profile_completed.is_loaded()
            && self.has_seen_welcome.is_loaded()
            && self.current_screen.is_loaded()
    }

    /// Current values of every flag
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            has_selected_language: self.has_selected_language.get(),
            language: self.language.get().unwrap_or(self.default_language),
            has_completed_intro: self.has_seen_intro.get(),
            user: self.user.get(),
            has_seen_welcome: self.has_seen_welcome.get(),
            editing_profile: self.editing_profile.load(Ordering::SeqCst),
        }
    }

    /// The screen that should be showing
    pub fn screen(&self) -> Screen {
        *self.screen.borrow()
    }

    /// Receive every screen change
    pub fn subscribe(&self) -> watch::Receiver<Screen> {
        self.screen.subscribe()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.user.get()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.get()
    }

    pub fn language(&self) -> Language {
        self.snapshot().language
    }

    /// Localizer for the active language
    pub fn localizer(&self) -> Localizer {
        Localizer::with_translations(self.language(), self.translations.clone())
    }

    /// Apply `event`, persist what changed and publish the new screen.
    ///
    /// Flags are written one after another. A failed write is logged and the
    /// in-memory state still moves forward.
    pub async fn dispatch(&self, event: Event) -> Screen {
        let _guard = self.dispatch_lock.lock().await;

        let before = self.snapshot();
        let previous = resolve(&before);
        let after = reduce(before.clone(), &event);

        match &event {
            Event::Reset => self.clear_all().await,
            Event::LoggedOut => {
                self.user.reset().await;
                self.profile.reset().await;
                self.profile_completed.reset().await;
                self.has_seen_welcome.reset().await;
                if let Err(e) = self.store.remove_item(keys::AUTH_TOKEN).await {
                    warn!("Failed to remove {}: {}", keys::AUTH_TOKEN, e);
                }
            }
            _ => self.write_changes(&before, &after, &event).await,
        }
        self.editing_profile.store(after.editing_profile, Ordering::SeqCst);

        let screen = resolve(&after);
        if screen != previous {
            info!("Screen {} -> {}", previous, screen);
        }
        self.current_screen.set(screen).await;
        self.screen.send_replace(screen);
        screen
    }

    async fn write_changes(&self, before: &SessionSnapshot, after: &SessionSnapshot, event: &Event) {
        if before.language != after.language || (self.language.get().is_none() && after.has_selected_language) {
            self.language.set(Some(after.language)).await;
        }
        if before.has_selected_language != after.has_selected_language {
            self.has_selected_language.set(after.has_selected_language).await;
        }
        if before.has_completed_intro != after.has_completed_intro {
            self.has_seen_intro.set(after.has_completed_intro).await;
        }
        if before.user != after.user {
            self.user.set(after.user.clone()).await;
        }
        if let (Event::ProfileSaved(user), Some(_)) = (event, &after.user) {
            self.profile.set(Some(UserProfile::from(user))).await;
            self.profile_completed.set(user.has_complete_profile()).await;
        }
        if before.has_seen_welcome != after.has_seen_welcome {
            self.has_seen_welcome.set(after.has_seen_welcome).await;
        }
    }

    async fn clear_all(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear store: {}", e);
        }
        self.language.reset().await;
        self.has_selected_language.reset().await;
        self.has_seen_intro.reset().await;
        self.user.reset().await;
        self.profile.reset().await;
        self.profile_completed.reset().await;
        self.has_seen_welcome.reset().await;
        self.current_screen.reset().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{get_json, set_json, MemoryStore};

    fn complete_user() -> AuthUser {
        AuthUser::new("u1", "ana@example.com").with_profile("Ana", "Lopez", vec!["red".into()])
    }

    async fn fresh() -> (Arc<MemoryStore>, AppStore) {
        let mem = Arc::new(MemoryStore::new());
        let app = AppStore::new(mem.clone());
        app.load().await;
        (mem, app)
    }

    #[tokio::test]
    async fn first_launch_shows_language_selection() {
        let (mem, app) = fresh().await;
        assert!(app.is_loaded());
        assert_eq!(app.screen(), Screen::LanguageSelection);
        assert_eq!(app.language(), Language::En);
        let stored: Option<Screen> = get_json(mem.as_ref(), keys::CURRENT_SCREEN).await.unwrap();
        assert_eq!(stored, None);
    }

    #[tokio::test]
    async fn onboarding_persists_each_flag() {
        let (mem, app) = fresh().await;

        assert_eq!(app.dispatch(Event::LanguageSelected(Language::Fr)).await, Screen::Intro);
        assert_eq!(app.dispatch(Event::IntroCompleted).await, Screen::Auth);
        assert_eq!(
            app.dispatch(Event::Authenticated(AuthUser::new("u1", "ana@example.com"))).await,
            Screen::ProfileSetup
        );
        assert_eq!(app.dispatch(Event::ProfileSaved(complete_user())).await, Screen::WelcomeComplete);
        assert_eq!(app.dispatch(Event::WelcomeSeen).await, Screen::MainApp);

        let language: Option<Language> = get_json(mem.as_ref(), keys::LANGUAGE).await.unwrap();
        let completed: Option<bool> = get_json(mem.as_ref(), keys::PROFILE_COMPLETED).await.unwrap();
        let screen: Option<Screen> = get_json(mem.as_ref(), keys::CURRENT_SCREEN).await.unwrap();
        let profile: Option<UserProfile> = get_json(mem.as_ref(), keys::USER_PROFILE).await.unwrap();
        assert_eq!(language, Some(Language::Fr));
        assert_eq!(completed, Some(true));
        assert_eq!(screen, Some(Screen::MainApp));
        assert_eq!(profile.unwrap().first_name.as_deref(), Some("Ana"));
        assert_eq!(app.localizer().t("chat.send"), "Envoyer");
    }

    #[tokio::test]
    async fn restart_resumes_from_stored_flags() {
        let mem = Arc::new(MemoryStore::new());
        set_json(mem.as_ref(), keys::HAS_SELECTED_LANGUAGE, &true).await.unwrap();
        set_json(mem.as_ref(), keys::HAS_SEEN_INTRO, &true).await.unwrap();
        set_json(mem.as_ref(), keys::USER, &complete_user()).await.unwrap();
        set_json(mem.as_ref(), keys::HAS_SEEN_WELCOME, &true).await.unwrap();
        set_json(mem.as_ref(), keys::CURRENT_SCREEN, &"language").await.unwrap();

        let app = AppStore::new(mem.clone());
        assert_eq!(app.load().await, Screen::MainApp);

        let stored: Option<Screen> = get_json(mem.as_ref(), keys::CURRENT_SCREEN).await.unwrap();
        assert_eq!(stored, Some(Screen::MainApp));
    }

    #[tokio::test]
    async fn stale_profile_flag_does_not_bypass_profile_setup() {
        let mem = Arc::new(MemoryStore::new());
        set_json(mem.as_ref(), keys::HAS_SELECTED_LANGUAGE, &true).await.unwrap();
        set_json(mem.as_ref(), keys::USER, &AuthUser::new("u1", "ana@example.com")).await.unwrap();
        set_json(mem.as_ref(), keys::PROFILE_COMPLETED, &true).await.unwrap();
        set_json(mem.as_ref(), keys::HAS_SEEN_WELCOME, &true).await.unwrap();

        let app = AppStore::new(mem);
        assert_eq!(app.load().await, Screen::ProfileSetup);
    }

    #[tokio::test]
    async fn logout_clears_session_keys() {
        let (mem, app) = fresh().await;
        mem.set_item(keys::AUTH_TOKEN, "\"t0k3n\"").await.unwrap();
        app.dispatch(Event::LanguageSelected(Language::En)).await;
        app.dispatch(Event::Authenticated(complete_user())).await;
        app.dispatch(Event::ProfileSaved(complete_user())).await;
        app.dispatch(Event::WelcomeSeen).await;

        let mut rx = app.subscribe();
        assert_eq!(app.dispatch(Event::LoggedOut).await, Screen::Auth);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Screen::Auth);

        assert_eq!(mem.get_item(keys::AUTH_TOKEN).await.unwrap(), None);
        assert_eq!(mem.get_item(keys::USER_PROFILE).await.unwrap(), None);
        assert_eq!(mem.get_item(keys::HAS_SEEN_WELCOME).await.unwrap(), None);
        assert!(app.user().is_none());
        assert_eq!(app.language(), Language::En);
    }

    #[tokio::test]
    async fn reset_returns_to_first_launch() {
        let (mem, app) = fresh().await;
        app.dispatch(Event::LanguageSelected(Language::Fr)).await;
        app.dispatch(Event::IntroCompleted).await;

        assert_eq!(app.dispatch(Event::Reset).await, Screen::LanguageSelection);
        assert_eq!(app.language(), Language::En);
        assert_eq!(mem.keys().await.unwrap(), vec![keys::CURRENT_SCREEN.to_string()]);
    }

    #[tokio::test]
    async fn edit_profile_round_trip() {
        let (_mem, app) = fresh().await;
        app.dispatch(Event::LanguageSelected(Language::En)).await;
        app.dispatch(Event::Authenticated(complete_user())).await;
        app.dispatch(Event::WelcomeSeen).await;

        assert_eq!(app.dispatch(Event::EditProfile).await, Screen::ProfileSetup);
        let updated = complete_user().with_profile("Ana", "Lopez", vec!["white".into()]);
        assert_eq!(app.dispatch(Event::ProfileSaved(updated)).await, Screen::MainApp);
        assert_eq!(
            app.user().unwrap().wine_preferences,
            Some(vec!["white".to_string()])
        );
    }
}
