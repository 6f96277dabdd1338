//! Screen resolution
//!
//! The screen to show is a pure function of the session snapshot. Every
//! session change goes through [`reduce`], and the screen is recomputed from
//! the resulting snapshot, so two paths can never disagree on where the
//! user belongs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::i18n::Language;
use crate::models::AuthUser;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    #[default]
    #[serde(alias = "language")]
    LanguageSelection,
    Intro,
    Auth,
    ProfileSetup,
    WelcomeComplete,
    #[serde(alias = "main")]
    MainApp,
}

impl Screen {
    pub fn label(&self) -> &'static str {
        match self {
            Self::LanguageSelection => "language-selection",
            Self::Intro => "intro",
            Self::Auth => "auth",
            Self::ProfileSetup => "profile-setup",
            Self::WelcomeComplete => "welcome-complete",
            Self::MainApp => "main-app",
        }
    }

    /// Whether this screen is part of onboarding
    pub fn is_onboarding(&self) -> bool {
        !matches!(self, Self::MainApp)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Screen {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "language" | "language-selection" => Ok(Self::LanguageSelection),
            "intro" => Ok(Self::Intro),
            "auth" => Ok(Self::Auth),
            "profile-setup" => Ok(Self::ProfileSetup),
            "welcome-complete" => Ok(Self::WelcomeComplete),
            "main" | "main-app" => Ok(Self::MainApp),
            other => Err(Error::general(format!("unknown screen: {}", other))),
        }
    }
}

/// Everything the screen depends on
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub has_selected_language: bool,
    pub language: Language,
    pub has_completed_intro: bool,
    pub user: Option<AuthUser>,
    pub has_seen_welcome: bool,
    /// Set while a signed-in user revisits profile setup from the main app.
    /// Not persisted.
    pub editing_profile: bool,
}

/// Session changes the UI reports
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LanguageSelected(Language),
    IntroCompleted,
    Authenticated(AuthUser),
    ProfileSaved(AuthUser),
    WelcomeSeen,
    EditProfile,
    LanguageChanged(Language),
    LoggedOut,
    /// Forget everything, back to first launch
    Reset,
}

/// The screen for `snapshot`
pub fn resolve(snapshot: &SessionSnapshot) -> Screen {
    if !snapshot.has_selected_language {
        return Screen::LanguageSelection;
    }

    let user = match &snapshot.user {
        Some(user) => user,
        None if snapshot.has_completed_intro => return Screen::Auth,
        None => return Screen::Intro,
    };

    if snapshot.editing_profile || !user.has_complete_profile() {
        Screen::ProfileSetup
    } else if !snapshot.has_seen_welcome {
        Screen::WelcomeComplete
    } else {
        Screen::MainApp
    }
}

/// Apply `event` to `snapshot`
pub fn reduce(snapshot: SessionSnapshot, event: &Event) -> SessionSnapshot {
    match event {
        Event::LanguageSelected(language) | Event::LanguageChanged(language) => SessionSnapshot {
            language: *language,
            has_selected_language: true,
            ..snapshot
        },
        Event::IntroCompleted => SessionSnapshot {
            has_completed_intro: true,
            ..snapshot
        },
        Event::Authenticated(user) => SessionSnapshot {
            user: Some(user.clone()),
            has_completed_intro: true,
            editing_profile: false,
            ..snapshot
        },
        Event::ProfileSaved(user) => SessionSnapshot {
            user: Some(user.clone()),
            editing_profile: false,
            ..snapshot
        },
        Event::WelcomeSeen => SessionSnapshot {
            has_seen_welcome: true,
            ..snapshot
        },
        Event::EditProfile => SessionSnapshot {
            editing_profile: snapshot.user.is_some(),
            ..snapshot
        },
        Event::LoggedOut => SessionSnapshot {
            user: None,
            has_seen_welcome: false,
            editing_profile: false,
            ..snapshot
        },
        Event::Reset => SessionSnapshot::default(),
    }
}
