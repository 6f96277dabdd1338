//! Translation lookup with English fallback
//!
//! Keys are dotted paths into nested JSON tables, e.g. `cellar.sortOptions.name`.
//! A key missing from the active language is looked up in the default
//! language, and a key missing from both resolves to itself so the UI shows
//! the raw key instead of failing.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

const EN_TABLE: &str = include_str!("../locales/en.json");
const FR_TABLE: &str = include_str!("../locales/fr.json");

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    /// ISO 639-1 code, also used for `Accept-Language`
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Parse a language code, ignoring region suffixes like `fr-CA`
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }

    /// The other supported language, used by the profile toggle
    pub fn toggled(&self) -> Self {
        match self {
            Self::En => Self::Fr,
            Self::Fr => Self::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| Error::general(format!("unsupported language: {}", s)))
    }
}

/// Translation tables keyed by language
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<Language, Value>,
    fallback: Language,
}

impl Translations {
    /// Empty tables with English as the fallback
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            fallback: Language::En,
        }
    }

    /// The tables shipped with the crate
    pub fn bundled() -> Arc<Translations> {
        static BUNDLED: OnceLock<Arc<Translations>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| {
                let mut translations = Translations::new();
                for (language, raw) in [(Language::En, EN_TABLE), (Language::Fr, FR_TABLE)] {
                    match serde_json::from_str(raw) {
                        Ok(table) => translations = translations.with_table(language, table),
                        Err(e) => error!("Bundled {} translations are invalid: {}", language, e),
                    }
                }
                Arc::new(translations)
            })
            .clone()
    }

    /// Add or replace the table for `language`
    pub fn with_table(mut self, language: Language, table: Value) -> Self {
        self.tables.insert(language, table);
        self
    }

    /// Set the language used when a key is missing
    pub fn with_fallback(mut self, language: Language) -> Self {
        self.fallback = language;
        self
    }

    pub fn fallback(&self) -> Language {
        self.fallback
    }

    /// Walk `key` in one table only. `None` when a segment is missing.
    pub fn node(&self, language: Language, key: &str) -> Option<&Value> {
        let mut node = self.tables.get(&language)?;
        for segment in key.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Resolve `key` to a string in one table only
    pub fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.node(language, key)?.as_str()
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves keys for the active language
#[derive(Debug, Clone)]
pub struct Localizer {
    language: Language,
    translations: Arc<Translations>,
}

impl Localizer {
    /// A localizer over the bundled tables
    pub fn new(language: Language) -> Self {
        Self::with_translations(language, Translations::bundled())
    }

    pub fn with_translations(language: Language, translations: Arc<Translations>) -> Self {
        Self {
            language,
            translations,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Resolve `key`.
    ///
    /// Only a missing path falls back to the default language. A path that
    /// exists but ends on a non-string resolves to the key itself.
    pub fn t(&self, key: &str) -> String {
        self.translations
            .node(self.language, key)
            .or_else(|| self.translations.node(self.translations.fallback(), key))
            .and_then(Value::as_str)
            .unwrap_or(key)
            .to_string()
    }

    /// Resolve `key` and substitute `{{name}}` placeholders
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        params.iter().fold(self.t(key), |text, (name, value)| {
            text.replace(&format!("{{{{{}}}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tables() -> Arc<Translations> {
        Arc::new(
            Translations::new()
                .with_table(
                    Language::En,
                    json!({
                        "chat": { "title": "AI Sommelier", "send": "Send" },
                        "only": { "english": "Only in English" },
                        "greeting": "Hello {{name}}, you have {{count}} wines",
                        "farewell": "Goodbye"
                    }),
                )
                .with_table(
                    Language::Fr,
                    json!({
                        "chat": { "title": "Sommelier IA" },
                        "greeting": "Bonjour {{name}}",
                        "farewell": { "formal": "Au revoir" }
                    }),
                ),
        )
    }

    #[test]
    fn active_language_wins() {
        let fr = Localizer::with_translations(Language::Fr, tables());
        assert_eq!(fr.t("chat.title"), "Sommelier IA");
    }

    #[test]
    fn missing_keys_fall_back_to_english() {
        let fr = Localizer::with_translations(Language::Fr, tables());
        assert_eq!(fr.t("chat.send"), "Send");
        assert_eq!(fr.t("only.english"), "Only in English");
    }

    #[test]
    fn unknown_keys_resolve_to_themselves() {
        let fr = Localizer::with_translations(Language::Fr, tables());
        for key in ["nope", "chat.nope", "chat.title.deeper", "", "..", "chat"] {
            assert_eq!(fr.t(key), key);
        }
    }

    #[test]
    fn non_string_in_active_table_does_not_fall_back() {
        let fr = Localizer::with_translations(Language::Fr, tables());
        assert_eq!(fr.t("farewell"), "farewell");
        assert_eq!(fr.t("farewell.formal"), "Au revoir");

        let en = Localizer::with_translations(Language::En, tables());
        assert_eq!(en.t("farewell"), "Goodbye");
        assert_eq!(tables().lookup(Language::Fr, "farewell"), None);
        assert_eq!(tables().lookup(Language::Fr, "farewell.formal"), Some("Au revoir"));
    }

    #[test]
    fn placeholders_are_substituted() {
        let en = Localizer::with_translations(Language::En, tables());
        assert_eq!(
            en.t_with("greeting", &[("name", "Ana"), ("count", "3")]),
            "Hello Ana, you have 3 wines"
        );
    }

    #[test]
    fn bundled_french_falls_back_for_untranslated_keys() {
        let fr = Localizer::new(Language::Fr);
        assert_eq!(fr.t("chat.send"), "Envoyer");
        assert_eq!(fr.t("camera.errors.captureFailed"), "Could not capture the photo");
        assert_eq!(
            fr.t_with("wineRecognition.recognizedSuccess", &[("confidence", "92%")]),
            "Vin reconnu (confiance 92%)"
        );
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code("fr-CA"), Some(Language::Fr));
        assert_eq!(Language::from_code("EN"), Some(Language::En));
        assert_eq!(Language::from_code("de"), None);
        assert!("xx".parse::<Language>().is_err());
        assert_eq!(serde_json::to_string(&Language::Fr).unwrap(), "\"fr\"");
        assert_eq!(Language::En.toggled(), Language::Fr);
    }
}
