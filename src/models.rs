//! Data model shared by the client, the session store and the cellar

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Wine styles offered during profile setup
pub const WINE_STYLES: [&str; 10] = [
    "dry",
    "sweet",
    "crisp",
    "full-bodied",
    "light",
    "fruity",
    "earthy",
    "mineral",
    "oak-aged",
    "fresh",
];

/// Price buckets offered during profile setup
pub const PRICE_RANGES: [&str; 5] = ["under-20", "20-50", "50-100", "100-200", "over-200"];

/// Authenticated user as held in the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wine_preferences: Option<Vec<String>>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
            first_name: None,
            last_name: None,
            token: None,
            birth_month: None,
            birth_year: None,
            wine_preferences: None,
        }
    }

    /// A profile is complete when both names are set and at least one
    /// wine preference was chosen.
    pub fn has_complete_profile(&self) -> bool {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        filled(&self.first_name)
            && filled(&self.last_name)
            && self.wine_preferences.as_ref().is_some_and(|prefs| !prefs.is_empty())
    }

    /// Name shown in the UI
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| email_local_part(&self.email).to_string())
    }

    /// Copy of this user with the profile form applied
    pub fn with_profile(&self, first_name: &str, last_name: &str, wine_preferences: Vec<String>) -> Self {
        Self {
            first_name: Some(first_name.trim().to_string()),
            last_name: Some(last_name.trim().to_string()),
            wine_preferences: Some(wine_preferences),
            ..self.clone()
        }
    }
}

pub(crate) fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Self-declared wine experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Preference record derived from the user and the onboarding form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wine_preferences: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_styles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_price_range: Option<String>,
}

impl From<&AuthUser> for UserProfile {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            birth_month: user.birth_month,
            birth_year: user.birth_year,
            wine_preferences: user.wine_preferences.clone(),
            ..Default::default()
        }
    }
}

/// Wine categories. Decoding goes through [`FromStr`], so the backend's
/// capitalised and accented spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WineType {
    #[default]
    Red,
    White,
    Rose,
    Sparkling,
    Dessert,
    Fortified,
}

impl WineType {
    pub const ALL: [WineType; 6] = [
        WineType::Red,
        WineType::White,
        WineType::Rose,
        WineType::Sparkling,
        WineType::Dessert,
        WineType::Fortified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::White => "white",
            Self::Rose => "rose",
            Self::Sparkling => "sparkling",
            Self::Dessert => "dessert",
            Self::Fortified => "fortified",
        }
    }
}

impl fmt::Display for WineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WineType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "white" => Ok(Self::White),
            "rose" | "rosé" => Ok(Self::Rose),
            "sparkling" => Ok(Self::Sparkling),
            "dessert" => Ok(Self::Dessert),
            "fortified" => Ok(Self::Fortified),
            other => Err(Error::general(format!("unknown wine type: {}", other))),
        }
    }
}

impl<'de> Deserialize<'de> for WineType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A bottle in the cellar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wine {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub producer: String,
    pub year: i32,
    #[serde(rename = "type", default)]
    pub wine_type: WineType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Wine {
    /// Apply the fields set in `update`
    pub fn apply(&mut self, update: &WineUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(producer) = &update.producer {
            self.producer = producer.clone();
        }
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(wine_type) = update.wine_type {
            self.wine_type = wine_type;
        }
        if update.region.is_some() {
            self.region = update.region.clone();
        }
        if update.notes.is_some() {
            self.notes = update.notes.clone();
        }
        if update.rating.is_some() {
            self.rating = update.rating;
        }
        if update.price.is_some() {
            self.price = update.price;
        }
    }
}

/// Body of `POST /wines`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWine {
    pub name: String,
    pub producer: String,
    pub year: i32,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<WineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewWine {
    pub fn new(name: &str, producer: &str, year: i32) -> Self {
        Self {
            name: name.to_string(),
            producer: producer.to_string(),
            year,
            ..Default::default()
        }
    }

    /// Trim text fields and reject entries without a name or producer
    pub fn validate(self) -> Result<Self, Error> {
        let trimmed = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let wine = Self {
            name: self.name.trim().to_string(),
            producer: self.producer.trim().to_string(),
            year: self.year,
            wine_type: self.wine_type,
            region: trimmed(self.region),
            notes: trimmed(self.notes),
        };
        if wine.name.is_empty() || wine.producer.is_empty() {
            return Err(Error::general("wine name and producer are required"));
        }
        Ok(wine)
    }

    /// The cached entry for a wine the backend accepted
    pub fn into_wine(self, id: String, added_date: DateTime<Utc>) -> Wine {
        Wine {
            id,
            name: self.name,
            producer: self.producer,
            year: self.year,
            wine_type: self.wine_type.unwrap_or_default(),
            region: self.region,
            notes: self.notes,
            rating: None,
            price: None,
            added_date: Some(added_date),
            image_url: None,
        }
    }
}

/// Body of `PUT /wines/:id`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<WineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// One message in a chat session. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    fn new(text: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_user,
            timestamp: Utc::now(),
        }
    }
}

/// Speaker of a conversation turn sent to the AI endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Conversation history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for ConversationTurn {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: if message.is_user { Role::User } else { Role::Assistant },
            content: message.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> AuthUser {
        AuthUser::new("u1", "ana@example.com")
    }

    #[test]
    fn complete_profile_needs_names_and_preferences() {
        let base = user();
        assert!(!base.has_complete_profile());

        let complete = base.with_profile("Ana", "Lopez", vec!["red".into()]);
        assert!(complete.has_complete_profile());

        let no_prefs = base.with_profile("Ana", "Lopez", vec![]);
        assert!(!no_prefs.has_complete_profile());

        let blank_last = base.with_profile("Ana", "  ", vec!["red".into()]);
        assert!(!blank_last.has_complete_profile());

        let only_first = AuthUser {
            first_name: Some("Ana".into()),
            wine_preferences: Some(vec!["white".into()]),
            ..base
        };
        assert!(!only_first.has_complete_profile());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut u = user();
        assert_eq!(u.display_name(), "ana");
        u.first_name = Some("Ana".into());
        assert_eq!(u.display_name(), "Ana");
        u.name = Some("Ana L.".into());
        assert_eq!(u.display_name(), "Ana L.");
    }

    #[test]
    fn auth_user_uses_camel_case() {
        let u = user().with_profile("Ana", "Lopez", vec!["red".into()]);
        let value = serde_json::to_value(&u).unwrap();
        assert_eq!(value["firstName"], "Ana");
        assert_eq!(value["winePreferences"], json!(["red"]));
        assert!(value.get("token").is_none());
    }

    #[test]
    fn wine_accepts_backend_variants() {
        let wine: Wine = serde_json::from_value(json!({
            "_id": "w1",
            "name": "Clos",
            "producer": "Domaine",
            "year": 2015,
            "type": "rosé",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(wine.id, "w1");
        assert_eq!(wine.wine_type, WineType::Rose);
        assert!(wine.added_date.is_some());

        let out = serde_json::to_value(&wine).unwrap();
        assert_eq!(out["type"], "rose");
        assert_eq!(out["addedDate"], "2024-05-01T10:00:00Z");

        for (raw, expected) in [("Red", WineType::Red), ("Rosé", WineType::Rose), (" SPARKLING ", WineType::Sparkling)] {
            let wine: Wine = serde_json::from_value(json!({
                "id": "w2", "name": "A", "producer": "B", "year": 2019, "type": raw
            }))
            .unwrap();
            assert_eq!(wine.wine_type, expected);
        }
        assert!(serde_json::from_value::<WineType>(json!("orange")).is_err());
    }

    #[test]
    fn wine_type_parsing() {
        assert_eq!("Rosé".parse::<WineType>().unwrap(), WineType::Rose);
        assert_eq!("fortified".parse::<WineType>().unwrap(), WineType::Fortified);
        assert!("orange".parse::<WineType>().is_err());
        assert_eq!(WineType::ALL.len(), 6);
    }

    #[test]
    fn new_wine_validation_trims_and_rejects_blanks() {
        let wine = NewWine {
            region: Some("  ".into()),
            notes: Some(" silky ".into()),
            ..NewWine::new("  Margaux ", " Château ", 2010)
        }
        .validate()
        .unwrap();
        assert_eq!(wine.name, "Margaux");
        assert_eq!(wine.producer, "Château");
        assert_eq!(wine.region, None);
        assert_eq!(wine.notes.as_deref(), Some("silky"));

        assert!(NewWine::new("Margaux", " ", 2010).validate().is_err());
    }

    #[test]
    fn update_merges_only_set_fields() {
        let mut wine = NewWine::new("A", "B", 2000).into_wine("w1".into(), Utc::now());
        wine.apply(&WineUpdate {
            year: Some(2001),
            rating: Some(4.5),
            ..Default::default()
        });
        assert_eq!(wine.name, "A");
        assert_eq!(wine.year, 2001);
        assert_eq!(wine.rating, Some(4.5));
    }

    #[test]
    fn chat_message_maps_to_conversation_turn() {
        let turn = ConversationTurn::from(&ChatMessage::assistant("Try a Barolo"));
        assert_eq!(
            serde_json::to_value(&turn).unwrap(),
            json!({ "role": "assistant", "content": "Try a Barolo" })
        );
    }
}
