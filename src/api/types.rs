//! Request and response bodies for the backend API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::i18n::Language;
use crate::models::{email_local_part, AuthUser, ConversationTurn, NewWine, UserProfile, Wine, WineType};

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub birth_month: u8,
    pub birth_year: i32,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `PUT /auth/profile`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub wine_preferences: Vec<String>,
    pub profile_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_styles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<crate::models::ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_price_range: Option<String>,
}

impl ProfileUpdate {
    /// Profile-setup form for `user`, names trimmed
    pub fn for_user(user: &AuthUser, first_name: &str, last_name: &str, wine_preferences: Vec<String>) -> Self {
        Self {
            email: user.email.clone(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            wine_preferences,
            profile_completed: true,
            ..Default::default()
        }
    }
}

/// User record as the backend returns it. Every field is optional because
/// the backend has shipped several shapes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birth_month: Option<u8>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub wine_preferences: Option<Vec<String>>,
}

impl BackendUser {
    /// Normalize into a session user. `email` fills in a missing email, and
    /// `fallback_id` a missing id.
    pub fn into_auth_user(self, email: &str, fallback_id: impl FnOnce() -> String, token: Option<String>) -> AuthUser {
        let email = self.email.unwrap_or_else(|| email.to_string());
        let name = self
            .name
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| email_local_part(&email).to_string());
        AuthUser {
            id: self.id.unwrap_or_else(fallback_id),
            name: Some(name),
            first_name: self.first_name,
            last_name: self.last_name,
            token,
            birth_month: self.birth_month,
            birth_year: self.birth_year,
            wine_preferences: self.wine_preferences,
            email,
        }
    }
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: BackendUser,
}

/// Response of `POST /auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<BackendUser>,
}

/// Response of `PUT /auth/profile`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<BackendUser>,
}

/// A signed-in user and the bearer token for the session
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: Option<String>,
    pub user: AuthUser,
}

/// `GET /wines` answers either a bare array or `{"wines": [...]}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WineList {
    Wrapped { wines: Vec<Wine> },
    Bare(Vec<Wine>),
    Empty(Option<()>),
}

impl From<WineList> for Vec<Wine> {
    fn from(list: WineList) -> Self {
        match list {
            WineList::Wrapped { wines } | WineList::Bare(wines) => wines,
            WineList::Empty(_) => Vec::new(),
        }
    }
}

/// Acknowledgement of a wine create or update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WineAck {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /ai/pairing`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PairingRequest<'a> {
    pub dish: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_preferences: Option<&'a UserProfile>,
    pub language: Language,
    pub conversation_history: &'a [ConversationTurn],
}

/// Body of `POST /ai/advice`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdviceRequest<'a> {
    pub question: &'a str,
    pub language: Language,
    pub conversation_history: &'a [ConversationTurn],
}

/// Body of `POST /ai/chat`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<&'a [ConversationTurn]>,
}

/// Body of `POST /ai/recognize-wine`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecognizeRequest {
    pub image_base64: String,
}

/// Wine to describe with `generate_wine_description`
#[derive(Debug, Clone, Default)]
pub struct WineDescriptionRequest {
    pub name: String,
    pub producer: Option<String>,
    pub region: Option<String>,
    pub year: Option<i32>,
}

impl WineDescriptionRequest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Prompt sent to the chat endpoint
    pub fn prompt(&self, language: Language) -> String {
        let instruction = match language {
            Language::Fr => "Répondez en français. ",
            Language::En => "",
        };
        let mut subject = self.name.clone();
        if let Some(producer) = &self.producer {
            subject.push_str(&format!(" by {}", producer));
        }
        if let Some(year) = self.year {
            subject.push_str(&format!(" ({})", year));
        }
        if let Some(region) = &self.region {
            subject.push_str(&format!(" from {}", region));
        }
        format!(
            "{}Write a concise wine description (about 100 words) for {}. \
             Include tasting notes, characteristics, and food pairing suggestions.",
            instruction, subject
        )
    }
}

impl From<&Wine> for WineDescriptionRequest {
    fn from(wine: &Wine) -> Self {
        Self {
            name: wine.name.clone(),
            producer: Some(wine.producer.clone()),
            region: wine.region.clone(),
            year: Some(wine.year),
        }
    }
}

/// A wine suggested by the AI
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineRecommendation {
    pub name: String,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// `None` when the type is missing or not one the cellar knows
    #[serde(rename = "type", default, deserialize_with = "known_wine_type")]
    pub wine_type: Option<WineType>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The `response` field of a structured AI reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Text(String),
    Nested {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl ReplyBody {
    fn text(&self) -> Option<&str> {
        match self {
            ReplyBody::Text(text) => Some(text),
            ReplyBody::Nested { text, content, message } => {
                text.as_deref().or(content.as_deref()).or(message.as_deref())
            }
        }
    }
}

/// Structured AI reply
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StructuredReply {
    #[serde(default)]
    pub response: Option<ReplyBody>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendations: Vec<WineRecommendation>,
}

fn known_wine_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<WineType>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(|t| t.parse().ok()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reply of the chat, pairing and advice endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AiReply {
    Text(String),
    Structured(StructuredReply),
}

impl AiReply {
    /// The text to show, if the reply has any non-blank text
    pub fn text(&self) -> Option<&str> {
        let text = match self {
            AiReply::Text(text) => Some(text.as_str()),
            AiReply::Structured(reply) => reply
                .response
                .as_ref()
                .and_then(ReplyBody::text)
                .or(reply.message.as_deref()),
        };
        text.filter(|t| !t.trim().is_empty())
    }

    /// Wines suggested alongside the text
    pub fn recommendations(&self) -> &[WineRecommendation] {
        match self {
            AiReply::Text(_) => &[],
            AiReply::Structured(reply) => &reply.recommendations,
        }
    }
}

/// Fields read off a wine label
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedWine {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "type", default)]
    pub wine_type: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RecognizedWine {
    /// Pre-fill for the add-wine form. Missing vintage defaults to `current_year`.
    pub fn to_new_wine(&self, current_year: i32) -> NewWine {
        NewWine {
            name: self.name.clone().unwrap_or_default(),
            producer: self.producer.clone().unwrap_or_default(),
            year: self.year.unwrap_or(current_year),
            wine_type: self.wine_type.as_deref().and_then(|t| t.parse().ok()),
            region: self.region.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Response of `POST /ai/recognize-wine`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub wine_data: Option<RecognizedWine>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RecognitionResult {
    /// Confidence as display text, whether the backend sent a number or a string
    pub fn confidence_label(&self) -> Option<String> {
        match self.confidence.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
