//! AI sommelier endpoints

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::debug;
use reqwest::Method;

use super::types::{AdviceRequest, AiReply, ChatRequest, PairingRequest, RecognitionResult, RecognizeRequest, WineDescriptionRequest};
use super::{RequestMode, SommelierClient};
use crate::error::Result;
use crate::i18n::Language;
use crate::models::{ConversationTurn, UserProfile};

impl SommelierClient {
    /// Ask for wines that go with `dish`
    pub async fn wine_pairing(
        &self,
        dish: &str,
        preferences: Option<&UserProfile>,
        history: &[ConversationTurn],
    ) -> Result<AiReply> {
        let body = PairingRequest {
            dish,
            user_preferences: preferences,
            language: self.language().await,
            conversation_history: history,
        };
        self.request(Method::POST, "/ai/pairing", Some(&body), RequestMode::Immediate)
            .await
    }

    /// Ask a general wine question
    pub async fn wine_advice(&self, question: &str, history: &[ConversationTurn]) -> Result<AiReply> {
        let body = AdviceRequest {
            question,
            language: self.language().await,
            conversation_history: history,
        };
        self.request(Method::POST, "/ai/advice", Some(&body), RequestMode::Immediate)
            .await
    }

    /// Send one chat message with the prior conversation
    pub async fn chat(&self, message: &str, history: &[ConversationTurn]) -> Result<AiReply> {
        let body = ChatRequest {
            message,
            language: self.language().await,
            conversation_history: Some(history),
        };
        self.request(Method::POST, "/ai/chat", Some(&body), RequestMode::Immediate)
            .await
    }

    /// Identify a wine from a label photo
    pub async fn recognize_wine(&self, image: &[u8]) -> Result<RecognitionResult> {
        let body = RecognizeRequest {
            image_base64: BASE64.encode(image),
        };
        debug!("Sending {} byte label image for recognition", image.len());
        self.request(Method::POST, "/ai/recognize-wine", Some(&body), RequestMode::Immediate)
            .await
    }

    /// Identify a wine from a captured photo on disk
    pub async fn recognize_wine_from_file(&self, path: impl AsRef<Path>) -> Result<RecognitionResult> {
        let image = tokio::fs::read(path.as_ref()).await?;
        self.recognize_wine(&image).await
    }

    /// Generate a short description of a wine.
    ///
    /// `language` overrides the persisted language, e.g. when the UI
    /// detected the label's language.
    pub async fn generate_wine_description(
        &self,
        wine: &WineDescriptionRequest,
        language: Option<Language>,
    ) -> Result<AiReply> {
        let language = match language {
            Some(language) => language,
            None => self.language().await,
        };
        let prompt = wine.prompt(language);
        let body = ChatRequest {
            message: &prompt,
            language,
            conversation_history: None,
        };
        self.request(Method::POST, "/ai/chat", Some(&body), RequestMode::Queued)
            .await
    }
}
