//! In-memory chat with the AI sommelier

use log::warn;

use crate::api::SommelierClient;
use crate::error::Result;
use crate::i18n::Localizer;
use crate::models::{ChatMessage, ConversationTurn};

/// One conversation. Messages live only as long as the session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    localizer: Localizer,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Start a conversation with the localized welcome message
    pub fn new(localizer: Localizer) -> Self {
        let messages = vec![ChatMessage::assistant(localizer.t("chat.welcome"))];
        Self { localizer, messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    /// Send `text` and append the reply.
    ///
    /// Blank input is ignored. When the backend cannot be reached an apology
    /// is appended and the error is still returned so the caller can alert.
    pub async fn send(&mut self, client: &SommelierClient, text: &str) -> Result<Option<&ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let history: Vec<ConversationTurn> = self.messages.iter().map(ConversationTurn::from).collect();
        self.messages.push(ChatMessage::user(text));

        let reply = match client.chat(text, &history).await {
            Ok(reply) => reply
                .text()
                .map(str::to_string)
                .unwrap_or_else(|| self.localizer.t("chat.fallback")),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                self.messages
                    .push(ChatMessage::assistant(self.localizer.t("chat.connectionError")));
                return Err(e);
            }
        };

        self.messages.push(ChatMessage::assistant(reply));
        Ok(self.messages.last())
    }

    /// Forget the conversation, keeping a fresh welcome message
    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage::assistant(self.localizer.t("chat.welcome"))];
    }
}
