//! Configuration options for the Sommelier client

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::i18n::Language;

/// Backend origin used by every build of the app
pub const DEFAULT_BASE_URL: &str = "https://sommelier-backend-app.azurewebsites.net";

/// Pause between two queued requests
pub const DEFAULT_QUEUE_DELAY: Duration = Duration::from_millis(50);

/// Configuration options for the Sommelier client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The backend origin, without a trailing slash
    pub base_url: String,

    /// Delay the queue worker waits after each queued request
    pub queue_delay: Duration,

    /// The request timeout. `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,

    /// Language used when none has been persisted yet
    pub default_language: Language,

    /// Value of the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            queue_delay: DEFAULT_QUEUE_DELAY,
            request_timeout: None,
            default_language: Language::En,
            client_info: format!("sommelier-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Load options from `SOMMELIER_API_URL` and `SOMMELIER_QUEUE_DELAY_MS`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(url) = std::env::var("SOMMELIER_API_URL") {
            options = options.with_base_url(&url)?;
        }

        if let Ok(delay) = std::env::var("SOMMELIER_QUEUE_DELAY_MS") {
            let millis = delay.parse::<u64>().map_err(|_| {
                Error::config(format!("SOMMELIER_QUEUE_DELAY_MS is not a number: {}", delay))
            })?;
            options = options.with_queue_delay(Duration::from_millis(millis));
        }

        Ok(options)
    }

    /// Set the backend origin. The URL must parse and use http or https.
    pub fn with_base_url(mut self, value: &str) -> Result<Self> {
        let url = Url::parse(value)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::config(format!("unsupported scheme: {}", url.scheme())));
        }
        self.base_url = value.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the delay between queued requests
    pub fn with_queue_delay(mut self, value: Duration) -> Self {
        self.queue_delay = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the fallback language
    pub fn with_default_language(mut self, value: Language) -> Self {
        self.default_language = value;
        self
    }

    /// Set the client info header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}
