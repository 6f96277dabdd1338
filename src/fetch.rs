//! HTTP request builder for calls to the Sommelier backend

use std::time::Duration;

use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{ApiError, Error, Result};

/// Helper for building and executing HTTP requests.
///
/// Owns everything it needs so a built request can be moved into the
/// request queue.
#[derive(Debug, Clone)]
pub struct FetchBuilder {
    client: Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl FetchBuilder {
    /// Create a new FetchBuilder
    pub fn new(client: &Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            client: client.clone(),
            url: url.to_string(),
            method,
            headers,
            body: None,
            timeout: None,
        }
    }

    /// Add a header to the request. Values that are not valid header text are skipped.
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => warn!("Dropping invalid value for header {}", name),
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        Ok(self)
    }

    /// Bound the request duration
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the request
    fn build(&self) -> Result<RequestBuilder> {
        let url = Url::parse(&self.url)?;

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        Ok(req)
    }

    /// Execute the request and parse the response as JSON.
    ///
    /// A non-2xx response becomes [`Error::Api`] carrying the JSON error
    /// body, or a synthesized `{"error": "HTTP <status>: <reason>"}` when the
    /// body is not JSON. An empty success body decodes as `null`.
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T> {
        debug!("{} {}", self.method, self.url);
        let req = self.build()?;
        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let api_error = match serde_json::from_slice::<Value>(&bytes) {
                Ok(body) => ApiError::new(status.as_u16(), body),
                Err(_) => ApiError::synthesized(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default(),
                ),
            };
            warn!("{} {} failed: {}", self.method, self.url, api_error);
            return Err(Error::Api(api_error));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    pub fn request(client: &Client, method: Method, url: &str) -> FetchBuilder {
        FetchBuilder::new(client, url, method)
    }
}
