//! Network seam: sending one chat message and getting one reply back.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Default path of the chat endpoint.
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// Why a chat request failed before producing a usable body.
///
/// The `Display` output is shown to the user after
/// `"Network or server error: "`.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("Server error {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The request could not be sent or the body could not be read.
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The body was not valid JSON.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Parsed body of a successful chat response.
///
/// Only non-empty string fields count; anything else is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    /// Reply text from the assistant.
    pub response: Option<String>,
    /// Application error reported by the server.
    pub error: Option<String>,
}

impl ChatReply {
    /// Reply carrying assistant text.
    pub fn response(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            error: None,
        }
    }

    /// Reply carrying a server-reported error.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            response: None,
            error: Some(text.into()),
        }
    }

    /// Extract the reply fields from an arbitrary JSON body.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Self {
            response: field("response"),
            error: field("error"),
        }
    }
}

/// Request body for the chat endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Capability to send one chat message.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `message` and return the parsed reply.
    async fn send(&self, message: &str) -> Result<ChatReply, TransportError>;
}

/// [`ChatTransport`] posting JSON to the FinBot HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `path` on `base_url`.
    pub fn new(base_url: impl AsRef<str>, path: &str) -> Result<Self, TransportError> {
        Self::with_client(base_url, path, reqwest::Client::new())
    }

    /// Create a transport whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl AsRef<str>,
        path: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, path, http)
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        path: &str,
        http: reqwest::Client,
    ) -> Result<Self, TransportError> {
        let endpoint = Url::parse(base_url.as_ref())?.join(path)?;
        Ok(Self { endpoint, http })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, message: &str) -> Result<ChatReply, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        Ok(ChatReply::from_json(&body))
    }
}
