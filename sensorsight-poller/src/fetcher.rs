//! HTTP fetching of raw sensor JSON.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use serde_json::Value;
use tracing::trace;

use crate::config::PollConfig;

/// Classified fetch failure.
///
/// Every variant is recoverable; the poller reports it and retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("Unexpected content type: {0}")]
    BadContentType(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed JSON body: {0}")]
    ParseFailure(String),
}

impl FetchError {
    /// Short machine-friendly kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::Http(_) => "http",
            FetchError::BadContentType(_) => "bad_content_type",
            FetchError::Network(_) => "network",
            FetchError::ParseFailure(_) => "parse_failure",
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::ParseFailure(err.to_string())
        } else {
            FetchError::Network(error_chain(&err))
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Source of raw sensor JSON for a [`Poller`](crate::poller::Poller).
///
/// Dropping the returned future must abort the request.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Fetches sensor JSON over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    check_content_type: bool,
}

impl HttpFetcher {
    /// Create a fetcher for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sensorsight-poller/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
            check_content_type: false,
        })
    }

    /// Create a fetcher from poll settings.
    pub fn from_config(config: &PollConfig) -> Result<Self, FetchError> {
        Ok(Self::new(&config.url, config.timeout())?
            .with_content_type_check(config.check_content_type))
    }

    /// Reject responses that are not JSON-typed.
    pub fn with_content_type_check(mut self, enabled: bool) -> Self {
        self.check_content_type = enabled;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET `url` and decode the body as JSON, giving up after `timeout`.
    ///
    /// The timeout covers connecting, the response head and the body.
    pub async fn fetch_from(&self, url: &str, timeout: Duration) -> Result<Value, FetchError> {
        match tokio::time::timeout(timeout, self.get_json(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        if self.check_content_type {
            let content_type = response.headers().get(CONTENT_TYPE);
            if !is_json_content_type(content_type) {
                let shown = content_type
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("<missing>");
                return Err(FetchError::BadContentType(shown.to_string()));
            }
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        trace!(url = %url, bytes = body.len(), "Received response body");

        serde_json::from_slice(&body).map_err(|e| FetchError::ParseFailure(e.to_string()))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self) -> impl Future<Output = Result<Value, FetchError>> + Send {
        self.fetch_from(&self.url, self.timeout)
    }
}

/// True for `application/json` and `application/*+json`, ignoring parameters and case.
pub fn is_json_content_type(value: Option<&HeaderValue>) -> bool {
    let Some(value) = value.and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let media_type = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    media_type == "application/json"
        || (media_type.starts_with("application/") && media_type.ends_with("+json"))
}
