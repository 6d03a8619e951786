use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Tunables for the underlying HTTP client.
///
/// `from_env` reads `LINCTL_HTTP_TIMEOUT_SECS`, `LINCTL_HTTP_CONNECT_TIMEOUT_SECS`
/// and `LINCTL_PROXY_URL`; explicit builder values win over the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub proxy_url: Option<String>,
    pub user_agent: String,
}

impl TransportConfig {
    pub fn from_env() -> Self {
        let timeout_secs = env_u64("LINCTL_HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS);
        let connect_secs =
            env_u64("LINCTL_HTTP_CONNECT_TIMEOUT_SECS").unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        Self {
            timeout: Duration::from_secs(timeout_secs.max(1)),
            connect_timeout: Duration::from_secs(connect_secs.max(1)),
            proxy_url: env::var("LINCTL_PROXY_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            proxy_url: None,
            user_agent: default_user_agent(),
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|s| s.trim().parse::<u64>().ok())
}

fn default_user_agent() -> String {
    format!("linctl/{}", env!("CARGO_PKG_VERSION"))
}

/// Status and fully-read body of one HTTP exchange. The body is kept as the
/// bytes the server sent.
#[derive(Debug)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text for diagnostics; invalid UTF-8 is replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Thin wrapper over a shared `reqwest::Client`. Cloning is cheap and clones
/// share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str());

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    "invalid proxy URL",
                    ErrorContext::new()
                        .with_field_path("LINCTL_PROXY_URL")
                        .with_details(e.to_string())
                        .with_source("transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                "failed to create HTTP client",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("transport"),
            )
        })?;

        Ok(Self { client })
    }

    /// Use a caller-supplied `reqwest::Client` (shared pools, custom TLS).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// POST a JSON body and read the whole response body, whatever the status.
    pub async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> std::result::Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!(status, bytes = bytes.len(), "response body read");

        Ok(HttpReply {
            status,
            body: bytes.to_vec(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_timeout())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_success_range() {
        let ok = HttpReply {
            status: 204,
            body: Vec::new(),
        };
        let redirect = HttpReply {
            status: 301,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn body_text_replaces_invalid_utf8() {
        let reply = HttpReply {
            status: 502,
            body: b"bad \xFF gateway".to_vec(),
        };
        assert_eq!(reply.body_text(), "bad \u{FFFD} gateway");
    }

    #[test]
    fn default_config_has_user_agent() {
        let cfg = TransportConfig::default();
        assert!(cfg.user_agent.starts_with("linctl/"));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.proxy_url.is_none());
    }
}
