use crate::client::core::GraphQLClient;
use crate::transport::{HttpTransport, TransportConfig};
use crate::{Error, ErrorContext, Result};
use reqwest::header::HeaderValue;
use std::time::Duration;
use url::Url;

/// Linear's public GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

/// Builder for [`GraphQLClient`].
///
/// Keep this surface area small: endpoint, credential, and a couple of
/// transport knobs. Everything else comes from [`TransportConfig::from_env`].
#[derive(Default)]
pub struct GraphQLClientBuilder {
    endpoint: Option<String>,
    auth_header: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl GraphQLClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// GraphQL endpoint URL. Defaults to [`DEFAULT_ENDPOINT`].
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Full `Authorization` header value, sent verbatim. Normalizing a raw
    /// token is the job of [`crate::auth::header_value`].
    pub fn auth_header(mut self, value: impl Into<String>) -> Self {
        self.auth_header = Some(value.into());
        self
    }

    /// Overall request deadline; overrides `LINCTL_HTTP_TIMEOUT_SECS`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Reuse an existing `reqwest::Client`. Timeout, proxy and user-agent
    /// settings on this builder are then ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<GraphQLClient> {
        let raw_endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = parse_endpoint(&raw_endpoint)?;

        let auth = self.auth_header.ok_or_else(|| {
            Error::configuration_with_context(
                "an Authorization header value is required",
                ErrorContext::new()
                    .with_field_path("auth_header")
                    .with_source("client_builder"),
            )
        })?;
        // The value itself is never echoed back in the error.
        let mut auth_header = HeaderValue::from_str(&auth).map_err(|_| {
            Error::configuration_with_context(
                "Authorization header value contains invalid characters",
                ErrorContext::new()
                    .with_field_path("auth_header")
                    .with_source("client_builder"),
            )
        })?;
        auth_header.set_sensitive(true);

        let transport = match self.http_client {
            Some(client) => HttpTransport::from_client(client),
            None => {
                let mut config = TransportConfig::from_env();
                if let Some(timeout) = self.timeout {
                    config.timeout = timeout;
                }
                if let Some(ua) = self.user_agent {
                    config.user_agent = ua;
                }
                HttpTransport::new(&config)?
            }
        };

        Ok(GraphQLClient::from_parts(transport, endpoint, auth_header))
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        Error::configuration_with_context(
            "invalid endpoint URL",
            ErrorContext::new()
                .with_field_path("endpoint")
                .with_details(format!("{raw}: {e}"))
                .with_source("client_builder"),
        )
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::configuration_with_context(
            "endpoint must use http or https",
            ErrorContext::new()
                .with_field_path("endpoint")
                .with_details(format!("scheme '{other}'"))
                .with_source("client_builder"),
        )),
    }
}
