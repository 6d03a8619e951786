use crate::client::builder::GraphQLClientBuilder;
use crate::graphql::{GraphQLRequest, GraphQLResponse};
use crate::transport::{HttpReply, HttpTransport, TransportError};
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde_json::{Map, Value};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

/// Maximum number of body bytes kept on an [`Error::HttpStatus`].
pub const BODY_SNIPPET_LIMIT: usize = 512;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// GraphQL client bound to one endpoint and one credential.
///
/// Configuration is immutable after construction. Clones share the HTTP
/// connection pool, and `execute` may be called concurrently from any number
/// of tasks.
#[derive(Clone)]
pub struct GraphQLClient {
    transport: HttpTransport,
    endpoint: Url,
    auth_header: HeaderValue,
}

impl fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("auth_header", &"<redacted>")
            .finish()
    }
}

impl GraphQLClient {
    pub fn builder() -> GraphQLClientBuilder {
        GraphQLClientBuilder::new()
    }

    pub(crate) fn from_parts(transport: HttpTransport, endpoint: Url, auth_header: HeaderValue) -> Self {
        Self {
            transport,
            endpoint,
            auth_header,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send `query` with optional `variables` and decode the response envelope.
    ///
    /// GraphQL-level errors come back inside `Ok`; only transport failures,
    /// non-2xx statuses and undecodable bodies produce `Err`.
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
    ) -> Result<GraphQLResponse> {
        let request = GraphQLRequest::new(query)?.with_variables(variables);
        self.execute_request(&request).await
    }

    /// Like [`execute`](Self::execute), but gives up as soon as `cancel` fires.
    ///
    /// The in-flight HTTP future is dropped on cancellation, which closes the
    /// connection instead of leaving it to finish in the background.
    pub async fn execute_with_cancel(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
        cancel: &CancellationToken,
    ) -> Result<GraphQLResponse> {
        let request = GraphQLRequest::new(query)?.with_variables(variables);
        self.execute_request_with_cancel(&request, cancel).await
    }

    pub async fn execute_request_with_cancel(
        &self,
        request: &GraphQLRequest,
        cancel: &CancellationToken,
    ) -> Result<GraphQLResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("GraphQL request cancelled");
                Err(Error::Transport(TransportError::Cancelled))
            }
            result = self.execute_request(request) => result,
        }
    }

    pub async fn execute_request(&self, request: &GraphQLRequest) -> Result<GraphQLResponse> {
        let request_id = Uuid::new_v4().to_string();
        let body = serde_json::to_vec(request).map_err(|e| {
            Error::configuration_with_context(
                "failed to serialize GraphQL request",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("graphql_client"),
            )
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }

        debug!(
            request_id = %request_id,
            endpoint = %self.endpoint,
            has_variables = request.variables().is_some(),
            operation = request.operation_name().unwrap_or("-"),
            "sending GraphQL request"
        );

        let reply = self
            .transport
            .post_json(self.endpoint.as_str(), headers, body)
            .await?;

        interpret_reply(reply, &request_id)
    }
}

/// Turn an HTTP reply into a response envelope.
///
/// The status check comes first: a non-2xx reply is an infrastructure or auth
/// failure even if its body happens to be a GraphQL envelope.
fn interpret_reply(reply: HttpReply, request_id: &str) -> Result<GraphQLResponse> {
    if !reply.is_success() {
        warn!(request_id, status = reply.status, "GraphQL endpoint returned non-success status");
        let envelope = serde_json::from_slice::<GraphQLResponse>(&reply.body)
            .ok()
            .filter(|env| env.has_errors() || env.data().is_some());
        return Err(Error::HttpStatus {
            status: reply.status,
            body_snippet: snippet(&reply.body_text(), BODY_SNIPPET_LIMIT),
            envelope,
        });
    }

    // Decoded from the raw bytes: a body that is not valid UTF-8 is not JSON.
    let response: GraphQLResponse = match serde_json::from_slice(&reply.body) {
        Ok(response) => response,
        Err(source) => {
            return Err(Error::Decode {
                source,
                body: reply.body_text(),
            })
        }
    };

    debug!(
        request_id,
        status = reply.status,
        has_data = response.data().is_some(),
        errors = response.errors().len(),
        "GraphQL response decoded"
    );
    Ok(response)
}

fn snippet(body: &str, limit: usize) -> String {
    if body.len() <= limit {
        return body.to_string();
    }
    let mut end = limit;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
