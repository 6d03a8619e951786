use crate::graphql::GraphQLResponse;
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Structured error context for configuration and credential failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Setting or flag that caused the error (e.g., "endpoint", "LINEAR_API_KEY")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "keyring")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an empty query came from. Selects the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    /// Positional arguments (or a request built in code) were blank.
    Argument,
    /// Standard input was piped but held only whitespace.
    Stdin,
    /// No arguments and standard input is an interactive terminal.
    Missing,
}

impl fmt::Display for QueryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOrigin::Argument => write!(f, "query is required"),
            QueryOrigin::Stdin => write!(f, "query from stdin is empty"),
            QueryOrigin::Missing => write!(f, "query is required (argument or stdin)"),
        }
    }
}

/// Unified error type for linctl.
///
/// GraphQL-level errors (the `errors` array of a successful response) are
/// deliberately absent: they are data, carried by [`GraphQLResponse`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("{origin}")]
    EmptyQuery { origin: QueryOrigin },

    #[error("failed to parse variables JSON: {0}")]
    InvalidVariablesJson(#[source] serde_json::Error),

    #[error("GraphQL request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("GraphQL request failed: HTTP {status}: {}", describe_status_body(.body_snippet, .envelope.as_ref()))]
    HttpStatus {
        status: u16,
        body_snippet: String,
        envelope: Option<GraphQLResponse>,
    },

    #[error("failed to decode GraphQL response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Not authenticated. Run 'linctl auth login' first.")]
    NotAuthenticated,

    #[error("Credential error: {message}{}", format_context(.context))]
    Credential {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

// Prefer the server's own GraphQL error message over the raw body when the
// non-2xx body happened to be a well-formed envelope.
fn describe_status_body(snippet: &str, envelope: Option<&GraphQLResponse>) -> String {
    match envelope.and_then(|env| env.errors().first()) {
        Some(first) => first.message.clone(),
        None if snippet.trim().is_empty() => "<empty body>".to_string(),
        None => snippet.trim().to_string(),
    }
}

impl Error {
    pub fn empty_query(origin: QueryOrigin) -> Self {
        Error::EmptyQuery { origin }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn credential_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Credential {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Credential { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// HTTP status for [`Error::HttpStatus`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body for errors that carry one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::HttpStatus { body_snippet, .. } => Some(body_snippet),
            Error::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// True when the failure was caused by the caller's input rather than the
    /// network or the server.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyQuery { .. } | Error::InvalidVariablesJson(_) | Error::NotAuthenticated
        )
    }

    /// Process exit status for this error. Every core failure is terminal.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
