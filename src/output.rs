//! Output rendering for CLI commands.
//!
//! The format is an explicit value built from the parsed flags and handed to
//! every renderer call; nothing here reads global state.

use std::io::Write;

use serde::Serialize;
use serde_json::json;

use crate::cli::Cli;
use crate::graphql::GraphQLResponse;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// Plain text without decoration, for terminals that mangle symbols.
    Plaintext,
    /// JSON for scripting.
    Json,
}

impl OutputFormat {
    pub fn from_flags(json: bool, plaintext: bool) -> Self {
        if json {
            OutputFormat::Json
        } else if plaintext {
            OutputFormat::Plaintext
        } else {
            OutputFormat::Human
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self::from_flags(cli.json, cli.plaintext)
    }

    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// Print the response envelope as received: `data`, `errors`, `extensions`
/// and any other top-level keys, pretty-printed, in every format. Raw values
/// are written back as the server sent them.
pub fn write_response<W: Write>(writer: &mut W, response: &GraphQLResponse) -> Result<()> {
    write_json(writer, response)
}

/// Print an error message in the requested format.
pub fn write_error<W: Write>(writer: &mut W, format: OutputFormat, message: &str) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(writer, &json!({ "error": message }))?,
        OutputFormat::Plaintext => writeln!(writer, "Error: {message}")?,
        OutputFormat::Human => writeln!(writer, "✗ {message}")?,
    }
    Ok(())
}

/// Result of `auth status`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

pub fn write_auth_status<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    status: &AuthStatus,
) -> Result<()> {
    if format.is_json() {
        return write_json(writer, status);
    }
    match (&status.source, format) {
        (Some(source), OutputFormat::Human) => writeln!(writer, "✓ Authenticated via {source}")?,
        (Some(source), _) => writeln!(writer, "Authenticated via {source}")?,
        (None, _) => writeln!(writer, "Not authenticated")?,
    }
    Ok(())
}

/// Print a one-line confirmation (`auth login`, `auth logout`).
pub fn write_message<W: Write>(writer: &mut W, format: OutputFormat, message: &str) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(writer, &json!({ "message": message }))?,
        OutputFormat::Plaintext => writeln!(writer, "{message}")?,
        OutputFormat::Human => writeln!(writer, "✓ {message}")?,
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).map_err(|e| {
        if e.is_io() {
            Error::Io(e.into())
        } else {
            Error::configuration(format!("JSON serialization failed: {e}"))
        }
    })?;
    writeln!(writer)?;
    Ok(())
}
