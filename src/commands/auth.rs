//! `linctl auth`: store, remove and inspect the credential.

use std::io::Write;

use crate::auth::{ChainAuth, KeyringAuth};
use crate::cli::AuthCommands;
use crate::commands::CommandStatus;
use crate::output::{self, AuthStatus, OutputFormat};
use crate::resolve::QueryInput;
use crate::{Error, ErrorContext, Result};

pub struct AuthCommand {
    keyring: KeyringAuth,
    chain: ChainAuth,
}

impl AuthCommand {
    pub fn new(keyring: KeyringAuth, chain: ChainAuth) -> Self {
        Self { keyring, chain }
    }

    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: OutputFormat,
        command: &AuthCommands,
        input: &mut dyn QueryInput,
    ) -> Result<CommandStatus> {
        match command {
            AuthCommands::Login { token } => {
                let token = read_token(token.as_deref(), input)?;
                self.keyring.store(&token)?;
                output::write_message(writer, format, "Credential stored in keyring")?;
                Ok(CommandStatus::Success)
            }
            AuthCommands::Logout => {
                let message = if self.keyring.clear()? {
                    "Credential removed from keyring"
                } else {
                    "No stored credential"
                };
                output::write_message(writer, format, message)?;
                Ok(CommandStatus::Success)
            }
            AuthCommands::Status => {
                let source = self.chain.resolve()?.map(|(_, source)| source);
                let status = AuthStatus {
                    authenticated: source.is_some(),
                    source,
                };
                output::write_auth_status(writer, format, &status)?;
                Ok(if status.authenticated {
                    CommandStatus::Success
                } else {
                    CommandStatus::Unauthenticated
                })
            }
        }
    }
}

fn read_token(flag: Option<&str>, input: &mut dyn QueryInput) -> Result<String> {
    let raw = match flag {
        Some(token) => token.to_string(),
        None if input.is_terminal() => String::new(),
        None => input.read_all()?,
    };
    let token = raw.trim();
    if token.is_empty() {
        return Err(Error::credential_with_context(
            "token is required (--token or stdin)",
            ErrorContext::new()
                .with_field_path("token")
                .with_source("auth_login"),
        ));
    }
    Ok(token.to_string())
}
