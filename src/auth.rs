//! Credential lookup for the `Authorization` header.
//!
//! The GraphQL client treats the header value as opaque; this module only
//! decides where it comes from. Lookups never log the credential.

use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use std::env;
use tracing::debug;

/// Environment variable holding a Linear API key or OAuth token.
pub const API_KEY_ENV: &str = "LINEAR_API_KEY";
/// Set to `1` to skip the OS keyring entirely.
pub const DISABLE_KEYRING_ENV: &str = "LINCTL_DISABLE_KEYRING";

const KEYRING_SERVICE: &str = "linctl";
const KEYRING_USER: &str = "default";
const PERSONAL_KEY_PREFIX: &str = "lin_api_";

/// Supplies the `Authorization` header value, if one is available.
pub trait AuthHeaderProvider: Send + Sync {
    /// `Ok(None)` means "no credential here"; `Err` means the lookup itself broke.
    fn auth_header(&self) -> Result<Option<String>>;

    /// Short human-readable name of where the credential comes from.
    fn describe(&self) -> String;
}

/// Build a header value from a bare token.
///
/// Linear personal API keys are sent as-is; anything else is treated as an
/// OAuth access token.
pub fn header_value(token: &str) -> String {
    let token = token.trim();
    if token.starts_with(PERSONAL_KEY_PREFIX) || token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

/// Reads the token from an environment variable.
pub struct EnvAuth {
    var: String,
}

impl EnvAuth {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvAuth {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl AuthHeaderProvider for EnvAuth {
    fn auth_header(&self) -> Result<Option<String>> {
        Ok(env::var(&self.var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| header_value(&v)))
    }

    fn describe(&self) -> String {
        self.var.clone()
    }
}

/// Token stored in the OS keyring.
pub struct KeyringAuth {
    service: String,
    user: String,
}

impl KeyringAuth {
    pub fn new(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.user).map_err(|e| self.error("cannot open keyring entry", e))
    }

    fn error(&self, msg: &str, e: keyring::Error) -> Error {
        Error::credential_with_context(
            msg,
            ErrorContext::new()
                .with_field_path(format!("{}/{}", self.service, self.user))
                .with_details(e.to_string())
                .with_source("keyring"),
        )
    }

    /// Save a token, replacing any previous one.
    pub fn store(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token.trim())
            .map_err(|e| self.error("cannot store credential", e))
    }

    /// Remove the stored token. Returns `false` when there was nothing to remove.
    pub fn clear(&self) -> Result<bool> {
        match self.entry()?.delete_password() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(self.error("cannot remove credential", e)),
        }
    }
}

impl Default for KeyringAuth {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_USER)
    }
}

impl AuthHeaderProvider for KeyringAuth {
    fn auth_header(&self) -> Result<Option<String>> {
        let entry = match self.entry() {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "keyring unavailable");
                return Ok(None);
            }
        };
        match entry.get_password() {
            Ok(token) if !token.trim().is_empty() => Ok(Some(header_value(&token))),
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
            // No secret service on headless machines; treat as "nothing stored".
            Err(keyring::Error::PlatformFailure(e)) | Err(keyring::Error::NoStorageAccess(e)) => {
                debug!(error = %e, "keyring backend unavailable");
                Ok(None)
            }
            Err(e) => Err(self.error("cannot read credential", e)),
        }
    }

    fn describe(&self) -> String {
        format!("keyring ({}/{})", self.service, self.user)
    }
}

/// A fixed header value.
pub struct StaticAuth(String);

impl StaticAuth {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AuthHeaderProvider for StaticAuth {
    fn auth_header(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Tries each provider in order and returns the first credential found.
pub struct ChainAuth {
    providers: Vec<Box<dyn AuthHeaderProvider>>,
}

impl ChainAuth {
    pub fn new(providers: Vec<Box<dyn AuthHeaderProvider>>) -> Self {
        Self { providers }
    }

    /// Environment first, then the OS keyring unless `LINCTL_DISABLE_KEYRING=1`.
    pub fn from_env() -> Self {
        let mut providers: Vec<Box<dyn AuthHeaderProvider>> = vec![Box::new(EnvAuth::default())];
        if env::var(DISABLE_KEYRING_ENV).ok().as_deref() != Some("1") {
            providers.push(Box::new(KeyringAuth::default()));
        }
        Self::new(providers)
    }

    /// First credential found, with the name of the provider that had it.
    pub fn resolve(&self) -> Result<Option<(String, String)>> {
        for provider in &self.providers {
            if let Some(value) = provider.auth_header()? {
                debug!(source = %provider.describe(), "credential found");
                return Ok(Some((value, provider.describe())));
            }
        }
        Ok(None)
    }

    /// Like [`resolve`](Self::resolve) but a missing credential is an error.
    pub fn require(&self) -> Result<String> {
        self.resolve()?
            .map(|(value, _)| value)
            .ok_or(Error::NotAuthenticated)
    }
}
