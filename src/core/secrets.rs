//! Secret provider contract

use crate::core::error::{Result, TrackerError};

pub const SECRET_TOKEN_MARKETSTACK: &str = "SECRET_TOKEN_MARKETSTACK";

/// Supplies API tokens and other credentials. A missing secret is fatal to
/// the caller.
pub trait SecretStore: Send + Sync {
    fn get_secret(&self, name: &str) -> Result<String>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Default)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get_secret(&self, name: &str) -> Result<String> {
        std::env::var(name).map_err(|_| TrackerError::Secret {
            name: name.to_string(),
        })
    }
}
