use anyhow::{anyhow, Result};
use std::env;

pub trait ProviderConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self>
    where
        Self: Sized;

    /// Helper function to get environment variables with error handling
    fn get_env(key: &str, required: bool, default: Option<String>) -> Result<Option<String>> {
        if required {
            return Self::require_env(key).map(Some);
        }
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            Ok(_) | Err(env::VarError::NotPresent) => Ok(default),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `get_env` for a variable that has no fallback
    fn require_env(key: &str) -> Result<String> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            Ok(_) | Err(env::VarError::NotPresent) => Err(anyhow!(
                "Environment variable '{}' is required but not set.",
                key
            )),
            Err(e) => Err(e.into()),
        }
    }
}
