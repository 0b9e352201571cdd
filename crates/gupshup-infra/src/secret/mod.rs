//! Credential lookup.
//!
//! The Gemini API key comes only from the process environment.

pub mod env;

use secrecy::SecretString;

use gupshup_types::error::ConfigError;

pub use env::EnvSecretProvider;

/// Environment variables checked for the API key, in priority order.
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Resolve the Gemini API key from the environment.
///
/// Blank values are treated as missing.
pub fn resolve_api_key() -> Result<SecretString, ConfigError> {
    resolve_api_key_with(&EnvSecretProvider::new())
}

/// Resolve the API key through `provider`.
pub fn resolve_api_key_with(provider: &EnvSecretProvider) -> Result<SecretString, ConfigError> {
    API_KEY_VARS
        .iter()
        .find_map(|name| {
            let value = provider.get(name)?;
            tracing::debug!(var = %name, "API key found in environment");
            Some(value)
        })
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingCredential {
            names: API_KEY_VARS.join(" or "),
        })
}
