//! Model gateway implementations.
//!
//! Contains the Gemini implementation of the [`LlmProvider`] trait defined
//! in `gupshup-core`, and a factory ([`create_provider`]) that builds it from
//! [`ModelSettings`].
//!
//! [`LlmProvider`]: gupshup_core::llm::LlmProvider

pub mod gemini;

use secrecy::SecretString;

use gupshup_core::llm::BoxLlmProvider;
use gupshup_types::config::ModelSettings;
use gupshup_types::llm::LlmError;

use self::gemini::GeminiProvider;

/// Create a [`BoxLlmProvider`] for the configured model.
pub fn create_provider(
    settings: &ModelSettings,
    api_key: SecretString,
) -> Result<BoxLlmProvider, LlmError> {
    let provider =
        GeminiProvider::new(api_key, settings.name.clone())?.with_base_url(settings.base_url.clone());
    tracing::debug!(model = %settings.name, base_url = %settings.base_url, "Created Gemini provider");
    Ok(BoxLlmProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_provider_uses_settings() {
        let provider =
            create_provider(&ModelSettings::default(), SecretString::from("test-key")).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert!(provider.capabilities().streaming);
    }
}
