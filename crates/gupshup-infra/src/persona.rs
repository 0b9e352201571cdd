//! Persona file loader.
//!
//! A persona file is a TOML document with the same fields as
//! [`Persona`]; `tagline` and `input_placeholder` are optional.

use std::path::Path;

use gupshup_types::error::ConfigError;
use gupshup_types::persona::Persona;

/// Load and sanity-check a persona from a TOML file.
pub async fn load_persona_file(path: &Path) -> Result<Persona, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

    let persona: Persona = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;

    if persona.slug.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{}: slug must not be empty",
            path.display()
        )));
    }
    if persona.system_prompt.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{}: system_prompt must not be empty",
            path.display()
        )));
    }

    tracing::debug!(slug = %persona.slug, path = %path.display(), "Loaded persona file");
    Ok(persona)
}
