//! Configuration loader for Gupshup.
//!
//! Reads `config.toml` from the data directory (`~/.gupshup/` by default)
//! into [`AppConfig`], then layers command-line overrides on top. A missing
//! file yields the defaults; a file that exists but cannot be read or parsed
//! is an error.

use std::path::{Path, PathBuf};

use gupshup_types::config::AppConfig;
use gupshup_types::error::ConfigError;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "GUPSHUP_DATA_DIR";

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `GUPSHUP_DATA_DIR` environment variable
/// 2. `~/.gupshup`
/// 3. `.gupshup` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".gupshup");
    }

    PathBuf::from(".gupshup")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// The result is not validated; call [`AppConfig::validate`] after applying
/// overrides.
pub async fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Io {
                path: config_path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<AppConfig>(&content).map_err(|err| ConfigError::Parse {
        path: config_path.display().to_string(),
        message: err.to_string(),
    })?;
    tracing::debug!(path = %config_path.display(), "Loaded config.toml");
    Ok(config)
}

/// Values taken from the command line that win over `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub persona: Option<String>,
    pub model: Option<String>,
    pub memory_window: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(persona) = &self.persona {
            config.persona = persona.clone();
        }
        if let Some(model) = &self.model {
            config.model.name = model.clone();
        }
        if let Some(k) = self.memory_window {
            config.memory_window = k;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await.unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
persona = "trip-planner"
memory_window = 8

[model]
temperature = 0.3
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await.unwrap();
        assert_eq!(config.persona, "trip-planner");
        assert_eq!(config.memory_window, 8);
        assert_eq!(config.model.name, "gemini-2.0-flash");
        assert!((config.model.temperature - 0.3).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = load_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn load_config_wrong_type_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "memory_window = \"five\"")
            .await
            .unwrap();

        assert!(load_config(tmp.path()).await.is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let overrides = ConfigOverrides {
            persona: Some("trip-planner".to_string()),
            model: Some("gemini-2.5-flash".to_string()),
            memory_window: Some(2),
        };
        let config = overrides.apply(AppConfig::default());
        assert_eq!(config.persona, "trip-planner");
        assert_eq!(config.model.name, "gemini-2.5-flash");
        assert_eq!(config.memory_window, 2);
    }

    #[test]
    fn empty_overrides_keep_config() {
        let config = ConfigOverrides::default().apply(AppConfig::default());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn override_to_zero_window_fails_validation() {
        let overrides = ConfigOverrides {
            memory_window: Some(0),
            ..Default::default()
        };
        assert!(overrides.apply(AppConfig::default()).validate().is_err());
    }
}
