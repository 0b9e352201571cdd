use thiserror::Error;

/// Errors raised while assembling the runtime configuration.
///
/// All of these are fatal at startup: no model call is attempted once one
/// has been returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: set {names} in the environment")]
    MissingCredential { names: String },

    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown persona '{0}'")]
    UnknownPersona(String),
}
