//! Environment variable secret provider.
//!
//! Read-only. Reads the process environment, or a fixed map when built with
//! [`EnvSecretProvider::from_pairs`].

use std::collections::HashMap;

/// Environment variable secret provider.
#[derive(Default)]
pub struct EnvSecretProvider {
    fixed: Option<HashMap<String, String>>,
}

impl EnvSecretProvider {
    /// Provider over the real process environment.
    pub fn new() -> Self {
        Self { fixed: None }
    }

    /// Provider over a fixed set of variables instead of the environment.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fixed: Some(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    /// Value of `key`, or `None` if unset, blank, or not valid Unicode.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match &self.fixed {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        }?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}
