//! Client configuration.
//!
//! Settings are read from a JSON file (or built in code) and then layered with
//! command-line / environment overrides. Only `app_id` and `app_secret` are
//! mandatory; they are optional at parse time so that a file without them can
//! still be completed by overrides, and are enforced by
//! [`FddConfig::credentials`].
//!
//! # Example config
//!
//! ```json
//! {
//!   "app_id": "400123",
//!   "app_secret": "...",
//!   "base_url": "https://api.example.com/api/",
//!   "version": "2.0",
//!   "timeout_secs": 30
//! }
//! ```
//!
//! The camelCase spellings `appId`, `appSecret` and `baseUrl` are accepted as
//! well.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::error::FddError;
use crate::types::Credentials;

/// Configuration for an FDD client instance.
#[derive(Debug, Clone, Deserialize)]
pub struct FddConfig {
    /// Application identifier.
    #[serde(default, alias = "appId")]
    pub app_id: Option<String>,

    /// Shared secret used for digests and the three-element cipher.
    #[serde(default, alias = "appSecret")]
    pub app_secret: Option<String>,

    /// Prefix prepended to every endpoint path (`<base_url><path>.api`).
    #[serde(default, alias = "baseUrl")]
    pub base_url: String,

    /// Protocol version sent as the `v` common parameter.
    #[serde(default = "default_version")]
    pub version: String,

    /// HTTP transport timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FddConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            base_url: String::new(),
            version: default_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FddConfig {
    /// Config with credentials set and everything else defaulted.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            app_secret: Some(app_secret.into()),
            ..Self::default()
        }
    }

    /// Layer explicit values on top of this config. `None` keeps the current
    /// value.
    pub fn with_overrides(
        mut self,
        app_id: Option<String>,
        app_secret: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        if app_id.is_some() {
            self.app_id = app_id;
        }
        if app_secret.is_some() {
            self.app_secret = app_secret;
        }
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }

    /// Validated credentials.
    ///
    /// A missing or empty `app_id` / `app_secret` is a configuration error.
    pub fn credentials(&self) -> Result<Credentials, FddError> {
        let app_id = required(self.app_id.as_deref(), "app_id")?;
        let app_secret = required(self.app_secret.as_deref(), "app_secret")?;
        Ok(Credentials::new(app_id, app_secret))
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, FddError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(FddError::Config(format!("missing required option '{name}'"))),
    }
}

fn default_version() -> String {
    "2.0".into()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Load and parse a JSON config file.
pub fn load_config(path: &Path) -> anyhow::Result<FddConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: FddConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), base_url = %config.base_url, "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let config: FddConfig =
            serde_json::from_str(r#"{"app_id":"400123","app_secret":"s"}"#).unwrap();
        assert_eq!(config.version, "2.0");
        assert_eq!(config.base_url, "");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.credentials().unwrap().app_id(), "400123");
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let config: FddConfig = serde_json::from_str(
            r#"{"appId":"1","appSecret":"2","baseUrl":"https://x/api/","version":"3.0"}"#,
        )
        .unwrap();
        assert_eq!(config.app_id.as_deref(), Some("1"));
        assert_eq!(config.app_secret.as_deref(), Some("2"));
        assert_eq!(config.base_url, "https://x/api/");
        assert_eq!(config.version, "3.0");
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        let no_id: FddConfig = serde_json::from_str(r#"{"app_secret":"s"}"#).unwrap();
        assert!(matches!(no_id.credentials(), Err(FddError::Config(msg)) if msg.contains("app_id")));

        let empty_secret = FddConfig::new("400123", "");
        assert!(matches!(
            empty_secret.credentials(),
            Err(FddError::Config(msg)) if msg.contains("app_secret")
        ));
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let config = FddConfig::new("a", "b").with_overrides(None, Some("c".into()), None);
        assert_eq!(config.app_id.as_deref(), Some("a"));
        assert_eq!(config.app_secret.as_deref(), Some("c"));
        assert_eq!(config.base_url, "");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"app_id":"x","app_secret":"y","timeout_secs":5}}"#).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 5);
    }
}
