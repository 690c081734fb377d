//! Configuration Management
//!
//! Tenant and transport settings for idpsync, read from
//! `<config_dir>/idpsync/config.yaml` (or `config.json`) and overridden by
//! `IDPSYNC_*` environment variables.

use crate::mgmt::{ClientSettings, Credentials};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File names looked up in the config directory, in order
const CONFIG_FILES: &[&str] = &["config.yaml", "config.yml", "config.json"];

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_rate_limit_fallback_ms() -> u64 {
    1000
}

fn default_operation_timeout_secs() -> u64 {
    300
}

/// User configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tenant domain, e.g. `example.eu.auth0.com`
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Pre-issued management token; takes precedence over client credentials
    #[serde(default)]
    pub api_token: Option<String>,
    /// Defaults to the tenant's management API
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_rate_limit_fallback_ms")]
    pub rate_limit_fallback_ms: u64,
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: None,
            client_id: None,
            client_secret: None,
            api_token: None,
            audience: None,
            request_timeout_secs: default_request_timeout_secs(),
            rate_limit_fallback_ms: default_rate_limit_fallback_ms(),
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("api_token", &redact(&self.api_token))
            .field("audience", &self.audience)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("rate_limit_fallback_ms", &self.rate_limit_fallback_ms)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Get the config directory
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("idpsync"))
    }

    /// Load configuration from disk, then apply environment overrides.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self> {
        let from_disk = match Self::config_dir().and_then(|dir| Self::find_file(&dir)) {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        Ok(from_disk.with_env(|key| std::env::var(key).ok()))
    }

    fn find_file(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Parse one config file, YAML or JSON by extension
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let config = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?
        };
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Override fields from `IDPSYNC_*` variables as returned by `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let targets: [(&str, &mut Option<String>); 5] = [
            ("IDPSYNC_DOMAIN", &mut self.domain),
            ("IDPSYNC_CLIENT_ID", &mut self.client_id),
            ("IDPSYNC_CLIENT_SECRET", &mut self.client_secret),
            ("IDPSYNC_API_TOKEN", &mut self.api_token),
            ("IDPSYNC_AUDIENCE", &mut self.audience),
        ];
        for (key, target) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *target = Some(value);
            }
        }
        self
    }

    /// The validated tenant domain
    pub fn effective_domain(&self) -> Result<&str> {
        let domain = self
            .domain
            .as_deref()
            .context("no tenant domain configured (set `domain` or IDPSYNC_DOMAIN)")?;
        validate_domain(domain)?;
        Ok(domain)
    }

    /// Endpoint and transport settings for the configured tenant
    pub fn client_settings(&self) -> Result<ClientSettings> {
        let mut settings = ClientSettings::for_domain(self.effective_domain()?)
            .context("failed to derive API endpoints")?;
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        settings.rate_limit_fallback = Duration::from_millis(self.rate_limit_fallback_ms);
        Ok(settings)
    }

    /// Static token if present, else the client-credentials grant
    pub fn credentials(&self, settings: &ClientSettings) -> Result<Credentials> {
        if let Some(token) = &self.api_token {
            return Ok(Credentials::StaticToken(token.clone()));
        }
        match (&self.client_id, &self.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Credentials::ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                audience: self
                    .audience
                    .clone()
                    .unwrap_or_else(|| settings.default_audience()),
            }),
            _ => bail!("no credentials configured (set api_token, or client_id and client_secret)"),
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// A bare hostname: no scheme, path, port or whitespace
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() {
        bail!("tenant domain is empty");
    }
    if domain.contains("://") {
        bail!("tenant domain {domain:?} must not include a scheme");
    }
    let valid = domain
        .split('.')
        .all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if !valid {
        bail!("tenant domain {domain:?} is not a valid hostname");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("domain: tenant.example.com\n").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.rate_limit_fallback_ms, 1000);
        assert_eq!(config.operation_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("IDPSYNC_DOMAIN", "env.example.com"),
            ("IDPSYNC_API_TOKEN", "tok"),
            ("IDPSYNC_CLIENT_ID", ""),
        ]);
        let config = Config {
            domain: Some("file.example.com".into()),
            client_id: Some("file-client".into()),
            ..Config::default()
        }
        .with_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.domain.as_deref(), Some("env.example.com"));
        assert_eq!(config.api_token.as_deref(), Some("tok"));
        assert_eq!(config.client_id.as_deref(), Some("file-client"));
    }

    #[test]
    fn test_domain_validation() {
        assert!(validate_domain("tenant.eu.auth0.com").is_ok());
        assert!(validate_domain("https://tenant.eu.auth0.com").is_err());
        assert!(validate_domain("tenant.eu.auth0.com/api").is_err());
        assert!(validate_domain("tenant..com").is_err());
        assert!(validate_domain("").is_err());
    }

    #[test]
    fn test_credentials_prefer_static_token() {
        let config = Config {
            domain: Some("tenant.example.com".into()),
            api_token: Some("tok".into()),
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            ..Config::default()
        };
        let settings = config.client_settings().unwrap();
        assert!(matches!(
            config.credentials(&settings).unwrap(),
            Credentials::StaticToken(t) if t == "tok"
        ));
    }

    #[test]
    fn test_client_credentials_default_audience() {
        let config = Config {
            domain: Some("tenant.example.com".into()),
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            ..Config::default()
        };
        let settings = config.client_settings().unwrap();
        match config.credentials(&settings).unwrap() {
            Credentials::ClientCredentials { audience, .. } => {
                assert_eq!(audience, "https://tenant.example.com/api/v2/");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config {
            domain: Some("tenant.example.com".into()),
            ..Config::default()
        };
        let settings = config.client_settings().unwrap();
        assert!(config.credentials(&settings).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            client_secret: Some("hunter2".into()),
            ..Config::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
