//! Configuration file handling for the lbclone CLI
//!
//! Manages loading and saving CLI configuration from ~/.lbclone/config.toml
//! and resolving credentials and connection settings from multiple sources.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "LBCLONE_TOKEN";

/// Environment variable holding the API base URL
pub const BASE_URL_ENV: &str = "LBCLONE_BASE_URL";

/// Environment variable holding the tenant identifier
pub const TENANT_ENV: &str = "LBCLONE_TENANT";

/// Request timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI configuration stored in ~/.lbclone/config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Base URL of the config API, e.g. https://acme.example.com/api/config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Tenant identifier used in manual certificate references
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl CliConfig {
    /// Get the default configuration file path (~/.lbclone/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Unable to determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".lbclone");
        path.push("config.toml");

        Ok(path)
    }

    /// Load configuration from the default path; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Save configuration to a specific path, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Set one key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "token" => self.token = Some(value.to_string()),
            "base_url" => self.base_url = Some(value.to_string()),
            "tenant" => self.tenant = Some(value.to_string()),
            "timeout" => {
                let timeout: u64 =
                    value.parse().context("Invalid timeout value. Must be a number in seconds")?;
                self.timeout = Some(timeout);
            }
            _ => anyhow::bail!(
                "Unknown configuration key: '{}'. Valid keys: token, base_url, tenant, timeout",
                key
            ),
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

fn env_value(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok().as_deref())
}

/// Resolve the API token from multiple sources
///
/// Checks sources in the following priority order:
/// 1. --token command line flag
/// 2. --token-file command line flag
/// 3. ~/.lbclone/config.toml
/// 4. LBCLONE_TOKEN environment variable
pub fn resolve_token(
    token_flag: Option<String>,
    token_file_flag: Option<PathBuf>,
    config: &CliConfig,
) -> Result<String> {
    if let Some(token) = token_flag {
        debug!("Using token from --token flag");
        return Ok(token);
    }

    if let Some(token_file) = token_file_flag {
        debug!("Reading token from file: {}", token_file.display());
        let token = std::fs::read_to_string(&token_file)
            .with_context(|| format!("Failed to read token file: {}", token_file.display()))?
            .trim()
            .to_string();

        if token.is_empty() {
            anyhow::bail!("Token file is empty: {}", token_file.display());
        }

        return Ok(token);
    }

    if let Some(token) = non_empty(config.token.as_deref()) {
        debug!("Using token from config file");
        return Ok(token);
    }

    if let Some(token) = env_value(TOKEN_ENV) {
        debug!("Using token from {} environment variable", TOKEN_ENV);
        return Ok(token);
    }

    anyhow::bail!(
        "No API token found. Please provide a token via:\n\
         - --token flag\n\
         - --token-file flag\n\
         - ~/.lbclone/config.toml\n\
         - {} environment variable",
        TOKEN_ENV
    )
}

/// Resolve the base URL from multiple sources
///
/// Checks sources in the following priority order:
/// 1. --base-url command line flag
/// 2. ~/.lbclone/config.toml
/// 3. LBCLONE_BASE_URL environment variable
///
/// There is no default; every tenant has its own API endpoint.
pub fn resolve_base_url(base_url_flag: Option<String>, config: &CliConfig) -> Result<String> {
    if let Some(url) = non_empty(base_url_flag.as_deref()) {
        debug!("Using base URL from --base-url flag: {}", url);
        return Ok(url);
    }

    if let Some(url) = non_empty(config.base_url.as_deref()) {
        debug!("Using base URL from config file: {}", url);
        return Ok(url);
    }

    if let Some(url) = env_value(BASE_URL_ENV) {
        debug!("Using base URL from {} environment variable: {}", BASE_URL_ENV, url);
        return Ok(url);
    }

    anyhow::bail!(
        "No API base URL found. Please provide one via:\n\
         - --base-url flag\n\
         - ~/.lbclone/config.toml\n\
         - {} environment variable",
        BASE_URL_ENV
    )
}

/// Resolve the tenant identifier; same priority order as the base URL
pub fn resolve_tenant(tenant_flag: Option<String>, config: &CliConfig) -> Result<String> {
    if let Some(tenant) = non_empty(tenant_flag.as_deref()) {
        debug!("Using tenant from --tenant flag: {}", tenant);
        return Ok(tenant);
    }

    if let Some(tenant) = non_empty(config.tenant.as_deref()) {
        debug!("Using tenant from config file: {}", tenant);
        return Ok(tenant);
    }

    if let Some(tenant) = env_value(TENANT_ENV) {
        debug!("Using tenant from {} environment variable: {}", TENANT_ENV, tenant);
        return Ok(tenant);
    }

    anyhow::bail!(
        "A tenant is required with --certificate. Please provide one via:\n\
         - --tenant flag\n\
         - ~/.lbclone/config.toml\n\
         - {} environment variable",
        TENANT_ENV
    )
}

/// Resolve the timeout: --timeout flag, then config file, then 30 seconds
pub fn resolve_timeout(timeout_flag: Option<u64>, config: &CliConfig) -> u64 {
    if let Some(timeout) = timeout_flag {
        debug!("Using timeout from --timeout flag: {} seconds", timeout);
        return timeout;
    }

    if let Some(timeout) = config.timeout {
        debug!("Using timeout from config file: {} seconds", timeout);
        return timeout;
    }

    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated() -> CliConfig {
        CliConfig {
            token: Some("file_token".to_string()),
            base_url: Some("https://acme.example.com/api/config".to_string()),
            tenant: Some("acme-tenant".to_string()),
            timeout: Some(60),
        }
    }

    #[test]
    fn test_config_default() {
        let config = CliConfig::default();
        assert!(config.token.is_none());
        assert!(config.base_url.is_none());
        assert!(config.tenant.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_config_serialization_skips_unset_keys() {
        let config = CliConfig { tenant: Some("acme".to_string()), ..Default::default() };

        let toml_str = toml::to_string(&config).unwrap();
        assert_eq!(toml_str.trim(), "tenant = \"acme\"");
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            token = "test_token"
            base_url = "http://example.com"
            tenant = "acme"
            timeout = 60
        "#;

        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.token.as_deref(), Some("test_token"));
        assert_eq!(config.base_url.as_deref(), Some("http://example.com"));
        assert_eq!(config.tenant.as_deref(), Some("acme"));
        assert_eq!(config.timeout, Some(60));
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = populated();
        config.save_to_path(&config_path).unwrap();
        assert!(config_path.exists());

        let loaded = CliConfig::load_from_path(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = CliConfig::load_from_path(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded, CliConfig::default());
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "timeout = \"soon\"").unwrap();

        let error = CliConfig::load_from_path(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_set_keys() {
        let mut config = CliConfig::default();
        config.set("token", "t").unwrap();
        config.set("base_url", "https://x").unwrap();
        config.set("tenant", "acme").unwrap();
        config.set("timeout", "45").unwrap();

        assert_eq!(
            config,
            CliConfig {
                token: Some("t".to_string()),
                base_url: Some("https://x".to_string()),
                tenant: Some("acme".to_string()),
                timeout: Some(45),
            }
        );
        assert!(config.set("timeout", "soon").is_err());
        assert!(config.set("namespace", "ns-a").is_err());
    }

    #[test]
    fn test_token_flag_wins() {
        let token = resolve_token(Some("flag_token".to_string()), None, &populated()).unwrap();
        assert_eq!(token, "flag_token");
    }

    #[test]
    fn test_token_file_is_trimmed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token");
        std::fs::write(&path, "  file_secret\n").unwrap();

        let token = resolve_token(None, Some(path), &populated()).unwrap();
        assert_eq!(token, "file_secret");
    }

    #[test]
    fn test_empty_token_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token");
        std::fs::write(&path, "\n").unwrap();

        let error = resolve_token(None, Some(path), &populated()).unwrap_err();
        assert!(error.to_string().contains("Token file is empty"));
    }

    #[test]
    fn test_token_from_config_file() {
        assert_eq!(resolve_token(None, None, &populated()).unwrap(), "file_token");
    }

    #[test]
    fn test_base_url_precedence() {
        let config = populated();
        assert_eq!(
            resolve_base_url(Some("https://flag".to_string()), &config).unwrap(),
            "https://flag"
        );
        assert_eq!(
            resolve_base_url(None, &config).unwrap(),
            "https://acme.example.com/api/config"
        );
    }

    #[test]
    fn test_tenant_precedence() {
        let config = populated();
        assert_eq!(resolve_tenant(Some("other".to_string()), &config).unwrap(), "other");
        assert_eq!(resolve_tenant(None, &config).unwrap(), "acme-tenant");
    }

    #[test]
    fn test_timeout_precedence() {
        let config = populated();
        assert_eq!(resolve_timeout(Some(5), &config), 5);
        assert_eq!(resolve_timeout(None, &config), 60);
        assert_eq!(resolve_timeout(None, &CliConfig::default()), DEFAULT_TIMEOUT_SECS);
    }
}
