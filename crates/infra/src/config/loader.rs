//! Configuration loader
//!
//! Loads gateway configuration from a file, then applies environment
//! overrides and validates the result.
//!
//! ## Loading Strategy
//! 1. Use the file named by `SSOGATE_CONFIG` if set
//! 2. Otherwise probe the standard locations
//! 3. Fall back to built-in defaults (no providers) if nothing is found
//! 4. Apply environment overrides
//! 5. Validate providers and origins
//!
//! ## Environment Variables
//! - `SSOGATE_CONFIG`: Path to a JSON or TOML config file
//! - `SSOGATE_BIND_ADDR`: Socket address for the HTTP surface
//! - `SSOGATE_PUBLIC_ORIGIN`: Public origin overriding request headers
//! - `SSOGATE_STATE_SECRET`: State token signing key
//! - `SSOGATE_HTTP_TIMEOUT_SECS`: Outbound HTTP timeout in seconds
//! - `SSOGATE_DISCOVERY_CACHE_TTL_SECS`: Discovery cache TTL in seconds
//! - `SSOGATE_DEFAULT_ALLOWED_ORIGINS`: Comma separated redirect origins
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./ssogate.toml` or `./ssogate.json` (current working directory)
//! 2. `./config/ssogate.toml` or `./config/ssogate.json`
//! 3. Relative to executable location

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ssogate_common::{FieldValidator, IssuerUrlValidator, UrlValidator};
use ssogate_domain::{AppConfig, Result, SecretString, SsoError};

const CONFIG_FILE_NAMES: &[&str] =
    &["ssogate.toml", "ssogate.json", "config/ssogate.toml", "config/ssogate.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `SsoError::Config` if:
/// - `SSOGATE_CONFIG` names a missing or unreadable file
/// - File format is invalid
/// - An environment override does not parse
/// - Validation fails
pub fn load() -> Result<AppConfig> {
    let mut config = match std::env::var_os("SSOGATE_CONFIG") {
        Some(path) => read_file(Some(PathBuf::from(path)))?,
        None => match probe_config_paths() {
            Some(path) => read_file(Some(path))?,
            None => {
                tracing::warn!("No config file found; starting with no providers");
                AppConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    tracing::info!(
        providers = config.sso.providers.len(),
        allowed_origins = config.sso.default_allowed_origins.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Load and validate configuration from a file, without environment
/// overrides.
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SsoError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = read_file(path)?;
    validate(&config)?;
    Ok(config)
}

fn read_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SsoError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SsoError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SsoError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `SsoError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SsoError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SsoError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SsoError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard paths for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Apply `SSOGATE_*` environment overrides in place.
///
/// # Errors
/// Returns `SsoError::Config` when a numeric override does not parse.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Some(addr) = env_opt("SSOGATE_BIND_ADDR") {
        config.server.bind_addr = addr;
    }
    if let Some(origin) = env_opt("SSOGATE_PUBLIC_ORIGIN") {
        config.server.public_origin = Some(origin);
    }
    if let Some(secret) = env_opt("SSOGATE_STATE_SECRET") {
        config.server.state_secret = Some(SecretString::new(secret));
    }
    if let Some(timeout) = env_parse::<u64>("SSOGATE_HTTP_TIMEOUT_SECS")? {
        config.server.http_timeout_secs = timeout;
    }
    if let Some(ttl) = env_parse::<u64>("SSOGATE_DISCOVERY_CACHE_TTL_SECS")? {
        config.server.discovery_cache_ttl_secs = ttl;
    }
    if let Some(origins) = env_opt("SSOGATE_DEFAULT_ALLOWED_ORIGINS") {
        config.sso.default_allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
    }
    Ok(())
}

/// Check the loaded configuration.
///
/// # Errors
/// Returns `SsoError::Config` naming the first offending provider or origin.
pub fn validate(config: &AppConfig) -> Result<()> {
    let issuer_validator = IssuerUrlValidator;
    let url_validator = UrlValidator::new();
    let mut seen = HashSet::new();

    for provider in &config.sso.providers {
        if provider.id.trim().is_empty() {
            return Err(SsoError::Config("Provider id must not be empty".to_string()));
        }
        if !seen.insert(provider.id.as_str()) {
            return Err(SsoError::Config(format!("Duplicate provider id '{}'", provider.id)));
        }
        if provider.client_id.trim().is_empty() {
            return Err(SsoError::Config(format!(
                "Provider '{}' is missing a client id",
                provider.id
            )));
        }
        if let Some(issuer) = &provider.issuer {
            issuer_validator
                .validate(issuer.as_str())
                .map_err(|reason| SsoError::Config(format!("Provider '{}': {reason}", provider.id)))?;
        }
        for endpoint in [&provider.authorization_endpoint, &provider.token_endpoint, &provider.jwks_uri]
            .into_iter()
            .flatten()
        {
            url_validator.validate(endpoint.as_str()).map_err(|reason| {
                SsoError::Config(format!("Provider '{}' endpoint '{endpoint}': {reason}", provider.id))
            })?;
        }
        if provider.authorization_rules.is_empty() {
            tracing::warn!(
                provider_id = %provider.id,
                "Provider has no authorization rules; every login will be denied"
            );
        }
    }

    for origin in &config.sso.default_allowed_origins {
        url_validator
            .validate(origin.as_str())
            .map_err(|reason| SsoError::Config(format!("Allowed origin '{origin}': {reason}")))?;
    }

    if let Some(origin) = &config.server.public_origin {
        url_validator
            .validate(origin.as_str())
            .map_err(|reason| SsoError::Config(format!("Public origin '{origin}': {reason}")))?;
    }

    Ok(())
}

/// Non-empty environment variable value
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `SsoError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| SsoError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
