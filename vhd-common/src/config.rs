//! Configuration loading and backend address resolution
//!
//! Two pieces of configuration are shared by the VHD binaries:
//! 1. **TOML Bootstrap**: port, sound directory, upload limit, logging
//! 2. **Backend address**: resolved in priority order
//!
//! # Backend Address Priority
//!
//! 1. Command-line argument (highest priority)
//! 2. `VHD_API_URL` environment variable
//! 3. `backend_url` in the TOML config file
//! 4. Compiled default `http://localhost:8001`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Compiled default backend address
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// Environment variable holding the backend address
pub const BACKEND_URL_ENV: &str = "VHD_API_URL";

/// Environment variable pointing at a TOML config file
pub const CONFIG_PATH_ENV: &str = "VHD_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file; missing keys take built-in defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Classification backend base address
    #[serde(default)]
    pub backend_url: Option<String>,

    /// HTTP server port for vhd-proxy
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface vhd-proxy binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Directory holding the bundled example recordings
    #[serde(default = "default_sound_dir")]
    pub sound_dir: PathBuf,

    /// Maximum accepted upload body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Outbound request timeout; `None` keeps the HTTP client default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_sound_dir() -> PathBuf {
    PathBuf::from("public/sound")
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            port: default_port(),
            bind_address: default_bind_address(),
            sound_dir: default_sound_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            request_timeout_secs: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Platform config file location (`<config dir>/vhd/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vhd").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load bootstrap configuration, falling back to defaults
///
/// An explicitly requested file (CLI argument or `VHD_CONFIG`) must exist and
/// parse. The platform default location is optional: when absent, built-in
/// defaults are used.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    let explicit = cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        info!("Loading configuration from {}", path.display());
        return load_toml_config(&path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        _ => {
            warn!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the backend base address (CLI → ENV → TOML → default)
pub fn resolve_backend_url(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return normalize_base_url(url);
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
        if !url.trim().is_empty() {
            return normalize_base_url(&url);
        }
    }

    // Priority 3: TOML config file
    if let Some(url) = &toml_config.backend_url {
        return normalize_base_url(url);
    }

    // Priority 4: compiled default
    Ok(DEFAULT_BACKEND_URL.to_string())
}

/// Validate an http(s) base address and strip trailing slashes
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');

    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            Error::Config(format!("Base URL must start with http:// or https://: {}", url))
        })?;

    if host.is_empty() {
        return Err(Error::Config(format!("Base URL has no host: {}", url)));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:8001/").unwrap(),
            "http://localhost:8001"
        );
        assert_eq!(
            normalize_base_url(" https://vhd.example.org/api// ").unwrap(),
            "https://vhd.example.org/api"
        );
    }

    #[test]
    fn test_normalize_rejects_other_schemes() {
        assert!(normalize_base_url("ftp://localhost").is_err());
        assert!(normalize_base_url("localhost:8001").is_err());
        assert!(normalize_base_url("http://").is_err());
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_toml_config(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Io(_))));

        std::fs::write(dir.path().join("bad.toml"), "port = \"x\"").unwrap();
        let result = load_toml_config(&dir.path().join("bad.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("port = 8080\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.sound_dir, PathBuf::from("public/sound"));
        assert_eq!(config.logging.level, "info");
    }
}
