//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::chart::DEFAULT_ALERT_THRESHOLD_PPM;
use crate::login::{LoginMode, LoginRules, DEFAULT_LANDING_ROUTE, DEFAULT_LOGIN_PATH};
use crate::reading::DEFAULT_READINGS_PATH;
use crate::session::{WarningPolicy, DEFAULT_CONTROL_PATH, DEFAULT_STATE_PATH};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub station: StationConfig,

    #[serde(default)]
    pub login: LoginConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Station server connection
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_logout_path")]
    pub logout_path: String,

    #[serde(default = "default_control_path")]
    pub control_path: String,

    #[serde(default = "default_state_path")]
    pub state_path: String,

    #[serde(default = "default_readings_path")]
    pub readings_path: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub warning_policy: WarningPolicy,

    /// Count an ok login response that ends on the login page as a rejection
    #[serde(default)]
    pub login_page_is_rejection: bool,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_logout_path() -> String {
    "/logout/".to_string()
}

fn default_control_path() -> String {
    DEFAULT_CONTROL_PATH.to_string()
}

fn default_state_path() -> String {
    DEFAULT_STATE_PATH.to_string()
}

fn default_readings_path() -> String {
    DEFAULT_READINGS_PATH.to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            control_path: default_control_path(),
            state_path: default_state_path(),
            readings_path: default_readings_path(),
            request_timeout_secs: default_request_timeout(),
            warning_policy: WarningPolicy::default(),
            login_page_is_rejection: false,
        }
    }
}

/// Login form behavior
#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
    #[serde(default)]
    pub mode: LoginMode,

    #[serde(default = "default_reject_whitespace")]
    pub reject_embedded_whitespace: bool,

    #[serde(default = "default_landing_route")]
    pub landing_route: String,
}

fn default_reject_whitespace() -> bool {
    true
}

fn default_landing_route() -> String {
    DEFAULT_LANDING_ROUTE.to_string()
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            mode: LoginMode::default(),
            reject_embedded_whitespace: default_reject_whitespace(),
            landing_route: default_landing_route(),
        }
    }
}

impl LoginConfig {
    pub fn rules(&self) -> LoginRules {
        LoginRules {
            reject_embedded_whitespace: self.reject_embedded_whitespace,
        }
    }
}

/// Chart and summary settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold_ppm: f64,
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD_PPM
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            alert_threshold_ppm: default_alert_threshold(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    #[cfg(feature = "native")]
    pub fn load_default() -> Self {
        match Self::try_load_default() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::from_env()
            }
        }
    }

    /// Like [`Config::load_default`], but a config file that exists and
    /// fails to load is an error instead of being skipped
    #[cfg(feature = "native")]
    pub fn try_load_default() -> Result<Self, ConfigError> {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("alcoholimetro").join("config.toml")),
            Some(PathBuf::from("/etc/alcoholimetro/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self::load_first_existing(&config_paths)?.unwrap_or_else(Self::from_env))
    }

    /// Load the first of `paths` that exists, with environment overrides
    pub fn load_first_existing(paths: &[PathBuf]) -> Result<Option<Self>, ConfigError> {
        match paths.iter().find(|p| p.exists()) {
            Some(path) => Self::load_with_env(path).map(Some),
            None => Ok(None),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ALCOHOLIMETRO_BASE_URL") {
            self.station.base_url = url;
        }
        if let Some(policy) = lookup("ALCOHOLIMETRO_WARNING_POLICY") {
            match policy.parse() {
                Ok(p) => self.station.warning_policy = p,
                Err(e) => tracing::warn!("Ignoring ALCOHOLIMETRO_WARNING_POLICY: {}", e),
            }
        }
        if let Some(timeout) = lookup("ALCOHOLIMETRO_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.station.request_timeout_secs = t;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("ALCOHOLIMETRO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("ALCOHOLIMETRO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Alcoholimetro Configuration
#
# Environment variables override these settings:
# - ALCOHOLIMETRO_BASE_URL
# - ALCOHOLIMETRO_WARNING_POLICY
# - ALCOHOLIMETRO_TIMEOUT_SECS
# - ALCOHOLIMETRO_LOG_LEVEL
# - ALCOHOLIMETRO_LOG_FORMAT

[station]
# Station server
base_url = "http://localhost:8000"

# Endpoint paths
login_path = "/login/"
logout_path = "/logout/"
control_path = "/control-medicion/"
state_path = "/estado-medicion/"
readings_path = "/api/recibir-datos/"

# Give up on a request after this many seconds
request_timeout_secs = 15

# State handling when the server answers a control action with a warning:
# "keep_state" leaves the displayed state unchanged, "transition" applies it
warning_policy = "keep_state"

# Servers that answer a failed form login by rendering the login page again
# with status 200 need this to report the rejection
login_page_is_rejection = false

[login]
# "async" submits in the background, "blocking" only validates
mode = "async"

# Reject usernames and passwords containing spaces
reject_embedded_whitespace = true

# Where to go after logging in
landing_route = "/dashboard/"

[chart]
# Readings above this value count as alerts in summaries
alert_threshold_ppm = 170.0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty, json
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.station.base_url, "http://localhost:8000");
        assert_eq!(config.station.control_path, "/control-medicion/");
        assert_eq!(config.station.warning_policy, WarningPolicy::KeepState);
        assert_eq!(config.login.mode, LoginMode::Async);
        assert!(config.login.rules().reject_embedded_whitespace);
        assert_eq!(config.chart.alert_threshold_ppm, 170.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [station]
            base_url = "https://estacion.local"
            warning_policy = "transition"
            "#,
        )
        .unwrap();

        assert_eq!(config.station.base_url, "https://estacion.local");
        assert_eq!(config.station.warning_policy, WarningPolicy::Transition);
        assert_eq!(config.station.state_path, "/estado-medicion/");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let err = Config::parse("[station]\nwarning_policy = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[login]\nmode = \"blocking\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.login.mode, LoginMode::Blocking);
    }

    #[test]
    fn test_first_existing_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[station]\nrequest_timeout_secs = 3").unwrap();

        let paths = vec![
            PathBuf::from("/nonexistent/alcoholimetro.toml"),
            file.path().to_path_buf(),
        ];
        let config = Config::load_first_existing(&paths).unwrap().unwrap();
        assert_eq!(config.station.request_timeout_secs, 3);

        assert!(Config::load_first_existing(&paths[..1]).unwrap().is_none());
    }

    #[test]
    fn test_broken_default_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[station\nbase_url = ").unwrap();

        let err = Config::load_first_existing(&[file.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/alcoholimetro.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ALCOHOLIMETRO_BASE_URL", "http://10.0.0.5:8000"),
            ("ALCOHOLIMETRO_WARNING_POLICY", "transition"),
            ("ALCOHOLIMETRO_TIMEOUT_SECS", "not-a-number"),
            ("ALCOHOLIMETRO_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.station.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.station.warning_policy, WarningPolicy::Transition);
        assert_eq!(config.station.request_timeout_secs, 15);
        assert_eq!(config.logging.format, "json");
    }
}
