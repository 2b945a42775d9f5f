use crate::google::{DEFAULT_MANAGEMENT_API, DEFAULT_REPORTING_API};
use crate::report::fields::{self, FieldError, QueryField};
use serde::Deserialize;
use std::path::Path;

/// Application configuration loaded from environment variables or TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path prefix the `/view` and `/data` routes are mounted under, e.g. `/ga`.
    /// Empty mounts them at the root.
    #[serde(default)]
    pub base_path: String,
    /// Name of the cookie holding the JSON-serialized OAuth tokens.
    #[serde(default = "default_token_cookie")]
    pub token_cookie: String,
    #[serde(default = "default_management_api_base")]
    pub management_api_base: String,
    #[serde(default = "default_reporting_api_base")]
    pub reporting_api_base: String,
    /// Timeout for each outbound Google API call, in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
    /// Dashboard origin allowed to call the API with cookies.
    /// If not set, any origin is allowed (without credentials).
    #[serde(default)]
    pub dashboard_origin: Option<String>,
    /// Graceful shutdown timeout in seconds (default: 30).
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    /// Dimensions requested by `/data`, in CSV column order.
    #[serde(default = "fields::default_query_fields")]
    pub query_fields: Vec<QueryField>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_token_cookie() -> String {
    "tokens".to_string()
}

fn default_management_api_base() -> String {
    DEFAULT_MANAGEMENT_API.to_string()
}

fn default_reporting_api_base() -> String {
    DEFAULT_REPORTING_API.to_string()
}

const fn default_upstream_timeout_secs() -> u64 {
    30
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: String::new(),
            token_cookie: default_token_cookie(),
            management_api_base: default_management_api_base(),
            reporting_api_base: default_reporting_api_base(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            dashboard_origin: None,
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            query_fields: fields::default_query_fields(),
        }
    }
}

/// A configuration value that cannot be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Fields(FieldError),
    BasePath(String),
    Endpoint(String),
    TokenCookie,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fields(e) => write!(f, "invalid query_fields: {e}"),
            Self::BasePath(p) => write!(
                f,
                "invalid base_path '{p}': must start with '/' and not end with '/'"
            ),
            Self::Endpoint(url) => write!(
                f,
                "invalid API base URL '{url}': must start with http:// or https://"
            ),
            Self::TokenCookie => write!(f, "token_cookie must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<FieldError> for ConfigError {
    fn from(e: FieldError) -> Self {
        Self::Fields(e)
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// Environment variables override file values:
    /// - `GA_GATEWAY_HOST` → host
    /// - `GA_GATEWAY_PORT` → port
    /// - `GA_GATEWAY_BASE_PATH` → base_path
    /// - `GA_GATEWAY_TOKEN_COOKIE` → token_cookie
    /// - `GA_GATEWAY_MANAGEMENT_API` → management_api_base
    /// - `GA_GATEWAY_REPORTING_API` → reporting_api_base
    /// - `GA_GATEWAY_UPSTREAM_TIMEOUT` → upstream_timeout_secs
    /// - `GA_GATEWAY_DASHBOARD_ORIGIN` → dashboard_origin
    /// - `GA_GATEWAY_SHUTDOWN_TIMEOUT` → shutdown_timeout_secs
    /// - `GA_GATEWAY_QUERY_FIELDS` → query_fields, as `Label=ga:name,Label=ga:name`
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config =
            config_path.map_or_else(Self::default, |path| match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read config file: {e}, using defaults");
                    Self::default()
                }
            });

        // Environment variable overrides
        if let Ok(host) = std::env::var("GA_GATEWAY_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("GA_GATEWAY_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(path) = std::env::var("GA_GATEWAY_BASE_PATH") {
            config.base_path = path;
        }
        if let Ok(name) = std::env::var("GA_GATEWAY_TOKEN_COOKIE") {
            config.token_cookie = name;
        }
        if let Ok(url) = std::env::var("GA_GATEWAY_MANAGEMENT_API") {
            config.management_api_base = url;
        }
        if let Ok(url) = std::env::var("GA_GATEWAY_REPORTING_API") {
            config.reporting_api_base = url;
        }
        if let Ok(val) = std::env::var("GA_GATEWAY_UPSTREAM_TIMEOUT") {
            if let Ok(t) = val.parse() {
                config.upstream_timeout_secs = t;
            }
        }
        if let Ok(origin) = std::env::var("GA_GATEWAY_DASHBOARD_ORIGIN") {
            config.dashboard_origin = Some(origin);
        }
        if let Ok(val) = std::env::var("GA_GATEWAY_SHUTDOWN_TIMEOUT") {
            if let Ok(t) = val.parse() {
                config.shutdown_timeout_secs = t;
            }
        }
        if let Ok(val) = std::env::var("GA_GATEWAY_QUERY_FIELDS") {
            match fields::parse_field_list(&val) {
                Some(list) => config.query_fields = list,
                None => tracing::warn!(
                    "Ignoring GA_GATEWAY_QUERY_FIELDS: expected 'Label=ga:name' entries separated by ','"
                ),
            }
        }

        config
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fields::validate_fields(&self.query_fields)?;

        if !self.base_path.is_empty()
            && (!self.base_path.starts_with('/') || self.base_path.ends_with('/'))
        {
            return Err(ConfigError::BasePath(self.base_path.clone()));
        }
        for url in [&self.management_api_base, &self.reporting_api_base] {
            let url = url.trim();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Endpoint(url.to_string()));
            }
        }
        if self.token_cookie.trim().is_empty() {
            return Err(ConfigError::TokenCookie);
        }
        Ok(())
    }
}
