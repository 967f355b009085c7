//! Layered configuration: defaults, optional TOML file, `RADIO_MCP__*`
//! environment variables and finally the bare `PORT` variable.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Environment prefix for nested overrides, e.g. `RADIO_MCP__UPSTREAM__BASE_URL`
pub const ENV_PREFIX: &str = "RADIO_MCP";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_shutdown_timeout")]
    pub graceful_shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            graceful_shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

/// Radio directory API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base of the search API; `new_combo_search.php` is resolved against it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base of the public site used for canonical `/radioplay/{shorturl}` links
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            site_url: default_site_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// SSE transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
    /// Case-insensitive user-agent fragments that get the POST fallback message
    #[serde(default = "default_fallback_user_agents")]
    pub fallback_user_agents: Vec<String>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: default_keep_alive(),
            fallback_user_agents: default_fallback_user_agents(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_shutdown_timeout() -> u64 {
    5
}

fn default_base_url() -> String {
    "https://api.radioplay.app/".to_string()
}

fn default_site_url() -> String {
    "https://radioplay.app".to_string()
}

fn default_user_agent() -> String {
    concat!("radio-search-mcp/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_keep_alive() -> u64 {
    15
}

fn default_fallback_user_agents() -> Vec<String> {
    ["iPhone", "iPad", "iPod", "Android"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("streaming.fallback_user_agents")
                .try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;

        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port.trim().parse().map_err(|_| Error::InvalidArgument {
                field: "PORT".to_string(),
                reason: format!("'{port}' is not a valid port number"),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "port must be between 1 and 65535"));
        }
        if self.server.host.trim().is_empty() {
            return Err(invalid("server.host", "host must not be empty"));
        }
        for (field, value) in [
            ("upstream.base_url", &self.upstream.base_url),
            ("upstream.site_url", &self.upstream.site_url),
        ] {
            Url::parse(value).map_err(|e| invalid(field, &format!("'{value}': {e}")))?;
        }
        if self.streaming.keep_alive_secs == 0 {
            return Err(invalid(
                "streaming.keep_alive_secs",
                "keep-alive interval must be positive",
            ));
        }
        Ok(())
    }

    /// Effective settings rendered as a TOML document
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Internal(format!("Failed to render configuration: {e}")))
    }

    /// Socket address string the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::InvalidArgument {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.streaming.fallback_user_agents.len(), 4);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = Config::default();
        config.upstream.base_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("upstream.base_url"));
    }

    #[test]
    fn test_zero_keep_alive_rejected() {
        let mut config = Config::default();
        config.streaming.keep_alive_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8123

[upstream]
base_url = "http://127.0.0.1:9000/"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        if std::env::var("PORT").is_err() {
            assert_eq!(config.server.port, 8123);
        }
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:9000/");
        assert_eq!(config.upstream.site_url, default_site_url());
    }

    #[test]
    fn test_toml_rendering_loads_back() {
        let mut config = Config::default();
        config.server.port = 4100;
        config.streaming.fallback_user_agents = vec!["Kindle".to_string()];

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[upstream]"));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.server.port, 4100);
        assert_eq!(parsed.streaming.fallback_user_agents, vec!["Kindle"]);
        assert_eq!(parsed.upstream.base_url, config.upstream.base_url);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"streaming": {"keep_alive_secs": 30}}"#).unwrap();
        assert_eq!(config.streaming.keep_alive_secs, 30);
        assert_eq!(config.server.port, 3000);
        assert!(!config.streaming.fallback_user_agents.is_empty());
    }
}
