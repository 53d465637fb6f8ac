// Configuration module
// Typed settings with compiled-in defaults and an optional config.toml override

use serde::Deserialize;
use std::net::SocketAddr;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub resources: ResourcesConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
}

/// Static resource configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ResourcesConfig {
    /// Directory the static file handler serves from, relative to the
    /// working directory
    pub web_root: String,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub max_body_size: u64,
    /// Per-connection timeout in seconds
    pub request_timeout: u64,
}

impl Config {
    /// Load configuration, reading "config.toml" if one exists in the
    /// working directory. With no file present the compiled defaults apply.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?
            .set_default("resources.web_root", "web")?
            .set_default("http.max_body_size", 65_536)?
            .set_default("http.request_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
