use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub tee: TeeConfig,
    pub log_format: LogFormat,
    /// `LOG_FORMAT` value that was not recognized, kept so it can be
    /// reported once logging is up
    #[serde(skip)]
    pub unrecognized_log_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the legacy documentation site
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeeConfig {
    pub enabled: bool,
    /// Endpoint that receives mirrored analytics events
    pub collector_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl UpstreamConfig {
    const DEFAULT_URL: &'static str = "http://127.0.0.1:8081";

    const fn default_timeout_secs() -> u64 {
        30
    }
}

impl TeeConfig {
    const DEFAULT_COLLECTOR_URL: &'static str = "https://teeproxy-dot-go-discovery.appspot.com";

    const fn default_timeout_secs() -> u64 {
        10
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SHIM_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("SHIM_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("SHIM_PORT must be a valid port number")?;

        let upstream_url =
            lookup("LEGACY_UPSTREAM_URL").unwrap_or_else(|| UpstreamConfig::DEFAULT_URL.to_string());
        let upstream_timeout_secs = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => UpstreamConfig::default_timeout_secs(),
        };

        let tee_enabled = lookup("TEE_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(true);
        let collector_url = lookup("TEE_COLLECTOR_URL")
            .unwrap_or_else(|| TeeConfig::DEFAULT_COLLECTOR_URL.to_string());
        let tee_timeout_secs = match lookup("TEE_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("TEE_TIMEOUT_SECS must be a whole number of seconds")?,
            None => TeeConfig::default_timeout_secs(),
        };

        // Logging is not initialized yet, so an unknown format is only recorded here.
        let raw_log_format = lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string());
        let (log_format, unrecognized_log_format) = match raw_log_format.to_lowercase().as_str() {
            "pretty" => (LogFormat::Pretty, None),
            "json" => (LogFormat::Json, None),
            _ => (LogFormat::Pretty, Some(raw_log_format)),
        };

        Ok(Config {
            server: ServerConfig { host, port },
            upstream: UpstreamConfig {
                url: upstream_url,
                timeout_secs: upstream_timeout_secs,
            },
            tee: TeeConfig {
                enabled: tee_enabled,
                collector_url,
                timeout_secs: tee_timeout_secs,
            },
            log_format,
            unrecognized_log_format,
        })
    }
}
