use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub workspace_api_url: String,
    pub frontend_origin: String,
    pub bind_addr: SocketAddr,
    pub auth_cookie_secure: bool,
    pub api_timeout: Duration,
    pub page_idle_timeout: Duration,
    pub rate_limit_ms: u64,
    pub rate_limit_burst: u32,
    pub log_format: LogFormat,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|_| {
            ConfigError::Invalid {
                name,
                value: raw.clone(),
            }
        }),
        _ => Ok(default),
    }
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file
        Self::load()
    }

    /// Reads the process environment without touching `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        let workspace_api_url = required("WORKSPACE_API_URL")?
            .trim_end_matches('/')
            .to_string();
        let frontend_origin = required("FRONTEND_ORIGIN")?
            .trim_end_matches('/')
            .to_string();

        let log_format = match env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Ok(v) if v.trim().is_empty() || v.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Ok(v) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: v,
                })
            }
            Err(_) => LogFormat::Pretty,
        };

        Ok(Config {
            workspace_api_url,
            frontend_origin,
            bind_addr: optional("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            auth_cookie_secure: flag("AUTH_COOKIE_SECURE", true)?,
            api_timeout: Duration::from_secs(optional("API_TIMEOUT_SECONDS", 10u64)?),
            page_idle_timeout: Duration::from_secs(optional("PAGE_IDLE_TIMEOUT_SECONDS", 1800u64)?),
            // Default: 200ms/token (~5 req/sec)
            rate_limit_ms: optional("RATE_LIMITER_MILLISECONDS", 200u64)?,
            rate_limit_burst: optional("RATE_LIMITER_BURST", 20u32)?,
            log_format,
        })
    }
}
