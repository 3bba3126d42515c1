//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// Postgres 连接串；缺省时使用内存存储。
    pub database_url: Option<String>,
    pub eliona_api_endpoint: String,
    pub eliona_api_token: String,
    /// 内存存储的租户配置种子文件（JSON 数组）。
    pub config_file: Option<String>,
    pub collect_interval_seconds: u64,
    pub reconnect_backoff_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let eliona_api_endpoint = env::var("API_ENDPOINT")
            .map_err(|_| ConfigError::Missing("API_ENDPOINT".to_string()))?;
        let eliona_api_token =
            env::var("API_TOKEN").map_err(|_| ConfigError::Missing("API_TOKEN".to_string()))?;
        let port = read_u16_with_default("API_SERVER_PORT", 3000)?;
        let http_addr = format!("0.0.0.0:{}", port);
        let database_url = read_optional("CONNECTION_STRING");
        let config_file = read_optional("SIGNIFY_CONFIG_FILE");
        let collect_interval_seconds =
            read_u64_with_default("SIGNIFY_COLLECT_INTERVAL_SECONDS", 1)?.max(1);
        let reconnect_backoff_seconds =
            read_u64_with_default("SIGNIFY_RECONNECT_BACKOFF_SECONDS", 10)?;

        Ok(Self {
            http_addr,
            database_url,
            eliona_api_endpoint: eliona_api_endpoint.trim_end_matches('/').to_string(),
            eliona_api_token,
            config_file,
            collect_interval_seconds,
            reconnect_backoff_seconds,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
