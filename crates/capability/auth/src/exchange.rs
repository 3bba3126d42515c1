//! 凭据换取令牌（`POST {base_url}/oauth/accesstoken`）。

use crate::AuthError;
use async_trait::async_trait;
use domain::Configuration;
use serde::Deserialize;
use std::time::Duration;

/// 凭据换取接口：返回字符串令牌与有效期（秒）。
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, config: &Configuration) -> Result<(String, i64), AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    fault: Option<serde_json::Value>,
}

fn fault_message(fault: &serde_json::Value) -> String {
    match fault.get("faultstring").and_then(|value| value.as_str()) {
        Some(text) => text.to_string(),
        None => fault.to_string(),
    }
}

/// 基于 reqwest 的换取实现：表单字段 + Basic Auth。
#[derive(Clone, Default)]
pub struct HttpTokenExchanger {
    client: reqwest::Client,
}

impl HttpTokenExchanger {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(&self, config: &Configuration) -> Result<(String, i64), AuthError> {
        let url = format!(
            "{}/oauth/accesstoken",
            config.base_url.trim_end_matches('/')
        );
        let form = [
            ("app_key", config.app_key.as_str()),
            ("app_secret", config.app_secret.as_str()),
            ("service", config.service.as_str()),
        ];
        let response = self
            .client
            .post(&url)
            .basic_auth(&config.service_id, Some(&config.service_secret))
            .form(&form)
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        let parsed = serde_json::from_str::<TokenResponse>(&body);
        if let Ok(TokenResponse {
            fault: Some(fault), ..
        }) = &parsed
        {
            return Err(AuthError::Fault(fault_message(fault)));
        }
        if !status.is_success() {
            return Err(AuthError::Status(status.as_u16()));
        }
        let parsed = parsed.map_err(|err| AuthError::Decode(err.to_string()))?;
        Ok((parsed.token, parsed.expires_in))
    }
}
