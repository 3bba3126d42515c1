//! Eliona REST 客户端（`X-API-Key` 鉴权）。

use crate::{AssetData, AssetPlatform, NewAsset, PlatformError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Deserialize)]
struct AssetResponse {
    id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataBody<'a> {
    asset_id: i32,
    subtype: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    data: &'a Map<String, Value>,
}

fn format_timestamp(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub struct ElionaClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ElionaClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(PlatformError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AssetPlatform for ElionaClient {
    async fn upsert_asset(&self, asset: &NewAsset) -> Result<i32, PlatformError> {
        let response = self
            .client
            .put(self.url("/assets"))
            .header("X-API-Key", &self.token)
            .query(&[("identifyBy", "gai")])
            .json(asset)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .send()
            .await
            .map_err(|err| PlatformError::Transport(err.to_string()))?;
        let response = Self::check_status(response).await?;
        let body: AssetResponse = response
            .json()
            .await
            .map_err(|err| PlatformError::Decode(err.to_string()))?;
        let id = body
            .id
            .ok_or_else(|| PlatformError::Decode("asset id missing".to_string()))?;
        debug!(
            target: "signify.platform",
            asset_id = id,
            global_asset_identifier = %asset.global_asset_identifier,
            "asset_upserted"
        );
        Ok(id)
    }

    async fn upsert_data(&self, data: &AssetData) -> Result<(), PlatformError> {
        let body = DataBody {
            asset_id: data.asset_id,
            subtype: data.subtype.as_str(),
            timestamp: data.timestamp.and_then(format_timestamp),
            data: &data.data,
        };
        let response = self
            .client
            .put(self.url("/data"))
            .header("X-API-Key", &self.token)
            .json(&body)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .send()
            .await
            .map_err(|err| PlatformError::Transport(err.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }
}
