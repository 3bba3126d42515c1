//! Signify office cloud 接口。

use crate::error::FetchError;
use async_trait::async_trait;
use domain::{Configuration, LocationRecord, SubscriptionCategory};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// 远端接口路径。
pub mod endpoints {
    use domain::SubscriptionCategory;

    pub const API_PREFIX: &str = "/interact/api/officeCloud/v1";

    pub fn sites() -> String {
        format!("{}/sites", API_PREFIX)
    }

    pub fn buildings(site_uuid: &str) -> String {
        format!("{}/sites/{}/buildings", API_PREFIX, site_uuid)
    }

    pub fn storeys(building_uuid: &str) -> String {
        format!("{}/buildings/{}/buildingStoreys", API_PREFIX, building_uuid)
    }

    pub fn sensor_spaces(storey_uuid: &str) -> String {
        format!("{}/buildingStoreys/{}/sensorSpaces", API_PREFIX, storey_uuid)
    }

    pub fn subscription(building_uuid: &str, category: SubscriptionCategory) -> String {
        format!(
            "{}/subscription/{}/{}",
            API_PREFIX,
            building_uuid,
            category.as_path()
        )
    }
}

/// 远端位置与订阅接口。
#[async_trait]
pub trait SignifyApi: Send + Sync {
    /// GET 位置列表（`endpoint` 为相对路径）。
    async fn fetch_locations(
        &self,
        config: &Configuration,
        token: &str,
        endpoint: &str,
    ) -> Result<Vec<LocationRecord>, FetchError>;

    /// GET 推送通道地址。
    async fn subscription_url(
        &self,
        config: &Configuration,
        token: &str,
        building_uuid: &str,
        category: SubscriptionCategory,
    ) -> Result<String, FetchError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebsocketUrl {
    #[serde(default)]
    websocket_url: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// 基于 reqwest 的实现：Bearer 鉴权，配置内超时。
#[derive(Clone, Default)]
pub struct HttpSignifyApi {
    client: reqwest::Client,
}

impl HttpSignifyApi {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        config: &Configuration,
        token: &str,
        endpoint: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", config.base_url.trim_end_matches('/'), endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|err| FetchError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl SignifyApi for HttpSignifyApi {
    async fn fetch_locations(
        &self,
        config: &Configuration,
        token: &str,
        endpoint: &str,
    ) -> Result<Vec<LocationRecord>, FetchError> {
        self.get_json(config, token, endpoint).await
    }

    async fn subscription_url(
        &self,
        config: &Configuration,
        token: &str,
        building_uuid: &str,
        category: SubscriptionCategory,
    ) -> Result<String, FetchError> {
        let endpoint = endpoints::subscription(building_uuid, category);
        let body: WebsocketUrl = self.get_json(config, token, &endpoint).await?;
        match body.websocket_url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(FetchError::Subscription {
                endpoint,
                errors: body
                    .errors
                    .map(|errors| errors.to_string())
                    .unwrap_or_else(|| "null".to_string()),
            }),
        }
    }
}
