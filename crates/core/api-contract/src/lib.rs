//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 版本信息。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDto {
    pub name: String,
    pub version: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub sync_cycles: u64,
    pub sync_failures: u64,
    pub assets_created: u64,
    pub token_refreshes: u64,
    pub channels_opened: u64,
    pub channel_reconnects: u64,
    pub subscription_url_failures: u64,
    pub messages_received: u64,
    pub data_write_success: u64,
    pub data_write_failure: u64,
}

/// 单条推送通道状态。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatusDto {
    pub building_uuid: String,
    pub category: String,
    pub state: String,
}

/// 单个租户配置的运行状态。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStatusDto {
    pub id: i64,
    pub enabled: bool,
    pub active: bool,
    pub subscription_state: String,
    pub channels: Vec<ChannelStatusDto>,
}
