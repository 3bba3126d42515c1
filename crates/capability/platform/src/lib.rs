//! 目标平台能力：资产创建与数据写入。
//!
//! - `eliona`：Eliona REST 客户端（生产）
//! - `in_memory`：记录调用的内存实现（测试、无平台运行）

pub mod eliona;
pub mod in_memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use eliona::ElionaClient;
pub use in_memory::InMemoryAssetPlatform;

/// 平台调用错误。
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Transport(String),
    #[error("platform returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("platform response invalid: {0}")]
    Decode(String),
    #[error("platform rejected request: {0}")]
    Rejected(String),
}

/// 待创建的资产。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub project_id: String,
    pub global_asset_identifier: String,
    pub name: String,
    pub asset_type: String,
    pub description: String,
    pub parent_locational_asset_id: Option<i32>,
    pub device_ids: Vec<String>,
}

impl NewAsset {
    /// 描述为 `"{name} ({identifier})"`，设备 ID 为标识本身。
    pub fn new(
        project_id: impl Into<String>,
        global_asset_identifier: impl Into<String>,
        parent_locational_asset_id: Option<i32>,
        asset_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let global_asset_identifier = global_asset_identifier.into();
        let name = name.into();
        Self {
            project_id: project_id.into(),
            description: format!("{} ({})", name, global_asset_identifier),
            device_ids: vec![global_asset_identifier.clone()],
            global_asset_identifier,
            name,
            asset_type: asset_type.into(),
            parent_locational_asset_id,
        }
    }
}

/// 数据子类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSubtype {
    Input,
    Info,
}

impl DataSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSubtype::Input => "input",
            DataSubtype::Info => "info",
        }
    }
}

/// 一条资产数据写入。
#[derive(Debug, Clone, PartialEq)]
pub struct AssetData {
    pub asset_id: i32,
    pub subtype: DataSubtype,
    /// 毫秒时间戳；None 表示由平台取当前时间。
    pub timestamp: Option<i64>,
    pub data: Map<String, Value>,
}

/// 目标平台接口。
#[async_trait]
pub trait AssetPlatform: Send + Sync {
    /// 创建或更新资产，返回平台资产 ID。
    async fn upsert_asset(&self, asset: &NewAsset) -> Result<i32, PlatformError>;

    /// 写入资产数据。
    async fn upsert_data(&self, data: &AssetData) -> Result<(), PlatformError>;
}
