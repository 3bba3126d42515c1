//! 租户配置（由配置接口维护，核心只读消费）。

use serde::{Deserialize, Serialize};

/// 未配置请求超时时的默认值（秒）。
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 120;

/// 结构化过滤规则：字段名 + 正则。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(alias = "field")]
    pub parameter: String,
    pub regex: String,
}

impl FilterRule {
    pub fn new(parameter: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            regex: regex.into(),
        }
    }
}

/// 单个租户的 Signify 连接与同步设置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub id: i64,
    pub base_url: String,
    pub service: String,
    pub service_id: String,
    pub service_secret: String,
    pub app_key: String,
    pub app_secret: String,
    #[serde(default)]
    pub enable: Option<bool>,
    /// 轮询间隔（秒）。
    #[serde(default)]
    pub refresh_interval: u64,
    /// 单次请求超时（秒）。
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// 过滤规则组：组间 OR，组内 AND。
    #[serde(default)]
    pub asset_filter: Vec<Vec<FilterRule>>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, rename = "projectIDs")]
    pub project_ids: Option<Vec<String>>,
}

impl Configuration {
    /// 未显式禁用即视为启用。
    pub fn is_enabled(&self) -> bool {
        self.enable.unwrap_or(true)
    }

    /// 未显式标记即视为活跃。
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    pub fn project_ids(&self) -> &[String] {
        self.project_ids.as_deref().unwrap_or(&[])
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS)
    }

    pub fn context(&self) -> crate::TenantContext {
        crate::TenantContext::new(self.id)
    }
}
