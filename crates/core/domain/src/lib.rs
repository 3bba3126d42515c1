//! 领域模型：租户配置、位置层级、资产类别与推送消息。

pub mod asset;
pub mod config;
pub mod location;
pub mod message;

pub use asset::*;
pub use config::{Configuration, FilterRule};
pub use location::{HierarchyLevel, LocationNode, LocationRecord, SpaceCategory};
pub use message::{OccupancyState, PushMessage, SensorMessage, SubscriptionCategory};

/// 租户上下文：存储层共享的执行上下文。
///
/// 租户即一份 Signify 配置，`config_id` 是隔离与调度的单位。
/// 目标项目不属于上下文，由各存储接口按参数传入。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub config_id: i64,
}

impl TenantContext {
    pub fn new(config_id: i64) -> Self {
        Self { config_id }
    }
}
