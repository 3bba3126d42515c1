//! 存储接口 Trait 定义
//!
//! - AssetStore：资产映射存储
//! - ConfigurationStore：租户配置存储（核心只读 + 活跃状态）
//!
//! 设计原则：
//! - 资产接口显式接收 TenantContext
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::AssetRecord;
use async_trait::async_trait;
use domain::{AssetKind, Configuration, TenantContext};

/// 资产映射存储接口
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// 按全局标识查找 Eliona 资产 ID
    async fn find_asset_id(
        &self,
        ctx: &TenantContext,
        project_id: &str,
        global_asset_id: &str,
    ) -> Result<Option<i32>, StorageError>;

    /// 插入新的映射记录（键已存在时报错）
    async fn insert_asset(
        &self,
        ctx: &TenantContext,
        record: AssetRecord,
    ) -> Result<AssetRecord, StorageError>;

    /// 列出租户下指定类别的记录（跨项目）
    async fn list_assets_by_kind(
        &self,
        ctx: &TenantContext,
        kind: AssetKind,
    ) -> Result<Vec<AssetRecord>, StorageError>;

    /// 列出租户下指定外部 UUID 的记录（跨项目）
    async fn list_assets_by_uuid(
        &self,
        ctx: &TenantContext,
        uuid: &str,
    ) -> Result<Vec<AssetRecord>, StorageError>;

    /// 删除租户的全部映射记录（整租户拆除）
    async fn delete_configuration_assets(&self, ctx: &TenantContext)
    -> Result<u64, StorageError>;
}

/// 租户配置存储接口
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// 列出全部租户配置
    async fn list_configurations(&self) -> Result<Vec<Configuration>, StorageError>;

    /// 设置单个配置的活跃状态
    async fn set_active(&self, config_id: i64, active: bool) -> Result<bool, StorageError>;

    /// 将全部配置置为不活跃（启动时调用）
    async fn set_all_inactive(&self) -> Result<u64, StorageError>;
}
