//! 资产映射内存存储实现
//!
//! 功能：
//! - 复合键唯一约束
//! - 租户隔离验证

use crate::error::StorageError;
use crate::models::AssetRecord;
use crate::traits::AssetStore;
use crate::validation::ensure_tenant;
use domain::{AssetKind, TenantContext};
use std::collections::BTreeMap;
use std::sync::RwLock;

type AssetKey = (i64, String, String);

/// 资产映射内存存储
///
/// 使用 RwLock + BTreeMap 提供线程安全的内存存储，列表按键有序。
pub struct InMemoryAssetStore {
    assets: RwLock<BTreeMap<AssetKey, AssetRecord>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self {
            assets: RwLock::new(BTreeMap::new()),
        }
    }

    /// 当前记录总数（跨租户）。
    pub fn len(&self) -> usize {
        self.assets.read().map(|map| map.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filtered<F>(&self, ctx: &TenantContext, predicate: F) -> Vec<AssetRecord>
    where
        F: Fn(&AssetRecord) -> bool,
    {
        self.assets
            .read()
            .map(|map| {
                map.values()
                    .filter(|item| item.config_id == ctx.config_id)
                    .filter(|item| predicate(item))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for InMemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn find_asset_id(
        &self,
        ctx: &TenantContext,
        project_id: &str,
        global_asset_id: &str,
    ) -> Result<Option<i32>, StorageError> {
        ensure_tenant(ctx)?;
        let key = (
            ctx.config_id,
            project_id.to_string(),
            global_asset_id.to_string(),
        );
        let asset_id = self
            .assets
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(&key)
            .map(|item| item.asset_id);
        Ok(asset_id)
    }

    async fn insert_asset(
        &self,
        ctx: &TenantContext,
        record: AssetRecord,
    ) -> Result<AssetRecord, StorageError> {
        ensure_tenant(ctx)?;
        if record.config_id != ctx.config_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        let key = (
            record.config_id,
            record.project_id.clone(),
            record.global_asset_id.clone(),
        );
        let mut map = self
            .assets
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&key) {
            return Err(StorageError::new("asset exists"));
        }
        map.insert(key, record.clone());
        Ok(record)
    }

    async fn list_assets_by_kind(
        &self,
        ctx: &TenantContext,
        kind: AssetKind,
    ) -> Result<Vec<AssetRecord>, StorageError> {
        ensure_tenant(ctx)?;
        Ok(self.filtered(ctx, |item| item.kind == kind))
    }

    async fn list_assets_by_uuid(
        &self,
        ctx: &TenantContext,
        uuid: &str,
    ) -> Result<Vec<AssetRecord>, StorageError> {
        ensure_tenant(ctx)?;
        Ok(self.filtered(ctx, |item| item.uuid == uuid))
    }

    async fn delete_configuration_assets(
        &self,
        ctx: &TenantContext,
    ) -> Result<u64, StorageError> {
        ensure_tenant(ctx)?;
        let mut map = self
            .assets
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = map.len();
        map.retain(|(config_id, _, _), _| *config_id != ctx.config_id);
        Ok((before - map.len()) as u64)
    }
}
