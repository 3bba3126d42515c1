//! 资产注册表：先查映射，缺失时在平台创建并写入映射。
//!
//! 同一租户的查找与创建在租户锁内完成，保证每个键只创建一次。

use domain::{AssetKind, Configuration, global_asset_identifier};
use signify_platform::{AssetPlatform, NewAsset, PlatformError};
use signify_storage::{AssetRecord, AssetStore, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("asset store failed: {0}")]
    Store(#[from] StorageError),
    #[error("asset platform failed: {0}")]
    Platform(#[from] PlatformError),
}

/// 待确保存在的资产描述。
#[derive(Debug, Clone)]
pub struct AssetDraft {
    pub uuid: String,
    pub parent_uuid: Option<String>,
    pub parent_asset_id: Option<i32>,
    pub asset_type: String,
    pub kind: AssetKind,
    pub name: String,
}

impl AssetDraft {
    pub fn global_asset_id(&self) -> String {
        global_asset_identifier(&self.asset_type, &self.uuid)
    }
}

pub struct AssetRegistry {
    store: Arc<dyn AssetStore>,
    platform: Arc<dyn AssetPlatform>,
    tenant_locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl AssetRegistry {
    pub fn new(store: Arc<dyn AssetStore>, platform: Arc<dyn AssetPlatform>) -> Self {
        Self {
            store,
            platform,
            tenant_locks: Mutex::new(HashMap::new()),
        }
    }

    /// 返回 `(平台资产 ID, 是否新建)`。
    pub async fn lookup_or_create(
        &self,
        config: &Configuration,
        project_id: &str,
        draft: &AssetDraft,
    ) -> Result<(i32, bool), RegistryError> {
        let lock = self.tenant_lock(config.id);
        let _guard = lock.lock().await;

        let ctx = config.context();
        let global_asset_id = draft.global_asset_id();
        if let Some(asset_id) = self
            .store
            .find_asset_id(&ctx, project_id, &global_asset_id)
            .await?
        {
            return Ok((asset_id, false));
        }

        let asset = NewAsset::new(
            project_id,
            global_asset_id.clone(),
            draft.parent_asset_id,
            draft.asset_type.clone(),
            draft.name.clone(),
        );
        let asset_id = self.platform.upsert_asset(&asset).await?;
        self.store
            .insert_asset(
                &ctx,
                AssetRecord {
                    config_id: config.id,
                    project_id: project_id.to_string(),
                    uuid: draft.uuid.clone(),
                    parent_uuid: draft.parent_uuid.clone(),
                    global_asset_id: global_asset_id.clone(),
                    kind: draft.kind,
                    asset_id,
                },
            )
            .await?;
        debug!(
            target: "signify.sync",
            config_id = config.id,
            project_id,
            asset_id,
            global_asset_id = %global_asset_id,
            "asset_created"
        );
        Ok((asset_id, true))
    }

    fn tenant_lock(&self, config_id: i64) -> Arc<AsyncMutex<()>> {
        match self.tenant_locks.lock() {
            Ok(mut locks) => locks
                .entry(config_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone(),
            Err(poisoned) => poisoned
                .into_inner()
                .entry(config_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone(),
        }
    }
}
