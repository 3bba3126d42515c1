//! 同步引擎：每个目标项目下按 根 → 站点 → 楼宇 → 楼层 → 空间 依次确保资产存在。

use crate::registry::{AssetDraft, AssetRegistry, RegistryError};
use domain::{
    AssetKind, Configuration, GROUP_ASSET_TYPE, HierarchyLevel, LocationNode, ROOT_ASSET_TYPE,
    ROOT_NAME, ROOT_UUID, space_asset_type,
};
use signify_hierarchy::{FetchError, HierarchyFetcher};
use signify_telemetry::record_assets_created;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("create asset {identifier} failed: {source}")]
    Registry {
        identifier: String,
        #[source]
        source: RegistryError,
    },
}

pub struct SyncEngine {
    fetcher: Arc<HierarchyFetcher>,
    registry: Arc<AssetRegistry>,
}

fn group_kind(level: HierarchyLevel) -> AssetKind {
    match level {
        HierarchyLevel::Site => AssetKind::Site,
        HierarchyLevel::Building => AssetKind::Building,
        HierarchyLevel::Storey => AssetKind::Storey,
        HierarchyLevel::Space => AssetKind::Space,
    }
}

impl SyncEngine {
    pub fn new(fetcher: Arc<HierarchyFetcher>, registry: Arc<AssetRegistry>) -> Self {
        Self { fetcher, registry }
    }

    /// 拉取整树并创建缺失资产，返回新建数量。
    pub async fn sync(&self, config: &Configuration) -> Result<usize, SyncError> {
        if config.project_ids().is_empty() {
            info!(
                target: "signify.sync",
                config_id = config.id,
                "no_project_ids"
            );
            return Ok(0);
        }
        let sites = self.fetcher.fetch_tree(config).await?;
        self.create_assets(config, &sites).await
    }

    /// 在已拉取的树上执行创建。遇到首个失败即停止，已创建的资产保留。
    pub async fn create_assets(
        &self,
        config: &Configuration,
        sites: &[LocationNode],
    ) -> Result<usize, SyncError> {
        let mut created = 0usize;
        for project_id in config.project_ids() {
            let root = AssetDraft {
                uuid: ROOT_UUID.to_string(),
                parent_uuid: None,
                parent_asset_id: None,
                asset_type: ROOT_ASSET_TYPE.to_string(),
                kind: AssetKind::Root,
                name: ROOT_NAME.to_string(),
            };
            let root_id = self.ensure(config, project_id, &root, &mut created).await?;
            for site in sites {
                let site_id = self
                    .create_group(config, project_id, site, ROOT_UUID, root_id, &mut created)
                    .await?;
                for building in &site.children {
                    let building_id = self
                        .create_group(config, project_id, building, &site.uuid, site_id, &mut created)
                        .await?;
                    for storey in &building.children {
                        let storey_id = self
                            .create_group(
                                config,
                                project_id,
                                storey,
                                &building.uuid,
                                building_id,
                                &mut created,
                            )
                            .await?;
                        for space in &storey.children {
                            self.create_space(
                                config,
                                project_id,
                                space,
                                &storey.uuid,
                                storey_id,
                                &mut created,
                            )
                            .await?;
                        }
                    }
                }
            }
        }
        info!(
            target: "signify.sync",
            config_id = config.id,
            created,
            "assets_synced"
        );
        Ok(created)
    }

    async fn create_group(
        &self,
        config: &Configuration,
        project_id: &str,
        node: &LocationNode,
        parent_uuid: &str,
        parent_asset_id: i32,
        created: &mut usize,
    ) -> Result<i32, SyncError> {
        let draft = AssetDraft {
            uuid: node.uuid.clone(),
            parent_uuid: Some(parent_uuid.to_string()),
            parent_asset_id: Some(parent_asset_id),
            asset_type: GROUP_ASSET_TYPE.to_string(),
            kind: group_kind(node.level),
            name: node.name.clone(),
        };
        self.ensure(config, project_id, &draft, created).await
    }

    async fn create_space(
        &self,
        config: &Configuration,
        project_id: &str,
        node: &LocationNode,
        parent_uuid: &str,
        parent_asset_id: i32,
        created: &mut usize,
    ) -> Result<(), SyncError> {
        let Some(category) = node.category() else {
            debug!(
                target: "signify.sync",
                config_id = config.id,
                uuid = %node.uuid,
                space_type = %node.space_type,
                "space_category_skipped"
            );
            return Ok(());
        };
        let draft = AssetDraft {
            uuid: node.uuid.clone(),
            parent_uuid: Some(parent_uuid.to_string()),
            parent_asset_id: Some(parent_asset_id),
            asset_type: space_asset_type(category).to_string(),
            kind: AssetKind::Space,
            name: node.name.clone(),
        };
        self.ensure(config, project_id, &draft, created).await?;
        Ok(())
    }

    async fn ensure(
        &self,
        config: &Configuration,
        project_id: &str,
        draft: &AssetDraft,
        created: &mut usize,
    ) -> Result<i32, SyncError> {
        let (asset_id, is_new) = self
            .registry
            .lookup_or_create(config, project_id, draft)
            .await
            .map_err(|source| SyncError::Registry {
                identifier: draft.global_asset_id(),
                source,
            })?;
        if is_new {
            *created += 1;
            record_assets_created(1);
        }
        Ok(asset_id)
    }
}
