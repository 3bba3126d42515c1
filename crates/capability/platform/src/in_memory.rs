//! 内存平台实现：按调用顺序记录资产与数据写入，可注入失败。

use crate::{AssetData, AssetPlatform, DataSubtype, NewAsset, PlatformError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[derive(Default)]
struct State {
    next_id: i32,
    assets: Vec<(i32, NewAsset)>,
    ids: HashMap<(String, String), i32>,
    data: Vec<AssetData>,
    failing_assets: HashSet<String>,
    failing_subtypes: HashSet<DataSubtype>,
}

pub struct InMemoryAssetPlatform {
    state: RwLock<State>,
}

impl InMemoryAssetPlatform {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// 之后对该全局标识的创建请求返回错误。
    pub fn fail_asset(&self, global_asset_identifier: &str) {
        if let Ok(mut state) = self.state.write() {
            state
                .failing_assets
                .insert(global_asset_identifier.to_string());
        }
    }

    /// 之后该子类型的数据写入返回错误。
    pub fn fail_subtype(&self, subtype: DataSubtype) {
        if let Ok(mut state) = self.state.write() {
            state.failing_subtypes.insert(subtype);
        }
    }

    pub fn created_assets(&self) -> Vec<(i32, NewAsset)> {
        self.state
            .read()
            .map(|state| state.assets.clone())
            .unwrap_or_default()
    }

    pub fn data_writes(&self) -> Vec<AssetData> {
        self.state
            .read()
            .map(|state| state.data.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryAssetPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetPlatform for InMemoryAssetPlatform {
    async fn upsert_asset(&self, asset: &NewAsset) -> Result<i32, PlatformError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| PlatformError::Rejected("lock failed".to_string()))?;
        if state.failing_assets.contains(&asset.global_asset_identifier) {
            return Err(PlatformError::Rejected(format!(
                "asset {} refused",
                asset.global_asset_identifier
            )));
        }
        let key = (
            asset.project_id.clone(),
            asset.global_asset_identifier.clone(),
        );
        if let Some(id) = state.ids.get(&key) {
            return Ok(*id);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.ids.insert(key, id);
        state.assets.push((id, asset.clone()));
        Ok(id)
    }

    async fn upsert_data(&self, data: &AssetData) -> Result<(), PlatformError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| PlatformError::Rejected("lock failed".to_string()))?;
        if state.failing_subtypes.contains(&data.subtype) {
            return Err(PlatformError::Rejected(format!(
                "subtype {} refused",
                data.subtype.as_str()
            )));
        }
        state.data.push(data.clone());
        Ok(())
    }
}
