//! 租户配置内存存储实现

use crate::error::StorageError;
use crate::traits::ConfigurationStore;
use domain::Configuration;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 租户配置内存存储
pub struct InMemoryConfigurationStore {
    configs: RwLock<BTreeMap<i64, Configuration>>,
}

impl InMemoryConfigurationStore {
    pub fn new() -> Self {
        Self {
            configs: RwLock::new(BTreeMap::new()),
        }
    }

    /// 以给定配置初始化（按 id 去重，后者覆盖前者）。
    pub fn with_configurations(configs: Vec<Configuration>) -> Self {
        let map = configs
            .into_iter()
            .map(|config| (config.id, config))
            .collect();
        Self {
            configs: RwLock::new(map),
        }
    }

    /// 从 JSON 数组文本加载配置。
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let configs: Vec<Configuration> = serde_json::from_str(json)?;
        Ok(Self::with_configurations(configs))
    }
}

impl Default for InMemoryConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn list_configurations(&self) -> Result<Vec<Configuration>, StorageError> {
        let items = self
            .configs
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default();
        Ok(items)
    }

    async fn set_active(&self, config_id: i64, active: bool) -> Result<bool, StorageError> {
        let mut map = self
            .configs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(&config_id) {
            Some(config) => {
                config.active = Some(active);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_all_inactive(&self) -> Result<u64, StorageError> {
        let mut map = self
            .configs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for config in map.values_mut() {
            config.active = Some(false);
        }
        Ok(map.len() as u64)
    }
}
