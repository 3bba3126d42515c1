//! 数据接入能力：推送消息按空间 UUID 找到资产，按子类型写入平台。

use domain::{Configuration, SensorMessage};
use serde_json::{Map, Value};
use signify_platform::{AssetData, AssetPlatform, DataSubtype};
use signify_storage::{AssetStore, StorageError};
use signify_telemetry::{record_data_write_failure, record_data_write_success};
use std::sync::Arc;
use tracing::{debug, warn};

/// 分发错误。单个子类型写入失败不在此列，只计入 [`DispatchSummary`]。
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("asset lookup for space {space_id} failed: {source}")]
    Lookup {
        space_id: String,
        #[source]
        source: StorageError,
    },
}

/// 一次分发的结果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// 匹配到的资产数。
    pub assets: usize,
    pub written: usize,
    pub failed: usize,
}

/// 按子类型拆分消息中已填充的测量字段；空子类型不出现。
pub fn measurement_data(message: &SensorMessage) -> Vec<(DataSubtype, Map<String, Value>)> {
    let mut input = Map::new();
    if let Some(count) = message.count {
        input.insert("people_count".to_string(), Value::from(count));
    }
    if let Some(temperature) = message.temperature {
        input.insert("temperature".to_string(), Value::from(temperature));
    }
    if let Some(humidity) = message.humidity {
        input.insert("humidity".to_string(), Value::from(humidity));
    }
    if let Some(occupancy) = message.occupancy {
        input.insert("occupancy".to_string(), Value::from(occupancy));
    }

    let mut info = Map::new();
    if let Some(unit) = &message.unit {
        info.insert("unit".to_string(), Value::from(unit.clone()));
    }

    [(DataSubtype::Input, input), (DataSubtype::Info, info)]
        .into_iter()
        .filter(|(_, data)| !data.is_empty())
        .collect()
}

pub struct IngestDispatcher {
    store: Arc<dyn AssetStore>,
    platform: Arc<dyn AssetPlatform>,
}

impl IngestDispatcher {
    pub fn new(store: Arc<dyn AssetStore>, platform: Arc<dyn AssetPlatform>) -> Self {
        Self { store, platform }
    }

    /// 写入该空间在租户下的全部资产（同一空间可能映射到多个项目）。
    pub async fn dispatch(
        &self,
        config: &Configuration,
        message: &SensorMessage,
    ) -> Result<DispatchSummary, DispatchError> {
        let records = self
            .store
            .list_assets_by_uuid(&config.context(), &message.space_id)
            .await
            .map_err(|source| DispatchError::Lookup {
                space_id: message.space_id.clone(),
                source,
            })?;
        let mut summary = DispatchSummary {
            assets: records.len(),
            ..DispatchSummary::default()
        };
        if records.is_empty() {
            debug!(
                target: "signify.ingest",
                config_id = config.id,
                space_id = %message.space_id,
                "space_unmapped"
            );
            return Ok(summary);
        }

        let parts = measurement_data(message);
        let timestamp = (message.timestamp > 0).then_some(message.timestamp);
        for record in &records {
            for (subtype, data) in &parts {
                let write = AssetData {
                    asset_id: record.asset_id,
                    subtype: *subtype,
                    timestamp,
                    data: data.clone(),
                };
                match self.platform.upsert_data(&write).await {
                    Ok(()) => {
                        summary.written += 1;
                        record_data_write_success();
                        debug!(
                            target: "signify.ingest",
                            config_id = config.id,
                            asset_id = record.asset_id,
                            subtype = subtype.as_str(),
                            "data_written"
                        );
                    }
                    Err(err) => {
                        summary.failed += 1;
                        record_data_write_failure();
                        warn!(
                            target: "signify.ingest",
                            config_id = config.id,
                            asset_id = record.asset_id,
                            subtype = subtype.as_str(),
                            error = %err,
                            "data_write_failed"
                        );
                    }
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> SensorMessage {
        SensorMessage {
            space_id: "s1".to_string(),
            timestamp: 0,
            count: None,
            temperature: None,
            humidity: None,
            unit: None,
            occupancy: None,
        }
    }

    #[test]
    fn empty_message_has_no_parts() {
        assert!(measurement_data(&message()).is_empty());
    }

    #[test]
    fn unit_goes_to_info() {
        let message = SensorMessage {
            temperature: Some(21.5),
            unit: Some("C".to_string()),
            ..message()
        };
        let parts = measurement_data(&message);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, DataSubtype::Input);
        assert_eq!(parts[0].1.get("temperature"), Some(&Value::from(21.5)));
        assert_eq!(parts[1].0, DataSubtype::Info);
        assert_eq!(parts[1].1.get("unit"), Some(&Value::from("C")));
    }
}
