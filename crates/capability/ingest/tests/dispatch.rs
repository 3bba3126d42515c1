use async_trait::async_trait;
use domain::{AssetKind, Configuration, SensorMessage, TenantContext};
use serde_json::Value;
use signify_ingest::{DispatchError, DispatchSummary, IngestDispatcher};
use signify_platform::{DataSubtype, InMemoryAssetPlatform};
use signify_storage::{AssetRecord, AssetStore, InMemoryAssetStore, StorageError};
use std::sync::Arc;

fn config() -> Configuration {
    Configuration {
        id: 1,
        project_ids: Some(vec!["p1".to_string(), "p2".to_string()]),
        ..Configuration::default()
    }
}

fn space(project_id: &str, uuid: &str, asset_id: i32) -> AssetRecord {
    AssetRecord {
        config_id: 1,
        project_id: project_id.to_string(),
        uuid: uuid.to_string(),
        parent_uuid: Some("f1".to_string()),
        global_asset_id: format!("signify_occupancy_space_{}", uuid),
        kind: AssetKind::Space,
        asset_id,
    }
}

async fn store_with(records: Vec<AssetRecord>) -> Arc<InMemoryAssetStore> {
    let store = Arc::new(InMemoryAssetStore::new());
    let ctx = TenantContext::new(1);
    for record in records {
        store.insert_asset(&ctx, record).await.expect("insert");
    }
    store
}

fn message(space_id: &str) -> SensorMessage {
    SensorMessage {
        space_id: space_id.to_string(),
        timestamp: 1_700_000_000_000,
        count: None,
        temperature: None,
        humidity: None,
        unit: None,
        occupancy: None,
    }
}

#[tokio::test]
async fn occupancy_delta_is_written_as_input() {
    let store = store_with(vec![space("p1", "s1", 42)]).await;
    let platform = Arc::new(InMemoryAssetPlatform::new());
    let dispatcher = IngestDispatcher::new(store, platform.clone());

    let summary = dispatcher
        .dispatch(
            &config(),
            &SensorMessage {
                occupancy: Some(1),
                ..message("s1")
            },
        )
        .await
        .expect("dispatch");

    assert_eq!(
        summary,
        DispatchSummary {
            assets: 1,
            written: 1,
            failed: 0
        }
    );
    let writes = platform.data_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].asset_id, 42);
    assert_eq!(writes[0].subtype, DataSubtype::Input);
    assert_eq!(writes[0].timestamp, Some(1_700_000_000_000));
    assert_eq!(writes[0].data.get("occupancy"), Some(&Value::from(1)));
}

#[tokio::test]
async fn absent_occupancy_is_not_written() {
    let store = store_with(vec![space("p1", "s1", 42)]).await;
    let platform = Arc::new(InMemoryAssetPlatform::new());
    let dispatcher = IngestDispatcher::new(store, platform.clone());

    dispatcher
        .dispatch(
            &config(),
            &SensorMessage {
                count: Some(3),
                ..message("s1")
            },
        )
        .await
        .expect("dispatch");

    let writes = platform.data_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].data.get("people_count"), Some(&Value::from(3)));
    assert!(writes[0].data.get("occupancy").is_none());
}

#[tokio::test]
async fn space_mapped_into_several_projects_is_written_to_each() {
    let store = store_with(vec![space("p1", "s1", 42), space("p2", "s1", 77)]).await;
    let platform = Arc::new(InMemoryAssetPlatform::new());
    let dispatcher = IngestDispatcher::new(store, platform.clone());

    let summary = dispatcher
        .dispatch(
            &config(),
            &SensorMessage {
                humidity: Some(48.0),
                ..message("s1")
            },
        )
        .await
        .expect("dispatch");

    assert_eq!(summary.assets, 2);
    let mut ids: Vec<i32> = platform.data_writes().iter().map(|w| w.asset_id).collect();
    ids.sort();
    assert_eq!(ids, vec![42, 77]);
}

#[tokio::test]
async fn failing_subtype_does_not_block_others() {
    let store = store_with(vec![space("p1", "s1", 42)]).await;
    let platform = Arc::new(InMemoryAssetPlatform::new());
    platform.fail_subtype(DataSubtype::Input);
    let dispatcher = IngestDispatcher::new(store, platform.clone());

    let summary = dispatcher
        .dispatch(
            &config(),
            &SensorMessage {
                temperature: Some(22.0),
                unit: Some("C".to_string()),
                ..message("s1")
            },
        )
        .await
        .expect("dispatch");

    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed, 1);
    let writes = platform.data_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].subtype, DataSubtype::Info);
}

#[tokio::test]
async fn unknown_space_writes_nothing() {
    let store = store_with(vec![space("p1", "s1", 42)]).await;
    let platform = Arc::new(InMemoryAssetPlatform::new());
    let dispatcher = IngestDispatcher::new(store, platform.clone());

    let summary = dispatcher
        .dispatch(
            &config(),
            &SensorMessage {
                count: Some(1),
                ..message("other")
            },
        )
        .await
        .expect("dispatch");

    assert_eq!(summary, DispatchSummary::default());
    assert!(platform.data_writes().is_empty());
}

struct BrokenStore;

#[async_trait]
impl AssetStore for BrokenStore {
    async fn find_asset_id(
        &self,
        _ctx: &TenantContext,
        _project_id: &str,
        _global_asset_id: &str,
    ) -> Result<Option<i32>, StorageError> {
        Err(StorageError::new("offline"))
    }

    async fn insert_asset(
        &self,
        _ctx: &TenantContext,
        _record: AssetRecord,
    ) -> Result<AssetRecord, StorageError> {
        Err(StorageError::new("offline"))
    }

    async fn list_assets_by_kind(
        &self,
        _ctx: &TenantContext,
        _kind: AssetKind,
    ) -> Result<Vec<AssetRecord>, StorageError> {
        Err(StorageError::new("offline"))
    }

    async fn list_assets_by_uuid(
        &self,
        _ctx: &TenantContext,
        _uuid: &str,
    ) -> Result<Vec<AssetRecord>, StorageError> {
        Err(StorageError::new("offline"))
    }

    async fn delete_configuration_assets(
        &self,
        _ctx: &TenantContext,
    ) -> Result<u64, StorageError> {
        Err(StorageError::new("offline"))
    }
}

#[tokio::test]
async fn lookup_failure_is_reported() {
    let platform = Arc::new(InMemoryAssetPlatform::new());
    let dispatcher = IngestDispatcher::new(Arc::new(BrokenStore), platform);

    let err = dispatcher
        .dispatch(&config(), &message("s1"))
        .await
        .expect_err("lookup");
    let DispatchError::Lookup { space_id, .. } = err;
    assert_eq!(space_id, "s1");
}
