use async_trait::async_trait;
use domain::{AssetKind, Configuration, LocationRecord, SensorMessage, SubscriptionCategory};
use signify_auth::{AuthError, TokenCache, TokenExchanger};
use signify_hierarchy::{FetchError, HierarchyFetcher, SignifyApi};
use signify_realtime::{
    MessageHandler, PushConnection, PushConnector, RealtimeError, SubscriptionManager,
    TenantState,
};
use signify_storage::{AssetRecord, AssetStore, InMemoryAssetStore};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

struct StaticExchanger;

#[async_trait]
impl TokenExchanger for StaticExchanger {
    async fn exchange(&self, _config: &Configuration) -> Result<(String, i64), AuthError> {
        Ok(("token".to_string(), 3_600))
    }
}

#[derive(Default)]
struct SubscriptionApi {
    failing: HashSet<(String, SubscriptionCategory)>,
    requests: AtomicUsize,
}

#[async_trait]
impl SignifyApi for SubscriptionApi {
    async fn fetch_locations(
        &self,
        _config: &Configuration,
        _token: &str,
        _endpoint: &str,
    ) -> Result<Vec<LocationRecord>, FetchError> {
        Ok(Vec::new())
    }

    async fn subscription_url(
        &self,
        _config: &Configuration,
        _token: &str,
        building_uuid: &str,
        category: SubscriptionCategory,
    ) -> Result<String, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&(building_uuid.to_string(), category)) {
            return Err(FetchError::Subscription {
                endpoint: format!("/subscription/{}/{}", building_uuid, category),
                errors: "[\"denied\"]".to_string(),
            });
        }
        Ok(push_url(building_uuid, category))
    }
}

fn push_url(building_uuid: &str, category: SubscriptionCategory) -> String {
    format!("wss://push/{}/{}", building_uuid, category)
}

/// 内存推送连接：测试端通过 sender 投递消息，丢弃 sender 即模拟断线。
#[derive(Default)]
struct FakeConnector {
    senders: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<String>>>>,
    connects: Mutex<HashMap<String, usize>>,
    open: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl FakeConnector {
    fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    fn connects(&self, url: &str) -> usize {
        self.connects
            .lock()
            .map(|map| map.get(url).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    fn push(&self, url: &str, text: &str) -> bool {
        let senders = self.senders.lock().expect("lock");
        senders
            .get(url)
            .and_then(|list| list.last())
            .is_some_and(|sender| sender.send(text.to_string()).is_ok())
    }

    fn drop_connections(&self, url: &str) {
        self.senders.lock().expect("lock").remove(url);
    }
}

struct FakeConnection {
    rx: mpsc::UnboundedReceiver<String>,
    open: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PushConnection for FakeConnection {
    async fn next_message(&mut self) -> Option<Result<String, RealtimeError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), RealtimeError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl PushConnector for FakeConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushConnection>, RealtimeError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .lock()
            .expect("lock")
            .entry(url.to_string())
            .or_default()
            .push(tx);
        *self
            .connects
            .lock()
            .expect("lock")
            .entry(url.to_string())
            .or_default() += 1;
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            rx,
            open: self.open.clone(),
            closes: self.closes.clone(),
        }))
    }
}

#[derive(Default)]
struct RecordingHandler {
    messages: Mutex<Vec<(i64, SensorMessage)>>,
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(&self, config: &Configuration, message: SensorMessage) {
        self.messages.lock().expect("lock").push((config.id, message));
    }
}

struct Harness {
    api: Arc<SubscriptionApi>,
    connector: Arc<FakeConnector>,
    handler: Arc<RecordingHandler>,
    manager: Arc<SubscriptionManager>,
}

async fn harness(api: SubscriptionApi) -> Harness {
    let api = Arc::new(api);
    let store = Arc::new(InMemoryAssetStore::new());
    let config = config();
    let ctx = config.context();
    // b1 在两个项目下各登记一次，订阅时只算一栋楼。
    for (project_id, uuid) in [("p1", "b1"), ("p1", "b2"), ("p2", "b1")] {
        store
            .insert_asset(
                &ctx,
                AssetRecord {
                    config_id: config.id,
                    project_id: project_id.to_string(),
                    uuid: uuid.to_string(),
                    parent_uuid: Some("site-1".to_string()),
                    global_asset_id: format!("signify_group_{}", uuid),
                    kind: AssetKind::Building,
                    asset_id: 10,
                },
            )
            .await
            .expect("insert");
    }
    store
        .insert_asset(
            &ctx,
            AssetRecord {
                config_id: config.id,
                project_id: "p1".to_string(),
                uuid: "b1-f1".to_string(),
                parent_uuid: Some("b1".to_string()),
                global_asset_id: "signify_group_b1-f1".to_string(),
                kind: AssetKind::Storey,
                asset_id: 11,
            },
        )
        .await
        .expect("insert");

    let tokens = Arc::new(TokenCache::new(Arc::new(StaticExchanger)));
    let fetcher = Arc::new(HierarchyFetcher::new(api.clone(), tokens));
    let connector = Arc::new(FakeConnector::default());
    let handler = Arc::new(RecordingHandler::default());
    let manager = SubscriptionManager::new(fetcher, store, connector.clone(), handler.clone())
        .with_backoff(Duration::from_millis(20));
    Harness {
        api,
        connector,
        handler,
        manager: Arc::new(manager),
    }
}

fn config() -> Configuration {
    Configuration {
        id: 1,
        base_url: "https://signify.example".to_string(),
        project_ids: Some(vec!["p1".to_string(), "p2".to_string()]),
        ..Configuration::default()
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[tokio::test]
async fn rebuild_opens_one_channel_per_building_and_category() {
    let harness = harness(SubscriptionApi::default()).await;
    assert_eq!(harness.manager.state(1), TenantState::Idle);

    let opened = harness.manager.rebuild_all(&config()).await.expect("rebuild");

    assert_eq!(opened, 8);
    assert_eq!(harness.manager.channel_count(1), 8);
    assert_eq!(harness.manager.state(1), TenantState::Live);
    assert_eq!(harness.api.requests.load(Ordering::SeqCst), 8);
    assert!(eventually(|| harness.connector.open() == 8).await);
    for category in SubscriptionCategory::ALL {
        assert_eq!(harness.connector.connects(&push_url("b1", category)), 1);
        assert_eq!(harness.connector.connects(&push_url("b2", category)), 1);
    }
}

#[tokio::test]
async fn rebuild_closes_previous_generation() {
    let harness = harness(SubscriptionApi::default()).await;
    harness.manager.rebuild_all(&config()).await.expect("rebuild");
    assert!(eventually(|| harness.connector.open() == 8).await);

    let opened = harness.manager.rebuild_all(&config()).await.expect("rebuild");

    assert_eq!(opened, 8);
    assert_eq!(harness.connector.closes.load(Ordering::SeqCst), 8);
    assert!(eventually(|| harness.connector.open() == 8).await);
    assert_eq!(harness.manager.channel_count(1), 8);
}

#[tokio::test]
async fn concurrent_rebuilds_leave_single_channel_set() {
    let harness = harness(SubscriptionApi::default()).await;
    let first = harness.manager.clone();
    let second = harness.manager.clone();

    let (a, b) = tokio::join!(
        async move { first.rebuild_all(&config()).await },
        async move { second.rebuild_all(&config()).await }
    );

    assert_eq!(a.expect("rebuild"), 8);
    assert_eq!(b.expect("rebuild"), 8);
    assert_eq!(harness.manager.channel_count(1), 8);
    assert!(eventually(|| harness.connector.open() == 8).await);
    // 稍后再确认没有残留的上一代连接重新连上。
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.connector.open(), 8);
}

#[tokio::test]
async fn subscription_url_failure_skips_only_that_pair() {
    let mut api = SubscriptionApi::default();
    api.failing
        .insert(("b2".to_string(), SubscriptionCategory::Occupancy));
    let harness = harness(api).await;

    let opened = harness.manager.rebuild_all(&config()).await.expect("rebuild");

    assert_eq!(opened, 7);
    let states = harness.manager.channel_states(1);
    assert!(
        !states
            .iter()
            .any(|(building, category, _)| building == "b2"
                && *category == SubscriptionCategory::Occupancy)
    );
}

#[tokio::test]
async fn messages_are_translated_before_handling() {
    let harness = harness(SubscriptionApi::default()).await;
    harness.manager.rebuild_all(&config()).await.expect("rebuild");
    let url = push_url("b1", SubscriptionCategory::Occupancy);
    assert!(eventually(|| harness.connector.connects(&url) == 1).await);

    assert!(harness.connector.push(
        &url,
        r#"{"spaceId":"s1","timestamp":1700000000000,"occupancy":"unoccupied"}"#
    ));
    assert!(harness.connector.push(&url, "not json"));
    assert!(harness.connector.push(
        &url,
        r#"{"spaceId":"s2","timestamp":1700000000001,"count":4}"#
    ));

    assert!(
        eventually(|| harness.handler.messages.lock().map(|m| m.len()).unwrap_or(0) == 2).await
    );
    let messages = harness.handler.messages.lock().expect("lock").clone();
    assert_eq!(messages[0].0, 1);
    assert_eq!(messages[0].1.space_id, "s1");
    assert_eq!(messages[0].1.occupancy, Some(-1));
    assert_eq!(messages[1].1.count, Some(4));
    assert_eq!(messages[1].1.occupancy, None);
}

#[tokio::test]
async fn dropped_channel_reconnects_to_same_url() {
    let harness = harness(SubscriptionApi::default()).await;
    harness.manager.rebuild_all(&config()).await.expect("rebuild");
    let url = push_url("b2", SubscriptionCategory::Humidity);
    assert!(eventually(|| harness.connector.connects(&url) == 1).await);

    harness.connector.drop_connections(&url);

    assert!(eventually(|| harness.connector.connects(&url) == 2).await);
    assert_eq!(harness.manager.channel_count(1), 8);
    assert_eq!(harness.api.requests.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn close_all_returns_tenant_to_idle() {
    let harness = harness(SubscriptionApi::default()).await;
    harness.manager.rebuild_all(&config()).await.expect("rebuild");
    assert!(eventually(|| harness.connector.open() == 8).await);

    let closed = harness.manager.close_all(&config()).await;

    assert_eq!(closed, 8);
    assert_eq!(harness.manager.state(1), TenantState::Idle);
    assert_eq!(harness.manager.channel_count(1), 0);
    assert!(eventually(|| harness.connector.open() == 0).await);
}

#[tokio::test]
async fn tenants_are_rebuilt_independently() {
    let harness = harness(SubscriptionApi::default()).await;
    harness.manager.rebuild_all(&config()).await.expect("rebuild");

    let other = Configuration {
        id: 2,
        ..config()
    };
    let opened = harness.manager.rebuild_all(&other).await.expect("rebuild");

    assert_eq!(opened, 0);
    assert_eq!(harness.manager.channel_count(1), 8);
    assert_eq!(harness.manager.state(2), TenantState::Live);
}
