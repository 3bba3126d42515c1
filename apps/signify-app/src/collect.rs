//! 采集周期：读取租户配置 → 处理启用/活跃标记 → 每个租户一个同步周期。
//!
//! 周期内同步创建了新资产，或租户当前没有订阅（刚重新启用、上次建立失败）时，
//! 重建该租户的推送通道。

use crate::runner::RunOnce;
use domain::Configuration;
use signify_realtime::{SubscriptionManager, TenantState};
use signify_storage::{ConfigurationStore, StorageError};
use signify_sync::SyncEngine;
use signify_telemetry::{record_sync_cycle, record_sync_failure};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct Collector {
    configs: Arc<dyn ConfigurationStore>,
    engine: Arc<SyncEngine>,
    subscriptions: Arc<SubscriptionManager>,
    runner: RunOnce,
}

impl Collector {
    pub fn new(
        configs: Arc<dyn ConfigurationStore>,
        engine: Arc<SyncEngine>,
        subscriptions: Arc<SubscriptionManager>,
    ) -> Self {
        Self {
            configs,
            engine,
            subscriptions,
            runner: RunOnce::new(),
        }
    }

    /// 启动时全部置为不活跃，然后为已启用的租户建立订阅。
    pub async fn start(&self) -> Result<(), StorageError> {
        let reset = self.configs.set_all_inactive().await?;
        info!(target: "signify.app", configurations = reset, "configurations_reset");
        for config in self.configs.list_configurations().await? {
            if !config.is_enabled() {
                continue;
            }
            if let Err(err) = self.subscriptions.rebuild_all(&config).await {
                warn!(
                    target: "signify.app",
                    config_id = config.id,
                    error = %err,
                    "initial_subscribe_failed"
                );
            }
        }
        Ok(())
    }

    /// 按固定间隔循环执行 [`Collector::collect`]。
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.collect().await {
                error!(target: "signify.app", error = %err, "collect_failed");
            }
        }
    }

    /// 单轮调度：返回本轮新启动的租户周期数。
    pub async fn collect(self: &Arc<Self>) -> Result<usize, StorageError> {
        let mut started = 0;
        for config in self.configs.list_configurations().await? {
            if !config.is_enabled() {
                if config.is_active() {
                    self.configs.set_active(config.id, false).await?;
                    self.subscriptions.close_all(&config).await;
                    info!(target: "signify.app", config_id = config.id, "configuration_deactivated");
                }
                continue;
            }

            if !config.is_active() {
                self.configs.set_active(config.id, true).await?;
                info!(
                    target: "signify.app",
                    config_id = config.id,
                    refresh_interval = config.refresh_interval,
                    request_timeout = config.request_timeout_seconds(),
                    project_ids = ?config.project_ids(),
                    filter_groups = config.asset_filter.len(),
                    "configuration_activated"
                );
            }

            let this = self.clone();
            let config_id = config.id;
            if self.runner.spawn(config_id, async move { this.cycle(config).await }) {
                started += 1;
            }
        }
        Ok(started)
    }

    /// 同步 → 有新资产或订阅空闲则重建订阅 → 等待刷新间隔（失败同样等待，下一周期重试）。
    async fn cycle(&self, config: Configuration) {
        info!(target: "signify.app", config_id = config.id, "cycle_started");
        match self.engine.sync(&config).await {
            Ok(created) => {
                record_sync_cycle();
                info!(target: "signify.app", config_id = config.id, created, "cycle_finished");
                let idle = self.subscriptions.state(config.id) == TenantState::Idle;
                if created > 0 || idle {
                    match self.subscriptions.rebuild_all(&config).await {
                        Ok(channels) => info!(
                            target: "signify.app",
                            config_id = config.id,
                            created,
                            idle,
                            channels,
                            "resubscribed"
                        ),
                        Err(err) => warn!(
                            target: "signify.app",
                            config_id = config.id,
                            error = %err,
                            "resubscribe_failed"
                        ),
                    }
                }
            }
            Err(err) => {
                record_sync_failure();
                error!(target: "signify.app", config_id = config.id, error = %err, "cycle_failed");
            }
        }
        tokio::time::sleep(Duration::from_secs(config.refresh_interval)).await;
    }

    pub fn is_running(&self, config_id: i64) -> bool {
        self.runner.is_running(config_id)
    }
}

#[cfg(test)]
mod tests {
    use super::Collector;
    use crate::handler::DispatchHandler;
    use async_trait::async_trait;
    use domain::{AssetKind, Configuration, LocationRecord, SubscriptionCategory, TenantContext};
    use signify_auth::{AuthError, TokenCache, TokenExchanger};
    use signify_hierarchy::{FetchError, HierarchyFetcher, HttpSignifyApi, SignifyApi};
    use signify_ingest::IngestDispatcher;
    use signify_platform::InMemoryAssetPlatform;
    use signify_realtime::{
        PushConnection, PushConnector, RealtimeError, SubscriptionManager, TenantState,
        WebSocketConnector,
    };
    use signify_storage::{
        AssetRecord, AssetStore, ConfigurationStore, InMemoryAssetStore,
        InMemoryConfigurationStore, StorageError,
    };
    use signify_sync::{AssetRegistry, SyncEngine};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct NoExchange;

    #[async_trait]
    impl TokenExchanger for NoExchange {
        async fn exchange(&self, _config: &Configuration) -> Result<(String, i64), AuthError> {
            Err(AuthError::Fault("not expected".to_string()))
        }
    }

    struct StaticExchange;

    #[async_trait]
    impl TokenExchanger for StaticExchange {
        async fn exchange(&self, _config: &Configuration) -> Result<(String, i64), AuthError> {
            Ok(("token".to_string(), 3_600))
        }
    }

    /// 只提供订阅 URL 的远端。
    struct PushApi;

    #[async_trait]
    impl SignifyApi for PushApi {
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
            Ok(format!("wss://push/{}/{}", building_uuid, category))
        }
    }

    /// 连接后一直空闲，直到被关闭。
    struct QuietConnector;

    struct QuietConnection;

    #[async_trait]
    impl PushConnection for QuietConnection {
        async fn next_message(&mut self) -> Option<Result<String, RealtimeError>> {
            std::future::pending().await
        }

        async fn close(&mut self) -> Result<(), RealtimeError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PushConnector for QuietConnector {
        async fn connect(&self, _url: &str) -> Result<Box<dyn PushConnection>, RealtimeError> {
            Ok(Box::new(QuietConnection))
        }
    }

    /// 可在测试中切换 `enable` 的配置存储。
    struct ToggleStore {
        inner: InMemoryConfigurationStore,
        enabled: Mutex<HashMap<i64, bool>>,
    }

    impl ToggleStore {
        fn set_enabled(&self, config_id: i64, enable: bool) {
            self.enabled.lock().expect("lock").insert(config_id, enable);
        }
    }

    #[async_trait]
    impl ConfigurationStore for ToggleStore {
        async fn list_configurations(&self) -> Result<Vec<Configuration>, StorageError> {
            let enabled = self.enabled.lock().expect("lock").clone();
            let mut configs = self.inner.list_configurations().await?;
            for config in &mut configs {
                if let Some(enable) = enabled.get(&config.id) {
                    config.enable = Some(*enable);
                }
            }
            Ok(configs)
        }

        async fn set_active(&self, config_id: i64, active: bool) -> Result<bool, StorageError> {
            self.inner.set_active(config_id, active).await
        }

        async fn set_all_inactive(&self) -> Result<u64, StorageError> {
            self.inner.set_all_inactive().await
        }
    }

    fn build(
        store: Arc<dyn ConfigurationStore>,
        assets: Arc<InMemoryAssetStore>,
        api: Arc<dyn SignifyApi>,
        exchanger: Arc<dyn TokenExchanger>,
        connector: Arc<dyn PushConnector>,
    ) -> (Arc<Collector>, Arc<SubscriptionManager>) {
        let platform = Arc::new(InMemoryAssetPlatform::new());
        let tokens = Arc::new(TokenCache::new(exchanger));
        let fetcher = Arc::new(HierarchyFetcher::new(api, tokens));
        let registry = Arc::new(AssetRegistry::new(assets.clone(), platform.clone()));
        let engine = Arc::new(SyncEngine::new(fetcher.clone(), registry));
        let handler = Arc::new(DispatchHandler::new(IngestDispatcher::new(
            assets.clone(),
            platform,
        )));
        let subscriptions = Arc::new(SubscriptionManager::new(fetcher, assets, connector, handler));
        (
            Arc::new(Collector::new(store, engine, subscriptions.clone())),
            subscriptions,
        )
    }

    /// 无目标项目、无楼宇的配置不会触发任何远端请求。
    fn collector(configs: Vec<Configuration>) -> (Arc<Collector>, Arc<InMemoryConfigurationStore>) {
        let store = Arc::new(InMemoryConfigurationStore::with_configurations(configs));
        let (collector, _) = build(
            store.clone(),
            Arc::new(InMemoryAssetStore::new()),
            Arc::new(HttpSignifyApi::default()),
            Arc::new(NoExchange),
            Arc::new(WebSocketConnector),
        );
        (collector, store)
    }

    async fn wait_cycle(collector: &Collector, config_id: i64) {
        for _ in 0..200 {
            if !collector.is_running(config_id) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn configuration(id: i64, enable: bool, active: bool) -> Configuration {
        Configuration {
            id,
            base_url: "https://signify.invalid".to_string(),
            enable: Some(enable),
            active: Some(active),
            refresh_interval: 0,
            ..Configuration::default()
        }
    }

    async fn active_flags(store: &InMemoryConfigurationStore) -> Vec<(i64, Option<bool>)> {
        store
            .list_configurations()
            .await
            .expect("list")
            .into_iter()
            .map(|config| (config.id, config.active))
            .collect()
    }

    #[tokio::test]
    async fn enable_flags_drive_active_state() {
        let (collector, store) = collector(vec![
            configuration(1, true, false),
            configuration(2, false, true),
            configuration(3, false, false),
        ]);

        let started = collector.collect().await.expect("collect");

        assert_eq!(started, 1);
        assert_eq!(
            active_flags(&store).await,
            vec![(1, Some(true)), (2, Some(false)), (3, Some(false))]
        );
    }

    #[tokio::test]
    async fn running_cycle_is_not_restarted() {
        let mut config = configuration(1, true, true);
        config.refresh_interval = 60;
        let (collector, _) = collector(vec![config]);

        assert_eq!(collector.collect().await.expect("collect"), 1);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(collector.is_running(1));
        assert_eq!(collector.collect().await.expect("collect"), 0);
    }

    #[tokio::test]
    async fn reenabled_configuration_is_resubscribed() {
        let store = Arc::new(ToggleStore {
            inner: InMemoryConfigurationStore::with_configurations(vec![configuration(
                1, true, false,
            )]),
            enabled: Mutex::new(HashMap::new()),
        });
        let assets = Arc::new(InMemoryAssetStore::new());
        assets
            .insert_asset(
                &TenantContext::new(1),
                AssetRecord {
                    config_id: 1,
                    project_id: "p1".to_string(),
                    uuid: "b1".to_string(),
                    parent_uuid: Some("site-1".to_string()),
                    global_asset_id: "signify_group_b1".to_string(),
                    kind: AssetKind::Building,
                    asset_id: 10,
                },
            )
            .await
            .expect("insert");
        let (collector, subscriptions) = build(
            store.clone(),
            assets,
            Arc::new(PushApi),
            Arc::new(StaticExchange),
            Arc::new(QuietConnector),
        );

        collector.start().await.expect("start");
        collector.collect().await.expect("collect");
        wait_cycle(&collector, 1).await;
        assert_eq!(subscriptions.channel_count(1), 4);

        store.set_enabled(1, false);
        collector.collect().await.expect("collect");
        assert_eq!(subscriptions.channel_count(1), 0);
        assert_eq!(subscriptions.state(1), TenantState::Idle);

        store.set_enabled(1, true);
        assert_eq!(collector.collect().await.expect("collect"), 1);
        wait_cycle(&collector, 1).await;

        assert_eq!(subscriptions.channel_count(1), 4);
        assert_eq!(subscriptions.state(1), TenantState::Live);
        assert_eq!(active_flags(&store.inner).await, vec![(1, Some(true))]);
    }

    #[tokio::test]
    async fn start_resets_active_flags() {
        let (collector, store) = collector(vec![
            configuration(1, false, true),
            configuration(2, false, true),
        ]);

        collector.start().await.expect("start");

        assert_eq!(
            active_flags(&store).await,
            vec![(1, Some(false)), (2, Some(false))]
        );
    }
}
