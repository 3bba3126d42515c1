//! 订阅管理：按租户持有通道集合，整体关闭后重建。
//!
//! 租户状态：`Idle → Subscribing → Live`，重建时回到 `Subscribing`，`close_all` 后为 `Idle`。
//! 重建与关闭由进程级互斥锁串行化（跨全部租户），消费者不会观察到两代通道并存。

use crate::channel::{ChannelHandle, ChannelState, DEFAULT_RECONNECT_BACKOFF};
use crate::connector::PushConnector;
use crate::{MessageHandler, RealtimeError};
use domain::{AssetKind, Configuration, SubscriptionCategory};
use signify_hierarchy::HierarchyFetcher;
use signify_storage::AssetStore;
use signify_telemetry::{record_channel_opened, record_subscription_url_failure};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantState {
    Idle,
    Subscribing,
    Live,
}

impl fmt::Display for TenantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantState::Idle => write!(f, "idle"),
            TenantState::Subscribing => write!(f, "subscribing"),
            TenantState::Live => write!(f, "live"),
        }
    }
}

struct TenantChannels {
    state: TenantState,
    channels: Vec<ChannelHandle>,
}

impl TenantChannels {
    fn idle() -> Self {
        Self {
            state: TenantState::Idle,
            channels: Vec::new(),
        }
    }
}

pub struct SubscriptionManager {
    fetcher: Arc<HierarchyFetcher>,
    store: Arc<dyn AssetStore>,
    connector: Arc<dyn PushConnector>,
    handler: Arc<dyn MessageHandler>,
    backoff: Duration,
    rebuild_lock: AsyncMutex<()>,
    tenants: Mutex<HashMap<i64, TenantChannels>>,
}

impl SubscriptionManager {
    pub fn new(
        fetcher: Arc<HierarchyFetcher>,
        store: Arc<dyn AssetStore>,
        connector: Arc<dyn PushConnector>,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            fetcher,
            store,
            connector,
            handler,
            backoff: DEFAULT_RECONNECT_BACKOFF,
            rebuild_lock: AsyncMutex::new(()),
            tenants: Mutex::new(HashMap::new()),
        }
    }

    /// 覆盖断线重连间隔。
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// 关闭租户现有通道，按已登记的楼宇 × 四类传感重新订阅，返回新通道数。
    ///
    /// 单个订阅地址获取失败只跳过该组合；楼宇列表读取失败时租户回到 `Idle`。
    pub async fn rebuild_all(&self, config: &Configuration) -> Result<usize, RealtimeError> {
        let _guard = self.rebuild_lock.lock().await;
        info!(
            target: "signify.realtime",
            config_id = config.id,
            "subscriptions_rebuild_started"
        );

        let previous = self.take_channels(config.id, TenantState::Subscribing);
        let closed = previous.len();
        for channel in previous {
            channel.close().await;
        }

        let buildings = match self.building_uuids(config).await {
            Ok(buildings) => buildings,
            Err(err) => {
                self.install(config.id, TenantState::Idle, Vec::new());
                return Err(err);
            }
        };

        let shared = Arc::new(config.clone());
        let mut channels = Vec::new();
        for category in SubscriptionCategory::ALL {
            for building_uuid in &buildings {
                let url = match self
                    .fetcher
                    .subscription_url(config, building_uuid, category)
                    .await
                {
                    Ok(url) => url,
                    Err(err) => {
                        record_subscription_url_failure();
                        warn!(
                            target: "signify.realtime",
                            config_id = config.id,
                            building_uuid = %building_uuid,
                            category = %category,
                            error = %err,
                            "subscription_url_failed"
                        );
                        continue;
                    }
                };
                channels.push(ChannelHandle::spawn(
                    shared.clone(),
                    building_uuid.clone(),
                    category,
                    url,
                    self.connector.clone(),
                    self.handler.clone(),
                    self.backoff,
                ));
                record_channel_opened();
            }
        }

        let opened = channels.len();
        self.install(config.id, TenantState::Live, channels);
        info!(
            target: "signify.realtime",
            config_id = config.id,
            buildings = buildings.len(),
            closed,
            opened,
            "subscriptions_rebuilt"
        );
        Ok(opened)
    }

    /// 关闭租户全部通道（配置被禁用时）。
    pub async fn close_all(&self, config: &Configuration) -> usize {
        let _guard = self.rebuild_lock.lock().await;
        let previous = self.take_channels(config.id, TenantState::Idle);
        let closed = previous.len();
        for channel in previous {
            channel.close().await;
        }
        if closed > 0 {
            info!(
                target: "signify.realtime",
                config_id = config.id,
                closed,
                "subscriptions_closed"
            );
        }
        closed
    }

    pub fn channel_count(&self, config_id: i64) -> usize {
        self.with_tenants(|tenants| {
            tenants
                .get(&config_id)
                .map(|tenant| tenant.channels.len())
                .unwrap_or_default()
        })
    }

    pub fn state(&self, config_id: i64) -> TenantState {
        self.with_tenants(|tenants| {
            tenants
                .get(&config_id)
                .map(|tenant| tenant.state)
                .unwrap_or(TenantState::Idle)
        })
    }

    /// 租户各通道的 (楼宇, 类别, 状态)。
    pub fn channel_states(
        &self,
        config_id: i64,
    ) -> Vec<(String, SubscriptionCategory, ChannelState)> {
        self.with_tenants(|tenants| {
            tenants
                .get(&config_id)
                .map(|tenant| {
                    tenant
                        .channels
                        .iter()
                        .map(|channel| {
                            (
                                channel.building_uuid().to_string(),
                                channel.category(),
                                channel.state(),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// 跨项目去重后的楼宇 UUID，保持登记顺序。
    async fn building_uuids(&self, config: &Configuration) -> Result<Vec<String>, RealtimeError> {
        let records = self
            .store
            .list_assets_by_kind(&config.context(), AssetKind::Building)
            .await?;
        let mut seen = HashSet::new();
        Ok(records
            .into_iter()
            .filter(|record| seen.insert(record.uuid.clone()))
            .map(|record| record.uuid)
            .collect())
    }

    fn take_channels(&self, config_id: i64, state: TenantState) -> Vec<ChannelHandle> {
        self.with_tenants(|tenants| {
            let tenant = tenants
                .entry(config_id)
                .or_insert_with(TenantChannels::idle);
            tenant.state = state;
            std::mem::take(&mut tenant.channels)
        })
    }

    fn install(&self, config_id: i64, state: TenantState, channels: Vec<ChannelHandle>) {
        self.with_tenants(|tenants| {
            tenants.insert(config_id, TenantChannels { state, channels });
        })
    }

    fn with_tenants<T>(&self, f: impl FnOnce(&mut HashMap<i64, TenantChannels>) -> T) -> T {
        match self.tenants.lock() {
            Ok(mut tenants) => f(&mut tenants),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
