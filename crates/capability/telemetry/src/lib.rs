//! 追踪、请求 ID 与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub sync_cycles: u64,
    pub sync_failures: u64,
    pub assets_created: u64,
    pub token_refreshes: u64,
    pub channels_opened: u64,
    pub channel_reconnects: u64,
    pub subscription_url_failures: u64,
    pub messages_received: u64,
    pub data_write_success: u64,
    pub data_write_failure: u64,
}

/// 进程级计数器。
pub struct TelemetryMetrics {
    sync_cycles: AtomicU64,
    sync_failures: AtomicU64,
    assets_created: AtomicU64,
    token_refreshes: AtomicU64,
    channels_opened: AtomicU64,
    channel_reconnects: AtomicU64,
    subscription_url_failures: AtomicU64,
    messages_received: AtomicU64,
    data_write_success: AtomicU64,
    data_write_failure: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            sync_cycles: AtomicU64::new(0),
            sync_failures: AtomicU64::new(0),
            assets_created: AtomicU64::new(0),
            token_refreshes: AtomicU64::new(0),
            channels_opened: AtomicU64::new(0),
            channel_reconnects: AtomicU64::new(0),
            subscription_url_failures: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            data_write_success: AtomicU64::new(0),
            data_write_failure: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sync_cycles: self.sync_cycles.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
            assets_created: self.assets_created.load(Ordering::Relaxed),
            token_refreshes: self.token_refreshes.load(Ordering::Relaxed),
            channels_opened: self.channels_opened.load(Ordering::Relaxed),
            channel_reconnects: self.channel_reconnects.load(Ordering::Relaxed),
            subscription_url_failures: self.subscription_url_failures.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            data_write_success: self.data_write_success.load(Ordering::Relaxed),
            data_write_failure: self.data_write_failure.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录一次完成的同步周期。
pub fn record_sync_cycle() {
    metrics().sync_cycles.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次失败的同步周期。
pub fn record_sync_failure() {
    metrics().sync_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录新建资产数。
pub fn record_assets_created(count: u64) {
    metrics().assets_created.fetch_add(count, Ordering::Relaxed);
}

/// 记录 Bearer Token 换取次数。
pub fn record_token_refresh() {
    metrics().token_refreshes.fetch_add(1, Ordering::Relaxed);
}

pub fn record_channel_opened() {
    metrics().channels_opened.fetch_add(1, Ordering::Relaxed);
}

pub fn record_channel_reconnect() {
    metrics().channel_reconnects.fetch_add(1, Ordering::Relaxed);
}

/// 记录订阅地址获取失败次数。
pub fn record_subscription_url_failure() {
    metrics()
        .subscription_url_failures
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_message_received() {
    metrics().messages_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录数据写入成功次数（按子类型计）。
pub fn record_data_write_success() {
    metrics().data_write_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录数据写入失败次数（按子类型计）。
pub fn record_data_write_failure() {
    metrics().data_write_failure.fetch_add(1, Ordering::Relaxed);
}
