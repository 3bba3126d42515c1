//! 实时订阅能力：每个楼宇 × 传感类别一条推送通道。
//!
//! - `connector`：推送连接抽象与 WebSocket 实现
//! - `message`：线上消息解码与占用状态换算
//! - `channel`：单条通道的读取与断线重连循环
//! - `manager`：按租户整体重建 / 关闭通道集合

pub mod channel;
pub mod connector;
pub mod manager;
pub mod message;

use async_trait::async_trait;
use domain::{Configuration, SensorMessage};
use signify_storage::StorageError;

pub use channel::{ChannelHandle, ChannelState, DEFAULT_RECONNECT_BACKOFF};
pub use connector::{PushConnection, PushConnector, WebSocketConnector};
pub use manager::{SubscriptionManager, TenantState};
pub use message::{decode_message, translate};

/// 实时订阅错误。
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("connect {url} failed: {message}")]
    Connect { url: String, message: String },
    #[error("push channel failed: {0}")]
    Transport(String),
    #[error("push message decode failed: {0}")]
    Decode(String),
    #[error(transparent)]
    Store(#[from] StorageError),
}

/// 推送消息处理器（由应用层接到数据分发）。
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, config: &Configuration, message: SensorMessage);
}
