//! 单条推送通道：独立任务读取消息，断线后按固定间隔重连同一地址。
//!
//! ```text
//!  Connecting ──ok──► Live ──drop/error──► Reconnecting ──backoff──► Connecting
//!      │                │                        │
//!      └──────── close signal (any state) ───────┴──► Closed
//! ```
//!
//! 关闭信号同时打断连接、读取与退避等待；被新一轮重建取代的通道不会再重连。

use crate::connector::{PushConnection, PushConnector};
use crate::message::decode_message;
use crate::MessageHandler;
use domain::{Configuration, SubscriptionCategory};
use signify_telemetry::{record_channel_reconnect, record_message_received};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 断线后的固定重连间隔。
pub const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Live,
    Reconnecting,
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Live => write!(f, "live"),
            ChannelState::Reconnecting => write!(f, "reconnecting"),
            ChannelState::Closed => write!(f, "closed"),
        }
    }
}

struct ChannelContext {
    config: Arc<Configuration>,
    building_uuid: String,
    category: SubscriptionCategory,
    url: String,
    connector: Arc<dyn PushConnector>,
    handler: Arc<dyn MessageHandler>,
    backoff: Duration,
}

enum Exit {
    Closed,
    Dropped,
}

/// 通道句柄：持有关闭信号与后台任务。
pub struct ChannelHandle {
    building_uuid: String,
    category: SubscriptionCategory,
    url: String,
    state: watch::Receiver<ChannelState>,
    close_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    /// 启动通道任务。
    pub fn spawn(
        config: Arc<Configuration>,
        building_uuid: impl Into<String>,
        category: SubscriptionCategory,
        url: impl Into<String>,
        connector: Arc<dyn PushConnector>,
        handler: Arc<dyn MessageHandler>,
        backoff: Duration,
    ) -> Self {
        let ctx = ChannelContext {
            config,
            building_uuid: building_uuid.into(),
            category,
            url: url.into(),
            connector,
            handler,
            backoff,
        };
        let building_uuid = ctx.building_uuid.clone();
        let url = ctx.url.clone();
        let (state_tx, state) = watch::channel(ChannelState::Connecting);
        let (close_tx, close_rx) = watch::channel(false);
        let task = tokio::spawn(run(ctx, state_tx, close_rx));
        Self {
            building_uuid,
            category,
            url,
            state,
            close_tx,
            task,
        }
    }

    pub fn building_uuid(&self) -> &str {
        &self.building_uuid
    }

    pub fn category(&self) -> SubscriptionCategory {
        self.category
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// 发送关闭信号并等待任务退出（期间发送正常关闭帧）。
    pub async fn close(self) {
        let _ = self.close_tx.send(true);
        if let Err(err) = self.task.await {
            warn!(
                target: "signify.realtime",
                url = %self.url,
                error = %err,
                "channel_task_failed"
            );
        }
    }
}

async fn run(
    ctx: ChannelContext,
    state_tx: watch::Sender<ChannelState>,
    mut close_rx: watch::Receiver<bool>,
) {
    debug!(
        target: "signify.realtime",
        config_id = ctx.config.id,
        building_uuid = %ctx.building_uuid,
        category = %ctx.category,
        url = %ctx.url,
        "channel_started"
    );
    loop {
        if *close_rx.borrow() {
            break;
        }
        let _ = state_tx.send(ChannelState::Connecting);
        let connected = tokio::select! {
            result = ctx.connector.connect(&ctx.url) => result,
            _ = close_rx.changed() => break,
        };
        match connected {
            Ok(mut connection) => {
                let _ = state_tx.send(ChannelState::Live);
                info!(
                    target: "signify.realtime",
                    config_id = ctx.config.id,
                    url = %ctx.url,
                    "channel_connected"
                );
                if let Exit::Closed = pump(&ctx, &mut connection, &mut close_rx).await {
                    break;
                }
            }
            Err(err) => {
                warn!(
                    target: "signify.realtime",
                    config_id = ctx.config.id,
                    url = %ctx.url,
                    error = %err,
                    "channel_connect_failed"
                );
            }
        }

        let _ = state_tx.send(ChannelState::Reconnecting);
        tokio::select! {
            _ = tokio::time::sleep(ctx.backoff) => {}
            _ = close_rx.changed() => break,
        }
        record_channel_reconnect();
        info!(
            target: "signify.realtime",
            config_id = ctx.config.id,
            url = %ctx.url,
            "channel_reconnecting"
        );
    }
    let _ = state_tx.send(ChannelState::Closed);
    info!(
        target: "signify.realtime",
        config_id = ctx.config.id,
        url = %ctx.url,
        "channel_closed"
    );
}

async fn pump(
    ctx: &ChannelContext,
    connection: &mut Box<dyn PushConnection>,
    close_rx: &mut watch::Receiver<bool>,
) -> Exit {
    loop {
        tokio::select! {
            next = connection.next_message() => match next {
                Some(Ok(text)) => {
                    record_message_received();
                    match decode_message(&text) {
                        Ok(message) => {
                            debug!(
                                target: "signify.realtime",
                                config_id = ctx.config.id,
                                space_id = %message.space_id,
                                "message_received"
                            );
                            ctx.handler.handle(&ctx.config, message).await;
                        }
                        Err(err) => {
                            warn!(
                                target: "signify.realtime",
                                url = %ctx.url,
                                error = %err,
                                "message_skipped"
                            );
                        }
                    }
                }
                Some(Err(err)) => {
                    warn!(
                        target: "signify.realtime",
                        url = %ctx.url,
                        error = %err,
                        "channel_dropped"
                    );
                    return Exit::Dropped;
                }
                None => {
                    info!(target: "signify.realtime", url = %ctx.url, "channel_ended");
                    return Exit::Dropped;
                }
            },
            _ = close_rx.changed() => {
                if let Err(err) = connection.close().await {
                    debug!(
                        target: "signify.realtime",
                        url = %ctx.url,
                        error = %err,
                        "close_frame_failed"
                    );
                }
                return Exit::Closed;
            }
        }
    }
}
