//! 推送消息 → 数据分发。

use async_trait::async_trait;
use domain::{Configuration, SensorMessage};
use signify_ingest::IngestDispatcher;
use signify_realtime::MessageHandler;
use tracing::{debug, warn};

pub struct DispatchHandler {
    dispatcher: IngestDispatcher,
}

impl DispatchHandler {
    pub fn new(dispatcher: IngestDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl MessageHandler for DispatchHandler {
    async fn handle(&self, config: &Configuration, message: SensorMessage) {
        match self.dispatcher.dispatch(config, &message).await {
            Ok(summary) => debug!(
                target: "signify.app",
                config_id = config.id,
                space_id = %message.space_id,
                assets = summary.assets,
                written = summary.written,
                failed = summary.failed,
                "message_dispatched"
            ),
            Err(err) => warn!(
                target: "signify.app",
                config_id = config.id,
                error = %err,
                "message_dispatch_failed"
            ),
        }
    }
}
