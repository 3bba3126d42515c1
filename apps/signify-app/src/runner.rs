//! 按标识去重的任务启动器。
//!
//! 同一租户同一时刻至多一个周期在跑；已在跑时新的启动请求直接丢弃，不排队。

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone, Default)]
pub struct RunOnce {
    running: Arc<Mutex<HashSet<i64>>>,
}

/// 任务结束（含 panic 展开）时释放标识。
struct Slot {
    id: i64,
    running: Arc<Mutex<HashSet<i64>>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        match self.running.lock() {
            Ok(mut running) => running.remove(&self.id),
            Err(poisoned) => poisoned.into_inner().remove(&self.id),
        };
    }
}

impl RunOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标识空闲时启动任务并返回 true，否则丢弃任务返回 false。
    pub fn spawn<F>(&self, id: i64, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let acquired = match self.running.lock() {
            Ok(mut running) => running.insert(id),
            Err(poisoned) => poisoned.into_inner().insert(id),
        };
        if !acquired {
            debug!(target: "signify.app", config_id = id, "cycle_already_running");
            return false;
        }
        let slot = Slot {
            id,
            running: self.running.clone(),
        };
        tokio::spawn(async move {
            let _slot = slot;
            task.await;
        });
        true
    }

    pub fn is_running(&self, id: i64) -> bool {
        self.running
            .lock()
            .map(|running| running.contains(&id))
            .unwrap_or(false)
    }
}
