//! 路由定义
//!
//! - 健康检查：/health
//! - 版本：/version
//! - 计数器快照：/metrics
//! - 租户订阅状态：/status

use crate::AppState;
use crate::handlers::{get_metrics, get_status, health, version};
use axum::{Router, routing::get};

/// 创建 API 路由，同时挂在 / 与 /api/ 下。
pub fn create_router() -> Router<AppState> {
    let routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/metrics", get(get_metrics))
        .route("/status", get(get_status));
    Router::new().merge(routes.clone()).nest("/api", routes)
}
