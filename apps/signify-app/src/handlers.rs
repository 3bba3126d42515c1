//! HTTP 处理器：健康检查、版本、计数器与租户订阅状态。

use crate::AppState;
use api_contract::{
    ApiResponse, ChannelStatusDto, ConfigurationStatusDto, MetricsSnapshotDto, VersionDto,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use signify_telemetry::metrics;
use tracing::warn;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn version() -> Response {
    let dto = VersionDto {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    let dto = MetricsSnapshotDto {
        sync_cycles: snapshot.sync_cycles,
        sync_failures: snapshot.sync_failures,
        assets_created: snapshot.assets_created,
        token_refreshes: snapshot.token_refreshes,
        channels_opened: snapshot.channels_opened,
        channel_reconnects: snapshot.channel_reconnects,
        subscription_url_failures: snapshot.subscription_url_failures,
        messages_received: snapshot.messages_received,
        data_write_success: snapshot.data_write_success,
        data_write_failure: snapshot.data_write_failure,
    };
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}

pub async fn get_status(State(state): State<AppState>) -> Response {
    let configs = match state.configs.list_configurations().await {
        Ok(configs) => configs,
        Err(err) => {
            warn!(target: "signify.app", error = %err, "status_unavailable");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<()>::error(
                    "STATUS.UNAVAILABLE",
                    err.to_string(),
                )),
            )
                .into_response();
        }
    };
    let items: Vec<ConfigurationStatusDto> = configs
        .iter()
        .map(|config| ConfigurationStatusDto {
            id: config.id,
            enabled: config.is_enabled(),
            active: config.is_active(),
            subscription_state: state.subscriptions.state(config.id).to_string(),
            channels: state
                .subscriptions
                .channel_states(config.id)
                .into_iter()
                .map(|(building_uuid, category, channel)| ChannelStatusDto {
                    building_uuid,
                    category: category.to_string(),
                    state: channel.to_string(),
                })
                .collect(),
        })
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(items))).into_response()
}
