//! Signify → Eliona 同步服务：周期性建树、推送订阅与状态接口。

mod collect;
mod handler;
mod handlers;
mod routes;
mod runner;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
};
use collect::Collector;
use handler::DispatchHandler;
use signify_auth::{HttpTokenExchanger, TokenCache};
use signify_config::AppConfig;
use signify_hierarchy::{HierarchyFetcher, HttpSignifyApi};
use signify_ingest::IngestDispatcher;
use signify_platform::ElionaClient;
use signify_realtime::{SubscriptionManager, WebSocketConnector};
use signify_storage::{
    AssetStore, ConfigurationStore, InMemoryAssetStore, InMemoryConfigurationStore,
    PgAssetStore, PgConfigurationStore, connect_pool,
};
use signify_sync::{AssetRegistry, SyncEngine};
use signify_telemetry::{init_tracing, new_request_ids};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub configs: Arc<dyn ConfigurationStore>,
    pub subscriptions: Arc<SubscriptionManager>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    // 未配置数据库时使用内存存储（可由 SIGNIFY_CONFIG_FILE 预置租户配置）
    let (assets, configs): (Arc<dyn AssetStore>, Arc<dyn ConfigurationStore>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = connect_pool(database_url).await?;
                let assets: Arc<dyn AssetStore> = Arc::new(PgAssetStore::new(pool.clone()));
                let configs: Arc<dyn ConfigurationStore> = Arc::new(PgConfigurationStore::new(pool));
                (assets, configs)
            }
            None => {
                warn!(target: "signify.app", "in_memory_storage");
                let seeded = match &config.config_file {
                    Some(path) => InMemoryConfigurationStore::from_json(
                        &std::fs::read_to_string(path)?,
                    )?,
                    None => InMemoryConfigurationStore::new(),
                };
                let assets: Arc<dyn AssetStore> = Arc::new(InMemoryAssetStore::new());
                let configs: Arc<dyn ConfigurationStore> = Arc::new(seeded);
                (assets, configs)
            }
        };

    let http = reqwest::Client::new();
    let platform = Arc::new(ElionaClient::new(
        http.clone(),
        config.eliona_api_endpoint.clone(),
        config.eliona_api_token.clone(),
    ));
    let tokens = Arc::new(TokenCache::new(Arc::new(HttpTokenExchanger::new(
        http.clone(),
    ))));
    let fetcher = Arc::new(HierarchyFetcher::new(
        Arc::new(HttpSignifyApi::new(http)),
        tokens,
    ));
    let registry = Arc::new(AssetRegistry::new(assets.clone(), platform.clone()));
    let engine = Arc::new(SyncEngine::new(fetcher.clone(), registry));
    let handler = Arc::new(DispatchHandler::new(IngestDispatcher::new(
        assets.clone(),
        platform,
    )));
    let subscriptions = Arc::new(
        SubscriptionManager::new(fetcher, assets, Arc::new(WebSocketConnector), handler)
            .with_backoff(Duration::from_secs(config.reconnect_backoff_seconds)),
    );

    let collector = Arc::new(Collector::new(
        configs.clone(),
        engine,
        subscriptions.clone(),
    ));
    collector.start().await?;
    tokio::spawn(
        collector.run(Duration::from_secs(config.collect_interval_seconds)),
    );

    let state = AppState {
        configs,
        subscriptions,
    };
    let app = routes::create_router()
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context));

    info!(target: "signify.app", addr = %config.http_addr, "http_listening");
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
