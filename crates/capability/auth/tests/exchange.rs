use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use domain::Configuration;
use signify_auth::{AuthError, HttpTokenExchanger, TokenExchanger};
use std::sync::{Arc, Mutex};

/// 本地令牌端点：固定返回给定状态码与响应体，并记录收到的请求。
struct TokenServer {
    status: StatusCode,
    body: &'static str,
    requests: Mutex<Vec<(Option<String>, String)>>,
}

async fn accesstoken(
    State(server): State<Arc<TokenServer>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    server
        .requests
        .lock()
        .expect("requests")
        .push((authorization, body));
    (server.status, server.body)
}

async fn serve(status: StatusCode, body: &'static str) -> (Configuration, Arc<TokenServer>) {
    let server = Arc::new(TokenServer {
        status,
        body,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/oauth/accesstoken", post(accesstoken))
        .with_state(server.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let config = Configuration {
        id: 1,
        base_url: format!("http://{}/", addr),
        service: "svc".to_string(),
        service_id: "svc-id".to_string(),
        service_secret: "svc-secret".to_string(),
        app_key: "ak".to_string(),
        app_secret: "as".to_string(),
        request_timeout: Some(5),
        ..Configuration::default()
    };
    (config, server)
}

#[tokio::test]
async fn token_is_exchanged_with_form_and_basic_auth() {
    let (config, server) = serve(StatusCode::OK, r#"{"token":"abc","expires_in":3600}"#).await;

    let (token, expires_in) = HttpTokenExchanger::default()
        .exchange(&config)
        .await
        .expect("exchange");

    assert_eq!(token, "abc");
    assert_eq!(expires_in, 3600);
    let requests = server.requests.lock().expect("requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].0.as_deref(),
        Some("Basic c3ZjLWlkOnN2Yy1zZWNyZXQ=")
    );
    assert_eq!(requests[0].1, "app_key=ak&app_secret=as&service=svc");
}

#[tokio::test]
async fn fault_with_success_status_is_rejected() {
    let (config, _server) = serve(StatusCode::OK, r#"{"fault":{"faultstring":"x"}}"#).await;

    let err = HttpTokenExchanger::default()
        .exchange(&config)
        .await
        .expect_err("fault");

    assert!(matches!(err, AuthError::Fault(message) if message == "x"));
}

#[tokio::test]
async fn fault_takes_precedence_over_status() {
    let (config, _server) =
        serve(StatusCode::UNAUTHORIZED, r#"{"fault":{"faultstring":"x"}}"#).await;

    let err = HttpTokenExchanger::default()
        .exchange(&config)
        .await
        .expect_err("fault");

    assert!(matches!(err, AuthError::Fault(message) if message == "x"));
}

#[tokio::test]
async fn error_status_without_fault_is_reported() {
    let (config, _server) = serve(StatusCode::UNAUTHORIZED, "unauthorized").await;

    let err = HttpTokenExchanger::default()
        .exchange(&config)
        .await
        .expect_err("status");

    assert!(matches!(err, AuthError::Status(401)));
}
