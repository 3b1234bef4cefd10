use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use yieldpilot::api::router::create_router;
use yieldpilot::config::AppConfig;
use yieldpilot::AppState;

/// Nothing listens here, so every upstream call fails fast.
#[allow(dead_code)]
pub const DEAD_UPSTREAM: &str = "http://127.0.0.1:9";

/// Offline configuration: no credentials, upstreams unreachable.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        bscscan_api_url: format!("{DEAD_UPSTREAM}/api"),
        coingecko_api_url: DEAD_UPSTREAM.into(),
        ..AppConfig::offline()
    }
}

#[allow(dead_code)]
pub fn build_test_app(config: AppConfig) -> Router {
    let metrics_handle = yieldpilot::metrics::init_metrics();
    let state = AppState::from_config(config, metrics_handle).expect("Failed to build test state");
    create_router(state)
}

/// Send a request and decode the JSON body (Null for non-JSON bodies).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}
