use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "ai": state.synthesizer.is_ai_enabled(),
            "registry": state.registry.mode(),
            "publish": state.registry.can_publish(),
        })),
    )
}
