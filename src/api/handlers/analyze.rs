use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::{AnalysisReport, AnalysisRequest};
use crate::services;
use crate::AppState;

pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, AppError> {
    let Json(body) = body?;
    let report = services::analyze(body, &state.synthesizer).await?;
    Ok(Json(report))
}
