use alloy::primitives::Address;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{PublishStrategy, RegistryStats, StrategyRecord};
use crate::registry::{TOKEN_NAME, TOKEN_SYMBOL};
use crate::AppState;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Body of `POST /api/strategies`. `creator` stands in for the transaction
/// sender on the in-process registry and is ignored on chain.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub creator: Option<Address>,
    #[serde(flatten)]
    pub strategy: PublishStrategy,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUriRequest {
    #[serde(default)]
    pub caller: Option<Address>,
    #[serde(rename = "strategyURI")]
    pub strategy_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryOverview {
    pub name: &'static str,
    pub symbol: &'static str,
    pub mode: &'static str,
    #[serde(flatten)]
    pub stats: RegistryStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorStrategies {
    pub creator: Address,
    pub token_ids: Vec<u64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<StrategyRecord>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let records = state.registry.recent(limit).await?;
    Ok(Json(ApiResponse::ok(records)))
}

pub async fn publish(
    State(state): State<AppState>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<StrategyRecord>>), AppError> {
    let Json(body) = body?;
    let record = state.registry.publish(body.creator, body.strategy).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<StrategyRecord>>, AppError> {
    let record = state.registry.strategy(id).await?;
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn update_uri(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: Result<Json<UpdateUriRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<StrategyRecord>>, AppError> {
    let Json(body) = body?;
    let record = state
        .registry
        .update_uri(body.caller, id, body.strategy_uri)
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RegistryOverview>>, AppError> {
    let stats = state.registry.stats().await?;
    Ok(Json(ApiResponse::ok(RegistryOverview {
        name: TOKEN_NAME,
        symbol: TOKEN_SYMBOL,
        mode: state.registry.mode(),
        stats,
    })))
}

pub async fn by_creator(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<CreatorStrategies>>, AppError> {
    let creator: Address = address
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid address".into()))?;
    let token_ids = state.registry.strategies_by_creator(creator).await?;
    Ok(Json(ApiResponse::ok(CreatorStrategies { creator, token_ids })))
}
