use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::bsc::is_valid_address;
use crate::errors::AppError;
use crate::models::PortfolioSnapshot;
use crate::AppState;

/// `address` stays untyped so a non-string value is reported as an
/// invalid address rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct PortfolioRequest {
    #[serde(default)]
    pub address: Option<Value>,
}

pub async fn scan(
    State(state): State<AppState>,
    body: Result<Json<PortfolioRequest>, JsonRejection>,
) -> Result<Json<PortfolioSnapshot>, AppError> {
    let invalid = || AppError::BadRequest("Invalid address".into());
    let Json(body) = body.map_err(|_| invalid())?;
    let address = body
        .address
        .as_ref()
        .and_then(Value::as_str)
        .filter(|a| is_valid_address(a))
        .ok_or_else(invalid)?;

    Ok(Json(state.scanner.scan(address).await))
}
