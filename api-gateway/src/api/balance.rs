//! Balance API handler

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use common::error::Error;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ApiError, ErrorResponse};
use crate::AppState;

/// Balance query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    /// Account ID
    pub account_id: Option<String>,
}

/// Get the balance of an account
#[utoipa::path(
    get,
    path = "/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Current balance", body = f64),
        (status = 400, description = "Missing or invalid account id", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    tag = "ledger"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<f64>, ApiError> {
    let account_id = query
        .account_id
        .as_deref()
        .and_then(|id| id.trim().parse().ok())
        .ok_or_else(|| Error::InvalidAccountId("account_id must be a positive integer".to_string()))?;

    let balance = state.account_service.get_balance(account_id).await?;
    Ok(Json(balance))
}
