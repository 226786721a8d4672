//! Reset API handler

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::{ApiError, ErrorResponse};
use crate::AppState;

/// Clear every account
#[utoipa::path(
    post,
    path = "/reset",
    responses(
        (status = 200, description = "All accounts cleared", body = String, content_type = "text/plain"),
        (status = 500, description = "Backing storage could not be cleared", body = ErrorResponse)
    ),
    tag = "ledger"
)]
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<(StatusCode, &'static str), ApiError> {
    if state.account_service.reset_all().await {
        Ok((StatusCode::OK, "OK"))
    } else {
        Err(ApiError::Internal("Failed to reset account storage".to_string()))
    }
}
