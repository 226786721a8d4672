//! Response bodies for ledger events

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use account_service::TransferResult;
use common::model::account::AccountBalance;
use serde::Serialize;
use utoipa::ToSchema;

/// Body returned by a successful `/event` call.
///
/// Deposits report only the destination, withdrawals only the origin and
/// transfers both.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventResponse {
    /// Account funds were taken from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<AccountBalance>,
    /// Account funds were added to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<AccountBalance>,
}

impl EventResponse {
    pub fn deposit(destination: AccountBalance) -> Self {
        Self {
            origin: None,
            destination: Some(destination),
        }
    }

    pub fn withdraw(origin: AccountBalance) -> Self {
        Self {
            origin: Some(origin),
            destination: None,
        }
    }
}

impl From<TransferResult> for EventResponse {
    fn from(result: TransferResult) -> Self {
        Self {
            origin: Some(result.origin),
            destination: Some(result.destination),
        }
    }
}

// Every accepted event is a mutation
impl IntoResponse for EventResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}
