//! Event API handler
//!
//! `POST /event` carries a `type` field naming the operation and the
//! accounts and amount it applies to:
//! - `deposit`: `destination`, `amount`
//! - `withdraw`: `origin`, `amount`
//! - `transfer`: `origin`, `destination`, `amount`
//!
//! Account ids may be sent as integers or numeric strings, amounts as
//! numbers or numeric strings.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use common::error::Error;
use common::model::account::{AccountBalance, AccountId};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;

use crate::api::response::EventResponse;
use crate::error::{ApiError, ErrorResponse};
use crate::AppState;

/// Event request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EventRequest {
    /// Event type: `deposit`, `withdraw` or `transfer`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Account to take funds from
    #[schema(value_type = Option<String>, example = "100")]
    pub origin: Option<Value>,
    /// Account to add funds to
    #[schema(value_type = Option<String>, example = "300")]
    pub destination: Option<Value>,
    /// Amount to move
    #[schema(value_type = Option<f64>, example = 15.0)]
    pub amount: Option<Value>,
}

/// Supported event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Deposit,
    Withdraw,
    Transfer,
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(EventType::Deposit),
            "withdraw" => Ok(EventType::Withdraw),
            "transfer" => Ok(EventType::Transfer),
            _ => Err(Error::UnsupportedOperation(
                "Event type not found or unsupported".to_string(),
            )),
        }
    }
}

/// Read an account id from an integer or a numeric string
pub fn parse_account_id(value: Option<&Value>) -> Option<AccountId> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read an amount from a number or a numeric string
pub fn parse_amount(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Apply a deposit, withdraw or transfer event
#[utoipa::path(
    post,
    path = "/event",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event applied", body = EventResponse),
        (status = 400, description = "Missing or invalid id or amount, or insufficient funds", body = ErrorResponse),
        (status = 404, description = "Unknown account or unsupported event type", body = ErrorResponse)
    ),
    tag = "ledger"
)]
pub async fn handle_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<EventResponse, ApiError> {
    // The body is parsed by hand so a missing content type is not rejected
    let request: EventRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed event body: {}", e)))?;
    debug!("Received event {:?}", request);

    let event_type: EventType = request
        .kind
        .as_deref()
        .unwrap_or_default()
        .parse()?;

    match event_type {
        EventType::Deposit => deposit(&state, &request).await,
        EventType::Withdraw => withdraw(&state, &request).await,
        EventType::Transfer => transfer(&state, &request).await,
    }
}

async fn deposit(state: &AppState, request: &EventRequest) -> Result<EventResponse, ApiError> {
    let (Some(destination), Some(amount)) = (
        parse_account_id(request.destination.as_ref()),
        parse_amount(request.amount.as_ref()),
    ) else {
        return Err(Error::MissingValue("Missing destination or amount".to_string()).into());
    };

    let balance = state.account_service.deposit(destination, amount).await?;
    Ok(EventResponse::deposit(AccountBalance::new(destination, balance)))
}

async fn withdraw(state: &AppState, request: &EventRequest) -> Result<EventResponse, ApiError> {
    let (Some(origin), Some(amount)) = (
        parse_account_id(request.origin.as_ref()),
        parse_amount(request.amount.as_ref()),
    ) else {
        return Err(Error::MissingValue("Missing origin or amount".to_string()).into());
    };

    let balance = state.account_service.withdraw(origin, amount).await?;
    Ok(EventResponse::withdraw(AccountBalance::new(origin, balance)))
}

async fn transfer(state: &AppState, request: &EventRequest) -> Result<EventResponse, ApiError> {
    let (Some(origin), Some(destination), Some(amount)) = (
        parse_account_id(request.origin.as_ref()),
        parse_account_id(request.destination.as_ref()),
        parse_amount(request.amount.as_ref()),
    ) else {
        return Err(Error::MissingValue("Missing origin, destination or amount".to_string()).into());
    };

    let result = state.account_service.transfer(origin, destination, amount).await?;
    Ok(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_account_id() {
        assert_eq!(parse_account_id(Some(&json!(100))), Some(100));
        assert_eq!(parse_account_id(Some(&json!("100"))), Some(100));
        assert_eq!(parse_account_id(Some(&json!(-3))), Some(-3));
        assert_eq!(parse_account_id(Some(&json!(12.0))), Some(12));
        assert_eq!(parse_account_id(Some(&json!(12.5))), None);
        assert_eq!(parse_account_id(Some(&json!("abc"))), None);
        assert_eq!(parse_account_id(Some(&json!(null))), None);
        assert_eq!(parse_account_id(None), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(Some(&json!(10))), Some(10.0));
        assert_eq!(parse_amount(Some(&json!(100.5))), Some(100.5));
        assert_eq!(parse_amount(Some(&json!("7.25"))), Some(7.25));
        assert_eq!(parse_amount(Some(&json!("NaN"))), None);
        assert_eq!(parse_amount(Some(&json!(true))), None);
        assert_eq!(parse_amount(None), None);
    }

    #[test]
    fn test_event_type() {
        assert_eq!("deposit".parse::<EventType>().unwrap(), EventType::Deposit);
        assert_eq!("transfer".parse::<EventType>().unwrap(), EventType::Transfer);
        assert!(matches!("Deposit".parse::<EventType>(), Err(Error::UnsupportedOperation(_))));
        assert!("".parse::<EventType>().is_err());
    }
}
