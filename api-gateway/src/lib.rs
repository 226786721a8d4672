//! API gateway for the account ledger
//!
//! Exposes the account service over HTTP: `POST /event`, `GET /balance`
//! and `POST /reset`, plus an OpenAPI document and Swagger UI.

pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use account_service::AccountService;
use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{balance::get_balance, event::handle_event, reset::reset};

/// App state shared across handlers
pub struct AppState {
    /// Account service
    pub account_service: Arc<AccountService>,
}

impl AppState {
    pub fn new(account_service: Arc<AccountService>) -> Self {
        Self { account_service }
    }
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        api::event::handle_event,
        api::balance::get_balance,
        api::reset::reset,
    ),
    components(
        schemas(
            api::event::EventRequest,
            api::response::EventResponse,
            common::model::account::AccountBalance,
            error::ErrorResponse,
            error::ErrorInfo,
        )
    ),
    tags(
        (name = "ledger", description = "Account balance operations")
    ),
    info(
        title = "Ledger API",
        version = "1.0.0",
        description = "Deposit, withdraw, transfer and query account balances"
    )
)]
pub struct ApiDoc;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router
pub fn router(state: Arc<AppState>, log_level: Level) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/event", post(handle_event))
        .route("/balance", get(get_balance))
        .route("/reset", post(reset));

    let swagger_ui = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi());

    // Layers run bottom-up: the request id is set before the trace span opens
    Router::new()
        .merge(api_routes)
        .merge(swagger_ui)
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(log_level))
                .on_request(DefaultOnRequest::new().level(log_level))
                .on_response(DefaultOnResponse::new().level(log_level)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
