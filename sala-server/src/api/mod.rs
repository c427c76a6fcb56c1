//! HTTP routes.

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sala_core::LedgerError;

use crate::response::{self, ApiResponse};
use crate::state::AppState;

pub mod health;
pub mod reservations;
pub mod slots;

/// Assemble the application: all routes plus middleware and state.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(slots::router())
        .merge(reservations::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A backend failure means the operation was not applied; report it as a
/// temporarily unavailable service, safe to retry.
pub(crate) fn storage_failure(err: &LedgerError) -> Response {
    tracing::error!(error = %err, "ledger backend failure");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse::<()>::error(
            response::CODE_STORAGE,
            err.to_string(),
        )),
    )
        .into_response()
}
