//! Slot availability routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, extract::Path, extract::State, routing::get};
use chrono::NaiveDate;
use serde::Serialize;

use sala_core::slots;

use crate::response::{self, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/slots/{date}", get(slots_for_date))
}

#[derive(Serialize)]
struct SlotsResponse {
    date: String,
    /// Every slot the calendar defines for that date, in order.
    slots: Vec<&'static str>,
    /// The subset still free per the current ledger state.
    available: Vec<&'static str>,
}

/// GET /api/slots/{date} — the date's slot table and current availability.
async fn slots_for_date(State(state): State<AppState>, Path(date): Path<String>) -> Response {
    let Ok(date) = date.parse::<NaiveDate>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                response::CODE_VALIDATION,
                "date must be YYYY-MM-DD",
            )),
        )
            .into_response();
    };

    match state.booking.available_slots(date).await {
        Ok(available) => Json(ApiResponse::ok(SlotsResponse {
            date: date.to_string(),
            slots: slots::slots_for(date).to_vec(),
            available,
        }))
        .into_response(),
        Err(err) => super::storage_failure(&err),
    }
}
