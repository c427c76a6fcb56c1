//! Reservation routes: list, reserve, cancel.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, extract::Path, extract::State, routing::get, routing::post};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sala_core::{CancelOutcome, Reservation, ReserveOutcome};

use crate::response::{self, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reservations", get(list).post(reserve))
        .route("/api/reservations/{id}/cancel", post(cancel))
}

/// What the API shows of a reservation. The PIN digest stays server-side.
#[derive(Serialize)]
struct ReservationView {
    id: String,
    date: String,
    slot_label: String,
    group_name: String,
}

impl From<Reservation> for ReservationView {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            date: r.date,
            slot_label: r.slot_label,
            group_name: r.group_name,
        }
    }
}

#[derive(Deserialize)]
struct ReserveRequest {
    date: NaiveDate,
    slot_label: String,
    group_name: String,
    /// Holder-chosen cancellation secret; hashed before storage.
    pin: String,
}

#[derive(Deserialize)]
struct CancelRequest {
    /// The reservation's own PIN or the administrator secret.
    pin: String,
}

/// GET /api/reservations — upcoming reservations, ordered by date and slot.
async fn list(State(state): State<AppState>) -> Response {
    let today = chrono::Local::now().date_naive();
    match state.booking.upcoming(today).await {
        Ok(reservations) => {
            let views: Vec<ReservationView> =
                reservations.into_iter().map(ReservationView::from).collect();
            Json(ApiResponse::ok(views)).into_response()
        }
        Err(err) => super::storage_failure(&err),
    }
}

/// POST /api/reservations — attempt to reserve a slot.
async fn reserve(State(state): State<AppState>, Json(body): Json<ReserveRequest>) -> Response {
    let today = chrono::Local::now().date_naive();
    let outcome = state
        .booking
        .attempt_reserve(today, body.date, &body.slot_label, &body.group_name, &body.pin)
        .await;

    match outcome {
        Ok(ReserveOutcome::Created(reservation)) => {
            Json(ApiResponse::ok(ReservationView::from(reservation))).into_response()
        }
        Ok(ReserveOutcome::AlreadyTaken) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<()>::error(
                response::CODE_CONFLICT,
                "that slot was just reserved by someone else",
            )),
        )
            .into_response(),
        Ok(ReserveOutcome::InvalidInput(reason)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(response::CODE_VALIDATION, reason)),
        )
            .into_response(),
        Err(err) => super::storage_failure(&err),
    }
}

/// POST /api/reservations/{id}/cancel — cancel by id, PIN-authorized.
async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Response {
    match state.booking.attempt_cancel(&id, &body.pin).await {
        Ok(CancelOutcome::Cancelled) => Json(ApiResponse::ok(true)).into_response(),
        Ok(CancelOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(
                response::CODE_NOT_FOUND,
                "no reservation with that id (it may already be cancelled)",
            )),
        )
            .into_response(),
        Ok(CancelOutcome::WrongPin) => (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                response::CODE_FORBIDDEN,
                "only the reservation's PIN or the administrator PIN can cancel",
            )),
        )
            .into_response(),
        Err(err) => super::storage_failure(&err),
    }
}
