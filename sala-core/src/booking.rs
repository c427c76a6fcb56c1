//! Conflict arbitration for reservation and cancellation attempts.
//!
//! Every attempt re-loads the ledger at commit time and decides against
//! that fresh view. There is no queueing and no slot holding: the first
//! committer wins, and a losing concurrent attempt is told the slot is
//! taken instead of silently overwriting. The window between "user saw the
//! slot free" and "user committed" is narrowed by the fresh load and closed
//! by the backend (file lock or version-token write), never by in-memory
//! state — no view of the ledger survives between operations.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Config;
use crate::error::LedgerResult;
use crate::ledger::{self, LedgerStore};
use crate::model::{self, Reservation};
use crate::pin::PinAuthority;
use crate::slots;

/// Result of a reservation attempt. Rejections are ordinary outcomes;
/// only backend failures surface as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The slot was free and the reservation is committed.
    Created(Reservation),
    /// Another reservation already holds the `(date, slot)` pair.
    AlreadyTaken,
    /// The request itself was unusable; the ledger was not touched.
    InvalidInput(&'static str),
}

/// Result of a cancellation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The record was removed from the ledger.
    Cancelled,
    /// No live reservation has that id (someone may have cancelled first).
    NotFound,
    /// Neither the record's own PIN nor the admin secret matched.
    WrongPin,
}

/// Arbiter over a ledger backend and the PIN authority.
#[derive(Clone)]
pub struct BookingService {
    ledger: Arc<dyn LedgerStore>,
    pins: PinAuthority,
}

impl BookingService {
    pub fn new(ledger: Arc<dyn LedgerStore>, pins: PinAuthority) -> Self {
        Self { ledger, pins }
    }

    /// Backend and admin secret selected from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ledger::from_config(config),
            PinAuthority::new(config.admin_pin.clone()),
        )
    }

    /// Try to reserve `slot_label` on `date` for `group_name`.
    ///
    /// `today` is the caller's current date, passed explicitly: the core
    /// must reject already-elapsed dates on its own, since time advances
    /// between the UI's read and this commit.
    pub async fn attempt_reserve(
        &self,
        today: NaiveDate,
        date: NaiveDate,
        slot_label: &str,
        group_name: &str,
        pin_secret: &str,
    ) -> LedgerResult<ReserveOutcome> {
        let group_name = group_name.trim();
        let pin_secret = pin_secret.trim();

        // Fail fast on unusable input, before any ledger access.
        if group_name.is_empty() {
            return Ok(ReserveOutcome::InvalidInput("group name must not be empty"));
        }
        if pin_secret.is_empty() {
            return Ok(ReserveOutcome::InvalidInput("a PIN must be chosen"));
        }
        if date < today {
            return Ok(ReserveOutcome::InvalidInput("date has already passed"));
        }
        if !slots::slots_for(date).contains(&slot_label) {
            return Ok(ReserveOutcome::InvalidInput("no such slot on that date"));
        }

        // Fresh load at commit time; never decide on an earlier read.
        let mut reservations = self.ledger.load().await?;

        let date_str = date.to_string();
        if reservations
            .iter()
            .any(|r| r.date == date_str && r.slot_label == slot_label)
        {
            tracing::info!(date = %date_str, slot = slot_label, "reservation lost the slot race");
            return Ok(ReserveOutcome::AlreadyTaken);
        }

        let reservation = Reservation {
            id: model::short_id(),
            date: date_str,
            slot_label: slot_label.to_string(),
            group_name: group_name.to_string(),
            pin_digest: PinAuthority::digest(pin_secret),
        };
        reservations.push(reservation.clone());

        // A save failure means the reservation must not be assumed recorded.
        self.ledger.save(&reservations).await?;
        tracing::info!(id = %reservation.id, date = %reservation.date, slot = %reservation.slot_label, "reservation created");
        Ok(ReserveOutcome::Created(reservation))
    }

    /// Try to cancel the reservation with `id`, authorized by the record's
    /// own PIN or the administrator secret.
    pub async fn attempt_cancel(&self, id: &str, pin_secret: &str) -> LedgerResult<CancelOutcome> {
        let pin_secret = pin_secret.trim();

        let mut reservations = self.ledger.load().await?;

        let Some(target) = reservations.iter().find(|r| r.id == id) else {
            return Ok(CancelOutcome::NotFound);
        };
        if !self.pins.authorizes(pin_secret, &target.pin_digest) {
            tracing::info!(id, "cancellation rejected: wrong PIN");
            return Ok(CancelOutcome::WrongPin);
        }

        reservations.retain(|r| r.id != id);
        self.ledger.save(&reservations).await?;
        tracing::info!(id, "reservation cancelled");
        Ok(CancelOutcome::Cancelled)
    }

    /// Live reservations from `today` onward, ordered by date then slot.
    /// Records whose date no longer parses are dropped from the view.
    pub async fn upcoming(&self, today: NaiveDate) -> LedgerResult<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .ledger
            .load()
            .await?
            .into_iter()
            .filter(|r| matches!(r.date.parse::<NaiveDate>(), Ok(date) if date >= today))
            .collect();
        reservations.sort_by(|a, b| (&a.date, &a.slot_label).cmp(&(&b.date, &b.slot_label)));
        Ok(reservations)
    }

    /// The date's slot labels still free, per the current ledger state.
    pub async fn available_slots(&self, date: NaiveDate) -> LedgerResult<Vec<&'static str>> {
        let reservations = self.ledger.load().await?;
        Ok(slots::available_slots(date, &reservations))
    }
}
