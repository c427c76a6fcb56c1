//! Slot calendar: which time ranges are bookable on a given date.
//!
//! Fixed policy keyed by weekday class. Weekdays carry a single evening
//! slot; weekend days carry morning, afternoon and evening. The labels are
//! part of the persisted format and must not change.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::Reservation;

/// Monday through Friday: one evening slot.
pub const WEEKDAY_SLOTS: [&str; 1] = ["19h - 22h"];

/// Saturday and Sunday: morning, afternoon, evening.
pub const WEEKEND_SLOTS: [&str; 3] = ["08h - 12h", "14h - 18h", "19h - 22h"];

/// The ordered bookable slot labels for a date. Pure, no I/O.
pub fn slots_for(date: NaiveDate) -> &'static [&'static str] {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => &WEEKEND_SLOTS,
        _ => &WEEKDAY_SLOTS,
    }
}

/// The date's slots minus those already reserved.
pub fn available_slots(date: NaiveDate, reservations: &[Reservation]) -> Vec<&'static str> {
    let date_str = date.to_string();
    slots_for(date)
        .iter()
        .copied()
        .filter(|slot| {
            !reservations
                .iter()
                .any(|r| r.date == date_str && r.slot_label == *slot)
        })
        .collect()
}
