//! The reservation record and the ledger's on-disk CSV form.
//!
//! The ledger is a plain CSV file with a header row and the fixed column
//! order `id, date, slot_label, group_name, pin_digest`. Rows written by
//! older deployments may lack trailing columns; those fields load as empty
//! strings. Content that cannot be parsed at all loads as an empty ledger —
//! the system stays available after external corruption of the store, at
//! the cost of treating the file as fresh.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerResult;

/// Ledger column order. Also the CSV header row.
pub const LEDGER_COLUMNS: [&str; 5] = ["id", "date", "slot_label", "group_name", "pin_digest"];

/// One booked slot.
///
/// `id` is the sole mutation key: records are never updated in place, only
/// appended on reserve and removed by `id` on cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Short unique identifier, assigned at creation, immutable.
    pub id: String,
    /// Calendar date of the slot, ISO `YYYY-MM-DD`.
    pub date: String,
    /// Human-readable time range, one of the slot calendar's labels.
    pub slot_label: String,
    /// Reserving group, trimmed, non-empty.
    pub group_name: String,
    /// Lowercase hex SHA-256 of the holder's cancellation secret.
    pub pin_digest: String,
}

/// Generate a fresh short reservation id (first 8 hex chars of a v4 UUID).
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Serialize the full reservation set to CSV bytes, header row included.
pub fn encode_ledger(reservations: &[Reservation]) -> LedgerResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(LEDGER_COLUMNS)?;
        for r in reservations {
            writer.write_record([
                r.id.as_str(),
                r.date.as_str(),
                r.slot_label.as_str(),
                r.group_name.as_str(),
                r.pin_digest.as_str(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// Parse CSV bytes into the reservation set.
///
/// Columns are matched by header name, so files with reordered or extra
/// columns still load; missing columns default to the empty string.
/// Unparseable content yields an empty set.
pub fn decode_ledger(data: &[u8]) -> Vec<Reservation> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            tracing::warn!(error = %err, "ledger header unreadable, treating as empty");
            return Vec::new();
        }
    };
    let position =
        |name: &str| -> Option<usize> { headers.iter().position(|header| header == name) };
    let columns: [Option<usize>; 5] = LEDGER_COLUMNS.map(position);

    let mut reservations = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "ledger row unreadable, treating ledger as empty");
                return Vec::new();
            }
        };
        let field = |slot: usize| -> String {
            columns[slot]
                .and_then(|i| record.get(i))
                .unwrap_or("")
                .to_string()
        };
        reservations.push(Reservation {
            id: field(0),
            date: field(1),
            slot_label: field(2),
            group_name: field(3),
            pin_digest: field(4),
        });
    }
    reservations
}
