//! Failure types for ledger access.
//!
//! Arbitration rejections (slot taken, wrong PIN, ...) are not errors — they
//! are ordinary outcomes, modeled as enum variants in [`crate::booking`].
//! `LedgerError` covers the cases where the backing store itself could not
//! be read or written.

use thiserror::Error;

/// Errors raised by the ledger storage backends.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The exclusive lock on the local ledger file was not acquired within
    /// the configured bound. The operation was not applied; safe to retry.
    #[error("ledger lock not acquired within {0} ms")]
    LockTimeout(u64),

    /// The remote conditional write lost the version race twice in a row.
    /// The operation was not applied; safe to retry.
    #[error("remote ledger conflict: concurrent write won twice in a row")]
    RemoteConflict,

    /// A write reported success but re-reading the store returned a
    /// different record count than was written. Surfaced as a failure
    /// because the store may be serving stale content.
    #[error("ledger integrity mismatch: wrote {expected} records, store returned {actual}")]
    IntegrityMismatch {
        /// Number of records handed to `save`.
        expected: usize,
        /// Number of records the store returned on re-read.
        actual: usize,
    },

    /// Local file I/O failed.
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The ledger could not be encoded as CSV.
    #[error("ledger encode error: {0}")]
    Csv(#[from] csv::Error),

    /// The HTTP request to the remote store failed (network, timeout, TLS).
    #[error("remote store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with an unexpected status.
    #[error("remote store returned status {status}: {message}")]
    RemoteApi {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
