//! The reservation ledger: one polymorphic `{load, save}` capability with
//! interchangeable storage backends.
//!
//! - [`LocalLedger`] — a CSV file on local disk, serialized by an exclusive
//!   advisory file lock. True mutual exclusion, single machine only.
//! - [`RemoteLedger`] — a CSV file in a remote version-controlled content
//!   store, protected by optimistic version-token writes. Cross-instance
//!   safety, no locking.
//!
//! The backend is selected once from configuration presence; callers only
//! ever see the trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::LedgerResult;
use crate::model::Reservation;

mod local;
mod memory;
mod remote;

pub use local::LocalLedger;
pub use memory::MemoryStore;
pub use remote::{GithubContentsStore, PutOutcome, RemoteLedger, VersionedLedger, VersionedStore};

/// Storage backend for the reservation ledger.
///
/// `load` and `save` each operate on the full record set; the ledger has no
/// partial-update path. Implementations must be safe to call from multiple
/// independent processes — that is the whole point of the exercise.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Return the full current reservation set.
    ///
    /// A missing backing store is not an error: the store is created empty
    /// (or treated as empty) and an empty set is returned. Malformed
    /// content also loads as empty.
    async fn load(&self) -> LedgerResult<Vec<Reservation>>;

    /// Replace the entire stored set, atomically from the caller's view.
    async fn save(&self, reservations: &[Reservation]) -> LedgerResult<()>;
}

/// Build the ledger backend selected by configuration: remote when the
/// remote setting group is present, local otherwise.
pub fn from_config(config: &Config) -> Arc<dyn LedgerStore> {
    match &config.remote {
        Some(remote) => {
            tracing::info!(repo = %remote.repo, path = %remote.path, "using remote ledger backend");
            Arc::new(VersionedLedger::new(GithubContentsStore::new(
                remote.clone(),
            )))
        }
        None => {
            tracing::info!(file = %config.ledger_file, "using local ledger backend");
            Arc::new(
                LocalLedger::new(&config.ledger_file)
                    .with_lock_timeout(Duration::from_millis(config.lock_timeout_ms)),
            )
        }
    }
}
