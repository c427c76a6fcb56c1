//! Local lock-file backend.
//!
//! The ledger lives in one CSV file on durable local storage. Every load
//! and every save holds an exclusive advisory lock on that file for the
//! duration of the operation, acquired by polling with a bounded deadline.
//! This serializes all cooperating readers and writers on one machine; it
//! does not span machines.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fs2::FileExt;

use crate::error::{LedgerError, LedgerResult};
use crate::model::{self, Reservation};

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// CSV ledger in a single exclusively-locked local file.
#[derive(Debug, Clone)]
pub struct LocalLedger {
    path: PathBuf,
    lock_timeout: Duration,
}

impl LocalLedger {
    /// Ledger over the given file path with the default five-second lock
    /// bound.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock_timeout: Duration::from_millis(crate::config::DEFAULT_LOCK_TIMEOUT_MS),
        }
    }

    /// Override the lock acquisition bound.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

/// Open the ledger file read-write, creating it if absent. The lock must
/// be taken on the same handle the I/O uses.
fn open_ledger(path: &Path) -> LedgerResult<File> {
    Ok(OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?)
}

/// Acquire the exclusive advisory lock, polling up to the bound. The lock
/// is released when the file handle is dropped.
fn acquire_exclusive(file: &File, bound: Duration) -> LedgerResult<()> {
    let deadline = Instant::now() + bound;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(()),
            Err(err) if err.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                if Instant::now() >= deadline {
                    return Err(LedgerError::LockTimeout(bound.as_millis() as u64));
                }
                std::thread::sleep(LOCK_POLL_INTERVAL);
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn load_blocking(path: &Path, bound: Duration) -> LedgerResult<Vec<Reservation>> {
    let file = open_ledger(path)?;
    acquire_exclusive(&file, bound)?;

    let mut contents = Vec::new();
    (&file).read_to_end(&mut contents)?;

    // First contact: persist the schema header so concurrent readers see a
    // well-formed (empty) ledger.
    if contents.is_empty() {
        (&file).write_all(&model::encode_ledger(&[])?)?;
        return Ok(Vec::new());
    }

    Ok(model::decode_ledger(&contents))
}

fn save_blocking(path: &Path, bound: Duration, encoded: &[u8]) -> LedgerResult<()> {
    let file = open_ledger(path)?;
    acquire_exclusive(&file, bound)?;

    // Truncate only after the lock is held.
    file.set_len(0)?;
    (&file).seek(SeekFrom::Start(0))?;
    (&file).write_all(encoded)?;
    Ok(())
}

#[async_trait]
impl super::LedgerStore for LocalLedger {
    async fn load(&self) -> LedgerResult<Vec<Reservation>> {
        let path = self.path.clone();
        let bound = self.lock_timeout;
        tokio::task::spawn_blocking(move || load_blocking(&path, bound))
            .await
            .map_err(|err| LedgerError::Io(std::io::Error::other(err)))?
    }

    async fn save(&self, reservations: &[Reservation]) -> LedgerResult<()> {
        let encoded = model::encode_ledger(reservations)?;
        let path = self.path.clone();
        let bound = self.lock_timeout;
        tokio::task::spawn_blocking(move || save_blocking(&path, bound, &encoded))
            .await
            .map_err(|err| LedgerError::Io(std::io::Error::other(err)))?
    }
}

#[cfg(test)]
mod tests {
    use super::super::LedgerStore;
    use super::*;
    use crate::model::Reservation;

    fn sample(id: &str, date: &str, slot: &str) -> Reservation {
        Reservation {
            id: id.to_string(),
            date: date.to_string(),
            slot_label: slot.to_string(),
            group_name: "Choir".to_string(),
            pin_digest: "abc".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty_and_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservas.csv");
        let ledger = LocalLedger::new(&path);

        assert!(ledger.load().await.unwrap().is_empty());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "id,date,slot_label,group_name,pin_digest");
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = LocalLedger::new(dir.path().join("reservas.csv"));

        let rows = vec![
            sample("aaaa1111", "2025-06-09", "19h - 22h"),
            sample("bbbb2222", "2025-06-14", "08h - 12h"),
        ];
        ledger.save(&rows).await.unwrap();
        assert_eq!(ledger.load().await.unwrap(), rows);

        // Saving a shorter set truncates the old contents.
        ledger.save(&rows[..1]).await.unwrap();
        assert_eq!(ledger.load().await.unwrap(), rows[..1]);
    }

    #[tokio::test]
    async fn contended_lock_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservas.csv");
        let ledger =
            LocalLedger::new(&path).with_lock_timeout(Duration::from_millis(150));
        ledger.save(&[]).await.unwrap();

        // Hold the lock on a separate handle to simulate another process.
        let holder = open_ledger(&path).unwrap();
        holder.lock_exclusive().unwrap();

        let err = ledger.load().await.unwrap_err();
        assert!(matches!(err, LedgerError::LockTimeout(150)));

        fs2::FileExt::unlock(&holder).unwrap();
        assert!(ledger.load().await.unwrap().is_empty());
    }
}
