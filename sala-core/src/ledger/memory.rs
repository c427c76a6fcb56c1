//! In-memory versioned store.
//!
//! Mirrors the remote backend's compare-and-swap semantics without network
//! or filesystem: numeric versions exposed as opaque strings, conditional
//! writes that fail on stale tokens. Thread-safe via `RwLock`. Used by the
//! test suites and for embedding; not durable.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{LedgerError, LedgerResult};

use super::{PutOutcome, VersionedStore};

#[derive(Debug, Default)]
struct Stored {
    content: Option<Vec<u8>>,
    version: i64,
}

/// Versioned in-memory file, CAS semantics matching the remote store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: RwLock<Stored>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> LedgerError {
        LedgerError::Io(std::io::Error::other("memory store lock poisoned"))
    }
}

#[async_trait]
impl VersionedStore for MemoryStore {
    async fn fetch(&self) -> LedgerResult<Option<(Vec<u8>, String)>> {
        let stored = self.stored.read().map_err(|_| Self::poisoned())?;
        Ok(stored
            .content
            .as_ref()
            .map(|content| (content.clone(), stored.version.to_string())))
    }

    async fn put(&self, data: &[u8], expected: Option<&str>) -> LedgerResult<PutOutcome> {
        let mut stored = self.stored.write().map_err(|_| Self::poisoned())?;

        let current = stored.content.is_some().then(|| stored.version.to_string());
        if current.as_deref() != expected {
            return Ok(PutOutcome::VersionMismatch);
        }

        stored.content = Some(data.to_vec());
        stored.version += 1;
        Ok(PutOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_file_fetches_none() {
        let store = MemoryStore::new();
        assert!(store.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_requires_absence() {
        let store = MemoryStore::new();
        assert_eq!(
            store.put(b"v1", None).await.unwrap(),
            PutOutcome::Committed
        );
        // A second unconditional create races with the first write.
        assert_eq!(
            store.put(b"v2", None).await.unwrap(),
            PutOutcome::VersionMismatch
        );
    }

    #[tokio::test]
    async fn stale_token_is_rejected_fresh_token_wins() {
        let store = MemoryStore::new();
        store.put(b"v1", None).await.unwrap();
        let (_, token) = store.fetch().await.unwrap().unwrap();

        assert_eq!(
            store.put(b"v2", Some(&token)).await.unwrap(),
            PutOutcome::Committed
        );
        assert_eq!(
            store.put(b"v3", Some(&token)).await.unwrap(),
            PutOutcome::VersionMismatch
        );

        let (content, _) = store.fetch().await.unwrap().unwrap();
        assert_eq!(content, b"v2");
    }
}
