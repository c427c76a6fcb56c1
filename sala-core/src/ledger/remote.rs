//! Remote versioned-file backend.
//!
//! The ledger lives as one file in a version-controlled content store
//! behind an authenticated HTTP API (GitHub-style contents endpoint). No
//! lock exists; safety comes from optimistic concurrency: every write is
//! conditional on the version token observed at read time, and a rejected
//! write is re-fetched and retried exactly once before the conflict is
//! surfaced to the caller.
//!
//! The store seam is its own trait so the conditional-write arbitration can
//! be exercised against an in-memory double (see [`super::MemoryStore`]).

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::config::RemoteConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::model::{self, Reservation};

/// Outcome of a conditional write. A version mismatch is a normal result
/// of racing writers, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The store accepted the write.
    Committed,
    /// The store's current version no longer matches the offered token.
    VersionMismatch,
}

/// A remote file with compare-and-swap semantics.
///
/// `fetch` returns the current content plus an opaque version token, or
/// `None` when the file does not exist (an empty ledger, not an error).
/// `put` succeeds only if the store's version still matches `expected`
/// (`None` meaning "the file must not exist yet").
#[async_trait]
pub trait VersionedStore: Send + Sync {
    /// Current content and version token, or `None` if absent.
    async fn fetch(&self) -> LedgerResult<Option<(Vec<u8>, String)>>;

    /// Conditional write against the expected version token.
    async fn put(&self, data: &[u8], expected: Option<&str>) -> LedgerResult<PutOutcome>;
}

#[async_trait]
impl<S: VersionedStore + ?Sized> VersionedStore for std::sync::Arc<S> {
    async fn fetch(&self) -> LedgerResult<Option<(Vec<u8>, String)>> {
        (**self).fetch().await
    }

    async fn put(&self, data: &[u8], expected: Option<&str>) -> LedgerResult<PutOutcome> {
        (**self).put(data, expected).await
    }
}

/// Ledger over any [`VersionedStore`], implementing the load/save contract
/// with single-retry optimistic writes and post-write verification.
pub struct VersionedLedger<S> {
    store: S,
}

/// The production remote ledger.
pub type RemoteLedger = VersionedLedger<GithubContentsStore>;

impl<S: VersionedStore> VersionedLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn current_version(&self) -> LedgerResult<Option<String>> {
        Ok(self.store.fetch().await?.map(|(_, version)| version))
    }
}

#[async_trait]
impl<S: VersionedStore> super::LedgerStore for VersionedLedger<S> {
    async fn load(&self) -> LedgerResult<Vec<Reservation>> {
        match self.store.fetch().await? {
            Some((content, _)) => Ok(model::decode_ledger(&content)),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, reservations: &[Reservation]) -> LedgerResult<()> {
        let encoded = model::encode_ledger(reservations)?;

        let version = self.current_version().await?;
        let committed = match self.store.put(&encoded, version.as_deref()).await? {
            PutOutcome::Committed => true,
            PutOutcome::VersionMismatch => {
                // Someone else wrote first. Re-fetch the latest token and
                // retry exactly once; a second loss is surfaced.
                tracing::warn!("remote ledger version raced, retrying once");
                let latest = self.current_version().await?;
                matches!(
                    self.store.put(&encoded, latest.as_deref()).await?,
                    PutOutcome::Committed
                )
            }
        };
        if !committed {
            return Err(LedgerError::RemoteConflict);
        }

        // The write nominally succeeded; re-read and confirm the store is
        // not serving stale content.
        let stored = match self.store.fetch().await? {
            Some((content, _)) => model::decode_ledger(&content).len(),
            None => 0,
        };
        if stored != reservations.len() {
            return Err(LedgerError::IntegrityMismatch {
                expected: reservations.len(),
                actual: stored,
            });
        }
        Ok(())
    }
}

/// GitHub contents API implementation of [`VersionedStore`].
///
/// The version token is the file's blob SHA. A conditional write is a PUT
/// carrying the expected SHA; the API rejects it with 409 (or 422) when the
/// file changed since that SHA was read.
pub struct GithubContentsStore {
    client: reqwest::Client,
    config: RemoteConfig,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

impl GithubContentsStore {
    pub fn new(config: RemoteConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("sala-ledger")
            .build()
            .expect("Failed to build HTTP client");
        Self { client, config }
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.repo,
            self.config.path
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    async fn unexpected_status(response: reqwest::Response) -> LedgerError {
        let status = response.status().as_u16();
        let mut message = response.text().await.unwrap_or_default();
        message.truncate(500);
        LedgerError::RemoteApi { status, message }
    }
}

#[async_trait]
impl VersionedStore for GithubContentsStore {
    async fn fetch(&self) -> LedgerResult<Option<(Vec<u8>, String)>> {
        let response = self
            .authorized(self.client.get(self.contents_url()))
            .query(&[("ref", self.config.branch.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // Absent file means an empty ledger.
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::unexpected_status(response).await);
        }

        let body: ContentsResponse = response.json().await?;
        // The API wraps base64 content across lines.
        let packed: String = body
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let content = BASE64.decode(packed).map_err(|err| LedgerError::RemoteApi {
            status: 200,
            message: format!("undecodable content payload: {err}"),
        })?;
        Ok(Some((content, body.sha)))
    }

    async fn put(&self, data: &[u8], expected: Option<&str>) -> LedgerResult<PutOutcome> {
        let mut body = serde_json::json!({
            "message": "sala: update reservation ledger",
            "content": BASE64.encode(data),
            "branch": self.config.branch,
        });
        if let Some(sha) = expected {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }

        let response = self
            .authorized(self.client.put(self.contents_url()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(PutOutcome::Committed)
        } else if status == reqwest::StatusCode::CONFLICT
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            Ok(PutOutcome::VersionMismatch)
        } else {
            Err(Self::unexpected_status(response).await)
        }
    }
}
