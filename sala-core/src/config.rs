//! Environment-driven configuration.
//!
//! All settings come from environment variables (a `.env` file is honored
//! by the binaries before this runs):
//!
//! | Variable              | Default                  | Meaning                          |
//! |-----------------------|--------------------------|----------------------------------|
//! | SALA_ADMIN_PIN        | unset                    | administrator cancellation secret|
//! | SALA_LEDGER_FILE      | reservas.csv             | local ledger path                |
//! | SALA_LOCK_TIMEOUT_MS  | 5000                     | local lock acquisition bound     |
//! | SALA_REMOTE_TOKEN     | unset                    | remote store API token           |
//! | SALA_REMOTE_REPO      | unset                    | repository, `owner/name`         |
//! | SALA_REMOTE_BRANCH    | main                     | branch reference                 |
//! | SALA_REMOTE_PATH      | unset                    | ledger file path in the repo     |
//! | SALA_REMOTE_API       | https://api.github.com   | contents API base URL            |
//!
//! Presence of the complete remote group (token, repo, path) switches the
//! ledger to the remote versioned-file backend; otherwise the local
//! lock-file backend is used.

use std::env;

/// Default local ledger file name.
pub const DEFAULT_LEDGER_FILE: &str = "reservas.csv";

/// Default bound on local lock acquisition.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const DEFAULT_REMOTE_API: &str = "https://api.github.com";
const DEFAULT_REMOTE_BRANCH: &str = "main";

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Administrator cancellation secret, if configured.
    pub admin_pin: Option<String>,
    /// Path of the local ledger file.
    pub ledger_file: String,
    /// Bound on local lock acquisition, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Remote backend settings; `Some` switches the ledger to the remote
    /// versioned-file backend.
    pub remote: Option<RemoteConfig>,
}

/// Settings for the remote versioned-file backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API token for the content store.
    pub token: String,
    /// Repository identifier, `owner/name`.
    pub repo: String,
    /// Branch reference the ledger file lives on.
    pub branch: String,
    /// Path of the ledger file within the repository.
    pub path: String,
    /// Contents API base URL.
    pub api_base: String,
}

impl Config {
    /// Load configuration from environment variables, using defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let remote = match (
            env::var("SALA_REMOTE_TOKEN").ok().filter(|s| !s.is_empty()),
            env::var("SALA_REMOTE_REPO").ok().filter(|s| !s.is_empty()),
            env::var("SALA_REMOTE_PATH").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(token), Some(repo), Some(path)) => Some(RemoteConfig {
                token,
                repo,
                branch: env::var("SALA_REMOTE_BRANCH")
                    .unwrap_or_else(|_| DEFAULT_REMOTE_BRANCH.into()),
                path,
                api_base: env::var("SALA_REMOTE_API")
                    .unwrap_or_else(|_| DEFAULT_REMOTE_API.into()),
            }),
            _ => None,
        };

        Self {
            admin_pin: env::var("SALA_ADMIN_PIN").ok().filter(|s| !s.is_empty()),
            ledger_file: env::var("SALA_LEDGER_FILE")
                .unwrap_or_else(|_| DEFAULT_LEDGER_FILE.into()),
            lock_timeout_ms: env::var("SALA_LOCK_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LOCK_TIMEOUT_MS),
            remote,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_pin: None,
            ledger_file: DEFAULT_LEDGER_FILE.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            remote: None,
        }
    }
}
