use thiserror::Error;

use crate::models::coin::Coin;

/// Unified error type for the entire crypto-trends-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {seconds}s fetching {coin}")]
    Timeout { coin: Coin, seconds: u64 },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// At least one coin of an aggregation cycle failed to fetch.
    /// The whole cycle is void; no partial series map is published.
    #[error("Failed to load price data for {}", describe_failures(.failures))]
    CycleFailed { failures: Vec<CoinFailure> },

    // ── Input / Business Logic ──────────────────────────────────────
    #[error("Unknown coin: {0}")]
    UnknownCoin(String),

    #[error("Unsupported window: {0} days (expected 7, 30 or 90)")]
    InvalidWindow(u32),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// Whether this error belongs to the fetch-failure family
    /// (transport, non-2xx, malformed payload, timeout, failed cycle).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Api { .. }
                | CoreError::Network(_)
                | CoreError::Timeout { .. }
                | CoreError::Deserialization(_)
                | CoreError::CycleFailed { .. }
        )
    }
}

/// A single coin's fetch failure inside a failed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinFailure {
    pub coin: Coin,
    pub message: String,
}

fn describe_failures(failures: &[CoinFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.coin, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; keep the path, drop the query.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
