use serde::{Deserialize, Serialize};
use std::env;

use super::coin::Coin;
use super::window::Window;
use crate::errors::CoreError;

/// Dashboard configuration.
///
/// Deserializable with `#[serde(default)]`, so a host can supply a partial
/// JSON object. Native hosts can also read overrides from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the price API (without trailing `/api/...`).
    pub base_url: String,

    /// Per-coin fetch timeout. Expiry counts as a fetch failure.
    pub fetch_timeout_secs: u64,

    /// Window selected when the dashboard starts.
    pub default_window: Window,

    /// Coins selected when the dashboard starts.
    pub default_coins: Vec<Coin>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            fetch_timeout_secs: 15,
            default_window: Window::Week,
            default_coins: vec![Coin::Bitcoin],
        }
    }
}

impl Settings {
    /// Defaults overridden by `CRYPTO_TRENDS_*` environment variables.
    /// Missing or unparsable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_str("CRYPTO_TRENDS_BASE_URL", &defaults.base_url),
            fetch_timeout_secs: env_u64("CRYPTO_TRENDS_FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs),
            default_window: env::var("CRYPTO_TRENDS_WINDOW")
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok())
                .and_then(|d| Window::try_from(d).ok())
                .unwrap_or(defaults.default_window),
            default_coins: env::var("CRYPTO_TRENDS_COINS")
                .ok()
                .and_then(|s| parse_coin_list(&s))
                .unwrap_or(defaults.default_coins),
        }
    }

    /// Parse settings from a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::ValidationError(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "fetch_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// "bitcoin, SOL" → [Bitcoin, Solana]. `None` if any entry is unknown or the list is empty.
fn parse_coin_list(raw: &str) -> Option<Vec<Coin>> {
    let mut coins = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let coin: Coin = part.parse().ok()?;
        if !coins.contains(&coin) {
            coins.push(coin);
        }
    }
    if coins.is_empty() {
        None
    } else {
        Some(coins)
    }
}
