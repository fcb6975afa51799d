use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// A coin from the fixed dashboard registry.
///
/// The lowercase id (`bitcoin`, `ethereum`, `solana`) is what the price API
/// expects in its path and what the series map is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    Bitcoin,
    Ethereum,
    Solana,
}

impl Coin {
    /// Every registered coin, in display order.
    pub const ALL: [Coin; 3] = [Coin::Bitcoin, Coin::Ethereum, Coin::Solana];

    /// API identifier, e.g. "bitcoin".
    pub fn id(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "bitcoin",
            Coin::Ethereum => "ethereum",
            Coin::Solana => "solana",
        }
    }

    /// Human-readable label for selectors and legends.
    pub fn label(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "Bitcoin",
            Coin::Ethereum => "Ethereum",
            Coin::Solana => "Solana",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "BTC",
            Coin::Ethereum => "ETH",
            Coin::Solana => "SOL",
        }
    }

    /// Icon reference used by the presentation layer.
    pub fn icon(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "₿",
            Coin::Ethereum => "Ξ",
            Coin::Solana => "◎",
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Coin {
    type Err = CoreError;

    /// Accepts the API id or the ticker symbol, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Coin::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(needle) || c.symbol().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::UnknownCoin(s.to_string()))
    }
}
