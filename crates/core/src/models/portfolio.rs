use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::coin::Coin;

/// Quantities the user holds, keyed by coin.
///
/// Every stored quantity is finite and non-negative: non-numeric, NaN and
/// infinite input becomes 0, negative input is clamped to 0. A finite quantity
/// can still overflow when priced; valuation counts such a holding as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    quantities: BTreeMap<Coin, f64>,
}

impl Holdings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the held quantity for `coin`. Returns the quantity actually stored.
    pub fn set(&mut self, coin: Coin, quantity: f64) -> f64 {
        let sanitized = sanitize_quantity(quantity);
        if sanitized != quantity {
            tracing::warn!(%coin, input = quantity, stored = sanitized, "holding quantity sanitized");
        }
        self.quantities.insert(coin, sanitized);
        sanitized
    }

    /// Set the held quantity from raw text input (e.g. a form field).
    /// Blank or non-numeric text counts as 0.
    pub fn set_from_input(&mut self, coin: Coin, input: &str) -> f64 {
        let trimmed = input.trim();
        match trimmed.parse::<f64>() {
            Ok(q) => self.set(coin, q),
            Err(_) => {
                if !trimmed.is_empty() {
                    tracing::warn!(%coin, input = trimmed, "non-numeric holding input treated as 0");
                }
                self.quantities.insert(coin, 0.0);
                0.0
            }
        }
    }

    pub fn remove(&mut self, coin: Coin) -> Option<f64> {
        self.quantities.remove(&coin)
    }

    /// Held quantity, 0 when the coin was never entered.
    pub fn get(&self, coin: Coin) -> f64 {
        self.quantities.get(&coin).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, coin: Coin) -> bool {
        self.quantities.contains_key(&coin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coin, f64)> + '_ {
        self.quantities.iter().map(|(c, q)| (*c, *q))
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl FromIterator<(Coin, f64)> for Holdings {
    fn from_iter<T: IntoIterator<Item = (Coin, f64)>>(iter: T) -> Self {
        let mut holdings = Holdings::new();
        for (coin, quantity) in iter {
            holdings.set(coin, quantity);
        }
        holdings
    }
}

fn sanitize_quantity(quantity: f64) -> f64 {
    if !quantity.is_finite() {
        0.0
    } else {
        quantity.max(0.0)
    }
}

/// Current worth of the holdings, priced at the latest sample of each series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Sum of all holding values.
    pub total: f64,

    /// Per-coin breakdown, largest value first.
    pub holdings: Vec<HoldingValue>,
}

impl PortfolioValuation {
    /// Total rendered with two decimals, e.g. "100000.00".
    pub fn total_display(&self) -> String {
        format!("{:.2}", self.total)
    }
}

/// Valuation of a single held coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValue {
    pub coin: Coin,

    pub quantity: f64,

    /// Latest known price, `None` when the coin has no series in the current map.
    pub latest_price: Option<f64>,

    /// quantity × latest price (0 without a price, or when the product overflows)
    pub value: f64,

    /// This holding's value / total value × 100 (0 when the total is 0)
    pub allocation_pct: f64,
}
