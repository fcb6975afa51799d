use crate::models::coin::Coin;
use crate::models::portfolio::{HoldingValue, Holdings, PortfolioValuation};
use crate::models::price::SeriesMap;

/// Values holdings at the latest price of each coin's series.
///
/// Pure business logic with no I/O.
/// Totals run over the holdings, not over the series: a held coin without a
/// series contributes 0. A product that overflows to a non-finite value also
/// contributes 0, and the total is held to the same rule, so valuations are
/// always finite and non-negative.
pub struct PortfolioValuator;

impl PortfolioValuator {
    pub fn new() -> Self {
        Self
    }

    /// Latest price of `coin`, or 0 when no (non-empty) series is available.
    pub fn latest_price(&self, series: Option<&SeriesMap>, coin: Coin) -> f64 {
        series.and_then(|m| m.latest_price(coin)).unwrap_or(0.0)
    }

    /// Σ holdings[coin] × latest_price(coin).
    pub fn valuate(&self, series: Option<&SeriesMap>, holdings: &Holdings) -> f64 {
        let total: f64 = holdings
            .iter()
            .map(|(coin, quantity)| finite_or_zero(quantity * self.latest_price(series, coin)))
            .sum();
        finite_or_zero(total)
    }

    /// Total plus a per-coin breakdown with allocation percentages.
    pub fn valuate_detailed(&self, series: Option<&SeriesMap>, holdings: &Holdings) -> PortfolioValuation {
        let mut values: Vec<HoldingValue> = holdings
            .iter()
            .map(|(coin, quantity)| {
                let latest_price = series.and_then(|m| m.latest_price(coin));
                HoldingValue {
                    coin,
                    quantity,
                    latest_price,
                    value: finite_or_zero(quantity * latest_price.unwrap_or(0.0)),
                    allocation_pct: 0.0, // filled below
                }
            })
            .collect();

        let total = finite_or_zero(values.iter().map(|v| v.value).sum());
        for v in &mut values {
            v.allocation_pct = if total > 0.0 {
                (v.value / total) * 100.0
            } else {
                0.0
            };
        }

        // Largest holding first
        values.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        PortfolioValuation {
            total,
            holdings: values,
        }
    }
}

/// Overflowed products count as 0 rather than poisoning the total.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl Default for PortfolioValuator {
    fn default() -> Self {
        Self::new()
    }
}
