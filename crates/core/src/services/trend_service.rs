use crate::models::coin::Coin;
use crate::models::price::{PriceSeries, SeriesMap};
use crate::models::trend::{TrendClassification, TrendResult};
use crate::models::window::Window;

/// Derives percentage change and a trend label from a price series.
///
/// Pure computation. Only the first and last samples matter.
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one coin's series.
    ///
    /// - Fewer than 2 samples: every derived field is `None`.
    /// - First price of 0: the change is undefined, so it is reported as
    ///   0% and `Sideways` instead of a non-finite number.
    /// - Otherwise `(last - first) / first * 100`, classified by exact
    ///   comparison of `last` against `first`.
    pub fn analyze(&self, series: &PriceSeries, coin: Coin, window: Window) -> TrendResult {
        let (first, last) = match (series.first(), series.last()) {
            (Some(f), Some(l)) if series.len() >= 2 => (f.price, l.price),
            _ => {
                return TrendResult {
                    coin,
                    window,
                    percent_change: None,
                    classification: None,
                    summary_text: None,
                }
            }
        };

        let (percent_change, classification) = if first == 0.0 {
            (0.0, TrendClassification::Sideways)
        } else {
            // Exact float equality on purpose: only identical prices are sideways.
            let classification = if last > first {
                TrendClassification::Bullish
            } else if last < first {
                TrendClassification::Bearish
            } else {
                TrendClassification::Sideways
            };
            ((last - first) / first * 100.0, classification)
        };

        TrendResult {
            coin,
            window,
            percent_change: Some(percent_change),
            classification: Some(classification),
            summary_text: Some(Self::summary(coin, classification, window)),
        }
    }

    /// One result per series in the map, in registry order.
    pub fn analyze_all(&self, series_map: &SeriesMap) -> Vec<TrendResult> {
        series_map
            .iter()
            .map(|(coin, series)| self.analyze(series, coin, series_map.window()))
            .collect()
    }

    fn summary(coin: Coin, classification: TrendClassification, window: Window) -> String {
        format!(
            "{} {} over the last {} days.",
            coin.id().to_uppercase(),
            classification.verb_phrase(),
            window.days()
        )
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
