use serde::{Deserialize, Serialize};

use super::coin::Coin;
use super::window::Window;

/// Three-way trend label derived from the first and last price of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendClassification {
    Bullish,
    Bearish,
    Sideways,
}

impl TrendClassification {
    /// Verb phrase used in the summary sentence.
    pub fn verb_phrase(&self) -> &'static str {
        match self {
            TrendClassification::Bullish => "shows bullish momentum",
            TrendClassification::Bearish => "shows bearish pressure",
            TrendClassification::Sideways => "is moving sideways",
        }
    }
}

impl std::fmt::Display for TrendClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendClassification::Bullish => write!(f, "bullish"),
            TrendClassification::Bearish => write!(f, "bearish"),
            TrendClassification::Sideways => write!(f, "sideways"),
        }
    }
}

/// Derived trend for one coin's series.
///
/// All optional fields are `None` together when the series has fewer than
/// two samples; that is an absence of trend, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub coin: Coin,
    pub window: Window,

    /// Full-precision percentage change from first to last sample.
    pub percent_change: Option<f64>,

    pub classification: Option<TrendClassification>,

    /// e.g. "BITCOIN shows bullish momentum over the last 7 days."
    pub summary_text: Option<String>,
}

impl TrendResult {
    pub fn has_trend(&self) -> bool {
        self.classification.is_some()
    }

    /// Headline string, e.g. "↑ +10.00%", or `None` without a trend.
    pub fn percent_display(&self) -> Option<String> {
        self.percent_change.map(format_percent_change)
    }
}

/// Render a percentage change for display.
///
/// Positive: `"↑ +X.XX%"`, negative: `"↓ -X.XX%"`, exactly zero: `"0%"`.
/// The arrow follows the raw value, so a tiny non-zero change that rounds to
/// zero still renders as `"↑ +0.00%"` or `"↓ -0.00%"`, matching its classification.
pub fn format_percent_change(pct: f64) -> String {
    if pct > 0.0 {
        format!("↑ +{pct:.2}%")
    } else if pct < 0.0 {
        format!("↓ {pct:.2}%")
    } else {
        "0%".to_string()
    }
}
