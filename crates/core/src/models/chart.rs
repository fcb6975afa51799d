use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::coin::Coin;
use super::window::Window;

/// How series values are expressed in a chart dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartScale {
    /// Raw prices.
    #[default]
    Absolute,
    /// Each series rebased to 100 at its first sample, so coins of very
    /// different magnitude can share one axis.
    Indexed,
}

/// Multi-series chart data: one row per date label, one column per coin.
///
/// The core computes all the numbers; the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub window: Window,
    pub scale: ChartScale,

    /// Coins that have a line in this dataset, in registry order.
    pub coins: Vec<Coin>,

    /// Rows in first-seen date order.
    pub rows: Vec<ChartRow>,
}

impl ChartDataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single x-axis point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    /// Opaque date label from the API
    pub date: String,

    /// Value per coin; a coin without a sample at this date is absent
    pub values: BTreeMap<Coin, f64>,
}
