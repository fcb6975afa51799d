use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::coin::Coin;
use super::window::Window;

/// A single dated price sample as returned by the price API.
///
/// `date` is an opaque label (chart x-axis key); it is never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub date: String,
    pub price: f64,
}

impl PriceSample {
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self {
            date: date.into(),
            price,
        }
    }
}

/// Samples for one coin over one window, in response order.
pub type PriceSeries = Vec<PriceSample>;

/// The published result of one completed aggregation cycle.
///
/// Contains exactly the coins that were requested in that cycle, all fetched
/// for the same `window`. Built once by the aggregator and never mutated
/// afterwards; a newer cycle replaces the whole map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMap {
    version: u64,
    window: Window,
    fetched_at: DateTime<Utc>,
    series: BTreeMap<Coin, PriceSeries>,
}

impl SeriesMap {
    pub fn new(version: u64, window: Window, series: BTreeMap<Coin, PriceSeries>) -> Self {
        Self {
            version,
            window,
            fetched_at: Utc::now(),
            series,
        }
    }

    /// An empty map for a cycle with no selected coins.
    pub fn empty(version: u64, window: Window) -> Self {
        Self::new(version, window, BTreeMap::new())
    }

    /// Version of the cycle that produced this map.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn get(&self, coin: Coin) -> Option<&PriceSeries> {
        self.series.get(&coin)
    }

    /// Price of the last sample for `coin`, if the coin is present and non-empty.
    pub fn latest_price(&self, coin: Coin) -> Option<f64> {
        self.series.get(&coin)?.last().map(|s| s.price)
    }

    /// Coins present in this map, in registry order.
    pub fn coins(&self) -> Vec<Coin> {
        self.series.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coin, &PriceSeries)> {
        self.series.iter().map(|(c, s)| (*c, s))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
