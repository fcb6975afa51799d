use futures_util::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::{CoinFailure, CoreError};
use crate::models::coin::Coin;
use crate::models::price::{PriceSeries, SeriesMap};
use crate::models::state::CycleRequest;
use crate::models::window::Window;
use crate::providers::traits::PriceFetcher;

/// Runs one aggregation cycle: fetches every requested coin for a single
/// shared window and joins the results.
///
/// Fetches are issued concurrently; the cycle settles only once all of them
/// have finished. A single failed coin fails the whole cycle, so callers never
/// see a silently reduced map.
pub struct SeriesAggregator {
    timeout_secs: u64,
}

impl SeriesAggregator {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Fetch all coins of `request` and build its series map.
    pub async fn aggregate(
        &self,
        fetcher: &dyn PriceFetcher,
        request: &CycleRequest,
    ) -> Result<SeriesMap, CoreError> {
        let coins: BTreeSet<Coin> = request.coins.iter().copied().collect();
        let window = request.window;

        let results = join_all(coins.into_iter().map(|coin| async move {
            (coin, self.fetch_one(fetcher, coin, window).await)
        }))
        .await;

        let mut series = BTreeMap::new();
        let mut failures = Vec::new();
        for (coin, result) in results {
            match result {
                Ok(s) => {
                    series.insert(coin, s);
                }
                Err(e) => {
                    tracing::warn!(
                        %coin,
                        version = request.version,
                        provider = fetcher.name(),
                        error = %e,
                        "price fetch failed"
                    );
                    failures.push(CoinFailure {
                        coin,
                        message: e.to_string(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(CoreError::CycleFailed { failures });
        }
        Ok(SeriesMap::new(request.version, window, series))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn fetch_one(
        &self,
        fetcher: &dyn PriceFetcher,
        coin: Coin,
        window: Window,
    ) -> Result<PriceSeries, CoreError> {
        let limit = Duration::from_secs(self.timeout_secs);
        tokio::time::timeout(limit, fetcher.fetch_series(coin, window))
            .await
            .map_err(|_| CoreError::Timeout {
                coin,
                seconds: self.timeout_secs,
            })?
    }

    // No tokio timer in the browser; the HTTP layer is the only bound there.
    #[cfg(target_arch = "wasm32")]
    async fn fetch_one(
        &self,
        fetcher: &dyn PriceFetcher,
        coin: Coin,
        window: Window,
    ) -> Result<PriceSeries, CoreError> {
        fetcher.fetch_series(coin, window).await
    }
}
