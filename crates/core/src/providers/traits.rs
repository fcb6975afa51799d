use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::price::PriceSeries;
use crate::models::window::Window;

/// Boundary to the remote price API.
///
/// The aggregator only talks to this trait, so tests and alternative hosts
/// can swap the HTTP implementation for anything that yields a series.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PriceFetcher: Send + Sync {
    /// Human-readable name of this fetcher (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the trailing `window` of daily prices for `coin`,
    /// in chronological (response) order.
    async fn fetch_series(&self, coin: Coin, window: Window) -> Result<PriceSeries, CoreError>;
}
