use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::PriceFetcher;
use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::price::{PriceSample, PriceSeries};
use crate::models::settings::Settings;
use crate::models::window::Window;

const PROVIDER: &str = "PriceApi";

/// Fetches price history from the dashboard's price API.
///
/// - **Endpoint**: `GET {base_url}/api/crypto/{coin}?days={window}`
/// - **Response**: JSON array of `{ "date": string, "price": number }`,
///   ascending by date.
///
/// Any non-2xx status, transport error or malformed body fails the fetch.
pub struct HttpPriceFetcher {
    client: Client,
    base_url: String,
}

impl HttpPriceFetcher {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.base_url, settings.fetch_timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a coin and window.
    pub fn series_url(&self, coin: Coin, window: Window) -> String {
        format!("{}/api/crypto/{}?days={}", self.base_url, coin.id(), window.days())
    }
}

// ── Price API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct WireSample {
    date: String,
    price: f64,
}

/// Convert wire samples, rejecting the whole response on any invalid price.
fn into_series(coin: Coin, wire: Vec<WireSample>) -> Result<PriceSeries, CoreError> {
    wire.into_iter()
        .map(|s| {
            if !s.price.is_finite() || s.price < 0.0 {
                return Err(CoreError::Api {
                    provider: PROVIDER.into(),
                    message: format!(
                        "Invalid price for {coin} on {}: {} (must be finite and non-negative)",
                        s.date, s.price
                    ),
                });
            }
            Ok(PriceSample {
                date: s.date,
                price: s.price,
            })
        })
        .collect()
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PriceFetcher for HttpPriceFetcher {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_series(&self, coin: Coin, window: Window) -> Result<PriceSeries, CoreError> {
        let url = self.series_url(coin, window);
        tracing::debug!(%coin, days = window.days(), "requesting price series");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {} for {coin}", status.as_u16()),
            });
        }

        let wire: Vec<WireSample> = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse price series for {coin}: {e}"),
        })?;

        let series = into_series(coin, wire)?;
        tracing::debug!(%coin, samples = series.len(), "price series received");
        Ok(series)
    }
}
