pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use errors::CoreError;
use models::{
    chart::{ChartDataset, ChartScale},
    coin::Coin,
    portfolio::{Holdings, PortfolioValuation},
    price::SeriesMap,
    settings::Settings,
    state::{CycleRequest, CycleStatus, DashboardEvent, DashboardState, Transition},
    trend::TrendResult,
    window::Window,
};
use providers::{http::HttpPriceFetcher, traits::PriceFetcher};
use services::{
    aggregator_service::SeriesAggregator, chart_service::ChartService,
    portfolio_service::PortfolioValuator, trend_service::TrendAnalyzer,
};

/// Result of running one cycle, tagged with the cycle's version.
#[derive(Debug)]
pub struct CycleOutcome {
    pub version: u64,
    pub result: Result<SeriesMap, CoreError>,
}

/// Owned handle that can run cycles without borrowing the dashboard.
///
/// Hosts with an executor can spawn [`CycleRunner::run`] and feed the outcome
/// back through [`CryptoDashboard::complete_cycle`] whenever it arrives;
/// outcomes of superseded cycles are dropped there.
#[derive(Clone)]
pub struct CycleRunner {
    fetcher: Arc<dyn PriceFetcher>,
    aggregator: Arc<SeriesAggregator>,
}

impl CycleRunner {
    pub async fn run(&self, request: CycleRequest) -> CycleOutcome {
        let result = self
            .aggregator
            .aggregate(self.fetcher.as_ref(), &request)
            .await;
        CycleOutcome {
            version: request.version,
            result,
        }
    }
}

/// Main entry point for the crypto trends engine.
/// Holds the dashboard state and all services needed to operate on it.
///
/// Trends, chart data and the portfolio value are computed on every read
/// from the latest published series map, so they can never lag behind it.
#[must_use]
pub struct CryptoDashboard {
    state: DashboardState,
    settings: Settings,
    runner: CycleRunner,
    trend_analyzer: TrendAnalyzer,
    valuator: PortfolioValuator,
    chart_service: ChartService,
}

impl std::fmt::Debug for CryptoDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoDashboard")
            .field("selection", &self.state.selected_coins())
            .field("window", &self.state.window())
            .field("holdings", &self.state.holdings().len())
            .field("status", self.state.status())
            .field("version", &self.state.version())
            .field("fetcher", &self.runner.fetcher.name())
            .finish()
    }
}

impl CryptoDashboard {
    /// Create a dashboard backed by the HTTP price API from `settings`.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let fetcher = Arc::new(HttpPriceFetcher::from_settings(&settings));
        Ok(Self::with_fetcher(settings, fetcher))
    }

    /// Create a dashboard with a custom price fetcher (tests, alternative hosts).
    pub fn with_fetcher(settings: Settings, fetcher: Arc<dyn PriceFetcher>) -> Self {
        let state = DashboardState::new(settings.default_coins.iter().copied(), settings.default_window);
        let runner = CycleRunner {
            fetcher,
            aggregator: Arc::new(SeriesAggregator::new(settings.fetch_timeout_secs)),
        };
        Self {
            state,
            settings,
            runner,
            trend_analyzer: TrendAnalyzer::new(),
            valuator: PortfolioValuator::new(),
            chart_service: ChartService::new(),
        }
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Replace the selected coin set. Starts a new cycle if the set changed.
    pub fn select_coins(&mut self, coins: impl IntoIterator<Item = Coin>) -> Transition {
        self.state
            .apply(DashboardEvent::SelectionChanged(coins.into_iter().collect()))
    }

    /// Add `coin` to the selection, or remove it if already selected.
    pub fn toggle_coin(&mut self, coin: Coin) -> Transition {
        let mut coins = self.state.selected_coins();
        match coins.iter().position(|c| *c == coin) {
            Some(idx) => {
                coins.remove(idx);
            }
            None => coins.push(coin),
        }
        self.select_coins(coins)
    }

    /// Change the window. Starts a new cycle if it changed.
    pub fn set_window(&mut self, window: Window) -> Transition {
        self.state.apply(DashboardEvent::WindowChanged(window))
    }

    /// Change the window from a raw day count; only 7, 30 and 90 are accepted.
    pub fn set_window_days(&mut self, days: u32) -> Result<Transition, CoreError> {
        let window = Window::try_from(days)?;
        Ok(self.set_window(window))
    }

    // ── Holdings ────────────────────────────────────────────────────

    pub fn set_holding(&mut self, coin: Coin, quantity: f64) -> Transition {
        self.state.apply(DashboardEvent::HoldingSet { coin, quantity })
    }

    /// Set a holding from raw form input; non-numeric text counts as 0.
    pub fn set_holding_input(&mut self, coin: Coin, input: &str) -> Transition {
        self.state.apply(DashboardEvent::HoldingInput {
            coin,
            input: input.to_string(),
        })
    }

    pub fn remove_holding(&mut self, coin: Coin) -> Transition {
        self.state.apply(DashboardEvent::HoldingRemoved(coin))
    }

    // ── Cycles ──────────────────────────────────────────────────────

    /// Start a new cycle for the current selection and window
    /// (initial load, or an explicit retry after a failure).
    pub fn begin_refresh(&mut self) -> Transition {
        self.state.apply(DashboardEvent::Refresh)
    }

    /// A detached handle for running cycles concurrently with further
    /// dashboard updates.
    pub fn cycle_runner(&self) -> CycleRunner {
        self.runner.clone()
    }

    /// Fetch everything `request` asks for. Does not touch dashboard state.
    pub async fn run_cycle(&self, request: CycleRequest) -> CycleOutcome {
        self.runner.run(request).await
    }

    /// Publish a finished cycle, unless a newer cycle has started since.
    pub fn complete_cycle(&mut self, outcome: CycleOutcome) -> Transition {
        self.state.apply(DashboardEvent::CycleCompleted {
            version: outcome.version,
            outcome: outcome.result,
        })
    }

    /// Run the cycle a transition asks for (if any) and publish it.
    pub async fn drive(&mut self, transition: Transition) -> Transition {
        match transition {
            Transition::Fetch(request) => {
                let outcome = self.run_cycle(request).await;
                self.complete_cycle(outcome)
            }
            other => other,
        }
    }

    /// Start a cycle for the current selection and wait for it to settle.
    pub async fn refresh(&mut self) -> Transition {
        let transition = self.begin_refresh();
        self.drive(transition).await
    }

    // ── Outputs ─────────────────────────────────────────────────────

    /// Series map of the latest completed cycle, `None` before the first
    /// success or after a failed cycle.
    #[must_use]
    pub fn series(&self) -> Option<&SeriesMap> {
        self.state.series()
    }

    /// Chart data for the published series, `None` when nothing is published.
    #[must_use]
    pub fn chart(&self, scale: ChartScale) -> Option<ChartDataset> {
        self.state
            .series()
            .map(|m| self.chart_service.build_dataset(m, scale))
    }

    /// One trend per published series.
    #[must_use]
    pub fn trends(&self) -> Vec<TrendResult> {
        self.state
            .series()
            .map(|m| self.trend_analyzer.analyze_all(m))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn trend_for(&self, coin: Coin) -> Option<TrendResult> {
        let map = self.state.series()?;
        let series = map.get(coin)?;
        Some(self.trend_analyzer.analyze(series, coin, map.window()))
    }

    /// Current value of all holdings at the latest published prices.
    #[must_use]
    pub fn portfolio_value(&self) -> f64 {
        self.valuator
            .valuate(self.state.series(), self.state.holdings())
    }

    #[must_use]
    pub fn portfolio_valuation(&self) -> PortfolioValuation {
        self.valuator
            .valuate_detailed(self.state.series(), self.state.holdings())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message()
    }

    #[must_use]
    pub fn status(&self) -> &CycleStatus {
        self.state.status()
    }

    #[must_use]
    pub fn selected_coins(&self) -> Vec<Coin> {
        self.state.selected_coins()
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.state.window()
    }

    #[must_use]
    pub fn holdings(&self) -> &Holdings {
        self.state.holdings()
    }

    /// Version of the most recently started cycle.
    #[must_use]
    pub fn current_version(&self) -> u64 {
        self.state.version()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
