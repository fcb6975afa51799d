use std::collections::BTreeSet;

use super::coin::Coin;
use super::portfolio::Holdings;
use super::price::SeriesMap;
use super::window::Window;
use crate::errors::CoreError;

/// Lifecycle of the current aggregation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    /// No cycle has been started yet.
    Idle,
    /// A cycle with this version is in flight.
    Loading { version: u64 },
    /// The latest cycle published a series map.
    Ready,
    /// The latest cycle failed; no series map is published.
    Failed { message: String },
}

/// Work order for one aggregation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRequest {
    pub version: u64,
    pub coins: Vec<Coin>,
    pub window: Window,
}

/// Everything that can change dashboard state.
#[derive(Debug)]
pub enum DashboardEvent {
    SelectionChanged(Vec<Coin>),
    WindowChanged(Window),
    HoldingSet { coin: Coin, quantity: f64 },
    HoldingInput { coin: Coin, input: String },
    HoldingRemoved(Coin),
    /// Explicit re-trigger (initial load or retry after a failure).
    Refresh,
    CycleCompleted {
        version: u64,
        outcome: Result<SeriesMap, CoreError>,
    },
}

/// What applying an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing observable changed.
    Unchanged,
    /// A new cycle started; the caller must run it and report completion.
    Fetch(CycleRequest),
    /// A series map for this version is now published.
    Published { version: u64 },
    /// The cycle with this version failed and the published map was cleared.
    Failed { version: u64 },
    /// A completion arrived for a superseded cycle and was dropped.
    Discarded { version: u64 },
    HoldingsUpdated,
}

/// Single-owner application state.
///
/// Selection, window and holdings change only through [`DashboardState::apply`].
/// The published series map is replaced wholesale when a cycle completes, and
/// only if that cycle is still the latest one started.
#[derive(Debug, Clone)]
pub struct DashboardState {
    selection: BTreeSet<Coin>,
    window: Window,
    holdings: Holdings,
    series: Option<SeriesMap>,
    status: CycleStatus,
    version: u64,
}

impl DashboardState {
    pub fn new(coins: impl IntoIterator<Item = Coin>, window: Window) -> Self {
        Self {
            selection: coins.into_iter().collect(),
            window,
            holdings: Holdings::new(),
            series: None,
            status: CycleStatus::Idle,
            version: 0,
        }
    }

    pub fn apply(&mut self, event: DashboardEvent) -> Transition {
        match event {
            DashboardEvent::SelectionChanged(coins) => {
                let selection: BTreeSet<Coin> = coins.into_iter().collect();
                if selection == self.selection && self.status != CycleStatus::Idle {
                    return Transition::Unchanged;
                }
                self.selection = selection;
                self.start_cycle()
            }
            DashboardEvent::WindowChanged(window) => {
                if window == self.window && self.status != CycleStatus::Idle {
                    return Transition::Unchanged;
                }
                self.window = window;
                self.start_cycle()
            }
            DashboardEvent::Refresh => self.start_cycle(),
            DashboardEvent::HoldingSet { coin, quantity } => {
                self.holdings.set(coin, quantity);
                Transition::HoldingsUpdated
            }
            DashboardEvent::HoldingInput { coin, input } => {
                self.holdings.set_from_input(coin, &input);
                Transition::HoldingsUpdated
            }
            DashboardEvent::HoldingRemoved(coin) => match self.holdings.remove(coin) {
                Some(_) => Transition::HoldingsUpdated,
                None => Transition::Unchanged,
            },
            DashboardEvent::CycleCompleted { version, outcome } => self.complete_cycle(version, outcome),
        }
    }

    fn start_cycle(&mut self) -> Transition {
        self.version += 1;
        let version = self.version;

        if self.selection.is_empty() {
            // Nothing to fetch: publish an empty map right away.
            self.series = Some(SeriesMap::empty(version, self.window));
            self.status = CycleStatus::Ready;
            tracing::info!(version, "empty selection, published empty series map");
            return Transition::Published { version };
        }

        self.status = CycleStatus::Loading { version };
        tracing::info!(
            version,
            window = self.window.days(),
            coins = self.selection.len(),
            "aggregation cycle started"
        );
        Transition::Fetch(CycleRequest {
            version,
            coins: self.selected_coins(),
            window: self.window,
        })
    }

    fn complete_cycle(&mut self, version: u64, outcome: Result<SeriesMap, CoreError>) -> Transition {
        let in_flight = matches!(self.status, CycleStatus::Loading { version: v } if v == version);
        if version != self.version || !in_flight {
            tracing::warn!(
                version,
                current = self.version,
                "discarding result of superseded aggregation cycle"
            );
            return Transition::Discarded { version };
        }

        match outcome {
            Ok(map) => {
                tracing::info!(version, coins = map.len(), "series map published");
                self.series = Some(map);
                self.status = CycleStatus::Ready;
                Transition::Published { version }
            }
            Err(e) => {
                tracing::warn!(version, error = %e, "aggregation cycle failed");
                self.series = None;
                self.status = CycleStatus::Failed {
                    message: e.to_string(),
                };
                Transition::Failed { version }
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Selected coins in registry order.
    pub fn selected_coins(&self) -> Vec<Coin> {
        self.selection.iter().copied().collect()
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    /// Series map of the latest completed cycle, if it succeeded.
    pub fn series(&self) -> Option<&SeriesMap> {
        self.series.as_ref()
    }

    pub fn status(&self) -> &CycleStatus {
        &self.status
    }

    /// Version of the most recently started cycle.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, CycleStatus::Loading { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            CycleStatus::Failed { message } => Some(message),
            _ => None,
        }
    }
}
