use std::collections::BTreeMap;

use crypto_trends_core::errors::CoreError;
use crypto_trends_core::models::coin::Coin;
use crypto_trends_core::models::portfolio::Holdings;
use crypto_trends_core::models::price::{PriceSample, SeriesMap};
use crypto_trends_core::models::settings::Settings;
use crypto_trends_core::models::state::{
    CycleRequest, CycleStatus, DashboardEvent, DashboardState, Transition,
};
use crypto_trends_core::models::trend::{format_percent_change, TrendClassification};
use crypto_trends_core::models::window::Window;

fn series(prices: &[f64]) -> Vec<PriceSample> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| PriceSample::new(format!("d{}", i + 1), *p))
        .collect()
}

fn map(version: u64, window: Window, entries: Vec<(Coin, Vec<PriceSample>)>) -> SeriesMap {
    SeriesMap::new(version, window, entries.into_iter().collect::<BTreeMap<_, _>>())
}

// ═══════════════════════════════════════════════════════════════════
//  Coin
// ═══════════════════════════════════════════════════════════════════

mod coin {
    use super::*;

    #[test]
    fn registry_has_three_coins_in_order() {
        assert_eq!(Coin::ALL, [Coin::Bitcoin, Coin::Ethereum, Coin::Solana]);
    }

    #[test]
    fn display_is_api_id() {
        assert_eq!(Coin::Bitcoin.to_string(), "bitcoin");
        assert_eq!(Coin::Ethereum.to_string(), "ethereum");
        assert_eq!(Coin::Solana.to_string(), "solana");
    }

    #[test]
    fn labels_and_symbols() {
        assert_eq!(Coin::Ethereum.label(), "Ethereum");
        assert_eq!(Coin::Solana.symbol(), "SOL");
        assert!(!Coin::Bitcoin.icon().is_empty());
    }

    #[test]
    fn parse_id_case_insensitive() {
        assert_eq!("BITCOIN".parse::<Coin>().unwrap(), Coin::Bitcoin);
        assert_eq!(" solana ".parse::<Coin>().unwrap(), Coin::Solana);
    }

    #[test]
    fn parse_symbol() {
        assert_eq!("eth".parse::<Coin>().unwrap(), Coin::Ethereum);
    }

    #[test]
    fn parse_unknown_fails() {
        let err = "dogecoin".parse::<Coin>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownCoin(ref s) if s == "dogecoin"));
    }

    #[test]
    fn serde_uses_lowercase_id() {
        assert_eq!(serde_json::to_string(&Coin::Bitcoin).unwrap(), "\"bitcoin\"");
        let back: Coin = serde_json::from_str("\"solana\"").unwrap();
        assert_eq!(back, Coin::Solana);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Window
// ═══════════════════════════════════════════════════════════════════

mod window {
    use super::*;

    #[test]
    fn days() {
        assert_eq!(Window::Week.days(), 7);
        assert_eq!(Window::Month.days(), 30);
        assert_eq!(Window::Quarter.days(), 90);
    }

    #[test]
    fn default_is_seven_days() {
        assert_eq!(Window::default(), Window::Week);
    }

    #[test]
    fn try_from_accepts_enumerated_values() {
        for w in Window::ALL {
            assert_eq!(Window::try_from(w.days()).unwrap(), w);
        }
    }

    #[test]
    fn try_from_rejects_other_values() {
        for days in [0, 1, 14, 31, 365] {
            assert!(matches!(
                Window::try_from(days),
                Err(CoreError::InvalidWindow(d)) if d == days
            ));
        }
    }

    #[test]
    fn label_and_display() {
        assert_eq!(Window::Month.label(), "30D");
        assert_eq!(Window::Quarter.to_string(), "90 days");
    }

    #[test]
    fn serde_as_day_count() {
        assert_eq!(serde_json::to_string(&Window::Month).unwrap(), "30");
        let back: Window = serde_json::from_str("90").unwrap();
        assert_eq!(back, Window::Quarter);
        assert!(serde_json::from_str::<Window>("14").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  SeriesMap
// ═══════════════════════════════════════════════════════════════════

mod series_map {
    use super::*;

    #[test]
    fn latest_price_is_last_sample() {
        let m = map(1, Window::Week, vec![(Coin::Bitcoin, series(&[1.0, 2.0, 3.0]))]);
        assert_eq!(m.latest_price(Coin::Bitcoin), Some(3.0));
    }

    #[test]
    fn latest_price_absent_coin() {
        let m = map(1, Window::Week, vec![(Coin::Bitcoin, series(&[1.0]))]);
        assert_eq!(m.latest_price(Coin::Ethereum), None);
    }

    #[test]
    fn latest_price_empty_series() {
        let m = map(1, Window::Week, vec![(Coin::Bitcoin, vec![])]);
        assert_eq!(m.latest_price(Coin::Bitcoin), None);
    }

    #[test]
    fn carries_version_and_window() {
        let m = SeriesMap::empty(7, Window::Quarter);
        assert_eq!(m.version(), 7);
        assert_eq!(m.window(), Window::Quarter);
        assert!(m.is_empty());
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn coins_in_registry_order() {
        let m = map(
            1,
            Window::Week,
            vec![
                (Coin::Solana, series(&[1.0])),
                (Coin::Bitcoin, series(&[1.0])),
            ],
        );
        assert_eq!(m.coins(), vec![Coin::Bitcoin, Coin::Solana]);
    }

    #[test]
    fn sample_serde_shape() {
        let s: PriceSample = serde_json::from_str(r#"{"date":"Jan 1","price":42.5}"#).unwrap();
        assert_eq!(s, PriceSample::new("Jan 1", 42.5));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Holdings
// ═══════════════════════════════════════════════════════════════════

mod holdings {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut h = Holdings::new();
        assert_eq!(h.set(Coin::Bitcoin, 0.25), 0.25);
        assert_eq!(h.get(Coin::Bitcoin), 0.25);
        assert_eq!(h.get(Coin::Solana), 0.0);
        assert!(h.contains(Coin::Bitcoin));
        assert!(!h.contains(Coin::Solana));
    }

    #[test]
    fn negative_clamped_to_zero() {
        let mut h = Holdings::new();
        assert_eq!(h.set(Coin::Bitcoin, -2.0), 0.0);
        assert_eq!(h.get(Coin::Bitcoin), 0.0);
    }

    #[test]
    fn nan_and_infinite_become_zero() {
        let mut h = Holdings::new();
        assert_eq!(h.set(Coin::Bitcoin, f64::NAN), 0.0);
        assert_eq!(h.set(Coin::Ethereum, f64::INFINITY), 0.0);
    }

    #[test]
    fn input_parses_numbers() {
        let mut h = Holdings::new();
        assert_eq!(h.set_from_input(Coin::Ethereum, " 1.5 "), 1.5);
        assert_eq!(h.get(Coin::Ethereum), 1.5);
    }

    #[test]
    fn input_non_numeric_is_zero() {
        let mut h = Holdings::new();
        assert_eq!(h.set_from_input(Coin::Ethereum, "abc"), 0.0);
        assert_eq!(h.set_from_input(Coin::Solana, ""), 0.0);
        assert!(h.contains(Coin::Ethereum));
        assert_eq!(h.get(Coin::Ethereum), 0.0);
    }

    #[test]
    fn input_nan_text_is_zero() {
        let mut h = Holdings::new();
        assert_eq!(h.set_from_input(Coin::Bitcoin, "NaN"), 0.0);
    }

    #[test]
    fn remove() {
        let mut h = Holdings::new();
        h.set(Coin::Solana, 3.0);
        assert_eq!(h.remove(Coin::Solana), Some(3.0));
        assert_eq!(h.remove(Coin::Solana), None);
        assert!(h.is_empty());
    }

    #[test]
    fn from_iterator_sanitizes() {
        let h: Holdings = vec![(Coin::Bitcoin, 1.0), (Coin::Solana, -1.0)]
            .into_iter()
            .collect();
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(Coin::Solana), 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Trend formatting
// ═══════════════════════════════════════════════════════════════════

mod trend {
    use super::*;

    #[test]
    fn positive_percent() {
        assert_eq!(format_percent_change(10.0), "↑ +10.00%");
    }

    #[test]
    fn negative_percent_has_single_minus() {
        assert_eq!(format_percent_change(-10.0), "↓ -10.00%");
    }

    #[test]
    fn zero_percent() {
        assert_eq!(format_percent_change(0.0), "0%");
    }

    #[test]
    fn tiny_change_keeps_its_arrow() {
        assert_eq!(format_percent_change(0.000001), "↑ +0.00%");
        assert!(format_percent_change(-0.000001).starts_with("↓ "));
        assert_ne!(format_percent_change(0.000001), "0%");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(format_percent_change(3.14159), "↑ +3.14%");
        assert_eq!(format_percent_change(-0.5), "↓ -0.50%");
    }

    #[test]
    fn verb_phrases() {
        assert_eq!(TrendClassification::Bullish.verb_phrase(), "shows bullish momentum");
        assert_eq!(TrendClassification::Bearish.verb_phrase(), "shows bearish pressure");
        assert_eq!(TrendClassification::Sideways.verb_phrase(), "is moving sideways");
    }

    #[test]
    fn classification_display() {
        assert_eq!(TrendClassification::Bullish.to_string(), "bullish");
        assert_eq!(TrendClassification::Sideways.to_string(), "sideways");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.default_window, Window::Week);
        assert_eq!(s.default_coins, vec![Coin::Bitcoin]);
        assert!(s.fetch_timeout_secs > 0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn from_json_partial_keeps_defaults() {
        let s = Settings::from_json(r#"{"base_url":"https://prices.example","default_window":30}"#)
            .unwrap();
        assert_eq!(s.base_url, "https://prices.example");
        assert_eq!(s.default_window, Window::Month);
        assert_eq!(s.fetch_timeout_secs, Settings::default().fetch_timeout_secs);
    }

    #[test]
    fn from_json_rejects_bad_window() {
        assert!(Settings::from_json(r#"{"default_window":14}"#).is_err());
    }

    #[test]
    fn from_json_rejects_bad_url() {
        let err = Settings::from_json(r#"{"base_url":"ftp://x"}"#).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let s = Settings {
            fetch_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    const ENV_VARS: [&str; 4] = [
        "CRYPTO_TRENDS_BASE_URL",
        "CRYPTO_TRENDS_FETCH_TIMEOUT_SECS",
        "CRYPTO_TRENDS_WINDOW",
        "CRYPTO_TRENDS_COINS",
    ];

    // Environment is process-wide; env tests take this lock.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn with_env(vars: &[(&str, &str)], check: impl FnOnce(Settings)) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        let settings = Settings::from_env();
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        check(settings);
    }

    #[test]
    fn from_env_without_overrides_is_default() {
        with_env(&[], |s| assert_eq!(s, Settings::default()));
    }

    #[test]
    fn from_env_applies_every_override() {
        with_env(
            &[
                ("CRYPTO_TRENDS_BASE_URL", " https://prices.example "),
                ("CRYPTO_TRENDS_FETCH_TIMEOUT_SECS", "5"),
                ("CRYPTO_TRENDS_WINDOW", "90"),
                ("CRYPTO_TRENDS_COINS", "eth, SOL"),
            ],
            |s| {
                assert_eq!(s.base_url, "https://prices.example");
                assert_eq!(s.fetch_timeout_secs, 5);
                assert_eq!(s.default_window, Window::Quarter);
                assert_eq!(s.default_coins, vec![Coin::Ethereum, Coin::Solana]);
                assert!(s.validate().is_ok());
            },
        );
    }

    #[test]
    fn from_env_invalid_values_fall_back_to_defaults() {
        with_env(
            &[
                ("CRYPTO_TRENDS_BASE_URL", "   "),
                ("CRYPTO_TRENDS_FETCH_TIMEOUT_SECS", "0"),
                ("CRYPTO_TRENDS_WINDOW", "14"),
                ("CRYPTO_TRENDS_COINS", "bitcoin,dogecoin"),
            ],
            |s| assert_eq!(s, Settings::default()),
        );
    }

    #[test]
    fn from_env_unparsable_numbers_fall_back() {
        with_env(
            &[
                ("CRYPTO_TRENDS_FETCH_TIMEOUT_SECS", "soon"),
                ("CRYPTO_TRENDS_WINDOW", "month"),
            ],
            |s| {
                assert_eq!(s.fetch_timeout_secs, 15);
                assert_eq!(s.default_window, Window::Week);
            },
        );
    }

    #[test]
    fn json_roundtrip() {
        let s = Settings {
            default_coins: vec![Coin::Ethereum, Coin::Solana],
            ..Settings::default()
        };
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), s);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  DashboardState reducer
// ═══════════════════════════════════════════════════════════════════

mod state {
    use super::*;

    fn fetch_request(t: Transition) -> CycleRequest {
        match t {
            Transition::Fetch(req) => req,
            other => panic!("expected Fetch, got {other:?}"),
        }
    }

    fn completed(version: u64, outcome: Result<SeriesMap, CoreError>) -> DashboardEvent {
        DashboardEvent::CycleCompleted { version, outcome }
    }

    #[test]
    fn new_state_is_idle() {
        let s = DashboardState::new([Coin::Bitcoin], Window::Week);
        assert_eq!(s.status(), &CycleStatus::Idle);
        assert_eq!(s.version(), 0);
        assert!(s.series().is_none());
        assert!(!s.is_loading());
    }

    #[test]
    fn refresh_starts_cycle_with_selection() {
        let mut s = DashboardState::new([Coin::Solana, Coin::Bitcoin], Window::Month);
        let req = fetch_request(s.apply(DashboardEvent::Refresh));
        assert_eq!(req.version, 1);
        assert_eq!(req.coins, vec![Coin::Bitcoin, Coin::Solana]);
        assert_eq!(req.window, Window::Month);
        assert!(s.is_loading());
    }

    #[test]
    fn completion_publishes_map() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        let req = fetch_request(s.apply(DashboardEvent::Refresh));
        let m = map(req.version, req.window, vec![(Coin::Bitcoin, series(&[1.0, 2.0]))]);
        assert_eq!(
            s.apply(completed(req.version, Ok(m))),
            Transition::Published { version: 1 }
        );
        assert_eq!(s.status(), &CycleStatus::Ready);
        assert_eq!(s.series().unwrap().latest_price(Coin::Bitcoin), Some(2.0));
    }

    #[test]
    fn failure_clears_map_and_sets_message() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        let req = fetch_request(s.apply(DashboardEvent::Refresh));
        let m = map(req.version, req.window, vec![(Coin::Bitcoin, series(&[1.0, 2.0]))]);
        s.apply(completed(req.version, Ok(m)));

        let req = fetch_request(s.apply(DashboardEvent::WindowChanged(Window::Quarter)));
        let t = s.apply(completed(req.version, Err(CoreError::Network("down".into()))));
        assert_eq!(t, Transition::Failed { version: 2 });
        assert!(s.series().is_none());
        assert_eq!(s.error_message(), Some("Network error: down"));
    }

    #[test]
    fn previous_map_stays_visible_while_loading() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        let req = fetch_request(s.apply(DashboardEvent::Refresh));
        let m = map(req.version, req.window, vec![(Coin::Bitcoin, series(&[1.0, 2.0]))]);
        s.apply(completed(req.version, Ok(m)));

        fetch_request(s.apply(DashboardEvent::WindowChanged(Window::Month)));
        assert!(s.is_loading());
        assert_eq!(s.series().unwrap().window(), Window::Week);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        let a = fetch_request(s.apply(DashboardEvent::Refresh));
        let b = fetch_request(s.apply(DashboardEvent::WindowChanged(Window::Month)));
        assert!(b.version > a.version);

        let map_b = map(b.version, b.window, vec![(Coin::Bitcoin, series(&[5.0, 6.0]))]);
        assert_eq!(
            s.apply(completed(b.version, Ok(map_b))),
            Transition::Published { version: b.version }
        );

        let map_a = map(a.version, a.window, vec![(Coin::Bitcoin, series(&[1.0, 2.0]))]);
        assert_eq!(
            s.apply(completed(a.version, Ok(map_a))),
            Transition::Discarded { version: a.version }
        );
        assert_eq!(s.series().unwrap().window(), Window::Month);
        assert_eq!(s.series().unwrap().latest_price(Coin::Bitcoin), Some(6.0));
    }

    #[test]
    fn stale_failure_does_not_clear_newer_map() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        let a = fetch_request(s.apply(DashboardEvent::Refresh));
        let b = fetch_request(s.apply(DashboardEvent::Refresh));
        let map_b = map(b.version, b.window, vec![(Coin::Bitcoin, series(&[5.0, 6.0]))]);
        s.apply(completed(b.version, Ok(map_b)));

        let t = s.apply(completed(a.version, Err(CoreError::Network("late".into()))));
        assert_eq!(t, Transition::Discarded { version: a.version });
        assert!(s.series().is_some());
        assert!(s.error_message().is_none());
    }

    #[test]
    fn duplicate_completion_is_discarded() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        let req = fetch_request(s.apply(DashboardEvent::Refresh));
        let m = map(req.version, req.window, vec![]);
        s.apply(completed(req.version, Ok(m.clone())));
        assert_eq!(
            s.apply(completed(req.version, Ok(m))),
            Transition::Discarded { version: req.version }
        );
    }

    #[test]
    fn same_selection_is_noop_after_first_cycle() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        fetch_request(s.apply(DashboardEvent::Refresh));
        assert_eq!(
            s.apply(DashboardEvent::SelectionChanged(vec![Coin::Bitcoin])),
            Transition::Unchanged
        );
        assert_eq!(s.version(), 1);
    }

    #[test]
    fn same_window_is_noop_after_first_cycle() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        fetch_request(s.apply(DashboardEvent::Refresh));
        assert_eq!(
            s.apply(DashboardEvent::WindowChanged(Window::Week)),
            Transition::Unchanged
        );
    }

    #[test]
    fn selection_dedupes_coins() {
        let mut s = DashboardState::new(Vec::<Coin>::new(), Window::Week);
        let req = fetch_request(s.apply(DashboardEvent::SelectionChanged(vec![
            Coin::Ethereum,
            Coin::Ethereum,
            Coin::Bitcoin,
        ])));
        assert_eq!(req.coins, vec![Coin::Bitcoin, Coin::Ethereum]);
    }

    #[test]
    fn empty_selection_publishes_empty_map() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        fetch_request(s.apply(DashboardEvent::Refresh));
        let t = s.apply(DashboardEvent::SelectionChanged(vec![]));
        assert_eq!(t, Transition::Published { version: 2 });
        assert!(s.series().unwrap().is_empty());
        assert_eq!(s.status(), &CycleStatus::Ready);
    }

    #[test]
    fn in_flight_cycle_superseded_by_empty_selection() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        let a = fetch_request(s.apply(DashboardEvent::Refresh));
        s.apply(DashboardEvent::SelectionChanged(vec![]));
        let m = map(a.version, a.window, vec![(Coin::Bitcoin, series(&[1.0]))]);
        assert_eq!(
            s.apply(completed(a.version, Ok(m))),
            Transition::Discarded { version: a.version }
        );
        assert!(s.series().unwrap().is_empty());
    }

    #[test]
    fn holdings_edits_do_not_start_cycles() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        assert_eq!(
            s.apply(DashboardEvent::HoldingSet {
                coin: Coin::Bitcoin,
                quantity: 2.0
            }),
            Transition::HoldingsUpdated
        );
        assert_eq!(
            s.apply(DashboardEvent::HoldingInput {
                coin: Coin::Solana,
                input: "x".into()
            }),
            Transition::HoldingsUpdated
        );
        assert_eq!(s.version(), 0);
        assert_eq!(s.holdings().get(Coin::Bitcoin), 2.0);
        assert_eq!(s.holdings().get(Coin::Solana), 0.0);
    }

    #[test]
    fn removing_absent_holding_is_noop() {
        let mut s = DashboardState::new([Coin::Bitcoin], Window::Week);
        assert_eq!(
            s.apply(DashboardEvent::HoldingRemoved(Coin::Ethereum)),
            Transition::Unchanged
        );
    }
}
