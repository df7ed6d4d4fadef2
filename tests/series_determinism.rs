//! Series runs must not depend on thread scheduling.
//!
//! Run with: cargo test --release series_determinism

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicU64, Ordering};

use skirmish::config::MatchConfig;
use skirmish::provider::SampleStrategy;
use skirmish::tournament::{generate_map, run_series, TournamentError};
use skirmish::world::Team;

fn series_config() -> MatchConfig {
    MatchConfig {
        max_rounds: Some(150),
        setup_rounds: 40,
        ..MatchConfig::default()
    }
}

#[test]
fn test_series_is_reproducible() {
    let map = generate_map(21, 30, 30, 150).unwrap();
    let strategies = [SampleStrategy::Wanderer, SampleStrategy::Wanderer];
    let first = run_series(&map, &series_config(), strategies, 100, 12, &|| {}).unwrap();
    let second = run_series(&map, &series_config(), strategies, 100, 12, &|| {}).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.matches_played + first.matches_failed, 12);
}

#[test]
fn test_series_reports_every_match() {
    let map = generate_map(2, 24, 24, 150).unwrap();
    let finished = AtomicU64::new(0);
    let stats = run_series(
        &map,
        &series_config(),
        [SampleStrategy::Wanderer, SampleStrategy::Idle],
        7,
        9,
        &|| {
            finished.fetch_add(1, Ordering::Relaxed);
        },
    )
    .unwrap();
    assert_eq!(finished.load(Ordering::Relaxed), 9);
    assert_eq!(stats.wins[Team::A.index()] + stats.wins[Team::B.index()], stats.matches_played);
    assert_eq!(stats.reasons.values().sum::<u64>(), stats.matches_played);
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let map = generate_map(2, 24, 24, 150).unwrap();
    let config = MatchConfig {
        instruction_budget: 0,
        ..series_config()
    };
    let err = run_series(&map, &config, [SampleStrategy::Idle; 2], 0, 4, &|| {}).unwrap_err();
    assert!(matches!(err, TournamentError::Config(_)));
}
