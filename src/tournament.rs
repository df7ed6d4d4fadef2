//! Match runner for Skirmish.
//!
//! Provides a pure function interface: `(map, config, strategies) -> MatchResult`
//!
//! The runner handles:
//! - Configuration checks before a match starts
//! - Driving a [`GameWorld`] to its end against an [`ActionProvider`]
//! - Parallel seed series with rayon, folded into [`SeriesStats`]
//! - Deterministic demo maps ([`generate_map`])

// Series statistics divide counts into rates
#![allow(clippy::cast_precision_loss)]

mod mapgen;

pub use mapgen::generate_map;

use std::collections::BTreeMap;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::MatchConfig;
use crate::error::{ConfigError, EngineError, MapError, RecordError};
use crate::provider::{ActionProvider, SampleStrategy, StrategyProvider};
use crate::recorder::MatchLog;
use crate::world::{DominationFactor, GameWorld, MapSnapshot, MatchOutcome, Team};

/// Error type for runner operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// The configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The map is unusable.
    #[error("map error: {0}")]
    Map(#[from] MapError),
    /// The engine abandoned the match.
    #[error("engine fault: {0}")]
    Engine(#[from] EngineError),
    /// A match log could not be written or read.
    #[error("record error: {0}")]
    Record(#[from] RecordError),
    /// The world stopped without deciding a winner.
    #[error("match on {0} stopped without a winner")]
    Undecided(String),
}

/// Final result of a match.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The seed the match ran with.
    pub seed: u64,
    /// Winner and reason.
    pub outcome: MatchOutcome,
    /// Rounds played.
    pub rounds: u32,
    /// Enemy flags captured per team.
    pub flags_captured: [u32; 2],
    /// The full match log.
    pub log: MatchLog,
}

/// Run a match on `map` to completion.
///
/// # Determinism
///
/// Given the same map, configuration and provider behaviour, this function
/// always produces the same `MatchResult`, log included.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration fails validation
/// - The map is structurally broken
/// - The engine abandons a round
pub fn run_match(
    map: &MapSnapshot,
    config: &MatchConfig,
    provider: &mut dyn ActionProvider,
) -> Result<MatchResult, TournamentError> {
    config.validate()?;
    let mut world = GameWorld::new(map, *config)?;
    info!("starting match on {} with seed {}", world.name(), world.seed());
    let outcome = world
        .run_to_end(provider)?
        .ok_or_else(|| TournamentError::Undecided(world.name().to_string()))?;
    let seed = world.seed();
    let rounds = world.round();
    let flags_captured = Team::ALL.map(|team| world.ledger().flags_captured(team));
    Ok(MatchResult {
        seed,
        outcome,
        rounds,
        flags_captured,
        log: world.into_log(),
    })
}

/// Run a match between two sample strategies.
///
/// # Errors
///
/// Same as [`run_match`].
pub fn run_sample_match(
    map: &MapSnapshot,
    config: &MatchConfig,
    team_a: SampleStrategy,
    team_b: SampleStrategy,
) -> Result<MatchResult, TournamentError> {
    let mut provider = StrategyProvider::with_samples(team_a, team_b, config.instruction_budget);
    run_match(map, config, &mut provider)
}

/// Aggregate results of a series of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeriesStats {
    /// Matches that reached a result.
    pub matches_played: u64,
    /// Matches abandoned by an engine fault.
    pub matches_failed: u64,
    /// Wins per team.
    pub wins: [u64; 2],
    /// How the matches were decided.
    pub reasons: BTreeMap<DominationFactor, u64>,
    /// Flags captured per team over the series.
    pub flags_captured: [u64; 2],
    /// Total rounds played.
    pub total_rounds: u64,
}

impl SeriesStats {
    /// Add one match result.
    pub fn add_result(&mut self, result: &MatchResult) {
        self.matches_played += 1;
        self.wins[result.outcome.winner.index()] += 1;
        *self.reasons.entry(result.outcome.reason).or_default() += 1;
        for team in Team::ALL {
            self.flags_captured[team.index()] += u64::from(result.flags_captured[team.index()]);
        }
        self.total_rounds += u64::from(result.rounds);
    }

    /// Count a match that did not finish.
    pub const fn add_failure(&mut self) {
        self.matches_failed += 1;
    }

    /// Merge another accumulator into this one.
    pub fn merge(&mut self, other: &Self) {
        self.matches_played += other.matches_played;
        self.matches_failed += other.matches_failed;
        for team in Team::ALL {
            self.wins[team.index()] += other.wins[team.index()];
            self.flags_captured[team.index()] += other.flags_captured[team.index()];
        }
        for (reason, count) in &other.reasons {
            *self.reasons.entry(*reason).or_default() += count;
        }
        self.total_rounds += other.total_rounds;
    }

    /// Fraction of finished matches won by `team`.
    #[must_use]
    pub fn win_rate(&self, team: Team) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        self.wins[team.index()] as f64 / self.matches_played as f64
    }

    /// Mean match length in rounds.
    #[must_use]
    pub fn average_rounds(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / self.matches_played as f64
    }
}

/// Run `count` matches on `map` with seeds `base_seed, base_seed + 1, ...`.
///
/// Matches run in parallel; each thread folds into its own [`SeriesStats`]
/// and the accumulators are merged at the end, so the result does not
/// depend on scheduling. `on_match` is called once per finished or failed
/// match, from whichever thread ran it.
///
/// # Errors
///
/// Returns an error if the configuration fails validation. Engine faults in
/// individual matches are counted, not returned.
pub fn run_series(
    map: &MapSnapshot,
    config: &MatchConfig,
    strategies: [SampleStrategy; 2],
    base_seed: u64,
    count: u64,
    on_match: &(dyn Fn() + Sync),
) -> Result<SeriesStats, TournamentError> {
    config.validate()?;
    map.check_structure()?;
    let [team_a, team_b] = strategies;
    let stats = (0..count)
        .into_par_iter()
        .fold(SeriesStats::default, |mut local, i| {
            let config = MatchConfig {
                seed: Some(base_seed.wrapping_add(i)),
                ..*config
            };
            match run_sample_match(map, &config, team_a, team_b) {
                Ok(result) => local.add_result(&result),
                Err(err) => {
                    warn!("match with seed {} failed: {err}", base_seed.wrapping_add(i));
                    local.add_failure();
                }
            }
            on_match();
            local
        })
        .reduce(SeriesStats::default, |mut a, b| {
            a.merge(&b);
            a
        });
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MapBuilder, MapLocation, RobotType, Symmetry};

    fn create_test_map() -> MapSnapshot {
        let mut builder = MapBuilder::new("runner", 20, 20, Symmetry::Rotational)
            .rounds(40)
            .roster(vec![RobotType::Duck; 3]);
        builder
            .spawn_zone(Team::A, MapLocation::new(2, 2))
            .spawn_zone(Team::B, MapLocation::new(17, 17));
        builder.build()
    }

    fn create_test_config() -> MatchConfig {
        MatchConfig {
            setup_rounds: 10,
            ..MatchConfig::default()
        }
    }

    #[test]
    fn test_run_match_reaches_round_limit() {
        let result = run_sample_match(
            &create_test_map(),
            &create_test_config(),
            SampleStrategy::Idle,
            SampleStrategy::Idle,
        )
        .unwrap();
        assert_eq!(result.rounds, 40);
        assert_eq!(result.log.rounds.len(), 40);
        assert_eq!(result.log.footer.unwrap().winner, result.outcome.winner);
        assert_eq!(result.flags_captured, [0, 0]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = MatchConfig {
            max_rounds: Some(5),
            ..create_test_config()
        };
        let err = run_sample_match(&create_test_map(), &config, SampleStrategy::Idle, SampleStrategy::Idle)
            .unwrap_err();
        assert!(matches!(err, TournamentError::Config(_)));
    }

    #[test]
    fn test_series_counts_every_match() {
        let stats = run_series(
            &create_test_map(),
            &create_test_config(),
            [SampleStrategy::Wanderer, SampleStrategy::Idle],
            100,
            6,
            &|| {},
        )
        .unwrap();
        assert_eq!(stats.matches_played + stats.matches_failed, 6);
        assert_eq!(stats.wins[0] + stats.wins[1], stats.matches_played);
        assert_eq!(stats.reasons.values().sum::<u64>(), stats.matches_played);
        assert!((stats.win_rate(Team::A) + stats.win_rate(Team::B) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_adds_up() {
        let mut a = SeriesStats {
            matches_played: 3,
            wins: [2, 1],
            reasons: BTreeMap::from([(DominationFactor::MoreBaseResource, 3)]),
            total_rounds: 300,
            ..SeriesStats::default()
        };
        let b = SeriesStats {
            matches_played: 1,
            matches_failed: 1,
            wins: [0, 1],
            reasons: BTreeMap::from([(DominationFactor::MoreBaseResource, 1)]),
            total_rounds: 100,
            ..SeriesStats::default()
        };
        a.merge(&b);
        assert_eq!(a.wins, [2, 2]);
        assert_eq!(a.matches_failed, 1);
        assert_eq!(a.reasons[&DominationFactor::MoreBaseResource], 4);
        assert!((a.average_rounds() - 100.0).abs() < f64::EPSILON);
    }
}
