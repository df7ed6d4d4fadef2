//! Output formatting utilities for CLI.

// Rates and averages are printed as floats
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;
use skirmish::tournament::{MatchResult, SeriesStats};
use skirmish::world::{DominationFactor, Team};
use std::fmt::Write;

/// JSON-serializable match result.
#[derive(Debug, Serialize)]
pub(super) struct JsonMatchResult {
    /// Seed the match ran with.
    pub(super) seed: u64,
    /// Winning team.
    pub(super) winner: Team,
    /// Strategy name of the winner.
    pub(super) winner_strategy: String,
    /// Why it won.
    pub(super) reason: DominationFactor,
    /// Rounds played.
    pub(super) rounds: u32,
    /// Enemy flags captured per team.
    pub(super) flags_captured: [u32; 2],
}

impl JsonMatchResult {
    /// Create from a `MatchResult`.
    pub(super) fn from_match_result(result: &MatchResult, names: &[String; 2]) -> Self {
        Self {
            seed: result.seed,
            winner: result.outcome.winner,
            winner_strategy: names[result.outcome.winner.index()].clone(),
            reason: result.outcome.reason,
            rounds: result.rounds,
            flags_captured: result.flags_captured,
        }
    }
}

/// Format a match result as human-readable text.
pub(super) fn format_text(result: &MatchResult, names: &[String; 2]) -> String {
    let mut output = String::new();
    let winner = result.outcome.winner;

    let _ = writeln!(output, "Match Result (seed: {})", result.seed);
    let _ = writeln!(
        output,
        "  Winner: Team {winner:?} ({}) by {}",
        names[winner.index()],
        result.outcome.reason
    );
    let _ = writeln!(output, "  Rounds: {}\n", result.rounds);
    for team in Team::ALL {
        let _ = writeln!(
            output,
            "  Team {team:?} ({}): {} flags captured",
            names[team.index()],
            result.flags_captured[team.index()]
        );
    }

    output
}

/// JSON-serializable series result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSeriesResult<'a> {
    /// Strategy names per team.
    teams: &'a [String; 2],
    /// Win rate per team.
    win_rates: [f64; 2],
    /// Mean match length.
    avg_rounds: f64,
    /// Raw counters.
    stats: &'a SeriesStats,
}

impl<'a> JsonSeriesResult<'a> {
    /// Create from stats and team names.
    pub(super) fn from_stats(stats: &'a SeriesStats, names: &'a [String; 2]) -> Self {
        Self {
            teams: names,
            win_rates: Team::ALL.map(|team| stats.win_rate(team)),
            avg_rounds: stats.average_rounds(),
            stats,
        }
    }
}

/// Format series stats as human-readable text.
pub(super) fn format_series_text(stats: &SeriesStats, names: &[String; 2]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Series Results ({} matches)", stats.matches_played);
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for team in Team::ALL {
        let _ = writeln!(
            output,
            "  Team {team:?} ({}): {:.1}% ({} wins, {} flags captured)",
            names[team.index()],
            stats.win_rate(team) * 100.0,
            stats.wins[team.index()],
            stats.flags_captured[team.index()]
        );
    }

    output.push_str("\nDecided By:\n");
    for (reason, count) in &stats.reasons {
        let _ = writeln!(output, "  {reason}: {count}");
    }

    if stats.matches_failed > 0 {
        let _ = writeln!(output, "\nFailed matches: {}", stats.matches_failed);
    }
    let _ = writeln!(output, "\nAverage Match Length: {:.0} rounds", stats.average_rounds());

    output
}
