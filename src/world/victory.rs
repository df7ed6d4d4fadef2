//! Winner determination.
//!
//! Sky-island counts, anchor counts and per-resource net worth are not
//! part of the cascade.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Team;

/// Why a team won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DominationFactor {
    /// Captured every enemy flag.
    Capture,
    /// More flags captured at the round limit.
    MoreFlagCaptures,
    /// More units at the strongest tier.
    MoreTierThreeUnits,
    /// More units at the second tier.
    MoreTierTwoUnits,
    /// Larger base resource reserve.
    MoreBaseResource,
    /// More enemy flags picked up.
    MoreFlagsPicked,
    /// Coin flip.
    WonByDubiousReasons,
    /// The opponent resigned.
    Resignation,
}

impl fmt::Display for DominationFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DominationFactor::Capture => "captured all flags",
            DominationFactor::MoreFlagCaptures => "more flags captured",
            DominationFactor::MoreTierThreeUnits => "more tier-three units",
            DominationFactor::MoreTierTwoUnits => "more tier-two units",
            DominationFactor::MoreBaseResource => "more base resource",
            DominationFactor::MoreFlagsPicked => "more flags picked up",
            DominationFactor::WonByDubiousReasons => "coin flip",
            DominationFactor::Resignation => "opponent resigned",
        };
        f.write_str(text)
    }
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Winning team.
    pub winner: Team,
    /// Reason.
    pub reason: DominationFactor,
}

/// A team's numbers for the tiebreak cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamStanding {
    /// Enemy flags captured.
    pub flags_captured: u32,
    /// Own units with tier three or higher.
    pub tier_three: u32,
    /// Own units at exactly tier two.
    pub tier_two: u32,
    /// Base resource balance.
    pub base_resource: i32,
    /// Enemy flags picked up.
    pub flags_picked_up: u32,
}

/// Run the cascade, short-circuiting on the first strict difference.
/// `coin` is only called when every step ties.
#[must_use]
pub fn decide_winner(standings: [TeamStanding; 2], coin: impl FnOnce() -> Team) -> MatchOutcome {
    let [a, b] = standings;
    let steps = [
        (a.flags_captured.cmp(&b.flags_captured), DominationFactor::MoreFlagCaptures),
        (a.tier_three.cmp(&b.tier_three), DominationFactor::MoreTierThreeUnits),
        (a.tier_two.cmp(&b.tier_two), DominationFactor::MoreTierTwoUnits),
        (a.base_resource.cmp(&b.base_resource), DominationFactor::MoreBaseResource),
        (a.flags_picked_up.cmp(&b.flags_picked_up), DominationFactor::MoreFlagsPicked),
    ];
    for (ordering, reason) in steps {
        match ordering {
            Ordering::Greater => return MatchOutcome { winner: Team::A, reason },
            Ordering::Less => return MatchOutcome { winner: Team::B, reason },
            Ordering::Equal => {}
        }
    }
    MatchOutcome {
        winner: coin(),
        reason: DominationFactor::WonByDubiousReasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(flags: u32, three: u32, two: u32, base: i32, picked: u32) -> TeamStanding {
        TeamStanding {
            flags_captured: flags,
            tier_three: three,
            tier_two: two,
            base_resource: base,
            flags_picked_up: picked,
        }
    }

    #[test]
    fn test_flags_dominate() {
        let out = decide_winner([standing(0, 9, 9, 999, 9), standing(1, 0, 0, 0, 0)], || Team::A);
        assert_eq!(out, MatchOutcome { winner: Team::B, reason: DominationFactor::MoreFlagCaptures });
    }

    #[test]
    fn test_resource_tiebreak_after_equal_tiers() {
        let out = decide_winner([standing(1, 2, 3, 150, 0), standing(1, 2, 3, 100, 5)], || Team::B);
        assert_eq!(out, MatchOutcome { winner: Team::A, reason: DominationFactor::MoreBaseResource });
    }

    #[test]
    fn test_tier_two_breaks_before_resource() {
        let out = decide_winner([standing(0, 0, 1, 0, 0), standing(0, 0, 2, 500, 0)], || Team::A);
        assert_eq!(out.reason, DominationFactor::MoreTierTwoUnits);
        assert_eq!(out.winner, Team::B);
    }

    #[test]
    fn test_full_tie_uses_coin() {
        let mut called = false;
        let out = decide_winner([TeamStanding::default(); 2], || {
            called = true;
            Team::B
        });
        assert!(called);
        assert_eq!(out, MatchOutcome { winner: Team::B, reason: DominationFactor::WonByDubiousReasons });
    }
}
