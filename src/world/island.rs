//! Islands and the anchors planted on them.

use serde::{Deserialize, Serialize};

use super::constants::ISLAND_SUPERMAJORITY_PERCENT;
use super::{IslandId, MapLocation, Team};

/// Kinds of anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnchorType {
    /// Claims an island.
    Standard,
    /// Claims an island and speeds up allied cooldowns around it.
    Accelerating,
}

impl AnchorType {
    /// Both anchor kinds in index order.
    pub const ALL: [AnchorType; 2] = [AnchorType::Standard, AnchorType::Accelerating];

    /// Index into per-anchor arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            AnchorType::Standard => 0,
            AnchorType::Accelerating => 1,
        }
    }

    /// Build cost indexed by resource.
    #[must_use]
    pub const fn build_cost(self) -> [i32; 3] {
        match self {
            AnchorType::Standard => [80, 80, 0],
            AnchorType::Accelerating => [0, 0, 300],
        }
    }

    /// Full value of the island's remaining-turns counter.
    #[must_use]
    pub const fn total_turns(self) -> u32 {
        match self {
            AnchorType::Standard => 250,
            AnchorType::Accelerating => 750,
        }
    }

    /// Squared radius around each island cell that the anchor accelerates.
    #[must_use]
    pub const fn acceleration_radius_squared(self) -> Option<i32> {
        match self {
            AnchorType::Standard => None,
            AnchorType::Accelerating => Some(4),
        }
    }
}

/// Cooldown multiplier change per accelerating anchor covering a cell.
pub const ANCHOR_ACCELERATION: f64 = -0.15;

/// What happened to an island during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IslandTick {
    /// Nobody holds it, or neither side has a supermajority.
    Unchanged,
    /// The owner holds a supermajority; counter back to full.
    Refreshed,
    /// The opponent holds a supermajority; counter went down by one.
    Decayed,
    /// The counter reached zero; the island is unclaimed again.
    Lost {
        /// Previous owner.
        owner: Team,
        /// Anchor that was removed.
        anchor: AnchorType,
    },
}

/// A fixed set of cells that a team can claim with an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Island {
    id: IslandId,
    cells: Vec<MapLocation>,
    owner: Option<Team>,
    anchor: Option<AnchorType>,
    turns_left: u32,
}

impl Island {
    /// An unclaimed island.
    #[must_use]
    pub const fn new(id: IslandId, cells: Vec<MapLocation>) -> Self {
        Self {
            id,
            cells,
            owner: None,
            anchor: None,
            turns_left: 0,
        }
    }

    /// Island id.
    #[must_use]
    pub const fn id(&self) -> IslandId {
        self.id
    }

    /// Member cells.
    #[must_use]
    pub fn cells(&self) -> &[MapLocation] {
        &self.cells
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Option<Team> {
        self.owner
    }

    /// Planted anchor.
    #[must_use]
    pub const fn anchor(&self) -> Option<AnchorType> {
        self.anchor
    }

    /// Turns before the anchor is forcibly removed, if contested throughout.
    #[must_use]
    pub const fn turns_left(&self) -> u32 {
        self.turns_left
    }

    /// Whether `team` may plant an anchor here.
    #[must_use]
    pub fn can_place_anchor(&self, team: Team) -> bool {
        self.owner.is_none_or(|owner| owner == team)
    }

    /// Plant `anchor` for `team`, returning the anchor it replaces.
    ///
    /// Callers check [`Island::can_place_anchor`] first; an opposing anchor
    /// is left in place and `None` is returned.
    pub fn place_anchor(&mut self, team: Team, anchor: AnchorType) -> Option<AnchorType> {
        if !self.can_place_anchor(team) {
            return None;
        }
        let previous = self.anchor.replace(anchor);
        self.owner = Some(team);
        self.turns_left = anchor.total_turns();
        previous
    }

    /// Advance one round given how many cells each team occupies.
    pub fn advance(&mut self, occupied: [usize; 2]) -> IslandTick {
        let (Some(owner), Some(anchor)) = (self.owner, self.anchor) else {
            return IslandTick::Unchanged;
        };
        if self.is_supermajority(occupied[owner.index()]) {
            self.turns_left = anchor.total_turns();
            return IslandTick::Refreshed;
        }
        if !self.is_supermajority(occupied[owner.opponent().index()]) {
            return IslandTick::Unchanged;
        }
        self.turns_left = self.turns_left.saturating_sub(1);
        if self.turns_left > 0 {
            return IslandTick::Decayed;
        }
        self.owner = None;
        self.anchor = None;
        IslandTick::Lost { owner, anchor }
    }

    fn is_supermajority(&self, count: usize) -> bool {
        !self.cells.is_empty() && count * 100 >= self.cells.len() * ISLAND_SUPERMAJORITY_PERCENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_island() -> Island {
        let cells = (0..4).map(|x| MapLocation::new(x, 0)).collect();
        Island::new(IslandId(1), cells)
    }

    #[test]
    fn test_unclaimed_island_ignores_occupancy() {
        let mut island = create_test_island();
        assert_eq!(island.advance([4, 0]), IslandTick::Unchanged);
        assert_eq!(island.owner(), None);
    }

    #[test]
    fn test_place_anchor_rejects_opponent() {
        let mut island = create_test_island();
        assert_eq!(island.place_anchor(Team::A, AnchorType::Standard), None);
        assert!(!island.can_place_anchor(Team::B));
        assert_eq!(island.place_anchor(Team::B, AnchorType::Standard), None);
        assert_eq!(island.owner(), Some(Team::A));
        assert_eq!(
            island.place_anchor(Team::A, AnchorType::Accelerating),
            Some(AnchorType::Standard)
        );
    }

    #[test]
    fn test_owner_supermajority_refreshes() {
        let mut island = create_test_island();
        island.place_anchor(Team::A, AnchorType::Standard);
        island.advance([0, 3]);
        assert_eq!(island.turns_left(), 249);
        assert_eq!(island.advance([3, 0]), IslandTick::Refreshed);
        assert_eq!(island.turns_left(), 250);
    }

    #[test]
    fn test_minority_changes_nothing() {
        let mut island = create_test_island();
        island.place_anchor(Team::A, AnchorType::Standard);
        assert_eq!(island.advance([1, 2]), IslandTick::Unchanged);
        assert_eq!(island.turns_left(), 250);
    }

    #[test]
    fn test_decay_to_zero_clears() {
        let mut island = create_test_island();
        island.place_anchor(Team::B, AnchorType::Standard);
        for _ in 0..249 {
            assert_eq!(island.advance([4, 0]), IslandTick::Decayed);
        }
        assert_eq!(
            island.advance([4, 0]),
            IslandTick::Lost {
                owner: Team::B,
                anchor: AnchorType::Standard
            }
        );
        assert_eq!(island.owner(), None);
        assert_eq!(island.anchor(), None);
        assert!(island.can_place_anchor(Team::A));
    }
}
