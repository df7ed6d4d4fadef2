//! Flags and the flag registry.
//!
//! A flag knows which robot carries it; robots know nothing about flags.
//! The registry owns every flag for the whole match.

use serde::{Deserialize, Serialize};

use super::constants::MIN_FLAG_SPACING_SQUARED;
use super::{FlagId, MapLocation, RobotId, Team};

/// One flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    id: FlagId,
    team: Team,
    location: MapLocation,
    start_location: MapLocation,
    spawn_location: MapLocation,
    broadcast_location: MapLocation,
    carrier: Option<RobotId>,
    dropped_rounds: u32,
    captured: bool,
}

impl Flag {
    /// A flag lying at its spawn location.
    #[must_use]
    pub const fn new(id: FlagId, team: Team, location: MapLocation) -> Self {
        Self {
            id,
            team,
            location,
            start_location: location,
            spawn_location: location,
            broadcast_location: location,
            carrier: None,
            dropped_rounds: 0,
            captured: false,
        }
    }

    /// Flag id.
    #[must_use]
    pub const fn id(&self) -> FlagId {
        self.id
    }

    /// Owning team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// True location. Follows the carrier while carried.
    #[must_use]
    pub const fn location(&self) -> MapLocation {
        self.location
    }

    /// Where the flag returns to when left dropped.
    #[must_use]
    pub const fn start_location(&self) -> MapLocation {
        self.start_location
    }

    /// Where the map originally put the flag.
    #[must_use]
    pub const fn spawn_location(&self) -> MapLocation {
        self.spawn_location
    }

    /// Approximate location advertised to the opponent.
    #[must_use]
    pub const fn broadcast_location(&self) -> MapLocation {
        self.broadcast_location
    }

    /// Robot carrying the flag.
    #[must_use]
    pub const fn carrier(&self) -> Option<RobotId> {
        self.carrier
    }

    /// Rounds since the flag was dropped away from its start.
    #[must_use]
    pub const fn dropped_rounds(&self) -> u32 {
        self.dropped_rounds
    }

    /// Whether the flag has been captured and is out of play.
    #[must_use]
    pub const fn is_captured(&self) -> bool {
        self.captured
    }

    /// Whether the flag lies on a cell and may be picked up.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.carrier.is_none() && !self.captured
    }
}

/// Owns every flag of the match, in creation order.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    flags: Vec<Flag>,
}

impl FlagRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { flags: Vec::new() }
    }

    /// Add a flag.
    pub fn insert(&mut self, flag: Flag) {
        self.flags.push(flag);
    }

    /// Every flag.
    #[must_use]
    pub fn all(&self) -> &[Flag] {
        &self.flags
    }

    /// Look up a flag.
    #[must_use]
    pub fn get(&self, id: FlagId) -> Option<&Flag> {
        self.flags.iter().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: FlagId) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|f| f.id == id)
    }

    /// The uncarried flag lying on `loc`, captured or not.
    #[must_use]
    pub fn flag_at(&self, loc: MapLocation) -> Option<&Flag> {
        self.flags
            .iter()
            .find(|f| f.carrier.is_none() && f.location == loc)
    }

    /// The flag carried by `robot`.
    #[must_use]
    pub fn carried_by(&self, robot: RobotId) -> Option<&Flag> {
        self.flags.iter().find(|f| f.carrier == Some(robot))
    }

    /// Hand the flag to `robot`.
    pub fn pick_up(&mut self, id: FlagId, robot: RobotId) {
        if let Some(flag) = self.get_mut(id) {
            flag.carrier = Some(robot);
            flag.dropped_rounds = 0;
        }
    }

    /// Put the flag down on `loc`.
    pub fn drop_at(&mut self, id: FlagId, loc: MapLocation) {
        if let Some(flag) = self.get_mut(id) {
            flag.carrier = None;
            flag.location = loc;
            flag.dropped_rounds = 0;
        }
    }

    /// Move a carried flag along with its carrier.
    pub fn follow_carrier(&mut self, robot: RobotId, loc: MapLocation) {
        if let Some(flag) = self.flags.iter_mut().find(|f| f.carrier == Some(robot)) {
            flag.location = loc;
        }
    }

    /// Retire the flag as captured at `loc`.
    pub fn capture(&mut self, id: FlagId, loc: MapLocation) {
        if let Some(flag) = self.get_mut(id) {
            flag.carrier = None;
            flag.location = loc;
            flag.captured = true;
        }
    }

    /// Replace every broadcast location using `pick`, which receives the
    /// flag's true location and returns the advertised one.
    pub fn update_broadcasts(&mut self, mut pick: impl FnMut(MapLocation) -> MapLocation) {
        for flag in &mut self.flags {
            flag.broadcast_location = pick(flag.location);
        }
    }

    /// End-of-setup confirmation for `team`.
    ///
    /// Carried flags are put down where their carriers stand. If any two of
    /// the team's flags are closer than the minimum spacing, all of them go
    /// back to their spawn locations; otherwise their current locations
    /// become their start locations. Returns whether the team was reset.
    pub fn confirm_placements(&mut self, team: Team) -> bool {
        for flag in self.flags.iter_mut().filter(|f| f.team == team) {
            flag.carrier = None;
            flag.dropped_rounds = 0;
        }
        let locations: Vec<MapLocation> = self
            .flags
            .iter()
            .filter(|f| f.team == team)
            .map(|f| f.location)
            .collect();
        let too_close = locations.iter().enumerate().any(|(i, a)| {
            locations[i + 1..]
                .iter()
                .any(|b| a.distance_squared_to(*b) < MIN_FLAG_SPACING_SQUARED)
        });
        for flag in self.flags.iter_mut().filter(|f| f.team == team) {
            if too_close {
                flag.location = flag.spawn_location;
            }
            flag.start_location = flag.location;
        }
        too_close
    }

    /// Age dropped flags by one round, returning flags sent home.
    ///
    /// A flag is dropped when it is neither carried, captured, nor at its
    /// start. `delay(team)` gives the reset delay for flags of `team`.
    pub fn age_dropped(&mut self, delay: impl Fn(Team) -> u32) -> Vec<FlagId> {
        let mut reset = Vec::new();
        for flag in &mut self.flags {
            if flag.carrier.is_some() || flag.captured || flag.location == flag.start_location {
                continue;
            }
            if flag.dropped_rounds >= delay(flag.team) {
                flag.location = flag.start_location;
                flag.dropped_rounds = 0;
                reset.push(flag.id);
            } else {
                flag.dropped_rounds += 1;
            }
        }
        reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_registry() -> FlagRegistry {
        let mut flags = FlagRegistry::new();
        flags.insert(Flag::new(FlagId(1), Team::A, MapLocation::new(2, 2)));
        flags.insert(Flag::new(FlagId(2), Team::A, MapLocation::new(2, 12)));
        flags.insert(Flag::new(FlagId(3), Team::B, MapLocation::new(17, 17)));
        flags
    }

    #[test]
    fn test_pickup_removes_from_cell() {
        let mut flags = create_test_registry();
        let loc = MapLocation::new(17, 17);
        assert_eq!(flags.flag_at(loc).map(Flag::id), Some(FlagId(3)));
        flags.pick_up(FlagId(3), RobotId(500));
        assert!(flags.flag_at(loc).is_none());
        assert_eq!(flags.carried_by(RobotId(500)).map(Flag::id), Some(FlagId(3)));
    }

    #[test]
    fn test_flag_follows_carrier_then_drops() {
        let mut flags = create_test_registry();
        flags.pick_up(FlagId(1), RobotId(7));
        flags.follow_carrier(RobotId(7), MapLocation::new(3, 3));
        assert_eq!(flags.get(FlagId(1)).unwrap().location(), MapLocation::new(3, 3));
        flags.drop_at(FlagId(1), MapLocation::new(3, 3));
        assert!(flags.carried_by(RobotId(7)).is_none());
        assert_eq!(flags.flag_at(MapLocation::new(3, 3)).map(Flag::id), Some(FlagId(1)));
    }

    #[test]
    fn test_confirm_keeps_spaced_placement() {
        let mut flags = create_test_registry();
        flags.pick_up(FlagId(1), RobotId(7));
        flags.follow_carrier(RobotId(7), MapLocation::new(5, 2));
        assert!(!flags.confirm_placements(Team::A));
        let flag = flags.get(FlagId(1)).unwrap();
        assert_eq!(flag.carrier(), None);
        assert_eq!(flag.start_location(), MapLocation::new(5, 2));
    }

    #[test]
    fn test_confirm_resets_whole_team_when_too_close() {
        let mut flags = create_test_registry();
        flags.drop_at(FlagId(1), MapLocation::new(2, 9));
        flags.drop_at(FlagId(2), MapLocation::new(2, 11));
        assert!(flags.confirm_placements(Team::A));
        assert_eq!(flags.get(FlagId(1)).unwrap().location(), MapLocation::new(2, 2));
        assert_eq!(flags.get(FlagId(2)).unwrap().location(), MapLocation::new(2, 12));
        assert_eq!(flags.get(FlagId(3)).unwrap().location(), MapLocation::new(17, 17));
    }

    #[test]
    fn test_dropped_flag_returns_after_delay() {
        let mut flags = create_test_registry();
        flags.drop_at(FlagId(3), MapLocation::new(10, 10));
        for _ in 0..4 {
            assert!(flags.age_dropped(|_| 4).is_empty());
        }
        assert_eq!(flags.age_dropped(|_| 4), vec![FlagId(3)]);
        assert_eq!(flags.get(FlagId(3)).unwrap().location(), MapLocation::new(17, 17));
    }

    #[test]
    fn test_captured_flag_never_resets() {
        let mut flags = create_test_registry();
        flags.capture(FlagId(3), MapLocation::new(2, 3));
        for _ in 0..10 {
            assert!(flags.age_dropped(|_| 0).is_empty());
        }
        assert!(!flags.get(FlagId(3)).unwrap().is_available());
    }
}
