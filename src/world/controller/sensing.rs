//! Read-only queries.

use std::collections::BTreeSet;

use crate::error::{ActionErrorKind, ActionResult, GameActionError};

use super::super::{
    AnchorType, Direction, FlagId, IslandId, MapLocation, ResourceType, Robot, RobotId, RobotType, Team,
    TrapType,
};
use super::RobotController;

/// What a robot can see of another robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotInfo {
    /// Id.
    pub id: RobotId,
    /// Team.
    pub team: Team,
    /// Unit type.
    pub kind: RobotType,
    /// Cell.
    pub location: MapLocation,
    /// Health.
    pub health: i32,
    /// Highest skill level.
    pub tier: usize,
    /// Whether it carries a flag.
    pub has_flag: bool,
}

/// What a robot can see of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapInfo {
    /// Cell.
    pub location: MapLocation,
    /// Whether a robot could stand here now.
    pub passable: bool,
    /// Wall.
    pub wall: bool,
    /// Water.
    pub water: bool,
    /// Dam.
    pub dam: bool,
    /// Spawn-zone owner.
    pub spawn_zone: Option<Team>,
    /// Bread lying here.
    pub bread: i32,
    /// Trap on the cell, reported only for the observer's own traps.
    pub trap: Option<TrapType>,
    /// Flow direction.
    pub current: Direction,
    /// Island membership.
    pub island: Option<IslandId>,
    /// Cooldown multiplier for the observer's team.
    pub cooldown_multiplier: f64,
}

/// A flag as seen on the map or in a carrier's hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagInfo {
    /// Id.
    pub id: FlagId,
    /// Owning team.
    pub team: Team,
    /// Where it is.
    pub location: MapLocation,
    /// Whether a robot carries it.
    pub carried: bool,
}

/// A well as seen by a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellInfo {
    /// Cell.
    pub location: MapLocation,
    /// Resource produced.
    pub kind: ResourceType,
    /// Upgraded extraction tier reached.
    pub upgraded: bool,
    /// Units collectable per action.
    pub rate: i32,
}

/// Ownership of an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IslandInfo {
    /// Id.
    pub id: IslandId,
    /// Owner.
    pub owner: Option<Team>,
    /// Planted anchor.
    pub anchor: Option<AnchorType>,
    /// Turns left before an opponent occupation removes the anchor.
    pub turns_left: u32,
}

fn cant_sense(message: impl Into<String>) -> GameActionError {
    GameActionError::new(ActionErrorKind::CantSenseThat, message)
}

impl RobotController<'_> {
    fn vision(&self) -> ActionResult<(MapLocation, i32)> {
        let (robot, loc) = self.spawned()?;
        Ok((loc, robot.kind().stats().vision_radius_squared))
    }

    /// Resolve a caller-supplied sensing radius. `None` means full vision;
    /// anything larger than vision is clipped to it.
    fn sense_radius(&self, requested: Option<i32>) -> ActionResult<(MapLocation, i32)> {
        let (center, vision) = self.vision()?;
        match requested {
            None => Ok((center, vision)),
            Some(r) if r < 0 => Err(GameActionError::new(
                ActionErrorKind::CantDoThat,
                format!("sensing radius {r} is negative"),
            )),
            Some(r) => Ok((center, r.min(vision))),
        }
    }

    fn assert_can_sense_location(&self, loc: MapLocation) -> ActionResult<()> {
        let (center, vision) = self.vision()?;
        if !center.is_within_distance_squared(loc, vision) {
            return Err(cant_sense(format!("{loc} is outside vision")));
        }
        if !self.world.grid.on_the_map(loc) {
            return Err(cant_sense(format!("{loc} is off the map")));
        }
        Ok(())
    }

    /// Whether `loc` is on the map and within vision.
    #[must_use]
    pub fn can_sense_location(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_sense_location(loc).is_ok()
    }

    /// The cell one step in `dir`.
    #[must_use]
    pub fn adjacent_location(&self, dir: Direction) -> Option<MapLocation> {
        self.location().map(|loc| loc.add(dir))
    }

    fn info(&self, robot: &Robot, location: MapLocation) -> RobotInfo {
        RobotInfo {
            id: robot.id(),
            team: robot.team(),
            kind: robot.kind(),
            location,
            health: robot.health(),
            tier: robot.tier(),
            has_flag: self.world.flags.carried_by(robot.id()).is_some(),
        }
    }

    /// Whether a robot stands on `loc`.
    ///
    /// # Errors
    ///
    /// `CantSenseThat` when `loc` is not sensable.
    pub fn is_location_occupied(&self, loc: MapLocation) -> ActionResult<bool> {
        self.tick();
        self.assert_can_sense_location(loc)?;
        Ok(self.world.registry.is_occupied(loc))
    }

    /// The robot on `loc`, if any.
    ///
    /// # Errors
    ///
    /// `CantSenseThat` when `loc` is not sensable.
    pub fn sense_robot_at(&self, loc: MapLocation) -> ActionResult<Option<RobotInfo>> {
        self.tick();
        self.assert_can_sense_location(loc)?;
        Ok(self
            .world
            .registry
            .robot_at(loc)
            .and_then(|id| self.world.registry.get(id))
            .map(|robot| self.info(robot, loc)))
    }

    /// Whether robot `id` exists and stands within vision.
    #[must_use]
    pub fn can_sense_robot(&self, id: RobotId) -> bool {
        self.sense_robot(id).is_ok()
    }

    /// Look at robot `id`.
    ///
    /// # Errors
    ///
    /// `CantSenseThat` when the robot is unknown, despawned or out of vision.
    pub fn sense_robot(&self, id: RobotId) -> ActionResult<RobotInfo> {
        self.tick();
        let robot = self
            .world
            .registry
            .get(id)
            .ok_or_else(|| cant_sense(format!("robot {id} does not exist")))?;
        let loc = robot
            .location()
            .ok_or_else(|| cant_sense(format!("robot {id} is not on the map")))?;
        self.assert_can_sense_location(loc)?;
        Ok(self.info(robot, loc))
    }

    /// Robots within `radius_squared` (default: vision), excluding this one,
    /// optionally restricted to `team`. Cells are scanned x-major.
    ///
    /// # Errors
    ///
    /// `CantDoThat` for despawned robots and negative radii.
    pub fn sense_nearby_robots(&self, radius_squared: Option<i32>, team: Option<Team>) -> ActionResult<Vec<RobotInfo>> {
        self.tick();
        let (center, radius) = self.sense_radius(radius_squared)?;
        let layout = self.world.grid.layout();
        Ok(layout
            .locations_within(center, radius)
            .into_iter()
            .filter_map(|loc| {
                let id = self.world.registry.robot_at(loc)?;
                let robot = self.world.registry.get(id)?;
                (id != self.id && team.is_none_or(|t| t == robot.team())).then(|| self.info(robot, loc))
            })
            .collect())
    }

    /// Terrain and effects on `loc`.
    ///
    /// # Errors
    ///
    /// `CantSenseThat` when `loc` is not sensable.
    pub fn sense_map_info(&self, loc: MapLocation) -> ActionResult<MapInfo> {
        self.tick();
        self.assert_can_sense_location(loc)?;
        let grid = &self.world.grid;
        let trap = grid
            .trap(loc)
            .and_then(|id| self.world.traps.get(id))
            .filter(|trap| trap.team() == self.team || trap.kind().stats().visible_to_opponent)
            .map(|trap| trap.kind());
        Ok(MapInfo {
            location: loc,
            passable: grid.is_passable(loc, self.world.is_setup_phase()),
            wall: grid.is_wall(loc),
            water: grid.is_water(loc),
            dam: grid.is_dam(loc),
            spawn_zone: grid.spawn_zone(loc),
            bread: grid.bread(loc),
            trap,
            current: grid.current(loc),
            island: grid.island(loc),
            cooldown_multiplier: grid.cooldown_multiplier(loc, self.team),
        })
    }

    /// [`RobotController::sense_map_info`] for every cell within `radius_squared`.
    ///
    /// # Errors
    ///
    /// `CantDoThat` for despawned robots and negative radii.
    pub fn sense_nearby_map_infos(&self, radius_squared: Option<i32>) -> ActionResult<Vec<MapInfo>> {
        let (center, radius) = self.sense_radius(radius_squared)?;
        self.world
            .grid
            .layout()
            .locations_within(center, radius)
            .into_iter()
            .map(|loc| self.sense_map_info(loc))
            .collect()
    }

    /// Whether a robot could step onto `loc` now.
    ///
    /// # Errors
    ///
    /// `CantSenseThat` when `loc` is not sensable.
    pub fn sense_passability(&self, loc: MapLocation) -> ActionResult<bool> {
        self.tick();
        self.assert_can_sense_location(loc)?;
        Ok(self.world.grid.is_passable(loc, self.world.is_setup_phase()))
    }

    /// Every on-map cell within `radius_squared` of `center`, clipped to vision.
    ///
    /// # Errors
    ///
    /// `CantDoThat` for despawned robots and negative radii.
    pub fn locations_within(&self, center: MapLocation, radius_squared: i32) -> ActionResult<Vec<MapLocation>> {
        self.tick();
        let (_, radius) = self.sense_radius(Some(radius_squared))?;
        Ok(self.world.grid.layout().locations_within(center, radius))
    }

    /// Flags within `radius_squared`, lying or carried, optionally of one team.
    ///
    /// # Errors
    ///
    /// `CantDoThat` for despawned robots and negative radii.
    pub fn sense_nearby_flags(&self, radius_squared: Option<i32>, team: Option<Team>) -> ActionResult<Vec<FlagInfo>> {
        self.tick();
        let (center, radius) = self.sense_radius(radius_squared)?;
        Ok(self
            .world
            .flags
            .all()
            .iter()
            .filter(|flag| !flag.is_captured())
            .filter(|flag| team.is_none_or(|t| t == flag.team()))
            .filter(|flag| center.is_within_distance_squared(flag.location(), radius))
            .map(|flag| FlagInfo {
                id: flag.id(),
                team: flag.team(),
                location: flag.location(),
                carried: flag.carrier().is_some(),
            })
            .collect())
    }

    /// Approximate locations of the opponent's flags still in play.
    #[must_use]
    pub fn sense_broadcast_flag_locations(&self) -> Vec<MapLocation> {
        self.tick();
        self.world
            .flags
            .all()
            .iter()
            .filter(|flag| flag.team() != self.team && !flag.is_captured())
            .map(|flag| flag.broadcast_location())
            .collect()
    }

    /// This team's spawn cells, in index order. Available while despawned.
    #[must_use]
    pub fn ally_spawn_locations(&self) -> Vec<MapLocation> {
        self.tick();
        self.world.grid.spawn_locations(self.team)
    }

    /// Wells within `radius_squared`, optionally producing one resource.
    ///
    /// # Errors
    ///
    /// `CantDoThat` for despawned robots and negative radii.
    pub fn sense_nearby_wells(&self, radius_squared: Option<i32>, kind: Option<ResourceType>) -> ActionResult<Vec<WellInfo>> {
        self.tick();
        let (center, radius) = self.sense_radius(radius_squared)?;
        let rules = &self.world.config.wells;
        Ok(self
            .world
            .wells
            .iter()
            .filter(|well| center.is_within_distance_squared(well.location(), radius))
            .filter(|well| kind.is_none_or(|k| k == well.kind()))
            .map(|well| WellInfo {
                location: well.location(),
                kind: well.kind(),
                upgraded: well.is_upgraded(),
                rate: well.rate(rules),
            })
            .collect())
    }

    /// Island ids with at least one cell within `radius_squared`.
    ///
    /// # Errors
    ///
    /// `CantDoThat` for despawned robots and negative radii.
    pub fn sense_nearby_islands(&self, radius_squared: Option<i32>) -> ActionResult<Vec<IslandId>> {
        self.tick();
        let (center, radius) = self.sense_radius(radius_squared)?;
        let ids: BTreeSet<IslandId> = self
            .world
            .grid
            .layout()
            .locations_within(center, radius)
            .into_iter()
            .filter_map(|loc| self.world.grid.island(loc))
            .collect();
        Ok(ids.into_iter().collect())
    }

    /// Ownership of island `id`. Some cell of it must be within vision.
    ///
    /// # Errors
    ///
    /// `CantSenseThat` when the island is unknown or entirely out of vision.
    pub fn sense_island(&self, id: IslandId) -> ActionResult<IslandInfo> {
        self.tick();
        let (center, vision) = self.vision()?;
        let island = self
            .world
            .island_index(id)
            .map(|i| &self.world.islands[i])
            .ok_or_else(|| cant_sense(format!("island {id} does not exist")))?;
        if !island.cells().iter().any(|c| center.is_within_distance_squared(*c, vision)) {
            return Err(cant_sense(format!("island {id} is outside vision")));
        }
        Ok(IslandInfo {
            id,
            owner: island.owner(),
            anchor: island.anchor(),
            turns_left: island.turns_left(),
        })
    }

    /// Read slot `index` of the team's shared array. Available while despawned.
    ///
    /// # Errors
    ///
    /// `CantDoThat` for an index outside the array.
    pub fn read_shared_array(&self, index: usize) -> ActionResult<i32> {
        self.tick();
        self.world
            .ledger
            .read_shared(self.team, index)
            .map_err(|err| GameActionError::new(ActionErrorKind::CantDoThat, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_world, place, slot};
    use super::*;

    #[test]
    fn test_despawned_robot_cannot_sense() {
        let mut world = create_test_world(0);
        let duck = slot(&world, Team::A, RobotType::Duck, 0);
        let controller = RobotController::new(&mut world, duck).unwrap();
        let err = controller.sense_nearby_robots(None, None).unwrap_err();
        assert_eq!(err.kind(), ActionErrorKind::CantDoThat);
        assert!(!controller.can_sense_location(MapLocation::new(2, 2)));
        assert_eq!(controller.read_shared_array(0), Ok(0));
        assert_eq!(controller.ally_spawn_locations().len(), 9);
    }

    #[test]
    fn test_nearby_robots_excludes_self_and_filters_team() {
        let mut world = create_test_world(0);
        let me = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        place(&mut world, Team::A, RobotType::Duck, 1, MapLocation::new(11, 10));
        let enemy = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(10, 13));
        place(&mut world, Team::B, RobotType::Duck, 1, MapLocation::new(16, 10));
        let controller = RobotController::new(&mut world, me).unwrap();
        let all = controller.sense_nearby_robots(None, None).unwrap();
        assert_eq!(all.len(), 2);
        let enemies = controller.sense_nearby_robots(None, Some(Team::B)).unwrap();
        assert_eq!(enemies.iter().map(|r| r.id).collect::<Vec<_>>(), vec![enemy]);
        assert_eq!(controller.sense_nearby_robots(Some(1), None).unwrap().len(), 1);
        assert_eq!(
            controller.sense_nearby_robots(Some(-1), None).unwrap_err().kind(),
            ActionErrorKind::CantDoThat
        );
    }

    #[test]
    fn test_sense_location_limits() {
        let mut world = create_test_world(0);
        let me = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(1, 1));
        let controller = RobotController::new(&mut world, me).unwrap();
        assert!(controller.can_sense_location(MapLocation::new(5, 3)));
        assert!(!controller.can_sense_location(MapLocation::new(6, 1)));
        assert_eq!(
            controller.sense_map_info(MapLocation::new(-1, 1)).unwrap_err().kind(),
            ActionErrorKind::CantSenseThat
        );
        let info = controller.sense_map_info(MapLocation::new(2, 2)).unwrap();
        assert_eq!(info.spawn_zone, Some(Team::A));
        assert!((info.cooldown_multiplier - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_instructions_are_metered() {
        let mut world = create_test_world(0);
        let me = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(4, 4));
        let controller = RobotController::new(&mut world, me).unwrap();
        let _ = controller.round();
        let _ = controller.sense_nearby_flags(None, None);
        assert_eq!(controller.instructions_used(), 20);
    }
}
