//! The handle an agent acts through during its robot's turn.
//!
//! Every mutating operation comes in three parts: a private
//! `assert_can_x` that checks the preconditions in a fixed order and
//! reports the first failure, a `can_x` predicate that only asks whether
//! that check passes, and `x` itself, which runs the same check again and
//! mutates nothing unless it passes.
//!
//! Precondition order: the robot exists and is spawned, its type has the
//! capability, the arguments are well formed, it is ready, the target is
//! in range and on the map, then the action-specific occupancy, ownership
//! and cost checks.

mod combat;
mod economy;
mod flags;
mod movement;
mod sensing;
mod team;
mod terrain;

use std::cell::Cell;

pub use sensing::{FlagInfo, IslandInfo, MapInfo, RobotInfo, WellInfo};

use crate::error::{ActionErrorKind, ActionResult, GameActionError};

use super::constants::INSTRUCTIONS_PER_CALL;
use super::{GameWorld, MapLocation, Robot, RobotId, SkillType, Team, apply_percent};

/// One robot's view of the world for the duration of its turn.
#[derive(Debug)]
pub struct RobotController<'w> {
    world: &'w mut GameWorld,
    id: RobotId,
    team: Team,
    instructions: Cell<u32>,
}

impl<'w> RobotController<'w> {
    /// A controller for robot `id`, `None` if no such robot exists.
    pub(super) fn new(world: &'w mut GameWorld, id: RobotId) -> Option<Self> {
        let team = world.registry.get(id)?.team();
        Some(Self {
            world,
            id,
            team,
            instructions: Cell::new(0),
        })
    }

    /// The controlled robot's id.
    #[must_use]
    pub const fn id(&self) -> RobotId {
        self.id
    }

    /// Instructions charged to this turn so far.
    #[must_use]
    pub fn instructions_used(&self) -> u32 {
        self.instructions.get()
    }

    /// Charge extra instructions, e.g. for work done inside the agent.
    pub fn charge_instructions(&self, amount: u32) {
        self.instructions.set(self.instructions.get().saturating_add(amount));
    }

    fn tick(&self) {
        self.charge_instructions(INSTRUCTIONS_PER_CALL);
    }

    /// Current round.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.tick();
        self.world.round()
    }

    /// Round limit.
    #[must_use]
    pub fn round_limit(&self) -> u32 {
        self.tick();
        self.world.round_limit()
    }

    /// Whether the setup phase is still on.
    #[must_use]
    pub fn is_setup_phase(&self) -> bool {
        self.tick();
        self.world.is_setup_phase()
    }

    /// Map width.
    #[must_use]
    pub fn map_width(&self) -> i32 {
        self.world.grid.layout().width()
    }

    /// Map height.
    #[must_use]
    pub fn map_height(&self) -> i32 {
        self.world.grid.layout().height()
    }

    /// Whether `loc` lies on the map.
    #[must_use]
    pub fn on_the_map(&self, loc: MapLocation) -> bool {
        self.world.grid.on_the_map(loc)
    }

    /// The controlled robot, `None` once it has been destroyed.
    #[must_use]
    pub fn robot(&self) -> Option<&Robot> {
        self.world.registry.get(self.id)
    }

    /// The controlled robot's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// The controlled robot's location, `None` while despawned.
    #[must_use]
    pub fn location(&self) -> Option<MapLocation> {
        self.robot().and_then(Robot::location)
    }

    /// Whether the controlled robot is on the map.
    #[must_use]
    pub fn is_spawned(&self) -> bool {
        self.robot().is_some_and(Robot::is_spawned)
    }

    /// Whether the action cooldown allows an action now.
    #[must_use]
    pub fn is_action_ready(&self) -> bool {
        self.robot().is_some_and(Robot::is_action_ready)
    }

    /// Whether the movement cooldown allows a move now.
    #[must_use]
    pub fn is_movement_ready(&self) -> bool {
        self.robot().is_some_and(Robot::is_movement_ready)
    }

    /// Team resource balance.
    #[must_use]
    pub fn resource(&self, resource: super::ResourceType) -> i32 {
        self.tick();
        self.world.ledger.resource(self.team(), resource)
    }

    /// Enemy flags this team has captured.
    #[must_use]
    pub fn flags_captured(&self) -> u32 {
        self.world.ledger.flags_captured(self.team())
    }

    /// Unspent global upgrade points.
    #[must_use]
    pub fn upgrade_points(&self) -> u32 {
        self.world.ledger.upgrade_points(self.team())
    }

    fn existing(&self) -> ActionResult<&Robot> {
        self.robot()
            .ok_or_else(|| GameActionError::new(ActionErrorKind::CantDoThat, "robot has been destroyed"))
    }

    /// The robot and its cell, failing for despawned robots.
    fn spawned(&self) -> ActionResult<(&Robot, MapLocation)> {
        let robot = self.existing()?;
        let loc = robot
            .location()
            .ok_or_else(|| GameActionError::new(ActionErrorKind::CantDoThat, "robot is not spawned"))?;
        Ok((robot, loc))
    }

    fn assert_action_ready(robot: &Robot) -> ActionResult<()> {
        if robot.is_action_ready() {
            Ok(())
        } else {
            Err(GameActionError::new(
                ActionErrorKind::NotReady,
                format!("action cooldown is {}", robot.action_cooldown()),
            ))
        }
    }

    fn assert_movement_ready(robot: &Robot) -> ActionResult<()> {
        if robot.is_movement_ready() {
            Ok(())
        } else {
            Err(GameActionError::new(
                ActionErrorKind::NotReady,
                format!("movement cooldown is {}", robot.movement_cooldown()),
            ))
        }
    }

    /// Range then map bounds, both reported as out of range.
    fn assert_reachable(&self, from: MapLocation, target: MapLocation, radius_squared: i32) -> ActionResult<()> {
        if !from.is_within_distance_squared(target, radius_squared) {
            return Err(GameActionError::new(
                ActionErrorKind::OutOfRange,
                format!("{target} is farther than radius squared {radius_squared} from {from}"),
            ));
        }
        if !self.world.grid.on_the_map(target) {
            return Err(GameActionError::new(
                ActionErrorKind::OutOfRange,
                format!("{target} is off the map"),
            ));
        }
        Ok(())
    }

    fn capability(allowed: bool, robot: &Robot, what: &str) -> ActionResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(GameActionError::new(
                ActionErrorKind::CantDoThat,
                format!("{:?} robots cannot {what}", robot.kind()),
            ))
        }
    }

    /// Skill-adjusted base cooldown.
    fn skill_cooldown(robot: &Robot, skill: SkillType, base: i32) -> i32 {
        apply_percent(base, skill.cooldown_percent(robot.level(skill)))
    }

    /// Skill-adjusted base effect.
    fn skill_effect(robot: &Robot, skill: SkillType, base: i32) -> i32 {
        apply_percent(base, skill.effect_percent(robot.level(skill)))
    }
}

fn illegal(message: impl Into<String>) -> GameActionError {
    GameActionError::new(ActionErrorKind::IllegalTarget, message)
}

fn cant(message: impl Into<String>) -> GameActionError {
    GameActionError::new(ActionErrorKind::CantDoThat, message)
}

#[cfg(test)]
pub(super) mod test_support {
    use crate::config::MatchConfig;
    use crate::world::{GameWorld, MapBuilder, MapLocation, Robot, RobotId, RobotType, Symmetry, Team};

    /// A 20x20 world with spawn zones at (2, 2) and (17, 17), headquarters
    /// at (0, 0) and (19, 19), and one slot of each mobile type per team.
    pub(in crate::world) fn create_test_world(setup_rounds: u32) -> GameWorld {
        let mut builder = MapBuilder::new("controller", 20, 20, Symmetry::Rotational).roster(vec![
            RobotType::Duck,
            RobotType::Duck,
            RobotType::Carrier,
            RobotType::Launcher,
            RobotType::Booster,
            RobotType::Destabilizer,
        ]);
        builder
            .spawn_zone(Team::A, MapLocation::new(2, 2))
            .spawn_zone(Team::B, MapLocation::new(17, 17))
            .headquarters(Team::A, MapLocation::new(0, 0))
            .headquarters(Team::B, MapLocation::new(19, 19));
        let config = MatchConfig {
            setup_rounds,
            ..MatchConfig::default()
        };
        let mut world = GameWorld::new(&builder.build(), config).unwrap();
        world.round = setup_rounds + 1;
        for team in Team::ALL {
            world.ledger.add_all(team, [1000, 1000, 1000]).unwrap();
        }
        world
    }

    /// The `n`th slot of `kind` for `team`, in id order.
    pub(in crate::world) fn slot(world: &GameWorld, team: Team, kind: RobotType, n: usize) -> RobotId {
        world
            .robots()
            .team(team)
            .filter(|r| r.kind() == kind)
            .map(Robot::id)
            .nth(n)
            .unwrap()
    }

    /// Spawn the `n`th slot of `kind` for `team` directly on `loc`, ready to act.
    pub(in crate::world) fn place(world: &mut GameWorld, team: Team, kind: RobotType, n: usize, loc: MapLocation) -> RobotId {
        let id = slot(world, team, kind, n);
        world.spawn_robot(id, loc);
        world.registry.get_mut(id).unwrap().process_beginning_of_turn();
        id
    }
}
