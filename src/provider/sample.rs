//! Built-in strategies for demos, benchmarks and tests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ActionResult;
use crate::world::constants::INTERACT_RADIUS_SQUARED;
use crate::world::{Direction, MapLocation, RobotController, RobotId, RobotType, Team, TrapType};

use super::{Strategy, StrategyFactory};

/// The sample strategies by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleStrategy {
    /// Never does anything.
    Idle,
    /// Spawns, fights what it sees, steals flags and otherwise roams.
    Wanderer,
}

impl SampleStrategy {
    /// The factory building this strategy for each robot.
    #[must_use]
    pub fn factory(self) -> StrategyFactory {
        match self {
            SampleStrategy::Idle => idle,
            SampleStrategy::Wanderer => wanderer,
        }
    }
}

fn idle(_: RobotId, _: Team, _: RobotType, _: u64) -> Box<dyn Strategy> {
    Box::new(Idle)
}

fn wanderer(robot: RobotId, _: Team, _: RobotType, seed: u64) -> Box<dyn Strategy> {
    Box::new(Wanderer::new(robot, seed))
}

/// Does nothing, every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Strategy for Idle {
    fn run_turn(&mut self, _rc: &mut RobotController<'_>) -> ActionResult<()> {
        Ok(())
    }
}

/// A simple roaming fighter.
///
/// Draws from its own generator, seeded from the match seed and the robot
/// id, so a match with wanderers is still a pure function of its seed.
#[derive(Debug, Clone)]
pub struct Wanderer {
    rng: ChaCha8Rng,
    heading: Direction,
}

impl Wanderer {
    /// A wanderer for `robot` in a match seeded with `seed`.
    #[must_use]
    pub fn new(robot: RobotId, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ (u64::from(robot.0) << 20));
        let heading = Direction::MOVES[rng.gen_range(0..Direction::MOVES.len())];
        Self { rng, heading }
    }

    fn try_spawn(&mut self, rc: &mut RobotController<'_>) -> ActionResult<()> {
        let mut spots = rc.ally_spawn_locations();
        spots.shuffle(&mut self.rng);
        if let Some(loc) = spots.into_iter().find(|loc| rc.can_spawn(*loc)) {
            rc.spawn(loc)?;
        }
        Ok(())
    }

    /// Attack the weakest visible enemy in reach, else heal a hurt ally.
    fn fight(rc: &mut RobotController<'_>) -> ActionResult<bool> {
        let enemies = rc.sense_nearby_robots(None, Some(rc.team().opponent()))?;
        let target = enemies
            .iter()
            .filter(|enemy| !enemy.kind.is_base() && rc.can_attack(enemy.location))
            .min_by_key(|enemy| (enemy.health, enemy.id));
        if let Some(enemy) = target {
            rc.attack(enemy.location)?;
            return Ok(true);
        }
        let allies = rc.sense_nearby_robots(None, Some(rc.team()))?;
        let patient = allies
            .iter()
            .find(|ally| ally.health < ally.kind.stats().health && rc.can_heal(ally.location));
        if let Some(ally) = patient {
            rc.heal(ally.location)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn grab_flag(rc: &mut RobotController<'_>, here: MapLocation) -> ActionResult<bool> {
        if rc.is_setup_phase() {
            return Ok(false);
        }
        let flags = rc.sense_nearby_flags(Some(INTERACT_RADIUS_SQUARED), Some(rc.team().opponent()))?;
        let Some(flag) = flags
            .iter()
            .filter(|flag| !flag.carried && rc.can_pickup_flag(flag.location))
            .min_by_key(|flag| flag.location.distance_squared_to(here))
        else {
            return Ok(false);
        };
        rc.pickup_flag(flag.location)?;
        Ok(true)
    }

    fn step(&mut self, rc: &mut RobotController<'_>, here: MapLocation, carrying: bool) -> ActionResult<()> {
        if carrying {
            let home = rc
                .ally_spawn_locations()
                .into_iter()
                .min_by_key(|loc| (loc.distance_squared_to(here), loc.x, loc.y));
            if let Some(home) = home {
                self.heading = here.direction_to(home);
            }
        }
        if self.heading.is_center() || !rc.can_move(self.heading) {
            let options: Vec<Direction> = Direction::MOVES.into_iter().filter(|d| rc.can_move(*d)).collect();
            match options.choose(&mut self.rng) {
                Some(dir) => self.heading = *dir,
                None => return Ok(()),
            }
        }
        rc.move_robot(self.heading)
    }

    fn maybe_build_trap(&mut self, rc: &mut RobotController<'_>, here: MapLocation) -> ActionResult<()> {
        if !self.rng.gen_bool(0.05) {
            return Ok(());
        }
        let dir = Direction::MOVES[self.rng.gen_range(0..Direction::MOVES.len())];
        let loc = here.add(dir);
        if rc.can_build_trap(TrapType::Stun, loc) {
            rc.build_trap(TrapType::Stun, loc)?;
        }
        Ok(())
    }
}

impl Strategy for Wanderer {
    fn run_turn(&mut self, rc: &mut RobotController<'_>) -> ActionResult<()> {
        if rc.robot().is_some_and(|robot| robot.kind() == RobotType::Headquarters) {
            return Ok(());
        }
        if !rc.is_spawned() {
            return self.try_spawn(rc);
        }
        let Some(here) = rc.location() else {
            return Ok(());
        };
        let carrying = rc.sense_robot(rc.id())?.has_flag;
        if !carrying && rc.is_action_ready() && !Self::fight(rc)? && !Self::grab_flag(rc, here)? {
            self.maybe_build_trap(rc, here)?;
        }
        if rc.is_movement_ready() {
            self.step(rc, here, carrying)?;
        }
        let Some(now) = rc.location() else {
            return Ok(());
        };
        let color = match rc.team() {
            Team::A => [40, 90, 220],
            Team::B => [220, 60, 40],
        };
        rc.set_indicator_dot(now, color);
        Ok(())
    }
}
