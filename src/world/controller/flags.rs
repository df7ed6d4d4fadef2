use log::info;

use crate::error::ActionResult;
use crate::recorder::{ActionKind, ActionTarget};

use super::super::constants::INTERACT_RADIUS_SQUARED;
use super::super::{Flag, FlagId, MapLocation};
use super::{RobotController, cant, illegal};

impl RobotController<'_> {
    fn assert_can_pickup_flag(&self, loc: MapLocation) -> ActionResult<FlagId> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_carry_flag(), robot, "carry flags")?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, INTERACT_RADIUS_SQUARED)?;
        if self.world.flags.carried_by(self.id).is_some() {
            return Err(cant("already carrying a flag"));
        }
        let flag = self
            .world
            .flags
            .flag_at(loc)
            .filter(|f| f.is_available())
            .ok_or_else(|| illegal(format!("no flag to pick up on {loc}")))?;
        let own = flag.team() == self.team;
        if self.world.is_setup_phase() && !own {
            return Err(illegal("only allied flags may be moved during setup"));
        }
        if !self.world.is_setup_phase() && own {
            return Err(illegal("allied flags cannot be picked up after setup"));
        }
        Ok(flag.id())
    }

    /// Whether the flag on `loc` could be picked up now.
    #[must_use]
    pub fn can_pickup_flag(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_pickup_flag(loc).is_ok()
    }

    /// Pick up the flag lying on `loc`.
    ///
    /// During setup a robot repositions its own team's flags; afterwards
    /// it may only take enemy flags.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_pickup_flag`] is false.
    pub fn pickup_flag(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        let flag = self.assert_can_pickup_flag(loc)?;
        self.world.flags.pick_up(flag, self.id);
        if let Some(here) = self.location() {
            self.world.flags.follow_carrier(self.id, here);
        }
        if self.world.flags.get(flag).is_some_and(|f| f.team() != self.team) {
            self.world.ledger.pick_up_flag(self.team);
            info!("robot {} of {:?} picked up flag {flag}", self.id, self.team);
        }
        self.world
            .record_action(self.id, ActionKind::PickupFlag, ActionTarget::Flag(flag));
        if let Some(here) = self.location() {
            self.world.try_capture(self.id, here);
        }
        Ok(())
    }

    fn assert_can_drop_flag(&self, loc: MapLocation) -> ActionResult<FlagId> {
        let (robot, from) = self.spawned()?;
        let flag = self
            .world
            .flags
            .carried_by(self.id)
            .map(Flag::id)
            .ok_or_else(|| cant("not carrying a flag"))?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, INTERACT_RADIUS_SQUARED)?;
        if !self.world.grid.is_passable(loc, self.world.is_setup_phase()) {
            return Err(illegal(format!("{loc} is not passable")));
        }
        if self.world.flags.flag_at(loc).is_some() {
            return Err(illegal(format!("a flag already lies on {loc}")));
        }
        if self.world.registry.robot_at(loc).is_some_and(|id| id != self.id) {
            return Err(illegal(format!("{loc} is occupied")));
        }
        Ok(flag)
    }

    /// Whether the carried flag could be put down on `loc` now.
    #[must_use]
    pub fn can_drop_flag(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_drop_flag(loc).is_ok()
    }

    /// Put the carried flag down on `loc`.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_drop_flag`] is false.
    pub fn drop_flag(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        let flag = self.assert_can_drop_flag(loc)?;
        self.world.flags.drop_at(flag, loc);
        self.world
            .record_action(self.id, ActionKind::DropFlag, ActionTarget::Flag(flag));
        Ok(())
    }
}
