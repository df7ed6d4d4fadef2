//! Team-wide operations, debug annotations and leaving the match.

use log::info;

use crate::error::ActionResult;
use crate::recorder::{ActionKind, ActionTarget};

use super::super::constants::{MAX_SHARED_ARRAY_VALUE, SHARED_ARRAY_LENGTH};
use super::super::{DominationFactor, GlobalUpgrade, Indicator, MapLocation, MatchOutcome};
use super::{RobotController, cant};

impl RobotController<'_> {
    fn assert_can_write_shared_array(&self, index: usize, value: i32) -> ActionResult<()> {
        self.spawned()?;
        if index >= SHARED_ARRAY_LENGTH {
            return Err(cant(format!("shared array index {index} out of bounds")));
        }
        if !(0..=MAX_SHARED_ARRAY_VALUE).contains(&value) {
            return Err(cant(format!("shared array value {value} out of range")));
        }
        Ok(())
    }

    /// Whether writing `value` to slot `index` would succeed now.
    #[must_use]
    pub fn can_write_shared_array(&self, index: usize, value: i32) -> bool {
        self.tick();
        self.assert_can_write_shared_array(index, value).is_ok()
    }

    /// Write `value` to slot `index` of the team's shared array.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_write_shared_array`] is false.
    pub fn write_shared_array(&mut self, index: usize, value: i32) -> ActionResult<()> {
        self.tick();
        self.assert_can_write_shared_array(index, value)?;
        self.world
            .ledger
            .write_shared(self.team, index, value)
            .map_err(|err| cant(err.to_string()))
    }

    fn assert_can_buy_global(&self, upgrade: GlobalUpgrade) -> ActionResult<()> {
        self.existing()?;
        if self.world.ledger.upgrade_points(self.team) == 0 {
            return Err(cant("no global upgrade point to spend"));
        }
        if self.world.ledger.has_upgrade(self.team, upgrade) {
            return Err(cant(format!("{upgrade:?} is already owned")));
        }
        Ok(())
    }

    /// Whether the team could buy `upgrade` now.
    #[must_use]
    pub fn can_buy_global(&self, upgrade: GlobalUpgrade) -> bool {
        self.tick();
        self.assert_can_buy_global(upgrade).is_ok()
    }

    /// Spend a global upgrade point on `upgrade` for the whole team.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_buy_global`] is false.
    pub fn buy_global(&mut self, upgrade: GlobalUpgrade) -> ActionResult<()> {
        self.tick();
        self.assert_can_buy_global(upgrade)?;
        self.world
            .ledger
            .buy_upgrade(self.team, upgrade)
            .map_err(|err| cant(err.to_string()))?;
        self.world
            .record_action(self.id, ActionKind::GlobalUpgrade, ActionTarget::Upgrade(upgrade));
        info!("{:?} bought the {upgrade:?} upgrade in round {}", self.team, self.world.round);
        Ok(())
    }

    /// Label the robot for replay viewers. Truncated to the maximum length.
    pub fn set_indicator_string(&mut self, text: &str) {
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.set_indicator_string(text);
        }
    }

    /// Draw a dot on `location` for replay viewers.
    pub fn set_indicator_dot(&mut self, location: MapLocation, color: [u8; 3]) {
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.add_indicator(Indicator::Dot { location, color });
        }
    }

    /// Draw a line from `from` to `to` for replay viewers.
    pub fn set_indicator_line(&mut self, from: MapLocation, to: MapLocation, color: [u8; 3]) {
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.add_indicator(Indicator::Line { from, to, color });
        }
    }

    /// Destroy this robot. Any carried flag is dropped where it stood.
    ///
    /// # Errors
    ///
    /// Fails for despawned or already destroyed robots.
    pub fn disintegrate(&mut self) -> ActionResult<()> {
        self.tick();
        self.spawned()?;
        self.world
            .record_action(self.id, ActionKind::Disintegrate, ActionTarget::None);
        self.world.destroy_robot(self.id);
        Ok(())
    }

    /// Concede the match. The opponent wins by resignation once the round
    /// settles, unless a winner is already set.
    ///
    /// # Errors
    ///
    /// Fails for despawned or destroyed robots.
    pub fn resign(&mut self) -> ActionResult<()> {
        self.tick();
        self.spawned()?;
        self.world.record_action(self.id, ActionKind::Resign, ActionTarget::None);
        if self.world.outcome.is_none() {
            info!("{:?} resigned in round {}", self.team, self.world.round);
            self.world.outcome = Some(MatchOutcome {
                winner: self.team.opponent(),
                reason: DominationFactor::Resignation,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_world, place, slot};
    use super::*;
    use crate::error::ActionErrorKind;
    use crate::world::{RobotType, Team};

    #[test]
    fn test_shared_array_bounds() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(9, 9));
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        assert!(!controller.can_write_shared_array(SHARED_ARRAY_LENGTH, 1));
        assert!(!controller.can_write_shared_array(0, MAX_SHARED_ARRAY_VALUE + 1));
        assert!(!controller.can_write_shared_array(0, -1));
        controller.write_shared_array(3, MAX_SHARED_ARRAY_VALUE).unwrap();
        assert_eq!(controller.read_shared_array(3), Ok(MAX_SHARED_ARRAY_VALUE));
        assert_eq!(world.ledger().read_shared(Team::B, 3), Ok(0));
    }

    #[test]
    fn test_despawned_robot_cannot_write() {
        let mut world = create_test_world(0);
        let duck = slot(&world, Team::A, RobotType::Duck, 1);
        let controller = RobotController::new(&mut world, duck).unwrap();
        assert_eq!(
            controller.assert_can_write_shared_array(0, 1).unwrap_err().kind(),
            ActionErrorKind::CantDoThat
        );
    }

    #[test]
    fn test_global_upgrade_needs_a_point() {
        let mut world = create_test_world(0);
        let duck = slot(&world, Team::B, RobotType::Duck, 0);
        let controller = RobotController::new(&mut world, duck).unwrap();
        assert!(!controller.can_buy_global(GlobalUpgrade::Healing));
        world.ledger.grant_upgrade_points();
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        controller.buy_global(GlobalUpgrade::Healing).unwrap();
        assert!(!controller.can_buy_global(GlobalUpgrade::Healing));
        assert!(world.ledger().has_upgrade(Team::B, GlobalUpgrade::Healing));
    }

    #[test]
    fn test_disintegrate_removes_robot() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(9, 9));
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        controller.set_indicator_string("bye");
        controller.disintegrate().unwrap();
        assert!(controller.robot().is_none());
        assert_eq!(controller.disintegrate().unwrap_err().kind(), ActionErrorKind::CantDoThat);
        assert!(!world.robots().is_occupied(MapLocation::new(9, 9)));
    }

    #[test]
    fn test_resign_hands_the_win_over() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(9, 9));
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        controller.resign().unwrap();
        assert_eq!(
            world.outcome(),
            Some(MatchOutcome {
                winner: Team::A,
                reason: DominationFactor::Resignation
            })
        );
    }
}
