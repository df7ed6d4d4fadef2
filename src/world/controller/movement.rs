use log::trace;

use crate::error::{ActionErrorKind, ActionResult, GameActionError};

use super::super::constants::{
    CARRIER_MOVE_INTERCEPT, CARRIER_MOVE_SLOPE_DEN, CARRIER_MOVE_SLOPE_NUM, FLAG_MOVEMENT_COOLDOWN,
};
use super::super::{Direction, GlobalUpgrade, MapLocation, Robot, RobotType};
use super::{RobotController, cant, illegal};

impl RobotController<'_> {
    /// Movement cooldown one step costs the robot before cell scaling.
    fn movement_base(&self, robot: &Robot) -> i32 {
        if self.world.flags.carried_by(robot.id()).is_some() {
            let change = self
                .world
                .ledger
                .upgrade_bonus(robot.team(), GlobalUpgrade::flag_movement_change);
            return FLAG_MOVEMENT_COOLDOWN + change;
        }
        if robot.kind() == RobotType::Carrier {
            let weight = robot.inventory().weight();
            return CARRIER_MOVE_INTERCEPT + weight * CARRIER_MOVE_SLOPE_NUM / CARRIER_MOVE_SLOPE_DEN;
        }
        robot.kind().stats().movement_cooldown
    }

    fn assert_can_move(&self, dir: Direction) -> ActionResult<MapLocation> {
        let (robot, loc) = self.spawned()?;
        Self::capability(robot.kind().can_move(), robot, "move")?;
        if dir.is_center() {
            return Err(cant("cannot move to the center"));
        }
        Self::assert_movement_ready(robot)?;
        let target = loc.add(dir);
        if !self.world.grid.on_the_map(target) {
            return Err(GameActionError::new(
                ActionErrorKind::OutOfRange,
                format!("{target} is off the map"),
            ));
        }
        if !self.world.grid.is_passable(target, self.world.is_setup_phase()) {
            return Err(illegal(format!("{target} is not passable")));
        }
        if self.world.registry.is_occupied(target) {
            return Err(illegal(format!("{target} is occupied")));
        }
        Ok(target)
    }

    /// Whether a step in `dir` would succeed now.
    #[must_use]
    pub fn can_move(&self, dir: Direction) -> bool {
        self.tick();
        self.assert_can_move(dir).is_ok()
    }

    /// Step one cell in `dir`.
    ///
    /// The carried flag comes along, bread on the new cell is collected and
    /// opposing traps covering it fire. Movement cooldown is charged at the
    /// new cell if the robot survives.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_move`] is false.
    pub fn move_robot(&mut self, dir: Direction) -> ActionResult<()> {
        self.tick();
        let target = self.assert_can_move(dir)?;
        let base = match self.robot() {
            Some(robot) => self.movement_base(robot),
            None => return Err(cant("robot has been destroyed")),
        };
        self.world.move_robot(self.id, target);
        self.world.charge_movement(self.id, base);
        trace!("robot {} moved {dir:?} to {target}", self.id);
        Ok(())
    }

    fn assert_can_spawn(&self, loc: MapLocation) -> ActionResult<()> {
        let robot = self.existing()?;
        if robot.is_spawned() {
            return Err(cant("robot is already spawned"));
        }
        Self::capability(robot.kind().can_move(), robot, "spawn")?;
        if !self.world.grid.on_the_map(loc) {
            return Err(GameActionError::new(
                ActionErrorKind::OutOfRange,
                format!("{loc} is off the map"),
            ));
        }
        if self.world.grid.spawn_zone(loc) != Some(self.team) {
            return Err(illegal(format!("{loc} is not an allied spawn cell")));
        }
        if !self.world.grid.is_passable(loc, self.world.is_setup_phase()) {
            return Err(illegal(format!("{loc} is not passable")));
        }
        if self.world.registry.is_occupied(loc) {
            return Err(illegal(format!("{loc} is occupied")));
        }
        let cost = robot.kind().stats().build_cost;
        if !self.world.ledger.can_afford(self.team, cost) {
            return Err(GameActionError::new(
                ActionErrorKind::InsufficientResource,
                format!("spawning a {:?} costs {cost:?}", robot.kind()),
            ));
        }
        Ok(())
    }

    /// Whether the robot could enter the map on `loc` now.
    #[must_use]
    pub fn can_spawn(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_spawn(loc).is_ok()
    }

    /// Enter the map on an allied spawn cell, paying the type's build cost.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_spawn`] is false.
    pub fn spawn(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        self.assert_can_spawn(loc)?;
        if let Some(cost) = self.robot().map(|r| r.kind().stats().build_cost) {
            self.world.ledger_spend(self.team, cost);
        }
        self.world.spawn_robot(self.id, loc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_world, place, slot};
    use super::*;
    use crate::world::{ResourceType, Team};

    #[test]
    fn test_move_charges_cooldown_at_new_cell() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        assert!(controller.can_move(Direction::North));
        controller.move_robot(Direction::North).unwrap();
        assert_eq!(controller.location(), Some(MapLocation::new(10, 11)));
        assert!(!controller.is_movement_ready());
        let err = controller.move_robot(Direction::North).unwrap_err();
        assert_eq!(err.kind(), ActionErrorKind::NotReady);
        assert_eq!(world.robot(duck).unwrap().movement_cooldown(), 10);
    }

    #[test]
    fn test_move_rejections_in_order() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(0, 5));
        place(&mut world, Team::A, RobotType::Duck, 1, MapLocation::new(1, 5));
        world.grid.set_water(MapLocation::new(0, 6), true);
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        assert_eq!(controller.move_robot(Direction::Center).unwrap_err().kind(), ActionErrorKind::CantDoThat);
        assert_eq!(controller.move_robot(Direction::West).unwrap_err().kind(), ActionErrorKind::OutOfRange);
        assert_eq!(controller.move_robot(Direction::North).unwrap_err().kind(), ActionErrorKind::IllegalTarget);
        assert_eq!(controller.move_robot(Direction::East).unwrap_err().kind(), ActionErrorKind::IllegalTarget);
        assert!(controller.can_move(Direction::South));
    }

    #[test]
    fn test_loaded_carrier_moves_slower() {
        let mut world = create_test_world(0);
        let carrier = place(&mut world, Team::A, RobotType::Carrier, 0, MapLocation::new(10, 10));
        world
            .registry
            .get_mut(carrier)
            .unwrap()
            .inventory_mut()
            .add_resource(ResourceType::Mana, 16);
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        controller.move_robot(Direction::East).unwrap();
        assert_eq!(world.robot(carrier).unwrap().movement_cooldown(), 5 + 6);
    }

    #[test]
    fn test_spawn_pays_build_cost() {
        let mut world = create_test_world(0);
        let carrier = slot(&world, Team::A, RobotType::Carrier, 0);
        let before = world.ledger().resource(Team::A, ResourceType::Adamantium);
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        assert!(!controller.can_spawn(MapLocation::new(17, 17)));
        assert!(!controller.can_spawn(MapLocation::new(5, 5)));
        controller.spawn(MapLocation::new(2, 3)).unwrap();
        assert!(controller.is_spawned());
        assert_eq!(controller.spawn(MapLocation::new(2, 2)).unwrap_err().kind(), ActionErrorKind::CantDoThat);
        assert_eq!(world.ledger().resource(Team::A, ResourceType::Adamantium), before - 50);
    }

    #[test]
    fn test_spawn_without_funds() {
        let mut world = create_test_world(0);
        let destabilizer = slot(&world, Team::B, RobotType::Destabilizer, 0);
        world.ledger.spend(Team::B, [0, 0, 900]).unwrap();
        let controller = RobotController::new(&mut world, destabilizer).unwrap();
        let err = controller.assert_can_spawn(MapLocation::new(17, 17)).unwrap_err();
        assert_eq!(err.kind(), ActionErrorKind::InsufficientResource);
    }
}
