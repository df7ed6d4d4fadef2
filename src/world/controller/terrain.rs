use log::debug;

use crate::error::{ActionErrorKind, ActionResult, GameActionError};
use crate::recorder::{ActionKind, ActionTarget};

use super::super::constants::{
    DIG_COOLDOWN, DIG_COST, FILL_COOLDOWN, FILL_COST, INTERACT_RADIUS_SQUARED, TRAP_BUILD_COOLDOWN,
};
use super::super::{MapLocation, ResourceType, SkillType, Trap, TrapType};
use super::{RobotController, illegal};

/// Base-resource cost as a ledger cost vector.
const fn adamantium(amount: i32) -> [i32; 3] {
    [amount, 0, 0]
}

impl RobotController<'_> {
    /// Common checks for dig, fill and trap building up to the target cell.
    fn assert_terraform(&self, loc: MapLocation, what: &str) -> ActionResult<()> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_terraform(), robot, what)?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, INTERACT_RADIUS_SQUARED)
    }

    fn assert_affordable(&self, amount: i32, what: &str) -> ActionResult<()> {
        if self.world.ledger.can_afford(self.team, adamantium(amount)) {
            return Ok(());
        }
        Err(GameActionError::new(
            ActionErrorKind::InsufficientResource,
            format!("{what} costs {amount} {:?}", ResourceType::Adamantium),
        ))
    }

    fn assert_can_dig(&self, loc: MapLocation) -> ActionResult<()> {
        self.assert_terraform(loc, "dig")?;
        let grid = &self.world.grid;
        if grid.is_wall(loc) || grid.is_water(loc) || grid.is_dam(loc) {
            return Err(illegal(format!("{loc} cannot be dug")));
        }
        if grid.spawn_zone(loc).is_some() {
            return Err(illegal(format!("{loc} is a spawn cell")));
        }
        if self.world.registry.is_occupied(loc) {
            return Err(illegal(format!("{loc} is occupied")));
        }
        if self.world.flags.flag_at(loc).is_some() {
            return Err(illegal(format!("a flag lies on {loc}")));
        }
        if grid.trap(loc).is_some() {
            return Err(illegal(format!("a trap sits on {loc}")));
        }
        self.assert_affordable(DIG_COST, "digging")
    }

    /// Whether digging `loc` would succeed now.
    #[must_use]
    pub fn can_dig(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_dig(loc).is_ok()
    }

    /// Turn the land cell `loc` into water.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_dig`] is false.
    pub fn dig(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        self.assert_can_dig(loc)?;
        self.world.ledger_spend(self.team, adamantium(DIG_COST));
        self.world.grid.set_water(loc, true);
        self.finish_terraform(loc, DIG_COOLDOWN, ActionKind::Dig);
        Ok(())
    }

    fn assert_can_fill(&self, loc: MapLocation) -> ActionResult<()> {
        self.assert_terraform(loc, "fill")?;
        if !self.world.grid.is_water(loc) {
            return Err(illegal(format!("{loc} is not water")));
        }
        self.assert_affordable(FILL_COST, "filling")
    }

    /// Whether filling `loc` would succeed now.
    #[must_use]
    pub fn can_fill(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_fill(loc).is_ok()
    }

    /// Turn the water cell `loc` back into land.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_fill`] is false.
    pub fn fill(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        self.assert_can_fill(loc)?;
        self.world.ledger_spend(self.team, adamantium(FILL_COST));
        self.world.grid.set_water(loc, false);
        self.finish_terraform(loc, FILL_COOLDOWN, ActionKind::Fill);
        Ok(())
    }

    /// Cooldown, experience and the record shared by dig and fill, then
    /// the opposing traps covering the cell go off.
    fn finish_terraform(&mut self, loc: MapLocation, base_cooldown: i32, kind: ActionKind) {
        let cooldown = match self.world.registry.get_mut(self.id) {
            Some(robot) => {
                let cooldown = Self::skill_cooldown(robot, SkillType::Build, base_cooldown);
                robot.add_experience(SkillType::Build, 1);
                cooldown
            }
            None => return,
        };
        self.world.charge_action(self.id, cooldown);
        self.world.record_action(self.id, kind, ActionTarget::Location(loc));
        for trap in self.world.traps.opposing_triggers(loc, self.team) {
            self.world.trigger_trap(trap, self.id, false);
        }
    }

    fn assert_can_build_trap(&self, kind: TrapType, loc: MapLocation) -> ActionResult<()> {
        self.assert_terraform(loc, "build traps")?;
        if !self.world.grid.is_passable(loc, self.world.is_setup_phase()) {
            return Err(illegal(format!("{loc} is not passable")));
        }
        if self.world.grid.trap(loc).is_some() {
            return Err(illegal(format!("a trap already sits on {loc}")));
        }
        if self.world.flags.flag_at(loc).is_some() {
            return Err(illegal(format!("a flag lies on {loc}")));
        }
        self.assert_affordable(kind.stats().build_cost, "this trap")
    }

    /// Whether a `kind` trap could be built on `loc` now.
    #[must_use]
    pub fn can_build_trap(&self, kind: TrapType, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_build_trap(kind, loc).is_ok()
    }

    /// Build a `kind` trap on `loc`.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_build_trap`] is false.
    pub fn build_trap(&mut self, kind: TrapType, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        self.assert_can_build_trap(kind, loc)?;
        self.world.ledger_spend(self.team, adamantium(kind.stats().build_cost));
        let id = self.world.ctx.next_trap_id();
        self.world.traps.insert(Trap::new(id, kind, self.team, loc));
        self.world.grid.set_trap(loc, Some(id));
        let cooldown = match self.world.registry.get_mut(self.id) {
            Some(robot) => {
                let cooldown = Self::skill_cooldown(robot, SkillType::Build, TRAP_BUILD_COOLDOWN);
                robot.add_experience(SkillType::Build, 1);
                cooldown
            }
            None => TRAP_BUILD_COOLDOWN,
        };
        self.world.charge_action(self.id, cooldown);
        self.world.record_action(self.id, ActionKind::BuildTrap, ActionTarget::Trap(id));
        debug!("{:?} built {kind:?} trap {id} at {loc}", self.team);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_world, place};
    use super::*;
    use crate::world::{GameWorld, RobotId, RobotType, Team};

    #[test]
    fn test_dig_then_fill() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let target = MapLocation::new(11, 10);
        let before = world.ledger().resource(Team::A, ResourceType::Adamantium);
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        assert!(!controller.can_fill(target));
        controller.dig(target).unwrap();
        assert!(!controller.can_fill(target));
        assert!(world.grid().is_water(target));
        assert_eq!(world.robot(duck).unwrap().action_cooldown(), 20);

        world.registry.get_mut(duck).unwrap().process_beginning_of_turn();
        world.registry.get_mut(duck).unwrap().process_beginning_of_turn();
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        controller.fill(target).unwrap();
        assert!(!world.grid().is_water(target));
        assert_eq!(world.ledger().resource(Team::A, ResourceType::Adamantium), before - DIG_COST - FILL_COST);
        assert_eq!(world.robot(duck).unwrap().experience(SkillType::Build), 2);
    }

    #[test]
    fn test_dig_refuses_spawn_cells_and_far_cells() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(4, 4));
        let controller = RobotController::new(&mut world, duck).unwrap();
        assert_eq!(
            controller.assert_can_dig(MapLocation::new(3, 3)).unwrap_err().kind(),
            ActionErrorKind::IllegalTarget
        );
        assert_eq!(
            controller.assert_can_dig(MapLocation::new(6, 4)).unwrap_err().kind(),
            ActionErrorKind::OutOfRange
        );
        assert!(controller.can_dig(MapLocation::new(5, 5)));
    }

    #[test]
    fn test_only_ducks_terraform() {
        let mut world = create_test_world(0);
        let launcher = place(&mut world, Team::A, RobotType::Launcher, 0, MapLocation::new(4, 4));
        let controller = RobotController::new(&mut world, launcher).unwrap();
        assert_eq!(
            controller.assert_can_dig(MapLocation::new(5, 5)).unwrap_err().kind(),
            ActionErrorKind::CantDoThat
        );
    }

    #[test]
    fn test_enemy_dig_fires_trap() {
        let mut world = create_test_world(0);
        let builder = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let mut controller = RobotController::new(&mut world, builder).unwrap();
        controller.build_trap(TrapType::Stun, MapLocation::new(10, 11)).unwrap();
        assert!(!controller.can_build_trap(TrapType::Water, MapLocation::new(10, 11)));
        assert_eq!(world.traps().len(), 1);
        assert_eq!(world.robot(builder).unwrap().action_cooldown(), 5);

        let digger = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(12, 12));
        let mut controller = RobotController::new(&mut world, digger).unwrap();
        controller.dig(MapLocation::new(11, 12)).unwrap();
        assert!(world.traps().is_empty());
        assert!(world.grid().trap(MapLocation::new(10, 11)).is_none());
        assert_eq!(world.robot(digger).unwrap().action_cooldown(), 40);
    }

    fn step_toward(world: &mut GameWorld, robot: RobotId, to: MapLocation) {
        let from = world.robot(robot).unwrap().location().unwrap();
        let mut controller = RobotController::new(world, robot).unwrap();
        controller.move_robot(from.direction_to(to)).unwrap();
    }

    #[test]
    fn test_water_trap_floods_free_cells_on_entry() {
        let mut world = create_test_world(0);
        let center = MapLocation::new(10, 11);
        let builder = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let mut controller = RobotController::new(&mut world, builder).unwrap();
        controller.build_trap(TrapType::Water, center).unwrap();

        let intruder = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(10, 13));
        assert_eq!(world.traps().len(), 1);
        step_toward(&mut world, intruder, MapLocation::new(10, 12));

        assert!(world.traps().is_empty());
        for cell in world.grid().layout().locations_within(center, 2) {
            assert!(world.traps().triggers_at(cell).is_empty());
        }
        let occupied = [MapLocation::new(10, 10), MapLocation::new(10, 12)];
        for cell in world.grid().layout().locations_within(center, 9) {
            if occupied.contains(&cell) || cell == center {
                assert!(!world.grid().is_water(cell), "{cell} should stay dry");
            } else {
                assert!(world.grid().is_water(cell), "{cell} should be flooded");
            }
        }
    }

    #[test]
    fn test_explosive_trap_damage_depends_on_trigger() {
        let mut world = create_test_world(0);
        let builder = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let mut controller = RobotController::new(&mut world, builder).unwrap();
        controller.build_trap(TrapType::Explosive, MapLocation::new(10, 11)).unwrap();
        let second = place(&mut world, Team::A, RobotType::Duck, 1, MapLocation::new(5, 5));
        let mut controller = RobotController::new(&mut world, second).unwrap();
        controller.build_trap(TrapType::Explosive, MapLocation::new(5, 6)).unwrap();
        assert_eq!(world.traps().len(), 2);

        let walker = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(10, 13));
        step_toward(&mut world, walker, MapLocation::new(10, 12));
        assert_eq!(world.robot(walker).unwrap().health(), 250);
        assert_eq!(world.robot(builder).unwrap().health(), 1000);

        let digger = place(&mut world, Team::B, RobotType::Duck, 1, MapLocation::new(7, 7));
        let mut controller = RobotController::new(&mut world, digger).unwrap();
        controller.dig(MapLocation::new(6, 7)).unwrap();
        assert_eq!(world.robot(digger).unwrap().health(), 500);
        assert_eq!(world.robot(second).unwrap().health(), 1000);
        assert!(world.traps().is_empty());
    }

    #[test]
    fn test_stun_trap_locks_cooldowns_on_entry() {
        let mut world = create_test_world(0);
        let builder = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let mut controller = RobotController::new(&mut world, builder).unwrap();
        controller.build_trap(TrapType::Stun, MapLocation::new(10, 11)).unwrap();

        let walker = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(10, 13));
        step_toward(&mut world, walker, MapLocation::new(10, 12));
        let robot = world.robot(walker).unwrap();
        assert_eq!(robot.action_cooldown(), 40);
        assert!(robot.movement_cooldown() >= 40);
        assert!(!robot.is_action_ready());
        assert!(world.traps().is_empty());
    }
}
