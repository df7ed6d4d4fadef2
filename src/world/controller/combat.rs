use log::trace;

use crate::error::{ActionErrorKind, ActionResult, GameActionError};
use crate::recorder::{ActionKind, ActionTarget};

use super::super::constants::{
    BOOST_DURATION, CARRIER_THROW_DAMAGE_DEN, CARRIER_THROW_DAMAGE_NUM, DESTABILIZE_DURATION,
    DESTABILIZE_RADIUS_SQUARED, HEAL_COOLDOWN, HEAL_RADIUS_SQUARED,
};
use super::super::{EffectKind, GlobalUpgrade, MapLocation, RobotId, RobotType, SkillType, UnitStats};
use super::{RobotController, cant, illegal};

impl RobotController<'_> {
    fn assert_can_attack(&self, loc: MapLocation) -> ActionResult<RobotId> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_attack(), robot, "attack")?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, robot.kind().stats().action_radius_squared)?;
        let target = self
            .world
            .enemy_at(loc, self.team)
            .ok_or_else(|| illegal(format!("no enemy robot on {loc}")))?;
        if self.world.registry.get(target).is_some_and(|r| r.kind().is_base()) {
            return Err(illegal(format!("robot {target} on {loc} cannot be damaged")));
        }
        if robot.kind() == RobotType::Carrier && robot.inventory().resource_total() == 0 {
            return Err(GameActionError::new(
                ActionErrorKind::InsufficientResource,
                "carrier has nothing to throw",
            ));
        }
        Ok(target)
    }

    /// Whether an attack on `loc` would succeed now.
    #[must_use]
    pub fn can_attack(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_attack(loc).is_ok()
    }

    /// Attack the enemy robot on `loc`.
    ///
    /// Carriers throw their whole resource load instead of striking; the
    /// thrown resources are lost.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_attack`] is false.
    pub fn attack(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        let target = self.assert_can_attack(loc)?;
        let (damage, cooldown) = {
            let Some(robot) = self.world.registry.get_mut(self.id) else {
                return Err(cant("robot has been destroyed"));
            };
            let stats = robot.kind().stats();
            if robot.kind() == RobotType::Carrier {
                let load: i32 = robot.inventory_mut().take_resources().iter().sum();
                (load * CARRIER_THROW_DAMAGE_NUM / CARRIER_THROW_DAMAGE_DEN, stats.action_cooldown)
            } else {
                let damage = Self::skill_effect(robot, SkillType::Attack, stats.damage);
                let cooldown = Self::skill_cooldown(robot, SkillType::Attack, stats.action_cooldown);
                robot.add_experience(SkillType::Attack, 1);
                let bonus = self.world.ledger.upgrade_bonus(self.team, GlobalUpgrade::attack_bonus);
                (damage + bonus, cooldown)
            }
        };
        let killed = self.world.damage_robot(target, damage);
        self.world.charge_action(self.id, cooldown);
        self.world
            .record_action(self.id, ActionKind::Attack, ActionTarget::Robot(target));
        trace!("robot {} hit {target} for {damage} (killed: {killed})", self.id);
        Ok(())
    }

    fn assert_can_heal(&self, loc: MapLocation) -> ActionResult<RobotId> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_heal(), robot, "heal")?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, HEAL_RADIUS_SQUARED)?;
        let target = self
            .world
            .registry
            .robot_at(loc)
            .filter(|id| *id != self.id)
            .and_then(|id| self.world.registry.get(id))
            .filter(|r| r.team() == self.team && !r.kind().is_base())
            .ok_or_else(|| illegal(format!("no allied robot to heal on {loc}")))?;
        Ok(target.id())
    }

    /// Whether healing the ally on `loc` would succeed now.
    #[must_use]
    pub fn can_heal(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_heal(loc).is_ok()
    }

    /// Heal the allied robot on `loc`, up to its maximum health.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_heal`] is false.
    pub fn heal(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        let target = self.assert_can_heal(loc)?;
        let (amount, cooldown) = {
            let Some(robot) = self.world.registry.get_mut(self.id) else {
                return Err(cant("robot has been destroyed"));
            };
            let amount = Self::skill_effect(robot, SkillType::Heal, robot.kind().stats().heal);
            let cooldown = Self::skill_cooldown(robot, SkillType::Heal, HEAL_COOLDOWN);
            robot.add_experience(SkillType::Heal, 1);
            (amount, cooldown)
        };
        let bonus = self.world.ledger.upgrade_bonus(self.team, GlobalUpgrade::heal_bonus);
        self.world.heal_robot(target, amount + bonus);
        self.world.charge_action(self.id, cooldown);
        self.world
            .record_action(self.id, ActionKind::Heal, ActionTarget::Robot(target));
        Ok(())
    }

    fn assert_can_boost(&self) -> ActionResult<(MapLocation, &'static UnitStats)> {
        let (robot, here) = self.spawned()?;
        Self::capability(robot.kind().can_boost(), robot, "boost")?;
        Self::assert_action_ready(robot)?;
        Ok((here, robot.kind().stats()))
    }

    /// Whether a boost would succeed now.
    #[must_use]
    pub fn can_boost(&self) -> bool {
        self.tick();
        self.assert_can_boost().is_ok()
    }

    /// Speed up allied cooldowns on every cell within the action radius
    /// for the next few rounds.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_boost`] is false.
    pub fn boost(&mut self) -> ActionResult<()> {
        self.tick();
        let (here, stats) = self.assert_can_boost()?;
        let cells = self.world.grid.layout().locations_within(here, stats.action_radius_squared);
        let expires = self.world.round + BOOST_DURATION;
        let world = &mut *self.world;
        world.effects.apply(&mut world.grid, &cells, self.team, EffectKind::Boost, expires);
        self.world.charge_action(self.id, stats.action_cooldown);
        self.world
            .record_action(self.id, ActionKind::Boost, ActionTarget::Location(here));
        Ok(())
    }

    fn assert_can_destabilize(&self, loc: MapLocation) -> ActionResult<()> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_destabilize(), robot, "destabilize")?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, robot.kind().stats().action_radius_squared)
    }

    /// Whether destabilizing around `loc` would succeed now.
    #[must_use]
    pub fn can_destabilize(&self, loc: MapLocation) -> bool {
        self.tick();
        self.assert_can_destabilize(loc).is_ok()
    }

    /// Slow down enemy cooldowns around `loc` for the next few rounds.
    /// Each entry damages the enemy standing on its cell when it expires.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_destabilize`] is false.
    pub fn destabilize(&mut self, loc: MapLocation) -> ActionResult<()> {
        self.tick();
        self.assert_can_destabilize(loc)?;
        let cells = self.world.grid.layout().locations_within(loc, DESTABILIZE_RADIUS_SQUARED);
        let expires = self.world.round + DESTABILIZE_DURATION;
        let world = &mut *self.world;
        world
            .effects
            .apply(&mut world.grid, &cells, self.team.opponent(), EffectKind::Destabilize, expires);
        let cooldown = self.robot().map_or(0, |r| r.kind().stats().action_cooldown);
        self.world.charge_action(self.id, cooldown);
        self.world
            .record_action(self.id, ActionKind::Destabilize, ActionTarget::Location(loc));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_world, place};
    use super::*;
    use crate::world::{AnchorType, ResourceType, Team};

    #[test]
    fn test_duck_attack_damages_and_charges() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let enemy = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(11, 11));
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        controller.attack(MapLocation::new(11, 11)).unwrap();
        assert_eq!(controller.attack(MapLocation::new(11, 11)).unwrap_err().kind(), ActionErrorKind::NotReady);
        assert_eq!(world.robot(enemy).unwrap().health(), 1000 - 150);
        assert_eq!(world.robot(duck).unwrap().action_cooldown(), 20);
        assert_eq!(world.robot(duck).unwrap().experience(SkillType::Attack), 1);
    }

    #[test]
    fn test_attack_rejects_allies_bases_and_distance() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(18, 17));
        place(&mut world, Team::B, RobotType::Duck, 1, MapLocation::new(18, 18));
        let controller = RobotController::new(&mut world, duck).unwrap();
        assert_eq!(
            controller.assert_can_attack(MapLocation::new(18, 18)).unwrap_err().kind(),
            ActionErrorKind::IllegalTarget
        );
        assert_eq!(
            controller.assert_can_attack(MapLocation::new(18, 14)).unwrap_err().kind(),
            ActionErrorKind::OutOfRange
        );
        assert_eq!(
            controller.assert_can_attack(MapLocation::new(18, 16)).unwrap_err().kind(),
            ActionErrorKind::IllegalTarget
        );
    }

    #[test]
    fn test_carrier_throws_its_load() {
        let mut world = create_test_world(0);
        let carrier = place(&mut world, Team::A, RobotType::Carrier, 0, MapLocation::new(5, 5));
        let enemy = place(&mut world, Team::B, RobotType::Launcher, 0, MapLocation::new(6, 7));
        let controller = RobotController::new(&mut world, carrier).unwrap();
        assert_eq!(
            controller.assert_can_attack(MapLocation::new(6, 7)).unwrap_err().kind(),
            ActionErrorKind::InsufficientResource
        );
        world
            .registry
            .get_mut(carrier)
            .unwrap()
            .inventory_mut()
            .add_resource(ResourceType::Adamantium, 40);
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        controller.attack(MapLocation::new(6, 7)).unwrap();
        assert_eq!(world.robot(carrier).unwrap().inventory().weight(), 0);
        assert_eq!(world.robot(enemy).unwrap().health(), 200 - 50);
    }

    #[test]
    fn test_carrier_throw_ignores_anchors_and_attack_upgrade() {
        let mut world = create_test_world(0);
        world.ledger.grant_upgrade_points();
        world.ledger.buy_upgrade(Team::A, GlobalUpgrade::Attack).unwrap();
        let carrier = place(&mut world, Team::A, RobotType::Carrier, 0, MapLocation::new(5, 5));
        let enemy = place(&mut world, Team::B, RobotType::Launcher, 0, MapLocation::new(6, 7));
        let inventory = world.registry.get_mut(carrier).unwrap().inventory_mut();
        assert!(inventory.add_anchor(AnchorType::Standard, 1));
        let controller = RobotController::new(&mut world, carrier).unwrap();
        assert_eq!(
            controller.assert_can_attack(MapLocation::new(6, 7)).unwrap_err().kind(),
            ActionErrorKind::InsufficientResource
        );

        let inventory = world.registry.get_mut(carrier).unwrap().inventory_mut();
        assert!(inventory.add_anchor(AnchorType::Standard, -1));
        assert!(inventory.add_resource(ResourceType::Mana, 40));
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        controller.attack(MapLocation::new(6, 7)).unwrap();
        assert_eq!(world.robot(enemy).unwrap().health(), 200 - 50);
    }

    #[test]
    fn test_attack_upgrade_adds_to_duck_strikes() {
        let mut world = create_test_world(0);
        world.ledger.grant_upgrade_points();
        world.ledger.buy_upgrade(Team::A, GlobalUpgrade::Attack).unwrap();
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let enemy = place(&mut world, Team::B, RobotType::Duck, 0, MapLocation::new(11, 11));
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        controller.attack(MapLocation::new(11, 11)).unwrap();
        assert_eq!(world.robot(enemy).unwrap().health(), 1000 - 150 - 60);
    }

    #[test]
    fn test_heal_restores_ally_up_to_max() {
        let mut world = create_test_world(0);
        let medic = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(8, 8));
        let patient = place(&mut world, Team::A, RobotType::Duck, 1, MapLocation::new(9, 9));
        world.damage_robot(patient, 300);
        let mut controller = RobotController::new(&mut world, medic).unwrap();
        assert!(!controller.can_heal(MapLocation::new(8, 8)));
        controller.heal(MapLocation::new(9, 9)).unwrap();
        assert_eq!(world.robot(patient).unwrap().health(), 700 + 80);
        assert_eq!(world.robot(medic).unwrap().action_cooldown(), 20);
    }

    #[test]
    fn test_lethal_attack_destroys_target() {
        let mut world = create_test_world(0);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(10, 10));
        let enemy = place(&mut world, Team::B, RobotType::Carrier, 0, MapLocation::new(10, 11));
        let mut controller = RobotController::new(&mut world, duck).unwrap();
        controller.attack(MapLocation::new(10, 11)).unwrap();
        assert!(world.robot(enemy).is_none());
        assert!(!world.grid().is_wall(MapLocation::new(10, 11)));
        assert!(!world.robots().is_occupied(MapLocation::new(10, 11)));
    }

    #[test]
    fn test_boost_lowers_allied_multiplier() {
        let mut world = create_test_world(0);
        let booster = place(&mut world, Team::A, RobotType::Booster, 0, MapLocation::new(10, 10));
        let mut controller = RobotController::new(&mut world, booster).unwrap();
        controller.boost().unwrap();
        assert!(!controller.can_boost());
        let grid = world.grid();
        assert!((grid.cooldown_multiplier(MapLocation::new(13, 14), Team::A) - 0.9).abs() < 1e-9);
        assert!((grid.cooldown_multiplier(MapLocation::new(13, 14), Team::B) - 1.0).abs() < 1e-9);
        assert!((grid.cooldown_multiplier(MapLocation::new(16, 10), Team::A) - 1.0).abs() < 1e-9);
        assert_eq!(world.robot(booster).unwrap().action_cooldown(), 90);
    }

    #[test]
    fn test_destabilize_targets_the_opponent() {
        let mut world = create_test_world(0);
        let destabilizer = place(&mut world, Team::B, RobotType::Destabilizer, 0, MapLocation::new(10, 10));
        let mut controller = RobotController::new(&mut world, destabilizer).unwrap();
        assert_eq!(
            controller.destabilize(MapLocation::new(14, 10)).unwrap_err().kind(),
            ActionErrorKind::OutOfRange
        );
        controller.destabilize(MapLocation::new(12, 12)).unwrap();
        let grid = world.grid();
        assert!((grid.cooldown_multiplier(MapLocation::new(12, 15), Team::A) - 1.1).abs() < 1e-9);
        assert!((grid.cooldown_multiplier(MapLocation::new(12, 15), Team::B) - 1.0).abs() < 1e-9);
        assert_eq!(world.effects().stack_len(world.grid(), MapLocation::new(12, 12), Team::A, EffectKind::Destabilize), 1);
    }
}
