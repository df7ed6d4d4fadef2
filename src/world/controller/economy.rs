//! Wells, deliveries and anchors.

use log::{debug, info};

use crate::error::{ActionErrorKind, ActionResult, GameActionError};
use crate::recorder::{ActionKind, ActionTarget};

use super::super::constants::ANCHOR_WEIGHT;
use super::super::{AnchorType, MapLocation, ResourceType, RobotId};
use super::{RobotController, cant, illegal};

fn insufficient(message: impl Into<String>) -> GameActionError {
    GameActionError::new(ActionErrorKind::InsufficientResource, message)
}

/// Where a transfer ends up.
#[derive(Debug, Clone, Copy)]
enum Destination {
    Headquarters(RobotId),
    Well(usize),
}

impl RobotController<'_> {
    fn well_index(&self, loc: MapLocation) -> Option<usize> {
        self.world.wells.iter().position(|w| w.location() == loc)
    }

    fn allied_headquarters(&self, loc: MapLocation) -> Option<RobotId> {
        self.world
            .registry
            .robot_at(loc)
            .and_then(|id| self.world.registry.get(id))
            .filter(|r| r.team() == self.team && r.kind().is_base())
            .map(|r| r.id())
    }

    /// Charge the unit's base action cooldown and record the action.
    fn finish_plain_action(&mut self, kind: ActionKind, target: ActionTarget) {
        let base = self.robot().map_or(0, |r| r.kind().stats().action_cooldown);
        self.world.charge_action(self.id, base);
        self.world.record_action(self.id, kind, target);
    }

    fn assert_can_collect(&self, loc: MapLocation, amount: Option<i32>) -> ActionResult<(usize, i32)> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_extract(), robot, "collect resources")?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, robot.kind().stats().action_radius_squared)?;
        let index = self
            .well_index(loc)
            .ok_or_else(|| illegal(format!("no well on {loc}")))?;
        let rate = self.world.wells[index].rate(&self.world.config.wells);
        let amount = amount.unwrap_or(rate);
        if amount <= 0 || amount > rate {
            return Err(cant(format!("amount {amount} outside 1..={rate}")));
        }
        if !robot.inventory().can_add(amount) {
            return Err(cant("carrying capacity exceeded"));
        }
        Ok((index, amount))
    }

    /// Whether collecting `amount` (default: the well's rate) from the well
    /// on `loc` would succeed now.
    #[must_use]
    pub fn can_collect_resource(&self, loc: MapLocation, amount: Option<i32>) -> bool {
        self.tick();
        self.assert_can_collect(loc, amount).is_ok()
    }

    /// Collect from the well on `loc` into the inventory. The team ledger
    /// is credited at once.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_collect_resource`] is false.
    pub fn collect_resource(&mut self, loc: MapLocation, amount: Option<i32>) -> ActionResult<()> {
        self.tick();
        let (index, amount) = self.assert_can_collect(loc, amount)?;
        let kind = self.world.wells[index].kind();
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.inventory_mut().add_resource(kind, amount);
        }
        self.world.ledger_add(self.team, kind, amount);
        self.finish_plain_action(ActionKind::CollectResource, ActionTarget::Resource(kind, amount));
        Ok(())
    }

    fn assert_can_transfer(&self, loc: MapLocation, resource: ResourceType, amount: i32) -> ActionResult<Destination> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_extract(), robot, "transfer resources")?;
        if amount <= 0 {
            return Err(cant(format!("cannot transfer {amount}")));
        }
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, robot.kind().stats().action_radius_squared)?;
        if robot.inventory().resource(resource) < amount {
            return Err(insufficient(format!("carrying less than {amount} {resource:?}")));
        }
        if let Some(hq) = self.allied_headquarters(loc) {
            return Ok(Destination::Headquarters(hq));
        }
        let index = self
            .well_index(loc)
            .ok_or_else(|| illegal(format!("{loc} is neither an allied headquarters nor a well")))?;
        let mut cost = [0; 3];
        cost[resource.index()] = amount;
        if !self.world.ledger.can_afford(self.team, cost) {
            return Err(insufficient(format!("team holds less than {amount} {resource:?}")));
        }
        Ok(Destination::Well(index))
    }

    /// Whether handing `amount` of `resource` to `loc` would succeed now.
    #[must_use]
    pub fn can_transfer_resource(&self, loc: MapLocation, resource: ResourceType, amount: i32) -> bool {
        self.tick();
        self.assert_can_transfer(loc, resource, amount).is_ok()
    }

    /// Hand `amount` of carried `resource` to the allied headquarters or
    /// well on `loc`.
    ///
    /// Deliveries to a headquarters leave the team ledger alone; deposits
    /// into a well are debited from it and may convert or upgrade the well.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_transfer_resource`] is false.
    pub fn transfer_resource(&mut self, loc: MapLocation, resource: ResourceType, amount: i32) -> ActionResult<()> {
        self.tick();
        let destination = self.assert_can_transfer(loc, resource, amount)?;
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.inventory_mut().add_resource(resource, -amount);
        }
        match destination {
            Destination::Headquarters(hq) => {
                if let Some(base) = self.world.registry.get_mut(hq) {
                    base.inventory_mut().add_resource(resource, amount);
                }
            }
            Destination::Well(index) => {
                let rules = self.world.config.wells;
                let well = &mut self.world.wells[index];
                let before = well.kind();
                well.deposit(resource, amount, &rules);
                if well.kind() != before {
                    info!("well at {loc} converted from {before:?} to {:?}", well.kind());
                }
                self.world.ledger_add(self.team, resource, -amount);
            }
        }
        self.finish_plain_action(ActionKind::TransferResource, ActionTarget::Resource(resource, amount));
        Ok(())
    }

    fn assert_can_build_anchor(&self, anchor: AnchorType) -> ActionResult<()> {
        let (robot, _) = self.spawned()?;
        Self::capability(robot.kind().can_build_anchor(), robot, "build anchors")?;
        Self::assert_action_ready(robot)?;
        let cost = anchor.build_cost();
        if !self.world.ledger.can_afford(self.team, cost) {
            return Err(insufficient(format!("{anchor:?} anchor costs {cost:?}")));
        }
        Ok(())
    }

    /// Whether this headquarters could build an `anchor` now.
    #[must_use]
    pub fn can_build_anchor(&self, anchor: AnchorType) -> bool {
        self.tick();
        self.assert_can_build_anchor(anchor).is_ok()
    }

    /// Build an anchor into this headquarters' inventory.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_build_anchor`] is false.
    pub fn build_anchor(&mut self, anchor: AnchorType) -> ActionResult<()> {
        self.tick();
        self.assert_can_build_anchor(anchor)?;
        self.world.ledger_spend(self.team, anchor.build_cost());
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.inventory_mut().add_anchor(anchor, 1);
        }
        self.finish_plain_action(ActionKind::BuildAnchor, ActionTarget::Anchor(anchor));
        Ok(())
    }

    fn assert_can_take_anchor(&self, loc: MapLocation, anchor: Option<AnchorType>) -> ActionResult<(RobotId, AnchorType)> {
        let (robot, from) = self.spawned()?;
        Self::capability(robot.kind().can_place_anchor(), robot, "carry anchors")?;
        Self::assert_action_ready(robot)?;
        self.assert_reachable(from, loc, robot.kind().stats().action_radius_squared)?;
        let hq = self
            .allied_headquarters(loc)
            .ok_or_else(|| illegal(format!("no allied headquarters on {loc}")))?;
        if robot.inventory().total_anchors() > 0 {
            return Err(cant("already carrying an anchor"));
        }
        let stock = self
            .world
            .registry
            .get(hq)
            .map(|base| *base.inventory())
            .ok_or_else(|| illegal(format!("no allied headquarters on {loc}")))?;
        let anchor = anchor
            .or_else(|| stock.preferred_anchor())
            .ok_or_else(|| insufficient("headquarters holds no anchor"))?;
        if stock.anchors(anchor) == 0 {
            return Err(insufficient(format!("headquarters holds no {anchor:?} anchor")));
        }
        if !robot.inventory().can_add(ANCHOR_WEIGHT) {
            return Err(cant("no room for an anchor"));
        }
        Ok((hq, anchor))
    }

    /// Whether an anchor could be taken from the headquarters on `loc` now.
    /// `None` takes whichever anchor the headquarters would hand out first.
    #[must_use]
    pub fn can_take_anchor(&self, loc: MapLocation, anchor: Option<AnchorType>) -> bool {
        self.tick();
        self.assert_can_take_anchor(loc, anchor).is_ok()
    }

    /// Take one anchor from the allied headquarters on `loc`.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_take_anchor`] is false.
    pub fn take_anchor(&mut self, loc: MapLocation, anchor: Option<AnchorType>) -> ActionResult<()> {
        self.tick();
        let (hq, anchor) = self.assert_can_take_anchor(loc, anchor)?;
        if let Some(base) = self.world.registry.get_mut(hq) {
            base.inventory_mut().add_anchor(anchor, -1);
        }
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.inventory_mut().add_anchor(anchor, 1);
        }
        self.finish_plain_action(ActionKind::TakeAnchor, ActionTarget::Anchor(anchor));
        Ok(())
    }

    fn assert_can_place_anchor(&self) -> ActionResult<(usize, AnchorType)> {
        let (robot, here) = self.spawned()?;
        Self::capability(robot.kind().can_place_anchor(), robot, "place anchors")?;
        Self::assert_action_ready(robot)?;
        let anchor = robot
            .inventory()
            .preferred_anchor()
            .ok_or_else(|| cant("not carrying an anchor"))?;
        let index = self
            .world
            .grid
            .island(here)
            .and_then(|id| self.world.island_index(id))
            .ok_or_else(|| illegal(format!("{here} is not on an island")))?;
        if !self.world.islands[index].can_place_anchor(self.team) {
            return Err(illegal("island is held by the opponent"));
        }
        Ok((index, anchor))
    }

    /// Whether the carried anchor could be planted where the robot stands.
    #[must_use]
    pub fn can_place_anchor(&self) -> bool {
        self.tick();
        self.assert_can_place_anchor().is_ok()
    }

    /// Plant the carried anchor on the island under the robot, replacing
    /// any allied anchor already there.
    ///
    /// # Errors
    ///
    /// Fails without side effects when [`RobotController::can_place_anchor`] is false.
    pub fn place_anchor(&mut self) -> ActionResult<()> {
        self.tick();
        let (index, anchor) = self.assert_can_place_anchor()?;
        if let Some(robot) = self.world.registry.get_mut(self.id) {
            robot.inventory_mut().add_anchor(anchor, -1);
        }
        let world = &mut *self.world;
        let previous = world.islands[index].place_anchor(self.team, anchor);
        let reach = &world.island_reach[index];
        if previous.and_then(AnchorType::acceleration_radius_squared).is_some() {
            world.effects.remove_anchor(&mut world.grid, reach, self.team);
        }
        if anchor.acceleration_radius_squared().is_some() {
            world.effects.add_anchor(&mut world.grid, reach, self.team);
        }
        let island = world.islands[index].id();
        debug!("{:?} planted a {anchor:?} anchor on island {island}", self.team);
        self.finish_plain_action(ActionKind::PlaceAnchor, ActionTarget::Island(island));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_world, place};
    use super::*;
    use crate::world::{GameWorld, RobotType, Team, Well};

    fn create_test_well(world: &mut GameWorld, loc: MapLocation, kind: ResourceType) {
        world.wells.push(Well::new(loc, kind));
    }

    #[test]
    fn test_collect_credits_inventory_and_ledger() {
        let mut world = create_test_world(0);
        create_test_well(&mut world, MapLocation::new(6, 6), ResourceType::Mana);
        let carrier = place(&mut world, Team::A, RobotType::Carrier, 0, MapLocation::new(5, 5));
        let before = world.ledger().resource(Team::A, ResourceType::Mana);
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        assert!(!controller.can_collect_resource(MapLocation::new(6, 6), Some(3)));
        assert!(!controller.can_collect_resource(MapLocation::new(5, 6), None));
        controller.collect_resource(MapLocation::new(6, 6), None).unwrap();
        assert_eq!(world.robot(carrier).unwrap().inventory().resource(ResourceType::Mana), 2);
        assert_eq!(world.ledger().resource(Team::A, ResourceType::Mana), before + 2);
        assert_eq!(world.robot(carrier).unwrap().action_cooldown(), 10);
    }

    #[test]
    fn test_transfer_to_headquarters_keeps_ledger() {
        let mut world = create_test_world(0);
        let carrier = place(&mut world, Team::A, RobotType::Carrier, 0, MapLocation::new(2, 1));
        world
            .registry
            .get_mut(carrier)
            .unwrap()
            .inventory_mut()
            .add_resource(ResourceType::Adamantium, 10);
        let before = world.ledger().resources(Team::A);
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        assert!(!controller.can_transfer_resource(MapLocation::new(0, 0), ResourceType::Adamantium, 11));
        assert!(!controller.can_transfer_resource(MapLocation::new(0, 0), ResourceType::Adamantium, 0));
        controller
            .transfer_resource(MapLocation::new(0, 0), ResourceType::Adamantium, 10)
            .unwrap();
        let hq = world.robots().robot_at(MapLocation::new(0, 0)).unwrap();
        assert_eq!(world.robot(hq).unwrap().inventory().resource(ResourceType::Adamantium), 10);
        assert_eq!(world.robot(carrier).unwrap().inventory().weight(), 0);
        assert_eq!(world.ledger().resources(Team::A), before);
    }

    #[test]
    fn test_transfer_to_well_debits_ledger() {
        let mut world = create_test_world(0);
        create_test_well(&mut world, MapLocation::new(7, 5), ResourceType::Mana);
        let carrier = place(&mut world, Team::B, RobotType::Carrier, 0, MapLocation::new(5, 5));
        world
            .registry
            .get_mut(carrier)
            .unwrap()
            .inventory_mut()
            .add_resource(ResourceType::Adamantium, 30);
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        controller
            .transfer_resource(MapLocation::new(7, 5), ResourceType::Adamantium, 30)
            .unwrap();
        assert_eq!(world.ledger().resource(Team::B, ResourceType::Adamantium), 970);
        assert_eq!(world.wells()[0].inventory(), [30, 0, 0]);
    }

    #[test]
    fn test_anchor_round_trip_onto_island() {
        let mut world = create_test_world(0);
        let hq = world.robots().robot_at(MapLocation::new(0, 0)).unwrap();
        let controller = RobotController::new(&mut world, hq).unwrap();
        assert_eq!(
            controller.assert_can_build_anchor(AnchorType::Standard).unwrap_err().kind(),
            ActionErrorKind::NotReady
        );
        world.registry.get_mut(hq).unwrap().process_beginning_of_turn();
        let mut controller = RobotController::new(&mut world, hq).unwrap();
        assert!(controller.can_build_anchor(AnchorType::Accelerating));
        controller.build_anchor(AnchorType::Standard).unwrap();
        assert_eq!(world.ledger().resources(Team::A), [920, 920, 1000]);

        let carrier = place(&mut world, Team::A, RobotType::Carrier, 0, MapLocation::new(1, 1));
        let mut controller = RobotController::new(&mut world, carrier).unwrap();
        controller.take_anchor(MapLocation::new(0, 0), None).unwrap();
        assert_eq!(world.robot(carrier).unwrap().inventory().weight(), ANCHOR_WEIGHT);
        assert_eq!(world.robot(hq).unwrap().inventory().total_anchors(), 0);

        let controller = RobotController::new(&mut world, carrier).unwrap();
        assert_eq!(
            controller.assert_can_place_anchor().unwrap_err().kind(),
            ActionErrorKind::NotReady
        );
        world.registry.get_mut(carrier).unwrap().process_beginning_of_turn();
        let controller = RobotController::new(&mut world, carrier).unwrap();
        assert_eq!(
            controller.assert_can_place_anchor().unwrap_err().kind(),
            ActionErrorKind::IllegalTarget
        );
    }

    #[test]
    fn test_non_carriers_cannot_collect() {
        let mut world = create_test_world(0);
        create_test_well(&mut world, MapLocation::new(6, 6), ResourceType::Mana);
        let duck = place(&mut world, Team::A, RobotType::Duck, 0, MapLocation::new(5, 5));
        let controller = RobotController::new(&mut world, duck).unwrap();
        assert_eq!(
            controller.assert_can_collect(MapLocation::new(6, 6), None).unwrap_err().kind(),
            ActionErrorKind::CantDoThat
        );
    }
}
