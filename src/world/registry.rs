//! Robot registry with a per-cell occupancy index.

use std::collections::BTreeMap;

use crate::error::EngineError;

use super::{Layout, MapLocation, Robot, RobotId, Team};

/// Owns every non-destroyed robot and tracks which cell each one occupies.
#[derive(Debug, Clone)]
pub struct Registry {
    layout: Layout,
    robots: BTreeMap<RobotId, Robot>,
    occupancy: Vec<Option<RobotId>>,
}

impl Registry {
    /// An empty registry for a map with `layout`.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            robots: BTreeMap::new(),
            occupancy: vec![None; layout.area()],
        }
    }

    /// Register a robot. Spawned robots are placed on their cell.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken or the robot's cell is occupied or off the map.
    pub fn insert(&mut self, robot: Robot) -> Result<(), EngineError> {
        let id = robot.id();
        if self.robots.contains_key(&id) {
            return Err(EngineError::Inconsistent(format!("duplicate robot id {id}")));
        }
        if let Some(loc) = robot.location() {
            self.occupy(id, loc)?;
        }
        self.robots.insert(id, robot);
        Ok(())
    }

    /// Look up a robot.
    #[must_use]
    pub fn get(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(&id)
    }

    /// Look up a robot mutably.
    ///
    /// Changing a robot's location through this handle bypasses the
    /// occupancy index; use [`Registry::relocate`] instead.
    pub fn get_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(&id)
    }

    /// Robot standing on `loc`.
    #[must_use]
    pub fn robot_at(&self, loc: MapLocation) -> Option<RobotId> {
        self.layout.index(loc).and_then(|i| self.occupancy[i])
    }

    /// Whether `loc` holds a robot.
    #[must_use]
    pub fn is_occupied(&self, loc: MapLocation) -> bool {
        self.robot_at(loc).is_some()
    }

    /// Every registered robot in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Robot> {
        self.robots.values()
    }

    /// Every registered robot, mutably, in id order. Same caveat as
    /// [`Registry::get_mut`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Robot> {
        self.robots.values_mut()
    }

    /// Every registered robot of `team` in id order.
    pub fn team(&self, team: Team) -> impl Iterator<Item = &Robot> {
        self.robots.values().filter(move |r| r.team() == team)
    }

    /// Number of registered robots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    /// Whether no robots are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    /// Turn order: ascending by rounds alive, then by id.
    #[must_use]
    pub fn execution_order(&self) -> Vec<RobotId> {
        let mut order: Vec<(u32, RobotId)> = self
            .robots
            .values()
            .map(|r| (r.rounds_alive(), r.id()))
            .collect();
        order.sort_by_key(|&(age, id)| (age, id));
        order.into_iter().map(|(_, id)| id).collect()
    }

    /// Put a despawned robot on `loc`.
    ///
    /// # Errors
    ///
    /// Fails if the robot is unknown or the cell is occupied or off the map.
    pub fn spawn(&mut self, id: RobotId, loc: MapLocation) -> Result<(), EngineError> {
        if !self.robots.contains_key(&id) {
            return Err(EngineError::UnknownRobot(id));
        }
        self.occupy(id, loc)?;
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.spawn(loc);
        }
        Ok(())
    }

    /// Move a spawned robot to `to`.
    ///
    /// # Errors
    ///
    /// Fails if the robot is unknown or not spawned, or `to` is occupied.
    pub fn relocate(&mut self, id: RobotId, to: MapLocation) -> Result<(), EngineError> {
        let from = self
            .robots
            .get(&id)
            .ok_or(EngineError::UnknownRobot(id))?
            .location()
            .ok_or_else(|| EngineError::Inconsistent(format!("relocating unspawned robot {id}")))?;
        if from == to {
            return Ok(());
        }
        self.occupy(id, to)?;
        self.vacate(from);
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.set_location(to);
        }
        Ok(())
    }

    /// Move several robots at once. All are lifted before any is placed,
    /// so chains and swaps resolve without order dependence.
    ///
    /// # Errors
    ///
    /// Fails if any destination is occupied after lifting.
    pub fn relocate_all(&mut self, moves: &[(RobotId, MapLocation)]) -> Result<(), EngineError> {
        for &(id, _) in moves {
            if let Some(from) = self.robots.get(&id).and_then(Robot::location) {
                self.vacate(from);
            }
        }
        for &(id, to) in moves {
            self.occupy(id, to)?;
            if let Some(robot) = self.robots.get_mut(&id) {
                robot.set_location(to);
            }
        }
        Ok(())
    }

    /// Take a spawned robot off the map.
    pub fn despawn(&mut self, id: RobotId) {
        if let Some(loc) = self.robots.get(&id).and_then(Robot::location) {
            self.vacate(loc);
        }
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.despawn();
        }
    }

    /// Remove a robot for good, returning it marked destroyed.
    pub fn remove(&mut self, id: RobotId) -> Option<Robot> {
        let mut robot = self.robots.remove(&id)?;
        if let Some(loc) = robot.location() {
            self.vacate(loc);
        }
        robot.destroy();
        Some(robot)
    }

    /// Occupancy index entries that disagree with robot locations.
    #[must_use]
    pub fn occupancy_mismatches(&self) -> Vec<MapLocation> {
        let mut bad = Vec::new();
        for (i, slot) in self.occupancy.iter().enumerate() {
            let loc = self.layout.location(i);
            let ok = match slot {
                Some(id) => self.robots.get(id).and_then(Robot::location) == Some(loc),
                None => true,
            };
            if !ok {
                bad.push(loc);
            }
        }
        for robot in self.robots.values() {
            if let Some(loc) = robot.location() {
                if self.robot_at(loc) != Some(robot.id()) {
                    bad.push(loc);
                }
            }
        }
        bad
    }

    fn occupy(&mut self, id: RobotId, loc: MapLocation) -> Result<(), EngineError> {
        let index = self
            .layout
            .index(loc)
            .ok_or_else(|| EngineError::Inconsistent(format!("placing robot {id} off the map at {loc}")))?;
        match self.occupancy[index] {
            Some(other) if other != id => Err(EngineError::Occupied(loc)),
            _ => {
                self.occupancy[index] = Some(id);
                Ok(())
            }
        }
    }

    fn vacate(&mut self, loc: MapLocation) {
        if let Some(i) = self.layout.index(loc) {
            self.occupancy[i] = None;
        }
    }
}
