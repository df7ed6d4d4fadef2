//! Robot state: lifecycle, health, cooldowns, experience and annotations.

use serde::{Deserialize, Serialize};

use super::constants::{COOLDOWN_LIMIT, COOLDOWNS_PER_TURN, INDICATOR_STRING_MAX_LENGTH};
use super::{Inventory, MapLocation, RobotId, RobotType, SkillType, Team};

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotState {
    /// Exists but is not on the map. Only a spawn request is honoured.
    Despawned,
    /// On the map and acting.
    Spawned,
    /// Gone for good.
    Destroyed,
}

/// Result of a health change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    /// Robot is still alive with this much health.
    Alive(i32),
    /// Health reached zero; the caller must destroy the robot now.
    Depleted,
}

/// A debug dot or line drawn by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    /// A coloured dot.
    Dot {
        /// Where.
        location: MapLocation,
        /// RGB colour.
        color: [u8; 3],
    },
    /// A coloured line.
    Line {
        /// Start.
        from: MapLocation,
        /// End.
        to: MapLocation,
        /// RGB colour.
        color: [u8; 3],
    },
}

/// One robot.
#[derive(Debug, Clone)]
pub struct Robot {
    id: RobotId,
    team: Team,
    kind: RobotType,
    state: RobotState,
    location: Option<MapLocation>,
    health: i32,
    inventory: Inventory,
    action_cooldown: i32,
    movement_cooldown: i32,
    rounds_alive: u32,
    experience: [i32; 3],
    indicator_string: String,
    indicators: Vec<Indicator>,
    instructions_used: u32,
}

impl Robot {
    /// A new, despawned robot.
    #[must_use]
    pub fn new(id: RobotId, team: Team, kind: RobotType) -> Self {
        let stats = kind.stats();
        Self {
            id,
            team,
            kind,
            state: RobotState::Despawned,
            location: None,
            health: stats.health,
            inventory: Inventory::new(stats.capacity),
            action_cooldown: COOLDOWN_LIMIT,
            movement_cooldown: COOLDOWN_LIMIT,
            rounds_alive: 0,
            experience: [0; 3],
            indicator_string: String::new(),
            indicators: Vec::new(),
            instructions_used: 0,
        }
    }

    /// Robot id.
    #[must_use]
    pub const fn id(&self) -> RobotId {
        self.id
    }

    /// Team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Unit type.
    #[must_use]
    pub const fn kind(&self) -> RobotType {
        self.kind
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RobotState {
        self.state
    }

    /// Whether the robot is on the map.
    #[must_use]
    pub const fn is_spawned(&self) -> bool {
        matches!(self.state, RobotState::Spawned)
    }

    /// Location, `None` unless spawned.
    #[must_use]
    pub const fn location(&self) -> Option<MapLocation> {
        self.location
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health for this type.
    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.kind.stats().health
    }

    /// Inventory.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable inventory.
    pub const fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Action cooldown counter.
    #[must_use]
    pub const fn action_cooldown(&self) -> i32 {
        self.action_cooldown
    }

    /// Movement cooldown counter.
    #[must_use]
    pub const fn movement_cooldown(&self) -> i32 {
        self.movement_cooldown
    }

    /// Whether the action counter is below the limit.
    #[must_use]
    pub const fn is_action_ready(&self) -> bool {
        self.action_cooldown < COOLDOWN_LIMIT
    }

    /// Whether the movement counter is below the limit.
    #[must_use]
    pub const fn is_movement_ready(&self) -> bool {
        self.movement_cooldown < COOLDOWN_LIMIT
    }

    /// Completed turns.
    #[must_use]
    pub const fn rounds_alive(&self) -> u32 {
        self.rounds_alive
    }

    /// Experience in `skill`.
    #[must_use]
    pub const fn experience(&self, skill: SkillType) -> i32 {
        self.experience[skill.index()]
    }

    /// Level in `skill`.
    #[must_use]
    pub fn level(&self, skill: SkillType) -> usize {
        skill.level(self.experience(skill))
    }

    /// Highest level across all skills.
    #[must_use]
    pub fn tier(&self) -> usize {
        SkillType::ALL.iter().map(|&s| self.level(s)).max().unwrap_or(0)
    }

    /// Indicator string set this round.
    #[must_use]
    pub fn indicator_string(&self) -> &str {
        &self.indicator_string
    }

    /// Indicator dots and lines drawn this round.
    #[must_use]
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    /// Instructions reported for the last turn.
    #[must_use]
    pub const fn instructions_used(&self) -> u32 {
        self.instructions_used
    }

    /// Put the robot on the map at full health.
    pub fn spawn(&mut self, at: MapLocation) {
        self.state = RobotState::Spawned;
        self.location = Some(at);
        self.health = self.max_health();
    }

    /// Take the robot off the map without destroying it.
    pub fn despawn(&mut self) {
        self.state = RobotState::Despawned;
        self.location = None;
    }

    /// Mark the robot destroyed.
    pub fn destroy(&mut self) {
        self.state = RobotState::Destroyed;
        self.location = None;
        self.health = 0;
    }

    /// Update the location of a spawned robot.
    pub fn set_location(&mut self, at: MapLocation) {
        if self.is_spawned() {
            self.location = Some(at);
        }
    }

    /// Apply a health delta, capped at the maximum.
    ///
    /// A result at or below zero is reported as [`HealthChange::Depleted`];
    /// the stored health is left at its previous value so the robot is never
    /// observable alive with non-positive health.
    pub fn change_health(&mut self, delta: i32) -> HealthChange {
        let next = self.health.saturating_add(delta).min(self.max_health());
        if next <= 0 {
            return HealthChange::Depleted;
        }
        self.health = next;
        HealthChange::Alive(next)
    }

    /// Restore up to `amount` health, capped at the maximum. Negative
    /// amounts are ignored.
    pub fn heal(&mut self, amount: i32) {
        self.health = self.health.saturating_add(amount.max(0)).min(self.max_health());
    }

    /// Add to the action counter.
    pub const fn add_action_cooldown(&mut self, amount: i32) {
        self.action_cooldown = self.action_cooldown.saturating_add(amount);
    }

    /// Add to the movement counter.
    pub const fn add_movement_cooldown(&mut self, amount: i32) {
        self.movement_cooldown = self.movement_cooldown.saturating_add(amount);
    }

    /// Raise both counters to at least `lock`.
    pub fn lock_cooldowns(&mut self, lock: i32) {
        self.action_cooldown = self.action_cooldown.max(lock);
        self.movement_cooldown = self.movement_cooldown.max(lock);
    }

    /// Gain experience in `skill`.
    pub const fn add_experience(&mut self, skill: SkillType, amount: i32) {
        self.experience[skill.index()] += amount;
    }

    /// Set the indicator string, truncated to the maximum length.
    pub fn set_indicator_string(&mut self, text: &str) {
        self.indicator_string = text.chars().take(INDICATOR_STRING_MAX_LENGTH).collect();
    }

    /// Record an indicator dot or line.
    pub fn add_indicator(&mut self, indicator: Indicator) {
        self.indicators.push(indicator);
    }

    /// Begin-of-round hook: clear transient annotations.
    pub fn process_beginning_of_round(&mut self) {
        self.indicator_string.clear();
        self.indicators.clear();
    }

    /// Begin-of-turn hook: decay both cooldowns, floored at zero.
    pub fn process_beginning_of_turn(&mut self) {
        self.action_cooldown = (self.action_cooldown - COOLDOWNS_PER_TURN).max(0);
        self.movement_cooldown = (self.movement_cooldown - COOLDOWNS_PER_TURN).max(0);
    }

    /// Record the instruction count for this turn.
    pub const fn set_instructions_used(&mut self, instructions: u32) {
        self.instructions_used = instructions;
    }

    /// End-of-turn hook.
    pub const fn process_end_of_turn(&mut self) {
        self.rounds_alive += 1;
    }
}
