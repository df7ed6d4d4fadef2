//! The world: every subsystem of one match plus the mutations that span
//! several of them.

use std::collections::BTreeSet;

use log::{debug, error, info};

use crate::config::MatchConfig;
use crate::error::{EngineError, MapError};
use crate::recorder::{ActionKind, ActionTarget, MatchHeader, MatchLog, RoundEvent, RoundRecorder};

use super::constants::{FLAG_BROADCAST_NOISE_RADIUS, NUMBER_FLAGS};
use super::{
    AnchorType, DominationFactor, EffectStacks, Flag, FlagId, FlagRegistry, Grid, HealthChange,
    Island, IslandId, MapLocation, MapSnapshot, MatchContext, MatchOutcome, Registry, ResourceType, Robot,
    RobotId, RobotType, Symmetry, Team, TeamLedger, TrapId, TrapRegistry, TrapType, Well,
};

/// Complete state of one match.
#[derive(Debug)]
pub struct GameWorld {
    pub(super) config: MatchConfig,
    pub(super) name: String,
    pub(super) symmetry: Symmetry,
    pub(super) grid: Grid,
    pub(super) registry: Registry,
    pub(super) flags: FlagRegistry,
    pub(super) traps: TrapRegistry,
    pub(super) wells: Vec<Well>,
    pub(super) islands: Vec<Island>,
    pub(super) island_reach: Vec<Vec<MapLocation>>,
    pub(super) effects: EffectStacks,
    pub(super) ledger: TeamLedger,
    pub(super) ctx: MatchContext,
    pub(super) recorder: RoundRecorder,
    pub(super) round: u32,
    pub(super) round_limit: u32,
    pub(super) running: bool,
    pub(super) outcome: Option<MatchOutcome>,
    pub(super) pending_spawns: Vec<RobotId>,
    pub(super) pending_kills: Vec<RobotId>,
    pub(super) engine_fault: Option<EngineError>,
}

impl GameWorld {
    /// Build the world for `map` under `config`.
    ///
    /// Headquarters are placed first, then one despawned robot per roster
    /// slot, alternating teams, then flags, islands and wells.
    ///
    /// # Errors
    ///
    /// Fails on structurally broken maps or overlapping headquarters.
    pub fn new(map: &MapSnapshot, config: MatchConfig) -> Result<Self, MapError> {
        map.check_structure()?;
        let layout = map.layout();
        let seed = config.seed.unwrap_or(map.seed);
        let round_limit = config.max_rounds.unwrap_or(map.rounds);
        let mut ctx = MatchContext::new(seed);
        let grid = Grid::from_layers(layout, map.terrain());
        let mut registry = Registry::new(layout);
        let mut recorder = RoundRecorder::new(
            MatchHeader {
                map: map.name.clone(),
                width: map.width,
                height: map.height,
                seed,
                round_limit,
            },
            config.record_indicators,
        );

        let mut pending_spawns = Vec::new();
        for hq in &map.headquarters {
            let id = ctx.next_robot_id();
            let mut robot = Robot::new(id, hq.team, RobotType::Headquarters);
            robot.spawn(hq.location);
            registry.insert(robot).map_err(|_| MapError::Overlap {
                location: hq.location,
                what: "headquarters",
            })?;
            recorder.record(RoundEvent::Spawned {
                id,
                team: hq.team,
                kind: RobotType::Headquarters,
                location: hq.location,
            });
            pending_spawns.push(id);
        }
        for &kind in &map.roster {
            for team in Team::ALL {
                let id = ctx.next_robot_id();
                registry
                    .insert(Robot::new(id, team, kind))
                    .map_err(|_| MapError::Overlap { location: MapLocation::default(), what: "robot slot" })?;
            }
        }

        let mut flags = FlagRegistry::new();
        for placement in &map.flags {
            flags.insert(Flag::new(ctx.next_flag_id(), placement.team, placement.location));
        }

        let radius = AnchorType::Accelerating.acceleration_radius_squared().unwrap_or(0);
        let mut islands = Vec::new();
        let mut island_reach = Vec::new();
        for id in 1..=map.island_count() {
            let cells: Vec<MapLocation> = layout
                .all_locations()
                .filter(|loc| grid.island(*loc) == Some(IslandId(id)))
                .collect();
            let reach: BTreeSet<MapLocation> = cells
                .iter()
                .flat_map(|cell| layout.locations_within(*cell, radius))
                .collect();
            islands.push(Island::new(IslandId(id), cells));
            island_reach.push(reach.into_iter().collect());
        }

        let wells = map.wells.iter().map(|w| Well::new(w.location, w.kind)).collect();

        info!(
            "match on {} ({}x{}), seed {seed}, {round_limit} rounds",
            map.name, map.width, map.height
        );

        Ok(Self {
            config,
            name: map.name.clone(),
            symmetry: map.symmetry,
            grid,
            registry,
            flags,
            traps: TrapRegistry::new(layout),
            wells,
            islands,
            island_reach,
            effects: EffectStacks::new(),
            ledger: TeamLedger::new(),
            ctx,
            recorder,
            round: 0,
            round_limit,
            running: true,
            outcome: None,
            pending_spawns,
            pending_kills: Vec::new(),
            engine_fault: None,
        })
    }

    /// Map name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared map symmetry.
    #[must_use]
    pub const fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Effective match seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.ctx.seed()
    }

    /// Match configuration.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Current round, 0 before the first round runs.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Round limit.
    #[must_use]
    pub const fn round_limit(&self) -> u32 {
        self.round_limit
    }

    /// Whether rounds are still being played.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Final result once decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Whether the current round belongs to the setup phase.
    #[must_use]
    pub const fn is_setup_phase(&self) -> bool {
        self.round <= self.config.setup_rounds
    }

    /// Terrain grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Robot registry.
    #[must_use]
    pub const fn robots(&self) -> &Registry {
        &self.registry
    }

    /// Look up a robot.
    #[must_use]
    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.registry.get(id)
    }

    /// Flag registry.
    #[must_use]
    pub const fn flags(&self) -> &FlagRegistry {
        &self.flags
    }

    /// Trap registry.
    #[must_use]
    pub const fn traps(&self) -> &TrapRegistry {
        &self.traps
    }

    /// Wells.
    #[must_use]
    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    /// Islands in id order.
    #[must_use]
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Active boost, destabilize and anchor effects.
    #[must_use]
    pub const fn effects(&self) -> &EffectStacks {
        &self.effects
    }

    /// Team ledger.
    #[must_use]
    pub const fn ledger(&self) -> &TeamLedger {
        &self.ledger
    }

    /// The match log recorded so far.
    #[must_use]
    pub const fn log(&self) -> &MatchLog {
        self.recorder.log()
    }

    /// Consume the world, returning its match log.
    #[must_use]
    pub fn into_log(self) -> MatchLog {
        self.recorder.into_log()
    }

    pub(super) fn island_index(&self, id: IslandId) -> Option<usize> {
        self.islands.iter().position(|i| i.id() == id)
    }

    /// Record an engine fault; the round loop abandons the round on it.
    pub(super) fn fault(&mut self, err: impl Into<EngineError>) {
        let err = err.into();
        error!("engine fault in round {}: {err}", self.round);
        if self.engine_fault.is_none() {
            self.engine_fault = Some(err);
        }
    }

    pub(super) fn record_action(&mut self, actor: RobotId, kind: ActionKind, target: ActionTarget) {
        self.recorder.record_action(actor, kind, target);
    }

    /// Change a ledger balance, turning a refusal into an engine fault.
    pub(super) fn ledger_add(&mut self, team: Team, resource: ResourceType, delta: i32) {
        if let Err(err) = self.ledger.add(team, resource, delta) {
            self.fault(err);
        }
    }

    /// Pay a cost, turning a refusal into an engine fault.
    pub(super) fn ledger_spend(&mut self, team: Team, cost: [i32; 3]) {
        if let Err(err) = self.ledger.spend(team, cost) {
            self.fault(err);
        }
    }

    /// Put the flag carried by `id` down where the robot stands.
    fn release_flag(&mut self, id: RobotId) {
        let Some(flag) = self.flags.carried_by(id).map(Flag::id) else {
            return;
        };
        let Some(loc) = self.registry.get(id).and_then(Robot::location) else {
            return;
        };
        self.flags.drop_at(flag, loc);
        self.record_action(id, ActionKind::DropFlag, ActionTarget::Flag(flag));
    }

    /// Destroy a robot for good.
    pub(super) fn destroy_robot(&mut self, id: RobotId) {
        self.release_flag(id);
        if let Some(robot) = self.registry.remove(id) {
            debug!("robot {id} ({:?} {:?}) destroyed in round {}", robot.team(), robot.kind(), self.round);
            self.recorder.record(RoundEvent::Died { id });
            self.pending_kills.push(id);
        }
    }

    /// Take a robot off the map without destroying it.
    pub(super) fn despawn_robot(&mut self, id: RobotId) {
        if !self.registry.get(id).is_some_and(Robot::is_spawned) {
            return;
        }
        self.release_flag(id);
        self.registry.despawn(id);
        self.recorder.record(RoundEvent::Despawned { id });
    }

    /// Put a despawned robot on `loc`.
    pub(super) fn spawn_robot(&mut self, id: RobotId, loc: MapLocation) {
        if let Err(err) = self.registry.spawn(id, loc) {
            self.fault(err);
            return;
        }
        if let Some(robot) = self.registry.get(id) {
            let (team, kind) = (robot.team(), robot.kind());
            self.recorder.record(RoundEvent::Spawned { id, team, kind, location: loc });
        }
        self.pending_spawns.push(id);
        self.collect_bread(id, loc);
    }

    /// Apply damage. Headquarters are immune. Returns whether the robot died.
    pub(super) fn damage_robot(&mut self, id: RobotId, amount: i32) -> bool {
        let Some(robot) = self.registry.get_mut(id) else {
            return false;
        };
        if robot.kind().is_base() || amount <= 0 {
            return false;
        }
        match robot.change_health(-amount) {
            HealthChange::Alive(_) => false,
            HealthChange::Depleted => {
                self.destroy_robot(id);
                true
            }
        }
    }

    /// Restore health, capped at the maximum.
    pub(super) fn heal_robot(&mut self, id: RobotId, amount: i32) {
        if let Some(robot) = self.registry.get_mut(id) {
            robot.heal(amount);
        }
    }

    /// Add a skill-scaled action cooldown for `base` at the robot's cell.
    pub(super) fn charge_action(&mut self, id: RobotId, base: i32) {
        let Some(robot) = self.registry.get(id) else {
            return;
        };
        let Some(loc) = robot.location() else {
            return;
        };
        let cost = self.grid.scaled_cooldown(base, loc, robot.team());
        if let Some(robot) = self.registry.get_mut(id) {
            robot.add_action_cooldown(cost);
        }
    }

    /// Add the movement cooldown for `base` at the robot's cell.
    pub(super) fn charge_movement(&mut self, id: RobotId, base: i32) {
        let Some(robot) = self.registry.get(id) else {
            return;
        };
        let Some(loc) = robot.location() else {
            return;
        };
        let cost = self.grid.scaled_cooldown(base, loc, robot.team());
        if let Some(robot) = self.registry.get_mut(id) {
            robot.add_movement_cooldown(cost);
        }
    }

    fn collect_bread(&mut self, id: RobotId, loc: MapLocation) {
        let Some(team) = self.registry.get(id).map(Robot::team) else {
            return;
        };
        let bread = self.grid.take_bread(loc);
        if bread > 0 {
            self.ledger_add(team, ResourceType::Adamantium, bread);
        }
    }

    /// Step a robot onto `to`: the carried flag follows, bread is
    /// collected, opposing traps fire, and a carried enemy flag entering
    /// the robot's own spawn zone is captured.
    pub(super) fn move_robot(&mut self, id: RobotId, to: MapLocation) {
        let Some(from) = self.registry.get(id).and_then(Robot::location) else {
            return;
        };
        if let Err(err) = self.registry.relocate(id, to) {
            self.fault(err);
            return;
        }
        self.recorder.record(RoundEvent::Moved { id, from, to });
        self.flags.follow_carrier(id, to);
        self.collect_bread(id, to);

        let Some(team) = self.registry.get(id).map(Robot::team) else {
            return;
        };
        for trap in self.traps.opposing_triggers(to, team) {
            self.trigger_trap(trap, id, true);
            if self.registry.get(id).is_none() {
                return;
            }
        }

        self.try_capture(id, to);
    }

    /// Capture the enemy flag carried by `id` if it stands on its own
    /// spawn zone outside the setup phase.
    pub(super) fn try_capture(&mut self, id: RobotId, loc: MapLocation) {
        let Some(team) = self.registry.get(id).map(Robot::team) else {
            return;
        };
        if self.is_setup_phase() || self.grid.spawn_zone(loc) != Some(team) {
            return;
        }
        let carried = self
            .flags
            .carried_by(id)
            .filter(|f| f.team() != team)
            .map(Flag::id);
        if let Some(flag) = carried {
            self.capture_flag(id, team, flag, loc);
        }
    }

    fn capture_flag(&mut self, robot: RobotId, team: Team, flag: FlagId, loc: MapLocation) {
        self.flags.capture(flag, loc);
        let total = self.ledger.capture_flag(team);
        self.record_action(robot, ActionKind::CaptureFlag, ActionTarget::Flag(flag));
        info!("{team:?} captured flag {flag} at {loc} ({total} total)");
        if u32::try_from(NUMBER_FLAGS).is_ok_and(|needed| total >= needed) && self.outcome.is_none() {
            self.outcome = Some(MatchOutcome {
                winner: team,
                reason: DominationFactor::Capture,
            });
        }
    }

    /// Fire a trap and remove it.
    ///
    /// `entered` selects the entry effect over the dig/fill effect.
    pub(super) fn trigger_trap(&mut self, id: TrapId, by: RobotId, entered: bool) {
        let Some(trap) = self.traps.remove(id) else {
            return;
        };
        let center = trap.location();
        let owner = trap.team();
        let stats = trap.kind().stats();
        let (radius, damage) = trap.kind().effect(entered);
        let cells = self.grid.layout().locations_within(center, radius);
        debug!("{:?} trap {id} of {owner:?} triggered at {center} by {by}", trap.kind());

        match trap.kind() {
            TrapType::Explosive => {
                for cell in cells {
                    if let Some(victim) = self.enemy_at(cell, owner) {
                        self.damage_robot(victim, damage);
                    }
                }
            }
            TrapType::Water => {
                let setup = self.is_setup_phase();
                for cell in cells {
                    if self.registry.is_occupied(cell)
                        || !self.grid.is_passable(cell, setup)
                        || self.grid.spawn_zone(cell).is_some()
                        || self.grid.trap(cell).is_some()
                        || self.flags.flag_at(cell).is_some()
                    {
                        continue;
                    }
                    self.grid.set_water(cell, true);
                }
            }
            TrapType::Stun => {
                for cell in cells {
                    if let Some(victim) = self.enemy_at(cell, owner) {
                        if let Some(robot) = self.registry.get_mut(victim) {
                            robot.lock_cooldowns(stats.cooldown_lock);
                        }
                    }
                }
            }
        }
        self.grid.set_trap(center, None);
        self.record_action(by, ActionKind::TriggerTrap, ActionTarget::Trap(id));
    }

    /// Robot of the team opposing `team` standing on `loc`.
    pub(super) fn enemy_at(&self, loc: MapLocation, team: Team) -> Option<RobotId> {
        self.registry
            .robot_at(loc)
            .filter(|id| self.registry.get(*id).is_some_and(|r| r.team() != team))
    }

    /// Recompute every flag's broadcast location from the match RNG.
    pub(super) fn update_broadcasts(&mut self) {
        let layout = *self.grid.layout();
        let ctx = &mut self.ctx;
        self.flags.update_broadcasts(|loc| {
            let cells = layout.locations_within(loc, FLAG_BROADCAST_NOISE_RADIUS);
            if cells.is_empty() {
                return loc;
            }
            cells[ctx.choose_index(cells.len())]
        });
    }

    /// Pick a uniformly random team.
    pub(super) fn coin_team(&mut self) -> Team {
        if self.ctx.coin_flip() { Team::A } else { Team::B }
    }
}
