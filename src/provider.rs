//! The boundary between the engine and whatever decides what robots do.
//!
//! The engine drives an [`ActionProvider`] synchronously: one
//! [`ActionProvider::run_robot`] call per robot per round, plus lifecycle
//! notifications. [`StrategyProvider`] is the in-process implementation
//! used by the CLI and the tests. It hosts one [`Strategy`] per robot and
//! meters the instructions each turn spends against a fixed budget.

mod sample;

pub use sample::{Idle, SampleStrategy, Wanderer};

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::error::ActionResult;
use crate::world::constants::EXCEPTION_INSTRUCTION_PENALTY;
use crate::world::{GameWorld, MatchOutcome, Robot, RobotController, RobotId, RobotType, Team};

/// What one robot's turn cost, and whether it ended in an uncaught fault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Instructions consumed during the turn.
    pub instructions_used: u32,
    /// Message of a fault that escaped the agent. The robot is destroyed.
    pub fault: Option<String>,
}

/// Source of robot behaviour, driven by the round loop.
///
/// Only [`ActionProvider::run_robot`] is required; every notification has
/// an empty default.
pub trait ActionProvider {
    /// Called once before the first round.
    fn match_started(&mut self, _world: &GameWorld) {}

    /// Called at the start of every round.
    fn round_started(&mut self, _round: u32) {}

    /// Run one robot's turn through `controller`.
    fn run_robot(&mut self, controller: &mut RobotController<'_>) -> TurnReport;

    /// Called after the last turn of every round.
    fn round_ended(&mut self, _round: u32) {}

    /// A robot entered the map.
    fn robot_spawned(&mut self, _robot: RobotId) {}

    /// A robot was destroyed.
    fn robot_killed(&mut self, _robot: RobotId) {}

    /// Whether the provider gave up on `robot`. Terminated robots are despawned.
    fn is_terminated(&self, _robot: RobotId) -> bool {
        false
    }

    /// Called once when the match stops, with `None` if an engine fault ended it.
    fn match_ended(&mut self, _outcome: Option<MatchOutcome>) {}
}

/// Per-robot agent logic hosted in-process.
pub trait Strategy: Send {
    /// Play one turn. An error escaping here is an uncaught fault.
    ///
    /// # Errors
    ///
    /// Any rejected action the strategy chose not to handle.
    fn run_turn(&mut self, rc: &mut RobotController<'_>) -> ActionResult<()>;
}

/// Creates a strategy for a robot given its id, team, type and the match seed.
pub type StrategyFactory = fn(RobotId, Team, RobotType, u64) -> Box<dyn Strategy>;

/// [`ActionProvider`] running one [`Strategy`] per robot, one factory per team.
pub struct StrategyProvider {
    factories: [StrategyFactory; 2],
    budget: u32,
    seed: u64,
    strategies: BTreeMap<RobotId, Box<dyn Strategy>>,
    terminated: BTreeSet<RobotId>,
    faults: [u32; 2],
    outcome: Option<MatchOutcome>,
}

impl std::fmt::Debug for StrategyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyProvider")
            .field("budget", &self.budget)
            .field("robots", &self.strategies.len())
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

impl StrategyProvider {
    /// A provider with the given team factories and per-turn instruction budget.
    #[must_use]
    pub fn new(team_a: StrategyFactory, team_b: StrategyFactory, budget: u32) -> Self {
        Self {
            factories: [team_a, team_b],
            budget,
            seed: 0,
            strategies: BTreeMap::new(),
            terminated: BTreeSet::new(),
            faults: [0; 2],
            outcome: None,
        }
    }

    /// A provider playing one sample strategy per team.
    #[must_use]
    pub fn with_samples(team_a: SampleStrategy, team_b: SampleStrategy, budget: u32) -> Self {
        Self::new(team_a.factory(), team_b.factory(), budget)
    }

    /// Uncaught faults per team so far.
    #[must_use]
    pub const fn faults(&self, team: Team) -> u32 {
        self.faults[team.index()]
    }

    /// Robots terminated for running over budget.
    #[must_use]
    pub const fn terminated(&self) -> &BTreeSet<RobotId> {
        &self.terminated
    }

    /// The outcome reported at match end.
    #[must_use]
    pub const fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }
}

impl ActionProvider for StrategyProvider {
    fn match_started(&mut self, world: &GameWorld) {
        self.seed = world.seed();
        self.strategies.clear();
        self.terminated.clear();
        self.faults = [0; 2];
        self.outcome = None;
    }

    fn run_robot(&mut self, controller: &mut RobotController<'_>) -> TurnReport {
        let id = controller.id();
        if self.terminated.contains(&id) {
            return TurnReport::default();
        }
        let Some(kind) = controller.robot().map(Robot::kind) else {
            return TurnReport::default();
        };
        let team = controller.team();
        let factory = self.factories[team.index()];
        let seed = self.seed;
        let strategy = self
            .strategies
            .entry(id)
            .or_insert_with(|| factory(id, team, kind, seed));

        let result = strategy.run_turn(controller);
        let mut report = TurnReport {
            instructions_used: controller.instructions_used(),
            fault: None,
        };
        if let Err(err) = result {
            self.faults[team.index()] += 1;
            report.instructions_used = report.instructions_used.saturating_add(EXCEPTION_INSTRUCTION_PENALTY);
            report.fault = Some(err.to_string());
        } else if report.instructions_used > self.budget {
            warn!(
                "robot {id} used {} instructions, over the budget of {}; terminating",
                report.instructions_used, self.budget
            );
            self.terminated.insert(id);
        }
        report
    }

    fn robot_killed(&mut self, robot: RobotId) {
        debug!("dropping strategy of robot {robot}");
        self.strategies.remove(&robot);
    }

    fn is_terminated(&self, robot: RobotId) -> bool {
        self.terminated.contains(&robot)
    }

    fn match_ended(&mut self, outcome: Option<MatchOutcome>) {
        self.outcome = outcome;
    }
}
