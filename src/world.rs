//! Simulation layer for Skirmish.
//!
//! Everything that makes up one match lives here:
//! - Map grid with terrain layers, spawn zones, wells and islands
//! - Robots, flags and traps, each with its own registry
//! - Team ledger (resources, shared array, global upgrades)
//! - Robot controller: the only handle agents get on the world
//! - Round loop, effects, currents and the victory rules

pub mod constants;
pub mod invariants;

mod builder;
mod context;
mod controller;
mod currents;
mod effects;
mod flag;
mod grid;
mod inventory;
mod island;
mod ledger;
mod location;
mod registry;
mod robot;
mod round;
mod state;
mod team;
mod trap;
mod unit;
mod victory;
mod well;

pub use builder::{MapBuilder, MapSnapshot, Placement, Symmetry, WellSpec};
pub use context::{FlagId, IdGenerator, IslandId, MatchContext, RobotId, TrapId};
pub use controller::{FlagInfo, IslandInfo, MapInfo, RobotController, RobotInfo, WellInfo};
pub use currents::{Drifter, resolve_currents};
pub use effects::{DestabilizeTick, EffectKind, EffectStacks};
pub use flag::{Flag, FlagRegistry};
pub use grid::{Grid, Layout, TerrainLayers, ceil_sqrt};
pub use invariants::{InvariantViolation, check_invariants};
pub use inventory::Inventory;
pub use island::{ANCHOR_ACCELERATION, AnchorType, Island, IslandTick};
pub use ledger::TeamLedger;
pub use location::{Direction, MapLocation};
pub use registry::Registry;
pub use robot::{HealthChange, Indicator, Robot, RobotState};
pub use round::RoundStatus;
pub use state::GameWorld;
pub use team::{GlobalUpgrade, ResourceType, Team};
pub use trap::{Trap, TrapRegistry, TrapStats, TrapType};
pub use unit::{RobotType, SKILL_LEVELS, SkillType, UNIT_TABLE, UnitStats, apply_percent};
pub use victory::{DominationFactor, MatchOutcome, TeamStanding, decide_winner};
pub use well::Well;
