// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Skirmish: a deterministic two-team simulation engine for programming competitions.
//!
//! This crate provides the authoritative world model and round engine for
//! a capture-the-flag style match between two teams of robots:
//! - Bit-exact deterministic execution from a map, a config and a seed
//! - Validated two-phase robot actions (`can_x` / `x`)
//! - Fixed per-round resolution order and a cascading tiebreak
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Runner (tournament) + CLI         │
//! ├─────────────────────────────────────┤
//! │   Action provider (strategies)      │
//! ├─────────────────────────────────────┤
//! │   World: round loop, controller,    │
//! │   grid, flags, islands, ledger      │
//! ├─────────────────────────────────────┤
//! │   Match recorder                    │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod recorder;
pub mod tournament;
pub mod world;

pub use config::{MatchConfig, WellRules};
pub use error::{ActionErrorKind, ActionResult, GameActionError};

// Re-export key world types at crate root for convenience
pub use world::{
    Direction, GameWorld, MapBuilder, MapLocation, MapSnapshot, MatchOutcome, RobotController, RobotId, RobotType,
    Team,
};
