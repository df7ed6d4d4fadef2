//! Error types for the simulation engine.
//!
//! Errors are split by who caused them:
//! - [`GameActionError`]: an agent asked for something the rules forbid. Recoverable.
//! - [`LedgerError`]: settlement arithmetic tried to break a team ledger invariant.
//! - [`EngineError`]: the engine itself reached an inconsistent state. Fatal to the match.
//! - [`MapError`], [`ConfigError`], [`RecordError`]: problems with inputs and outputs.

use std::fmt;

use thiserror::Error;

use crate::world::{MapLocation, ResourceType, RobotId, Team};

/// Reason code attached to every rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionErrorKind {
    /// Target lies outside the relevant radius, or off the map.
    OutOfRange,
    /// Action or movement cooldown is not below the limit.
    NotReady,
    /// The team cannot pay for the action.
    InsufficientResource,
    /// Target cell or entity cannot receive this action.
    IllegalTarget,
    /// The robot cannot sense the requested location or entity.
    CantSenseThat,
    /// Anything else the robot is not allowed to do.
    CantDoThat,
}

impl fmt::Display for ActionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionErrorKind::OutOfRange => "out of range",
            ActionErrorKind::NotReady => "not ready",
            ActionErrorKind::InsufficientResource => "insufficient resource",
            ActionErrorKind::IllegalTarget => "illegal target",
            ActionErrorKind::CantSenseThat => "cannot sense that",
            ActionErrorKind::CantDoThat => "cannot do that",
        };
        f.write_str(name)
    }
}

/// A rejected robot action.
///
/// Agents may catch this and keep going; if it escapes the agent's turn the
/// robot dies with an exception-death action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GameActionError {
    kind: ActionErrorKind,
    message: String,
}

impl GameActionError {
    /// Create a new action error.
    #[must_use]
    pub fn new(kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The reason code.
    #[must_use]
    pub const fn kind(&self) -> ActionErrorKind {
        self.kind
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for robot actions.
pub type ActionResult<T> = Result<T, GameActionError>;

/// Team ledger invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A resource balance would have gone negative.
    #[error("{team:?} {resource:?} balance {balance} cannot absorb delta {delta}")]
    NegativeBalance {
        /// Team whose ledger was touched.
        team: Team,
        /// Resource kind.
        resource: ResourceType,
        /// Balance before the change.
        balance: i32,
        /// Requested change.
        delta: i32,
    },
    /// Shared array index outside `0..SHARED_ARRAY_LENGTH`.
    #[error("shared array index {0} out of bounds")]
    SharedIndex(usize),
    /// Shared array value outside `0..=MAX_SHARED_ARRAY_VALUE`.
    #[error("shared array value {0} out of range")]
    SharedValue(i32),
    /// No global upgrade point left to spend.
    #[error("{0:?} has no global upgrade point")]
    NoUpgradePoint(Team),
}

/// Faults in orchestration itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Settlement arithmetic violated a ledger invariant.
    #[error("ledger violation: {0}")]
    Ledger(#[from] LedgerError),
    /// A referenced robot does not exist.
    #[error("unknown robot {0}")]
    UnknownRobot(RobotId),
    /// Two robots were placed on the same cell.
    #[error("cell {0} is already occupied")]
    Occupied(MapLocation),
    /// Any other broken invariant.
    #[error("inconsistent state: {0}")]
    Inconsistent(String),
}

/// Map validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Width or height outside the allowed bounds.
    #[error("map dimensions {width}x{height} outside {min}..={max}")]
    Dimensions {
        /// Declared width.
        width: i32,
        /// Declared height.
        height: i32,
        /// Minimum side length.
        min: i32,
        /// Maximum side length.
        max: i32,
    },
    /// A per-cell array does not match `width * height`.
    #[error("per-cell array `{name}` has length {actual}, expected {expected}")]
    CellArrayLength {
        /// Array name.
        name: &'static str,
        /// Actual length.
        actual: usize,
        /// Expected length.
        expected: usize,
    },
    /// A team has the wrong number of flags.
    #[error("{team:?} has {count} flags, expected {expected}")]
    FlagCount {
        /// Team.
        team: Team,
        /// Flags found.
        count: usize,
        /// Flags required.
        expected: usize,
    },
    /// Two allied flags start too close together.
    #[error("{team:?} flags at {a} and {b} are closer than the minimum spacing")]
    FlagSpacing {
        /// Team.
        team: Team,
        /// First flag.
        a: MapLocation,
        /// Second flag.
        b: MapLocation,
    },
    /// A wall overlaps something that must stay reachable.
    #[error("wall at {location} overlaps {what}")]
    WallOverlap {
        /// Wall cell.
        location: MapLocation,
        /// What it overlaps.
        what: &'static str,
    },
    /// A current leaves the map, points into a wall, or shares a destination.
    #[error("current at {location} is invalid: {reason}")]
    Current {
        /// Cell holding the current.
        location: MapLocation,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Island ids are not contiguous or exceed the limit.
    #[error("invalid islands: {0}")]
    Islands(String),
    /// Something off the map was declared.
    #[error("{what} at {location} is off the map")]
    OffMap {
        /// Declared location.
        location: MapLocation,
        /// What was declared.
        what: &'static str,
    },
    /// The declared symmetry does not hold.
    #[error("{what} breaks declared symmetry at {location}")]
    Symmetry {
        /// First asymmetric cell found.
        location: MapLocation,
        /// Which layer is asymmetric.
        what: &'static str,
    },
    /// Two placements claim the same cell.
    #[error("{what} at {location} overlaps another placement")]
    Overlap {
        /// Contested cell.
        location: MapLocation,
        /// What was being placed.
        what: &'static str,
    },
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// File was not valid JSON for [`crate::config::MatchConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Values are individually valid but inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Match log persistence failures.
#[derive(Debug, Error)]
pub enum RecordError {
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Log could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
