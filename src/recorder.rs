//! Round-by-round match recording.
//!
//! Events raised while a round runs are buffered and flushed as a single
//! [`RoundRecord`] once the round has settled. A round abandoned by an
//! engine fault is never flushed, and the log then has no footer.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::world::{
    AnchorType, DominationFactor, FlagId, GlobalUpgrade, Indicator, IslandId, MapLocation,
    MatchOutcome, ResourceType, RobotId, RobotType, Team, TrapId,
};

/// Kinds of recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Robot attack.
    Attack,
    /// Robot heal.
    Heal,
    /// Dig a cell into water.
    Dig,
    /// Fill a water cell.
    Fill,
    /// Build a trap.
    BuildTrap,
    /// A trap fired.
    TriggerTrap,
    /// Flag picked up.
    PickupFlag,
    /// Flag dropped.
    DropFlag,
    /// Flag captured.
    CaptureFlag,
    /// Global upgrade bought.
    GlobalUpgrade,
    /// Resource collected from a well.
    CollectResource,
    /// Resource transferred.
    TransferResource,
    /// Anchor built at headquarters.
    BuildAnchor,
    /// Anchor taken from headquarters.
    TakeAnchor,
    /// Anchor planted on an island.
    PlaceAnchor,
    /// Boost applied.
    Boost,
    /// Destabilize applied.
    Destabilize,
    /// Voluntary self-destruction.
    Disintegrate,
    /// Destroyed after an uncaught agent fault.
    DieException,
    /// Team resigned.
    Resign,
}

/// What an action was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTarget {
    /// Nothing in particular.
    None,
    /// A robot.
    Robot(RobotId),
    /// A cell.
    Location(MapLocation),
    /// A flag.
    Flag(FlagId),
    /// A trap.
    Trap(TrapId),
    /// An island.
    Island(IslandId),
    /// An anchor type.
    Anchor(AnchorType),
    /// A global upgrade.
    Upgrade(GlobalUpgrade),
    /// An amount of a resource.
    Resource(ResourceType, i32),
    /// A plain magnitude.
    Amount(i32),
}

/// One event within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// A robot entered the map.
    Spawned {
        /// Robot.
        id: RobotId,
        /// Team.
        team: Team,
        /// Unit type.
        kind: RobotType,
        /// Spawn cell.
        location: MapLocation,
    },
    /// A robot changed cells.
    Moved {
        /// Robot.
        id: RobotId,
        /// Old cell.
        from: MapLocation,
        /// New cell.
        to: MapLocation,
    },
    /// A robot left the map without being destroyed.
    Despawned {
        /// Robot.
        id: RobotId,
    },
    /// A robot was destroyed.
    Died {
        /// Robot.
        id: RobotId,
    },
    /// A dropped flag went back to its start location.
    FlagReset {
        /// Flag.
        flag: FlagId,
        /// Where it now lies.
        location: MapLocation,
    },
    /// An island's anchor was removed by the opponent's occupation.
    IslandLost {
        /// Island.
        island: IslandId,
        /// Team that lost it.
        team: Team,
    },
    /// A robot performed an action.
    Action {
        /// Acting robot.
        actor: RobotId,
        /// What it did.
        kind: ActionKind,
        /// What it did it to.
        target: ActionTarget,
    },
}

/// Island state at the end of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandSnapshot {
    /// Island.
    pub id: IslandId,
    /// Owner.
    pub owner: Option<Team>,
    /// Planted anchor.
    pub anchor: Option<AnchorType>,
    /// Turns left on the anchor.
    pub turns_left: u32,
}

/// Well state at the end of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellSnapshot {
    /// Well cell.
    pub location: MapLocation,
    /// Current kind.
    pub kind: ResourceType,
    /// Accumulated deposits.
    pub inventory: [i32; 3],
    /// Upgraded tier reached.
    pub upgraded: bool,
}

/// Debug annotations one robot left this round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// Robot.
    pub robot: RobotId,
    /// Indicator string.
    pub text: String,
    /// Dots and lines.
    pub indicators: Vec<Indicator>,
}

/// Everything that happened in one settled round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number, starting at 1.
    pub round: u32,
    /// Events in occurrence order.
    pub events: Vec<RoundEvent>,
    /// Per-team resource deltas, indexed by team then resource.
    pub resource_deltas: [[i32; 3]; 2],
    /// Island states after settlement.
    pub islands: Vec<IslandSnapshot>,
    /// Well states after settlement.
    pub wells: Vec<WellSnapshot>,
    /// Instructions reported per robot turn.
    pub instructions: Vec<(RobotId, u32)>,
    /// Debug annotations, empty unless indicator recording is on.
    pub indicators: Vec<IndicatorRecord>,
}

/// Static facts about a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchHeader {
    /// Map name.
    pub map: String,
    /// Map width.
    pub width: i32,
    /// Map height.
    pub height: i32,
    /// Match seed.
    pub seed: u64,
    /// Round limit.
    pub round_limit: u32,
}

/// Final result written once a match ends cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFooter {
    /// Winner.
    pub winner: Team,
    /// Reason.
    pub reason: DominationFactor,
    /// Rounds played.
    pub rounds: u32,
}

/// A full match log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLog {
    /// Match facts.
    pub header: MatchHeader,
    /// Settled rounds in order.
    pub rounds: Vec<RoundRecord>,
    /// Result, absent when the match ended in an engine fault.
    pub footer: Option<MatchFooter>,
}

impl MatchLog {
    /// Write the log as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a log written by [`MatchLog::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Buffers one round of events at a time.
#[derive(Debug, Clone)]
pub struct RoundRecorder {
    log: MatchLog,
    events: Vec<RoundEvent>,
    instructions: Vec<(RobotId, u32)>,
    indicators: Vec<IndicatorRecord>,
    record_indicators: bool,
}

impl RoundRecorder {
    /// A recorder for a match described by `header`.
    #[must_use]
    pub const fn new(header: MatchHeader, record_indicators: bool) -> Self {
        Self {
            log: MatchLog {
                header,
                rounds: Vec::new(),
                footer: None,
            },
            events: Vec::new(),
            instructions: Vec::new(),
            indicators: Vec::new(),
            record_indicators,
        }
    }

    /// Buffer an event.
    pub fn record(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    /// Buffer an action event.
    pub fn record_action(&mut self, actor: RobotId, kind: ActionKind, target: ActionTarget) {
        self.events.push(RoundEvent::Action { actor, kind, target });
    }

    /// Buffer a robot's instruction count.
    pub fn record_instructions(&mut self, robot: RobotId, instructions: u32) {
        self.instructions.push((robot, instructions));
    }

    /// Buffer a robot's annotations. Ignored unless indicator recording is on.
    pub fn record_indicators(&mut self, robot: RobotId, text: &str, indicators: &[Indicator]) {
        if !self.record_indicators || (text.is_empty() && indicators.is_empty()) {
            return;
        }
        self.indicators.push(IndicatorRecord {
            robot,
            text: text.to_owned(),
            indicators: indicators.to_vec(),
        });
    }

    /// Events buffered for the round in progress.
    #[must_use]
    pub fn pending(&self) -> &[RoundEvent] {
        &self.events
    }

    /// Drop everything buffered for the round in progress.
    pub fn discard_round(&mut self) {
        self.events.clear();
        self.instructions.clear();
        self.indicators.clear();
    }

    /// Flush the buffered round as one record.
    pub fn flush_round(
        &mut self,
        round: u32,
        resource_deltas: [[i32; 3]; 2],
        islands: Vec<IslandSnapshot>,
        wells: Vec<WellSnapshot>,
    ) {
        self.log.rounds.push(RoundRecord {
            round,
            events: std::mem::take(&mut self.events),
            resource_deltas,
            islands,
            wells,
            instructions: std::mem::take(&mut self.instructions),
            indicators: std::mem::take(&mut self.indicators),
        });
    }

    /// Write the footer.
    pub fn finish(&mut self, outcome: MatchOutcome, rounds: u32) {
        self.log.footer = Some(MatchFooter {
            winner: outcome.winner,
            reason: outcome.reason,
            rounds,
        });
    }

    /// The log so far.
    #[must_use]
    pub const fn log(&self) -> &MatchLog {
        &self.log
    }

    /// Consume the recorder, returning the log.
    #[must_use]
    pub fn into_log(self) -> MatchLog {
        self.log
    }
}
