//! CLI command implementations for Skirmish.

pub(crate) mod run;
pub(crate) mod sample_map;
pub(crate) mod series;
pub(crate) mod validate;

mod output;

use clap::{Args, ValueEnum};
use skirmish::config::MatchConfig;
use skirmish::provider::SampleStrategy;
use skirmish::tournament::generate_map;
use skirmish::world::MapSnapshot;
use skirmish::world::constants::GAME_MAX_NUMBER_OF_ROUNDS;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format for the `run` and `series` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Built-in strategy to play a team with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Bot {
    /// Never acts.
    Idle,
    /// Spawns, fights, steals flags and roams.
    Wanderer,
}

impl From<Bot> for SampleStrategy {
    fn from(bot: Bot) -> Self {
        match bot {
            Bot::Idle => SampleStrategy::Idle,
            Bot::Wanderer => SampleStrategy::Wanderer,
        }
    }
}

/// Where the map and configuration come from.
#[derive(Args, Debug, Clone)]
pub(crate) struct MatchArgs {
    /// Map file (JSON). A map is generated when omitted.
    #[arg(short, long)]
    pub(crate) map: Option<PathBuf>,

    /// Match configuration file (JSON)
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Match seed (overrides map and config)
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    /// Round limit (overrides map and config)
    #[arg(short, long)]
    pub(crate) rounds: Option<u32>,

    /// Width of a generated map
    #[arg(long, default_value = "30")]
    pub(crate) width: i32,

    /// Height of a generated map
    #[arg(long, default_value = "30")]
    pub(crate) height: i32,

    /// Strategy for team A
    #[arg(long, value_enum, default_value = "wanderer")]
    pub(crate) team_a: Bot,

    /// Strategy for team B
    #[arg(long, value_enum, default_value = "wanderer")]
    pub(crate) team_b: Bot,
}

impl MatchArgs {
    /// Load or generate the map and assemble the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or the map is invalid.
    pub(crate) fn load(&self) -> Result<(MapSnapshot, MatchConfig), CliError> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::load(path)
                .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))?,
            None => MatchConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.rounds.is_some() {
            config.max_rounds = self.rounds;
        }

        let map = match &self.map {
            Some(path) => load_map(path)?,
            None => {
                let seed = config.seed.unwrap_or_default();
                let rounds = config.max_rounds.unwrap_or(GAME_MAX_NUMBER_OF_ROUNDS);
                generate_map(seed, self.width, self.height, rounds)?
            }
        };
        map.validate()?;
        Ok((map, config))
    }

    /// Display names for both teams.
    pub(crate) fn team_names(&self) -> [String; 2] {
        [self.team_a, self.team_b].map(|bot| format!("{bot:?}").to_lowercase())
    }
}

/// Read a JSON map file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a map.
pub(crate) fn load_map(path: &Path) -> Result<MapSnapshot, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| CliError::new(format!("Failed to parse {}: {e}", path.display())))
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::tournament::TournamentError> for CliError {
    fn from(e: skirmish::tournament::TournamentError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::error::MapError> for CliError {
    fn from(e: skirmish::error::MapError) -> Self {
        Self::new(format!("Invalid map: {e}"))
    }
}

impl From<skirmish::error::RecordError> for CliError {
    fn from(e: skirmish::error::RecordError) -> Self {
        Self::new(format!("Failed to save match log: {e}"))
    }
}
