//! Fixed game constants.
//!
//! Everything here is a rule of the game, not a tuning knob. Knobs that may
//! change between matches live in [`crate::config::MatchConfig`].

/// Minimum map width and height.
pub const MAP_MIN_SIZE: i32 = 20;

/// Maximum map width and height.
pub const MAP_MAX_SIZE: i32 = 60;

/// Minimum squared distance between two allied flags after setup.
pub const MIN_FLAG_SPACING_SQUARED: i32 = 36;

/// Default round limit.
pub const GAME_MAX_NUMBER_OF_ROUNDS: u32 = 2000;

/// Default seed when neither map nor config supplies one.
pub const GAME_DEFAULT_SEED: u64 = 6370;

/// Default per-robot instruction budget per turn.
pub const INSTRUCTION_LIMIT: u32 = 20_000;

/// Instructions charged to a robot whose turn ends in a fault.
pub const EXCEPTION_INSTRUCTION_PENALTY: u32 = 500;

/// Instructions charged per controller call.
pub const INSTRUCTIONS_PER_CALL: u32 = 10;

/// Maximum indicator string length, in characters.
pub const INDICATOR_STRING_MAX_LENGTH: usize = 64;

/// Number of slots in each team's shared array.
pub const SHARED_ARRAY_LENGTH: usize = 64;

/// Largest value a shared array slot can hold.
pub const MAX_SHARED_ARRAY_VALUE: i32 = 65_535;

/// Roster size per team.
pub const ROBOT_CAPACITY: usize = 50;

/// Flags per team. Capturing this many wins the match outright.
pub const NUMBER_FLAGS: usize = 3;

/// Base-resource cost of digging.
pub const DIG_COST: i32 = 2;

/// Action cooldown added by digging.
pub const DIG_COOLDOWN: i32 = 20;

/// Base-resource cost of filling.
pub const FILL_COST: i32 = 1;

/// Action cooldown added by filling.
pub const FILL_COOLDOWN: i32 = 20;

/// Action cooldown added by building a trap.
pub const TRAP_BUILD_COOLDOWN: i32 = 5;

/// Rounds between flag broadcast updates.
pub const FLAG_BROADCAST_UPDATE_INTERVAL: u32 = 100;

/// Squared radius around a flag from which its broadcast location is drawn.
pub const FLAG_BROADCAST_NOISE_RADIUS: i32 = 10;

/// Rounds a dropped flag waits before returning to its start location.
pub const FLAG_DROPPED_RESET_ROUNDS: u32 = 4;

/// Initial endowment per team, indexed by [`super::ResourceType::index`].
pub const INITIAL_RESOURCES: [i32; 3] = [200, 100, 0];

/// Passive income per team, indexed by [`super::ResourceType::index`].
pub const PASSIVE_RESOURCES: [i32; 3] = [6, 3, 0];

/// Rounds between passive income grants.
pub const PASSIVE_INCREASE_ROUNDS: u32 = 5;

/// Default length of the setup phase.
pub const SETUP_ROUNDS: u32 = 200;

/// Rounds between global upgrade points.
pub const GLOBAL_UPGRADE_ROUNDS: u32 = 750;

/// Default vision radius squared.
pub const VISION_RADIUS_SQUARED: i32 = 20;

/// Attack radius squared for ducks.
pub const ATTACK_RADIUS_SQUARED: i32 = 4;

/// Heal radius squared.
pub const HEAL_RADIUS_SQUARED: i32 = 4;

/// Radius squared for flag, dig, fill and trap interactions.
pub const INTERACT_RADIUS_SQUARED: i32 = 2;

/// A robot may act or move only while the matching counter is below this.
pub const COOLDOWN_LIMIT: i32 = 10;

/// Amount subtracted from both cooldown counters at the start of each turn.
pub const COOLDOWNS_PER_TURN: i32 = 10;

/// Movement cooldown added per step while carrying a flag.
pub const FLAG_MOVEMENT_COOLDOWN: i32 = 20;

/// Action cooldown added by a duck attack.
pub const ATTACK_COOLDOWN: i32 = 20;

/// Action cooldown added by healing.
pub const HEAL_COOLDOWN: i32 = 20;

/// Weight of one anchor in an inventory.
pub const ANCHOR_WEIGHT: i32 = 40;

/// Constant part of a carrier's movement cooldown.
pub const CARRIER_MOVE_INTERCEPT: i32 = 5;

/// Carrier movement cooldown grows by `weight * NUM / DEN`.
pub const CARRIER_MOVE_SLOPE_NUM: i32 = 3;

/// See [`CARRIER_MOVE_SLOPE_NUM`].
pub const CARRIER_MOVE_SLOPE_DEN: i32 = 8;

/// A thrown load deals `weight * NUM / DEN` damage.
pub const CARRIER_THROW_DAMAGE_NUM: i32 = 5;

/// See [`CARRIER_THROW_DAMAGE_NUM`].
pub const CARRIER_THROW_DAMAGE_DEN: i32 = 4;

/// Upper bound on the number of islands on a map.
pub const MAX_NUMBER_ISLANDS: usize = 35;

/// Percentage of an island's cells a team must occupy to hold it.
pub const ISLAND_SUPERMAJORITY_PERCENT: usize = 75;

/// Cooldown multiplier change per active boost.
pub const BOOST_INCREMENT: f64 = -0.10;

/// Rounds a boost lasts.
pub const BOOST_DURATION: u32 = 10;

/// Boosts beyond this count on one cell have no further effect.
pub const MAX_BOOST_STACKS: usize = 3;

/// Cooldown multiplier change per active destabilize.
pub const DESTABILIZE_INCREMENT: f64 = 0.10;

/// Rounds a destabilize lasts.
pub const DESTABILIZE_DURATION: u32 = 5;

/// Destabilizes beyond this count on one cell have no further effect.
pub const MAX_DESTABILIZE_STACKS: usize = 3;

/// Squared radius of a destabilize around its target.
pub const DESTABILIZE_RADIUS_SQUARED: i32 = 13;

/// Damage dealt by each expiring destabilize to an affected robot on the cell.
pub const DESTABILIZE_DAMAGE: i32 = 5;

/// First id handed out by the id generator.
pub const ID_START: u32 = 10_000;

/// Ids are shuffled within blocks of this size.
pub const ID_BLOCK_SIZE: u32 = 4096;
