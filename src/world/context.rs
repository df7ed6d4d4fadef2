//! Per-match deterministic context: random source and id generation.
//!
//! Nothing in the engine touches a process-wide random source. Every draw
//! goes through the [`MatchContext`] owned by the world, so a match is a pure
//! function of its map, configuration, seed and agent behaviour.

use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::constants::{ID_BLOCK_SIZE, ID_START};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Stable robot identifier. Never reused within a match.
    RobotId
);
entity_id!(
    /// Stable flag identifier.
    FlagId
);
entity_id!(
    /// Stable trap identifier.
    TrapId
);
entity_id!(
    /// Island identifier as declared by the map (1-based).
    IslandId
);

/// Hands out unique ids in shuffled blocks.
///
/// Ids start at [`ID_START`]; each block of [`ID_BLOCK_SIZE`] consecutive ids
/// is shuffled with the generator's own stream so ids leak nothing about
/// creation order.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: ChaCha8Rng,
    next_block: u32,
    pending: Vec<u32>,
}

impl IdGenerator {
    /// Create a generator for the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_block: ID_START,
            pending: Vec::new(),
        }
    }

    /// Next unused id.
    pub fn next_id(&mut self) -> u32 {
        if self.pending.is_empty() {
            self.refill();
        }
        // refill guarantees a non-empty block
        self.pending.pop().unwrap_or(self.next_block)
    }

    fn refill(&mut self) {
        let start = self.next_block;
        self.next_block = start.saturating_add(ID_BLOCK_SIZE);
        self.pending = (start..self.next_block).collect();
        self.pending.shuffle(&mut self.rng);
    }
}

/// Deterministic state shared by every subsystem of one match.
#[derive(Debug, Clone)]
pub struct MatchContext {
    seed: u64,
    rng: ChaCha8Rng,
    ids: IdGenerator,
}

impl MatchContext {
    /// Create the context for a match seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            ids: IdGenerator::new(seed.rotate_left(32) ^ 0x9E37_79B9_7F4A_7C15),
        }
    }

    /// The match seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Next robot id.
    pub fn next_robot_id(&mut self) -> RobotId {
        RobotId(self.ids.next_id())
    }

    /// Next flag id.
    pub fn next_flag_id(&mut self) -> FlagId {
        FlagId(self.ids.next_id())
    }

    /// Next trap id.
    pub fn next_trap_id(&mut self) -> TrapId {
        TrapId(self.ids.next_id())
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn choose_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Fair coin.
    pub fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_across_blocks() {
        let mut ids = IdGenerator::new(7);
        let drawn: Vec<u32> = (0..ID_BLOCK_SIZE * 2 + 5).map(|_| ids.next_id()).collect();
        let unique: HashSet<u32> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), drawn.len());
        assert!(drawn.iter().all(|&id| id >= ID_START));
    }

    #[test]
    fn test_first_block_stays_in_range() {
        let mut ids = IdGenerator::new(1);
        for _ in 0..ID_BLOCK_SIZE {
            let id = ids.next_id();
            assert!((ID_START..ID_START + ID_BLOCK_SIZE).contains(&id));
        }
    }

    #[test]
    fn test_context_is_deterministic() {
        let mut a = MatchContext::new(42);
        let mut b = MatchContext::new(42);
        for _ in 0..20 {
            assert_eq!(a.next_robot_id(), b.next_robot_id());
            assert_eq!(a.choose_index(17), b.choose_index(17));
            assert_eq!(a.coin_flip(), b.coin_flip());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = MatchContext::new(1);
        let mut b = MatchContext::new(2);
        let xs: Vec<RobotId> = (0..8).map(|_| a.next_robot_id()).collect();
        let ys: Vec<RobotId> = (0..8).map(|_| b.next_robot_id()).collect();
        assert_ne!(xs, ys);
    }
}
