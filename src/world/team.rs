//! Teams, resources and team-wide upgrades.

use serde::{Deserialize, Serialize};

/// One of the two competing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// First team. Moves first among robots of equal age and id order.
    A,
    /// Second team.
    B,
}

impl Team {
    /// Both teams in index order.
    pub const ALL: [Team; 2] = [Team::A, Team::B];

    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// Index into per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }
}

/// Resource kinds tracked by the team ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// The base resource. Bread deposits, digging, filling and traps use it.
    Adamantium,
    /// The second base resource.
    Mana,
    /// The combined resource produced by converted wells.
    Elixir,
}

impl ResourceType {
    /// All resource kinds in index order.
    pub const ALL: [ResourceType; 3] = [ResourceType::Adamantium, ResourceType::Mana, ResourceType::Elixir];

    /// Index into per-resource arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ResourceType::Adamantium => 0,
            ResourceType::Mana => 1,
            ResourceType::Elixir => 2,
        }
    }

    /// The base resource whose deposits convert a well of this kind to elixir.
    ///
    /// Elixir has no opposing base resource.
    #[must_use]
    pub const fn opposing_base(self) -> Option<ResourceType> {
        match self {
            ResourceType::Adamantium => Some(ResourceType::Mana),
            ResourceType::Mana => Some(ResourceType::Adamantium),
            ResourceType::Elixir => None,
        }
    }
}

/// Team-wide upgrades bought with global upgrade points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GlobalUpgrade {
    /// Extra damage on every attack.
    Attack,
    /// Extra healing on every heal.
    Healing,
    /// Enemy flags stay dropped longer; flag carriers move faster.
    Capturing,
}

impl GlobalUpgrade {
    /// All upgrades in index order.
    pub const ALL: [GlobalUpgrade; 3] = [GlobalUpgrade::Attack, GlobalUpgrade::Healing, GlobalUpgrade::Capturing];

    /// Index into per-upgrade arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            GlobalUpgrade::Attack => 0,
            GlobalUpgrade::Healing => 1,
            GlobalUpgrade::Capturing => 2,
        }
    }

    /// Damage added to each attack.
    #[must_use]
    pub const fn attack_bonus(self) -> i32 {
        match self {
            GlobalUpgrade::Attack => 60,
            _ => 0,
        }
    }

    /// Health added to each heal.
    #[must_use]
    pub const fn heal_bonus(self) -> i32 {
        match self {
            GlobalUpgrade::Healing => 50,
            _ => 0,
        }
    }

    /// Extra rounds an opposing dropped flag waits before resetting.
    #[must_use]
    pub const fn flag_return_delay(self) -> u32 {
        match self {
            GlobalUpgrade::Capturing => 21,
            _ => 0,
        }
    }

    /// Change to the flag-carrier movement cooldown.
    #[must_use]
    pub const fn flag_movement_change(self) -> i32 {
        match self {
            GlobalUpgrade::Capturing => -8,
            _ => 0,
        }
    }
}
