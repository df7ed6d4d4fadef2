//! Unit type table and skill progression.
//!
//! Behavioural differences between unit types are data, not code: every
//! type has one row in [`UNIT_TABLE`] and a handful of capability
//! predicates on [`RobotType`] decide which actions it may attempt.

use serde::{Deserialize, Serialize};

use super::constants::{ATTACK_COOLDOWN, ATTACK_RADIUS_SQUARED, VISION_RADIUS_SQUARED};

/// Per-type constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    /// Maximum (and spawn) health.
    pub health: i32,
    /// Base attack damage.
    pub damage: i32,
    /// Base heal amount.
    pub heal: i32,
    /// Base action cooldown.
    pub action_cooldown: i32,
    /// Base movement cooldown. Zero for immobile types.
    pub movement_cooldown: i32,
    /// Action radius squared.
    pub action_radius_squared: i32,
    /// Vision radius squared.
    pub vision_radius_squared: i32,
    /// Inventory weight limit. `None` means unbounded.
    pub capacity: Option<i32>,
    /// Spawn cost indexed by resource.
    pub build_cost: [i32; 3],
}

/// The kinds of robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RobotType {
    /// Immobile base placed by the map. Builds anchors, stores deliveries.
    Headquarters,
    /// General-purpose unit: fights, heals, terraforms and carries flags.
    Duck,
    /// Hauls resources and anchors.
    Carrier,
    /// Long-range attacker.
    Launcher,
    /// Speeds up allied cooldowns around itself.
    Booster,
    /// Slows down enemy cooldowns around a target.
    Destabilizer,
}

/// Constants for every [`RobotType`], in declaration order.
pub static UNIT_TABLE: [UnitStats; 6] = [
    // Headquarters
    UnitStats {
        health: 1000,
        damage: 0,
        heal: 0,
        action_cooldown: 10,
        movement_cooldown: 0,
        action_radius_squared: 9,
        vision_radius_squared: 34,
        capacity: None,
        build_cost: [0, 0, 0],
    },
    // Duck
    UnitStats {
        health: 1000,
        damage: 150,
        heal: 80,
        action_cooldown: ATTACK_COOLDOWN,
        movement_cooldown: 10,
        action_radius_squared: ATTACK_RADIUS_SQUARED,
        vision_radius_squared: VISION_RADIUS_SQUARED,
        capacity: Some(0),
        build_cost: [0, 0, 0],
    },
    // Carrier
    UnitStats {
        health: 150,
        damage: 0,
        heal: 0,
        action_cooldown: 10,
        movement_cooldown: 10,
        action_radius_squared: 9,
        vision_radius_squared: VISION_RADIUS_SQUARED,
        capacity: Some(40),
        build_cost: [50, 0, 0],
    },
    // Launcher
    UnitStats {
        health: 200,
        damage: 60,
        heal: 0,
        action_cooldown: 10,
        movement_cooldown: 20,
        action_radius_squared: 16,
        vision_radius_squared: VISION_RADIUS_SQUARED,
        capacity: Some(0),
        build_cost: [0, 60, 0],
    },
    // Booster
    UnitStats {
        health: 300,
        damage: 0,
        heal: 0,
        action_cooldown: 100,
        movement_cooldown: 25,
        action_radius_squared: 25,
        vision_radius_squared: VISION_RADIUS_SQUARED,
        capacity: Some(0),
        build_cost: [0, 0, 250],
    },
    // Destabilizer
    UnitStats {
        health: 200,
        damage: 0,
        heal: 0,
        action_cooldown: 50,
        movement_cooldown: 25,
        action_radius_squared: 13,
        vision_radius_squared: VISION_RADIUS_SQUARED,
        capacity: Some(0),
        build_cost: [0, 0, 400],
    },
];

impl RobotType {
    /// Every type in table order.
    pub const ALL: [RobotType; 6] = [
        RobotType::Headquarters,
        RobotType::Duck,
        RobotType::Carrier,
        RobotType::Launcher,
        RobotType::Booster,
        RobotType::Destabilizer,
    ];

    /// This type's row in [`UNIT_TABLE`].
    #[must_use]
    pub fn stats(self) -> &'static UnitStats {
        let index = match self {
            RobotType::Headquarters => 0,
            RobotType::Duck => 1,
            RobotType::Carrier => 2,
            RobotType::Launcher => 3,
            RobotType::Booster => 4,
            RobotType::Destabilizer => 5,
        };
        &UNIT_TABLE[index]
    }

    /// Bases are placed by the map, never move and cannot be damaged.
    #[must_use]
    pub const fn is_base(self) -> bool {
        matches!(self, RobotType::Headquarters)
    }

    /// May take movement actions.
    #[must_use]
    pub const fn can_move(self) -> bool {
        !self.is_base()
    }

    /// May attack a location.
    #[must_use]
    pub const fn can_attack(self) -> bool {
        matches!(self, RobotType::Duck | RobotType::Carrier | RobotType::Launcher)
    }

    /// May heal allies.
    #[must_use]
    pub const fn can_heal(self) -> bool {
        matches!(self, RobotType::Duck)
    }

    /// May dig, fill and build traps.
    #[must_use]
    pub const fn can_terraform(self) -> bool {
        matches!(self, RobotType::Duck)
    }

    /// May pick up and carry flags.
    #[must_use]
    pub const fn can_carry_flag(self) -> bool {
        matches!(self, RobotType::Duck)
    }

    /// May collect from wells and transfer resources.
    #[must_use]
    pub const fn can_extract(self) -> bool {
        matches!(self, RobotType::Carrier)
    }

    /// May take anchors from a headquarters and plant them on islands.
    #[must_use]
    pub const fn can_place_anchor(self) -> bool {
        matches!(self, RobotType::Carrier)
    }

    /// May build anchors.
    #[must_use]
    pub const fn can_build_anchor(self) -> bool {
        self.is_base()
    }

    /// May boost allied cooldowns.
    #[must_use]
    pub const fn can_boost(self) -> bool {
        matches!(self, RobotType::Booster)
    }

    /// May destabilize enemy cooldowns.
    #[must_use]
    pub const fn can_destabilize(self) -> bool {
        matches!(self, RobotType::Destabilizer)
    }
}

/// Number of skill levels.
pub const SKILL_LEVELS: usize = 7;

/// Skills that robots gain experience in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillType {
    /// Gained by attacking.
    Attack,
    /// Gained by digging, filling and building traps.
    Build,
    /// Gained by healing.
    Heal,
}

struct SkillTable {
    experience: [i32; SKILL_LEVELS],
    cooldown_percent: [i32; SKILL_LEVELS],
    effect_percent: [i32; SKILL_LEVELS],
}

const ATTACK_SKILL: SkillTable = SkillTable {
    experience: [0, 25, 50, 75, 125, 175, 250],
    cooldown_percent: [0, -1, -2, -3, -3, -6, -10],
    effect_percent: [0, 5, 10, 15, 20, 30, 50],
};

const BUILD_SKILL: SkillTable = SkillTable {
    experience: [0, 10, 20, 30, 50, 75, 125],
    cooldown_percent: [0, -5, -10, -15, -20, -30, -50],
    effect_percent: [0; SKILL_LEVELS],
};

const HEAL_SKILL: SkillTable = SkillTable {
    experience: [0, 10, 20, 30, 50, 75, 125],
    cooldown_percent: [0, -5, -10, -15, -15, -15, -25],
    effect_percent: [0, 3, 5, 7, 10, 15, 25],
};

impl SkillType {
    /// All skills in index order.
    pub const ALL: [SkillType; 3] = [SkillType::Attack, SkillType::Build, SkillType::Heal];

    /// Index into per-skill arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            SkillType::Attack => 0,
            SkillType::Build => 1,
            SkillType::Heal => 2,
        }
    }

    const fn table(self) -> &'static SkillTable {
        match self {
            SkillType::Attack => &ATTACK_SKILL,
            SkillType::Build => &BUILD_SKILL,
            SkillType::Heal => &HEAL_SKILL,
        }
    }

    /// Level reached with `experience` points.
    #[must_use]
    pub fn level(self, experience: i32) -> usize {
        self.table()
            .experience
            .iter()
            .rposition(|&needed| experience >= needed)
            .unwrap_or(0)
    }

    /// Cooldown change in percent at `level`.
    #[must_use]
    pub fn cooldown_percent(self, level: usize) -> i32 {
        self.table().cooldown_percent[level.min(SKILL_LEVELS - 1)]
    }

    /// Effect change in percent at `level`.
    #[must_use]
    pub fn effect_percent(self, level: usize) -> i32 {
        self.table().effect_percent[level.min(SKILL_LEVELS - 1)]
    }
}

/// Scale `base` by `100 + percent` percent, truncating.
#[must_use]
pub const fn apply_percent(base: i32, percent: i32) -> i32 {
    base * (100 + percent) / 100
}
