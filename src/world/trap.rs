//! Traps and their trigger registrations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Layout, MapLocation, Team, TrapId};

/// Per-type trap constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapStats {
    /// Base-resource cost.
    pub build_cost: i32,
    /// Squared radius of cells that trigger the trap.
    pub trigger_radius_squared: i32,
    /// Effect radius when triggered by entry.
    pub enter_radius_squared: i32,
    /// Effect radius when triggered by a dig or fill.
    pub interact_radius_squared: i32,
    /// Damage when triggered by entry.
    pub enter_damage: i32,
    /// Damage when triggered by a dig or fill.
    pub interact_damage: i32,
    /// Whether the trap floods its area.
    pub floods: bool,
    /// Cooldown both counters are raised to on affected robots.
    pub cooldown_lock: i32,
    /// Whether the opponent can sense the trap.
    pub visible_to_opponent: bool,
}

/// Kinds of trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrapType {
    /// Damages enemies around it.
    Explosive,
    /// Turns the surrounding cells into water.
    Water,
    /// Locks enemy cooldowns.
    Stun,
}

impl TrapType {
    /// Every trap type.
    pub const ALL: [TrapType; 3] = [TrapType::Explosive, TrapType::Water, TrapType::Stun];

    /// This type's constants.
    #[must_use]
    pub const fn stats(self) -> TrapStats {
        match self {
            TrapType::Explosive => TrapStats {
                build_cost: 25,
                trigger_radius_squared: 2,
                enter_radius_squared: 13,
                interact_radius_squared: 9,
                enter_damage: 750,
                interact_damage: 500,
                floods: false,
                cooldown_lock: 0,
                visible_to_opponent: false,
            },
            TrapType::Water => TrapStats {
                build_cost: 10,
                trigger_radius_squared: 2,
                enter_radius_squared: 9,
                interact_radius_squared: 9,
                enter_damage: 0,
                interact_damage: 0,
                floods: true,
                cooldown_lock: 0,
                visible_to_opponent: false,
            },
            TrapType::Stun => TrapStats {
                build_cost: 10,
                trigger_radius_squared: 2,
                enter_radius_squared: 13,
                interact_radius_squared: 13,
                enter_damage: 0,
                interact_damage: 0,
                floods: false,
                cooldown_lock: 40,
                visible_to_opponent: false,
            },
        }
    }

    /// Effect radius and damage for the given trigger mode.
    #[must_use]
    pub const fn effect(self, entered: bool) -> (i32, i32) {
        let stats = self.stats();
        if entered {
            (stats.enter_radius_squared, stats.enter_damage)
        } else {
            (stats.interact_radius_squared, stats.interact_damage)
        }
    }
}

/// A built trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    id: TrapId,
    kind: TrapType,
    team: Team,
    location: MapLocation,
}

impl Trap {
    /// A new trap.
    #[must_use]
    pub const fn new(id: TrapId, kind: TrapType, team: Team, location: MapLocation) -> Self {
        Self { id, kind, team, location }
    }

    /// Trap id.
    #[must_use]
    pub const fn id(&self) -> TrapId {
        self.id
    }

    /// Trap type.
    #[must_use]
    pub const fn kind(&self) -> TrapType {
        self.kind
    }

    /// Owning team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Build location.
    #[must_use]
    pub const fn location(&self) -> MapLocation {
        self.location
    }
}

/// Owns every live trap and the per-cell trigger lists.
#[derive(Debug, Clone)]
pub struct TrapRegistry {
    layout: Layout,
    traps: BTreeMap<TrapId, (Trap, Vec<usize>)>,
    triggers: Vec<Vec<TrapId>>,
}

impl TrapRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            traps: BTreeMap::new(),
            triggers: vec![Vec::new(); layout.area()],
        }
    }

    /// Register `trap` against every cell in its trigger radius.
    pub fn insert(&mut self, trap: Trap) {
        let covered: Vec<usize> = self
            .layout
            .locations_within(trap.location, trap.kind.stats().trigger_radius_squared)
            .into_iter()
            .filter_map(|loc| self.layout.index(loc))
            .collect();
        for &i in &covered {
            self.triggers[i].push(trap.id);
        }
        self.traps.insert(trap.id, (trap, covered));
    }

    /// Look up a trap.
    #[must_use]
    pub fn get(&self, id: TrapId) -> Option<&Trap> {
        self.traps.get(&id).map(|(trap, _)| trap)
    }

    /// Traps registered on `loc` in registration order.
    #[must_use]
    pub fn triggers_at(&self, loc: MapLocation) -> &[TrapId] {
        self.layout
            .index(loc)
            .map_or(&[][..], |i| self.triggers[i].as_slice())
    }

    /// Traps on `loc` that fire for a robot of team `mover`.
    #[must_use]
    pub fn opposing_triggers(&self, loc: MapLocation, mover: Team) -> Vec<TrapId> {
        self.triggers_at(loc)
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|t| t.team != mover))
            .collect()
    }

    /// Remove a trap and every one of its registrations.
    pub fn remove(&mut self, id: TrapId) -> Option<Trap> {
        let (trap, covered) = self.traps.remove(&id)?;
        for i in covered {
            self.triggers[i].retain(|t| *t != id);
        }
        Some(trap)
    }

    /// Number of live traps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traps.len()
    }

    /// Whether no traps are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    /// Every live trap in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Trap> {
        self.traps.values().map(|(trap, _)| trap)
    }

    /// Total registrations across all cells.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.triggers.iter().map(Vec::len).sum()
    }
}
