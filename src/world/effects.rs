//! Stacked cooldown-multiplier effects: boosts, destabilizes and
//! accelerating anchors.
//!
//! The grid's multiplier for a (cell, team) pair is always recomputed from
//! the stacks below rather than nudged incrementally, so applying and then
//! expiring an effect restores the previous value exactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::constants::{BOOST_INCREMENT, DESTABILIZE_INCREMENT, MAX_BOOST_STACKS, MAX_DESTABILIZE_STACKS};
use super::island::ANCHOR_ACCELERATION;
use super::{Grid, MapLocation, Team};

/// Kinds of stacked effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    /// Faster cooldowns for the affected team.
    Boost,
    /// Slower cooldowns for the affected team; damages on expiry.
    Destabilize,
}

impl EffectKind {
    const fn increment(self) -> f64 {
        match self {
            EffectKind::Boost => BOOST_INCREMENT,
            EffectKind::Destabilize => DESTABILIZE_INCREMENT,
        }
    }

    const fn cap(self) -> usize {
        match self {
            EffectKind::Boost => MAX_BOOST_STACKS,
            EffectKind::Destabilize => MAX_DESTABILIZE_STACKS,
        }
    }
}

/// An expired destabilize entry: the affected team on that cell takes damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestabilizeTick {
    /// Cell.
    pub location: MapLocation,
    /// Team whose robot on that cell is hit.
    pub team: Team,
}

/// Effect stacks keyed by (cell index, team, kind).
#[derive(Debug, Clone, Default)]
pub struct EffectStacks {
    stacks: BTreeMap<(usize, Team, EffectKind), Vec<u32>>,
    anchors: BTreeMap<(usize, Team), u32>,
}

impl EffectStacks {
    /// No active effects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect expiring at round `expires` to each cell for `team`.
    pub fn apply(&mut self, grid: &mut Grid, cells: &[MapLocation], team: Team, kind: EffectKind, expires: u32) {
        for &loc in cells {
            let Some(index) = grid.layout().index(loc) else {
                continue;
            };
            self.stacks.entry((index, team, kind)).or_default().push(expires);
            self.refresh(grid, index, team);
        }
    }

    /// Remove every entry expiring at or before `round`.
    ///
    /// Returns one tick per removed destabilize entry, in key order.
    pub fn expire(&mut self, grid: &mut Grid, round: u32) -> Vec<DestabilizeTick> {
        let mut ticks = Vec::new();
        let mut touched = Vec::new();
        for (&(index, team, kind), entries) in &mut self.stacks {
            let before = entries.len();
            entries.retain(|&expires| expires > round);
            let removed = before - entries.len();
            if removed == 0 {
                continue;
            }
            touched.push((index, team));
            if kind == EffectKind::Destabilize {
                let location = grid.layout().location(index);
                ticks.extend((0..removed).map(|_| DestabilizeTick { location, team }));
            }
        }
        self.stacks.retain(|_, entries| !entries.is_empty());
        for (index, team) in touched {
            self.refresh(grid, index, team);
        }
        ticks
    }

    /// Count an accelerating anchor over each cell for `team`.
    pub fn add_anchor(&mut self, grid: &mut Grid, cells: &[MapLocation], team: Team) {
        for &loc in cells {
            if let Some(index) = grid.layout().index(loc) {
                *self.anchors.entry((index, team)).or_default() += 1;
                self.refresh(grid, index, team);
            }
        }
    }

    /// Undo [`EffectStacks::add_anchor`] for the same cells.
    pub fn remove_anchor(&mut self, grid: &mut Grid, cells: &[MapLocation], team: Team) {
        for &loc in cells {
            let Some(index) = grid.layout().index(loc) else {
                continue;
            };
            if let Some(count) = self.anchors.get_mut(&(index, team)) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.anchors.remove(&(index, team));
                }
            }
            self.refresh(grid, index, team);
        }
    }

    /// Active entries for one (cell, team, kind).
    #[must_use]
    pub fn stack_len(&self, grid: &Grid, loc: MapLocation, team: Team, kind: EffectKind) -> usize {
        grid.layout()
            .index(loc)
            .and_then(|i| self.stacks.get(&(i, team, kind)))
            .map_or(0, Vec::len)
    }

    /// Whether no effect is active anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty() && self.anchors.is_empty()
    }

    fn multiplier(&self, index: usize, team: Team) -> f64 {
        let mut value = 1.0;
        for kind in [EffectKind::Boost, EffectKind::Destabilize] {
            let len = self.stacks.get(&(index, team, kind)).map_or(0, Vec::len);
            #[allow(clippy::cast_precision_loss)]
            let effective = len.min(kind.cap()) as f64;
            value += effective * kind.increment();
        }
        let anchors = self.anchors.get(&(index, team)).copied().unwrap_or(0);
        value + f64::from(anchors) * ANCHOR_ACCELERATION
    }

    fn refresh(&self, grid: &mut Grid, index: usize, team: Team) {
        grid.set_cooldown_multiplier(index, team, self.multiplier(index, team).max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Layout;

    fn create_test_grid() -> Grid {
        Grid::new(Layout::new(20, 20, MapLocation::new(0, 0)))
    }

    #[test]
    fn test_boost_cap_limits_drift() {
        let mut grid = create_test_grid();
        let mut effects = EffectStacks::new();
        let loc = MapLocation::new(3, 3);
        for _ in 0..5 {
            effects.apply(&mut grid, &[loc], Team::A, EffectKind::Boost, 10);
        }
        assert_eq!(effects.stack_len(&grid, loc, Team::A, EffectKind::Boost), 5);
        assert!((grid.cooldown_multiplier(loc, Team::A) - 0.7).abs() < 1e-9);
        assert!((grid.cooldown_multiplier(loc, Team::B) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_expiry_restores_multiplier() {
        let mut grid = create_test_grid();
        let mut effects = EffectStacks::new();
        let loc = MapLocation::new(3, 3);
        effects.apply(&mut grid, &[loc], Team::B, EffectKind::Destabilize, 4);
        effects.apply(&mut grid, &[loc], Team::B, EffectKind::Destabilize, 6);
        assert!(effects.expire(&mut grid, 3).is_empty());
        let ticks = effects.expire(&mut grid, 4);
        assert_eq!(ticks, vec![DestabilizeTick { location: loc, team: Team::B }]);
        assert!((grid.cooldown_multiplier(loc, Team::B) - 1.1).abs() < 1e-9);
        effects.expire(&mut grid, 6);
        assert!((grid.cooldown_multiplier(loc, Team::B) - 1.0).abs() < 1e-12);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_anchor_round_trip() {
        let mut grid = create_test_grid();
        let mut effects = EffectStacks::new();
        let cells = [MapLocation::new(1, 1), MapLocation::new(1, 2)];
        effects.add_anchor(&mut grid, &cells, Team::A);
        effects.add_anchor(&mut grid, &cells[..1], Team::A);
        assert!((grid.cooldown_multiplier(cells[0], Team::A) - 0.7).abs() < 1e-9);
        effects.remove_anchor(&mut grid, &cells[..1], Team::A);
        effects.remove_anchor(&mut grid, &cells, Team::A);
        for loc in cells {
            assert!((grid.cooldown_multiplier(loc, Team::A) - 1.0).abs() < 1e-12);
        }
        assert!(effects.is_empty());
    }

    #[test]
    fn test_off_map_cells_ignored() {
        let mut grid = create_test_grid();
        let mut effects = EffectStacks::new();
        effects.apply(&mut grid, &[MapLocation::new(-1, 0)], Team::A, EffectKind::Boost, 3);
        assert!(effects.is_empty());
    }
}
