//! Map snapshots, the builder that produces them, and map validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

use super::constants::{
    GAME_DEFAULT_SEED, GAME_MAX_NUMBER_OF_ROUNDS, MAP_MAX_SIZE, MAP_MIN_SIZE, MAX_NUMBER_ISLANDS,
    MIN_FLAG_SPACING_SQUARED, NUMBER_FLAGS, ROBOT_CAPACITY,
};
use super::{Direction, IslandId, Layout, MapLocation, ResourceType, RobotType, Team, TerrainLayers};

/// Declared map symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symmetry {
    /// 180-degree rotation about the center.
    Rotational,
    /// Mirror across the horizontal midline: `(x, h - 1 - y)`.
    Horizontal,
    /// Mirror across the vertical midline: `(w - 1 - x, y)`.
    Vertical,
}

impl Symmetry {
    /// Image of `loc` under this symmetry.
    #[must_use]
    pub const fn reflect(self, layout: &Layout, loc: MapLocation) -> MapLocation {
        let origin = layout.origin();
        let rx = origin.x + layout.width() - 1 - (loc.x - origin.x);
        let ry = origin.y + layout.height() - 1 - (loc.y - origin.y);
        match self {
            Symmetry::Rotational => MapLocation::new(rx, ry),
            Symmetry::Horizontal => MapLocation::new(loc.x, ry),
            Symmetry::Vertical => MapLocation::new(rx, loc.y),
        }
    }

    /// Image of a flow direction under this symmetry.
    #[must_use]
    pub const fn reflect_direction(self, dir: Direction) -> Direction {
        match self {
            Symmetry::Rotational => dir.opposite(),
            Symmetry::Horizontal => dir.flip_vertical(),
            Symmetry::Vertical => dir.flip_horizontal(),
        }
    }
}

/// A team-owned placement on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Owner.
    pub team: Team,
    /// Cell.
    pub location: MapLocation,
}

/// A well declared by the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellSpec {
    /// Cell.
    pub location: MapLocation,
    /// Initial resource kind.
    pub kind: ResourceType,
}

fn default_roster() -> Vec<RobotType> {
    vec![RobotType::Duck; ROBOT_CAPACITY]
}

const fn default_rounds() -> u32 {
    GAME_MAX_NUMBER_OF_ROUNDS
}

/// Immutable world-initialization snapshot.
///
/// Per-cell arrays are indexed by [`Layout::index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Map name.
    pub name: String,
    /// Width in cells.
    pub width: i32,
    /// Height in cells.
    pub height: i32,
    /// Lower-left cell.
    #[serde(default)]
    pub origin: MapLocation,
    /// Match seed.
    pub seed: u64,
    /// Round limit.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Declared symmetry.
    pub symmetry: Symmetry,
    /// Wall cells.
    pub walls: Vec<bool>,
    /// Water cells.
    pub water: Vec<bool>,
    /// Dam cells.
    pub dams: Vec<bool>,
    /// Bread per cell.
    pub bread: Vec<i32>,
    /// Spawn-zone owner per cell.
    pub spawn_zones: Vec<Option<Team>>,
    /// Flow direction per cell.
    pub currents: Vec<Direction>,
    /// Island membership per cell.
    pub islands: Vec<Option<IslandId>>,
    /// Wells.
    #[serde(default)]
    pub wells: Vec<WellSpec>,
    /// Headquarters.
    #[serde(default)]
    pub headquarters: Vec<Placement>,
    /// Flag spawn locations.
    pub flags: Vec<Placement>,
    /// Robot slots created for each team, in creation order.
    #[serde(default = "default_roster")]
    pub roster: Vec<RobotType>,
}

impl MapSnapshot {
    /// The layout described by this snapshot.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        Layout::new(self.width, self.height, self.origin)
    }

    /// The terrain layers for [`super::Grid::from_layers`].
    #[must_use]
    pub fn terrain(&self) -> TerrainLayers {
        TerrainLayers {
            walls: self.walls.clone(),
            water: self.water.clone(),
            dams: self.dams.clone(),
            bread: self.bread.clone(),
            spawn_zones: self.spawn_zones.clone(),
            currents: self.currents.clone(),
            islands: self.islands.clone(),
        }
    }

    /// Number of islands, taken as the largest declared island id.
    #[must_use]
    pub fn island_count(&self) -> u32 {
        self.islands.iter().flatten().map(|id| id.0).max().unwrap_or(0)
    }

    /// Checks every world construction depends on: positive dimensions,
    /// per-cell array lengths, and on-map placements.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found.
    pub fn check_structure(&self) -> Result<(), MapError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(self.dimension_error());
        }
        let expected = self.layout().area();
        let lengths = [
            ("walls", self.walls.len()),
            ("water", self.water.len()),
            ("dams", self.dams.len()),
            ("bread", self.bread.len()),
            ("spawn_zones", self.spawn_zones.len()),
            ("currents", self.currents.len()),
            ("islands", self.islands.len()),
        ];
        for (name, actual) in lengths {
            if actual != expected {
                return Err(MapError::CellArrayLength { name, actual, expected });
            }
        }
        let layout = self.layout();
        let placed = self
            .wells
            .iter()
            .map(|w| (w.location, "well"))
            .chain(self.headquarters.iter().map(|h| (h.location, "headquarters")))
            .chain(self.flags.iter().map(|f| (f.location, "flag")));
        for (location, what) in placed {
            if !layout.on_the_map(location) {
                return Err(MapError::OffMap { location, what });
            }
        }
        Ok(())
    }

    /// Full competition validation.
    ///
    /// # Errors
    ///
    /// Returns the first rule the map breaks.
    pub fn validate(&self) -> Result<(), MapError> {
        let size = MAP_MIN_SIZE..=MAP_MAX_SIZE;
        if !size.contains(&self.width) || !size.contains(&self.height) {
            return Err(self.dimension_error());
        }
        self.check_structure()?;
        self.check_flags()?;
        self.check_walls()?;
        self.check_currents()?;
        self.check_islands()?;
        self.check_symmetry()
    }

    const fn dimension_error(&self) -> MapError {
        MapError::Dimensions {
            width: self.width,
            height: self.height,
            min: MAP_MIN_SIZE,
            max: MAP_MAX_SIZE,
        }
    }

    fn check_flags(&self) -> Result<(), MapError> {
        for team in Team::ALL {
            let spots: Vec<MapLocation> = self
                .flags
                .iter()
                .filter(|f| f.team == team)
                .map(|f| f.location)
                .collect();
            if spots.len() != NUMBER_FLAGS {
                return Err(MapError::FlagCount { team, count: spots.len(), expected: NUMBER_FLAGS });
            }
            for (i, &a) in spots.iter().enumerate() {
                if let Some(&b) = spots[i + 1..]
                    .iter()
                    .find(|b| a.distance_squared_to(**b) < MIN_FLAG_SPACING_SQUARED)
                {
                    return Err(MapError::FlagSpacing { team, a, b });
                }
            }
        }
        Ok(())
    }

    fn check_walls(&self) -> Result<(), MapError> {
        let layout = self.layout();
        for (i, _) in self.walls.iter().enumerate().filter(|(_, wall)| **wall) {
            let location = layout.location(i);
            let what = if self.spawn_zones[i].is_some() {
                Some("a spawn zone")
            } else if self.islands[i].is_some() {
                Some("an island")
            } else if !self.currents[i].is_center() {
                Some("a current")
            } else if self.wells.iter().any(|w| w.location == location) {
                Some("a well")
            } else if self.headquarters.iter().any(|h| h.location == location) {
                Some("headquarters")
            } else {
                None
            };
            if let Some(what) = what {
                return Err(MapError::WallOverlap { location, what });
            }
        }
        Ok(())
    }

    fn check_currents(&self) -> Result<(), MapError> {
        let layout = self.layout();
        let mut destinations = BTreeSet::new();
        for (i, dir) in self.currents.iter().enumerate() {
            if dir.is_center() {
                continue;
            }
            let location = layout.location(i);
            let target = location.add(*dir);
            let reason = match layout.index(target) {
                None => Some("points off the map"),
                Some(t) if self.walls[t] => Some("points into a wall"),
                Some(_) if !destinations.insert(target) => Some("shares a destination"),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                return Err(MapError::Current { location, reason });
            }
        }
        Ok(())
    }

    fn check_islands(&self) -> Result<(), MapError> {
        let ids: BTreeSet<u32> = self.islands.iter().flatten().map(|id| id.0).collect();
        let count = self.island_count();
        if usize::try_from(count).unwrap_or(usize::MAX) > MAX_NUMBER_ISLANDS {
            return Err(MapError::Islands(format!("{count} islands exceed the limit of {MAX_NUMBER_ISLANDS}")));
        }
        if let Some(missing) = (1..=count).find(|id| !ids.contains(id)) {
            return Err(MapError::Islands(format!("island id {missing} has no cells")));
        }
        if ids.contains(&0) {
            return Err(MapError::Islands("island ids start at 1".into()));
        }
        Ok(())
    }

    fn check_symmetry(&self) -> Result<(), MapError> {
        let layout = self.layout();
        let sym = self.symmetry;
        for i in 0..layout.area() {
            let location = layout.location(i);
            let Some(j) = layout.index(sym.reflect(&layout, location)) else {
                return Err(MapError::Symmetry { location, what: "reflection" });
            };
            let what = if self.walls[i] != self.walls[j] {
                Some("walls")
            } else if self.water[i] != self.water[j] {
                Some("water")
            } else if self.dams[i] != self.dams[j] {
                Some("dams")
            } else if self.bread[i] != self.bread[j] {
                Some("bread")
            } else if self.islands[i].is_some() != self.islands[j].is_some() {
                Some("islands")
            } else if self.spawn_zones[i].map(Team::opponent) != self.spawn_zones[j] {
                Some("spawn zones")
            } else if sym.reflect_direction(self.currents[i]) != self.currents[j] {
                Some("currents")
            } else {
                None
            };
            if let Some(what) = what {
                return Err(MapError::Symmetry { location, what });
            }
        }
        for well in &self.wells {
            let image = sym.reflect(&layout, well.location);
            if !self.wells.iter().any(|w| w.location == image && w.kind == well.kind) {
                return Err(MapError::Symmetry { location: well.location, what: "wells" });
            }
        }
        for (list, what) in [(&self.headquarters, "headquarters"), (&self.flags, "flags")] {
            for p in list {
                let image = sym.reflect(&layout, p.location);
                if !list.iter().any(|q| q.location == image && q.team == p.team.opponent()) {
                    return Err(MapError::Symmetry { location: p.location, what });
                }
            }
        }
        Ok(())
    }
}

/// Incremental construction of a [`MapSnapshot`].
#[derive(Debug, Clone)]
pub struct MapBuilder {
    snapshot: MapSnapshot,
}

impl MapBuilder {
    /// An open map of the given size with the origin at `(0, 0)`.
    #[must_use]
    pub fn new(name: impl Into<String>, width: i32, height: i32, symmetry: Symmetry) -> Self {
        let n = Layout::new(width.max(0), height.max(0), MapLocation::new(0, 0)).area();
        Self {
            snapshot: MapSnapshot {
                name: name.into(),
                width,
                height,
                origin: MapLocation::new(0, 0),
                seed: GAME_DEFAULT_SEED,
                rounds: GAME_MAX_NUMBER_OF_ROUNDS,
                symmetry,
                walls: vec![false; n],
                water: vec![false; n],
                dams: vec![false; n],
                bread: vec![0; n],
                spawn_zones: vec![None; n],
                currents: vec![Direction::Center; n],
                islands: vec![None; n],
                wells: Vec::new(),
                headquarters: Vec::new(),
                flags: Vec::new(),
                roster: default_roster(),
            },
        }
    }

    /// Set the seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.snapshot.seed = seed;
        self
    }

    /// Set the round limit.
    #[must_use]
    pub const fn rounds(mut self, rounds: u32) -> Self {
        self.snapshot.rounds = rounds;
        self
    }

    /// Replace the per-team roster.
    #[must_use]
    pub fn roster(mut self, roster: Vec<RobotType>) -> Self {
        self.snapshot.roster = roster;
        self
    }

    /// The layout being built.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.snapshot.layout()
    }

    fn cell(&self, loc: MapLocation) -> Option<usize> {
        self.snapshot.layout().index(loc)
    }

    /// Mark `loc` as a wall.
    pub fn wall(&mut self, loc: MapLocation) -> &mut Self {
        if let Some(i) = self.cell(loc) {
            self.snapshot.walls[i] = true;
        }
        self
    }

    /// Mark `loc` as water.
    pub fn water(&mut self, loc: MapLocation) -> &mut Self {
        if let Some(i) = self.cell(loc) {
            self.snapshot.water[i] = true;
        }
        self
    }

    /// Mark `loc` as a dam.
    pub fn dam(&mut self, loc: MapLocation) -> &mut Self {
        if let Some(i) = self.cell(loc) {
            self.snapshot.dams[i] = true;
        }
        self
    }

    /// Put `amount` bread on `loc`.
    pub fn bread(&mut self, loc: MapLocation, amount: i32) -> &mut Self {
        if let Some(i) = self.cell(loc) {
            self.snapshot.bread[i] = amount;
        }
        self
    }

    /// Give `loc` to `team`'s spawn zone.
    pub fn spawn_cell(&mut self, team: Team, loc: MapLocation) -> &mut Self {
        if let Some(i) = self.cell(loc) {
            self.snapshot.spawn_zones[i] = Some(team);
        }
        self
    }

    /// A 3x3 spawn zone for `team` centred on `center`, with a flag on the center.
    pub fn spawn_zone(&mut self, team: Team, center: MapLocation) -> &mut Self {
        for dx in -1..=1 {
            for dy in -1..=1 {
                self.spawn_cell(team, center.translate(dx, dy));
            }
        }
        self.flag(team, center)
    }

    /// A flag for `team` on `loc`.
    pub fn flag(&mut self, team: Team, loc: MapLocation) -> &mut Self {
        self.snapshot.flags.push(Placement { team, location: loc });
        self
    }

    /// A current on `loc`.
    pub fn current(&mut self, loc: MapLocation, dir: Direction) -> &mut Self {
        if let Some(i) = self.cell(loc) {
            self.snapshot.currents[i] = dir;
        }
        self
    }

    /// Add `loc` to island `id`.
    pub fn island(&mut self, loc: MapLocation, id: IslandId) -> &mut Self {
        if let Some(i) = self.cell(loc) {
            self.snapshot.islands[i] = Some(id);
        }
        self
    }

    /// A well of `kind` on `loc`.
    pub fn well(&mut self, loc: MapLocation, kind: ResourceType) -> &mut Self {
        self.snapshot.wells.push(WellSpec { location: loc, kind });
        self
    }

    /// Headquarters for `team` on `loc`.
    pub fn headquarters(&mut self, team: Team, loc: MapLocation) -> &mut Self {
        self.snapshot.headquarters.push(Placement { team, location: loc });
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(&self) -> MapSnapshot {
        self.snapshot.clone()
    }
}
