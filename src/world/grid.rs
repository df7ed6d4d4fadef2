//! Flat array-backed terrain grid.
//!
//! Every per-cell layer is a `Vec` of length `width * height` indexed by
//! [`Layout::index`], i.e. `(x - origin.x) + (y - origin.y) * width`.

use super::{Direction, IslandId, MapLocation, Team, TrapId};

/// Map dimensions and the location-to-index linearization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: i32,
    height: i32,
    origin: MapLocation,
}

impl Layout {
    /// Create a layout. Dimensions must be positive.
    #[must_use]
    pub const fn new(width: i32, height: i32, origin: MapLocation) -> Self {
        Self { width, height, origin }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Location of the lower-left cell.
    #[must_use]
    pub const fn origin(&self) -> MapLocation {
        self.origin
    }

    /// Number of cells.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn area(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Whether `loc` lies on the map.
    #[must_use]
    pub const fn on_the_map(&self, loc: MapLocation) -> bool {
        loc.x >= self.origin.x
            && loc.y >= self.origin.y
            && loc.x < self.origin.x + self.width
            && loc.y < self.origin.y + self.height
    }

    /// Flat index of `loc`, or `None` when off the map.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn index(&self, loc: MapLocation) -> Option<usize> {
        if !self.on_the_map(loc) {
            return None;
        }
        let dx = loc.x - self.origin.x;
        let dy = loc.y - self.origin.y;
        Some((dx + dy * self.width) as usize)
    }

    /// Inverse of [`Layout::index`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn location(&self, index: usize) -> MapLocation {
        let i = index as i32;
        MapLocation::new(self.origin.x + i % self.width, self.origin.y + i / self.width)
    }

    /// Every on-map location within `radius_squared` of `center`.
    ///
    /// Scans the bounding box `ceil(sqrt(r2)) + 1` around the center, clipped
    /// to the map, keeping cells whose exact squared distance fits. Order is
    /// x-major, then y.
    #[must_use]
    pub fn locations_within(&self, center: MapLocation, radius_squared: i32) -> Vec<MapLocation> {
        if radius_squared < 0 {
            return Vec::new();
        }
        let reach = ceil_sqrt(radius_squared) + 1;
        let min_x = (center.x - reach).max(self.origin.x);
        let max_x = (center.x + reach).min(self.origin.x + self.width - 1);
        let min_y = (center.y - reach).max(self.origin.y);
        let max_y = (center.y + reach).min(self.origin.y + self.height - 1);

        let mut out = Vec::new();
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                let loc = MapLocation::new(x, y);
                if center.distance_squared_to(loc) <= radius_squared {
                    out.push(loc);
                }
            }
        }
        out
    }

    /// Every on-map location in index order.
    pub fn all_locations(&self) -> impl Iterator<Item = MapLocation> + '_ {
        (0..self.area()).map(|i| self.location(i))
    }
}

/// Smallest `r` with `r * r >= n`, for `n >= 0`.
#[must_use]
pub fn ceil_sqrt(n: i32) -> i32 {
    let mut r = 0;
    while r * r < n {
        r += 1;
    }
    r
}

/// Terrain and derived per-cell state.
#[derive(Debug, Clone)]
pub struct Grid {
    layout: Layout,
    walls: Vec<bool>,
    water: Vec<bool>,
    dams: Vec<bool>,
    bread: Vec<i32>,
    spawn_zones: Vec<Option<Team>>,
    traps: Vec<Option<TrapId>>,
    currents: Vec<Direction>,
    islands: Vec<Option<IslandId>>,
    multipliers: [Vec<f64>; 2],
}

/// Initial terrain layers handed to [`Grid::from_layers`].
#[derive(Debug, Clone)]
pub struct TerrainLayers {
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
    /// Current direction per cell.
    pub currents: Vec<Direction>,
    /// Island membership per cell.
    pub islands: Vec<Option<IslandId>>,
}

impl Grid {
    /// An open grid: no walls, water, bread, currents or islands.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        let n = layout.area();
        Self {
            layout,
            walls: vec![false; n],
            water: vec![false; n],
            dams: vec![false; n],
            bread: vec![0; n],
            spawn_zones: vec![None; n],
            traps: vec![None; n],
            currents: vec![Direction::Center; n],
            islands: vec![None; n],
            multipliers: [vec![1.0; n], vec![1.0; n]],
        }
    }

    /// Build a grid from initial layers. Layers shorter than the area are
    /// padded with defaults; longer ones are truncated.
    #[must_use]
    pub fn from_layers(layout: Layout, layers: TerrainLayers) -> Self {
        let n = layout.area();
        let mut grid = Self::new(layout);
        grid.walls = fit(layers.walls, n, false);
        grid.water = fit(layers.water, n, false);
        grid.dams = fit(layers.dams, n, false);
        grid.bread = fit(layers.bread, n, 0);
        grid.spawn_zones = fit(layers.spawn_zones, n, None);
        grid.currents = fit(layers.currents, n, Direction::Center);
        grid.islands = fit(layers.islands, n, None);
        grid
    }

    /// The layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether `loc` is on the map.
    #[must_use]
    pub const fn on_the_map(&self, loc: MapLocation) -> bool {
        self.layout.on_the_map(loc)
    }

    /// Whether `loc` is a wall. Off-map cells count as walls.
    #[must_use]
    pub fn is_wall(&self, loc: MapLocation) -> bool {
        self.layout.index(loc).is_none_or(|i| self.walls[i])
    }

    /// Whether `loc` is water.
    #[must_use]
    pub fn is_water(&self, loc: MapLocation) -> bool {
        self.layout.index(loc).is_some_and(|i| self.water[i])
    }

    /// Whether `loc` is a dam.
    #[must_use]
    pub fn is_dam(&self, loc: MapLocation) -> bool {
        self.layout.index(loc).is_some_and(|i| self.dams[i])
    }

    /// Whether a robot may stand on `loc`.
    ///
    /// Walls and water always block. Dams block only during the setup phase.
    #[must_use]
    pub fn is_passable(&self, loc: MapLocation, setup_phase: bool) -> bool {
        match self.layout.index(loc) {
            None => false,
            Some(i) => !self.walls[i] && !self.water[i] && !(setup_phase && self.dams[i]),
        }
    }

    /// Set or clear water on `loc`. Returns false when off the map.
    pub fn set_water(&mut self, loc: MapLocation, water: bool) -> bool {
        match self.layout.index(loc) {
            Some(i) => {
                self.water[i] = water;
                true
            }
            None => false,
        }
    }

    /// Bread lying on `loc`.
    #[must_use]
    pub fn bread(&self, loc: MapLocation) -> i32 {
        self.layout.index(loc).map_or(0, |i| self.bread[i])
    }

    /// Remove and return the bread on `loc`.
    pub fn take_bread(&mut self, loc: MapLocation) -> i32 {
        self.layout
            .index(loc)
            .map_or(0, |i| std::mem::take(&mut self.bread[i]))
    }

    /// Team owning the spawn zone at `loc`.
    #[must_use]
    pub fn spawn_zone(&self, loc: MapLocation) -> Option<Team> {
        self.layout.index(loc).and_then(|i| self.spawn_zones[i])
    }

    /// Every spawn cell of `team`, in index order.
    #[must_use]
    pub fn spawn_locations(&self, team: Team) -> Vec<MapLocation> {
        self.spawn_zones
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == Some(team))
            .map(|(i, _)| self.layout.location(i))
            .collect()
    }

    /// Trap built on `loc`.
    #[must_use]
    pub fn trap(&self, loc: MapLocation) -> Option<TrapId> {
        self.layout.index(loc).and_then(|i| self.traps[i])
    }

    /// Record or clear the trap built on `loc`.
    pub fn set_trap(&mut self, loc: MapLocation, trap: Option<TrapId>) {
        if let Some(i) = self.layout.index(loc) {
            self.traps[i] = trap;
        }
    }

    /// Current flowing through `loc`.
    #[must_use]
    pub fn current(&self, loc: MapLocation) -> Direction {
        self.layout.index(loc).map_or(Direction::Center, |i| self.currents[i])
    }

    /// Island that `loc` belongs to.
    #[must_use]
    pub fn island(&self, loc: MapLocation) -> Option<IslandId> {
        self.layout.index(loc).and_then(|i| self.islands[i])
    }

    /// Cooldown multiplier for `team` on `loc`. Off-map cells report 1.0.
    #[must_use]
    pub fn cooldown_multiplier(&self, loc: MapLocation, team: Team) -> f64 {
        self.layout
            .index(loc)
            .map_or(1.0, |i| self.multipliers[team.index()][i])
    }

    /// Overwrite the multiplier for `team` at flat index `index`.
    pub fn set_cooldown_multiplier(&mut self, index: usize, team: Team, value: f64) {
        if let Some(slot) = self.multipliers[team.index()].get_mut(index) {
            *slot = value;
        }
    }

    /// Scale a base cooldown by the multiplier at `loc`, rounding to nearest.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn scaled_cooldown(&self, base: i32, loc: MapLocation, team: Team) -> i32 {
        (f64::from(base) * self.cooldown_multiplier(loc, team)).round() as i32
    }

    /// Lengths of every per-cell layer, by name.
    #[must_use]
    pub fn layer_lengths(&self) -> [(&'static str, usize); 10] {
        [
            ("walls", self.walls.len()),
            ("water", self.water.len()),
            ("dams", self.dams.len()),
            ("bread", self.bread.len()),
            ("spawn_zones", self.spawn_zones.len()),
            ("traps", self.traps.len()),
            ("currents", self.currents.len()),
            ("islands", self.islands.len()),
            ("multipliers_a", self.multipliers[0].len()),
            ("multipliers_b", self.multipliers[1].len()),
        ]
    }
}

fn fit<T: Clone>(mut layer: Vec<T>, len: usize, fill: T) -> Vec<T> {
    layer.resize(len, fill);
    layer
}
