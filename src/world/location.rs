//! Map coordinates and directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An absolute position on the map.
///
/// Coordinates are signed so that locations just off the edge can be
/// represented and rejected instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapLocation {
    /// X coordinate (column). East is positive.
    pub x: i32,
    /// Y coordinate (row). North is positive.
    pub y: i32,
}

impl MapLocation {
    /// Create a new location.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub const fn distance_squared_to(self, other: MapLocation) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Whether `other` lies within the squared radius `radius_squared`.
    #[must_use]
    pub const fn is_within_distance_squared(self, other: MapLocation, radius_squared: i32) -> bool {
        self.distance_squared_to(other) <= radius_squared
    }

    /// Whether `other` is one of the eight neighbours.
    #[must_use]
    pub const fn is_adjacent_to(self, other: MapLocation) -> bool {
        let d = self.distance_squared_to(other);
        d > 0 && d <= 2
    }

    /// The neighbouring location in direction `dir`.
    #[must_use]
    pub const fn add(self, dir: Direction) -> MapLocation {
        MapLocation::new(self.x + dir.dx(), self.y + dir.dy())
    }

    /// Translate by an arbitrary offset.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> MapLocation {
        MapLocation::new(self.x + dx, self.y + dy)
    }

    /// The direction that best approximates the way to `target`.
    #[must_use]
    pub const fn direction_to(self, target: MapLocation) -> Direction {
        Direction::from_delta((target.x - self.x).signum(), (target.y - self.y).signum())
    }
}

impl fmt::Display for MapLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight compass directions, or no movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// +y.
    North,
    /// +x, +y.
    NorthEast,
    /// +x.
    East,
    /// +x, -y.
    SouthEast,
    /// -y.
    South,
    /// -x, -y.
    SouthWest,
    /// -x.
    West,
    /// -x, +y.
    NorthWest,
    /// No displacement.
    #[default]
    Center,
}

impl Direction {
    /// The eight directions that actually move.
    pub const MOVES: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// X displacement.
    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Direction::NorthEast | Direction::East | Direction::SouthEast => 1,
            Direction::SouthWest | Direction::West | Direction::NorthWest => -1,
            Direction::North | Direction::South | Direction::Center => 0,
        }
    }

    /// Y displacement.
    #[must_use]
    pub const fn dy(self) -> i32 {
        match self {
            Direction::North | Direction::NorthEast | Direction::NorthWest => 1,
            Direction::South | Direction::SouthEast | Direction::SouthWest => -1,
            Direction::East | Direction::West | Direction::Center => 0,
        }
    }

    /// Direction for a displacement whose components are each in `-1..=1`.
    ///
    /// Larger components are clamped to their sign.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Direction {
        match (dx.signum(), dy.signum()) {
            (0, 1) => Direction::North,
            (1, 1) => Direction::NorthEast,
            (1, 0) => Direction::East,
            (1, -1) => Direction::SouthEast,
            (0, -1) => Direction::South,
            (-1, -1) => Direction::SouthWest,
            (-1, 0) => Direction::West,
            (-1, 1) => Direction::NorthWest,
            _ => Direction::Center,
        }
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        Direction::from_delta(-self.dx(), -self.dy())
    }

    /// Mirror across the horizontal axis (negate `dy`).
    #[must_use]
    pub const fn flip_vertical(self) -> Direction {
        Direction::from_delta(self.dx(), -self.dy())
    }

    /// Mirror across the vertical axis (negate `dx`).
    #[must_use]
    pub const fn flip_horizontal(self) -> Direction {
        Direction::from_delta(-self.dx(), self.dy())
    }

    /// Whether this is [`Direction::Center`].
    #[must_use]
    pub const fn is_center(self) -> bool {
        matches!(self, Direction::Center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = MapLocation::new(1, 1);
        let b = MapLocation::new(4, 5);
        assert_eq!(a.distance_squared_to(b), 25);
        assert!(a.is_within_distance_squared(b, 25));
        assert!(!a.is_within_distance_squared(b, 24));
    }

    #[test]
    fn test_adjacency_excludes_self() {
        let a = MapLocation::new(3, 3);
        assert!(!a.is_adjacent_to(a));
        assert!(a.is_adjacent_to(MapLocation::new(4, 4)));
        assert!(!a.is_adjacent_to(MapLocation::new(5, 3)));
    }

    #[test]
    fn test_direction_round_trip() {
        for dir in Direction::MOVES {
            assert_eq!(Direction::from_delta(dir.dx(), dir.dy()), dir);
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
        assert_eq!(Direction::Center.opposite(), Direction::Center);
    }

    #[test]
    fn test_flips() {
        assert_eq!(Direction::NorthEast.flip_vertical(), Direction::SouthEast);
        assert_eq!(Direction::NorthEast.flip_horizontal(), Direction::NorthWest);
        assert_eq!(Direction::East.flip_vertical(), Direction::East);
    }

    #[test]
    fn test_direction_to() {
        let from = MapLocation::new(5, 5);
        assert_eq!(from.direction_to(MapLocation::new(9, 5)), Direction::East);
        assert_eq!(from.direction_to(MapLocation::new(0, 0)), Direction::SouthWest);
        assert_eq!(from.direction_to(from), Direction::Center);
        assert_eq!(from.add(Direction::North), MapLocation::new(5, 6));
    }
}
