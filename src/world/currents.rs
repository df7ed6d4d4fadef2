//! Forced displacement by water currents.

use std::collections::{BTreeMap, VecDeque};

use super::{Grid, MapLocation, RobotId};

/// A robot as seen by the current resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drifter {
    /// Robot id.
    pub id: RobotId,
    /// Cell the robot stands on.
    pub location: MapLocation,
    /// Whether currents may move the robot at all.
    pub mobile: bool,
}

/// Resolve one round of currents.
///
/// Each mobile robot forecasts its cell displaced by the cell's flow; the
/// rest forecast their own cell. A robot is blocked when its forecast is
/// off the map, impassable, or claimed by more than one forecast, and
/// blocking spreads to every robot forecasting a cell held by a blocked
/// robot. Returns the moves of every unblocked robot that actually moves,
/// in input order, for simultaneous application.
#[must_use]
pub fn resolve_currents(grid: &Grid, robots: &[Drifter], setup_phase: bool) -> Vec<(RobotId, MapLocation)> {
    let forecasts: Vec<MapLocation> = robots
        .iter()
        .map(|r| if r.mobile { r.location.add(grid.current(r.location)) } else { r.location })
        .collect();

    let mut claims: BTreeMap<MapLocation, usize> = BTreeMap::new();
    for &target in &forecasts {
        *claims.entry(target).or_default() += 1;
    }

    let mut blocked = vec![false; robots.len()];
    let mut queue = VecDeque::new();
    for (i, robot) in robots.iter().enumerate() {
        let target = forecasts[i];
        let stays = target == robot.location;
        if stays || !grid.is_passable(target, setup_phase) || claims.get(&target).copied().unwrap_or(0) > 1 {
            blocked[i] = true;
            queue.push_back(i);
        }
    }

    // Reverse edges: occupant of a cell -> robots forecasting that cell.
    let occupant: BTreeMap<MapLocation, usize> =
        robots.iter().enumerate().map(|(i, r)| (r.location, i)).collect();
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); robots.len()];
    for (i, target) in forecasts.iter().enumerate() {
        if let Some(&holder) = occupant.get(target) {
            if holder != i {
                incoming[holder].push(i);
            }
        }
    }

    while let Some(i) = queue.pop_front() {
        for &j in &incoming[i] {
            if !blocked[j] {
                blocked[j] = true;
                queue.push_back(j);
            }
        }
    }

    robots
        .iter()
        .zip(forecasts)
        .zip(blocked)
        .filter(|((robot, target), blocked)| !blocked && *target != robot.location)
        .map(|((robot, target), _)| (robot.id, target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Direction, Layout, TerrainLayers};

    fn create_test_grid(flows: &[(MapLocation, Direction)]) -> Grid {
        let layout = Layout::new(20, 20, MapLocation::new(0, 0));
        let mut currents = vec![Direction::Center; layout.area()];
        for &(loc, dir) in flows {
            currents[layout.index(loc).unwrap()] = dir;
        }
        Grid::from_layers(
            layout,
            TerrainLayers {
                walls: Vec::new(),
                water: Vec::new(),
                dams: Vec::new(),
                bread: Vec::new(),
                spawn_zones: Vec::new(),
                currents,
                islands: Vec::new(),
            },
        )
    }

    fn drifter(id: u32, x: i32, y: i32) -> Drifter {
        Drifter { id: RobotId(id), location: MapLocation::new(x, y), mobile: true }
    }

    #[test]
    fn test_single_robot_drifts() {
        let grid = create_test_grid(&[(MapLocation::new(5, 5), Direction::East)]);
        let moves = resolve_currents(&grid, &[drifter(1, 5, 5)], false);
        assert_eq!(moves, vec![(RobotId(1), MapLocation::new(6, 5))]);
    }

    #[test]
    fn test_converging_robots_both_blocked() {
        let grid = create_test_grid(&[
            (MapLocation::new(4, 5), Direction::East),
            (MapLocation::new(6, 5), Direction::West),
        ]);
        let moves = resolve_currents(&grid, &[drifter(1, 4, 5), drifter(2, 6, 5)], false);
        assert!(moves.is_empty());
    }

    #[test]
    fn test_blocking_propagates_transitively() {
        // 1 and 2 collide on (6,5); 3 flows into 1's cell; 4 flows into 3's cell.
        let grid = create_test_grid(&[
            (MapLocation::new(5, 5), Direction::East),
            (MapLocation::new(7, 5), Direction::West),
            (MapLocation::new(5, 4), Direction::North),
            (MapLocation::new(5, 3), Direction::North),
            (MapLocation::new(10, 10), Direction::North),
        ]);
        let robots = [
            drifter(1, 5, 5),
            drifter(2, 7, 5),
            drifter(3, 5, 4),
            drifter(4, 5, 3),
            drifter(5, 10, 10),
        ];
        let moves = resolve_currents(&grid, &robots, false);
        assert_eq!(moves, vec![(RobotId(5), MapLocation::new(10, 11))]);
    }

    #[test]
    fn test_off_map_blocks() {
        let grid = create_test_grid(&[(MapLocation::new(0, 0), Direction::West)]);
        assert!(resolve_currents(&grid, &[drifter(1, 0, 0)], false).is_empty());
    }

    #[test]
    fn test_swap_is_allowed() {
        let grid = create_test_grid(&[
            (MapLocation::new(5, 5), Direction::East),
            (MapLocation::new(6, 5), Direction::West),
        ]);
        let moves = resolve_currents(&grid, &[drifter(1, 5, 5), drifter(2, 6, 5)], false);
        assert_eq!(
            moves,
            vec![(RobotId(1), MapLocation::new(6, 5)), (RobotId(2), MapLocation::new(5, 5))]
        );
    }

    #[test]
    fn test_immobile_robot_blocks_incoming() {
        let grid = create_test_grid(&[
            (MapLocation::new(5, 5), Direction::East),
            (MapLocation::new(6, 5), Direction::East),
        ]);
        let base = Drifter { id: RobotId(2), location: MapLocation::new(6, 5), mobile: false };
        assert!(resolve_currents(&grid, &[drifter(1, 5, 5), base], false).is_empty());
    }
}
