//! World invariants - sanity checks that detect engine bugs.
//!
//! A correct engine never trips these. They are enabled per round by
//! [`crate::config::MatchConfig::check_invariants`] and by the property tests.

use std::collections::BTreeMap;

use super::{GameWorld, ResourceType, RobotId, Team};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &GameWorld) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // Health bounds
    for robot in world.robots().iter() {
        if robot.health() < 1 || robot.health() > robot.max_health() {
            violations.push(violation(format!(
                "Robot {} has health {} outside [1, {}]",
                robot.id(),
                robot.health(),
                robot.max_health()
            )));
        }
    }

    // Occupancy index agrees with robot locations
    for loc in world.robots().occupancy_mismatches() {
        violations.push(violation(format!("Occupancy index disagrees with robots at {loc}")));
    }

    // Each flag has at most one live, spawned carrier
    let mut carriers: BTreeMap<RobotId, usize> = BTreeMap::new();
    for flag in world.flags().all() {
        let Some(carrier) = flag.carrier() else {
            continue;
        };
        *carriers.entry(carrier).or_default() += 1;
        match world.robot(carrier) {
            Some(robot) if robot.is_spawned() => {
                if robot.location() != Some(flag.location()) {
                    violations.push(violation(format!(
                        "Flag {} is not where its carrier {carrier} stands",
                        flag.id()
                    )));
                }
            }
            _ => violations.push(violation(format!(
                "Flag {} is carried by missing or despawned robot {carrier}",
                flag.id()
            ))),
        }
    }
    for (carrier, count) in carriers {
        if count > 1 {
            violations.push(violation(format!("Robot {carrier} carries {count} flags")));
        }
    }

    // Per-cell layers
    let area = world.grid().layout().area();
    for (name, len) in world.grid().layer_lengths() {
        if len != area {
            violations.push(violation(format!("Layer `{name}` has {len} cells, expected {area}")));
        }
    }

    // Ledger
    for team in Team::ALL {
        for resource in ResourceType::ALL {
            let balance = world.ledger().resource(team, resource);
            if balance < 0 {
                violations.push(violation(format!("{team:?} holds {balance} {resource:?}")));
            }
        }
    }

    // Multipliers
    for loc in world.grid().layout().all_locations() {
        for team in Team::ALL {
            let multiplier = world.grid().cooldown_multiplier(loc, team);
            if multiplier <= 0.0 {
                violations.push(violation(format!(
                    "Cooldown multiplier {multiplier} at {loc} for {team:?} is not positive"
                )));
            }
        }
    }

    violations
}
