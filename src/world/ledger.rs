//! Per-team resources, shared arrays, flag tallies and global upgrades.

use crate::error::LedgerError;

use super::constants::{MAX_SHARED_ARRAY_VALUE, SHARED_ARRAY_LENGTH};
use super::{GlobalUpgrade, ResourceType, Team};

/// Team-wide bookkeeping.
///
/// Resource balances never go negative: a mutation that would make one
/// negative is refused with [`LedgerError::NegativeBalance`] and leaves the
/// ledger untouched.
#[derive(Debug, Clone, Copy)]
pub struct TeamLedger {
    resources: [[i32; 3]; 2],
    round_start: [[i32; 3]; 2],
    shared: [[i32; SHARED_ARRAY_LENGTH]; 2],
    flags_captured: [u32; 2],
    flags_picked_up: [u32; 2],
    upgrade_points: [u32; 2],
    upgrades: [[bool; 3]; 2],
}

impl Default for TeamLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamLedger {
    /// An empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            resources: [[0; 3]; 2],
            round_start: [[0; 3]; 2],
            shared: [[0; SHARED_ARRAY_LENGTH]; 2],
            flags_captured: [0; 2],
            flags_picked_up: [0; 2],
            upgrade_points: [0; 2],
            upgrades: [[false; 3]; 2],
        }
    }

    /// Balance of `resource` for `team`.
    #[must_use]
    pub const fn resource(&self, team: Team, resource: ResourceType) -> i32 {
        self.resources[team.index()][resource.index()]
    }

    /// All balances for `team`.
    #[must_use]
    pub const fn resources(&self, team: Team) -> [i32; 3] {
        self.resources[team.index()]
    }

    /// Apply a signed change to one balance, returning the new balance.
    ///
    /// # Errors
    ///
    /// Refuses changes that would leave the balance negative.
    pub fn add(&mut self, team: Team, resource: ResourceType, delta: i32) -> Result<i32, LedgerError> {
        let slot = &mut self.resources[team.index()][resource.index()];
        let next = slot.checked_add(delta).filter(|v| *v >= 0).ok_or(LedgerError::NegativeBalance {
            team,
            resource,
            balance: *slot,
            delta,
        })?;
        *slot = next;
        Ok(next)
    }

    /// Add every component of `amounts`.
    ///
    /// # Errors
    ///
    /// Refuses the whole change if any component would go negative.
    pub fn add_all(&mut self, team: Team, amounts: [i32; 3]) -> Result<(), LedgerError> {
        for resource in ResourceType::ALL {
            let balance = self.resource(team, resource);
            let delta = amounts[resource.index()];
            if balance + delta < 0 {
                return Err(LedgerError::NegativeBalance { team, resource, balance, delta });
            }
        }
        for resource in ResourceType::ALL {
            self.add(team, resource, amounts[resource.index()])?;
        }
        Ok(())
    }

    /// Whether `team` can pay `cost`.
    #[must_use]
    pub fn can_afford(&self, team: Team, cost: [i32; 3]) -> bool {
        ResourceType::ALL
            .iter()
            .all(|&r| self.resource(team, r) >= cost[r.index()])
    }

    /// Pay `cost`.
    ///
    /// # Errors
    ///
    /// Refuses if the team cannot afford it.
    pub fn spend(&mut self, team: Team, cost: [i32; 3]) -> Result<(), LedgerError> {
        self.add_all(team, cost.map(|c| -c))
    }

    /// Read a shared array slot.
    ///
    /// # Errors
    ///
    /// Fails for indices outside the array.
    pub fn read_shared(&self, team: Team, index: usize) -> Result<i32, LedgerError> {
        self.shared[team.index()]
            .get(index)
            .copied()
            .ok_or(LedgerError::SharedIndex(index))
    }

    /// Write a shared array slot.
    ///
    /// # Errors
    ///
    /// Fails for indices outside the array or values outside `0..=MAX`.
    pub fn write_shared(&mut self, team: Team, index: usize, value: i32) -> Result<(), LedgerError> {
        if !(0..=MAX_SHARED_ARRAY_VALUE).contains(&value) {
            return Err(LedgerError::SharedValue(value));
        }
        let slot = self.shared[team.index()]
            .get_mut(index)
            .ok_or(LedgerError::SharedIndex(index))?;
        *slot = value;
        Ok(())
    }

    /// The whole shared array of `team`.
    #[must_use]
    pub const fn shared_array(&self, team: Team) -> &[i32; SHARED_ARRAY_LENGTH] {
        &self.shared[team.index()]
    }

    /// Flags `team` has captured.
    #[must_use]
    pub const fn flags_captured(&self, team: Team) -> u32 {
        self.flags_captured[team.index()]
    }

    /// Record a capture, returning the new total.
    pub const fn capture_flag(&mut self, team: Team) -> u32 {
        self.flags_captured[team.index()] += 1;
        self.flags_captured[team.index()]
    }

    /// Enemy flags `team` has picked up.
    #[must_use]
    pub const fn flags_picked_up(&self, team: Team) -> u32 {
        self.flags_picked_up[team.index()]
    }

    /// Record an enemy flag pickup.
    pub const fn pick_up_flag(&mut self, team: Team) {
        self.flags_picked_up[team.index()] += 1;
    }

    /// Unspent global upgrade points.
    #[must_use]
    pub const fn upgrade_points(&self, team: Team) -> u32 {
        self.upgrade_points[team.index()]
    }

    /// Grant one global upgrade point to each team.
    pub const fn grant_upgrade_points(&mut self) {
        self.upgrade_points[0] += 1;
        self.upgrade_points[1] += 1;
    }

    /// Whether `team` owns `upgrade`.
    #[must_use]
    pub const fn has_upgrade(&self, team: Team, upgrade: GlobalUpgrade) -> bool {
        self.upgrades[team.index()][upgrade.index()]
    }

    /// Every upgrade `team` owns.
    #[must_use]
    pub fn upgrades(&self, team: Team) -> Vec<GlobalUpgrade> {
        GlobalUpgrade::ALL
            .into_iter()
            .filter(|&u| self.has_upgrade(team, u))
            .collect()
    }

    /// Sum of an upgrade-derived bonus over the upgrades `team` owns.
    #[must_use]
    pub fn upgrade_bonus(&self, team: Team, bonus: impl Fn(GlobalUpgrade) -> i32) -> i32 {
        self.upgrades(team).into_iter().map(bonus).sum()
    }

    /// Spend a point on `upgrade`.
    ///
    /// # Errors
    ///
    /// Fails if the team has no point left. Buying an owned upgrade again is
    /// refused by the caller before it reaches the ledger.
    pub const fn buy_upgrade(&mut self, team: Team, upgrade: GlobalUpgrade) -> Result<(), LedgerError> {
        let t = team.index();
        if self.upgrade_points[t] == 0 {
            return Err(LedgerError::NoUpgradePoint(team));
        }
        self.upgrade_points[t] -= 1;
        self.upgrades[t][upgrade.index()] = true;
        Ok(())
    }

    /// Close the round: return per-team deltas since the last call and
    /// start a new baseline.
    pub fn end_round(&mut self) -> [[i32; 3]; 2] {
        let mut deltas = [[0; 3]; 2];
        for t in 0..2 {
            for r in 0..3 {
                deltas[t][r] = self.resources[t][r] - self.round_start[t][r];
            }
        }
        self.round_start = self.resources;
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_balance_fails_loudly() {
        let mut ledger = TeamLedger::new();
        ledger.add(Team::A, ResourceType::Adamantium, 5).unwrap();
        let err = ledger.add(Team::A, ResourceType::Adamantium, -6).unwrap_err();
        assert_eq!(
            err,
            LedgerError::NegativeBalance {
                team: Team::A,
                resource: ResourceType::Adamantium,
                balance: 5,
                delta: -6
            }
        );
        assert_eq!(ledger.resource(Team::A, ResourceType::Adamantium), 5);
    }

    #[test]
    fn test_spend_is_all_or_nothing() {
        let mut ledger = TeamLedger::new();
        ledger.add_all(Team::B, [100, 10, 0]).unwrap();
        assert!(!ledger.can_afford(Team::B, [80, 80, 0]));
        assert!(ledger.spend(Team::B, [80, 80, 0]).is_err());
        assert_eq!(ledger.resources(Team::B), [100, 10, 0]);
        ledger.spend(Team::B, [80, 10, 0]).unwrap();
        assert_eq!(ledger.resources(Team::B), [20, 0, 0]);
    }

    #[test]
    fn test_shared_array_bounds() {
        let mut ledger = TeamLedger::new();
        ledger.write_shared(Team::A, 63, MAX_SHARED_ARRAY_VALUE).unwrap();
        assert_eq!(ledger.read_shared(Team::A, 63), Ok(MAX_SHARED_ARRAY_VALUE));
        assert_eq!(ledger.read_shared(Team::B, 63), Ok(0));
        assert_eq!(ledger.write_shared(Team::A, 64, 1), Err(LedgerError::SharedIndex(64)));
        assert_eq!(
            ledger.write_shared(Team::A, 0, MAX_SHARED_ARRAY_VALUE + 1),
            Err(LedgerError::SharedValue(MAX_SHARED_ARRAY_VALUE + 1))
        );
        assert_eq!(ledger.write_shared(Team::A, 0, -1), Err(LedgerError::SharedValue(-1)));
    }

    #[test]
    fn test_upgrades_consume_points() {
        let mut ledger = TeamLedger::new();
        assert!(ledger.buy_upgrade(Team::A, GlobalUpgrade::Attack).is_err());
        ledger.grant_upgrade_points();
        ledger.buy_upgrade(Team::A, GlobalUpgrade::Attack).unwrap();
        assert!(ledger.has_upgrade(Team::A, GlobalUpgrade::Attack));
        assert_eq!(ledger.upgrade_points(Team::A), 0);
        assert_eq!(ledger.upgrade_points(Team::B), 1);
        assert_eq!(ledger.upgrade_bonus(Team::A, GlobalUpgrade::attack_bonus), 60);
        assert_eq!(ledger.upgrade_bonus(Team::B, GlobalUpgrade::attack_bonus), 0);
    }

    #[test]
    fn test_end_round_deltas() {
        let mut ledger = TeamLedger::new();
        ledger.add(Team::A, ResourceType::Mana, 7).unwrap();
        assert_eq!(ledger.end_round(), [[0, 7, 0], [0; 3]]);
        ledger.add(Team::A, ResourceType::Mana, -2).unwrap();
        assert_eq!(ledger.end_round(), [[0, -2, 0], [0; 3]]);
    }

    #[test]
    fn test_flag_tallies() {
        let mut ledger = TeamLedger::new();
        ledger.pick_up_flag(Team::B);
        assert_eq!(ledger.capture_flag(Team::B), 1);
        assert_eq!(ledger.capture_flag(Team::B), 2);
        assert_eq!(ledger.flags_picked_up(Team::B), 1);
        assert_eq!(ledger.flags_captured(Team::A), 0);
    }
}
