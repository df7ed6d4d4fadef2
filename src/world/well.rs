//! Resource wells.

use serde::{Deserialize, Serialize};

use crate::config::WellRules;

use super::{MapLocation, ResourceType};

/// A well that carriers collect from and deposit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Well {
    location: MapLocation,
    kind: ResourceType,
    inventory: [i32; 3],
    upgraded: bool,
}

impl Well {
    /// A fresh well producing `kind`.
    #[must_use]
    pub const fn new(location: MapLocation, kind: ResourceType) -> Self {
        Self {
            location,
            kind,
            inventory: [0; 3],
            upgraded: false,
        }
    }

    /// Where the well is.
    #[must_use]
    pub const fn location(&self) -> MapLocation {
        self.location
    }

    /// What the well currently produces.
    #[must_use]
    pub const fn kind(&self) -> ResourceType {
        self.kind
    }

    /// Deposits accumulated so far, indexed by resource.
    #[must_use]
    pub const fn inventory(&self) -> [i32; 3] {
        self.inventory
    }

    /// Whether the well has reached the upgraded extraction tier.
    #[must_use]
    pub const fn is_upgraded(&self) -> bool {
        self.upgraded
    }

    /// Units a carrier may collect per action.
    #[must_use]
    pub const fn rate(&self, rules: &WellRules) -> i32 {
        if self.upgraded { rules.upgraded_rate } else { rules.base_rate }
    }

    /// Accept a deposit, converting or upgrading the well when thresholds
    /// are crossed. Non-positive amounts are ignored.
    pub fn deposit(&mut self, resource: ResourceType, amount: i32, rules: &WellRules) {
        if amount <= 0 {
            return;
        }
        self.inventory[resource.index()] += amount;

        if self.kind.opposing_base() == Some(resource)
            && self.inventory[resource.index()] >= rules.elixir_threshold
        {
            self.kind = ResourceType::Elixir;
            if rules.zero_inventory_on_conversion {
                self.inventory = [0; 3];
            }
        }

        if !self.upgraded && self.inventory[self.kind.index()] >= rules.upgrade_threshold {
            self.upgraded = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> WellRules {
        WellRules {
            elixir_threshold: 30,
            upgrade_threshold: 50,
            zero_inventory_on_conversion: false,
            base_rate: 2,
            upgraded_rate: 4,
        }
    }

    #[test]
    fn test_upgrade_is_irreversible() {
        let rules = rules();
        let mut well = Well::new(MapLocation::new(1, 1), ResourceType::Adamantium);
        assert_eq!(well.rate(&rules), 2);
        well.deposit(ResourceType::Adamantium, 50, &rules);
        assert!(well.is_upgraded());
        assert_eq!(well.rate(&rules), 4);
        well.deposit(ResourceType::Adamantium, 1, &rules);
        assert!(well.is_upgraded());
    }

    #[test]
    fn test_opposing_deposit_converts_to_elixir() {
        let rules = rules();
        let mut well = Well::new(MapLocation::new(1, 1), ResourceType::Adamantium);
        well.deposit(ResourceType::Adamantium, 10, &rules);
        well.deposit(ResourceType::Mana, 29, &rules);
        assert_eq!(well.kind(), ResourceType::Adamantium);
        well.deposit(ResourceType::Mana, 1, &rules);
        assert_eq!(well.kind(), ResourceType::Elixir);
        assert_eq!(well.inventory(), [10, 30, 0]);
    }

    #[test]
    fn test_conversion_can_zero_inventory() {
        let mut rules = rules();
        rules.zero_inventory_on_conversion = true;
        let mut well = Well::new(MapLocation::new(1, 1), ResourceType::Mana);
        well.deposit(ResourceType::Adamantium, 30, &rules);
        assert_eq!(well.kind(), ResourceType::Elixir);
        assert_eq!(well.inventory(), [0; 3]);
    }

    #[test]
    fn test_same_kind_never_converts() {
        let rules = rules();
        let mut well = Well::new(MapLocation::new(1, 1), ResourceType::Mana);
        well.deposit(ResourceType::Mana, 1000, &rules);
        assert_eq!(well.kind(), ResourceType::Mana);
        well.deposit(ResourceType::Elixir, -5, &rules);
        assert_eq!(well.inventory()[2], 0);
    }
}
