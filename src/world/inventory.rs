//! Robot inventories: resources and anchors, bounded by weight.

use serde::{Deserialize, Serialize};

use super::constants::ANCHOR_WEIGHT;
use super::{AnchorType, ResourceType};

/// Resources and anchors held by one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    capacity: Option<i32>,
    resources: [i32; 3],
    anchors: [i32; 2],
}

impl Inventory {
    /// An empty inventory. `None` capacity means unbounded.
    #[must_use]
    pub const fn new(capacity: Option<i32>) -> Self {
        Self {
            capacity,
            resources: [0; 3],
            anchors: [0; 2],
        }
    }

    /// Weight limit.
    #[must_use]
    pub const fn capacity(&self) -> Option<i32> {
        self.capacity
    }

    /// Amount of `resource` held.
    #[must_use]
    pub const fn resource(&self, resource: ResourceType) -> i32 {
        self.resources[resource.index()]
    }

    /// Number of `anchor` held.
    #[must_use]
    pub const fn anchors(&self, anchor: AnchorType) -> i32 {
        self.anchors[anchor.index()]
    }

    /// Total number of anchors held.
    #[must_use]
    pub const fn total_anchors(&self) -> i32 {
        self.anchors[0] + self.anchors[1]
    }

    /// Total resources held, anchors excluded.
    #[must_use]
    pub const fn resource_total(&self) -> i32 {
        self.resources[0] + self.resources[1] + self.resources[2]
    }

    /// Current weight.
    #[must_use]
    pub const fn weight(&self) -> i32 {
        self.resource_total() + ANCHOR_WEIGHT * self.total_anchors()
    }

    /// Whether `weight` more units fit.
    #[must_use]
    pub fn can_add(&self, weight: i32) -> bool {
        self.capacity.is_none_or(|cap| self.weight() + weight <= cap)
    }

    /// Room left, or `None` when unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<i32> {
        self.capacity.map(|cap| (cap - self.weight()).max(0))
    }

    /// Add (or with a negative amount, remove) resources.
    ///
    /// Returns false without changing anything if the result would be
    /// negative or over capacity.
    pub fn add_resource(&mut self, resource: ResourceType, amount: i32) -> bool {
        let slot = resource.index();
        let next = self.resources[slot] + amount;
        if next < 0 || (amount > 0 && !self.can_add(amount)) {
            return false;
        }
        self.resources[slot] = next;
        true
    }

    /// Add (or remove) anchors, with the same rules as [`Inventory::add_resource`].
    pub fn add_anchor(&mut self, anchor: AnchorType, count: i32) -> bool {
        let slot = anchor.index();
        let next = self.anchors[slot] + count;
        if next < 0 || (count > 0 && !self.can_add(count * ANCHOR_WEIGHT)) {
            return false;
        }
        self.anchors[slot] = next;
        true
    }

    /// Remove every resource, returning what was held.
    pub fn take_resources(&mut self) -> [i32; 3] {
        std::mem::take(&mut self.resources)
    }

    /// The anchor to plant first: accelerating anchors take priority.
    #[must_use]
    pub const fn preferred_anchor(&self) -> Option<AnchorType> {
        if self.anchors(AnchorType::Accelerating) > 0 {
            Some(AnchorType::Accelerating)
        } else if self.anchors(AnchorType::Standard) > 0 {
            Some(AnchorType::Standard)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_bounds_resources() {
        let mut inv = Inventory::new(Some(40));
        assert!(inv.add_resource(ResourceType::Adamantium, 30));
        assert!(!inv.add_resource(ResourceType::Mana, 11));
        assert!(inv.add_resource(ResourceType::Mana, 10));
        assert_eq!(inv.weight(), 40);
        assert_eq!(inv.remaining(), Some(0));
    }

    #[test]
    fn test_never_negative() {
        let mut inv = Inventory::new(Some(40));
        assert!(!inv.add_resource(ResourceType::Elixir, -1));
        assert_eq!(inv.resource(ResourceType::Elixir), 0);
    }

    #[test]
    fn test_unbounded_base_inventory() {
        let mut inv = Inventory::new(None);
        assert!(inv.add_resource(ResourceType::Adamantium, 1_000_000));
        assert!(inv.add_anchor(AnchorType::Standard, 50));
        assert_eq!(inv.remaining(), None);
    }

    #[test]
    fn test_anchor_weight() {
        let mut inv = Inventory::new(Some(40));
        assert!(inv.add_anchor(AnchorType::Standard, 1));
        assert!(!inv.add_resource(ResourceType::Mana, 1));
        assert_eq!(inv.preferred_anchor(), Some(AnchorType::Standard));
        assert!(inv.add_anchor(AnchorType::Standard, -1));
        assert_eq!(inv.preferred_anchor(), None);
    }

    #[test]
    fn test_take_resources_empties() {
        let mut inv = Inventory::new(Some(40));
        inv.add_resource(ResourceType::Mana, 12);
        assert_eq!(inv.take_resources(), [0, 12, 0]);
        assert_eq!(inv.weight(), 0);
    }
}
