//! Reward catalog and the pool the orchestrator draws from.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single reward that a mini-game can grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reward {
    /// Unique key within a catalog.
    pub name: String,
    /// Glyph shown on wheels, cards and reveal screens.
    pub icon: String,
    pub caption: String,
}

impl Reward {
    #[must_use]
    pub fn new(name: &str, icon: &str, caption: &str) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
            caption: caption.to_string(),
        }
    }
}

/// Ordered, name-unique list of rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    /// Build a catalog from rewards in display order.
    #[must_use]
    pub const fn new(rewards: Vec<Reward>) -> Self {
        Self { rewards }
    }

    /// The six gifts of the birthday gift box.
    #[must_use]
    pub fn gift_box() -> Self {
        Self::new(vec![
            Reward::new("Chocolate", "🍫", "Sweet treats for my sweet love 💝"),
            Reward::new(
                "Lipstick",
                "💄",
                "To make your beautiful smile even brighter 💝",
            ),
            Reward::new("Spiderman", "🕷️", "Your favorite superhero adventure 💝"),
            Reward::new("Ring", "💍", "A symbol of our endless bond 💝"),
            Reward::new("Drawing Book", "📓", "For your creative masterpieces 💝"),
            Reward::new("Pencil", "✏️", "To write our love story 💝"),
        ])
    }

    #[must_use]
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// First name that appears more than once, if any.
    #[must_use]
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.rewards
            .iter()
            .find(|reward| !seen.insert(reward.name.as_str()))
            .map(|reward| reward.name.as_str())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Reward> {
        self.rewards.iter().find(|reward| reward.name == name)
    }
}

/// Authoritative split of the catalog into still-available and won rewards.
///
/// Owned and mutated only by the orchestrator. Every catalog reward is in
/// exactly one of the two lists at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    available: Vec<Reward>,
    won: Vec<Reward>,
}

impl RewardPool {
    /// Fresh pool with every catalog reward available.
    #[must_use]
    pub fn new(catalog: &RewardCatalog) -> Self {
        Self {
            available: catalog.rewards().to_vec(),
            won: Vec::new(),
        }
    }

    /// Rewards not yet won, in catalog order.
    #[must_use]
    pub fn available(&self) -> &[Reward] {
        &self.available
    }

    /// Rewards won so far, in the order they were won.
    #[must_use]
    pub fn won(&self) -> &[Reward] {
        &self.won
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Reward> {
        self.won.last()
    }

    /// Owned copy of the available rewards for handing to a module.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Reward> {
        self.available.clone()
    }

    /// Move the named reward from available to won.
    ///
    /// Returns `None` when the reward is not available (already won or unknown).
    pub fn award(&mut self, name: &str) -> Option<&Reward> {
        let position = self
            .available
            .iter()
            .position(|reward| reward.name == name)?;
        let reward = self.available.remove(position);
        self.won.push(reward);
        self.won.last()
    }

    /// Check that `available` and `won` partition `catalog` exactly.
    #[must_use]
    pub fn partitions(&self, catalog: &RewardCatalog) -> bool {
        if self.available.len() + self.won.len() != catalog.len() {
            return false;
        }
        let available: HashSet<&str> = self.available.iter().map(|r| r.name.as_str()).collect();
        let won: HashSet<&str> = self.won.iter().map(|r| r.name.as_str()).collect();
        if available.len() != self.available.len() || won.len() != self.won.len() {
            return false;
        }
        available.is_disjoint(&won)
            && catalog
                .rewards()
                .iter()
                .all(|r| available.contains(r.name.as_str()) || won.contains(r.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gift_box_catalog_has_six_unique_rewards() {
        let catalog = RewardCatalog::gift_box();
        assert_eq!(catalog.len(), 6);
        assert!(catalog.duplicate_name().is_none());
        assert_eq!(catalog.get("Ring").map(|r| r.icon.as_str()), Some("💍"));
    }

    #[test]
    fn duplicate_names_are_detected() {
        let catalog = RewardCatalog::new(vec![
            Reward::new("Ring", "💍", "a"),
            Reward::new("Pencil", "✏️", "b"),
            Reward::new("Ring", "💍", "c"),
        ]);
        assert_eq!(catalog.duplicate_name(), Some("Ring"));
    }

    #[test]
    fn award_moves_reward_and_keeps_partition() {
        let catalog = RewardCatalog::gift_box();
        let mut pool = RewardPool::new(&catalog);
        let won = pool.award("Spiderman").cloned().unwrap();
        assert_eq!(won.name, "Spiderman");
        assert_eq!(pool.available().len(), 5);
        assert_eq!(pool.latest(), Some(&won));
        assert!(pool.partitions(&catalog));
        assert!(pool.award("Spiderman").is_none());
        assert!(pool.award("Unicorn").is_none());
        assert!(pool.partitions(&catalog));
    }

    #[test]
    fn available_keeps_catalog_order_after_removal() {
        let catalog = RewardCatalog::gift_box();
        let mut pool = RewardPool::new(&catalog);
        pool.award("Lipstick");
        let names: Vec<&str> = pool.available().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            ["Chocolate", "Spiderman", "Ring", "Drawing Book", "Pencil"]
        );
    }
}
