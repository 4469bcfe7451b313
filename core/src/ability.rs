use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Element, ItemId, Rarity};

/// Shortest cooldown any ability may reach regardless of level.
pub const MIN_COOLDOWN: Duration = Duration::from_millis(1);

/// Unique key identifying an ability definition in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(String);

impl AbilityId {
    /// Creates a new ability identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base combat statistics of an ability at level 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityStats {
    /// Damage dealt by each projectile or attack.
    pub damage: u32,
    /// Milliseconds between casts at level 1.
    pub cooldown_ms: u32,
    /// Projectiles emitted per cast.
    #[serde(default = "default_projectile_count")]
    pub projectile_count: u32,
    /// Projectile travel speed in world units per second, if the ability fires projectiles.
    #[serde(default)]
    pub speed: Option<f32>,
}

const fn default_projectile_count() -> u32 {
    1
}

/// How an ability becomes available during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityLineage {
    /// Offered from the start of the run.
    #[default]
    Base,
    /// Unlocked once both required base elements are equipped as non-derived abilities.
    Derived {
        /// Base elements that must both be covered by equipped abilities.
        required_elements: [Element; 2],
        /// Element the combination visually supersedes. Informational only.
        #[serde(default)]
        replaces_element: Option<Element>,
    },
    /// Unlocked once the base ability is maxed and the required item is levelled.
    Evolved {
        /// Ability that must be equipped at its maximum level.
        evolves_from: AbilityId,
        /// Passive item that gates the evolution.
        required_item: ItemId,
        /// Minimum level of the required item.
        required_item_level: u32,
    },
}

/// Immutable, hand-authored ability definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Unique catalog key.
    pub id: AbilityId,
    /// Display name shown on level-up cards.
    pub name: String,
    /// Display description shown on level-up cards.
    #[serde(default)]
    pub description: String,
    /// Icon key resolved by the presentation layer.
    #[serde(default)]
    pub icon: String,
    /// Rarity tier used for presentation.
    pub rarity: Rarity,
    /// Element applied to every hit.
    pub element: Element,
    /// Highest level the ability can reach.
    pub max_level: u32,
    /// Level 1 statistics.
    pub stats: AbilityStats,
    /// Whether the ability gains a projectile every two levels.
    #[serde(default)]
    pub projectile_growth: bool,
    /// Unlock rules for the ability.
    #[serde(default)]
    pub lineage: AbilityLineage,
}

impl AbilityDefinition {
    /// Reports whether the ability is a two-element combination.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        matches!(self.lineage, AbilityLineage::Derived { .. })
    }

    /// Reports whether the ability is an evolution.
    #[must_use]
    pub fn is_evolved(&self) -> bool {
        matches!(self.lineage, AbilityLineage::Evolved { .. })
    }

    /// Damage per hit at `level`: 20% more for every level above 1, floored.
    #[must_use]
    pub fn effective_damage(&self, level: u32) -> u32 {
        let steps = u64::from(level.max(1) - 1);
        let scaled = u64::from(self.stats.damage) * (5 + steps) / 5;
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }

    /// Cooldown at `level`: 5% shorter for every level above 1, floored and
    /// never shorter than [`MIN_COOLDOWN`].
    #[must_use]
    pub fn effective_cooldown(&self, level: u32) -> Duration {
        let steps = i64::from(level.max(1) - 1);
        let scaled = i64::from(self.stats.cooldown_ms) * (20 - steps) / 20;
        let millis = u64::try_from(scaled).unwrap_or(0);
        Duration::from_millis(millis).max(MIN_COOLDOWN)
    }

    /// Projectiles per cast at `level`.
    ///
    /// Abilities flagged with `projectile_growth` gain one projectile for
    /// every two levels above 1.
    #[must_use]
    pub fn effective_projectile_count(&self, level: u32) -> u32 {
        let base = self.stats.projectile_count;
        if self.projectile_growth {
            base + (level.max(1) - 1) / 2
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(damage: u32, cooldown_ms: u32, projectile_growth: bool) -> AbilityDefinition {
        AbilityDefinition {
            id: AbilityId::new("test"),
            name: "Test".to_owned(),
            description: String::new(),
            icon: String::new(),
            rarity: Rarity::Common,
            element: Element::Fire,
            max_level: 8,
            stats: AbilityStats {
                damage,
                cooldown_ms,
                projectile_count: 3,
                speed: None,
            },
            projectile_growth,
            lineage: AbilityLineage::Base,
        }
    }

    #[test]
    fn damage_grows_twenty_percent_per_level() {
        let ability = definition(15, 1_000, false);
        assert_eq!(ability.effective_damage(1), 15);
        assert_eq!(ability.effective_damage(3), 21);
        assert_eq!(ability.effective_damage(4), 24);
    }

    #[test]
    fn cooldown_shrinks_five_percent_per_level() {
        let ability = definition(10, 1_000, false);
        assert_eq!(ability.effective_cooldown(1), Duration::from_millis(1_000));
        assert_eq!(ability.effective_cooldown(5), Duration::from_millis(800));
    }

    #[test]
    fn cooldown_is_floored_to_minimum() {
        let ability = definition(10, 1_000, false);
        assert_eq!(ability.effective_cooldown(21), MIN_COOLDOWN);
        assert_eq!(ability.effective_cooldown(40), MIN_COOLDOWN);
    }

    #[test]
    fn projectile_growth_adds_one_every_two_levels() {
        let growing = definition(10, 1_000, true);
        let fixed = definition(10, 1_000, false);
        assert_eq!(growing.effective_projectile_count(1), 3);
        assert_eq!(growing.effective_projectile_count(2), 3);
        assert_eq!(growing.effective_projectile_count(3), 4);
        assert_eq!(growing.effective_projectile_count(5), 5);
        assert_eq!(fixed.effective_projectile_count(5), 3);
    }

    #[test]
    fn lineage_parses_from_toml_table() {
        let source = r#"
            id = "lava"
            name = "Lava Pool"
            rarity = "rare"
            element = "lava"
            max_level = 5
            stats = { damage = 12, cooldown_ms = 2000 }

            [lineage]
            kind = "derived"
            required_elements = ["fire", "earth"]
        "#;
        let parsed: AbilityDefinition = toml::from_str(source).expect("definition parses");
        assert!(parsed.is_derived());
        assert_eq!(parsed.stats.projectile_count, 1);
        assert_eq!(
            parsed.lineage,
            AbilityLineage::Derived {
                required_elements: [Element::Fire, Element::Earth],
                replaces_element: None,
            }
        );
    }
}
