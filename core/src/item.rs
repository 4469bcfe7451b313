use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Rarity;

/// Unique key identifying a passive item definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item identifier.
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

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Statistic a passive item effect contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Fractional reduction of ability cooldowns.
    CooldownReduction,
    /// Fractional increase of ability damage.
    Damage,
    /// Fractional increase of player movement speed.
    MoveSpeed,
    /// Flat increase of player maximum health.
    MaxHealth,
    /// Fractional increase of experience gained.
    ExperienceGain,
    /// Fractional increase of ability area.
    Area,
    /// Fractional increase of projectile speed.
    ProjectileSpeed,
    /// Additional enemies a projectile passes through.
    Pierce,
}

/// Single effect entry contributed per item level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemEffect {
    /// Statistic affected by the entry.
    pub effect: EffectType,
    /// Bonus contributed for every level of the owning item.
    pub per_level: f32,
}

/// Immutable, hand-authored passive item definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassiveItemDefinition {
    /// Unique catalog key.
    pub id: ItemId,
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
    /// Highest level the item can reach.
    pub max_level: u32,
    /// Effects applied per level.
    #[serde(default)]
    pub effects: Vec<ItemEffect>,
}

impl PassiveItemDefinition {
    /// Bonus this item contributes to `effect` when held at `level`.
    #[must_use]
    pub fn bonus_at(&self, effect: EffectType, level: u32) -> f32 {
        self.effects
            .iter()
            .filter(|entry| entry.effect == effect)
            .map(|entry| entry.per_level * level as f32)
            .sum()
    }
}
