#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Spellstorm engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The crate also owns the static content model: ability and item
//! definitions, the validated [`Catalog`], the [`WaveTimeline`] and the
//! element resistance damage model.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod ability;
mod catalog;
mod element;
mod enemy;
mod item;
mod seed;
mod view;
mod wave;

pub use ability::{AbilityDefinition, AbilityId, AbilityLineage, AbilityStats, MIN_COOLDOWN};
pub use catalog::{Catalog, CatalogError};
pub use element::{resolve_damage, Element, ElementResistances};
pub use enemy::{EnemyId, EnemyKind};
pub use glam::Vec2;
pub use item::{EffectType, ItemEffect, ItemId, PassiveItemDefinition};
pub use seed::{
    derive_stream_seed, RNG_STREAM_OPTIONS, RNG_STREAM_SPAWN_EDGES, RNG_STREAM_SPAWN_ROLLS,
};
pub use view::{
    AbilitySnapshot, EnemySnapshot, EnemyView, ItemSnapshot, LoadoutView, StatModifiers,
};
pub use wave::{SpawnGroup, WaveDefinition, WaveTimeline};

/// Chance of a harassment squad joining a wave at neutral harassment.
pub const HARASSMENT_BASE_CHANCE: f32 = 0.3;
/// Chance of a spawned enemy being hardened at neutral resistance.
pub const RESISTANT_BASE_CHANCE: f32 = 0.4;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of session time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Equips an ability, or upgrades it when it is already equipped.
    EquipAbility {
        /// Ability to equip.
        ability: AbilityId,
    },
    /// Raises the level of an equipped ability by one.
    UpgradeAbility {
        /// Ability to upgrade.
        ability: AbilityId,
    },
    /// Excludes an ability from every future level-up offer of the run.
    BanishAbility {
        /// Ability to banish.
        ability: AbilityId,
    },
    /// Equips a passive item, or upgrades it when it is already equipped.
    EquipItem {
        /// Item to equip.
        item: ItemId,
    },
    /// Raises the level of an equipped passive item by one.
    UpgradeItem {
        /// Item to upgrade.
        item: ItemId,
    },
    /// Records that an equipped ability fired at the current session time.
    CastAbility {
        /// Ability that fired.
        ability: AbilityId,
    },
    /// Requests a projectile travelling in a fixed direction.
    SpawnProjectile {
        /// Ability that produced the projectile.
        ability: AbilityId,
        /// Element carried by the projectile.
        element: Element,
        /// Damage dealt on impact before resistances.
        damage: u32,
        /// Travel speed, if the ability defines one.
        speed: Option<f32>,
        /// Extra enemies the projectile passes through.
        pierce: u32,
        /// Position the projectile spawns at.
        origin: Vec2,
        /// Unit direction of travel.
        direction: Vec2,
    },
    /// Requests a single attack against the nearest enemy within range.
    RequestAttack {
        /// Ability that produced the attack.
        ability: AbilityId,
        /// Element carried by the attack.
        element: Element,
        /// Damage dealt on impact before resistances.
        damage: u32,
        /// Position the nearest-target search starts from.
        origin: Vec2,
        /// Search radius for the nearest target.
        range: f32,
    },
    /// Announces that a scripted wave fired.
    TriggerWave {
        /// Index of the wave within the timeline.
        wave: usize,
        /// Enemy groups after difficulty scaling.
        enemies: Vec<SpawnGroup>,
        /// Announcement attached to the wave.
        message: Option<String>,
        /// Whether the wave introduces a boss.
        boss: bool,
    },
    /// Requests that an enemy be created.
    SpawnEnemy {
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Position the enemy spawns at.
        position: Vec2,
        /// Resistance table replacing the archetype default, if any.
        resistances: Option<ElementResistances>,
    },
    /// Reports the new position of a live enemy.
    MoveEnemy {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Position after moving.
        position: Vec2,
    },
    /// Applies elemental damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Damage before resistances.
        amount: f32,
        /// Element of the damage.
        element: Element,
    },
    /// Reports the new position of the player.
    MovePlayer {
        /// Position after moving.
        position: Vec2,
    },
    /// Applies damage to the player.
    DamagePlayer {
        /// Damage dealt.
        amount: f32,
    },
    /// Grants experience to the player before item bonuses.
    GrantExperience {
        /// Experience granted.
        amount: u32,
    },
    /// Presents level-up choices to the player.
    OfferLevelUp {
        /// Ability cards on offer.
        abilities: Vec<AbilityId>,
        /// Item cards on offer.
        items: Vec<ItemId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of session time that elapsed in the tick.
        dt: Duration,
        /// Total session time after the tick.
        elapsed: Duration,
    },
    /// Confirms that an ability was equipped at level 1.
    AbilityAcquired {
        /// Ability that was equipped.
        ability: AbilityId,
        /// Display name of the ability.
        name: String,
        /// Icon key of the ability.
        icon: String,
        /// Rarity of the ability.
        rarity: Rarity,
    },
    /// Confirms that an equipped ability gained a level.
    AbilityUpgraded {
        /// Ability that was upgraded.
        ability: AbilityId,
        /// Level after the upgrade.
        level: u32,
    },
    /// Reports that an ability equip or upgrade request was rejected.
    AbilityRejected {
        /// Ability named in the request.
        ability: AbilityId,
        /// Specific reason the request failed.
        reason: LoadoutError,
    },
    /// Confirms that an ability was banished.
    AbilityBanished {
        /// Ability that was banished.
        ability: AbilityId,
    },
    /// Confirms that a passive item was equipped at level 1.
    ItemAcquired {
        /// Item that was equipped.
        item: ItemId,
        /// Display name of the item.
        name: String,
        /// Icon key of the item.
        icon: String,
        /// Rarity of the item.
        rarity: Rarity,
    },
    /// Confirms that an equipped item gained a level.
    ItemUpgraded {
        /// Item that was upgraded.
        item: ItemId,
        /// Level after the upgrade.
        level: u32,
    },
    /// Reports that an item equip or upgrade request was rejected.
    ItemRejected {
        /// Item named in the request.
        item: ItemId,
        /// Specific reason the request failed.
        reason: LoadoutError,
    },
    /// Confirms that an ability fired.
    AbilityCast {
        /// Ability that fired.
        ability: AbilityId,
        /// Level of the ability when it fired.
        level: u32,
        /// Session time of the cast.
        at: Duration,
    },
    /// Requests that the presentation layer launch a projectile.
    ProjectileSpawned {
        /// Ability that produced the projectile.
        ability: AbilityId,
        /// Element carried by the projectile.
        element: Element,
        /// Damage dealt on impact before resistances.
        damage: u32,
        /// Travel speed, if the ability defines one.
        speed: Option<f32>,
        /// Extra enemies the projectile passes through.
        pierce: u32,
        /// Position the projectile spawns at.
        origin: Vec2,
        /// Unit direction of travel.
        direction: Vec2,
    },
    /// Requests that the presentation layer attack the nearest enemy in range.
    AttackRequested {
        /// Ability that produced the attack.
        ability: AbilityId,
        /// Element carried by the attack.
        element: Element,
        /// Damage dealt on impact before resistances.
        damage: u32,
        /// Position the nearest-target search starts from.
        origin: Vec2,
        /// Search radius for the nearest target.
        range: f32,
    },
    /// Announces that a scripted wave fired.
    WaveTriggered {
        /// Index of the wave within the timeline.
        wave: usize,
        /// Enemy groups after difficulty scaling.
        enemies: Vec<SpawnGroup>,
        /// Announcement attached to the wave.
        message: Option<String>,
        /// Whether the wave introduces a boss.
        boss: bool,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Position the enemy spawned at.
        position: Vec2,
    },
    /// Confirms that an enemy took damage and survived.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Damage dealt after resistances.
        amount: f32,
        /// Health remaining after the hit.
        remaining: f32,
    },
    /// Confirms that an enemy died.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Kills recorded during the run, including this one.
        total_kills: u32,
    },
    /// Confirms that the player took damage.
    PlayerDamaged {
        /// Damage dealt.
        amount: f32,
        /// Health remaining after the hit.
        remaining: f32,
    },
    /// Announces that the player's health reached zero.
    PlayerDied,
    /// Confirms that the player gained experience.
    ExperienceGained {
        /// Experience granted after item bonuses.
        amount: u32,
        /// Experience accumulated toward the next level.
        progress: u32,
    },
    /// Announces that the player reached a new level.
    LeveledUp {
        /// Level reached.
        level: u32,
    },
    /// Presents level-up choices to the player.
    LevelUpOffered {
        /// Ability cards on offer.
        abilities: Vec<AbilityId>,
        /// Item cards on offer.
        items: Vec<ItemId>,
    },
    /// Publishes the conductor's smoothed difficulty multipliers.
    DifficultyAdjusted {
        /// Multipliers after the evaluation.
        factors: DifficultyFactors,
    },
}

/// Rarity tier of abilities and items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Most frequent tier.
    Common,
    /// Uncommon tier.
    Rare,
    /// Scarce tier.
    Epic,
    /// Rarest tier.
    Legendary,
}

/// Reasons an equip or upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadoutError {
    /// No ability with the provided id exists in the catalog.
    #[error("unknown ability")]
    UnknownAbility,
    /// No item with the provided id exists in the catalog.
    #[error("unknown item")]
    UnknownItem,
    /// The upgrade targets something that is not equipped.
    #[error("not equipped")]
    NotEquipped,
    /// The upgrade targets something already at its maximum level.
    #[error("max level reached")]
    MaxLevel,
}

/// Multipliers produced by the conductor to steer spawn pressure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyFactors {
    /// Scales the number of enemies spawned by regular waves.
    pub difficulty: f32,
    /// Scales the probability of harassment squads.
    pub harassment: f32,
    /// Scales the probability of hardened, resistant enemies.
    pub resistance: f32,
}

impl DifficultyFactors {
    /// Neutral multipliers applied at the start of a run.
    pub const NEUTRAL: Self = Self {
        difficulty: 1.0,
        harassment: 1.0,
        resistance: 1.0,
    };

    /// Scales a regular wave's enemy count by the difficulty multiplier.
    #[must_use]
    pub fn adjust_enemy_count(&self, base: u32) -> u32 {
        (base as f32 * self.difficulty).floor().max(0.0) as u32
    }

    /// Probability that a wave is joined by a harassment squad.
    #[must_use]
    pub fn harassment_chance(&self) -> f32 {
        HARASSMENT_BASE_CHANCE * self.harassment
    }

    /// Probability that a spawned enemy uses a hardened resistance table.
    #[must_use]
    pub fn resistant_chance(&self) -> f32 {
        RESISTANT_BASE_CHANCE * self.resistance
    }
}

impl Default for DifficultyFactors {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Immutable snapshot of the player's vitals used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current position of the player.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Maximum health including item bonuses.
    pub max_health: f32,
    /// Current player level.
    pub level: u32,
    /// Radius searched for single-target attacks.
    pub attack_range: f32,
}

impl PlayerSnapshot {
    /// Current health as a percentage of maximum health.
    #[must_use]
    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health * 100.0).clamp(0.0, 100.0)
    }

    /// Reports whether the player is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{DifficultyFactors, PlayerSnapshot, Vec2};

    fn player(health: f32, max_health: f32) -> PlayerSnapshot {
        PlayerSnapshot {
            position: Vec2::ZERO,
            health,
            max_health,
            level: 1,
            attack_range: 300.0,
        }
    }

    #[test]
    fn health_percent_scales_to_hundred() {
        assert!((player(75.0, 150.0).health_percent() - 50.0).abs() < f32::EPSILON);
        assert_eq!(player(-5.0, 100.0).health_percent(), 0.0);
        assert_eq!(player(10.0, 0.0).health_percent(), 0.0);
    }

    #[test]
    fn death_is_at_or_below_zero() {
        assert!(player(0.1, 100.0).is_alive());
        assert!(!player(0.0, 100.0).is_alive());
    }

    #[test]
    fn enemy_counts_floor_after_scaling() {
        let factors = DifficultyFactors {
            difficulty: 0.7,
            ..DifficultyFactors::NEUTRAL
        };
        assert_eq!(factors.adjust_enemy_count(10), 7);
        assert_eq!(factors.adjust_enemy_count(3), 2);
        assert_eq!(DifficultyFactors::NEUTRAL.adjust_enemy_count(12), 12);
    }

    #[test]
    fn spawn_chances_scale_with_bias() {
        let factors = DifficultyFactors {
            difficulty: 1.0,
            harassment: 1.5,
            resistance: 0.5,
        };
        assert!((factors.harassment_chance() - 0.45).abs() < 1e-6);
        assert!((factors.resistant_chance() - 0.2).abs() < 1e-6);
    }
}
