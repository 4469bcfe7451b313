use std::{collections::BTreeSet, sync::Arc, time::Duration};

use glam::Vec2;

use crate::{
    AbilityDefinition, AbilityId, EffectType, EnemyId, EnemyKind, ItemId, PassiveItemDefinition,
};

/// Immutable representation of an equipped ability used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilitySnapshot {
    /// Definition shared with the catalog.
    pub definition: Arc<AbilityDefinition>,
    /// Current level, between 1 and the definition's maximum.
    pub level: u32,
    /// Session time of the most recent cast.
    pub last_cast: Duration,
}

impl AbilitySnapshot {
    /// Identifier of the equipped ability.
    #[must_use]
    pub fn id(&self) -> &AbilityId {
        &self.definition.id
    }

    /// Reports whether the ability reached its maximum level.
    #[must_use]
    pub fn is_maxed(&self) -> bool {
        self.level >= self.definition.max_level
    }
}

/// Immutable representation of an equipped passive item used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSnapshot {
    /// Definition shared with the catalog.
    pub definition: Arc<PassiveItemDefinition>,
    /// Current level, between 1 and the definition's maximum.
    pub level: u32,
}

impl ItemSnapshot {
    /// Identifier of the equipped item.
    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.definition.id
    }

    /// Reports whether the item reached its maximum level.
    #[must_use]
    pub fn is_maxed(&self) -> bool {
        self.level >= self.definition.max_level
    }
}

/// Read-only snapshot of everything the player has equipped or banished.
#[derive(Clone, Debug, Default)]
pub struct LoadoutView {
    abilities: Vec<AbilitySnapshot>,
    items: Vec<ItemSnapshot>,
    banished: BTreeSet<AbilityId>,
}

impl LoadoutView {
    /// Creates a view from the provided snapshots, sorting them by id.
    #[must_use]
    pub fn new(
        mut abilities: Vec<AbilitySnapshot>,
        mut items: Vec<ItemSnapshot>,
        banished: BTreeSet<AbilityId>,
    ) -> Self {
        abilities.sort_by(|a, b| a.id().cmp(b.id()));
        items.sort_by(|a, b| a.id().cmp(b.id()));
        Self {
            abilities,
            items,
            banished,
        }
    }

    /// Equipped abilities in id order.
    #[must_use]
    pub fn abilities(&self) -> &[AbilitySnapshot] {
        &self.abilities
    }

    /// Equipped items in id order.
    #[must_use]
    pub fn items(&self) -> &[ItemSnapshot] {
        &self.items
    }

    /// Snapshot of the equipped ability, if any.
    #[must_use]
    pub fn ability(&self, id: &AbilityId) -> Option<&AbilitySnapshot> {
        self.abilities
            .binary_search_by(|snapshot| snapshot.id().cmp(id))
            .ok()
            .map(|index| &self.abilities[index])
    }

    /// Level of the equipped item, or zero when the item is not held.
    #[must_use]
    pub fn item_level(&self, id: &ItemId) -> u32 {
        self.items
            .binary_search_by(|snapshot| snapshot.id().cmp(id))
            .ok()
            .map_or(0, |index| self.items[index].level)
    }

    /// Reports whether the ability was banished for the rest of the run.
    #[must_use]
    pub fn is_banished(&self, id: &AbilityId) -> bool {
        self.banished.contains(id)
    }

    /// Banished ability ids.
    #[must_use]
    pub fn banished(&self) -> &BTreeSet<AbilityId> {
        &self.banished
    }

    /// Sum of `per_level × level` over every equipped item effect of type `effect`.
    #[must_use]
    pub fn total_bonus(&self, effect: EffectType) -> f32 {
        self.items
            .iter()
            .map(|snapshot| snapshot.definition.bonus_at(effect, snapshot.level))
            .sum()
    }

    /// Aggregated item bonuses relevant to casting.
    #[must_use]
    pub fn stat_modifiers(&self) -> StatModifiers {
        StatModifiers {
            damage: self.total_bonus(EffectType::Damage),
            cooldown_reduction: self.total_bonus(EffectType::CooldownReduction),
            projectile_speed: self.total_bonus(EffectType::ProjectileSpeed),
            area: self.total_bonus(EffectType::Area),
            pierce: self.total_bonus(EffectType::Pierce).max(0.0) as u32,
        }
    }
}

/// Item-derived bonuses applied on top of an ability's level scaling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatModifiers {
    /// Fractional damage increase.
    pub damage: f32,
    /// Fractional cooldown reduction.
    pub cooldown_reduction: f32,
    /// Fractional projectile speed increase.
    pub projectile_speed: f32,
    /// Fractional area increase.
    pub area: f32,
    /// Extra enemies each projectile passes through.
    pub pierce: u32,
}

/// Immutable representation of a live enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Last position reported for the enemy.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Closest enemy within `range` of `origin`, ties broken by lowest id.
    #[must_use]
    pub fn nearest_within(&self, origin: Vec2, range: f32) -> Option<&EnemySnapshot> {
        let limit = range * range;
        let mut best: Option<(&EnemySnapshot, f32)> = None;
        for snapshot in &self.snapshots {
            let distance = snapshot.position.distance_squared(origin);
            if distance > limit {
                continue;
            }
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((snapshot, distance)),
            }
        }
        best.map(|(snapshot, _)| snapshot)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}
