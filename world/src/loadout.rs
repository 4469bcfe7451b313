use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::Duration,
};

use spellstorm_core::{
    AbilityDefinition, AbilityId, AbilitySnapshot, Catalog, EffectType, ItemId, ItemSnapshot,
    LoadoutError, PassiveItemDefinition,
};

/// Outcome of a successful equip request.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Equipped<D> {
    /// The entry was new and now sits at level 1.
    Acquired(Arc<D>),
    /// The entry was already held and gained a level.
    Upgraded(u32),
}

#[derive(Clone, Debug)]
struct AbilityInstance {
    definition: Arc<AbilityDefinition>,
    level: u32,
    last_cast: Duration,
}

/// Equipped abilities of the current run.
#[derive(Clone, Debug, Default)]
pub(crate) struct AbilityLoadout {
    instances: BTreeMap<AbilityId, AbilityInstance>,
    banished: BTreeSet<AbilityId>,
}

impl AbilityLoadout {
    pub(crate) fn equip(
        &mut self,
        catalog: &Catalog,
        id: &AbilityId,
    ) -> Result<Equipped<AbilityDefinition>, LoadoutError> {
        let Some(definition) = catalog.ability(id) else {
            return Err(LoadoutError::UnknownAbility);
        };

        if self.instances.contains_key(id) {
            return self.upgrade(catalog, id).map(Equipped::Upgraded);
        }

        let _ = self.instances.insert(
            id.clone(),
            AbilityInstance {
                definition: Arc::clone(definition),
                level: 1,
                last_cast: Duration::ZERO,
            },
        );
        Ok(Equipped::Acquired(Arc::clone(definition)))
    }

    pub(crate) fn upgrade(
        &mut self,
        catalog: &Catalog,
        id: &AbilityId,
    ) -> Result<u32, LoadoutError> {
        if catalog.ability(id).is_none() {
            return Err(LoadoutError::UnknownAbility);
        }
        let instance = self
            .instances
            .get_mut(id)
            .ok_or(LoadoutError::NotEquipped)?;
        if instance.level >= instance.definition.max_level {
            return Err(LoadoutError::MaxLevel);
        }
        instance.level += 1;
        Ok(instance.level)
    }

    /// Stamps the cast time and returns the level the ability fired at.
    pub(crate) fn record_cast(&mut self, id: &AbilityId, now: Duration) -> Option<u32> {
        let instance = self.instances.get_mut(id)?;
        instance.last_cast = instance.last_cast.max(now);
        Some(instance.level)
    }

    pub(crate) fn banish(&mut self, id: AbilityId) -> bool {
        self.banished.insert(id)
    }

    pub(crate) fn level(&self, id: &AbilityId) -> Option<u32> {
        self.instances.get(id).map(|instance| instance.level)
    }

    pub(crate) fn banished(&self) -> &BTreeSet<AbilityId> {
        &self.banished
    }

    pub(crate) fn snapshots(&self) -> Vec<AbilitySnapshot> {
        self.instances
            .values()
            .map(|instance| AbilitySnapshot {
                definition: Arc::clone(&instance.definition),
                level: instance.level,
                last_cast: instance.last_cast,
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
struct ItemInstance {
    definition: Arc<PassiveItemDefinition>,
    level: u32,
}

/// Equipped passive items of the current run.
#[derive(Clone, Debug, Default)]
pub(crate) struct ItemInventory {
    instances: BTreeMap<ItemId, ItemInstance>,
}

impl ItemInventory {
    pub(crate) fn equip(
        &mut self,
        catalog: &Catalog,
        id: &ItemId,
    ) -> Result<Equipped<PassiveItemDefinition>, LoadoutError> {
        let Some(definition) = catalog.item(id) else {
            return Err(LoadoutError::UnknownItem);
        };

        if self.instances.contains_key(id) {
            return self.upgrade(catalog, id).map(Equipped::Upgraded);
        }

        let _ = self.instances.insert(
            id.clone(),
            ItemInstance {
                definition: Arc::clone(definition),
                level: 1,
            },
        );
        Ok(Equipped::Acquired(Arc::clone(definition)))
    }

    pub(crate) fn upgrade(&mut self, catalog: &Catalog, id: &ItemId) -> Result<u32, LoadoutError> {
        if catalog.item(id).is_none() {
            return Err(LoadoutError::UnknownItem);
        }
        let instance = self
            .instances
            .get_mut(id)
            .ok_or(LoadoutError::NotEquipped)?;
        if instance.level >= instance.definition.max_level {
            return Err(LoadoutError::MaxLevel);
        }
        instance.level += 1;
        Ok(instance.level)
    }

    /// Level of the item, zero when it is not held.
    pub(crate) fn level(&self, id: &ItemId) -> u32 {
        self.instances.get(id).map_or(0, |instance| instance.level)
    }

    pub(crate) fn total_bonus(&self, effect: EffectType) -> f32 {
        self.instances
            .values()
            .map(|instance| instance.definition.bonus_at(effect, instance.level))
            .sum()
    }

    pub(crate) fn snapshots(&self) -> Vec<ItemSnapshot> {
        self.instances
            .values()
            .map(|instance| ItemSnapshot {
                definition: Arc::clone(&instance.definition),
                level: instance.level,
            })
            .collect()
    }
}
