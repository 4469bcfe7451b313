use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use thiserror::Error;

use crate::{AbilityDefinition, AbilityId, AbilityLineage, Element, ItemId, PassiveItemDefinition};

/// Violations detected while assembling catalogs or timelines.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two ability definitions share the same id.
    #[error("duplicate ability id `{0}`")]
    DuplicateAbility(AbilityId),
    /// Two item definitions share the same id.
    #[error("duplicate item id `{0}`")]
    DuplicateItem(ItemId),
    /// An ability declares a maximum level of zero.
    #[error("ability `{0}` must allow at least one level")]
    AbilityMaxLevel(AbilityId),
    /// An item declares a maximum level of zero.
    #[error("item `{0}` must allow at least one level")]
    ItemMaxLevel(ItemId),
    /// An evolution names a base ability missing from the catalog.
    #[error("evolution `{ability}` evolves from unknown ability `{base}`")]
    UnknownEvolutionBase {
        /// Evolved ability declaring the dependency.
        ability: AbilityId,
        /// Missing base ability.
        base: AbilityId,
    },
    /// An evolution names another evolution as its base.
    #[error("evolution `{ability}` cannot evolve from evolved ability `{base}`")]
    EvolvedEvolutionBase {
        /// Evolved ability declaring the dependency.
        ability: AbilityId,
        /// Base ability that is itself evolved.
        base: AbilityId,
    },
    /// An evolution names an item missing from the catalog.
    #[error("evolution `{ability}` requires unknown item `{item}`")]
    UnknownEvolutionItem {
        /// Evolved ability declaring the dependency.
        ability: AbilityId,
        /// Missing item.
        item: ItemId,
    },
    /// A derived ability requires an element no non-derived ability provides.
    #[error("derived ability `{ability}` requires unavailable element `{element:?}`")]
    UnavailableElement {
        /// Derived ability declaring the requirement.
        ability: AbilityId,
        /// Element not provided by any base ability.
        element: Element,
    },
    /// A wave fires before the wave preceding it.
    #[error("wave {index} triggers before the wave preceding it")]
    UnorderedTimeline {
        /// Index of the offending wave.
        index: usize,
    },
    /// A wave declares a negative or non-finite trigger time.
    #[error("wave {index} has an invalid trigger time")]
    InvalidTriggerTime {
        /// Index of the offending wave.
        index: usize,
    },
}

/// Validated, read-only registry of ability and item definitions.
///
/// Catalogs are assembled once and shared across the run through [`Arc`].
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    abilities: BTreeMap<AbilityId, Arc<AbilityDefinition>>,
    items: BTreeMap<ItemId, Arc<PassiveItemDefinition>>,
}

impl Catalog {
    /// Builds a catalog after checking every cross-reference between definitions.
    pub fn new(
        abilities: Vec<AbilityDefinition>,
        items: Vec<PassiveItemDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut item_map = BTreeMap::new();
        for item in items {
            if item.max_level == 0 {
                return Err(CatalogError::ItemMaxLevel(item.id));
            }
            let id = item.id.clone();
            if item_map.insert(id.clone(), Arc::new(item)).is_some() {
                return Err(CatalogError::DuplicateItem(id));
            }
        }

        let mut ability_map = BTreeMap::new();
        for ability in abilities {
            if ability.max_level == 0 {
                return Err(CatalogError::AbilityMaxLevel(ability.id));
            }
            let id = ability.id.clone();
            if ability_map.insert(id.clone(), Arc::new(ability)).is_some() {
                return Err(CatalogError::DuplicateAbility(id));
            }
        }

        let base_elements: BTreeSet<Element> = ability_map
            .values()
            .filter(|definition| !definition.is_derived())
            .map(|definition| definition.element)
            .collect();

        for definition in ability_map.values() {
            match &definition.lineage {
                AbilityLineage::Base => {}
                AbilityLineage::Derived {
                    required_elements, ..
                } => {
                    for element in required_elements {
                        if !element.is_base() || !base_elements.contains(element) {
                            return Err(CatalogError::UnavailableElement {
                                ability: definition.id.clone(),
                                element: *element,
                            });
                        }
                    }
                }
                AbilityLineage::Evolved {
                    evolves_from,
                    required_item,
                    ..
                } => {
                    let Some(base) = ability_map.get(evolves_from) else {
                        return Err(CatalogError::UnknownEvolutionBase {
                            ability: definition.id.clone(),
                            base: evolves_from.clone(),
                        });
                    };
                    if base.is_evolved() {
                        return Err(CatalogError::EvolvedEvolutionBase {
                            ability: definition.id.clone(),
                            base: evolves_from.clone(),
                        });
                    }
                    if !item_map.contains_key(required_item) {
                        return Err(CatalogError::UnknownEvolutionItem {
                            ability: definition.id.clone(),
                            item: required_item.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            abilities: ability_map,
            items: item_map,
        })
    }

    /// Looks up an ability definition.
    #[must_use]
    pub fn ability(&self, id: &AbilityId) -> Option<&Arc<AbilityDefinition>> {
        self.abilities.get(id)
    }

    /// Looks up an item definition.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&Arc<PassiveItemDefinition>> {
        self.items.get(id)
    }

    /// Iterator over every ability definition in id order.
    pub fn abilities(&self) -> impl Iterator<Item = &Arc<AbilityDefinition>> {
        self.abilities.values()
    }

    /// Iterator over every item definition in id order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<PassiveItemDefinition>> {
        self.items.values()
    }
}
