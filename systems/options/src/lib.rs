#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level-up option generator.
//!
//! Candidates enter the ability pool in four tiers: evolutions whose
//! prerequisites are met, derived combinations whose elements are covered,
//! fresh base abilities, and upgrades of equipped abilities. Items use two
//! tiers: unequipped items, then upgradeable ones. Tiers decide eligibility
//! only; once pooled every candidate has the same chance of being drawn.

use std::{collections::BTreeSet, sync::Arc};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spellstorm_core::{
    AbilityDefinition, AbilityId, AbilityLineage, Catalog, Command, Element, Event, ItemId,
    LoadoutView,
};

/// Number of cards offered per category unless configured otherwise.
pub const DEFAULT_CHOICES: usize = 3;

/// Configuration parameters required to construct the option generator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    ability_choices: usize,
    item_choices: usize,
}

impl Config {
    /// Creates a configuration offering the given number of ability and item cards.
    #[must_use]
    pub const fn new(ability_choices: usize, item_choices: usize) -> Self {
        Self {
            ability_choices,
            item_choices,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CHOICES, DEFAULT_CHOICES)
    }
}

/// Seeded generator drawing level-up choices without replacement.
#[derive(Debug)]
pub struct OptionGenerator {
    config: Config,
    rng: ChaCha8Rng,
}

impl OptionGenerator {
    /// Creates a generator whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(config: Config, seed: u64) -> Self {
        Self::from_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a generator drawing from the provided random source.
    #[must_use]
    pub fn from_rng(config: Config, rng: ChaCha8Rng) -> Self {
        Self { config, rng }
    }

    /// Draws up to `count` ability ids from the eligible pool.
    pub fn draw_abilities(
        &mut self,
        count: usize,
        catalog: &Catalog,
        loadout: &LoadoutView,
    ) -> Vec<AbilityId> {
        draw(ability_pool(catalog, loadout), count, &mut self.rng)
    }

    /// Draws up to `count` item ids from the eligible pool.
    pub fn draw_items(
        &mut self,
        count: usize,
        catalog: &Catalog,
        loadout: &LoadoutView,
    ) -> Vec<ItemId> {
        draw(item_pool(catalog, loadout), count, &mut self.rng)
    }

    /// Emits one `Command::OfferLevelUp` for every level gained in `events`.
    pub fn handle(
        &mut self,
        events: &[Event],
        catalog: &Catalog,
        loadout: &LoadoutView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::LeveledUp { level } = event else {
                continue;
            };

            let abilities = self.draw_abilities(self.config.ability_choices, catalog, loadout);
            let items = self.draw_items(self.config.item_choices, catalog, loadout);
            if abilities.is_empty() && items.is_empty() {
                tracing::debug!(level, "no level-up options remain");
                continue;
            }

            tracing::debug!(
                level,
                abilities = abilities.len(),
                items = items.len(),
                "level-up options drawn"
            );
            out.push(Command::OfferLevelUp { abilities, items });
        }
    }
}

/// Eligible ability ids in tier order, each tier sorted by id.
#[must_use]
pub fn ability_pool(catalog: &Catalog, loadout: &LoadoutView) -> Vec<AbilityId> {
    let available = |definition: &&Arc<AbilityDefinition>| {
        loadout.ability(&definition.id).is_none() && !loadout.is_banished(&definition.id)
    };
    let covered = covered_elements(loadout);

    let evolutions = catalog
        .abilities()
        .filter(available)
        .filter(|definition| evolution_ready(definition, loadout));
    let derived = catalog
        .abilities()
        .filter(available)
        .filter(|definition| match &definition.lineage {
            AbilityLineage::Derived {
                required_elements, ..
            } => required_elements
                .iter()
                .all(|element| covered.contains(element)),
            _ => false,
        });
    let fresh = catalog
        .abilities()
        .filter(available)
        .filter(|definition| matches!(definition.lineage, AbilityLineage::Base));
    let upgrades = loadout.abilities().iter().filter(|snapshot| {
        !snapshot.definition.is_evolved()
            && !snapshot.is_maxed()
            && !loadout.is_banished(snapshot.id())
    });

    evolutions
        .chain(derived)
        .chain(fresh)
        .map(|definition| definition.id.clone())
        .chain(upgrades.map(|snapshot| snapshot.id().clone()))
        .collect()
}

/// Eligible item ids: unequipped items first, then upgradeable ones.
#[must_use]
pub fn item_pool(catalog: &Catalog, loadout: &LoadoutView) -> Vec<ItemId> {
    let fresh = catalog
        .items()
        .filter(|definition| loadout.item_level(&definition.id) == 0);
    let upgrades = loadout
        .items()
        .iter()
        .filter(|snapshot| !snapshot.is_maxed())
        .map(|snapshot| &snapshot.definition);

    fresh
        .chain(upgrades)
        .map(|definition| definition.id.clone())
        .collect()
}

fn covered_elements(loadout: &LoadoutView) -> BTreeSet<Element> {
    loadout
        .abilities()
        .iter()
        .filter(|snapshot| !snapshot.definition.is_derived())
        .map(|snapshot| snapshot.definition.element)
        .collect()
}

fn evolution_ready(definition: &AbilityDefinition, loadout: &LoadoutView) -> bool {
    let AbilityLineage::Evolved {
        evolves_from,
        required_item,
        required_item_level,
    } = &definition.lineage
    else {
        return false;
    };

    let base_maxed = loadout
        .ability(evolves_from)
        .map_or(false, |base| base.level == base.definition.max_level);
    base_maxed && loadout.item_level(required_item) >= *required_item_level
}

fn draw<T, R: Rng>(mut pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    let picks = count.min(pool.len());
    let mut chosen = Vec::with_capacity(picks);
    for _ in 0..picks {
        let index = rng.gen_range(0..pool.len());
        chosen.push(pool.remove(index));
    }
    chosen
}
