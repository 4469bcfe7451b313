#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Spellstorm.
//!
//! The world owns every piece of mutable per-run state: the equipped
//! abilities and items, the banished set, the player's vitals and
//! progression, and the live enemies. It is mutated exclusively through
//! [`apply`] and observed through the [`query`] module.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use spellstorm_core::{
    resolve_damage, AbilityId, Catalog, Command, EffectType, ElementResistances, EnemyId,
    EnemyKind, Event, ItemId, Vec2,
};

mod loadout;

use loadout::{AbilityLoadout, Equipped, ItemInventory};

const DEFAULT_MAX_HEALTH: f32 = 100.0;
const DEFAULT_ATTACK_RANGE: f32 = 320.0;
const EXPERIENCE_BASE: u32 = 5;
const EXPERIENCE_PER_LEVEL: u32 = 10;

/// Player parameters fixed for the duration of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Maximum health before item bonuses.
    pub max_health: f32,
    /// Radius searched by single-target attacks.
    pub attack_range: f32,
    /// Position the player starts at.
    pub spawn: Vec2,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: DEFAULT_MAX_HEALTH,
            attack_range: DEFAULT_ATTACK_RANGE,
            spawn: Vec2::ZERO,
        }
    }
}

/// Experience required to advance from `level` to the next level.
#[must_use]
pub const fn experience_to_next(level: u32) -> u32 {
    EXPERIENCE_BASE + EXPERIENCE_PER_LEVEL * level
}

#[derive(Clone, Debug)]
struct Player {
    position: Vec2,
    health: f32,
    max_health: f32,
    level: u32,
    experience: u32,
}

impl Player {
    fn new(config: &PlayerConfig) -> Self {
        Self {
            position: config.spawn,
            health: config.max_health,
            max_health: config.max_health,
            level: 1,
            experience: 0,
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    kind: EnemyKind,
    position: Vec2,
    health: f32,
    resistances: ElementResistances,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct PendingOffer {
    abilities: Vec<AbilityId>,
    items: Vec<ItemId>,
}

/// Represents the authoritative Spellstorm run state.
#[derive(Debug)]
pub struct World {
    catalog: Arc<Catalog>,
    config: PlayerConfig,
    clock: Duration,
    abilities: AbilityLoadout,
    items: ItemInventory,
    player: Player,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: u32,
    kills: u32,
    pending_offers: VecDeque<PendingOffer>,
}

impl World {
    /// Creates a new world using the default player configuration.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_config(catalog, PlayerConfig::default())
    }

    /// Creates a new world using the provided player configuration.
    #[must_use]
    pub fn with_config(catalog: Arc<Catalog>, config: PlayerConfig) -> Self {
        Self {
            catalog,
            player: Player::new(&config),
            config,
            clock: Duration::ZERO,
            abilities: AbilityLoadout::default(),
            items: ItemInventory::default(),
            enemies: BTreeMap::new(),
            next_enemy_id: 0,
            kills: 0,
            pending_offers: VecDeque::new(),
        }
    }

    /// Discards every piece of run state, keeping the catalog and configuration.
    pub fn reset(&mut self) {
        *self = Self::with_config(Arc::clone(&self.catalog), self.config);
    }

    /// Drops the oldest offer once the player picks one of its cards.
    fn resolve_offer(&mut self, picked: impl Fn(&PendingOffer) -> bool) {
        if self.pending_offers.front().is_some_and(picked) {
            let _ = self.pending_offers.pop_front();
        }
    }

    fn refresh_max_health(&mut self) {
        let max_health = self.config.max_health + self.items.total_bonus(EffectType::MaxHealth);
        let gained = max_health - self.player.max_health;
        self.player.max_health = max_health;
        if gained > 0.0 && self.player.is_alive() {
            self.player.health = (self.player.health + gained).min(max_health);
        }
    }

    fn grant_experience(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if amount == 0 || !self.player.is_alive() {
            return;
        }

        let bonus = self.items.total_bonus(EffectType::ExperienceGain).max(0.0);
        let scaled = if bonus > 0.0 {
            (amount as f32 * (1.0 + bonus)).floor() as u32
        } else {
            amount
        };

        self.player.experience = self.player.experience.saturating_add(scaled);
        out_events.push(Event::ExperienceGained {
            amount: scaled,
            progress: self.player.experience,
        });

        loop {
            let required = experience_to_next(self.player.level);
            if self.player.experience < required {
                break;
            }
            self.player.experience -= required;
            self.player.level += 1;
            tracing::debug!(level = self.player.level, "player leveled up");
            out_events.push(Event::LeveledUp {
                level: self.player.level,
            });
        }
    }

    fn damage_enemy(
        &mut self,
        enemy_id: EnemyId,
        amount: f32,
        element: spellstorm_core::Element,
        out_events: &mut Vec<Event>,
    ) {
        let Some(enemy) = self.enemies.get_mut(&enemy_id) else {
            return;
        };

        let dealt = resolve_damage(amount.max(0.0), element, &enemy.resistances);
        enemy.health -= dealt;
        tracing::trace!(enemy = enemy_id.get(), %element, dealt, "enemy damaged");

        if enemy.health > 0.0 {
            out_events.push(Event::EnemyDamaged {
                enemy: enemy_id,
                amount: dealt,
                remaining: enemy.health,
            });
            return;
        }

        let kind = enemy.kind;
        let _ = self.enemies.remove(&enemy_id);
        self.kills = self.kills.saturating_add(1);
        if kind.is_boss() {
            tracing::info!(?kind, total_kills = self.kills, "boss defeated");
        }
        out_events.push(Event::EnemyKilled {
            enemy: enemy_id,
            kind,
            total_kills: self.kills,
        });
        self.grant_experience(kind.experience(), out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                elapsed: world.clock,
            });
        }
        Command::EquipAbility { ability } => {
            match world.abilities.equip(&world.catalog, &ability) {
                Ok(Equipped::Acquired(definition)) => {
                    world.resolve_offer(|offer| offer.abilities.contains(&ability));
                    out_events.push(Event::AbilityAcquired {
                        ability,
                        name: definition.name.clone(),
                        icon: definition.icon.clone(),
                        rarity: definition.rarity,
                    });
                }
                Ok(Equipped::Upgraded(level)) => {
                    world.resolve_offer(|offer| offer.abilities.contains(&ability));
                    out_events.push(Event::AbilityUpgraded { ability, level });
                }
                Err(reason) => {
                    tracing::debug!(%ability, %reason, "ability equip rejected");
                    out_events.push(Event::AbilityRejected { ability, reason });
                }
            }
        }
        Command::UpgradeAbility { ability } => {
            match world.abilities.upgrade(&world.catalog, &ability) {
                Ok(level) => {
                    world.resolve_offer(|offer| offer.abilities.contains(&ability));
                    out_events.push(Event::AbilityUpgraded { ability, level });
                }
                Err(reason) => {
                    tracing::debug!(%ability, %reason, "ability upgrade rejected");
                    out_events.push(Event::AbilityRejected { ability, reason });
                }
            }
        }
        Command::BanishAbility { ability } => {
            if world.abilities.banish(ability.clone()) {
                out_events.push(Event::AbilityBanished { ability });
            }
        }
        Command::EquipItem { item } => {
            match world.items.equip(&world.catalog, &item) {
                Ok(Equipped::Acquired(definition)) => {
                    world.resolve_offer(|offer| offer.items.contains(&item));
                    world.refresh_max_health();
                    out_events.push(Event::ItemAcquired {
                        item,
                        name: definition.name.clone(),
                        icon: definition.icon.clone(),
                        rarity: definition.rarity,
                    });
                }
                Ok(Equipped::Upgraded(level)) => {
                    world.resolve_offer(|offer| offer.items.contains(&item));
                    world.refresh_max_health();
                    out_events.push(Event::ItemUpgraded { item, level });
                }
                Err(reason) => {
                    tracing::debug!(%item, %reason, "item equip rejected");
                    out_events.push(Event::ItemRejected { item, reason });
                }
            }
        }
        Command::UpgradeItem { item } => match world.items.upgrade(&world.catalog, &item) {
            Ok(level) => {
                world.resolve_offer(|offer| offer.items.contains(&item));
                world.refresh_max_health();
                out_events.push(Event::ItemUpgraded { item, level });
            }
            Err(reason) => {
                tracing::debug!(%item, %reason, "item upgrade rejected");
                out_events.push(Event::ItemRejected { item, reason });
            }
        },
        Command::CastAbility { ability } => {
            if let Some(level) = world.abilities.record_cast(&ability, world.clock) {
                out_events.push(Event::AbilityCast {
                    ability,
                    level,
                    at: world.clock,
                });
            }
        }
        Command::SpawnProjectile {
            ability,
            element,
            damage,
            speed,
            pierce,
            origin,
            direction,
        } => out_events.push(Event::ProjectileSpawned {
            ability,
            element,
            damage,
            speed,
            pierce,
            origin,
            direction,
        }),
        Command::RequestAttack {
            ability,
            element,
            damage,
            origin,
            range,
        } => out_events.push(Event::AttackRequested {
            ability,
            element,
            damage,
            origin,
            range,
        }),
        Command::TriggerWave {
            wave,
            enemies,
            message,
            boss,
        } => out_events.push(Event::WaveTriggered {
            wave,
            enemies,
            message,
            boss,
        }),
        Command::SpawnEnemy {
            kind,
            position,
            resistances,
        } => {
            let enemy = EnemyId::new(world.next_enemy_id);
            world.next_enemy_id = world.next_enemy_id.saturating_add(1);
            let _ = world.enemies.insert(
                enemy,
                Enemy {
                    kind,
                    position,
                    health: kind.base_health(),
                    resistances: resistances.unwrap_or_else(|| kind.resistances()),
                },
            );
            out_events.push(Event::EnemySpawned {
                enemy,
                kind,
                position,
            });
        }
        Command::MoveEnemy { enemy, position } => {
            if let Some(entry) = world.enemies.get_mut(&enemy) {
                entry.position = position;
            }
        }
        Command::DamageEnemy {
            enemy,
            amount,
            element,
        } => world.damage_enemy(enemy, amount, element, out_events),
        Command::MovePlayer { position } => {
            if world.player.is_alive() {
                world.player.position = position;
            }
        }
        Command::DamagePlayer { amount } => {
            if !world.player.is_alive() || amount <= 0.0 {
                return;
            }
            world.player.health -= amount;
            out_events.push(Event::PlayerDamaged {
                amount,
                remaining: world.player.health.max(0.0),
            });
            if !world.player.is_alive() {
                tracing::info!(elapsed = ?world.clock, "player died");
                out_events.push(Event::PlayerDied);
            }
        }
        Command::GrantExperience { amount } => world.grant_experience(amount, out_events),
        Command::OfferLevelUp { abilities, items } => {
            world.pending_offers.push_back(PendingOffer {
                abilities: abilities.clone(),
                items: items.clone(),
            });
            out_events.push(Event::LevelUpOffered { abilities, items });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{sync::Arc, time::Duration};

    use spellstorm_core::{
        AbilityId, Catalog, EffectType, EnemySnapshot, EnemyView, ItemId, LoadoutView,
        PlayerSnapshot,
    };

    use super::World;

    /// Shared catalog the world was created with.
    #[must_use]
    pub fn catalog(world: &World) -> &Arc<Catalog> {
        &world.catalog
    }

    /// Session time accumulated by `Tick` commands.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Captures a read-only view of the equipped abilities, items and banished set.
    #[must_use]
    pub fn loadout_view(world: &World) -> LoadoutView {
        LoadoutView::new(
            world.abilities.snapshots(),
            world.items.snapshots(),
            world.abilities.banished().clone(),
        )
    }

    /// Level of the equipped ability, if it is equipped.
    #[must_use]
    pub fn ability_level(world: &World, ability: &AbilityId) -> Option<u32> {
        world.abilities.level(ability)
    }

    /// Level of the equipped item, or zero when it is not held.
    #[must_use]
    pub fn item_level(world: &World, item: &ItemId) -> u32 {
        world.items.level(item)
    }

    /// Sum of every equipped item's contribution to `effect`.
    #[must_use]
    pub fn total_bonus(world: &World, effect: EffectType) -> f32 {
        world.items.total_bonus(effect)
    }

    /// Captures the player's current vitals.
    #[must_use]
    pub fn player_snapshot(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            health: world.player.health.max(0.0),
            max_health: world.player.max_health,
            level: world.player.level,
            attack_range: world.config.attack_range,
        }
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub fn experience(world: &World) -> u32 {
        world.player.experience
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|(id, enemy)| EnemySnapshot {
                    id: *id,
                    kind: enemy.kind,
                    position: enemy.position,
                    health: enemy.health,
                })
                .collect(),
        )
    }

    /// Kills recorded during the run.
    #[must_use]
    pub fn kill_count(world: &World) -> u32 {
        world.kills
    }

    /// Oldest level-up choices still awaiting the player's decision, if any.
    #[must_use]
    pub fn pending_offer(world: &World) -> Option<(&[AbilityId], &[ItemId])> {
        world
            .pending_offers
            .front()
            .map(|offer| (offer.abilities.as_slice(), offer.items.as_slice()))
    }

    /// Number of level-up offers not yet answered.
    #[must_use]
    pub fn pending_offer_count(world: &World) -> usize {
        world.pending_offers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellstorm_core::{
        AbilityDefinition, AbilityLineage, AbilityStats, Element, ItemEffect, LoadoutError,
        PassiveItemDefinition, Rarity,
    };

    fn catalog() -> Arc<Catalog> {
        let fireball = AbilityDefinition {
            id: AbilityId::new("fireball"),
            name: "Fireball".to_owned(),
            description: String::new(),
            icon: "ability_fireball".to_owned(),
            rarity: Rarity::Common,
            element: Element::Fire,
            max_level: 2,
            stats: AbilityStats {
                damage: 15,
                cooldown_ms: 1_000,
                projectile_count: 1,
                speed: None,
            },
            projectile_growth: false,
            lineage: AbilityLineage::Base,
        };
        let item = |id: &str, effect: EffectType, per_level: f32| PassiveItemDefinition {
            id: ItemId::new(id),
            name: id.to_owned(),
            description: String::new(),
            icon: String::new(),
            rarity: Rarity::Common,
            max_level: 5,
            effects: vec![ItemEffect { effect, per_level }],
        };
        Arc::new(
            Catalog::new(
                vec![fireball],
                vec![
                    item("amulet", EffectType::MaxHealth, 20.0),
                    item("crown", EffectType::ExperienceGain, 0.5),
                ],
            )
            .expect("valid catalog"),
        )
    }

    fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events);
        }
        events
    }

    #[test]
    fn tick_reports_elapsed_time() {
        let mut world = World::new(catalog());
        let events = apply_all(
            &mut world,
            vec![
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
            ],
        );
        assert_eq!(
            events.last(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(16),
                elapsed: Duration::from_millis(32),
            })
        );
        assert_eq!(query::elapsed(&world), Duration::from_millis(32));
    }

    #[test]
    fn equip_reports_acquisition_then_upgrade_then_max_level() {
        let mut world = World::new(catalog());
        let fireball = AbilityId::new("fireball");
        let events = apply_all(
            &mut world,
            vec![
                Command::EquipAbility {
                    ability: fireball.clone(),
                },
                Command::EquipAbility {
                    ability: fireball.clone(),
                },
                Command::UpgradeAbility {
                    ability: fireball.clone(),
                },
                Command::EquipAbility {
                    ability: AbilityId::new("nope"),
                },
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::AbilityAcquired {
                    ability: fireball.clone(),
                    name: "Fireball".to_owned(),
                    icon: "ability_fireball".to_owned(),
                    rarity: Rarity::Common,
                },
                Event::AbilityUpgraded {
                    ability: fireball.clone(),
                    level: 2,
                },
                Event::AbilityRejected {
                    ability: fireball.clone(),
                    reason: LoadoutError::MaxLevel,
                },
                Event::AbilityRejected {
                    ability: AbilityId::new("nope"),
                    reason: LoadoutError::UnknownAbility,
                },
            ]
        );
        assert_eq!(query::ability_level(&world, &fireball), Some(2));
    }

    #[test]
    fn upgrades_distinguish_unknown_from_unequipped() {
        let mut world = World::new(catalog());
        let events = apply_all(
            &mut world,
            vec![
                Command::UpgradeAbility {
                    ability: AbilityId::new("nope"),
                },
                Command::UpgradeAbility {
                    ability: AbilityId::new("fireball"),
                },
                Command::UpgradeItem {
                    item: ItemId::new("nope"),
                },
                Command::UpgradeItem {
                    item: ItemId::new("crown"),
                },
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::AbilityRejected {
                    ability: AbilityId::new("nope"),
                    reason: LoadoutError::UnknownAbility,
                },
                Event::AbilityRejected {
                    ability: AbilityId::new("fireball"),
                    reason: LoadoutError::NotEquipped,
                },
                Event::ItemRejected {
                    item: ItemId::new("nope"),
                    reason: LoadoutError::UnknownItem,
                },
                Event::ItemRejected {
                    item: ItemId::new("crown"),
                    reason: LoadoutError::NotEquipped,
                },
            ]
        );
    }

    #[test]
    fn banish_is_reported_once_and_keeps_instance() {
        let mut world = World::new(catalog());
        let fireball = AbilityId::new("fireball");
        let events = apply_all(
            &mut world,
            vec![
                Command::EquipAbility {
                    ability: fireball.clone(),
                },
                Command::BanishAbility {
                    ability: fireball.clone(),
                },
                Command::BanishAbility {
                    ability: fireball.clone(),
                },
            ],
        );
        let banished = events
            .iter()
            .filter(|event| matches!(event, Event::AbilityBanished { .. }))
            .count();
        assert_eq!(banished, 1);
        let view = query::loadout_view(&world);
        assert!(view.is_banished(&fireball));
        assert!(view.ability(&fireball).is_some());
    }

    #[test]
    fn cast_stamps_session_time() {
        let mut world = World::new(catalog());
        let fireball = AbilityId::new("fireball");
        let events = apply_all(
            &mut world,
            vec![
                Command::EquipAbility {
                    ability: fireball.clone(),
                },
                Command::Tick {
                    dt: Duration::from_millis(1_250),
                },
                Command::CastAbility {
                    ability: fireball.clone(),
                },
                Command::CastAbility {
                    ability: AbilityId::new("unequipped"),
                },
            ],
        );
        assert_eq!(
            events.last(),
            Some(&Event::AbilityCast {
                ability: fireball.clone(),
                level: 1,
                at: Duration::from_millis(1_250),
            })
        );
        let view = query::loadout_view(&world);
        let snapshot = view.ability(&fireball).expect("fireball equipped");
        assert_eq!(snapshot.last_cast, Duration::from_millis(1_250));
    }

    #[test]
    fn resisted_damage_is_scaled_and_death_is_final() {
        let mut world = World::new(catalog());
        let events = apply_all(
            &mut world,
            vec![
                Command::SpawnEnemy {
                    kind: EnemyKind::FireImp,
                    position: Vec2::new(10.0, 0.0),
                    resistances: None,
                },
                Command::DamageEnemy {
                    enemy: EnemyId::new(0),
                    amount: 10.0,
                    element: Element::Fire,
                },
            ],
        );
        match events.last() {
            Some(Event::EnemyDamaged {
                amount, remaining, ..
            }) => {
                assert!((amount - 2.0).abs() < 1e-5);
                assert!((remaining - 28.0).abs() < 1e-5);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let events = apply_all(
            &mut world,
            vec![
                Command::DamageEnemy {
                    enemy: EnemyId::new(0),
                    amount: 20.0,
                    element: Element::Frost,
                },
                Command::DamageEnemy {
                    enemy: EnemyId::new(0),
                    amount: 20.0,
                    element: Element::Frost,
                },
            ],
        );
        let kills: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::EnemyKilled {
                    kind, total_kills, ..
                } => Some((*kind, *total_kills)),
                _ => None,
            })
            .collect();
        assert_eq!(kills, vec![(EnemyKind::FireImp, 1)]);
        assert!(query::enemy_view(&world).is_empty());
        assert_eq!(query::kill_count(&world), 1);
    }

    #[test]
    fn resistance_override_replaces_archetype_table() {
        let mut world = World::new(catalog());
        let events = apply_all(
            &mut world,
            vec![
                Command::SpawnEnemy {
                    kind: EnemyKind::Slime,
                    position: Vec2::ZERO,
                    resistances: Some(ElementResistances::neutral().with(Element::Frost, 0.5)),
                },
                Command::DamageEnemy {
                    enemy: EnemyId::new(0),
                    amount: 10.0,
                    element: Element::Frost,
                },
            ],
        );
        assert!(matches!(
            events.last(),
            Some(Event::EnemyDamaged { amount, .. }) if (*amount - 5.0).abs() < 1e-5
        ));
    }

    #[test]
    fn kills_grant_experience_and_levels() {
        let mut world = World::new(catalog());
        let mut commands = Vec::new();
        for index in 0..8 {
            commands.push(Command::SpawnEnemy {
                kind: EnemyKind::FireImp,
                position: Vec2::ZERO,
                resistances: None,
            });
            commands.push(Command::DamageEnemy {
                enemy: EnemyId::new(index),
                amount: 100.0,
                element: Element::None,
            });
        }
        let events = apply_all(&mut world, commands);
        let levels: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                Event::LeveledUp { level } => Some(*level),
                _ => None,
            })
            .collect();
        // 24 experience: 15 to reach level 2, 9 carried toward the 25 needed for level 3.
        assert_eq!(levels, vec![2]);
        assert_eq!(query::experience(&world), 9);
        assert_eq!(query::player_snapshot(&world).level, 2);
    }

    #[test]
    fn experience_bonus_scales_grants() {
        let mut world = World::new(catalog());
        let events = apply_all(
            &mut world,
            vec![
                Command::EquipItem {
                    item: ItemId::new("crown"),
                },
                Command::GrantExperience { amount: 4 },
            ],
        );
        assert_eq!(
            events.last(),
            Some(&Event::ExperienceGained {
                amount: 6,
                progress: 6,
            })
        );
    }

    #[test]
    fn max_health_items_raise_vitals() {
        let mut world = World::new(catalog());
        let _ = apply_all(
            &mut world,
            vec![
                Command::DamagePlayer { amount: 30.0 },
                Command::EquipItem {
                    item: ItemId::new("amulet"),
                },
                Command::UpgradeItem {
                    item: ItemId::new("amulet"),
                },
            ],
        );
        let player = query::player_snapshot(&world);
        assert_eq!(player.max_health, 140.0);
        assert_eq!(player.health, 110.0);
        assert_eq!(query::item_level(&world, &ItemId::new("amulet")), 2);
        assert_eq!(query::total_bonus(&world, EffectType::MaxHealth), 40.0);
    }

    #[test]
    fn player_death_is_reported_once() {
        let mut world = World::new(catalog());
        let events = apply_all(
            &mut world,
            vec![
                Command::DamagePlayer { amount: 60.0 },
                Command::DamagePlayer { amount: 60.0 },
                Command::DamagePlayer { amount: 60.0 },
            ],
        );
        let deaths = events
            .iter()
            .filter(|event| matches!(event, Event::PlayerDied))
            .count();
        assert_eq!(deaths, 1);
        assert_eq!(events.len(), 3);
        let player = query::player_snapshot(&world);
        assert!(!player.is_alive());
    }

    #[test]
    fn level_up_offer_is_recorded() {
        let mut world = World::new(catalog());
        let abilities = vec![AbilityId::new("fireball")];
        let items = vec![ItemId::new("amulet")];
        let events = apply_all(
            &mut world,
            vec![Command::OfferLevelUp {
                abilities: abilities.clone(),
                items: items.clone(),
            }],
        );
        assert_eq!(
            events,
            vec![Event::LevelUpOffered {
                abilities: abilities.clone(),
                items: items.clone(),
            }]
        );
        assert_eq!(
            query::pending_offer(&world),
            Some((abilities.as_slice(), items.as_slice()))
        );
    }

    #[test]
    fn stacked_offers_resolve_in_order() {
        let mut world = World::new(catalog());
        let first = vec![AbilityId::new("fireball")];
        let second = vec![ItemId::new("amulet")];
        let _ = apply_all(
            &mut world,
            vec![
                Command::OfferLevelUp {
                    abilities: first.clone(),
                    items: Vec::new(),
                },
                Command::OfferLevelUp {
                    abilities: Vec::new(),
                    items: second.clone(),
                },
            ],
        );
        assert_eq!(query::pending_offer_count(&world), 2);
        assert_eq!(query::pending_offer(&world), Some((first.as_slice(), &[][..])));

        let _ = apply_all(
            &mut world,
            vec![Command::EquipItem {
                item: ItemId::new("crown"),
            }],
        );
        assert_eq!(query::pending_offer_count(&world), 2);

        let _ = apply_all(
            &mut world,
            vec![Command::EquipAbility {
                ability: AbilityId::new("fireball"),
            }],
        );
        assert_eq!(
            query::pending_offer(&world),
            Some((&[][..], second.as_slice()))
        );

        let _ = apply_all(
            &mut world,
            vec![Command::EquipItem {
                item: ItemId::new("amulet"),
            }],
        );
        assert_eq!(query::pending_offer(&world), None);
        assert_eq!(query::pending_offer_count(&world), 0);
    }

    #[test]
    fn reset_discards_run_state() {
        let mut world = World::new(catalog());
        let _ = apply_all(
            &mut world,
            vec![
                Command::EquipAbility {
                    ability: AbilityId::new("fireball"),
                },
                Command::Tick {
                    dt: Duration::from_secs(5),
                },
                Command::SpawnEnemy {
                    kind: EnemyKind::Bat,
                    position: Vec2::ZERO,
                    resistances: None,
                },
            ],
        );
        world.reset();
        assert_eq!(query::elapsed(&world), Duration::ZERO);
        assert!(query::loadout_view(&world).abilities().is_empty());
        assert!(query::enemy_view(&world).is_empty());
    }
}
