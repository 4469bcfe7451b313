#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that fires equipped abilities once their cooldowns elapse.

use std::{f32::consts::TAU, time::Duration};

use spellstorm_core::{
    AbilitySnapshot, Command, Event, LoadoutView, PlayerSnapshot, StatModifiers, Vec2,
    MIN_COOLDOWN,
};

/// Largest radial burst emitted unless configured otherwise.
pub const DEFAULT_BURST_CAP: u32 = 8;

const MAX_COOLDOWN_REDUCTION: f32 = 0.9;

/// Configuration parameters required to construct the cast engine.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    burst_cap: u32,
}

impl Config {
    /// Creates a configuration that clamps radial bursts to `burst_cap` projectiles.
    #[must_use]
    pub const fn new(burst_cap: u32) -> Self {
        Self { burst_cap }
    }

    /// Largest number of projectiles a single burst may contain.
    #[must_use]
    pub const fn burst_cap(&self) -> u32 {
        self.burst_cap
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BURST_CAP)
    }
}

/// Cast engine that turns cooldown readiness into attack and projectile commands.
#[derive(Debug, Default)]
pub struct CastEngine {
    config: Config,
    scratch: Vec<Command>,
}

impl CastEngine {
    /// Creates a new cast engine using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scratch: Vec::new(),
        }
    }

    /// Consumes time events and the loadout view to emit cast commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        loadout: &LoadoutView,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) {
        let Some(now) = latest_elapsed(events) else {
            return;
        };

        if !player.is_alive() || loadout.abilities().is_empty() {
            return;
        }

        let modifiers = loadout.stat_modifiers();
        self.scratch.clear();

        for ability in loadout.abilities() {
            let cooldown = cooldown_with(ability, &modifiers);
            if now.saturating_sub(ability.last_cast) < cooldown {
                continue;
            }

            tracing::trace!(
                ability = %ability.id(),
                element = ability.definition.element.tag(),
                level = ability.level,
                ?now,
                "ability ready"
            );
            self.scratch.push(Command::CastAbility {
                ability: ability.id().clone(),
            });
            self.fire(ability, &modifiers, player);
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn fire(
        &mut self,
        ability: &AbilitySnapshot,
        modifiers: &StatModifiers,
        player: &PlayerSnapshot,
    ) {
        let definition = &ability.definition;
        let damage = damage_with(ability, modifiers);
        let count = definition
            .effective_projectile_count(ability.level)
            .min(self.config.burst_cap);

        match count {
            0 => {}
            1 => self.scratch.push(Command::RequestAttack {
                ability: definition.id.clone(),
                element: definition.element,
                damage,
                origin: player.position,
                range: player.attack_range,
            }),
            _ => {
                let speed = definition.stats.speed.map(|speed| {
                    if modifiers.projectile_speed != 0.0 {
                        speed * (1.0 + modifiers.projectile_speed)
                    } else {
                        speed
                    }
                });
                for direction in radial_burst(count) {
                    self.scratch.push(Command::SpawnProjectile {
                        ability: definition.id.clone(),
                        element: definition.element,
                        damage,
                        speed,
                        pierce: modifiers.pierce,
                        origin: player.position,
                        direction,
                    });
                }
            }
        }
    }
}

/// Unit directions of a radial burst: `count` vectors evenly spaced from 0°.
#[must_use]
pub fn radial_burst(count: u32) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let step = TAU / count as f32;
    (0..count)
        .map(|index| Vec2::from_angle(step * index as f32))
        .collect()
}

fn latest_elapsed(events: &[Event]) -> Option<Duration> {
    events.iter().rev().find_map(|event| match event {
        Event::TimeAdvanced { elapsed, .. } => Some(*elapsed),
        _ => None,
    })
}

fn cooldown_with(ability: &AbilitySnapshot, modifiers: &StatModifiers) -> Duration {
    let cooldown = ability.definition.effective_cooldown(ability.level);
    if modifiers.cooldown_reduction == 0.0 {
        return cooldown;
    }
    let reduction = modifiers
        .cooldown_reduction
        .clamp(0.0, MAX_COOLDOWN_REDUCTION);
    let millis = (cooldown.as_millis() as f32 * (1.0 - reduction)).floor() as u64;
    Duration::from_millis(millis).max(MIN_COOLDOWN)
}

fn damage_with(ability: &AbilitySnapshot, modifiers: &StatModifiers) -> u32 {
    let damage = ability.definition.effective_damage(ability.level);
    if modifiers.damage == 0.0 {
        return damage;
    }
    (damage as f32 * (1.0 + modifiers.damage)).floor().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellstorm_core::{
        AbilityDefinition, AbilityId, AbilityLineage, AbilityStats, EffectType, Element,
        ItemEffect, ItemId, ItemSnapshot, PassiveItemDefinition, Rarity,
    };
    use std::{collections::BTreeSet, sync::Arc};

    fn ability(id: &str, damage: u32, cooldown_ms: u32, count: u32) -> Arc<AbilityDefinition> {
        Arc::new(AbilityDefinition {
            id: AbilityId::new(id),
            name: id.to_owned(),
            description: String::new(),
            icon: String::new(),
            rarity: Rarity::Common,
            element: Element::Frost,
            max_level: 5,
            stats: AbilityStats {
                damage,
                cooldown_ms,
                projectile_count: count,
                speed: Some(200.0),
            },
            projectile_growth: false,
            lineage: AbilityLineage::Base,
        })
    }

    fn equipped(
        definition: Arc<AbilityDefinition>,
        level: u32,
        last_cast_ms: u64,
    ) -> AbilitySnapshot {
        AbilitySnapshot {
            definition,
            level,
            last_cast: Duration::from_millis(last_cast_ms),
        }
    }

    fn player() -> PlayerSnapshot {
        PlayerSnapshot {
            position: Vec2::new(5.0, -3.0),
            health: 100.0,
            max_health: 100.0,
            level: 1,
            attack_range: 250.0,
        }
    }

    fn tick(elapsed_ms: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16),
            elapsed: Duration::from_millis(elapsed_ms),
        }]
    }

    fn view(abilities: Vec<AbilitySnapshot>) -> LoadoutView {
        LoadoutView::new(abilities, Vec::new(), BTreeSet::new())
    }

    #[test]
    fn radial_burst_of_four_covers_the_cardinal_directions() {
        let directions = radial_burst(4);
        let expected = [
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, -1.0),
        ];
        assert_eq!(directions.len(), 4);
        for (direction, expected) in directions.iter().zip(expected) {
            assert!((direction.length() - 1.0).abs() < 1e-6);
            assert!(direction.distance(expected) < 1e-6, "{direction:?}");
        }
    }

    #[test]
    fn silent_without_time_events() {
        let mut engine = CastEngine::default();
        let loadout = view(vec![equipped(ability("bolt", 10, 100, 1), 1, 0)]);
        let mut out = Vec::new();

        engine.handle(&[], &loadout, &player(), &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn single_projectile_abilities_request_a_targeted_attack() {
        let mut engine = CastEngine::default();
        let loadout = view(vec![equipped(ability("bolt", 15, 1_000, 1), 3, 0)]);
        let mut out = Vec::new();

        engine.handle(&tick(1_000), &loadout, &player(), &mut out);

        assert_eq!(
            out,
            vec![
                Command::CastAbility {
                    ability: AbilityId::new("bolt"),
                },
                Command::RequestAttack {
                    ability: AbilityId::new("bolt"),
                    element: Element::Frost,
                    damage: 21,
                    origin: Vec2::new(5.0, -3.0),
                    range: 250.0,
                },
            ]
        );
    }

    #[test]
    fn cooldown_gates_casts() {
        let mut engine = CastEngine::default();
        let loadout = view(vec![equipped(ability("bolt", 10, 1_000, 1), 5, 2_000)]);
        let mut out = Vec::new();

        engine.handle(&tick(2_799), &loadout, &player(), &mut out);
        assert!(out.is_empty());

        engine.handle(&tick(2_800), &loadout, &player(), &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn bursts_spawn_projectiles_at_the_caster() {
        let mut engine = CastEngine::default();
        let loadout = view(vec![equipped(ability("nova", 8, 500, 4), 1, 0)]);
        let mut out = Vec::new();

        engine.handle(&tick(600), &loadout, &player(), &mut out);

        let projectiles: Vec<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::SpawnProjectile {
                    damage,
                    origin,
                    speed,
                    ..
                } => Some((*damage, *origin, *speed)),
                _ => None,
            })
            .collect();
        assert_eq!(projectiles.len(), 4);
        assert!(projectiles
            .iter()
            .all(|entry| *entry == (8, Vec2::new(5.0, -3.0), Some(200.0))));
    }

    #[test]
    fn bursts_above_the_cap_are_clamped() {
        let mut engine = CastEngine::new(Config::new(6));
        let loadout = view(vec![equipped(ability("storm", 8, 500, 12), 1, 0)]);
        let mut out = Vec::new();

        engine.handle(&tick(600), &loadout, &player(), &mut out);

        let projectiles = out
            .iter()
            .filter(|command| matches!(command, Command::SpawnProjectile { .. }))
            .count();
        assert_eq!(projectiles, 6);
    }

    #[test]
    fn dead_players_do_not_cast() {
        let mut engine = CastEngine::default();
        let loadout = view(vec![equipped(ability("bolt", 10, 100, 1), 1, 0)]);
        let mut dead = player();
        dead.health = 0.0;
        let mut out = Vec::new();

        engine.handle(&tick(5_000), &loadout, &dead, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn item_modifiers_scale_damage_and_cooldown() {
        let lens = Arc::new(PassiveItemDefinition {
            id: ItemId::new("lens"),
            name: "Lens".to_owned(),
            description: String::new(),
            icon: String::new(),
            rarity: Rarity::Rare,
            max_level: 5,
            effects: vec![
                ItemEffect {
                    effect: EffectType::Damage,
                    per_level: 0.5,
                },
                ItemEffect {
                    effect: EffectType::CooldownReduction,
                    per_level: 0.25,
                },
            ],
        });
        let loadout = LoadoutView::new(
            vec![equipped(ability("bolt", 10, 1_000, 1), 1, 0)],
            vec![ItemSnapshot {
                definition: lens,
                level: 2,
            }],
            BTreeSet::new(),
        );
        let mut engine = CastEngine::default();
        let mut out = Vec::new();

        engine.handle(&tick(499), &loadout, &player(), &mut out);
        assert!(out.is_empty());

        engine.handle(&tick(500), &loadout, &player(), &mut out);
        assert!(matches!(
            out.last(),
            Some(Command::RequestAttack { damage: 20, .. })
        ));
    }
}
