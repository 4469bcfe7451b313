//! Headless session loop that plays a seeded run with a simple autopilot.
//!
//! The session stands in for the game scene: it owns projectiles, moves
//! enemies toward the player, resolves hits and contact damage, and answers
//! level-up offers by taking the first card.

use std::time::Duration;

use serde::Serialize;
use spellstorm_conductor::Conductor;
use spellstorm_content::Content;
use spellstorm_core::{
    derive_stream_seed, AbilityId, Command, DifficultyFactors, EffectType, Element, EnemyId,
    Event, StatModifiers, Vec2, RNG_STREAM_OPTIONS,
};
use spellstorm_system_cast::{self as cast, CastEngine};
use spellstorm_system_options::{self as options, OptionGenerator};
use spellstorm_system_waves::{self as waves, WaveDirector};
use spellstorm_world::{self as world, query, World};

use crate::config::SessionConfig;

const CONTACT_RADIUS: f32 = 24.0;
const PROJECTILE_RADIUS: f32 = 18.0;
const PROJECTILE_LIFETIME: Duration = Duration::from_secs(2);
const DEFAULT_PROJECTILE_SPEED: f32 = 300.0;
const FLEE_RADIUS: f32 = 220.0;

#[derive(Clone, Debug)]
struct Projectile {
    element: Element,
    damage: f32,
    position: Vec2,
    velocity: Vec2,
    pierce: u32,
    age: Duration,
    hits: Vec<EnemyId>,
}

#[derive(Clone, Debug)]
struct PendingAttack {
    element: Element,
    damage: f32,
    origin: Vec2,
    range: f32,
}

/// Distance at which a projectile connects, widened by area bonuses.
fn hit_radius(modifiers: &StatModifiers) -> f32 {
    PROJECTILE_RADIUS * (1.0 + modifiers.area.max(0.0))
}

/// Outcome of a finished session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub(crate) seed: u64,
    pub(crate) survived: bool,
    pub(crate) elapsed_secs: f32,
    pub(crate) level: u32,
    pub(crate) kills: u32,
    pub(crate) waves_triggered: usize,
    pub(crate) bosses_defeated: u32,
    pub(crate) damage_taken: f32,
    pub(crate) difficulty: DifficultyFactors,
    pub(crate) abilities: Vec<(String, u32)>,
    pub(crate) items: Vec<(String, u32)>,
}

/// One seeded run of the full progression core.
pub(crate) struct Session {
    config: SessionConfig,
    world: World,
    cast: CastEngine,
    options: OptionGenerator,
    director: WaveDirector,
    conductor: Conductor,
    projectiles: Vec<Projectile>,
    attacks: Vec<PendingAttack>,
    carry: Vec<Event>,
    waves_triggered: usize,
    bosses_defeated: u32,
    damage_taken: f32,
    died: bool,
}

impl Session {
    pub(crate) fn new(content: &Content, config: SessionConfig) -> Self {
        let world = World::with_config(content.catalog().clone(), config.player.world_config());
        let cast = CastEngine::new(cast::Config::new(config.burst_cap));
        let options = OptionGenerator::new(
            options::Config::new(config.ability_choices, config.item_choices),
            derive_stream_seed(config.seed, RNG_STREAM_OPTIONS),
        );
        let director = WaveDirector::new(
            content.timeline().clone(),
            waves::Config::new(config.arena.size(), config.catch_up, config.seed),
        );
        let conductor = Conductor::new(config.conductor.clone());

        let mut session = Self {
            config,
            world,
            cast,
            options,
            director,
            conductor,
            projectiles: Vec::new(),
            attacks: Vec::new(),
            carry: Vec::new(),
            waves_triggered: 0,
            bosses_defeated: 0,
            damage_taken: 0.0,
            died: false,
        };
        let starting = Command::EquipAbility {
            ability: AbilityId::new(session.config.starting_ability.clone()),
        };
        let mut events = Vec::new();
        session.settle(vec![starting], &mut events);
        session
    }

    /// Steps the session until the configured duration elapses or the player dies.
    pub(crate) fn run(mut self) -> Summary {
        let duration = self.config.duration();
        while !self.died && query::elapsed(&self.world) < duration {
            self.step();
        }
        self.summary()
    }

    fn step(&mut self) {
        let dt = self.config.tick();
        let mut events = std::mem::take(&mut self.carry);
        let carried = events.len();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        for command in self.simulate(dt) {
            world::apply(&mut self.world, command, &mut events);
        }

        let player = query::player_snapshot(&self.world);
        let mut published = Vec::new();
        self.conductor.handle(&events, &player, &mut published);
        events.extend(published);

        let loadout = query::loadout_view(&self.world);
        let mut commands = Vec::new();
        self.cast.handle(&events, &loadout, &player, &mut commands);
        self.options
            .handle(&events, query::catalog(&self.world), &loadout, &mut commands);
        self.director.handle(&events, &mut commands);
        commands.extend(self.observe(&events[carried..]));

        let mut next = Vec::new();
        self.settle(commands, &mut next);
        self.carry = next;
    }

    /// Applies commands, answering any offers they raise until none remain.
    fn settle(&mut self, mut commands: Vec<Command>, out: &mut Vec<Event>) {
        while !commands.is_empty() {
            let start = out.len();
            for command in commands {
                world::apply(&mut self.world, command, out);
            }
            commands = self.observe(&out[start..]);
        }
    }

    /// Moves the player and enemies, resolves attacks and projectiles.
    fn simulate(&mut self, dt: Duration) -> Vec<Command> {
        let seconds = dt.as_secs_f32();
        let enemies = query::enemy_view(&self.world);
        let player = query::player_snapshot(&self.world);
        let mut commands = Vec::new();

        if let Some(threat) = enemies.nearest_within(player.position, FLEE_RADIUS) {
            let speed = self.config.player.move_speed
                * (1.0 + query::total_bonus(&self.world, EffectType::MoveSpeed));
            let away = (player.position - threat.position).normalize_or_zero();
            let half = self.config.arena.size() * 0.5;
            let position = (player.position + away * speed * seconds).clamp(-half, half);
            commands.push(Command::MovePlayer { position });
        }

        let mut contact = 0.0;
        for enemy in enemies.iter() {
            let offset = player.position - enemy.position;
            let distance = offset.length();
            if distance <= CONTACT_RADIUS {
                contact += enemy.kind.contact_damage() * seconds;
                continue;
            }
            let step = (enemy.kind.move_speed() * seconds).min(distance - CONTACT_RADIUS * 0.5);
            commands.push(Command::MoveEnemy {
                enemy: enemy.id,
                position: enemy.position + offset / distance * step,
            });
        }
        if contact > 0.0 {
            commands.push(Command::DamagePlayer { amount: contact });
        }

        for attack in self.attacks.drain(..) {
            if let Some(target) = enemies.nearest_within(attack.origin, attack.range) {
                commands.push(Command::DamageEnemy {
                    enemy: target.id,
                    amount: attack.damage,
                    element: attack.element,
                });
            }
        }

        let radius = hit_radius(&query::loadout_view(&self.world).stat_modifiers());
        for projectile in &mut self.projectiles {
            projectile.position += projectile.velocity * seconds;
            projectile.age += dt;
            for enemy in enemies.iter() {
                if projectile.hits.len() > projectile.pierce as usize {
                    break;
                }
                if projectile.hits.contains(&enemy.id)
                    || enemy.position.distance(projectile.position) > radius
                {
                    continue;
                }
                projectile.hits.push(enemy.id);
                commands.push(Command::DamageEnemy {
                    enemy: enemy.id,
                    amount: projectile.damage,
                    element: projectile.element,
                });
            }
        }
        self.projectiles.retain(|projectile| {
            projectile.age < PROJECTILE_LIFETIME
                && projectile.hits.len() <= projectile.pierce as usize
        });

        commands
    }

    /// Tracks orchestration state from world events and returns autopilot picks.
    fn observe(&mut self, events: &[Event]) -> Vec<Command> {
        let mut picks = Vec::new();
        for event in events {
            match event {
                Event::ProjectileSpawned {
                    element,
                    damage,
                    speed,
                    pierce,
                    origin,
                    direction,
                    ..
                } => self.projectiles.push(Projectile {
                    element: *element,
                    damage: *damage as f32,
                    position: *origin,
                    velocity: *direction * speed.unwrap_or(DEFAULT_PROJECTILE_SPEED),
                    pierce: *pierce,
                    age: Duration::ZERO,
                    hits: Vec::new(),
                }),
                Event::AttackRequested {
                    element,
                    damage,
                    origin,
                    range,
                    ..
                } => self.attacks.push(PendingAttack {
                    element: *element,
                    damage: *damage as f32,
                    origin: *origin,
                    range: *range,
                }),
                Event::WaveTriggered {
                    wave,
                    message,
                    boss,
                    ..
                } => {
                    self.waves_triggered += 1;
                    if let Some(message) = message {
                        tracing::info!(wave, boss, "{message}");
                    }
                }
                Event::EnemyKilled { kind, .. } if kind.is_boss() => self.bosses_defeated += 1,
                Event::PlayerDamaged { amount, .. } => self.damage_taken += amount,
                Event::PlayerDied => self.died = true,
                Event::AbilityAcquired { name, rarity, .. } => {
                    tracing::info!(%name, ?rarity, "ability acquired");
                }
                Event::ItemAcquired { name, rarity, .. } => {
                    tracing::info!(%name, ?rarity, "item acquired");
                }
                Event::LeveledUp { level } => tracing::info!(level, "level up"),
                Event::LevelUpOffered { abilities, items } => {
                    if let Some(ability) = abilities.first() {
                        picks.push(Command::EquipAbility {
                            ability: ability.clone(),
                        });
                    } else if let Some(item) = items.first() {
                        picks.push(Command::EquipItem { item: item.clone() });
                    }
                }
                _ => {}
            }
        }
        picks
    }

    fn summary(&self) -> Summary {
        let loadout = query::loadout_view(&self.world);
        Summary {
            seed: self.config.seed,
            survived: !self.died,
            elapsed_secs: query::elapsed(&self.world).as_secs_f32(),
            level: query::player_snapshot(&self.world).level,
            kills: query::kill_count(&self.world),
            waves_triggered: self.waves_triggered,
            bosses_defeated: self.bosses_defeated,
            damage_taken: self.damage_taken,
            difficulty: self.conductor.factors(),
            abilities: loadout
                .abilities()
                .iter()
                .map(|snapshot| (snapshot.id().to_string(), snapshot.level))
                .collect(),
            items: loadout
                .items()
                .iter()
                .map(|snapshot| (snapshot.id().to_string(), snapshot.level))
                .collect(),
        }
    }
}
