#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director that walks the scripted timeline and streams enemy spawns.
//!
//! The director owns a single cursor into the [`WaveTimeline`]. Each due
//! entry fires exactly once, after which its groups become spawn streams
//! that emit one `Command::SpawnEnemy` per group interval. Difficulty
//! factors published by the conductor scale regular waves and bias the
//! harassment and hardened-enemy rolls.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use spellstorm_core::{
    derive_stream_seed, Command, DifficultyFactors, ElementResistances, EnemyKind, Event,
    SpawnGroup, Vec2, WaveDefinition, WaveTimeline, RNG_STREAM_SPAWN_EDGES,
    RNG_STREAM_SPAWN_ROLLS,
};

const HARASSMENT_SQUAD: SpawnGroup = SpawnGroup {
    enemy: EnemyKind::Bat,
    count: 6,
    interval_ms: 150,
};
const HARDENED_FACTOR: f32 = 0.6;

/// How many overdue waves may fire within a single update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUp {
    /// At most one wave fires per update, even when several are due.
    #[default]
    OnePerTick,
    /// Every overdue wave fires in timeline order within the same update.
    AllDue,
}

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    arena: Vec2,
    catch_up: CatchUp,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration for an arena of `arena` width and height centred on the origin.
    #[must_use]
    pub const fn new(arena: Vec2, catch_up: CatchUp, rng_seed: u64) -> Self {
        Self {
            arena,
            catch_up,
            rng_seed,
        }
    }
}

#[derive(Clone, Debug)]
struct SpawnStream {
    kind: EnemyKind,
    remaining: u32,
    interval: Duration,
    next_at: Duration,
    rolls_resistance: bool,
}

/// Pure system that fires scripted waves as session time advances.
#[derive(Debug)]
pub struct WaveDirector {
    timeline: WaveTimeline,
    config: Config,
    elapsed: Duration,
    cursor: usize,
    streams: Vec<SpawnStream>,
    factors: DifficultyFactors,
    edge_rng: ChaCha8Rng,
    roll_rng: ChaCha8Rng,
}

impl WaveDirector {
    /// Creates a director for the provided timeline.
    #[must_use]
    pub fn new(timeline: WaveTimeline, config: Config) -> Self {
        Self {
            timeline,
            config,
            elapsed: Duration::ZERO,
            cursor: 0,
            streams: Vec::new(),
            factors: DifficultyFactors::NEUTRAL,
            edge_rng: edge_rng(config.rng_seed),
            roll_rng: roll_rng(config.rng_seed),
        }
    }

    /// Index of the next wave to fire; equals the timeline length once finished.
    #[must_use]
    pub fn current_wave_index(&self) -> usize {
        self.cursor
    }

    /// Session time accumulated from `TimeAdvanced` events.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reports whether every wave of the timeline has fired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.timeline.len()
    }

    /// Number of groups still streaming spawns.
    #[must_use]
    pub fn active_streams(&self) -> usize {
        self.streams.len()
    }

    /// Difficulty factors most recently published by the conductor.
    #[must_use]
    pub fn factors(&self) -> DifficultyFactors {
        self.factors
    }

    /// Rewinds the director to the start of a new run.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.cursor = 0;
        self.streams.clear();
        self.factors = DifficultyFactors::NEUTRAL;
        self.edge_rng = edge_rng(self.config.rng_seed);
        self.roll_rng = roll_rng(self.config.rng_seed);
    }

    /// Consumes events to emit wave and enemy spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt, .. } => accumulated = accumulated.saturating_add(*dt),
                Event::DifficultyAdjusted { factors } => self.factors = *factors,
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(accumulated);

        match self.config.catch_up {
            CatchUp::OnePerTick => {
                let _ = self.fire_next(out);
            }
            CatchUp::AllDue => while self.fire_next(out) {},
        }

        self.drain_streams(out);
    }

    fn fire_next(&mut self, out: &mut Vec<Command>) -> bool {
        let Some(wave) = self.timeline.get(self.cursor) else {
            return false;
        };
        if wave.trigger_time() > self.elapsed {
            return false;
        }

        let wave = wave.clone();
        let index = self.cursor;
        self.cursor += 1;

        let enemies = self.scale_groups(&wave);
        tracing::debug!(
            wave = index,
            boss = wave.boss,
            groups = enemies.len(),
            elapsed = ?self.elapsed,
            "wave triggered"
        );

        for group in &enemies {
            if group.count == 0 {
                continue;
            }
            self.streams.push(SpawnStream {
                kind: group.enemy,
                remaining: group.count,
                interval: group.interval(),
                next_at: self.elapsed,
                rolls_resistance: !wave.boss && !group.enemy.is_boss(),
            });
        }

        out.push(Command::TriggerWave {
            wave: index,
            enemies,
            message: wave.message,
            boss: wave.boss,
        });
        true
    }

    fn scale_groups(&mut self, wave: &WaveDefinition) -> Vec<SpawnGroup> {
        let mut groups: Vec<SpawnGroup> = wave
            .groups
            .iter()
            .map(|group| {
                if group.enemy.is_boss() {
                    *group
                } else {
                    SpawnGroup {
                        count: self.factors.adjust_enemy_count(group.count),
                        ..*group
                    }
                }
            })
            .collect();

        if !wave.boss && self.roll(self.factors.harassment_chance()) {
            groups.push(SpawnGroup {
                count: self.factors.adjust_enemy_count(HARASSMENT_SQUAD.count),
                ..HARASSMENT_SQUAD
            });
        }
        groups
    }

    fn drain_streams(&mut self, out: &mut Vec<Command>) {
        let mut streams = std::mem::take(&mut self.streams);
        for stream in &mut streams {
            while stream.remaining > 0 && stream.next_at <= self.elapsed {
                let resistances = if stream.rolls_resistance
                    && self.roll(self.factors.resistant_chance())
                {
                    Some(hardened_resistances(stream.kind))
                } else {
                    None
                };
                let position = self.edge_position();
                tracing::trace!(kind = ?stream.kind, ?position, "enemy spawn queued");
                out.push(Command::SpawnEnemy {
                    kind: stream.kind,
                    position,
                    resistances,
                });
                stream.remaining -= 1;
                stream.next_at = stream.next_at.saturating_add(stream.interval);
            }
        }
        streams.retain(|stream| stream.remaining > 0);
        self.streams = streams;
    }

    fn roll(&mut self, chance: f32) -> bool {
        self.roll_rng.gen::<f32>() < chance
    }

    fn edge_position(&mut self) -> Vec2 {
        let half = self.config.arena * 0.5;
        let along = self.edge_rng.gen_range(-1.0_f32..=1.0);
        match self.edge_rng.gen_range(0..4_u8) {
            0 => Vec2::new(along * half.x, half.y),
            1 => Vec2::new(along * half.x, -half.y),
            2 => Vec2::new(-half.x, along * half.y),
            _ => Vec2::new(half.x, along * half.y),
        }
    }
}

fn edge_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, RNG_STREAM_SPAWN_EDGES))
}

fn roll_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, RNG_STREAM_SPAWN_ROLLS))
}

/// Builds the hardened resistance table applied by resistant spawn rolls.
#[must_use]
pub fn hardened_resistances(kind: EnemyKind) -> ElementResistances {
    kind.resistances().hardened(HARDENED_FACTOR)
}
