#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Dynamic difficulty conductor.
//!
//! Every evaluation period the conductor classifies recent player
//! performance from kill and damage telemetry plus the player's health, then
//! nudges three smoothed multipliers: enemy count, harassment bias and
//! resistance bias. The resulting factors are published as
//! `Event::DifficultyAdjusted` for the wave director.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use spellstorm_core::{DifficultyFactors, Event, PlayerSnapshot};

/// Aggregated tuning knobs controlling every adjustable aspect of the conductor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConductorTuning {
    /// Session time between evaluations, in milliseconds.
    pub evaluation_period_ms: u64,
    /// Thresholds that must all hold for the player to be performing well.
    pub well: WellThresholds,
    /// Thresholds of which any one marks the player as struggling.
    pub struggling: StrugglingThresholds,
    /// Amount each factor moves per well or struggling evaluation.
    pub step: f32,
    /// Weight kept by each factor per steady evaluation; the rest pulls toward 1.0.
    pub decay: f32,
    /// Upper clamps applied after a well evaluation.
    pub upper: DifficultyFactors,
    /// Lower clamps applied after a struggling evaluation.
    pub lower: DifficultyFactors,
}

impl Default for ConductorTuning {
    fn default() -> Self {
        Self {
            evaluation_period_ms: 30_000,
            well: WellThresholds::default(),
            struggling: StrugglingThresholds::default(),
            step: 0.1,
            decay: 0.95,
            upper: DifficultyFactors {
                difficulty: 1.3,
                harassment: 1.5,
                resistance: 1.5,
            },
            lower: DifficultyFactors {
                difficulty: 0.7,
                harassment: 0.5,
                resistance: 0.5,
            },
        }
    }
}

impl ConductorTuning {
    /// Session time between evaluations.
    #[must_use]
    pub fn evaluation_period(&self) -> Duration {
        Duration::from_millis(self.evaluation_period_ms)
    }

    /// Classifies a period, checking the well thresholds first.
    #[must_use]
    pub fn classify(&self, stats: &PeriodStats) -> Performance {
        if stats.health_percent > self.well.health_percent
            && stats.kill_rate > self.well.kill_rate
            && stats.damage_taken < self.well.damage_taken
        {
            return Performance::Well;
        }
        if stats.health_percent < self.struggling.health_percent
            || stats.kill_rate < self.struggling.kill_rate
            || stats.damage_taken > self.struggling.damage_taken
        {
            return Performance::Struggling;
        }
        Performance::Steady
    }
}

/// Exclusive lower bounds for health and kill rate plus an exclusive upper bound for damage.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WellThresholds {
    /// Health percentage the player must stay above.
    pub health_percent: f32,
    /// Kills per second the player must exceed.
    pub kill_rate: f32,
    /// Damage per period the player must stay below.
    pub damage_taken: f32,
}

impl Default for WellThresholds {
    fn default() -> Self {
        Self {
            health_percent: 70.0,
            kill_rate: 5.0,
            damage_taken: 50.0,
        }
    }
}

/// Bounds past which the player is considered struggling.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StrugglingThresholds {
    /// Health percentage below which the player struggles.
    pub health_percent: f32,
    /// Kills per second below which the player struggles.
    pub kill_rate: f32,
    /// Damage per period above which the player struggles.
    pub damage_taken: f32,
}

impl Default for StrugglingThresholds {
    fn default() -> Self {
        Self {
            health_percent: 40.0,
            kill_rate: 2.0,
            damage_taken: 100.0,
        }
    }
}

/// Outcome of classifying one evaluation period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Performance {
    /// The player is comfortably ahead; pressure increases.
    Well,
    /// The player is falling behind; pressure eases.
    Struggling,
    /// Neither; factors decay toward neutral.
    Steady,
}

/// Telemetry gathered over one evaluation period.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PeriodStats {
    /// Player health as a percentage of maximum.
    pub health_percent: f32,
    /// Kills per second over the period.
    pub kill_rate: f32,
    /// Damage the player took over the period.
    pub damage_taken: f32,
}

/// Conductor that smooths difficulty factors toward the player's performance.
#[derive(Debug)]
pub struct Conductor {
    tuning: ConductorTuning,
    factors: DifficultyFactors,
    kills: u32,
    damage_taken: f32,
    since_evaluation: Duration,
}

impl Default for Conductor {
    fn default() -> Self {
        Self::new(ConductorTuning::default())
    }
}

impl Conductor {
    /// Creates a conductor with neutral factors and the provided tuning surface.
    #[must_use]
    pub fn new(tuning: ConductorTuning) -> Self {
        Self {
            tuning,
            factors: DifficultyFactors::NEUTRAL,
            kills: 0,
            damage_taken: 0.0,
            since_evaluation: Duration::ZERO,
        }
    }

    /// Tuning surface the conductor evaluates with.
    #[must_use]
    pub fn tuning(&self) -> &ConductorTuning {
        &self.tuning
    }

    /// Current smoothed factors.
    #[must_use]
    pub fn factors(&self) -> DifficultyFactors {
        self.factors
    }

    /// Records a kill toward the current evaluation period.
    pub fn record_kill(&mut self) {
        self.kills = self.kills.saturating_add(1);
    }

    /// Records damage taken by the player toward the current evaluation period.
    pub fn record_damage(&mut self, amount: f32) {
        self.damage_taken += amount.max(0.0);
    }

    /// Scales a base enemy count by the difficulty multiplier.
    #[must_use]
    pub fn adjust_enemy_count(&self, base: u32) -> u32 {
        self.factors.adjust_enemy_count(base)
    }

    /// Rolls whether a harassment squad should join the next spawn.
    pub fn should_spawn_harassment(&self, rng: &mut impl Rng) -> bool {
        rng.gen::<f32>() < self.factors.harassment_chance()
    }

    /// Rolls whether the next enemy should use a hardened resistance table.
    pub fn should_spawn_resistant(&self, rng: &mut impl Rng) -> bool {
        rng.gen::<f32>() < self.factors.resistant_chance()
    }

    /// Restores neutral factors and clears telemetry and the evaluation clock.
    pub fn reset(&mut self) {
        self.factors = DifficultyFactors::NEUTRAL;
        self.kills = 0;
        self.damage_taken = 0.0;
        self.since_evaluation = Duration::ZERO;
    }

    /// Consumes telemetry events and publishes `Event::DifficultyAdjusted` once per period.
    pub fn handle(&mut self, events: &[Event], player: &PlayerSnapshot, out: &mut Vec<Event>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt, .. } => {
                    self.since_evaluation = self.since_evaluation.saturating_add(*dt);
                }
                Event::EnemyKilled { .. } => self.record_kill(),
                Event::PlayerDamaged { amount, .. } => self.record_damage(*amount),
                _ => {}
            }
        }

        let period = self.tuning.evaluation_period();
        if period.is_zero() || self.since_evaluation < period {
            return;
        }
        self.since_evaluation -= period;

        let factors = self.evaluate(player, period);
        out.push(Event::DifficultyAdjusted { factors });
    }

    fn evaluate(&mut self, player: &PlayerSnapshot, period: Duration) -> DifficultyFactors {
        let stats = PeriodStats {
            health_percent: player.health_percent(),
            kill_rate: self.kills as f32 / period.as_secs_f32(),
            damage_taken: self.damage_taken,
        };
        let performance = self.tuning.classify(&stats);

        let tuning = &self.tuning;
        let adjust = |value: f32, upper: f32, lower: f32| match performance {
            Performance::Well => (value + tuning.step).min(upper),
            Performance::Struggling => (value - tuning.step).max(lower),
            Performance::Steady => value * tuning.decay + (1.0 - tuning.decay),
        };
        self.factors = DifficultyFactors {
            difficulty: adjust(
                self.factors.difficulty,
                tuning.upper.difficulty,
                tuning.lower.difficulty,
            ),
            harassment: adjust(
                self.factors.harassment,
                tuning.upper.harassment,
                tuning.lower.harassment,
            ),
            resistance: adjust(
                self.factors.resistance,
                tuning.upper.resistance,
                tuning.lower.resistance,
            ),
        };

        tracing::debug!(
            ?performance,
            kill_rate = stats.kill_rate,
            damage_taken = stats.damage_taken,
            health_percent = stats.health_percent,
            difficulty = self.factors.difficulty,
            harassment = self.factors.harassment,
            resistance = self.factors.resistance,
            "conductor evaluated"
        );

        self.kills = 0;
        self.damage_taken = 0.0;
        self.factors
    }
}
