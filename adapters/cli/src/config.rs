use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use spellstorm_conductor::ConductorTuning;
use spellstorm_core::Vec2;
use spellstorm_system_cast::DEFAULT_BURST_CAP;
use spellstorm_system_options::DEFAULT_CHOICES;
use spellstorm_system_waves::CatchUp;
use spellstorm_world::PlayerConfig;

/// Tunable parameters of a headless session, loaded from TOML.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SessionConfig {
    /// Seed every random stream of the session derives from.
    pub(crate) seed: u64,
    /// Session length in seconds.
    pub(crate) duration_secs: u64,
    /// Simulation step in milliseconds.
    pub(crate) tick_ms: u64,
    /// Arena dimensions.
    pub(crate) arena: ArenaConfig,
    /// Player parameters.
    pub(crate) player: PlayerSettings,
    /// Largest radial burst an ability may fire.
    pub(crate) burst_cap: u32,
    /// Wave catch-up behaviour.
    pub(crate) catch_up: CatchUp,
    /// Ability cards offered per level-up.
    pub(crate) ability_choices: usize,
    /// Item cards offered per level-up.
    pub(crate) item_choices: usize,
    /// Ability equipped when the session starts.
    pub(crate) starting_ability: String,
    /// Dynamic difficulty tuning.
    pub(crate) conductor: ConductorTuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            duration_secs: 900,
            tick_ms: 50,
            arena: ArenaConfig::default(),
            player: PlayerSettings::default(),
            burst_cap: DEFAULT_BURST_CAP,
            catch_up: CatchUp::default(),
            ability_choices: DEFAULT_CHOICES,
            item_choices: DEFAULT_CHOICES,
            starting_ability: "fireball".to_owned(),
            conductor: ConductorTuning::default(),
        }
    }
}

impl SessionConfig {
    /// Reads a configuration file, defaulting every omitted field.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid session config {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        anyhow::ensure!(config.tick_ms > 0, "tick_ms must be positive");
        Ok(config)
    }

    /// Simulation step.
    #[must_use]
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Session length.
    #[must_use]
    pub(crate) fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// Width and height of the arena, centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ArenaConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl ArenaConfig {
    #[must_use]
    pub(crate) fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1_280.0,
            height: 720.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct PlayerSettings {
    pub(crate) max_health: f32,
    pub(crate) attack_range: f32,
    /// World units per second before move speed bonuses.
    pub(crate) move_speed: f32,
}

impl PlayerSettings {
    #[must_use]
    pub(crate) fn world_config(&self) -> PlayerConfig {
        PlayerConfig {
            max_health: self.max_health,
            attack_range: self.attack_range,
            spawn: Vec2::ZERO,
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        let world = PlayerConfig::default();
        Self {
            max_health: world.max_health,
            attack_range: world.attack_range,
            move_speed: 120.0,
        }
    }
}
