use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CatalogError, EnemyKind};

/// Batch of identical enemies emitted by a wave at a fixed cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Archetype spawned by the group.
    pub enemy: EnemyKind,
    /// Enemies spawned before difficulty scaling.
    pub count: u32,
    /// Milliseconds between consecutive spawns of the group.
    #[serde(default)]
    pub interval_ms: u32,
}

impl SpawnGroup {
    /// Delay between consecutive spawns of the group.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.interval_ms))
    }
}

/// Scripted, time-triggered entry of the wave timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Session time, in seconds, at which the wave fires.
    pub trigger_seconds: f32,
    /// Enemy groups spawned by the wave.
    pub groups: Vec<SpawnGroup>,
    /// Announcement shown when the wave fires.
    #[serde(default)]
    pub message: Option<String>,
    /// Whether the wave introduces a boss.
    #[serde(default)]
    pub boss: bool,
}

impl WaveDefinition {
    /// Session time at which the wave fires, rounded to the millisecond.
    #[must_use]
    pub fn trigger_time(&self) -> Duration {
        let millis = (f64::from(self.trigger_seconds.max(0.0)) * 1_000.0).round();
        Duration::from_millis(millis as u64)
    }
}

/// Immutable timeline of waves sorted by non-decreasing trigger time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveTimeline {
    waves: Vec<WaveDefinition>,
}

impl WaveTimeline {
    /// Validates and wraps the provided waves.
    ///
    /// Waves must already be ordered by trigger time; equal trigger times are
    /// allowed and fire in the order given.
    pub fn new(waves: Vec<WaveDefinition>) -> Result<Self, CatalogError> {
        for (index, wave) in waves.iter().enumerate() {
            let millis = f64::from(wave.trigger_seconds) * 1_000.0;
            if wave.trigger_seconds < 0.0 || Duration::try_from_secs_f64(millis).is_err() {
                return Err(CatalogError::InvalidTriggerTime { index });
            }
            if index > 0 && wave.trigger_seconds < waves[index - 1].trigger_seconds {
                return Err(CatalogError::UnorderedTimeline { index });
            }
        }
        Ok(Self { waves })
    }

    /// Waves in firing order.
    #[must_use]
    pub fn waves(&self) -> &[WaveDefinition] {
        &self.waves
    }

    /// Wave stored at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WaveDefinition> {
        self.waves.get(index)
    }

    /// Number of waves in the timeline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the timeline has no waves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(trigger_seconds: f32) -> WaveDefinition {
        WaveDefinition {
            trigger_seconds,
            groups: vec![SpawnGroup {
                enemy: EnemyKind::Slime,
                count: 4,
                interval_ms: 250,
            }],
            message: None,
            boss: false,
        }
    }

    #[test]
    fn accepts_non_decreasing_triggers() {
        let timeline = WaveTimeline::new(vec![wave(0.0), wave(30.0), wave(30.0)])
            .expect("ordered timeline");
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn rejects_out_of_order_triggers() {
        let error = WaveTimeline::new(vec![wave(0.0), wave(60.0), wave(45.0)])
            .expect_err("unordered timeline");
        assert_eq!(error, CatalogError::UnorderedTimeline { index: 2 });
    }

    #[test]
    fn rejects_negative_triggers() {
        let error = WaveTimeline::new(vec![wave(-1.0)]).expect_err("negative trigger");
        assert_eq!(error, CatalogError::InvalidTriggerTime { index: 0 });
    }

    #[test]
    fn rejects_unrepresentable_triggers() {
        for trigger in [1.0e20, f32::INFINITY, f32::NAN] {
            let error = WaveTimeline::new(vec![wave(0.0), wave(trigger)])
                .expect_err("unrepresentable trigger");
            assert_eq!(error, CatalogError::InvalidTriggerTime { index: 1 });
        }
    }

    #[test]
    fn fractional_triggers_round_to_the_millisecond() {
        assert_eq!(wave(0.1).trigger_time(), Duration::from_millis(100));
        assert_eq!(wave(12.3).trigger_time(), Duration::from_millis(12_300));
        assert_eq!(wave(100.7).trigger_time(), Duration::from_millis(100_700));
    }
}
