//! Free-running beat clock. Every pulsing sprite reads the same clock, so a tempo change only has
//! to reset it once for all of them to line up on the downbeat.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::Stopwatch;

use crate::settings::RhythmSettings;

/// Ticks the clock first thing in the frame so visuals sample a fresh value.
pub struct BeatClockPlugin;

impl Plugin for BeatClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BeatClock>()
            .add_systems(First, tick_beat_clock);
    }
}

/// Stopwatch-backed phase clock. `beat_time_ms` wraps at `loop_period_ms`.
#[derive(Resource, Debug, Clone)]
pub struct BeatClock {
    stopwatch: Stopwatch,
    loop_period_ms: u32,
    beat_time_ms: u32,
}

impl Default for BeatClock {
    fn default() -> Self {
        Self::new(RhythmSettings::default().loop_period_ms)
    }
}

impl BeatClock {
    pub fn new(loop_period_ms: u32) -> Self {
        Self {
            stopwatch: Stopwatch::new(),
            loop_period_ms: loop_period_ms.max(1),
            beat_time_ms: 0,
        }
    }

    pub fn beat_time_ms(&self) -> u32 {
        self.beat_time_ms
    }

    /// Restarts from zero. The new value is visible immediately, not on the next tick.
    pub fn reset(&mut self) {
        self.stopwatch.reset();
        self.stopwatch.unpause();
        self.beat_time_ms = 0;
    }

    pub fn tick(&mut self, delta: Duration) {
        self.stopwatch.tick(delta);
        let elapsed = self.stopwatch.elapsed().as_millis();
        self.beat_time_ms = (elapsed % u128::from(self.loop_period_ms)) as u32;
    }
}

fn tick_beat_clock(time: Res<Time<Real>>, mut clock: ResMut<BeatClock>) {
    clock.tick(time.delta());
}
