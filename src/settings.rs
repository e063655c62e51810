//! Runtime-tweakable tuning values shared by the clock, combat, session, and presentation plugins.
//!
//! Everything lives in a single `RhythmSettings` resource so a test (or a debug build) can swap the
//! timings without touching the systems that consume them.

use std::time::Duration;

use bevy::prelude::*;

use crate::tempo::Envelope;

/// Tuning knobs. Cloned when a pure helper needs a copy; every field is a plain value.
#[derive(Resource, Clone, Debug)]
pub struct RhythmSettings {
    /// Period after which the beat clock wraps back to zero.
    pub loop_period_ms: u32,
    /// How long the hit/miss flash freezes selectable enemies.
    pub feedback_delay: Duration,
    /// Time added to the final score for each missed click.
    pub fail_penalty_ms: u64,
    /// Scene exit: BGM fade-out plus screen fade to black.
    pub scene_exit: Duration,
    /// Pause between leaving the title and entering a play mode.
    pub title_gap: Duration,
    /// Scene entry: fade back in from black.
    pub scene_enter: Duration,
    /// Seconds used by the BGM fade-out when a scene exits.
    pub bgm_fade_secs: f32,
    /// Dialogue typewriter speed.
    pub reveal_chars_per_sec: f32,
    /// Pause between the last result line and the ranking submission.
    pub ranking_delay: Duration,
    /// Shape of the scale pulse.
    pub envelope: Envelope,
    /// World units per content grid cell.
    pub grid_unit: f32,
}

impl Default for RhythmSettings {
    fn default() -> Self {
        Self {
            loop_period_ms: 240_000,
            feedback_delay: Duration::from_millis(200),
            fail_penalty_ms: 5_000,
            scene_exit: Duration::from_millis(1_000),
            title_gap: Duration::from_millis(500),
            scene_enter: Duration::from_millis(500),
            bgm_fade_secs: 0.5,
            reveal_chars_per_sec: 60.0,
            ranking_delay: Duration::from_millis(1_000),
            envelope: Envelope::PRONOUNCED,
            grid_unit: 64.0,
        }
    }
}
