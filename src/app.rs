//! High-level plugin composition.
//!
//! `TempoSamuraiPlugin` registers every domain plugin and fixes the order of the gameplay system
//! sets. Each plugin owns its resources and systems; this module only wires them together.

use bevy::prelude::*;

use crate::audio::GameAudioPlugin;
use crate::beat::BeatPlugin;
use crate::beat_clock::BeatClockPlugin;
use crate::camera::CameraPlugin;
use crate::combat::CombatPlugin;
use crate::dialogue::DialoguePlugin;
use crate::hero::HeroPlugin;
use crate::motion::MotionPlugin;
use crate::ranking::RankingPlugin;
use crate::session::SessionPlugin;
use crate::settings::RhythmSettings;
use crate::stage::StagePlugin;
use crate::state::{in_play, return_to_title, GameSet, GameState};
use crate::ui::UiPlugin;

pub struct TempoSamuraiPlugin;

impl Plugin for TempoSamuraiPlugin {
    fn build(&self, app: &mut App) {
        // Settings first: other plugins read them while building their resources.
        app.init_resource::<RhythmSettings>()
            .init_state::<GameState>()
            .add_plugins((
                CameraPlugin,
                GameAudioPlugin,
                BeatClockPlugin,
                BeatPlugin,
                CombatPlugin,
                MotionPlugin,
                DialoguePlugin,
                RankingPlugin,
                HeroPlugin,
                StagePlugin,
                SessionPlugin,
                UiPlugin,
            ))
            // Clicks resolve before the sequencer re-checks its wait, and visuals read the result.
            .configure_sets(
                Update,
                (
                    GameSet::Input,
                    GameSet::Combat,
                    GameSet::Sequence,
                    GameSet::Visual,
                )
                    .chain()
                    .run_if(in_play),
            )
            .add_systems(Update, return_to_title);
    }
}
