//! The hero. Spawned off stage whenever a play mode starts; the wave script runs it on and off,
//! and it pulses at the player's tempo so there is always a reference beat on screen.

use std::time::Duration;

use bevy::prelude::*;

use crate::beat::{Beat, BeatAnimation};
use crate::stage::PlayField;
use crate::state::GameState;

/// Spawns the hero on entry to every play mode. Despawning is handled with the rest of the
/// play field.
pub struct HeroPlugin;

impl Plugin for HeroPlugin {
    fn build(&self, app: &mut App) {
        for state in [GameState::Tutorial, GameState::Story, GameState::Speedrun] {
            app.add_systems(OnEnter(state), spawn_hero);
        }
    }
}

#[derive(Component)]
pub struct Hero;

/// Where the hero waits before entering and after leaving.
pub const HERO_OFFSTAGE: Vec3 = Vec3::new(-760.0, 0.0, 2.0);
/// Where the hero stands while fighting.
pub const HERO_MARK: Vec3 = Vec3::new(-256.0, 0.0, 2.0);
/// Duration of a run on or off the stage.
pub const HERO_RUN: Duration = Duration::from_millis(800);

const HERO_SIZE: Vec2 = Vec2::new(64.0, 96.0);

fn spawn_hero(mut commands: Commands) {
    commands.spawn((
        Name::new("Hero"),
        Hero,
        PlayField,
        // Tempo is set by the first tempo change of the script.
        Beat::new(0, BeatAnimation::Scale),
        SpriteBundle {
            sprite: Sprite {
                color: Color::srgb(0.3, 0.55, 0.95),
                custom_size: Some(HERO_SIZE),
                ..default()
            },
            transform: Transform::from_translation(HERO_OFFSTAGE),
            ..default()
        },
    ));
    info!("Hero waiting off stage");
}
