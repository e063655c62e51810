//! Global game state definitions. Each scene is a Bevy state; switching scenes updates an enum
//! value and triggers the on-enter/on-exit schedules of the scene being left and entered.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::session::SessionController;

/// Top-level scene.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Title,
    Tutorial,
    Story,
    Speedrun,
}

impl GameState {
    pub fn mode(self) -> Option<GameMode> {
        match self {
            GameState::Title => None,
            GameState::Tutorial => Some(GameMode::Tutorial),
            GameState::Story => Some(GameMode::Story),
            GameState::Speedrun => Some(GameMode::Speedrun),
        }
    }
}

/// The three playable scenes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Tutorial,
    Story,
    Speedrun,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Tutorial, GameMode::Story, GameMode::Speedrun];

    pub fn state(self) -> GameState {
        match self {
            GameMode::Tutorial => GameState::Tutorial,
            GameMode::Story => GameState::Story,
            GameMode::Speedrun => GameState::Speedrun,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::Tutorial => "Tutorial",
            GameMode::Story => "Story",
            GameMode::Speedrun => "Speedrun",
        }
    }
}

/// Named system sets to structure the Update schedule while a mode is being played.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Combat,
    Sequence,
    Visual,
}

/// Run condition: one of the play modes is active.
pub fn in_play(state: Res<State<GameState>>) -> bool {
    state.get().mode().is_some()
}

/// `ESC` abandons the current run and heads back to the title.
pub fn return_to_title(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut session: ResMut<SessionController>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    if state.get().mode().is_some() {
        session.request(GameState::Title);
    }
}
