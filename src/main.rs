//! Application entry point: composes the Bevy runtime, core plugins, and window configuration.
//!
//! The game itself lives in `TempoSamuraiPlugin` (`app.rs`); this file only configures the
//! window and the engine plugins it runs on.

mod app;
mod audio;
mod beat;
mod beat_clock;
mod camera;
mod combat;
mod dialogue;
mod hero;
mod motion;
mod ranking;
mod script;
mod sequencer;
mod session;
mod settings;
mod stage;
mod state;
mod tempo;
mod ui;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod wasm;

use app::TempoSamuraiPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    wasm::set_panic_hook();

    // Stage coordinates assume a 1280x720 logical resolution; the camera is fixed, so resizing
    // only letterboxes the play field.
    let primary_window = Window {
        title: "Tempo Samurai".to_string(),
        resolution: WindowResolution::new(1280.0, 720.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 640.0,
            min_height: 360.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    // Nearest-neighbour sampling for the sprites, and asset settings per target.
    let mut default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest());

    #[cfg(not(target_arch = "wasm32"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(true),
            ..default()
        });
    }

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(false),
            ..default()
        });
    }

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.08, 0.06, 0.1)))
        .add_plugins(default_plugins)
        .add_plugins(TempoSamuraiPlugin)
        .run();
}
