//! Fixed stage camera. The play field is a single screen, so the camera never moves; the module
//! also maps the cursor into world space for click hit-testing.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera);
    }
}

/// Marker for the stage camera.
#[derive(Component)]
pub struct StageCamera;

fn setup_camera(mut commands: Commands) {
    commands.spawn((Name::new("StageCamera"), Camera2dBundle::default(), StageCamera));
}

/// Cursor position in world coordinates, if the cursor is inside the primary window.
pub fn cursor_world_position(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let window = windows.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, transform) = cameras.iter().find(|(camera, _)| camera.is_active)?;
    camera.viewport_to_world_2d(transform, cursor)
}
