//! Pulsing, clickable actors. A `Beat` carries a tempo and the way it shows that tempo; each
//! frame it samples the shared `BeatClock` through the tempo envelopes.
//!
//! Clicks are hit-tested here and forwarded as `BeatClicked`; deciding what a click means is the
//! combat resolver's job.

use bevy::color::Alpha;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::beat_clock::BeatClock;
use crate::camera::cursor_world_position;
use crate::combat::CombatResolver;
use crate::motion::Motion;
use crate::settings::RhythmSettings;
use crate::state::GameSet;
use crate::tempo::{alpha_envelope, phase, Envelope};

pub struct BeatPlugin;

impl Plugin for BeatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BeatClicked>().add_systems(
            Update,
            (
                pick_beat_under_cursor.in_set(GameSet::Input),
                animate_beats.in_set(GameSet::Visual),
            ),
        );
    }
}

/// How a beat visualises its tempo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeatAnimation {
    /// Frozen. Used for defeated beats that linger through the hit flash.
    None,
    #[default]
    Scale,
    Alpha,
}

/// Visual parameter for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pulse {
    Scale(f32),
    Alpha(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Hit,
    Miss,
}

/// A clickable actor with a tempo.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Beat {
    pub bpm: u32,
    pub animation: BeatAnimation,
    pub selectable: bool,
    pub alive: bool,
}

impl Beat {
    pub fn new(bpm: u32, animation: BeatAnimation) -> Self {
        Self {
            bpm,
            animation,
            selectable: false,
            alive: true,
        }
    }

    /// Re-arms the beat with a new tempo. `None` keeps the current animation kind.
    /// Callers reset the transform and tint with [`neutral_pose`].
    pub fn initialize(&mut self, bpm: u32, animation: Option<BeatAnimation>, selectable: bool) {
        self.bpm = bpm;
        if let Some(animation) = animation {
            self.animation = animation;
        }
        self.selectable = selectable;
        self.alive = true;
    }

    pub fn sample(&self, beat_time_ms: u32, envelope: &Envelope) -> Option<Pulse> {
        let rate = phase(beat_time_ms, self.bpm);
        match self.animation {
            BeatAnimation::None => None,
            BeatAnimation::Scale => Some(Pulse::Scale(envelope.scale(rate))),
            BeatAnimation::Alpha => Some(Pulse::Alpha(alpha_envelope(rate))),
        }
    }

    /// `None` when the beat cannot be selected; nothing changes in that case.
    /// A hit freezes the beat and marks it defeated. Removing it is up to the caller.
    pub fn on_click_attempt(&mut self, current_bpm: u32) -> Option<AttackOutcome> {
        if !self.selectable {
            return None;
        }

        if self.bpm == current_bpm {
            self.selectable = false;
            self.animation = BeatAnimation::None;
            self.alive = false;
            Some(AttackOutcome::Hit)
        } else {
            Some(AttackOutcome::Miss)
        }
    }
}

/// Puts a beat's sprite back to unit scale and full opacity.
pub fn neutral_pose(transform: &mut Transform, sprite: &mut Sprite) {
    transform.scale = Vec3::ONE;
    sprite.color = sprite.color.with_alpha(1.0);
}

/// A selectable beat was clicked.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatClicked(pub Entity);

fn animate_beats(
    clock: Res<BeatClock>,
    settings: Res<RhythmSettings>,
    resolver: Res<CombatResolver>,
    mut beats: Query<(&Beat, &mut Transform, &mut Sprite), Without<Motion>>,
) {
    let beat_time_ms = clock.beat_time_ms();
    for (beat, mut transform, mut sprite) in &mut beats {
        // Hold still during the flash so a retuned enemy doesn't visibly change step.
        if resolver.attacking() && beat.selectable {
            continue;
        }

        match beat.sample(beat_time_ms, &settings.envelope) {
            Some(Pulse::Scale(scale)) => transform.scale = Vec3::new(scale, scale, 1.0),
            Some(Pulse::Alpha(alpha)) => sprite.color = sprite.color.with_alpha(alpha),
            None => {}
        }
    }
}

/// Whether `point` falls inside a sprite of `size` centred at `center`, scaled by `scale`.
pub fn hit_test(point: Vec2, center: Vec2, size: Vec2, scale: Vec2) -> bool {
    let half = size * scale.abs() * 0.5;
    (point.x - center.x).abs() <= half.x && (point.y - center.y).abs() <= half.y
}

fn pick_beat_under_cursor(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<bevy::window::PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    beats: Query<(Entity, &Beat, &GlobalTransform, &Sprite)>,
    mut clicked: EventWriter<BeatClicked>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }

    let Some(point) = cursor_world_position(&windows, &cameras) else {
        return;
    };

    // Topmost selectable beat under the cursor wins.
    let target = beats
        .iter()
        .filter(|(_, beat, _, _)| beat.selectable)
        .filter(|(_, _, transform, sprite)| {
            let (scale, _, translation) = transform.to_scale_rotation_translation();
            let size = sprite.custom_size.unwrap_or(Vec2::ONE);
            hit_test(point, translation.truncate(), size, scale.truncate())
        })
        .max_by(|(_, _, a, _), (_, _, b, _)| a.translation().z.total_cmp(&b.translation().z))
        .map(|(entity, ..)| entity);

    if let Some(entity) = target {
        clicked.send(BeatClicked(entity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(bpm: u32) -> Beat {
        let mut beat = Beat::new(bpm, BeatAnimation::Scale);
        beat.selectable = true;
        beat
    }

    #[test]
    fn matching_tempo_hits_and_freezes() {
        let mut beat = armed(120);
        assert_eq!(beat.on_click_attempt(120), Some(AttackOutcome::Hit));
        assert!(!beat.selectable);
        assert!(!beat.alive);
        assert_eq!(beat.animation, BeatAnimation::None);
        assert_eq!(beat.sample(1_000, &Envelope::default()), None);
    }

    #[test]
    fn mismatched_tempo_misses_without_changing_state() {
        let mut beat = armed(150);
        let before = beat.clone();
        assert_eq!(beat.on_click_attempt(120), Some(AttackOutcome::Miss));
        assert_eq!(beat, before);
    }

    #[test]
    fn unselectable_beat_ignores_clicks() {
        for bpm in [120, 150] {
            let mut beat = Beat::new(bpm, BeatAnimation::Alpha);
            let before = beat.clone();
            assert_eq!(beat.on_click_attempt(120), None);
            assert_eq!(beat, before);
        }
    }

    #[test]
    fn initialize_keeps_animation_when_unspecified() {
        let mut beat = Beat::new(85, BeatAnimation::Alpha);
        beat.on_click_attempt(85);
        beat.initialize(128, None, true);
        assert_eq!(beat.bpm, 128);
        assert_eq!(beat.animation, BeatAnimation::None);
        beat.initialize(128, Some(BeatAnimation::Scale), false);
        assert_eq!(beat.animation, BeatAnimation::Scale);
        assert!(beat.alive);
        assert!(!beat.selectable);
    }

    #[test]
    fn sample_follows_animation_kind() {
        let envelope = Envelope::default();
        // 500 ms into a 2 s bar is the first peak.
        match Beat::new(120, BeatAnimation::Scale).sample(500, &envelope) {
            Some(Pulse::Scale(scale)) => assert!((scale - 1.40).abs() < 1e-3),
            other => panic!("unexpected {other:?}"),
        }
        match Beat::new(120, BeatAnimation::Alpha).sample(1_000, &envelope) {
            Some(Pulse::Alpha(alpha)) => assert!((alpha - 0.5).abs() < 1e-3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn neutral_pose_resets_scale_and_alpha() {
        let mut transform = Transform::from_scale(Vec3::splat(1.3));
        let mut sprite = Sprite {
            color: Color::srgba(1.0, 0.0, 0.0, 0.2),
            ..default()
        };
        neutral_pose(&mut transform, &mut sprite);
        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(sprite.color.alpha(), 1.0);
    }

    #[test]
    fn hit_test_respects_scale() {
        let center = Vec2::new(100.0, 0.0);
        let size = Vec2::splat(64.0);
        assert!(hit_test(Vec2::new(130.0, 0.0), center, size, Vec2::ONE));
        assert!(!hit_test(Vec2::new(140.0, 0.0), center, size, Vec2::ONE));
        assert!(hit_test(Vec2::new(140.0, 0.0), center, size, Vec2::splat(1.4)));
    }
}
