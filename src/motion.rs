//! Linear tweens for actors entering and leaving the stage.
//!
//! A `Motion` moves an entity's translation and, optionally, its sprite alpha over a fixed
//! duration. When it runs out the entity is snapped to the end state, the component is removed,
//! and `MotionFinished` is sent so whoever is waiting on the tween can move on.

use std::time::Duration;

use bevy::color::Alpha;
use bevy::prelude::*;

use crate::state::GameSet;

pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MotionFinished>()
            .add_systems(Update, advance_motions.in_set(GameSet::Visual));
    }
}

#[derive(Component, Debug, Clone)]
pub struct Motion {
    pub from: Vec3,
    pub to: Vec3,
    pub alpha: Option<(f32, f32)>,
    timer: Timer,
}

/// One frame of a motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub translation: Vec3,
    pub alpha: Option<f32>,
}

impl Motion {
    /// Moves from `from` to `to` at full opacity.
    pub fn travel(from: Vec3, to: Vec3, duration: Duration) -> Self {
        Self {
            from,
            to,
            alpha: None,
            timer: Timer::new(duration, TimerMode::Once),
        }
    }

    /// Fades in on the spot.
    pub fn fade_in(at: Vec3, duration: Duration) -> Self {
        Self {
            from: at,
            to: at,
            alpha: Some((0.0, 1.0)),
            timer: Timer::new(duration, TimerMode::Once),
        }
    }

    pub fn tick(&mut self, delta: Duration) -> MotionSample {
        self.timer.tick(delta);
        self.sample()
    }

    pub fn finished(&self) -> bool {
        self.timer.finished()
    }

    pub fn sample(&self) -> MotionSample {
        let t = if self.timer.duration().is_zero() {
            1.0
        } else {
            self.timer.fraction()
        };
        MotionSample {
            translation: self.from.lerp(self.to, t),
            alpha: self.alpha.map(|(from, to)| from + (to - from) * t),
        }
    }
}

/// A tween ran to completion on this entity.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionFinished(pub Entity);

fn advance_motions(
    time: Res<Time>,
    mut commands: Commands,
    mut movers: Query<(Entity, &mut Motion, &mut Transform, Option<&mut Sprite>)>,
    mut finished: EventWriter<MotionFinished>,
) {
    for (entity, mut motion, mut transform, sprite) in &mut movers {
        let frame = motion.tick(time.delta());
        transform.translation = frame.translation;
        if let (Some(alpha), Some(mut sprite)) = (frame.alpha, sprite) {
            sprite.color = sprite.color.with_alpha(alpha);
        }

        if motion.finished() {
            commands.entity(entity).remove::<Motion>();
            finished.send(MotionFinished(entity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_interpolates_and_ends_on_target() {
        let mut motion = Motion::travel(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), Duration::from_secs(1));
        let half = motion.tick(Duration::from_millis(500));
        assert!((half.translation.x - 50.0).abs() < 1e-3);
        assert_eq!(half.alpha, None);
        assert!(!motion.finished());

        let end = motion.tick(Duration::from_millis(700));
        assert_eq!(end.translation, Vec3::new(100.0, 0.0, 0.0));
        assert!(motion.finished());
    }

    #[test]
    fn fade_in_stays_put() {
        let at = Vec3::new(64.0, 128.0, 2.0);
        let mut motion = Motion::fade_in(at, Duration::from_millis(400));
        let frame = motion.tick(Duration::from_millis(100));
        assert_eq!(frame.translation, at);
        assert!((frame.alpha.unwrap() - 0.25).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut motion = Motion::travel(Vec3::ZERO, Vec3::ONE, Duration::ZERO);
        let frame = motion.tick(Duration::ZERO);
        assert_eq!(frame.translation, Vec3::ONE);
        assert!(motion.finished());
    }

    #[derive(Resource, Default)]
    struct Finished(Vec<Entity>);

    fn collect(mut events: EventReader<MotionFinished>, mut finished: ResMut<Finished>) {
        finished.0.extend(events.read().map(|event| event.0));
    }

    #[test]
    fn finished_motion_is_removed_and_reported() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<MotionFinished>()
            .init_resource::<Finished>()
            .add_systems(Update, (advance_motions, collect).chain());

        let target = Vec3::new(10.0, 0.0, 0.0);
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Motion::travel(Vec3::ZERO, target, Duration::ZERO),
            ))
            .id();
        app.update();

        assert!(app.world().get::<Motion>(entity).is_none());
        assert_eq!(app.world().get::<Transform>(entity).unwrap().translation, target);
        assert_eq!(app.world().resource::<Finished>().0, vec![entity]);
    }
}
