//! Tempo-matching combat. The resolver owns the list of enemies still standing, the player's
//! current tempo, the miss counter, and the play timer, and turns clicks into outcomes.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::Stopwatch;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::audio::{AudioRequest, SoundEffect};
use crate::beat::{AttackOutcome, Beat, BeatClicked};
use crate::sequencer::WaveError;
use crate::settings::RhythmSettings;
use crate::state::GameSet;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatResolver>()
            .init_resource::<WaveRng>()
            .add_systems(
                Update,
                (resolve_clicks, tick_combat)
                    .chain()
                    .in_set(GameSet::Combat),
            );
    }
}

/// Random source for tempo spreads and rubber-banding. Seeded from entropy in the game,
/// from a fixed seed in tests.
#[derive(Resource, Deref, DerefMut)]
pub struct WaveRng(pub ChaCha8Rng);

impl Default for WaveRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

/// Outcome of the last attack, kept while its flash is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    pub outcome: AttackOutcome,
}

#[derive(Resource, Debug)]
pub struct CombatResolver {
    remaining: Vec<Entity>,
    current_bpm: u32,
    fail_count: u32,
    play_time: Stopwatch,
    flash: Option<(Flash, Timer)>,
}

impl Default for CombatResolver {
    fn default() -> Self {
        let mut play_time = Stopwatch::new();
        play_time.pause();
        Self {
            remaining: Vec::new(),
            current_bpm: 0,
            fail_count: 0,
            play_time,
            flash: None,
        }
    }
}

impl CombatResolver {
    /// Clears every counter and starts the play timer from zero.
    pub fn reset(&mut self) {
        *self = Self::default();
        self.play_time.unpause();
    }

    pub fn current_bpm(&self) -> u32 {
        self.current_bpm
    }

    pub fn set_tempo(&mut self, bpm: u32) {
        self.current_bpm = bpm;
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    pub fn remaining(&self) -> &[Entity] {
        &self.remaining
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    /// Adds freshly spawned enemies in spawn order, skipping any already tracked.
    pub fn enlist(&mut self, enemies: &[Entity]) {
        for &enemy in enemies {
            if !self.remaining.contains(&enemy) {
                self.remaining.push(enemy);
            }
        }
    }

    pub fn attacking(&self) -> bool {
        self.flash.is_some()
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash.as_ref().map(|(flash, _)| *flash)
    }

    pub fn elapsed_play_ms(&self) -> u64 {
        self.play_time.elapsed().as_millis() as u64
    }

    pub fn stop_play_timer(&mut self) {
        self.play_time.pause();
    }

    /// Records an attack on `enemy`.
    ///
    /// A hit drops the enemy and, when others remain, returns one of them picked uniformly at
    /// random; the caller retunes it to [`Self::current_bpm`] so there is always a target the
    /// player can hit. A miss only counts against the player.
    pub fn resolve_attack(
        &mut self,
        enemy: Entity,
        hit: bool,
        rng: &mut impl Rng,
        feedback_delay: Duration,
    ) -> Option<Entity> {
        let outcome = if hit {
            AttackOutcome::Hit
        } else {
            AttackOutcome::Miss
        };
        self.flash = Some((Flash { outcome }, Timer::new(feedback_delay, TimerMode::Once)));

        if !hit {
            self.fail_count += 1;
            return None;
        }

        self.remaining.retain(|&tracked| tracked != enemy);
        self.remaining.choose(rng).copied()
    }

    /// Advances the play timer and the flash. Returns `true` on the frame the flash ends.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.play_time.tick(delta);
        let Some((_, timer)) = self.flash.as_mut() else {
            return false;
        };
        if timer.tick(delta).finished() {
            self.flash = None;
            return true;
        }
        false
    }
}

/// Tempos for a group of `count`: member `i` gets `base +/- i * spread` with an independent random
/// sign, and the list comes back in uniformly random order.
pub fn spread_tempos(
    base: u32,
    spread: u32,
    count: usize,
    group: u32,
    rng: &mut impl Rng,
) -> Result<Vec<u32>, WaveError> {
    let mut tempos = Vec::with_capacity(count);
    for index in 0..count as u32 {
        let offset = index
            .checked_mul(spread)
            .ok_or(WaveError::TempoOverflow { group, base })?;
        let bpm = if rng.gen_bool(0.5) {
            base.checked_add(offset)
                .ok_or(WaveError::TempoOverflow { group, base })?
        } else {
            base.checked_sub(offset)
                .filter(|&bpm| bpm > 0)
                .ok_or(WaveError::TempoUnderflow {
                    group,
                    base,
                    offset,
                })?
        };
        tempos.push(bpm);
    }
    tempos.shuffle(rng);
    Ok(tempos)
}

fn resolve_clicks(
    mut clicks: EventReader<BeatClicked>,
    mut beats: Query<&mut Beat>,
    mut resolver: ResMut<CombatResolver>,
    mut rng: ResMut<WaveRng>,
    settings: Res<RhythmSettings>,
    mut audio: EventWriter<AudioRequest>,
) {
    for BeatClicked(entity) in clicks.read() {
        let Ok(mut beat) = beats.get_mut(*entity) else {
            continue;
        };
        let Some(outcome) = beat.on_click_attempt(resolver.current_bpm()) else {
            continue;
        };

        let hit = outcome == AttackOutcome::Hit;
        audio.send(AudioRequest::PlayEffect(if hit {
            SoundEffect::AttackOk
        } else {
            SoundEffect::AttackNg
        }));

        let retuned = resolver.resolve_attack(*entity, hit, &mut rng.0, settings.feedback_delay);
        debug!(
            "{outcome:?} on {entity:?}; {} left, {} misses",
            resolver.remaining_count(),
            resolver.fail_count()
        );

        if let Some(target) = retuned {
            if let Ok(mut survivor) = beats.get_mut(target) {
                survivor.bpm = resolver.current_bpm();
            }
        }
    }
}

fn tick_combat(
    time: Res<Time>,
    mut commands: Commands,
    mut resolver: ResMut<CombatResolver>,
    beats: Query<(Entity, &Beat)>,
) {
    if !resolver.tick(time.delta()) {
        return;
    }

    // Defeated beats stay frozen on screen for the flash, then go.
    for (entity, beat) in &beats {
        if !beat.alive {
            commands.entity(entity).despawn_recursive();
        }
    }
}
