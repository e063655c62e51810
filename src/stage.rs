//! Bevy host for the wave sequencer. `BevyStage` implements [`WaveStage`] over the ECS: every
//! command the script issues becomes a spawn, a component change, a resource update, or an event.
//!
//! Entering a play mode starts that mode's script and hands its cancellation token to the
//! session; leaving cancels the run and despawns everything tagged `PlayField`.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::audio::AudioRequest;
use crate::beat::{neutral_pose, Beat};
use crate::beat_clock::BeatClock;
use crate::combat::{CombatResolver, WaveRng};
use crate::dialogue::{DialogueAcknowledged, DialogueBox};
use crate::hero::{Hero, HERO_MARK, HERO_OFFSTAGE, HERO_RUN};
use crate::motion::{Motion, MotionFinished};
use crate::ranking::{RankingClosed, ResultReveal, ScoreRecord};
use crate::script::{wave_script, Appear, BgmTrack, EnemyGroupEntry, Line};
use crate::sequencer::{HeroMove, WaveError, WaveSequencer, WaveSignal, WaveStage};
use crate::session::SessionController;
use crate::settings::RhythmSettings;
use crate::state::{GameSet, GameState};

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WaveSequencer>()
            .add_systems(Update, drive_wave_sequencer.in_set(GameSet::Sequence));

        for state in [GameState::Tutorial, GameState::Story, GameState::Speedrun] {
            app.add_systems(OnEnter(state), start_wave_script)
                .add_systems(OnExit(state), tear_down_play_field);
        }
    }
}

/// Everything spawned for a run. Despawned when the mode is left.
#[derive(Component)]
pub struct PlayField;

#[derive(Component)]
pub struct Enemy;

/// X coordinate enemies run in from.
const ENEMY_WINGS_X: f32 = 760.0;
const ENEMY_ENTRANCE: std::time::Duration = std::time::Duration::from_millis(600);

/// World position of a grid cell. Lower rows draw in front.
pub fn grid_to_world(x: i32, y: i32, unit: f32) -> Vec3 {
    let y_world = y as f32 * unit;
    Vec3::new(x as f32 * unit, y_world, 1.0 - y_world * 0.001)
}

#[derive(SystemParam)]
pub struct BevyStage<'w, 's> {
    commands: Commands<'w, 's>,
    settings: Res<'w, RhythmSettings>,
    state: Res<'w, State<GameState>>,
    clock: ResMut<'w, BeatClock>,
    resolver: ResMut<'w, CombatResolver>,
    rng: ResMut<'w, WaveRng>,
    audio: EventWriter<'w, AudioRequest>,
    dialogue: ResMut<'w, DialogueBox>,
    reveal: ResMut<'w, ResultReveal>,
    session: ResMut<'w, SessionController>,
    heroes: Query<
        'w,
        's,
        (Entity, &'static mut Transform, &'static mut Beat, &'static mut Sprite),
        With<Hero>,
    >,
    enemies: Query<
        'w,
        's,
        (Entity, &'static mut Beat, &'static mut Transform, &'static mut Sprite),
        (With<Enemy>, Without<Hero>),
    >,
}

impl WaveStage for BevyStage<'_, '_> {
    fn begin(&mut self) -> Result<(), WaveError> {
        for (entity, ..) in &self.enemies {
            self.commands.entity(entity).despawn_recursive();
        }
        self.resolver.reset();
        self.dialogue.close();
        self.reveal.reset();

        let (hero, mut transform, _, mut sprite) = self
            .heroes
            .get_single_mut()
            .map_err(|_| WaveError::MissingActor("hero"))?;
        transform.translation = HERO_OFFSTAGE;
        neutral_pose(&mut transform, &mut sprite);
        self.commands.entity(hero).remove::<Motion>();
        info!("Run started in {:?}", self.state.get());
        Ok(())
    }

    fn play_tempo(&mut self, track: BgmTrack, bpm: u32) -> Result<(), WaveError> {
        if bpm == 0 {
            return Err(WaveError::ZeroTempo);
        }
        self.audio.send(AudioRequest::PlayTrack {
            slot: 0,
            track,
            looped: true,
        });
        self.clock.reset();
        self.resolver.set_tempo(bpm);
        for (_, _, mut beat, _) in &mut self.heroes {
            beat.bpm = bpm;
        }
        info!("Tempo {bpm} BPM ({track:?})");
        Ok(())
    }

    fn current_bpm(&self) -> u32 {
        self.resolver.current_bpm()
    }

    fn move_hero(&mut self, direction: HeroMove) -> Result<Entity, WaveError> {
        let (hero, transform, ..) = self
            .heroes
            .get_single()
            .map_err(|_| WaveError::MissingActor("hero"))?;
        let to = match direction {
            HeroMove::Enter => HERO_MARK,
            HeroMove::Exit => HERO_OFFSTAGE,
        };
        self.commands
            .entity(hero)
            .insert(Motion::travel(transform.translation, to, HERO_RUN));
        Ok(hero)
    }

    fn spawn_enemy(&mut self, entry: &EnemyGroupEntry, bpm: u32) -> Result<Entity, WaveError> {
        let destination = grid_to_world(entry.x, entry.y, self.settings.grid_unit);
        let ([r, g, b], size) = entry.kind.look();

        let (start, alpha, motion) = match entry.appear {
            Appear::Move => {
                let start = Vec3::new(ENEMY_WINGS_X, destination.y, destination.z);
                (start, 1.0, Motion::travel(start, destination, ENEMY_ENTRANCE))
            }
            Appear::Fade => (destination, 0.0, Motion::fade_in(destination, ENEMY_ENTRANCE)),
        };

        let entity = self
            .commands
            .spawn((
                Name::new(format!("{:?}", entry.kind)),
                Enemy,
                PlayField,
                Beat::new(bpm, entry.animation()),
                SpriteBundle {
                    sprite: Sprite {
                        color: Color::srgba(r, g, b, alpha),
                        custom_size: Some(Vec2::splat(size)),
                        ..default()
                    },
                    transform: Transform::from_translation(start),
                    ..default()
                },
                motion,
            ))
            .id();
        debug!("Spawned {:?} at {bpm} BPM -> {entity:?}", entry.kind);
        Ok(entity)
    }

    fn arm_enemies(&mut self, enemies: &[Entity]) {
        for &enemy in enemies {
            let Ok((_, mut beat, mut transform, mut sprite)) = self.enemies.get_mut(enemy) else {
                warn!("Enemy {enemy:?} vanished before it was armed");
                continue;
            };
            let bpm = beat.bpm;
            beat.initialize(bpm, None, true);
            neutral_pose(&mut transform, &mut sprite);
        }
        self.resolver.enlist(enemies);
    }

    fn remaining_enemies(&self) -> usize {
        self.resolver.remaining_count()
    }

    fn show_message(&mut self, line: Line) {
        self.dialogue.open(line);
    }

    fn show_ranking(&mut self) {
        self.resolver.stop_play_timer();
        let Some(mode) = self.state.get().mode() else {
            error!("Ranking requested outside a play mode");
            return;
        };
        let record = ScoreRecord::new(
            mode,
            self.resolver.elapsed_play_ms(),
            self.resolver.fail_count(),
            self.settings.fail_penalty_ms,
        );
        info!(
            "Run finished: {} ms, {} misses, total {}",
            record.elapsed_ms, record.fail_count, record.total
        );
        self.reveal.start(record, self.settings.ranking_delay);
    }

    fn finish(&mut self) {
        self.session.request(GameState::Title);
    }

    fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng.0
    }
}

fn drive_wave_sequencer(
    mut sequencer: ResMut<WaveSequencer>,
    mut stage: BevyStage,
    mut motions: EventReader<MotionFinished>,
    mut acknowledgements: EventReader<DialogueAcknowledged>,
    mut closes: EventReader<RankingClosed>,
) {
    for MotionFinished(entity) in motions.read() {
        sequencer.notify(WaveSignal::MotionFinished(*entity));
    }
    for _ in acknowledgements.read() {
        sequencer.notify(WaveSignal::DialogueAcknowledged);
    }
    for _ in closes.read() {
        sequencer.notify(WaveSignal::RankingClosed);
    }

    sequencer.advance(&mut stage);
}

fn start_wave_script(
    state: Res<State<GameState>>,
    mut sequencer: ResMut<WaveSequencer>,
    mut session: ResMut<SessionController>,
) {
    let Some(mode) = state.get().mode() else {
        return;
    };
    let token = sequencer.start(wave_script(mode));
    session.attach_run(token);
    info!("Starting {} script", mode.label());
}

fn tear_down_play_field(
    mut commands: Commands,
    sequencer: Res<WaveSequencer>,
    mut resolver: ResMut<CombatResolver>,
    mut dialogue: ResMut<DialogueBox>,
    mut reveal: ResMut<ResultReveal>,
    play_field: Query<Entity, With<PlayField>>,
) {
    sequencer.cancel();
    for entity in &play_field {
        commands.entity(entity).despawn_recursive();
    }
    *resolver = CombatResolver::default();
    dialogue.close();
    reveal.reset();
    debug!("Play field cleared");
}
