//! Scene lifecycle with fade transitions. A transition fades the current scene out (music and
//! picture), optionally holds on black, switches the Bevy state while the screen is fully black,
//! and fades the next scene in.

use std::time::Duration;

use bevy::prelude::*;

use crate::audio::AudioRequest;
use crate::script::BgmTrack;
use crate::sequencer::CancelToken;
use crate::settings::RhythmSettings;
use crate::state::GameState;

/// Registers the transition driver and the fade overlay.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionController>()
            .add_systems(Startup, spawn_fade_overlay)
            .add_systems(OnEnter(GameState::Title), play_title_music)
            .add_systems(Update, (advance_session, update_fade_overlay).chain());
    }
}

/// Durations of the three transition phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTimings {
    pub exit: Duration,
    pub gap: Duration,
    pub enter: Duration,
}

#[derive(Debug, Clone)]
struct Transition {
    to: GameState,
    elapsed: Duration,
    timings: SceneTimings,
    announced: bool,
    switched: bool,
}

impl Transition {
    fn switch_at(&self) -> Duration {
        self.timings.exit + self.timings.gap
    }

    fn settle_at(&self) -> Duration {
        self.switch_at() + self.timings.enter
    }
}

/// What the driver system has to act on after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCue {
    /// The scene started fading out; fade its music too.
    ExitStarted { from: GameState },
    /// The screen is black; switch to this state now.
    Switch(GameState),
    /// Fully faded in.
    Settled(GameState),
}

/// Tracks the current scene and the transition in progress, if any.
#[derive(Resource, Debug)]
pub struct SessionController {
    current: GameState,
    exit: Duration,
    gap: Duration,
    enter: Duration,
    transition: Option<Transition>,
    run: Option<CancelToken>,
}

impl FromWorld for SessionController {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<RhythmSettings>()
            .cloned()
            .unwrap_or_default();
        Self::new(&settings)
    }
}

impl SessionController {
    pub fn new(settings: &RhythmSettings) -> Self {
        Self {
            current: GameState::Title,
            exit: settings.scene_exit,
            gap: settings.title_gap,
            enter: settings.scene_enter,
            transition: None,
            run: None,
        }
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Remembers the cancellation token of the run that belongs to the current scene.
    pub fn attach_run(&mut self, token: CancelToken) {
        self.run = Some(token);
    }

    /// Starts a transition to `to`. Ignored while another transition is running or when `to` is
    /// already the current scene. Leaving a play scene cancels its run right away.
    pub fn request(&mut self, to: GameState) -> bool {
        if self.transition.is_some() || to == self.current {
            return false;
        }

        if let Some(run) = self.run.take() {
            run.cancel();
        }

        // Only leaving the title holds on black before the next scene.
        let gap = if self.current == GameState::Title {
            self.gap
        } else {
            Duration::ZERO
        };
        info!("Scene transition {:?} -> {to:?}", self.current);
        self.transition = Some(Transition {
            to,
            elapsed: Duration::ZERO,
            timings: SceneTimings {
                exit: self.exit,
                gap,
                enter: self.enter,
            },
            announced: false,
            switched: false,
        });
        true
    }

    /// Advances the transition. At most one cue is produced per call.
    pub fn tick(&mut self, delta: Duration) -> Option<SessionCue> {
        let transition = self.transition.as_mut()?;

        if !transition.announced {
            transition.announced = true;
            return Some(SessionCue::ExitStarted { from: self.current });
        }

        transition.elapsed += delta;

        if !transition.switched {
            if transition.elapsed < transition.switch_at() {
                return None;
            }
            transition.switched = true;
            self.current = transition.to;
            return Some(SessionCue::Switch(transition.to));
        }

        if transition.elapsed >= transition.settle_at() {
            let to = transition.to;
            self.transition = None;
            return Some(SessionCue::Settled(to));
        }
        None
    }

    /// Overlay opacity: rises through the exit, holds through the gap, falls through the entry.
    pub fn fade_alpha(&self) -> f32 {
        let Some(transition) = &self.transition else {
            return 0.0;
        };

        let elapsed = transition.elapsed.as_secs_f32();
        let exit = transition.timings.exit.as_secs_f32();
        let switch_at = transition.switch_at().as_secs_f32();
        let enter = transition.timings.enter.as_secs_f32();

        if elapsed < exit {
            elapsed / exit
        } else if elapsed < switch_at || enter <= 0.0 {
            1.0
        } else {
            (1.0 - (elapsed - switch_at) / enter).clamp(0.0, 1.0)
        }
    }
}

/// Marker component for the fade overlay node.
#[derive(Component)]
pub struct FadeOverlay;

fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        FadeOverlay,
        Name::new("FadeOverlay"),
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
            z_index: ZIndex::Global(100),
            ..default()
        },
    ));
}

fn advance_session(
    time: Res<Time<Real>>,
    settings: Res<RhythmSettings>,
    mut session: ResMut<SessionController>,
    mut next_state: ResMut<NextState<GameState>>,
    mut audio: EventWriter<AudioRequest>,
) {
    match session.tick(time.delta()) {
        Some(SessionCue::ExitStarted { from }) => {
            debug!("Fading out {from:?}");
            audio.send(AudioRequest::FadeOutTrack {
                slot: 0,
                secs: settings.bgm_fade_secs,
            });
        }
        Some(SessionCue::Switch(to)) => next_state.set(to),
        Some(SessionCue::Settled(to)) => debug!("Settled in {to:?}"),
        None => {}
    }
}

fn update_fade_overlay(
    session: Res<SessionController>,
    mut overlay_query: Query<&mut BackgroundColor, With<FadeOverlay>>,
) {
    for mut background in &mut overlay_query {
        background.0 = Color::srgba(0.0, 0.0, 0.0, session.fade_alpha());
    }
}

fn play_title_music(mut audio: EventWriter<AudioRequest>) {
    audio.send(AudioRequest::PlayTrack {
        slot: 0,
        track: BgmTrack::Title85,
        looped: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SessionController {
        SessionController::new(&RhythmSettings::default())
    }

    fn run_until_switch(session: &mut SessionController, step: Duration) -> (Duration, GameState) {
        let mut elapsed = Duration::ZERO;
        loop {
            if let Some(SessionCue::Switch(to)) = session.tick(step) {
                return (elapsed + step, to);
            }
            elapsed += step;
            assert!(elapsed < Duration::from_secs(10), "never switched");
        }
    }

    #[test]
    fn leaving_title_waits_for_exit_and_gap() {
        let mut session = controller();
        assert!(session.request(GameState::Story));
        assert_eq!(
            session.tick(Duration::from_millis(16)),
            Some(SessionCue::ExitStarted {
                from: GameState::Title
            })
        );
        let (elapsed, to) = run_until_switch(&mut session, Duration::from_millis(100));
        assert_eq!(to, GameState::Story);
        assert_eq!(elapsed, Duration::from_millis(1_500));
        assert_eq!(session.current(), GameState::Story);
        assert_eq!(session.fade_alpha(), 1.0);
    }

    #[test]
    fn returning_to_title_has_no_gap_and_cancels_the_run() {
        let mut session = controller();
        session.request(GameState::Tutorial);
        run_until_switch(&mut session, Duration::from_millis(100));
        while session.is_transitioning() {
            session.tick(Duration::from_millis(100));
        }

        let token = CancelToken::default();
        session.attach_run(token.clone());
        assert!(session.request(GameState::Title));
        assert!(token.is_cancelled());

        session.tick(Duration::ZERO);
        let (elapsed, to) = run_until_switch(&mut session, Duration::from_millis(100));
        assert_eq!(to, GameState::Title);
        assert_eq!(elapsed, Duration::from_millis(1_000));
    }

    #[test]
    fn requests_during_a_transition_are_ignored() {
        let mut session = controller();
        assert!(session.request(GameState::Speedrun));
        assert!(!session.request(GameState::Story));
        assert!(!controller().request(GameState::Title));
    }

    #[test]
    fn fade_rises_holds_and_falls() {
        let mut session = controller();
        assert_eq!(session.fade_alpha(), 0.0);
        session.request(GameState::Story);
        session.tick(Duration::ZERO);
        session.tick(Duration::from_millis(500));
        assert!((session.fade_alpha() - 0.5).abs() < 1e-3);
        session.tick(Duration::from_millis(700));
        assert_eq!(session.fade_alpha(), 1.0);
        session.tick(Duration::from_millis(300));
        session.tick(Duration::from_millis(250));
        assert!((session.fade_alpha() - 0.5).abs() < 1e-3);
        assert_eq!(
            session.tick(Duration::from_millis(250)),
            Some(SessionCue::Settled(GameState::Story))
        );
        assert_eq!(session.fade_alpha(), 0.0);
    }
}
