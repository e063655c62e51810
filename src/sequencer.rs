//! Wave script interpreter.
//!
//! A `WaveSequencer` walks a script one command at a time. Commands that have to wait (for a
//! movement tween, a group's entrances, the dialogue box, a predicate over the combat state) park
//! a `Suspension`; `advance` is called once per frame, re-checks it, and moves on as soon as it is
//! satisfied. Nothing ever blocks: the sequencer is a plain state machine driven by the schedule.
//!
//! The sequencer never touches the ECS itself. Everything it asks for goes through the
//! [`WaveStage`] it is handed, which keeps the interpreter testable without an `App`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::combat::spread_tempos;
use crate::script::{enemy_group, message, BgmTrack, EnemyGroupEntry, Line, WaveCommand};

/// Structural failures. Any of these aborts the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaveError {
    #[error("group {group}: {base} BPM minus {offset} leaves no tempo")]
    TempoUnderflow { group: u32, base: u32, offset: u32 },
    #[error("group {group}: spread around {base} BPM overflows")]
    TempoOverflow { group: u32, base: u32 },
    #[error("tempo change to 0 BPM")]
    ZeroTempo,
    #[error("no {0} on stage")]
    MissingActor(&'static str),
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequencerStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Completion signals fed back from collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveSignal {
    MotionFinished(Entity),
    DialogueAcknowledged,
    RankingClosed,
}

/// Which way the hero runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroMove {
    Enter,
    Exit,
}

/// Everything a script can make happen. Implemented over the ECS by the game and by recording
/// fakes in tests.
pub trait WaveStage {
    /// Resets actors, counters, and the play timer.
    fn begin(&mut self) -> Result<(), WaveError>;

    /// Switches music, restarts the beat clock, and sets the player's tempo.
    fn play_tempo(&mut self, track: BgmTrack, bpm: u32) -> Result<(), WaveError>;

    fn current_bpm(&self) -> u32;

    /// Starts the hero's tween and returns the entity whose `MotionFinished` ends the step.
    fn move_hero(&mut self, direction: HeroMove) -> Result<Entity, WaveError>;

    /// Spawns one enemy, not yet selectable, with its entrance tween running.
    fn spawn_enemy(&mut self, entry: &EnemyGroupEntry, bpm: u32) -> Result<Entity, WaveError>;

    /// Makes the group clickable and hands it to the combat resolver.
    fn arm_enemies(&mut self, enemies: &[Entity]);

    fn remaining_enemies(&self) -> usize;

    fn show_message(&mut self, line: Line);

    /// Stops the play timer and starts the result reveal.
    fn show_ranking(&mut self);

    /// The script reached `End`; leave the mode.
    fn finish(&mut self);

    fn rng(&mut self) -> &mut ChaCha8Rng;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Suspension {
    Motion { target: Entity, done: bool },
    Entrance { pending: Vec<Entity>, spawned: Vec<Entity> },
    EnemiesAtMost(usize),
    Dialogue { acknowledged: bool },
    Ranking { closed: bool },
}

impl Suspension {
    fn on_signal(&mut self, signal: WaveSignal) {
        match (self, signal) {
            (Suspension::Motion { target, done }, WaveSignal::MotionFinished(entity))
                if *target == entity =>
            {
                *done = true;
            }
            (Suspension::Entrance { pending, .. }, WaveSignal::MotionFinished(entity)) => {
                pending.retain(|&waiting| waiting != entity);
            }
            (Suspension::Dialogue { acknowledged }, WaveSignal::DialogueAcknowledged) => {
                *acknowledged = true;
            }
            (Suspension::Ranking { closed }, WaveSignal::RankingClosed) => {
                *closed = true;
            }
            _ => {}
        }
    }

    fn is_satisfied(&self, stage: &impl WaveStage) -> bool {
        match self {
            Suspension::Motion { done, .. } => *done,
            Suspension::Entrance { pending, .. } => pending.is_empty(),
            Suspension::EnemiesAtMost(limit) => stage.remaining_enemies() <= *limit,
            Suspension::Dialogue { acknowledged } => *acknowledged,
            Suspension::Ranking { closed } => *closed,
        }
    }
}

enum Step {
    Next,
    Suspend(Suspension),
    Finish,
}

/// Runs one wave script at a time.
#[derive(Resource, Debug, Default)]
pub struct WaveSequencer {
    script: &'static [WaveCommand],
    cursor: usize,
    status: SequencerStatus,
    waiting: Option<Suspension>,
    cancel: CancelToken,
}

impl WaveSequencer {
    /// Starts `script` from the top and returns the token that cancels this run.
    pub fn start(&mut self, script: &'static [WaveCommand]) -> CancelToken {
        self.script = script;
        self.cursor = 0;
        self.status = SequencerStatus::Running;
        self.waiting = None;
        self.cancel = CancelToken::default();
        self.cancel.clone()
    }

    /// Requests termination. Takes effect at the next `advance`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn status(&self) -> SequencerStatus {
        self.status
    }

    /// Index of the command currently executing or waiting.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub fn is_waiting(&self) -> bool {
        self.waiting.is_some()
    }

    pub fn notify(&mut self, signal: WaveSignal) {
        if let Some(waiting) = self.waiting.as_mut() {
            waiting.on_signal(signal);
        }
    }

    /// Runs commands until one suspends, the script ends, or the run is cancelled.
    pub fn advance(&mut self, stage: &mut impl WaveStage) {
        if self.status != SequencerStatus::Running {
            return;
        }

        loop {
            if self.cancel.is_cancelled() {
                info!("Wave script cancelled at command {}", self.cursor);
                self.waiting = None;
                self.status = SequencerStatus::Cancelled;
                return;
            }

            if let Some(waiting) = &self.waiting {
                if !waiting.is_satisfied(&*stage) {
                    return;
                }
                if let Some(Suspension::Entrance { spawned, .. }) = self.waiting.take() {
                    stage.arm_enemies(&spawned);
                }
                self.cursor += 1;
                continue;
            }

            let Some(&command) = self.script.get(self.cursor) else {
                self.status = SequencerStatus::Completed;
                return;
            };

            match self.execute(command, stage) {
                Ok(Step::Next) => self.cursor += 1,
                Ok(Step::Suspend(suspension)) => self.waiting = Some(suspension),
                Ok(Step::Finish) => {
                    self.cursor += 1;
                    self.status = SequencerStatus::Completed;
                    info!("Wave script completed");
                    return;
                }
                Err(err) => {
                    error!("Wave command {} ({command:?}) failed: {err}", self.cursor);
                    self.waiting = None;
                    self.status = SequencerStatus::Cancelled;
                    return;
                }
            }
        }
    }

    fn execute(
        &mut self,
        command: WaveCommand,
        stage: &mut impl WaveStage,
    ) -> Result<Step, WaveError> {
        debug!("Wave command {}: {command:?}", self.cursor);
        match command {
            WaveCommand::Begin => {
                stage.begin()?;
                Ok(Step::Next)
            }
            WaveCommand::PlayTempo { track, bpm } => {
                if bpm == 0 {
                    return Err(WaveError::ZeroTempo);
                }
                stage.play_tempo(track, bpm)?;
                Ok(Step::Next)
            }
            WaveCommand::ActorEnter | WaveCommand::ActorExit => {
                let direction = if command == WaveCommand::ActorEnter {
                    HeroMove::Enter
                } else {
                    HeroMove::Exit
                };
                let target = stage.move_hero(direction)?;
                Ok(Step::Suspend(Suspension::Motion {
                    target,
                    done: false,
                }))
            }
            WaveCommand::EnemyGroupEnter { group, spread } => {
                let entries = enemy_group(group);
                let base = stage.current_bpm();
                let tempos = spread_tempos(base, spread, entries.len(), group, stage.rng())?;

                let mut spawned = Vec::with_capacity(entries.len());
                for (entry, bpm) in entries.iter().zip(tempos) {
                    spawned.push(stage.spawn_enemy(entry, bpm)?);
                }
                if spawned.is_empty() {
                    warn!("Enemy group {group} is empty");
                    return Ok(Step::Next);
                }
                Ok(Step::Suspend(Suspension::Entrance {
                    pending: spawned.clone(),
                    spawned,
                }))
            }
            WaveCommand::WaitEnemiesAtMost(limit) => {
                Ok(Step::Suspend(Suspension::EnemiesAtMost(limit)))
            }
            WaveCommand::ShowMessage(id) => {
                stage.show_message(message(id));
                Ok(Step::Suspend(Suspension::Dialogue {
                    acknowledged: false,
                }))
            }
            WaveCommand::ShowRanking => {
                stage.show_ranking();
                Ok(Step::Suspend(Suspension::Ranking { closed: false }))
            }
            WaveCommand::End => {
                stage.finish();
                Ok(Step::Finish)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use rand::SeedableRng;

    use super::*;
    use crate::beat::{AttackOutcome, Beat};
    use crate::combat::CombatResolver;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Begin,
        Tempo(u32),
        Hero(HeroMove),
        Spawn(u32),
        Arm(usize),
        Message(&'static str),
        Ranking,
        Finish,
    }

    /// Records every call and backs combat with the real resolver.
    struct ScriptedStage {
        calls: Vec<Call>,
        resolver: CombatResolver,
        beats: HashMap<Entity, Beat>,
        next_id: u32,
        hero: Option<Entity>,
        rng: ChaCha8Rng,
    }

    impl ScriptedStage {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                resolver: CombatResolver::default(),
                beats: HashMap::new(),
                next_id: 100,
                hero: Some(Entity::from_raw(1)),
                rng: ChaCha8Rng::seed_from_u64(11),
            }
        }

        fn click(&mut self, enemy: Entity) -> Option<AttackOutcome> {
            let current = self.resolver.current_bpm();
            let outcome = self.beats.get_mut(&enemy)?.on_click_attempt(current)?;
            let retuned = self.resolver.resolve_attack(
                enemy,
                outcome == AttackOutcome::Hit,
                &mut self.rng,
                Duration::from_millis(200),
            );
            if let Some(target) = retuned {
                self.beats.get_mut(&target).unwrap().bpm = current;
            }
            Some(outcome)
        }
    }

    impl WaveStage for ScriptedStage {
        fn begin(&mut self) -> Result<(), WaveError> {
            self.resolver.reset();
            self.calls.push(Call::Begin);
            Ok(())
        }

        fn play_tempo(&mut self, _track: BgmTrack, bpm: u32) -> Result<(), WaveError> {
            self.resolver.set_tempo(bpm);
            self.calls.push(Call::Tempo(bpm));
            Ok(())
        }

        fn current_bpm(&self) -> u32 {
            self.resolver.current_bpm()
        }

        fn move_hero(&mut self, direction: HeroMove) -> Result<Entity, WaveError> {
            self.calls.push(Call::Hero(direction));
            self.hero.ok_or(WaveError::MissingActor("hero"))
        }

        fn spawn_enemy(&mut self, entry: &EnemyGroupEntry, bpm: u32) -> Result<Entity, WaveError> {
            let entity = Entity::from_raw(self.next_id);
            self.next_id += 1;
            self.beats.insert(entity, Beat::new(bpm, entry.animation()));
            self.calls.push(Call::Spawn(bpm));
            Ok(entity)
        }

        fn arm_enemies(&mut self, enemies: &[Entity]) {
            for enemy in enemies {
                self.beats.get_mut(enemy).unwrap().selectable = true;
            }
            self.resolver.enlist(enemies);
            self.calls.push(Call::Arm(enemies.len()));
        }

        fn remaining_enemies(&self) -> usize {
            self.resolver.remaining_count()
        }

        fn show_message(&mut self, line: Line) {
            self.calls.push(Call::Message(line.text));
        }

        fn show_ranking(&mut self) {
            self.resolver.stop_play_timer();
            self.calls.push(Call::Ranking);
        }

        fn finish(&mut self) {
            self.calls.push(Call::Finish);
        }

        fn rng(&mut self) -> &mut ChaCha8Rng {
            &mut self.rng
        }
    }

    fn spawned(stage: &ScriptedStage) -> Vec<Entity> {
        let mut enemies: Vec<Entity> = stage.beats.keys().copied().collect();
        enemies.sort();
        enemies
    }

    #[test]
    fn non_blocking_script_runs_in_order_in_one_advance() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::Begin,
            WaveCommand::PlayTempo {
                track: BgmTrack::InGame128,
                bpm: 128,
            },
            WaveCommand::WaitEnemiesAtMost(0),
            WaveCommand::PlayTempo {
                track: BgmTrack::InGame150,
                bpm: 150,
            },
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);

        assert_eq!(sequencer.status(), SequencerStatus::Completed);
        assert_eq!(sequencer.cursor(), SCRIPT.len());
        assert_eq!(
            stage.calls,
            vec![Call::Begin, Call::Tempo(128), Call::Tempo(150), Call::Finish]
        );
        assert_eq!(stage.current_bpm(), 150);
    }

    #[test]
    fn running_off_the_end_completes_without_end_command() {
        static SCRIPT: &[WaveCommand] = &[WaveCommand::Begin];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Completed);
        assert_eq!(stage.calls, vec![Call::Begin]);
    }

    #[test]
    fn idle_sequencer_does_nothing() {
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Idle);
        assert!(stage.calls.is_empty());
    }

    #[test]
    fn message_waits_for_acknowledgement() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::ShowMessage(102_010),
            WaveCommand::ShowMessage(999_999),
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);

        sequencer.advance(&mut stage);
        sequencer.advance(&mut stage);
        assert_eq!(stage.calls, vec![Call::Message("Click the villain.")]);

        // Signals for other suspensions are ignored.
        sequencer.notify(WaveSignal::RankingClosed);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.cursor(), 0);

        sequencer.notify(WaveSignal::DialogueAcknowledged);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.cursor(), 1);
        assert_eq!(stage.calls.last(), Some(&Call::Message("")));

        sequencer.notify(WaveSignal::DialogueAcknowledged);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Completed);
    }

    #[test]
    fn hero_motion_waits_for_its_own_signal() {
        static SCRIPT: &[WaveCommand] = &[WaveCommand::ActorEnter, WaveCommand::End];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);
        assert!(sequencer.is_waiting());

        sequencer.notify(WaveSignal::MotionFinished(Entity::from_raw(42)));
        sequencer.advance(&mut stage);
        assert!(sequencer.is_waiting());

        sequencer.notify(WaveSignal::MotionFinished(Entity::from_raw(1)));
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Completed);
        assert_eq!(stage.calls, vec![Call::Hero(HeroMove::Enter), Call::Finish]);
    }

    #[test]
    fn cancel_during_step_stops_before_next_command() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::Begin,
            WaveCommand::ShowMessage(100_000),
            WaveCommand::ShowMessage(100_010),
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        let token = sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.cursor(), 1);

        // Cancelling through a cloned token, then acknowledging anyway.
        token.cancel();
        sequencer.notify(WaveSignal::DialogueAcknowledged);
        sequencer.advance(&mut stage);
        sequencer.advance(&mut stage);

        assert_eq!(sequencer.status(), SequencerStatus::Cancelled);
        assert_eq!(stage.calls.len(), 2);
        assert!(!stage.calls.contains(&Call::Finish));
    }

    #[test]
    fn restart_gets_a_fresh_token() {
        static SCRIPT: &[WaveCommand] = &[WaveCommand::ShowMessage(100_000)];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        let first = sequencer.start(SCRIPT);
        sequencer.cancel();
        assert!(first.is_cancelled());
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Cancelled);

        let second = sequencer.start(SCRIPT);
        assert!(!second.is_cancelled());
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Running);
    }

    #[test]
    fn missing_hero_aborts_the_run() {
        static SCRIPT: &[WaveCommand] = &[WaveCommand::ActorEnter, WaveCommand::End];
        let mut stage = ScriptedStage::new();
        stage.hero = None;
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Cancelled);
        assert!(!stage.calls.contains(&Call::Finish));
    }

    #[test]
    fn zero_tempo_aborts_the_run() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::PlayTempo {
                track: BgmTrack::InGame85,
                bpm: 0,
            },
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Cancelled);
        assert!(stage.calls.is_empty());
    }

    #[test]
    fn unknown_group_is_skipped() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::EnemyGroupEnter {
                group: 1,
                spread: 10,
            },
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Completed);
        assert_eq!(stage.calls, vec![Call::Finish]);
    }

    #[test]
    fn group_arms_only_after_every_entrance() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::PlayTempo {
                track: BgmTrack::InGame128,
                bpm: 128,
            },
            WaveCommand::EnemyGroupEnter {
                group: 200_030,
                spread: 20,
            },
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);

        let enemies = spawned(&stage);
        assert_eq!(enemies.len(), 4);
        assert!(stage.beats.values().all(|beat| !beat.selectable));

        // Tempo multiset is 128 +/- {0, 20, 40, 60}.
        let mut offsets: Vec<u32> = stage.beats.values().map(|b| b.bpm.abs_diff(128)).collect();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![0, 20, 40, 60]);

        for enemy in &enemies[..3] {
            sequencer.notify(WaveSignal::MotionFinished(*enemy));
        }
        sequencer.advance(&mut stage);
        assert_eq!(stage.remaining_enemies(), 0);
        assert!(sequencer.is_waiting());

        sequencer.notify(WaveSignal::MotionFinished(enemies[3]));
        sequencer.advance(&mut stage);
        assert_eq!(stage.remaining_enemies(), 4);
        assert!(stage.beats.values().all(|beat| beat.selectable));
        assert_eq!(sequencer.status(), SequencerStatus::Completed);
    }

    #[test]
    fn single_enemy_wave_end_to_end() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::Begin,
            WaveCommand::PlayTempo {
                track: BgmTrack::InGame128,
                bpm: 120,
            },
            WaveCommand::EnemyGroupEnter {
                group: 102_000,
                spread: 0,
            },
            WaveCommand::WaitEnemiesAtMost(0),
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);

        let enemy = spawned(&stage)[0];
        sequencer.notify(WaveSignal::MotionFinished(enemy));
        sequencer.advance(&mut stage);

        let beat = &stage.beats[&enemy];
        assert!(beat.selectable);
        assert_eq!(beat.bpm, 120);
        assert_eq!(stage.remaining_enemies(), 1);
        assert_eq!(sequencer.cursor(), 3);
        assert_eq!(sequencer.status(), SequencerStatus::Running);

        assert_eq!(stage.click(enemy), Some(AttackOutcome::Hit));
        assert_eq!(stage.remaining_enemies(), 0);

        sequencer.advance(&mut stage);
        assert_eq!(sequencer.status(), SequencerStatus::Completed);
        assert_eq!(stage.calls.last(), Some(&Call::Finish));
    }

    #[test]
    fn rubber_banding_keeps_a_target_available() {
        static SCRIPT: &[WaveCommand] = &[
            WaveCommand::PlayTempo {
                track: BgmTrack::InGame128,
                bpm: 128,
            },
            WaveCommand::EnemyGroupEnter {
                group: 200_010,
                spread: 25,
            },
            WaveCommand::WaitEnemiesAtMost(0),
            WaveCommand::End,
        ];
        let mut stage = ScriptedStage::new();
        let mut sequencer = WaveSequencer::default();
        sequencer.start(SCRIPT);
        sequencer.advance(&mut stage);
        for enemy in spawned(&stage) {
            sequencer.notify(WaveSignal::MotionFinished(enemy));
        }
        sequencer.advance(&mut stage);

        // Always click a matching enemy; one must exist after every kill.
        for _ in 0..3 {
            let target = stage
                .resolver
                .remaining()
                .iter()
                .copied()
                .find(|enemy| stage.beats[enemy].bpm == 128)
                .expect("a matching enemy");
            let mismatched = stage
                .resolver
                .remaining()
                .iter()
                .copied()
                .find(|enemy| stage.beats[enemy].bpm != 128);
            if let Some(other) = mismatched {
                assert_eq!(stage.click(other), Some(AttackOutcome::Miss));
            }
            assert_eq!(stage.click(target), Some(AttackOutcome::Hit));
            sequencer.advance(&mut stage);
        }

        assert_eq!(sequencer.status(), SequencerStatus::Completed);
        assert!(stage.resolver.fail_count() <= 2);
    }
}
