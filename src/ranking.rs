//! Run results. Computes the scored time, reveals it line by line, submits it to the ranking
//! board, and waits for the player to close the panel.
//!
//! Submission is an event. The board bundled here only serialises the record and logs it, and
//! nothing ever waits on it.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioRequest, SoundEffect};
use crate::settings::RhythmSettings;
use crate::state::{GameMode, GameSet};

pub struct RankingPlugin;

impl Plugin for RankingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ResultReveal>()
            .add_event::<RankingSubmitted>()
            .add_event::<RankingClosed>()
            .add_systems(Startup, spawn_result_panel)
            .add_systems(
                Update,
                (
                    close_result.in_set(GameSet::Input),
                    advance_result.in_set(GameSet::Visual),
                    sync_result_panel.after(GameSet::Visual),
                ),
            )
            .add_systems(Update, log_ranking_submissions);
    }
}

const HASHTAGS: [&str; 2] = ["TempoSamurai", "unity1week"];

/// Elapsed play time plus `penalty_ms` for every miss.
pub fn total_score_ms(elapsed_ms: u64, fail_count: u32, penalty_ms: u64) -> u64 {
    elapsed_ms.saturating_add(u64::from(fail_count).saturating_mul(penalty_ms))
}

/// `mm:ss.mmm`. Minutes keep counting past 59.
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1_000) % 60;
    let millis = ms % 1_000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub mode: GameMode,
    pub elapsed_ms: u64,
    pub fail_count: u32,
    pub penalty_ms: u64,
    pub total_ms: u64,
    pub total: String,
}

impl ScoreRecord {
    pub fn new(mode: GameMode, elapsed_ms: u64, fail_count: u32, penalty_per_fail_ms: u64) -> Self {
        let total_ms = total_score_ms(elapsed_ms, fail_count, penalty_per_fail_ms);
        Self {
            mode,
            elapsed_ms,
            fail_count,
            penalty_ms: total_ms - elapsed_ms,
            total_ms,
            total: format_time(total_ms),
        }
    }

    /// Lines of the result panel, revealed in order.
    pub fn lines(&self) -> [String; 3] {
        [
            format!("Time     {}", format_time(self.elapsed_ms)),
            format!(
                "Misses   {} (+{})",
                self.fail_count,
                format_time(self.penalty_ms)
            ),
            format!("Total    {}", self.total),
        ]
    }

    /// Message suitable for posting the result, hashtags appended.
    pub fn share_text(&self) -> String {
        let mut text = format!(
            "Tempo Samurai {}: cleared in {} with {} misses!",
            self.mode.label(),
            self.total,
            self.fail_count
        );
        for tag in HASHTAGS {
            text.push_str(" #");
            text.push_str(tag);
        }
        text
    }
}

/// A result is ready for the ranking board.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct RankingSubmitted(pub ScoreRecord);

/// The player closed the result panel.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingClosed;

#[derive(Debug, Clone, PartialEq)]
pub enum RevealPhase {
    Hidden,
    Lines { index: usize, revealed: f32 },
    Delay(Timer),
    AwaitClick,
    Closed,
}

#[derive(Resource, Debug)]
pub struct ResultReveal {
    record: Option<ScoreRecord>,
    lines: Vec<String>,
    phase: RevealPhase,
    delay: Duration,
}

impl Default for ResultReveal {
    fn default() -> Self {
        Self {
            record: None,
            lines: Vec::new(),
            phase: RevealPhase::Hidden,
            delay: Duration::ZERO,
        }
    }
}

impl ResultReveal {
    /// Starts revealing `record`; `delay` separates the last line from the submission.
    pub fn start(&mut self, record: ScoreRecord, delay: Duration) {
        self.lines = record.lines().to_vec();
        self.record = Some(record);
        self.delay = delay;
        self.phase = RevealPhase::Lines {
            index: 0,
            revealed: 0.0,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> &RevealPhase {
        &self.phase
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.phase, RevealPhase::Hidden | RevealPhase::Closed)
    }

    pub fn record(&self) -> Option<&ScoreRecord> {
        self.record.as_ref()
    }

    /// Advances the reveal. Returns the record exactly once, when it is due for submission.
    pub fn tick(&mut self, delta: Duration, chars_per_sec: f32) -> Option<ScoreRecord> {
        match &mut self.phase {
            RevealPhase::Lines { index, revealed } => {
                *revealed += delta.as_secs_f32() * chars_per_sec;
                let length = self.lines.get(*index).map_or(0, |line| line.chars().count());
                if *revealed >= length as f32 {
                    if *index + 1 < self.lines.len() {
                        *index += 1;
                        *revealed = 0.0;
                    } else {
                        self.phase = RevealPhase::Delay(Timer::new(self.delay, TimerMode::Once));
                    }
                }
                None
            }
            RevealPhase::Delay(timer) => {
                if !timer.tick(delta).finished() {
                    return None;
                }
                self.phase = RevealPhase::AwaitClick;
                self.record.clone()
            }
            RevealPhase::Hidden | RevealPhase::AwaitClick | RevealPhase::Closed => None,
        }
    }

    /// Closes the panel if it is waiting for the player.
    pub fn click(&mut self) -> bool {
        if self.phase != RevealPhase::AwaitClick {
            return false;
        }
        self.phase = RevealPhase::Closed;
        true
    }

    /// Lines on screen right now, the current one possibly partial.
    pub fn visible_lines(&self) -> Vec<&str> {
        match &self.phase {
            RevealPhase::Hidden | RevealPhase::Closed => Vec::new(),
            RevealPhase::Lines { index, revealed } => {
                let mut shown: Vec<&str> = self.lines[..*index].iter().map(String::as_str).collect();
                if let Some(line) = self.lines.get(*index) {
                    let chars = revealed.floor() as usize;
                    let end = line.char_indices().nth(chars).map_or(line.len(), |(i, _)| i);
                    shown.push(&line[..end]);
                }
                shown
            }
            RevealPhase::Delay(_) | RevealPhase::AwaitClick => {
                self.lines.iter().map(String::as_str).collect()
            }
        }
    }
}

#[derive(Component)]
struct ResultPanel;

#[derive(Component)]
struct ResultText;

fn spawn_result_panel(mut commands: Commands) {
    commands
        .spawn((
            ResultPanel,
            Name::new("ResultPanel"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                visibility: Visibility::Hidden,
                z_index: ZIndex::Global(20),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                ResultText,
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 36.0,
                        color: Color::srgb(0.95, 0.9, 0.75),
                        ..default()
                    },
                ),
            ));
        });
}

fn advance_result(
    time: Res<Time>,
    settings: Res<RhythmSettings>,
    mut reveal: ResMut<ResultReveal>,
    mut submitted: EventWriter<RankingSubmitted>,
) {
    if let Some(record) = reveal.tick(time.delta(), settings.reveal_chars_per_sec) {
        info!("Submitting {} result {}", record.mode.label(), record.total);
        submitted.send(RankingSubmitted(record));
    }
}

fn close_result(
    mouse: Res<ButtonInput<MouseButton>>,
    mut reveal: ResMut<ResultReveal>,
    mut closed: EventWriter<RankingClosed>,
    mut audio: EventWriter<AudioRequest>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    if reveal.click() {
        audio.send(AudioRequest::PlayEffect(SoundEffect::Click));
        closed.send(RankingClosed);
    }
}

/// Default ranking board: records go to the log as JSON.
fn log_ranking_submissions(mut submitted: EventReader<RankingSubmitted>) {
    for RankingSubmitted(record) in submitted.read() {
        match serde_json::to_string(record) {
            Ok(payload) => info!("Ranking entry {payload}"),
            Err(err) => warn!("Could not serialise ranking entry: {err}"),
        }
        debug!("Share text: {}", record.share_text());
    }
}

fn sync_result_panel(
    reveal: Res<ResultReveal>,
    mut panels: Query<&mut Visibility, With<ResultPanel>>,
    mut texts: Query<&mut Text, With<ResultText>>,
) {
    if !reveal.is_changed() {
        return;
    }

    for mut visibility in &mut panels {
        *visibility = if reveal.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    let mut body = reveal.visible_lines().join("\n");
    if *reveal.phase() == RevealPhase::AwaitClick {
        body.push_str("\n\nClick to finish");
    }
    for mut text in &mut texts {
        if let Some(section) = text.sections.first_mut() {
            section.value.clone_from(&body);
        }
    }
}
