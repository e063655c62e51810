//! Typewriter dialogue box. A line is revealed a few characters per frame; once it is fully on
//! screen a left click dismisses it and reports `DialogueAcknowledged`.

use std::time::Duration;

use bevy::prelude::*;

use crate::audio::{AudioRequest, SoundEffect};
use crate::script::{Line, Tone};
use crate::settings::RhythmSettings;
use crate::state::GameSet;

pub struct DialoguePlugin;

impl Plugin for DialoguePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogueBox>()
            .add_event::<DialogueAcknowledged>()
            .add_systems(Startup, spawn_dialogue_panel)
            .add_systems(
                Update,
                (
                    acknowledge_dialogue.in_set(GameSet::Input),
                    reveal_dialogue.in_set(GameSet::Visual),
                    // Outside the play sets so the panel also hides after leaving a mode.
                    sync_dialogue_panel.after(GameSet::Visual),
                ),
            );
    }
}

/// The player dismissed the current line.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueAcknowledged;

#[derive(Resource, Debug, Default)]
pub struct DialogueBox {
    line: Option<Line>,
    revealed: f32,
}

impl DialogueBox {
    pub fn open(&mut self, line: Line) {
        self.line = Some(line);
        self.revealed = 0.0;
    }

    pub fn close(&mut self) {
        self.line = None;
        self.revealed = 0.0;
    }

    pub fn is_open(&self) -> bool {
        self.line.is_some()
    }

    pub fn tone(&self) -> Option<Tone> {
        self.line.map(|line| line.tone)
    }

    pub fn tick(&mut self, delta: Duration, chars_per_sec: f32) {
        if self.line.is_some() {
            self.revealed += delta.as_secs_f32() * chars_per_sec;
        }
    }

    fn revealed_chars(&self) -> usize {
        self.revealed.floor() as usize
    }

    pub fn visible_text(&self) -> &str {
        let Some(line) = &self.line else {
            return "";
        };
        match line.text.char_indices().nth(self.revealed_chars()) {
            Some((end, _)) => &line.text[..end],
            None => line.text,
        }
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.line
            .map_or(false, |line| self.revealed_chars() >= line.text.chars().count())
    }
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Narration => Color::srgb(0.92, 0.92, 0.92),
        Tone::Hero => Color::srgb(0.55, 0.8, 1.0),
        Tone::Foe => Color::srgb(1.0, 0.45, 0.4),
    }
}

#[derive(Component)]
struct DialoguePanel;

#[derive(Component)]
struct DialogueText;

fn spawn_dialogue_panel(mut commands: Commands) {
    commands
        .spawn((
            DialoguePanel,
            Name::new("DialoguePanel"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(10.0),
                    right: Val::Percent(10.0),
                    bottom: Val::Px(32.0),
                    min_height: Val::Px(96.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    ..default()
                },
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.75)),
                visibility: Visibility::Hidden,
                z_index: ZIndex::Global(10),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                DialogueText,
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 28.0,
                        color: tone_color(Tone::Narration),
                        ..default()
                    },
                ),
            ));
        });
}

fn reveal_dialogue(
    time: Res<Time>,
    settings: Res<RhythmSettings>,
    mut dialogue: ResMut<DialogueBox>,
) {
    dialogue.tick(time.delta(), settings.reveal_chars_per_sec);
}

fn acknowledge_dialogue(
    mouse: Res<ButtonInput<MouseButton>>,
    mut dialogue: ResMut<DialogueBox>,
    mut acknowledged: EventWriter<DialogueAcknowledged>,
    mut audio: EventWriter<AudioRequest>,
) {
    // Clicks during the reveal are swallowed.
    if !dialogue.is_fully_revealed() || !mouse.just_pressed(MouseButton::Left) {
        return;
    }

    dialogue.close();
    audio.send(AudioRequest::PlayEffect(SoundEffect::Click));
    acknowledged.send(DialogueAcknowledged);
}

fn sync_dialogue_panel(
    dialogue: Res<DialogueBox>,
    mut panels: Query<&mut Visibility, With<DialoguePanel>>,
    mut texts: Query<&mut Text, With<DialogueText>>,
) {
    if !dialogue.is_changed() {
        return;
    }

    for mut visibility in &mut panels {
        *visibility = if dialogue.is_open() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for mut text in &mut texts {
        if let Some(section) = text.sections.first_mut() {
            section.value = dialogue.visible_text().to_owned();
            if let Some(tone) = dialogue.tone() {
                section.style.color = tone_color(tone);
            }
        }
    }
}
