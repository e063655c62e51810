//! Menus and the in-game HUD. The title screen offers one button per play mode and a licenses
//! window; while playing, a corner HUD shows the player's tempo and misses next to a button back
//! to the title. Both screens carry the master volume control.
//!
//! Buttons only ask the session for a transition. A request made while a fade is running is
//! dropped by the session, so double clicks are harmless.

use bevy::prelude::*;

use crate::audio::{AudioRequest, AudioVolume, SoundEffect};
use crate::beat::AttackOutcome;
use crate::combat::CombatResolver;
use crate::session::SessionController;
use crate::state::{in_play, GameMode, GameState};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LicensesWindow>()
            .add_systems(OnEnter(GameState::Title), spawn_title_menu)
            .add_systems(
                OnExit(GameState::Title),
                (despawn_ui::<TitleMenu>, close_licenses_on_exit),
            )
            .add_systems(
                Update,
                (
                    (handle_menu_buttons, close_licenses, sync_licenses_panel).chain(),
                    highlight_buttons,
                    update_volume_label,
                    update_hud.run_if(in_play),
                ),
            );

        for state in [GameState::Tutorial, GameState::Story, GameState::Speedrun] {
            app.add_systems(OnEnter(state), spawn_hud)
                .add_systems(OnExit(state), despawn_ui::<PlayHud>);
        }
    }
}

#[derive(Component)]
struct TitleMenu;

#[derive(Component)]
struct PlayHud;

#[derive(Component)]
struct HudText;

#[derive(Component)]
struct VolumeLabel;

#[derive(Component)]
struct LicensesPanel;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum MenuButton {
    Play(GameMode),
    Title,
    Licenses,
    Volume(i32),
}

/// Whether the title screen's licenses window is up. Any click on the window closes it.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LicensesWindow {
    open: bool,
}

impl LicensesWindow {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

const LICENSES: &str = "Tempo Samurai\n\n\
Bevy Engine: MIT OR Apache-2.0\n\
serde, serde_json: MIT OR Apache-2.0\n\
rand, rand_chacha: MIT OR Apache-2.0\n\
thiserror: MIT OR Apache-2.0\n\
Fira Mono (default UI font): SIL Open Font License 1.1\n\n\
Click to close.";

const BUTTON_IDLE: Color = Color::srgb(0.16, 0.14, 0.2);
const BUTTON_HOVER: Color = Color::srgb(0.3, 0.24, 0.36);
const TEXT_COLOR: Color = Color::srgb(0.92, 0.9, 0.85);
const HIT_COLOR: Color = Color::srgb(0.55, 0.95, 0.6);
const MISS_COLOR: Color = Color::srgb(1.0, 0.45, 0.4);

fn button(parent: &mut ChildBuilder, action: MenuButton, label: &str, width: f32) {
    parent
        .spawn((
            action,
            ButtonBundle {
                style: Style {
                    width: Val::Px(width),
                    height: Val::Px(56.0),
                    margin: UiRect::all(Val::Px(8.0)),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    ..default()
                },
                background_color: BackgroundColor(BUTTON_IDLE),
                ..default()
            },
        ))
        .with_children(|button| {
            button.spawn(TextBundle::from_section(
                label,
                TextStyle {
                    font_size: 28.0,
                    color: TEXT_COLOR,
                    ..default()
                },
            ));
        });
}

/// `-  Volume 80%  +` row shared by the title screen and the HUD.
fn volume_row(parent: &mut ChildBuilder) {
    parent
        .spawn(NodeBundle {
            style: Style {
                align_items: AlignItems::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|row| {
            button(row, MenuButton::Volume(-1), "-", 56.0);
            row.spawn((
                VolumeLabel,
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 24.0,
                        color: TEXT_COLOR,
                        ..default()
                    },
                ),
            ));
            button(row, MenuButton::Volume(1), "+", 56.0);
        });
}

fn spawn_title_menu(mut commands: Commands) {
    commands
        .spawn((
            TitleMenu,
            Name::new("TitleMenu"),
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(
                TextBundle::from_section(
                    "Tempo Samurai",
                    TextStyle {
                        font_size: 72.0,
                        color: TEXT_COLOR,
                        ..default()
                    },
                )
                .with_style(Style {
                    margin: UiRect::bottom(Val::Px(48.0)),
                    ..default()
                }),
            );
            for mode in GameMode::ALL {
                button(parent, MenuButton::Play(mode), mode.label(), 280.0);
            }
            button(parent, MenuButton::Licenses, "Licenses", 280.0);
            volume_row(parent);

            parent
                .spawn((
                    LicensesPanel,
                    ButtonBundle {
                        style: Style {
                            position_type: PositionType::Absolute,
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            ..default()
                        },
                        background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.85)),
                        visibility: Visibility::Hidden,
                        z_index: ZIndex::Global(20),
                        ..default()
                    },
                ))
                .with_children(|panel| {
                    panel.spawn(TextBundle::from_section(
                        LICENSES,
                        TextStyle {
                            font_size: 24.0,
                            color: TEXT_COLOR,
                            ..default()
                        },
                    ));
                });
        });
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            PlayHud,
            Name::new("PlayHud"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    right: Val::Px(12.0),
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                HudText,
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 28.0,
                        color: TEXT_COLOR,
                        ..default()
                    },
                ),
            ));
            volume_row(parent);
            button(parent, MenuButton::Title, "Title", 140.0);
        });
}

fn despawn_ui<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn handle_menu_buttons(
    buttons: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut session: ResMut<SessionController>,
    mut licenses: ResMut<LicensesWindow>,
    mut volume: ResMut<AudioVolume>,
    mut audio: EventWriter<AudioRequest>,
) {
    for (interaction, action) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let clicked = match *action {
            MenuButton::Play(mode) => session.request(mode.state()),
            MenuButton::Title => session.request(GameState::Title),
            MenuButton::Licenses => {
                licenses.open();
                true
            }
            MenuButton::Volume(steps) => {
                volume.nudge_master(steps);
                true
            }
        };
        if clicked {
            audio.send(AudioRequest::PlayEffect(SoundEffect::Click));
        }
    }
}

fn close_licenses(
    panels: Query<&Interaction, (Changed<Interaction>, With<LicensesPanel>)>,
    mut licenses: ResMut<LicensesWindow>,
    mut audio: EventWriter<AudioRequest>,
) {
    if !licenses.is_open() {
        return;
    }
    if panels.iter().any(|interaction| *interaction == Interaction::Pressed) {
        licenses.close();
        audio.send(AudioRequest::PlayEffect(SoundEffect::Click));
    }
}

fn close_licenses_on_exit(mut licenses: ResMut<LicensesWindow>) {
    licenses.close();
}

fn sync_licenses_panel(
    licenses: Res<LicensesWindow>,
    mut panels: Query<&mut Visibility, With<LicensesPanel>>,
) {
    for mut visibility in &mut panels {
        *visibility = if licenses.is_open() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn update_volume_label(
    volume: Res<AudioVolume>,
    mut labels: Query<&mut Text, With<VolumeLabel>>,
) {
    for mut text in &mut labels {
        if let Some(section) = text.sections.first_mut() {
            let value = format!("  Volume {}%  ", volume.master_percent());
            if section.value != value {
                section.value = value;
            }
        }
    }
}

fn highlight_buttons(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<MenuButton>)>,
) {
    for (interaction, mut background) in &mut buttons {
        background.0 = match interaction {
            Interaction::Hovered | Interaction::Pressed => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        };
    }
}

/// Tempo and misses; the line flashes green or red while an attack's feedback is showing.
fn update_hud(resolver: Res<CombatResolver>, mut texts: Query<&mut Text, With<HudText>>) {
    if !resolver.is_changed() {
        return;
    }
    let color = match resolver.flash().map(|flash| flash.outcome) {
        Some(AttackOutcome::Hit) => HIT_COLOR,
        Some(AttackOutcome::Miss) => MISS_COLOR,
        None => TEXT_COLOR,
    };
    for mut text in &mut texts {
        if let Some(section) = text.sections.first_mut() {
            section.value = format!(
                "BPM {}   Misses {}",
                resolver.current_bpm(),
                resolver.fail_count()
            );
            section.style.color = color;
        }
    }
}
