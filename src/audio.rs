//! Music and sound effects. Gameplay code never touches audio entities directly; it sends
//! `AudioRequest` events and this module turns them into `AudioBundle` spawns.
//!
//! Handles are loaded once at startup and kept in `AudioHandles` so the decoded buffers stay
//! resident for the whole session. Music plays in numbered slots: starting a track in a slot
//! replaces whatever was playing there.
//!
//! Loudness is controlled by `AudioVolume`: a master gain on top of one gain per bus. New sounds
//! pick it up at spawn time and music already playing follows it whenever it changes.

use bevy::audio::{AudioSink, AudioSinkPlayback, Volume};
use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::script::BgmTrack;

/// Registers the request event, the handle cache, and the playback systems.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .init_resource::<AudioVolume>()
            .add_event::<AudioRequest>()
            .add_systems(Startup, load_audio_handles)
            .add_systems(
                Update,
                (
                    apply_audio_requests,
                    follow_volume.run_if(resource_changed::<AudioVolume>),
                    fade_bgm,
                )
                    .chain(),
            );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    AttackOk,
    AttackNg,
    Click,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 3] = [
        SoundEffect::AttackOk,
        SoundEffect::AttackNg,
        SoundEffect::Click,
    ];

    pub fn asset_path(self) -> &'static str {
        match self {
            SoundEffect::AttackOk => "audio/se_attack_ok.ogg",
            SoundEffect::AttackNg => "audio/se_attack_ng.ogg",
            SoundEffect::Click => "audio/se_click.ogg",
        }
    }
}

const TRACKS: [BgmTrack; 4] = [
    BgmTrack::Title85,
    BgmTrack::InGame85,
    BgmTrack::InGame128,
    BgmTrack::InGame150,
];

/// Fire-and-forget playback requests.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum AudioRequest {
    PlayTrack {
        slot: u8,
        track: BgmTrack,
        looped: bool,
    },
    FadeOutTrack {
        slot: u8,
        secs: f32,
    },
    PlayEffect(SoundEffect),
}

#[derive(Resource, Default)]
pub struct AudioHandles {
    pub tracks: HashMap<BgmTrack, Handle<AudioSource>>,
    pub effects: HashMap<SoundEffect, Handle<AudioSource>>,
}

/// Gains in `0.0..=1.0`. Music plays at `master * bgm`, effects at `master * effects`.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct AudioVolume {
    pub master: f32,
    pub bgm: f32,
    pub effects: f32,
}

impl Default for AudioVolume {
    fn default() -> Self {
        Self {
            master: 0.8,
            bgm: 1.0,
            effects: 1.0,
        }
    }
}

impl AudioVolume {
    /// Step used by the on-screen volume buttons.
    pub const STEP: f32 = 0.1;

    pub fn set_master(&mut self, volume: f32) {
        // Snapped to the button grid.
        self.master = ((volume.clamp(0.0, 1.0) / Self::STEP).round() * Self::STEP).clamp(0.0, 1.0);
    }

    pub fn nudge_master(&mut self, steps: i32) {
        self.set_master(self.master + steps as f32 * Self::STEP);
    }

    pub fn bgm_gain(&self) -> f32 {
        self.master * self.bgm
    }

    pub fn effect_gain(&self) -> f32 {
        self.master * self.effects
    }

    /// Master volume as a whole percentage, for display.
    pub fn master_percent(&self) -> u32 {
        (self.master * 100.0).round() as u32
    }
}

/// Music entity playing in a slot.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BgmSlot(pub u8);

/// Attached to a music entity that is fading out; the entity is despawned when the timer ends.
#[derive(Component, Debug)]
pub struct BgmFade {
    timer: Timer,
    start_volume: Option<f32>,
}

impl BgmFade {
    pub fn new(secs: f32) -> Self {
        Self {
            timer: Timer::from_seconds(secs.max(0.0), TimerMode::Once),
            start_volume: None,
        }
    }
}

/// Volume multiplier `fraction` of the way through a fade.
pub fn fade_gain(fraction: f32) -> f32 {
    (1.0 - fraction).clamp(0.0, 1.0)
}

fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    for track in TRACKS {
        handles
            .tracks
            .insert(track, asset_server.load(track.asset_path()));
    }
    for effect in SoundEffect::ALL {
        handles
            .effects
            .insert(effect, asset_server.load(effect.asset_path()));
    }

    info!(
        "Queued {} music tracks and {} effects from assets/audio/",
        handles.tracks.len(),
        handles.effects.len()
    );
}

fn apply_audio_requests(
    mut commands: Commands,
    mut requests: EventReader<AudioRequest>,
    handles: Res<AudioHandles>,
    volume: Res<AudioVolume>,
    slots: Query<(Entity, &BgmSlot), Without<BgmFade>>,
) {
    for request in requests.read() {
        match *request {
            AudioRequest::PlayTrack {
                slot,
                track,
                looped,
            } => {
                for (entity, playing) in &slots {
                    if playing.0 == slot {
                        commands.entity(entity).despawn_recursive();
                    }
                }
                let Some(source) = handles.tracks.get(&track) else {
                    warn!("No handle for {track:?}");
                    continue;
                };
                let settings = if looped {
                    PlaybackSettings::LOOP
                } else {
                    PlaybackSettings::DESPAWN
                }
                .with_volume(Volume::new(volume.bgm_gain()));
                commands.spawn((
                    Name::new(format!("Bgm{slot}")),
                    BgmSlot(slot),
                    AudioBundle {
                        source: source.clone(),
                        settings,
                    },
                ));
                debug!("Playing {track:?} in slot {slot}");
            }
            AudioRequest::FadeOutTrack { slot, secs } => {
                for (entity, playing) in &slots {
                    if playing.0 == slot {
                        commands.entity(entity).insert(BgmFade::new(secs));
                    }
                }
            }
            AudioRequest::PlayEffect(effect) => {
                let Some(source) = handles.effects.get(&effect) else {
                    warn!("No handle for {effect:?}");
                    continue;
                };
                commands.spawn(AudioBundle {
                    source: source.clone(),
                    settings: PlaybackSettings::DESPAWN
                        .with_volume(Volume::new(volume.effect_gain())),
                });
            }
        }
    }
}

/// Music that is already playing. Fading tracks keep the gain they started fading from.
fn follow_volume(
    volume: Res<AudioVolume>,
    sinks: Query<&AudioSink, (With<BgmSlot>, Without<BgmFade>)>,
) {
    for sink in &sinks {
        sink.set_volume(volume.bgm_gain());
    }
}

fn fade_bgm(
    time: Res<Time<Real>>,
    mut commands: Commands,
    mut fading: Query<(Entity, &mut BgmFade, Option<&AudioSink>)>,
) {
    for (entity, mut fade, sink) in &mut fading {
        fade.timer.tick(time.delta());

        if let Some(sink) = sink {
            let start = *fade.start_volume.get_or_insert_with(|| sink.volume());
            sink.set_volume(start * fade_gain(fade.timer.fraction()));
        }

        if fade.timer.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<AudioRequest>()
            .init_resource::<AudioVolume>()
            .insert_resource(AudioHandles {
                tracks: TRACKS.into_iter().map(|t| (t, Handle::default())).collect(),
                effects: HashMap::default(),
            })
            .add_systems(Update, apply_audio_requests);
        app
    }

    fn slots(app: &mut App) -> Vec<(BgmSlot, bool)> {
        let mut query = app.world_mut().query::<(&BgmSlot, Option<&BgmFade>)>();
        query
            .iter(app.world())
            .map(|(slot, fade)| (*slot, fade.is_some()))
            .collect()
    }

    #[test]
    fn new_track_replaces_the_slot() {
        let mut app = app();
        for track in [BgmTrack::Title85, BgmTrack::InGame128] {
            app.world_mut().send_event(AudioRequest::PlayTrack {
                slot: 0,
                track,
                looped: true,
            });
            app.update();
        }
        assert_eq!(slots(&mut app), vec![(BgmSlot(0), false)]);
    }

    #[test]
    fn fade_marks_only_the_requested_slot() {
        let mut app = app();
        for slot in [0, 1] {
            app.world_mut().send_event(AudioRequest::PlayTrack {
                slot,
                track: BgmTrack::InGame85,
                looped: false,
            });
        }
        app.update();
        app.world_mut()
            .send_event(AudioRequest::FadeOutTrack { slot: 1, secs: 0.5 });
        app.update();

        let mut playing = slots(&mut app);
        playing.sort_by_key(|(slot, _)| slot.0);
        assert_eq!(playing, vec![(BgmSlot(0), false), (BgmSlot(1), true)]);
    }

    #[test]
    fn missing_effect_handle_is_skipped() {
        let mut app = app();
        app.world_mut()
            .send_event(AudioRequest::PlayEffect(SoundEffect::Click));
        app.update();
        let mut query = app.world_mut().query::<&Handle<AudioSource>>();
        assert_eq!(query.iter(app.world()).count(), 0);
    }

    #[test]
    fn music_spawns_at_the_bus_gain() {
        let mut app = app();
        app.insert_resource(AudioVolume {
            master: 0.5,
            bgm: 0.6,
            effects: 1.0,
        });
        app.world_mut().send_event(AudioRequest::PlayTrack {
            slot: 0,
            track: BgmTrack::Title85,
            looped: true,
        });
        app.update();

        let mut query = app.world_mut().query_filtered::<&PlaybackSettings, With<BgmSlot>>();
        let settings = query.single(app.world());
        assert!((settings.volume.get() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn master_volume_clamps_and_snaps_to_steps() {
        let mut volume = AudioVolume::default();
        assert_eq!(volume.master_percent(), 80);
        volume.nudge_master(3);
        assert_eq!(volume.master, 1.0);
        volume.nudge_master(-4);
        assert_eq!(volume.master_percent(), 60);
        volume.nudge_master(-20);
        assert_eq!(volume.master, 0.0);
        assert_eq!(volume.bgm_gain(), 0.0);
        volume.set_master(0.333);
        assert_eq!(volume.master_percent(), 30);
        assert!((volume.effect_gain() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn fade_gain_runs_from_full_to_silent() {
        assert_eq!(fade_gain(0.0), 1.0);
        assert!((fade_gain(0.25) - 0.75).abs() < 1e-6);
        assert_eq!(fade_gain(1.0), 0.0);
        assert_eq!(fade_gain(1.5), 0.0);
    }
}
