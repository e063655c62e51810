//! Static scripted content: the command list of every play mode, the enemy groups those scripts
//! spawn, and the dialogue lines they show.
//!
//! Lookups never fail. An unknown message id reads as an empty line and an unknown group id as an
//! empty group, so a typo in a script degrades to a no-op instead of aborting the run.

use serde::{Deserialize, Serialize};

use crate::beat::BeatAnimation;
use crate::state::GameMode;

/// Background music catalogue. Each track is authored at a fixed tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BgmTrack {
    Title85,
    InGame85,
    InGame128,
    InGame150,
}

impl BgmTrack {
    pub fn asset_path(self) -> &'static str {
        match self {
            BgmTrack::Title85 => "audio/bgm_title_85.ogg",
            BgmTrack::InGame85 => "audio/bgm_ingame_85.ogg",
            BgmTrack::InGame128 => "audio/bgm_ingame_128.ogg",
            BgmTrack::InGame150 => "audio/bgm_ingame_150.ogg",
        }
    }
}

/// One step of a wave script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveCommand {
    /// Reset actors, counters, and the play timer.
    Begin,
    /// Switch music and the player's tempo.
    PlayTempo { track: BgmTrack, bpm: u32 },
    /// Run the hero onto the stage.
    ActorEnter,
    /// Run the hero off the stage.
    ActorExit,
    /// Spawn a group; member `i` gets `current_bpm +/- i * spread`.
    EnemyGroupEnter { group: u32, spread: u32 },
    /// Block until at most this many enemies are left.
    WaitEnemiesAtMost(usize),
    ShowMessage(u32),
    ShowRanking,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Unity,
    Father,
    NinjaBlack,
    NinjaWhite,
    SamuraiLow,
    Ronin,
    SamuraiHigh,
}

impl EnemyKind {
    /// Ninjas keep time by flickering; everybody else swells.
    pub fn animation(self) -> BeatAnimation {
        match self {
            EnemyKind::NinjaBlack | EnemyKind::NinjaWhite => BeatAnimation::Alpha,
            _ => BeatAnimation::Scale,
        }
    }

    /// Placeholder tint and footprint until sprite sheets are wired in.
    pub fn look(self) -> ([f32; 3], f32) {
        match self {
            EnemyKind::Unity => ([0.85, 0.85, 0.9], 120.0),
            EnemyKind::Father => ([0.75, 0.55, 0.3], 96.0),
            EnemyKind::NinjaBlack => ([0.15, 0.15, 0.2], 56.0),
            EnemyKind::NinjaWhite => ([0.95, 0.95, 0.95], 56.0),
            EnemyKind::SamuraiLow => ([0.6, 0.2, 0.2], 64.0),
            EnemyKind::Ronin => ([0.45, 0.4, 0.55], 64.0),
            EnemyKind::SamuraiHigh => ([0.8, 0.25, 0.1], 72.0),
        }
    }
}

/// How an enemy arrives: running in from off-screen or fading in on the spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Appear {
    Move,
    Fade,
}

/// Static spawn descriptor. `x`/`y` are grid cells, scaled to world units at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyGroupEntry {
    pub kind: EnemyKind,
    pub appear: Appear,
    pub x: i32,
    pub y: i32,
}

impl EnemyGroupEntry {
    const fn new(kind: EnemyKind, appear: Appear, x: i32, y: i32) -> Self {
        Self { kind, appear, x, y }
    }

    pub fn animation(&self) -> BeatAnimation {
        self.kind.animation()
    }
}

/// Who is talking; rendered as the text colour of the dialogue box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Narration,
    Hero,
    Foe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub tone: Tone,
    pub text: &'static str,
}

const EMPTY_LINE: Line = Line {
    tone: Tone::Narration,
    text: "",
};

/// Script for a play mode.
pub fn wave_script(mode: GameMode) -> &'static [WaveCommand] {
    match mode {
        GameMode::Tutorial => TUTORIAL,
        GameMode::Story => STORY,
        GameMode::Speedrun => SPEEDRUN,
    }
}

pub fn message(id: u32) -> Line {
    MESSAGES
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, line)| *line)
        .unwrap_or(EMPTY_LINE)
}

pub fn enemy_group(id: u32) -> &'static [EnemyGroupEntry] {
    GROUPS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, group)| *group)
        .unwrap_or(&[])
}

use Appear::{Fade, Move};
use EnemyKind::*;
use WaveCommand::*;

const TUTORIAL: &[WaveCommand] = &[
    Begin,
    PlayTempo { track: BgmTrack::Title85, bpm: 85 },
    ShowMessage(100_000),
    ShowMessage(100_010),
    ActorEnter,
    ShowMessage(101_000),
    ShowMessage(101_010),
    EnemyGroupEnter { group: 102_000, spread: 0 },
    ShowMessage(102_000),
    ShowMessage(102_010),
    WaitEnemiesAtMost(0),
    ShowMessage(102_020),
    EnemyGroupEnter { group: 103_000, spread: 30 },
    ShowMessage(103_000),
    ShowMessage(103_010),
    ShowMessage(103_020),
    ShowMessage(103_030),
    WaitEnemiesAtMost(1),
    ShowMessage(103_040),
    ShowMessage(103_050),
    ShowMessage(103_060),
    WaitEnemiesAtMost(0),
    ShowMessage(103_070),
    EnemyGroupEnter { group: 104_000, spread: 25 },
    ShowMessage(104_000),
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 105_000, spread: 25 },
    ShowMessage(105_000),
    ShowMessage(105_010),
    ShowMessage(105_020),
    WaitEnemiesAtMost(0),
    ShowMessage(106_000),
    ShowMessage(106_010),
    ShowMessage(106_020),
    ActorExit,
    End,
];

const STORY: &[WaveCommand] = &[
    Begin,
    PlayTempo { track: BgmTrack::InGame85, bpm: 85 },
    ActorEnter,
    // Wave 1: bandits on the road home.
    ShowMessage(200_000),
    ShowMessage(200_010),
    ShowMessage(200_020),
    EnemyGroupEnter { group: 200_000, spread: 30 },
    ShowMessage(200_030),
    ShowMessage(200_040),
    ShowMessage(200_050),
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 200_010, spread: 25 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 200_020, spread: 20 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 200_030, spread: 20 },
    WaitEnemiesAtMost(0),
    ShowMessage(201_000),
    ShowMessage(201_010),
    ShowMessage(201_020),
    PlayTempo { track: BgmTrack::InGame128, bpm: 128 },
    ShowMessage(201_030),
    // Wave 2: the castle guard, then the father.
    EnemyGroupEnter { group: 300_000, spread: 27 },
    ShowMessage(300_010),
    ShowMessage(300_020),
    ShowMessage(300_030),
    ShowMessage(300_040),
    ShowMessage(300_050),
    ShowMessage(300_060),
    ShowMessage(300_070),
    ShowMessage(300_080),
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 300_010, spread: 24 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 300_020, spread: 21 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 300_030, spread: 18 },
    WaitEnemiesAtMost(0),
    ShowMessage(301_000),
    EnemyGroupEnter { group: 300_040, spread: 15 },
    ShowMessage(301_010),
    ShowMessage(301_020),
    ShowMessage(301_030),
    ShowMessage(301_040),
    ShowMessage(301_050),
    ShowMessage(301_060),
    ShowMessage(301_070),
    ShowMessage(301_080),
    WaitEnemiesAtMost(0),
    ShowMessage(302_000),
    ShowMessage(302_010),
    PlayTempo { track: BgmTrack::InGame150, bpm: 150 },
    ShowMessage(302_020),
    // Wave 3: the usurper's retainers.
    ShowMessage(400_000),
    ShowMessage(400_010),
    EnemyGroupEnter { group: 400_000, spread: 18 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_010, spread: 16 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_020, spread: 0 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_030, spread: 14 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_040, spread: 12 },
    ShowMessage(401_000),
    ShowMessage(401_010),
    ShowMessage(401_020),
    ShowMessage(401_030),
    WaitEnemiesAtMost(0),
    PlayTempo { track: BgmTrack::InGame85, bpm: 85 },
    ShowMessage(402_000),
    ShowMessage(402_010),
    ShowMessage(402_020),
    ShowMessage(402_030),
    ShowRanking,
    ActorExit,
    End,
];

/// The story's fights back to back, no dialogue, timed and ranked.
const SPEEDRUN: &[WaveCommand] = &[
    Begin,
    PlayTempo { track: BgmTrack::InGame85, bpm: 85 },
    ActorEnter,
    EnemyGroupEnter { group: 200_000, spread: 30 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 200_010, spread: 25 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 200_020, spread: 20 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 200_030, spread: 20 },
    WaitEnemiesAtMost(0),
    PlayTempo { track: BgmTrack::InGame128, bpm: 128 },
    EnemyGroupEnter { group: 300_000, spread: 27 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 300_010, spread: 24 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 300_020, spread: 21 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 300_030, spread: 18 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 300_040, spread: 15 },
    WaitEnemiesAtMost(0),
    PlayTempo { track: BgmTrack::InGame150, bpm: 150 },
    EnemyGroupEnter { group: 400_000, spread: 18 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_010, spread: 16 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_020, spread: 0 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_030, spread: 14 },
    WaitEnemiesAtMost(0),
    EnemyGroupEnter { group: 400_040, spread: 12 },
    WaitEnemiesAtMost(0),
    PlayTempo { track: BgmTrack::InGame85, bpm: 85 },
    ShowRanking,
    ActorExit,
    End,
];

const fn narration(text: &'static str) -> Line {
    Line {
        tone: Tone::Narration,
        text,
    }
}

const fn hero(text: &'static str) -> Line {
    Line {
        tone: Tone::Hero,
        text,
    }
}

const fn foe(text: &'static str) -> Line {
    Line {
        tone: Tone::Foe,
        text,
    }
}

const MESSAGES: &[(u32, Line)] = &[
    // Tutorial
    (100_000, narration("Thank you for playing.")),
    (100_010, narration("Let me walk you through how this game is played.")),
    (101_000, narration("The young warrior who just ran in from the left is our hero,")),
    (101_010, narration("Tatsuo Noborigoi.")),
    (102_000, narration("A villain attacks from the right!")),
    (102_010, narration("Click the villain.")),
    (102_020, narration("Splendid.")),
    (103_000, narration("This time two villains attack.")),
    (103_010, narration("Noborigoi cuts down any foe who shares his tempo in one stroke,")),
    (103_020, narration("but he cannot defeat a foe whose tempo differs.")),
    (103_030, narration("Click the villain pulsing in the same tempo as Noborigoi.")),
    (103_040, narration("Whenever Noborigoi fells a villain,")),
    (103_050, narration("another villain falls into his tempo.")),
    (103_060, narration("Finish off the other one too.")),
    (103_070, narration("Splendid.")),
    (104_000, narration("More villains change nothing. Defeat them the same way.")),
    (105_000, narration("Ninjas keep time a little differently from other foes.")),
    (105_010, narration("Dirty ninja tricks, as expected.")),
    (105_020, narration("They fall the same way, though. Read their tempo.")),
    (106_000, narration("That concludes the tutorial.")),
    (106_010, narration("Story plays the story mode,")),
    (106_020, narration("and Speedrun plays the timed mode.")),
    // Wave 1
    (200_000, narration("Tatsuo Noborigoi hurried alone along the road home.")),
    (200_010, foe("??? \"Well, well, where are you off to, samurai?\"")),
    (200_020, foe("??? \"Leave your gear if you value your life.\"")),
    (200_030, hero("Tatsuo \"Bandits, is it.\"")),
    (200_040, hero("Tatsuo \"You are no match for me. Begone.\"")),
    (200_050, foe("Bandit \"What did you say?! Get him!\"")),
    (201_000, hero("Tatsuo \"Hmph. Hardly worth the effort.\"")),
    (201_010, hero("Tatsuo \"But why are bandits this close to home?\"")),
    (201_020, hero("Tatsuo \"Something must have happened.\"")),
    (201_030, narration("Worry for his homeland quickened his tempo.")),
    // Wave 2
    (300_010, foe("Samurai \"Halt. None may pass beyond this point.\"")),
    (300_020, hero("Tatsuo \"I am Tatsuo Noborigoi, a warrior of this land.\"")),
    (300_030, hero("Tatsuo \"Whatever has happened, let me through.\"")),
    (300_040, foe("Samurai \"Noborigoi?! The traitor who slew our lord?!\"")),
    (300_050, hero("Tatsuo \"What? What is the meaning of this!\"")),
    (300_060, foe("Samurai \"Our orders are to kill Noborigoi on sight!\"")),
    (300_070, foe("Samurai \"To arms! To arms!\"")),
    (300_080, hero("Tatsuo \"So there is no reasoning with you!\"")),
    (301_000, foe("??? \"My son, you have returned at last.\"")),
    (301_010, hero("Tatsuo \"Father, what is going on?\"")),
    (301_020, foe("Father \"Yunitei, one of the elders,\"")),
    (301_030, foe("Father \"murdered our lord.\"")),
    (301_040, foe("Father \"And laid the blame on you.\"")),
    (301_050, hero("Tatsuo \"And you simply stood by and watched?!\"")),
    (301_060, foe("Father \"Alas, I have neither the nerve nor the strength to resist.\"")),
    (301_070, foe("Father \"But you, my son, have that strength.\"")),
    (301_080, foe("Father \"Strike me down and walk on over my body.\"")),
    (302_000, foe("Father \"Look after this land... for me... urgh.\"")),
    (302_010, hero("Tatsuo \"Father...\"")),
    (302_020, narration("Fury quickened his tempo.")),
    // Wave 3
    (400_000, foe("??? \"Useless carp, cannot even kill a traitor's son.\"")),
    (400_010, hero("Tatsuo \"Yunitei! Where are you!\"")),
    (401_000, hero("Tatsuo \"Yunitei! I have found you!\"")),
    (401_010, foe("Yunitei \"Curses, my ambitions undone by a mere carp!\"")),
    (401_020, hero("Tatsuo \"You are wrong, Yunitei. Neither my father nor I are mere carp.\"")),
    (401_030, hero("Tatsuo \"We are carp that climb the falls and become dragons!\"")),
    (402_000, foe("Yunitei \"Ubwaaah!\"")),
    (402_010, hero("Tatsuo \"Father... Yunitei has been defeated.\"")),
    (402_020, narration("With those words, Tatsuo Noborigoi ran straight ahead,")),
    (402_030, narration("toward the future of his homeland.")),
];

const GROUPS: &[(u32, &[EnemyGroupEntry])] = &[
    // Tutorial
    (102_000, &[EnemyGroupEntry::new(Ronin, Move, 4, 0)]),
    (
        103_000,
        &[
            EnemyGroupEntry::new(Ronin, Move, 3, 0),
            EnemyGroupEntry::new(Ronin, Move, 5, 0),
        ],
    ),
    (
        104_000,
        &[
            EnemyGroupEntry::new(Ronin, Move, 3, -2),
            EnemyGroupEntry::new(Ronin, Move, 5, 0),
            EnemyGroupEntry::new(Ronin, Move, 3, 2),
        ],
    ),
    (
        105_000,
        &[
            EnemyGroupEntry::new(NinjaBlack, Move, 3, -2),
            EnemyGroupEntry::new(NinjaBlack, Move, 5, 0),
            EnemyGroupEntry::new(NinjaBlack, Move, 3, 2),
        ],
    ),
    // Wave 1
    (
        200_000,
        &[
            EnemyGroupEntry::new(Ronin, Move, 3, -1),
            EnemyGroupEntry::new(Ronin, Move, 5, 1),
        ],
    ),
    (
        200_010,
        &[
            EnemyGroupEntry::new(Ronin, Move, 3, -2),
            EnemyGroupEntry::new(Ronin, Move, 5, 0),
            EnemyGroupEntry::new(Ronin, Move, 3, 2),
        ],
    ),
    (
        200_020,
        &[
            EnemyGroupEntry::new(Ronin, Move, 5, -2),
            EnemyGroupEntry::new(Ronin, Move, 3, 0),
            EnemyGroupEntry::new(Ronin, Move, 5, 2),
        ],
    ),
    (
        200_030,
        &[
            EnemyGroupEntry::new(Ronin, Move, 2, 0),
            EnemyGroupEntry::new(Ronin, Move, 4, -2),
            EnemyGroupEntry::new(Ronin, Move, 6, 0),
            EnemyGroupEntry::new(Ronin, Move, 4, 2),
        ],
    ),
    // Wave 2
    (
        300_000,
        &[
            EnemyGroupEntry::new(SamuraiLow, Move, 3, -2),
            EnemyGroupEntry::new(SamuraiLow, Move, 5, 0),
            EnemyGroupEntry::new(SamuraiLow, Move, 3, 2),
        ],
    ),
    (
        300_010,
        &[
            EnemyGroupEntry::new(SamuraiLow, Move, 5, -2),
            EnemyGroupEntry::new(SamuraiHigh, Move, 3, 0),
            EnemyGroupEntry::new(SamuraiLow, Move, 5, 2),
        ],
    ),
    (
        300_020,
        &[
            EnemyGroupEntry::new(SamuraiLow, Move, 2, 0),
            EnemyGroupEntry::new(SamuraiHigh, Move, 4, -2),
            EnemyGroupEntry::new(SamuraiLow, Move, 6, 0),
            EnemyGroupEntry::new(SamuraiHigh, Move, 4, 2),
        ],
    ),
    (
        300_030,
        &[
            EnemyGroupEntry::new(SamuraiHigh, Move, 0, 0),
            EnemyGroupEntry::new(SamuraiLow, Move, 5, -2),
            EnemyGroupEntry::new(SamuraiHigh, Move, 2, 0),
            EnemyGroupEntry::new(SamuraiLow, Move, 3, 2),
            EnemyGroupEntry::new(NinjaBlack, Move, 6, 0),
        ],
    ),
    (
        300_040,
        &[
            EnemyGroupEntry::new(Father, Move, 4, 0),
            EnemyGroupEntry::new(SamuraiHigh, Move, 2, 1),
            EnemyGroupEntry::new(SamuraiHigh, Move, 6, -1),
            EnemyGroupEntry::new(NinjaBlack, Move, 3, -2),
            EnemyGroupEntry::new(NinjaBlack, Move, 5, 2),
        ],
    ),
    // Wave 3
    (
        400_000,
        &[
            EnemyGroupEntry::new(SamuraiLow, Move, 3, -2),
            EnemyGroupEntry::new(SamuraiHigh, Move, 5, 0),
            EnemyGroupEntry::new(NinjaBlack, Move, 0, 0),
            EnemyGroupEntry::new(NinjaWhite, Fade, 3, 2),
        ],
    ),
    (
        400_010,
        &[
            EnemyGroupEntry::new(SamuraiLow, Move, 5, -2),
            EnemyGroupEntry::new(SamuraiHigh, Move, 3, 0),
            EnemyGroupEntry::new(SamuraiLow, Move, 5, 2),
            EnemyGroupEntry::new(SamuraiLow, Move, 0, 2),
            EnemyGroupEntry::new(SamuraiLow, Move, 0, -2),
        ],
    ),
    (400_020, &[EnemyGroupEntry::new(NinjaWhite, Fade, -4, 0)]),
    (
        400_030,
        &[
            EnemyGroupEntry::new(SamuraiHigh, Move, 0, 0),
            EnemyGroupEntry::new(SamuraiLow, Move, 5, -2),
            EnemyGroupEntry::new(SamuraiHigh, Move, 2, 0),
            EnemyGroupEntry::new(SamuraiLow, Move, 3, 2),
            EnemyGroupEntry::new(NinjaBlack, Move, 6, 0),
            EnemyGroupEntry::new(NinjaWhite, Fade, 1, 2),
            EnemyGroupEntry::new(NinjaWhite, Fade, 1, -2),
        ],
    ),
    (
        400_040,
        &[
            EnemyGroupEntry::new(Unity, Move, 4, 0),
            EnemyGroupEntry::new(NinjaBlack, Move, 2, 1),
            EnemyGroupEntry::new(NinjaWhite, Fade, 6, -1),
            EnemyGroupEntry::new(SamuraiHigh, Move, 3, -2),
            EnemyGroupEntry::new(SamuraiHigh, Move, 5, 2),
            EnemyGroupEntry::new(SamuraiLow, Move, 0, 2),
            EnemyGroupEntry::new(SamuraiLow, Move, 0, -2),
            EnemyGroupEntry::new(NinjaWhite, Fade, -4, 0),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_degrade_to_empty() {
        assert_eq!(message(999_999).text, "");
        assert!(enemy_group(999_999).is_empty());
    }

    #[test]
    fn every_script_reference_resolves() {
        for mode in [GameMode::Tutorial, GameMode::Story, GameMode::Speedrun] {
            for command in wave_script(mode) {
                match *command {
                    ShowMessage(id) => assert!(!message(id).text.is_empty(), "message {id}"),
                    EnemyGroupEnter { group, .. } => {
                        assert!(!enemy_group(group).is_empty(), "group {group}")
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn scripts_are_bracketed_by_begin_and_end() {
        for mode in [GameMode::Tutorial, GameMode::Story, GameMode::Speedrun] {
            let script = wave_script(mode);
            assert_eq!(script.first(), Some(&Begin));
            assert_eq!(script.last(), Some(&End));
            assert!(matches!(script[1], PlayTempo { .. }));
        }
    }

    #[test]
    fn timed_modes_rank_before_ending() {
        for mode in [GameMode::Story, GameMode::Speedrun] {
            let script = wave_script(mode);
            let ranking = script.iter().position(|command| *command == ShowRanking);
            let end = script.iter().position(|command| *command == End);
            assert!(matches!((ranking, end), (Some(r), Some(e)) if r < e), "{mode:?}");
        }
        assert!(!wave_script(GameMode::Tutorial).contains(&ShowRanking));
    }

    #[test]
    fn no_group_can_push_a_tempo_below_one() {
        // Walk each script tracking the tempo and check the widest spread it could produce.
        for mode in [GameMode::Tutorial, GameMode::Story, GameMode::Speedrun] {
            let mut bpm = 0;
            for command in wave_script(mode) {
                match *command {
                    PlayTempo { bpm: next, .. } => bpm = next,
                    EnemyGroupEnter { group, spread } => {
                        let widest = (enemy_group(group).len() as u32 - 1) * spread;
                        assert!(widest < bpm, "group {group} at {bpm} BPM");
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn only_ninjas_flicker() {
        assert_eq!(NinjaBlack.animation(), BeatAnimation::Alpha);
        assert_eq!(NinjaWhite.animation(), BeatAnimation::Alpha);
        assert_eq!(Ronin.animation(), BeatAnimation::Scale);
        assert_eq!(Unity.animation(), BeatAnimation::Scale);
    }
}
