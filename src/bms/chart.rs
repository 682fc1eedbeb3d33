use serde::{Deserialize, Serialize};

/// Number of lanes produced by the natural channel mapping (7 keys + scratch).
pub const LANE_COUNT: usize = 8;

/// Compiled chart: an absolute-time schedule ready for judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub metadata: Metadata,
    pub notes: Vec<Note>,
    pub bgm_events: Vec<BgmEvent>,
    pub bpms: Vec<BpmPoint>,
    pub stops: Vec<StopEvent>,
    /// Seconds from chart start to the end of the last measure.
    pub duration: f64,
    pub lane_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub artist: String,
    pub genre: String,
    /// Base tempo from `#BPM` (120 when absent).
    pub initial_bpm: f64,
    /// Long note convention (`#LNTYPE`).
    pub ln_mode: LnMode,
    /// Judge rank (`#RANK`), when declared.
    pub rank: Option<u32>,
}

/// How hold channels delimit their notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LnMode {
    /// `#LNTYPE 1`: consecutive hold events in a lane alternate open/close.
    #[default]
    Toggle,
    /// `#LNTYPE 2`: a non-null value opens a hold, the null symbol closes it.
    ExplicitOff,
}

impl LnMode {
    pub fn from_header(value: &str) -> Self {
        match value.trim() {
            "2" => Self::ExplicitOff,
            _ => Self::Toggle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    Tap,
    Hold,
}

/// A playable unit. Immutable once compiled; judgment state lives elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Absolute time in seconds.
    pub time: f64,
    pub lane: usize,
    pub kind: NoteKind,
    /// Hold length in seconds, 0 for taps.
    pub duration: f64,
}

impl Note {
    pub fn tap(time: f64, lane: usize) -> Self {
        Self {
            time,
            lane,
            kind: NoteKind::Tap,
            duration: 0.0,
        }
    }

    pub fn hold(time: f64, lane: usize, duration: f64) -> Self {
        Self {
            time,
            lane,
            kind: NoteKind::Hold,
            duration,
        }
    }

    /// Scheduled end in seconds (equal to `time` for taps).
    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }

    pub fn is_hold(&self) -> bool {
        self.kind == NoteKind::Hold
    }
}

/// Background sample cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgmEvent {
    pub time: f64,
    /// Two-character sample id.
    pub sample_id: String,
    /// File registered under `#WAVxx`, if any.
    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmPoint {
    pub time: f64,
    pub bpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopEvent {
    /// Time at which the stop begins.
    pub time: f64,
    /// Pause length in seconds.
    pub duration: f64,
}

/// Playable key layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMode {
    /// 5 keys + scratch.
    Beat5K,
    /// 7 keys + scratch.
    Beat7K,
}

impl KeyMode {
    pub fn lane_count(self) -> usize {
        match self {
            Self::Beat5K => 6,
            Self::Beat7K => 8,
        }
    }

    pub fn from_lane_count(count: usize) -> Option<Self> {
        match count {
            6 => Some(Self::Beat5K),
            8 => Some(Self::Beat7K),
            _ => None,
        }
    }
}

impl Chart {
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Key mode implied by the lanes the notes actually use.
    /// Keys 6/7 (lanes 5 and 6) only exist in 7-key charts.
    pub fn key_mode(&self) -> KeyMode {
        if self.notes.iter().any(|n| n.lane == 5 || n.lane == 6) {
            KeyMode::Beat7K
        } else {
            KeyMode::Beat5K
        }
    }
}

/// Note indices per lane. Notes outside `lane_count` are left out.
pub fn build_lane_index(notes: &[Note], lane_count: usize) -> Vec<Vec<usize>> {
    let mut index: Vec<Vec<usize>> = vec![Vec::new(); lane_count];
    for (i, note) in notes.iter().enumerate() {
        if let Some(lane) = index.get_mut(note.lane) {
            lane.push(i);
        }
    }
    index
}
