use crate::error::ScoreError;
use anyhow::Context;
use serde::Deserialize;

// ────────────────────────────────────────────────────────────────────────────
// Score
// ────────────────────────────────────────────────────────────────────────────

/// A single-part score ready for the document builder.
///
/// Measure numbers are not stored: the builder assigns them from position.
/// Built with [`Score::new`] or from a validated [`ScoreRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub title: String,
    /// Original performer; empty when unknown.
    pub artist: String,
    /// Text for the bottom-of-page credit.
    pub rights: Option<String>,
    pub measures: Vec<Measure>,
}

impl Score {
    pub fn new(title: impl Into<String>, measures: Vec<Measure>) -> Self {
        Self {
            title: title.into(),
            artist: String::new(),
            rights: None,
            measures,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_rights(mut self, rights: impl Into<String>) -> Self {
        self.rights = Some(rights.into());
        self
    }

    /// Number of notes and rests across all measures.
    pub fn note_count(&self) -> usize {
        self.measures.iter().map(|m| m.notes.len()).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measure
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_BPM: u32 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    /// Tempo in quarter notes per minute. Only the first measure's value is written.
    pub bpm: u32,
    /// Force a line break before this measure.
    pub new_system: bool,
    pub notes: Vec<Note>,
}

impl Measure {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            bpm: DEFAULT_BPM,
            new_system: false,
            notes,
        }
    }

    pub fn with_bpm(mut self, bpm: u32) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_new_system(mut self, new_system: bool) -> Self {
        self.new_system = new_system;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Note
// ────────────────────────────────────────────────────────────────────────────

/// What sounds: a pitch or silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteKind {
    Pitched {
        /// Letter name `A`..`G`, passed through verbatim.
        step: String,
        /// Semitone offset; `0` means natural and is not written.
        alter: i32,
        octave: i32,
    },
    Rest,
}

/// Tie state of a note, normalized from the boolean flags and the legacy
/// `slur` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieState {
    #[default]
    None,
    Start,
    Stop,
    /// The note ends one tie and begins the next.
    Both,
}

impl TieState {
    pub fn from_flags(start: bool, stop: bool) -> Self {
        match (start, stop) {
            (false, false) => TieState::None,
            (true, false) => TieState::Start,
            (false, true) => TieState::Stop,
            (true, true) => TieState::Both,
        }
    }

    pub fn starts(self) -> bool {
        matches!(self, TieState::Start | TieState::Both)
    }

    pub fn stops(self) -> bool {
        matches!(self, TieState::Stop | TieState::Both)
    }

    pub fn is_tied(self) -> bool {
        self != TieState::None
    }

    /// MusicXML `type` values in document order (start before stop).
    pub fn types(self) -> impl Iterator<Item = &'static str> {
        let start = self.starts().then_some("start");
        let stop = self.stops().then_some("stop");
        start.into_iter().chain(stop)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub kind: NoteKind,
    /// Length in divisions.
    pub duration: u32,
    /// Notated duration name, e.g. `quarter`, `eighth`.
    pub xml_type: String,
    /// Stem direction, `up` or `down`.
    pub stem: String,
    pub tie: TieState,
    pub lyric: Option<String>,
}

impl Note {
    pub fn pitched(step: impl Into<String>, octave: i32, duration: u32) -> Self {
        Self {
            kind: NoteKind::Pitched {
                step: step.into(),
                alter: 0,
                octave,
            },
            duration,
            xml_type: DEFAULT_XML_TYPE.to_string(),
            stem: DEFAULT_STEM.to_string(),
            tie: TieState::None,
            lyric: None,
        }
    }

    pub fn rest(duration: u32) -> Self {
        Self {
            kind: NoteKind::Rest,
            duration,
            xml_type: DEFAULT_XML_TYPE.to_string(),
            stem: DEFAULT_STEM.to_string(),
            tie: TieState::None,
            lyric: None,
        }
    }

    pub fn with_alter(mut self, value: i32) -> Self {
        if let NoteKind::Pitched { ref mut alter, .. } = self.kind {
            *alter = value;
        }
        self
    }

    pub fn with_type(mut self, xml_type: impl Into<String>) -> Self {
        self.xml_type = xml_type.into();
        self
    }

    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = stem.into();
        self
    }

    pub fn with_tie(mut self, tie: TieState) -> Self {
        self.tie = tie;
        self
    }

    pub fn with_lyric(mut self, lyric: impl Into<String>) -> Self {
        self.lyric = Some(lyric.into());
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request – JSON shape accepted from clients
// ────────────────────────────────────────────────────────────────────────────

const DEFAULT_XML_TYPE: &str = "quarter";
const DEFAULT_STEM: &str = "up";
const DEFAULT_OCTAVE: i32 = 4;

/// Incoming score description, as posted by the web front end.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub rights: Option<String>,
    pub measures: Vec<MeasureRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasureRequest {
    /// Ignored; numbers follow measure order.
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default)]
    pub new_system: bool,
    /// Ignored; divisions are fixed by the profile.
    #[serde(default)]
    pub divisions: Option<u32>,
    /// Accepted for compatibility, not rendered.
    #[serde(default)]
    pub harmony: Vec<serde_json::Value>,
    pub notes: Vec<NoteRequest>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    #[default]
    Note,
    Rest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteRequest {
    #[serde(rename = "type", default)]
    pub note_type: NoteType,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub alter: Option<i32>,
    #[serde(default)]
    pub octave: Option<i32>,
    pub duration: u32,
    #[serde(default)]
    pub xml_type: Option<String>,
    #[serde(default)]
    pub stem: Option<String>,
    /// Accepted for compatibility, not rendered.
    #[serde(default)]
    pub beam: Option<String>,
    /// Legacy tie marker: `"start"` or `"stop"`.
    #[serde(default)]
    pub slur: Option<String>,
    #[serde(default)]
    pub tie_start: bool,
    #[serde(default)]
    pub tie_stop: bool,
    #[serde(default)]
    pub lyric: Option<String>,
}

impl ScoreRequest {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Invalid score request JSON")
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> anyhow::Result<Self> {
        serde_json::from_reader(reader).context("Invalid score request JSON")
    }
}

impl NoteRequest {
    fn tie_state(&self) -> TieState {
        let slur = self.slur.as_deref();
        TieState::from_flags(
            self.tie_start || slur == Some("start"),
            self.tie_stop || slur == Some("stop"),
        )
    }

    fn into_note(self, measure: usize, note: usize) -> Result<Note, ScoreError> {
        let tie = self.tie_state();
        let kind = match self.note_type {
            NoteType::Rest => NoteKind::Rest,
            NoteType::Note => NoteKind::Pitched {
                step: self.step.ok_or(ScoreError::MissingField {
                    measure,
                    note,
                    field: "step",
                })?,
                alter: self.alter.unwrap_or(0),
                octave: self.octave.unwrap_or(DEFAULT_OCTAVE),
            },
        };
        Ok(Note {
            kind,
            duration: self.duration,
            xml_type: self.xml_type.unwrap_or_else(|| DEFAULT_XML_TYPE.to_string()),
            stem: self.stem.unwrap_or_else(|| DEFAULT_STEM.to_string()),
            tie,
            lyric: self.lyric,
        })
    }
}

impl TryFrom<ScoreRequest> for Score {
    type Error = ScoreError;

    fn try_from(req: ScoreRequest) -> Result<Self, Self::Error> {
        if req.measures.is_empty() {
            return Err(ScoreError::NoMeasures);
        }
        let measures = req
            .measures
            .into_iter()
            .enumerate()
            .map(|(mi, m)| -> Result<Measure, ScoreError> {
                let notes = m
                    .notes
                    .into_iter()
                    .enumerate()
                    .map(|(ni, n)| n.into_note(mi + 1, ni + 1))
                    .collect::<Result<Vec<_>, ScoreError>>()?;
                Ok(Measure {
                    bpm: m.bpm.unwrap_or(DEFAULT_BPM),
                    new_system: m.new_system,
                    notes,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Score {
            title: req.title,
            artist: req.artist,
            rights: req.rights.filter(|r| !r.is_empty()),
            measures,
        })
    }
}
