//! Compatibility profile: every fixed value the generated document carries so
//! that MuseScore lays the score out the way the web front end previews it.
//!
//! None of these values come from the score. They are grouped here so the
//! shim is auditable in one place and can be overridden from a JSON file.
//! Decimal layout values are kept as literal text so output stays byte-stable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatProfile {
    /// `<software>` written in the encoding block.
    pub software: String,
    pub supports: Vec<Support>,
    pub scaling: Scaling,
    pub page: PageLayout,
    pub word_font: Font,
    pub lyric_font: Font,
    /// Prefix for the artist byline ("original performer").
    pub byline_prefix: String,
    pub byline_credit: CreditPlacement,
    pub title_credit: CreditPlacement,
    pub rights_credit: CreditPlacement,
    pub part: PartInfo,
    pub system_layout: SystemLayout,
    pub metronome: Metronome,
    pub attributes: MeasureAttributes,
    /// Emit `<lyric>` elements for notes that carry lyric text.
    pub render_lyrics: bool,
}

/// One `<supports>` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub element: String,
    /// Attribute name for attribute-level support, e.g. `new-system` on `print`.
    #[serde(default)]
    pub attribute: Option<String>,
}

impl Support {
    fn element(element: &str) -> Self {
        Self {
            element: element.to_string(),
            attribute: None,
        }
    }

    fn attribute(element: &str, attribute: &str) -> Self {
        Self {
            element: element.to_string(),
            attribute: Some(attribute.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub millimeters: String,
    pub tenths: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub height: u32,
    pub width: u32,
    pub left_margin: String,
    pub right_margin: String,
    pub top_margin: String,
    pub bottom_margin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPlacement {
    pub default_x: String,
    pub default_y: String,
    pub justify: String,
    pub valign: String,
    pub font_size: String,
}

impl CreditPlacement {
    fn new(x: &str, y: &str, justify: &str, valign: &str, font_size: &str) -> Self {
        Self {
            default_x: x.to_string(),
            default_y: y.to_string(),
            justify: justify.to_string(),
            valign: valign.to_string(),
            font_size: font_size.to_string(),
        }
    }
}

/// The single part and its MIDI playback setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartInfo {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub instrument_id: String,
    pub midi_port: u32,
    pub midi_channel: u32,
    pub midi_program: u32,
    pub volume: String,
    pub pan: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemLayout {
    pub left_margin: String,
    pub right_margin: String,
    pub top_system_distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metronome {
    pub beat_unit: String,
    pub default_x: String,
    pub default_y: String,
}

/// Divisions, key, time and clef written once in the first measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureAttributes {
    pub divisions: u32,
    pub fifths: i32,
    pub beats: u32,
    pub beat_type: u32,
    pub clef_sign: String,
    pub clef_line: u32,
}

impl Default for CompatProfile {
    fn default() -> Self {
        let page_margin = "56.6929".to_string();
        Self {
            software: "MuseScore 2.2.1".to_string(),
            supports: vec![
                Support::element("accidental"),
                Support::element("beam"),
                Support::attribute("print", "new-page"),
                Support::attribute("print", "new-system"),
                Support::element("stem"),
            ],
            scaling: Scaling {
                millimeters: "7.05556".to_string(),
                tenths: "40".to_string(),
            },
            page: PageLayout {
                height: 1584,
                width: 1224,
                left_margin: page_margin.clone(),
                right_margin: page_margin.clone(),
                top_margin: page_margin,
                bottom_margin: "113.386".to_string(),
            },
            word_font: Font {
                family: "FreeSerif".to_string(),
                size: "10".to_string(),
            },
            lyric_font: Font {
                family: "FreeSerif".to_string(),
                size: "11".to_string(),
            },
            byline_prefix: "原唱：".to_string(),
            byline_credit: CreditPlacement::new("1167.31", "1402.31", "right", "bottom", "12"),
            title_credit: CreditPlacement::new("612", "1527.31", "center", "top", "24"),
            rights_credit: CreditPlacement::new("612", "113.386", "center", "bottom", "8"),
            part: PartInfo {
                id: "P1".to_string(),
                name: "Piano".to_string(),
                abbreviation: "Pno.".to_string(),
                instrument_id: "P1-I1".to_string(),
                midi_port: 1,
                midi_channel: 1,
                midi_program: 1,
                volume: "78.7402".to_string(),
                pan: "0".to_string(),
            },
            system_layout: SystemLayout {
                left_margin: "-0.00".to_string(),
                right_margin: "853.07".to_string(),
                top_system_distance: "195.00".to_string(),
            },
            metronome: Metronome {
                beat_unit: "quarter".to_string(),
                default_x: "-34.44".to_string(),
                default_y: "40.00".to_string(),
            },
            attributes: MeasureAttributes {
                divisions: 2,
                fifths: 0,
                beats: 4,
                beat_type: 4,
                clef_sign: "G".to_string(),
                clef_line: 2,
            },
            render_lyrics: false,
        }
    }
}

impl CompatProfile {
    /// Load a profile from JSON. Missing keys keep their default values.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse profile {}", path.display()))
    }
}
