//! Build the MusicXML 3.1 `score-partwise` element tree for a [`Score`].
//!
//! Layout, fonts, MIDI setup and the reported software name all come from the
//! [`CompatProfile`]; only titles, tempo, line breaks and notes come from the
//! score itself.

use crate::generator::xml::Element;
use crate::model::*;
use crate::profile::{CompatProfile, CreditPlacement};
use chrono::NaiveDate;
use log::debug;

pub const MUSICXML_VERSION: &str = "3.1";

/// Builds one document per call; holds no state between calls.
#[derive(Debug, Clone)]
pub struct DocumentBuilder<'a> {
    profile: &'a CompatProfile,
    encoding_date: NaiveDate,
}

impl<'a> DocumentBuilder<'a> {
    /// Builder stamping today's local date into the encoding block.
    pub fn new(profile: &'a CompatProfile) -> Self {
        Self {
            profile,
            encoding_date: chrono::Local::now().date_naive(),
        }
    }

    /// Pin the encoding date, making output reproducible.
    pub fn with_encoding_date(mut self, date: NaiveDate) -> Self {
        self.encoding_date = date;
        self
    }

    pub fn build(&self, score: &Score) -> Element {
        debug!(
            "Building \"{}\": {} measures, {} notes",
            score.title,
            score.measures.len(),
            score.note_count()
        );
        let mut root = Element::new("score-partwise").attr("version", MUSICXML_VERSION);
        self.identification(&mut root, score);
        self.defaults(&mut root);
        self.credits(&mut root, score);
        self.part_list(&mut root);
        self.part(&mut root, score);
        root
    }

    fn identification(&self, root: &mut Element, score: &Score) {
        let id = root.push(Element::new("identification"));
        if !score.artist.is_empty() {
            id.push(Element::with_text("creator", &score.artist).attr("type", "artist"));
        }

        let enc = id.push(Element::new("encoding"));
        enc.push_text("software", &self.profile.software);
        enc.push_text("encoding-date", self.encoding_date.format("%Y-%m-%d"));
        for support in &self.profile.supports {
            let mut el = Element::new("supports")
                .attr("element", &support.element)
                .attr("type", "yes");
            if let Some(attribute) = &support.attribute {
                el.set_attr("attribute", attribute);
                el.set_attr("value", "yes");
            }
            enc.push(el);
        }
    }

    fn defaults(&self, root: &mut Element) {
        let p = self.profile;
        let defaults = root.push(Element::new("defaults"));

        let scaling = defaults.push(Element::new("scaling"));
        scaling.push_text("millimeters", &p.scaling.millimeters);
        scaling.push_text("tenths", &p.scaling.tenths);

        let layout = defaults.push(Element::new("page-layout"));
        layout.push_text("page-height", p.page.height);
        layout.push_text("page-width", p.page.width);
        for side in ["even", "odd"] {
            let margins = layout.push(Element::new("page-margins").attr("type", side));
            margins.push_text("left-margin", &p.page.left_margin);
            margins.push_text("right-margin", &p.page.right_margin);
            margins.push_text("top-margin", &p.page.top_margin);
            margins.push_text("bottom-margin", &p.page.bottom_margin);
        }

        defaults.push(
            Element::new("word-font")
                .attr("font-family", &p.word_font.family)
                .attr("font-size", &p.word_font.size),
        );
        defaults.push(
            Element::new("lyric-font")
                .attr("font-family", &p.lyric_font.family)
                .attr("font-size", &p.lyric_font.size),
        );
    }

    fn credits(&self, root: &mut Element, score: &Score) {
        let p = self.profile;
        let byline = if score.artist.is_empty() {
            String::new()
        } else {
            format!("{}{}", p.byline_prefix, score.artist)
        };
        let rights = score.rights.as_deref().unwrap_or_default();

        root.push(credit(&p.byline_credit, &byline));
        root.push(credit(&p.title_credit, &score.title));
        root.push(credit(&p.rights_credit, rights));
    }

    fn part_list(&self, root: &mut Element) {
        let part = &self.profile.part;
        let list = root.push(Element::new("part-list"));
        let sp = list.push(Element::new("score-part").attr("id", &part.id));
        sp.push_text("part-name", &part.name);
        sp.push_text("part-abbreviation", &part.abbreviation);
        sp.push(Element::new("score-instrument").attr("id", &part.instrument_id))
            .push_text("instrument-name", &part.name);
        sp.push(
            Element::new("midi-device")
                .attr("id", &part.instrument_id)
                .attr("port", part.midi_port),
        );
        let midi = sp.push(Element::new("midi-instrument").attr("id", &part.instrument_id));
        midi.push_text("midi-channel", part.midi_channel);
        midi.push_text("midi-program", part.midi_program);
        midi.push_text("volume", &part.volume);
        midi.push_text("pan", &part.pan);
    }

    fn part(&self, root: &mut Element, score: &Score) {
        let part = root.push(Element::new("part").attr("id", &self.profile.part.id));
        for (i, measure) in score.measures.iter().enumerate() {
            part.push(self.measure(i + 1, measure));
        }
    }

    fn measure(&self, number: usize, measure: &Measure) -> Element {
        let mut el = Element::new("measure").attr("number", number);
        el.push(self.print(measure.new_system));

        if number == 1 {
            el.push(self.attributes());
            el.push(self.tempo(measure.bpm));
        }

        for note in &measure.notes {
            el.push(self.note(note));
        }
        el
    }

    fn print(&self, new_system: bool) -> Element {
        let sl = &self.profile.system_layout;
        let mut print = Element::new("print");
        if new_system {
            print.set_attr("new-system", "yes");
        }
        let layout = print.push(Element::new("system-layout"));
        let margins = layout.push(Element::new("system-margins"));
        margins.push_text("left-margin", &sl.left_margin);
        margins.push_text("right-margin", &sl.right_margin);
        layout.push_text("top-system-distance", &sl.top_system_distance);
        print
    }

    fn attributes(&self) -> Element {
        let a = &self.profile.attributes;
        let mut attrs = Element::new("attributes");
        attrs.push_text("divisions", a.divisions);
        attrs.push(Element::new("key")).push_text("fifths", a.fifths);
        let time = attrs.push(Element::new("time"));
        time.push_text("beats", a.beats);
        time.push_text("beat-type", a.beat_type);
        let clef = attrs.push(Element::new("clef"));
        clef.push_text("sign", &a.clef_sign);
        clef.push_text("line", a.clef_line);
        attrs
    }

    /// Tempo as both a visible metronome mark and a playback `sound` tempo.
    fn tempo(&self, bpm: u32) -> Element {
        let m = &self.profile.metronome;
        let mut direction = Element::new("direction").attr("placement", "above");
        let metronome = direction.push(Element::new("direction-type")).push(
            Element::new("metronome")
                .attr("parentheses", "no")
                .attr("default-x", &m.default_x)
                .attr("default-y", &m.default_y),
        );
        metronome.push_text("beat-unit", &m.beat_unit);
        metronome.push_text("per-minute", bpm);
        direction.push(Element::new("sound").attr("tempo", bpm));
        direction
    }

    fn note(&self, note: &Note) -> Element {
        let mut el = Element::new("note");
        match &note.kind {
            NoteKind::Rest => {
                el.push(Element::new("rest"));
                el.push_text("duration", note.duration);
                el.push_text("voice", 1);
                el.push_text("type", &note.xml_type);
            }
            NoteKind::Pitched {
                step,
                alter,
                octave,
            } => {
                let pitch = el.push(Element::new("pitch"));
                pitch.push_text("step", step);
                if *alter != 0 {
                    pitch.push_text("alter", alter);
                }
                pitch.push_text("octave", octave);
                el.push_text("duration", note.duration);

                for ty in note.tie.types() {
                    el.push(Element::new("tie").attr("type", ty));
                }
                el.push_text("voice", 1);
                el.push_text("type", &note.xml_type);
                el.push_text("stem", &note.stem);

                if note.tie.is_tied() {
                    let notations = el.push(Element::new("notations"));
                    for ty in note.tie.types() {
                        notations.push(Element::new("tied").attr("type", ty));
                    }
                }

                if self.profile.render_lyrics {
                    if let Some(text) = note.lyric.as_deref().filter(|t| !t.is_empty()) {
                        let lyric = el.push(Element::new("lyric").attr("number", 1));
                        lyric.push_text("syllabic", "single");
                        lyric.push_text("text", text);
                    }
                }
            }
        }
        el
    }
}

fn credit(placement: &CreditPlacement, text: &str) -> Element {
    let mut credit = Element::new("credit").attr("page", 1);
    credit.push(
        Element::with_text("credit-words", text)
            .attr("default-x", &placement.default_x)
            .attr("default-y", &placement.default_y)
            .attr("justify", &placement.justify)
            .attr("valign", &placement.valign)
            .attr("font-size", &placement.font_size),
    );
    credit
}
