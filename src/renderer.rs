//! Contains the interface used to render the content of an item and a default implementation that
//! produces MusicXML documents.
//!
//! The library never parses the rendered content. It only makes sure that an item's content is
//! regenerated from its answer every time the item is selected, so a renderer must be a pure
//! function of its inputs.

use indoc::formatdoc;

use crate::data::{
    Item, ItemKind,
    music::notes::{Accidental, Pitch},
};

/// The octave at and above which notes are written on the treble staff.
const TREBLE_OCTAVE: i8 = 4;

/// The layout of the staff on which the notes are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaffLayout {
    /// A single staff with a treble or bass clef chosen from the octave of the lowest note.
    Single,

    /// A grand staff with a treble and a bass staff.
    Grand,
}

/// Produces the content presented to the learner from the notes of an item.
pub trait Renderer {
    /// Renders the given notes with the given layout. The first note decides on which staff the
    /// notes are written.
    fn render(&self, notes: &[Pitch], layout: StaffLayout) -> String;

    /// Renders the content of the given item. Both single notes and chords are written on a grand
    /// staff.
    fn render_item(&self, item: &Item) -> String {
        self.render(&item.answer, StaffLayout::Grand)
    }
}

/// A renderer that writes the notes as a single measure in a MusicXML 3.1 document.
#[derive(Clone, Copy, Debug, Default)]
pub struct MusicXmlRenderer {}

impl MusicXmlRenderer {
    /// Returns the header shared by all documents, up to the opening of the measure.
    fn header(item_kind: ItemKind) -> String {
        // Chord documents declare their doctype for the benefit of stricter readers.
        let doctype = match item_kind {
            ItemKind::Note => "",
            ItemKind::Chord => concat!(
                "<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" ",
                "\"http://www.musicxml.org/dtds/partwise.dtd\">\n"
            ),
        };
        formatdoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            {doctype}<score-partwise version="3.1">
              <part-list>
                <score-part id="P1">
                  <part-name>Music</part-name>
                </score-part>
              </part-list>
              <part id="P1">
                <measure number="1">
            "#}
    }

    /// Returns the closing tags shared by all documents.
    fn footer() -> &'static str {
        "    </measure>\n  </part>\n</score-partwise>\n"
    }

    /// Returns the attributes of a measure written on a single staff with the given clef.
    fn single_staff_attributes(sign: char, line: u8) -> String {
        formatdoc! {"
            <attributes>
              <divisions>1</divisions>
              <key><fifths>0</fifths></key>
              <time><beats>4</beats><beat-type>4</beat-type></time>
              <clef><sign>{sign}</sign><line>{line}</line></clef>
            </attributes>
        "}
    }

    /// Returns the attributes of a measure written on a grand staff.
    fn grand_staff_attributes() -> String {
        formatdoc! {r#"
            <attributes>
              <divisions>1</divisions>
              <key><fifths>0</fifths></key>
              <time><beats>4</beats><beat-type>4</beat-type></time>
              <staves>2</staves>
              <clef number="1"><sign>G</sign><line>2</line></clef>
              <clef number="2"><sign>F</sign><line>4</line></clef>
            </attributes>
        "#}
    }

    /// Returns a whole note for the given pitch. Chord members after the first one are marked with
    /// `<chord/>`. The staff is omitted on single-staff layouts.
    fn note(pitch: &Pitch, in_chord: bool, voice: u8, staff: Option<u8>) -> String {
        let accidental = match pitch.note.1 {
            Accidental::Natural => String::new(),
            Accidental::Sharp => "<accidental>sharp</accidental>".to_string(),
            Accidental::Flat => "<accidental>flat</accidental>".to_string(),
        };
        let chord = if in_chord { "<chord/>" } else { "" };
        let staff = staff.map_or(String::new(), |s| format!("<staff>{s}</staff>"));
        formatdoc! {"
            <note>
              {chord}<pitch>
                <step>{step}</step>
                <alter>{alter}</alter>
                <octave>{octave}</octave>
              </pitch>
              <duration>4</duration>
              <voice>{voice}</voice>
              <type>whole</type>
              {accidental}{staff}
            </note>
            ",
            step = pitch.note.0,
            alter = pitch.note.1.alter(),
            octave = pitch.octave,
        }
    }

    /// Returns a whole rest on the given staff, preceded by a backup to the start of the measure.
    fn rest(voice: u8, staff: u8) -> String {
        formatdoc! {"
            <backup>
              <duration>4</duration>
            </backup>
            <note>
              <rest/>
              <duration>4</duration>
              <voice>{voice}</voice>
              <type>whole</type>
              <staff>{staff}</staff>
            </note>
        "}
    }

    /// Indents every line of the given fragment so that it sits inside the measure.
    fn indent(fragment: &str) -> String {
        fragment
            .lines()
            .map(|line| format!("      {line}\n"))
            .collect()
    }
}

impl Renderer for MusicXmlRenderer {
    fn render(&self, notes: &[Pitch], layout: StaffLayout) -> String {
        let kind = if notes.len() == 1 {
            ItemKind::Note
        } else {
            ItemKind::Chord
        };
        let low = notes
            .first()
            .is_some_and(|pitch| pitch.octave < TREBLE_OCTAVE);

        let mut body = String::new();
        match layout {
            StaffLayout::Single => {
                let (sign, line) = if low { ('F', 4) } else { ('G', 2) };
                body.push_str(&Self::single_staff_attributes(sign, line));
                for (index, pitch) in notes.iter().enumerate() {
                    body.push_str(&Self::note(pitch, index > 0, 1, None));
                }
            }
            StaffLayout::Grand => {
                // Voice 1 lives on the treble staff and voice 2 on the bass staff. The staff not
                // used by the notes is filled with a whole rest.
                let (staff, other_staff) = if low { (2, 1) } else { (1, 2) };
                body.push_str(&Self::grand_staff_attributes());
                for (index, pitch) in notes.iter().enumerate() {
                    body.push_str(&Self::note(pitch, index > 0, staff, Some(staff)));
                }
                body.push_str(&Self::rest(other_staff, other_staff));
            }
        }

        let mut document = Self::header(kind);
        document.push_str(&Self::indent(&body));
        document.push_str(Self::footer());
        document
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::data::music::notes::Note;

    /// Verifies that a note above middle C is written on the treble staff of a grand staff.
    #[test]
    fn treble_note() {
        let xml =
            MusicXmlRenderer::default().render(&[Pitch::new(Note::C_SHARP, 5)], StaffLayout::Grand);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<score-partwise"));
        assert!(xml.contains("<step>C</step>"));
        assert!(xml.contains("<alter>1</alter>"));
        assert!(xml.contains("<octave>5</octave>"));
        assert!(xml.contains("<accidental>sharp</accidental><staff>1</staff>"));
        assert!(xml.contains("<rest/>"));
        assert!(xml.contains("<staff>2</staff>"));
        assert!(!xml.contains("<chord/>"));
        assert!(xml.ends_with("</score-partwise>\n"));
    }

    /// Verifies that a low chord is written on the bass staff with chord markers.
    #[test]
    fn bass_chord() {
        let notes = [
            Pitch::new(Note::A, 2),
            Pitch::new(Note::C, 3),
            Pitch::new(Note::E, 3),
        ];
        let xml = MusicXmlRenderer::default().render(&notes, StaffLayout::Grand);
        assert!(xml.contains("<!DOCTYPE score-partwise"));
        assert_eq!(xml.matches("<chord/>").count(), 2);
        assert_eq!(xml.matches("<staff>2</staff>").count(), 3);
        assert_eq!(xml.matches("<staff>1</staff>").count(), 1);
    }

    /// Verifies the clef of single-staff layouts.
    #[test]
    fn single_staff_clef() {
        let renderer = MusicXmlRenderer::default();
        let low = renderer.render(&[Pitch::new(Note::B_FLAT, 3)], StaffLayout::Single);
        assert!(low.contains("<sign>F</sign><line>4</line>"));
        assert!(low.contains("<accidental>flat</accidental>"));
        assert!(!low.contains("<staff>"));

        let high = renderer.render(&[Pitch::new(Note::C, 4)], StaffLayout::Single);
        assert!(high.contains("<sign>G</sign><line>2</line>"));
    }

    /// Verifies that rendering the same item twice produces identical content.
    #[test]
    fn idempotent_render() {
        let renderer = MusicXmlRenderer::default();
        let item = Item::new(
            vec![
                Pitch::new(Note::D, 4),
                Pitch::new(Note::F_SHARP, 4),
                Pitch::new(Note::A, 4),
            ],
            String::new(),
            Utc::now(),
        );
        assert_eq!(renderer.render_item(&item), renderer.render_item(&item));
    }
}
