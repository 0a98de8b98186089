use chrono::Duration;
use pretty_assertions::assert_eq;

use super::*;
use crate::{
    data::{
        SettingsBuilder,
        music::{
            chords::ChordQuality,
            notes::{Note, Pitch},
        },
    },
    renderer::StaffLayout,
    testutil::{chord_item, naturals_in_review, note_item},
};

/// Returns settings that only allow the natural notes of the fourth octave.
fn fourth_octave_naturals() -> SettingsBuilder {
    let mut builder = SettingsBuilder::default();
    builder
        .min_octave(4)
        .max_octave(4)
        .include_sharps(false)
        .include_flats(false);
    builder
}

/// Verifies that a due item is presented before a queued new item.
#[test]
fn due_review_before_queued_new() {
    let now = Utc::now();
    let items = vec![
        note_item(Note::C, 4, ItemState::New, now),
        note_item(Note::D, 4, ItemState::Review, now - Duration::hours(1)),
    ];
    let challenge =
        TieredScheduler::with_seed(0).next_challenge(&items, &Settings::default(), now);
    assert_eq!(challenge.provenance, Provenance::Review);
    assert_eq!(challenge.item.id, items[1].id);
    assert_eq!(challenge.answer, vec![Pitch::new(Note::D, 4)]);
}

/// Verifies that the item with the earliest due timestamp is reviewed first and that items due in
/// the future are not reviewed.
#[test]
fn earliest_due_first() {
    let now = Utc::now();
    let items = vec![
        note_item(Note::E, 4, ItemState::Review, now - Duration::minutes(5)),
        note_item(Note::F, 4, ItemState::Learning, now - Duration::days(2)),
        note_item(Note::G, 4, ItemState::Review, now + Duration::minutes(1)),
        note_item(Note::A, 4, ItemState::New, now - Duration::days(30)),
    ];
    let mut scheduler = TieredScheduler::with_seed(1);
    let challenge = scheduler.next_challenge(&items, &Settings::default(), now);
    assert_eq!(challenge.item.id, items[1].id);
    assert_eq!(challenge.provenance, Provenance::Review);

    // Without the overdue items, the queued new item is presented even though its due timestamp is
    // in the past.
    let challenge = scheduler.next_challenge(&items[2..], &Settings::default(), now);
    assert_eq!(challenge.item.id, items[3].id);
    assert_eq!(challenge.provenance, Provenance::Learn);
}

/// Verifies that queued new items are presented in the order of the pool.
#[test]
fn queued_new_in_order() {
    let now = Utc::now();
    let items = vec![
        note_item(Note::B, 3, ItemState::New, now),
        note_item(Note::C, 4, ItemState::New, now - Duration::days(1)),
    ];
    let challenge =
        TieredScheduler::with_seed(2).next_challenge(&items, &Settings::default(), now);
    assert_eq!(challenge.item.id, items[0].id);
    assert_eq!(challenge.provenance, Provenance::Learn);
}

/// Verifies that items that do not satisfy the settings are never presented.
#[test]
fn invalid_items_skipped() {
    let now = Utc::now();
    let settings = fourth_octave_naturals().build().unwrap();
    let items = vec![
        note_item(Note::C, 5, ItemState::Review, now - Duration::days(1)),
        note_item(Note::F_SHARP, 4, ItemState::Review, now - Duration::days(1)),
        chord_item(
            Pitch::new(Note::C, 4),
            ChordQuality::Major,
            ItemState::Review,
            now - Duration::days(1),
        ),
        note_item(Note::E, 4, ItemState::New, now),
    ];
    let challenge = TieredScheduler::with_seed(3).next_challenge(&items, &settings, now);
    assert_eq!(challenge.item.id, items[3].id);
    assert_eq!(challenge.provenance, Provenance::Learn);
}

/// Verifies that a generated chord that is already in the pool is presented for review, even if
/// the pooled item is not due.
#[test]
fn generated_chord_deduplicated() {
    let now = Utc::now();
    let settings = fourth_octave_naturals()
        .enable_single_notes(false)
        .chord_qualities(vec![ChordQuality::Major])
        .build()
        .unwrap();
    let mut scheduler = TieredScheduler::with_seed(4);

    // The only chord that satisfies the settings is C major in the fourth octave.
    let first = scheduler.next_challenge(&[], &settings, now);
    assert_eq!(first.provenance, Provenance::New);
    assert_eq!(first.item.id.as_str(), "chord-C4-E4-G4");

    let mut known = first.item.clone();
    known.record.state = ItemState::Review;
    known.record.due = now + Duration::days(3);
    let second = scheduler.next_challenge(&[known.clone()], &settings, now);
    assert_eq!(second.provenance, Provenance::Review);
    assert_eq!(second.item.id, first.item.id);
    assert_eq!(second.item.record, known.record);
}

/// Verifies that generated notes are not in the pool and satisfy the settings.
#[test]
fn generated_note_is_unknown() {
    let now = Utc::now();
    let settings = fourth_octave_naturals().build().unwrap();
    let items = vec![note_item(Note::C, 4, ItemState::Review, now + Duration::days(1))];

    let mut scheduler = TieredScheduler::with_seed(5);
    for _ in 0..10 {
        let challenge = scheduler.next_challenge(&items, &settings, now);
        assert_eq!(challenge.provenance, Provenance::New);
        assert_ne!(challenge.item.id, items[0].id);
        assert!(challenge.answer.iter().all(|pitch| settings.allows_pitch(pitch)));
        assert!(challenge.item.content.contains("<octave>4</octave>"));
    }
}

/// Verifies that a known note is reviewed when every note allowed by the settings is in the pool.
#[test]
fn exhausted_notes_fall_back_to_review() {
    let now = Utc::now();
    let settings = fourth_octave_naturals().build().unwrap();
    let items = naturals_in_review(4, now + Duration::days(1));
    let ids: Vec<_> = items.iter().map(|item| item.id).collect();

    let mut scheduler = TieredScheduler::with_seed(6);
    for _ in 0..10 {
        let challenge = scheduler.next_challenge(&items, &settings, now);
        assert_eq!(challenge.provenance, Provenance::Review);
        assert!(ids.contains(&challenge.item.id));
    }
}

/// Verifies that a note is still presented when every allowed note is known and none of them is
/// valid, accepting a duplicate ID.
#[test]
fn duplicate_note_as_last_resort() {
    let now = Utc::now();
    let settings = fourth_octave_naturals()
        .enable_single_notes(false)
        .build()
        .unwrap();
    let items = naturals_in_review(4, now + Duration::days(1));
    let ids: Vec<_> = items.iter().map(|item| item.id).collect();

    let challenge = TieredScheduler::with_seed(7).next_challenge(&items, &settings, now);
    assert_eq!(challenge.provenance, Provenance::New);
    assert!(ids.contains(&challenge.item.id));
    assert_eq!(challenge.item.record.state, ItemState::New);
}

/// Verifies that the content of the selected item is rendered again and that repeating the
/// selection on the same pool produces the same challenge.
#[test]
fn content_refreshed() {
    let now = Utc::now();
    let mut item = note_item(Note::A, 2, ItemState::Learning, now - Duration::minutes(1));
    item.content = "stale".to_string();
    let items = vec![item];

    let mut scheduler = TieredScheduler::with_seed(8);
    let first = scheduler.next_challenge(&items, &Settings::default(), now);
    let second = scheduler.next_challenge(&items, &Settings::default(), now);
    assert_eq!(first, second);
    assert_eq!(
        first.item.content,
        MusicXmlRenderer::default().render(&[Pitch::new(Note::A, 2)], StaffLayout::Grand)
    );
    assert_eq!(items[0].content, "stale");
}

/// A renderer that only writes the names of the notes.
struct NameRenderer {}

impl Renderer for NameRenderer {
    fn render(&self, notes: &[Pitch], _layout: StaffLayout) -> String {
        notes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Verifies that the scheduler uses the given renderer.
#[test]
fn custom_renderer() {
    let now = Utc::now();
    let items = vec![note_item(Note::B_FLAT, 3, ItemState::New, now)];
    let mut scheduler = TieredScheduler::with_seed(9).with_renderer(Box::new(NameRenderer {}));
    let challenge = scheduler.next_challenge(&items, &Settings::default(), now);
    assert_eq!(challenge.item.content, "Bb3");
}

/// Verifies that only chords are generated when single notes are disabled and that only notes are
/// generated when chords are disabled.
#[test]
fn generated_kind_follows_settings() {
    let now = Utc::now();
    let mut scheduler = TieredScheduler::with_seed(10);
    let chords = Settings::for_mode(crate::data::PracticeMode::Chords);
    let notes = Settings::for_mode(crate::data::PracticeMode::SingleNotes);
    for _ in 0..20 {
        let challenge = scheduler.next_challenge(&[], &chords, now);
        assert_eq!(challenge.item.kind(), ItemKind::Chord);
        let challenge = scheduler.next_challenge(&[], &notes, now);
        assert_eq!(challenge.item.kind(), ItemKind::Note);
    }
}
