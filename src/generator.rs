//! Contains the logic to generate random notes and chords that satisfy the active settings.
//!
//! Generation uses rejection sampling. A candidate is drawn, checked against the constraints, and
//! discarded if it fails them. The number of attempts is always bounded and every generator has a
//! deterministic fallback, so generation always terminates and always returns something to drill.
//!
//! Checking the range of the root note is not enough to keep a chord in range. The third or the
//! fifth stacked on top of a valid root can cross the highest allowed octave, so every note of the
//! chord is validated again once the chord is built.

use log::warn;
use rand::{Rng, seq::IndexedRandom};

use crate::data::{
    Settings,
    music::{
        chords::ChordQuality,
        notes::{Note, Pitch, PitchRange, SEMITONES_PER_OCTAVE, Spelling},
    },
};

/// The maximum number of candidates drawn when generating a chord.
pub const MAX_CHORD_ATTEMPTS: usize = 100;

/// The chord qualities used when the settings do not enable any.
const DEFAULT_CHORD_QUALITIES: [ChordQuality; 2] = [ChordQuality::Major, ChordQuality::Minor];

/// The semitone class of A, the lowest note of the first piano octave.
const LOWEST_PIANO_CLASS: i32 = 9;

/// The limits of the roots drawn for chords. Only the top of the piano bounds the draw, so roots in
/// the first octave below A0 are drawn and then rejected.
const ROOT_LIMITS: PitchRange = PitchRange {
    lowest: Pitch::new(Note::C, 0),
    highest: PitchRange::PIANO.highest,
};

/// The result of a bounded generation, tagged with whether the value was generated or is the
/// fallback used when every attempt failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sampled<T> {
    /// A candidate that passed validation.
    Generated(T),

    /// The fallback value.
    Fallback(T),
}

impl<T> Sampled<T> {
    /// Returns the inner value regardless of how it was obtained.
    pub fn into_inner(self) -> T {
        match self {
            Sampled::Generated(value) | Sampled::Fallback(value) => value,
        }
    }

    /// Returns whether the value is the fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Sampled::Fallback(_))
    }
}

/// Draws up to `max_attempts` candidates and returns the first one accepted by the validator. The
/// generator may return `None` to reject a candidate before it reaches the validator.
pub fn sample<T>(
    max_attempts: usize,
    mut generate: impl FnMut() -> Option<T>,
    mut validate: impl FnMut(&T) -> bool,
) -> Option<T> {
    (0..max_attempts)
        .filter_map(|_| generate())
        .find(|candidate| validate(candidate))
}

/// Same as [sample], but returns the fallback value if no candidate is accepted.
pub fn sample_or_else<T>(
    max_attempts: usize,
    generate: impl FnMut() -> Option<T>,
    validate: impl FnMut(&T) -> bool,
    fallback: impl FnOnce() -> T,
) -> Sampled<T> {
    match sample(max_attempts, generate, validate) {
        Some(value) => Sampled::Generated(value),
        None => Sampled::Fallback(fallback()),
    }
}

/// Returns every pitch in the octave range of the settings that uses an enabled accidental and
/// lies within the given hard limits. Black keys are spelled according to the settings.
fn note_candidates(settings: &Settings, limits: &PitchRange) -> Vec<Pitch> {
    let spelling = settings.spelling();
    let mut candidates = Vec::new();
    for octave in settings.min_octave..=settings.max_octave {
        for class in 0..SEMITONES_PER_OCTAVE {
            // Naturals are always eligible. Black keys need at least one kind of accidental.
            let natural = Note::from_semitone_class(class, Spelling::Sharps);
            let note = match (natural.is_natural(), spelling) {
                (true, _) => natural,
                (false, Some(spelling)) => Note::from_semitone_class(class, spelling),
                (false, None) => continue,
            };

            let pitch = Pitch::new(note, octave);
            if limits.contains(&pitch) {
                candidates.push(pitch);
            }
        }
    }
    candidates
}

/// Returns the note used when no candidate satisfies the settings: C in the higher of the lowest
/// allowed octave and the fourth octave, kept within the piano range.
fn fallback_note(settings: &Settings) -> Pitch {
    Pitch::new(Note::C, settings.min_octave.clamp(4, 8))
}

/// Generates a random note uniformly among the ones allowed by the settings and the given hard
/// limits.
pub fn generate_note<R: Rng + ?Sized>(
    settings: &Settings,
    limits: &PitchRange,
    rng: &mut R,
) -> Sampled<Pitch> {
    match note_candidates(settings, limits).choose(rng) {
        Some(pitch) => Sampled::Generated(*pitch),
        None => {
            let fallback = fallback_note(settings);
            warn!("no note satisfies the current settings, falling back to {fallback}");
            Sampled::Fallback(fallback)
        }
    }
}

/// Builds a chord of the given quality on top of the root. Returns `None` if a note cannot be
/// represented.
fn build_chord(root: &Pitch, quality: ChordQuality, spelling: Spelling) -> Option<Vec<Pitch>> {
    quality
        .offsets()
        .iter()
        .map(|offset| Pitch::from_absolute_semitone(root.absolute_semitone() + offset, spelling))
        .collect()
}

/// Returns whether every note of the chord satisfies the settings and lies on the piano.
fn valid_chord(settings: &Settings, notes: &[Pitch]) -> bool {
    notes
        .iter()
        .all(|pitch| settings.allows_pitch(pitch) && PitchRange::PIANO.contains(pitch))
}

/// Returns the chord used when no candidate satisfies the settings: a C major triad rooted at the
/// lowest allowed octave, but never below the first octave nor above the seventh.
fn fallback_chord(settings: &Settings) -> Vec<Pitch> {
    let octave = settings.min_octave.clamp(1, 7);
    vec![
        Pitch::new(Note::C, octave),
        Pitch::new(Note::E, octave),
        Pitch::new(Note::G, octave),
    ]
}

/// Generates a random chord whose notes all satisfy the settings and lie on the piano. The quality
/// is drawn uniformly from the enabled qualities, or from major and minor if none are enabled.
pub fn generate_chord<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Sampled<Vec<Pitch>> {
    let qualities: &[ChordQuality] = if settings.chords_enabled() {
        &settings.chord_qualities
    } else {
        &DEFAULT_CHORD_QUALITIES
    };

    // Chord tones follow the spelling of the settings. If no accidentals are allowed, any chord
    // with a black key is rejected by the validation below regardless of its spelling.
    let spelling = settings.spelling().unwrap_or(Spelling::Sharps);
    let sampled = sample_or_else(
        MAX_CHORD_ATTEMPTS,
        || {
            let root = generate_note(settings, &ROOT_LIMITS, rng).into_inner();
            if root.octave == 0 && root.semitone_class() < LOWEST_PIANO_CLASS {
                return None;
            }
            let quality = *qualities.choose(rng)?;
            build_chord(&root, quality, spelling)
        },
        |notes| valid_chord(settings, notes),
        || fallback_chord(settings),
    );

    if sampled.is_fallback() {
        warn!("no chord satisfies the current settings after {MAX_CHORD_ATTEMPTS} attempts");
    }
    sampled
}
