//! Defines and implements the selection of the next challenge to present to the learner. This
//! module is the core mechanism of how notedrill balances reviewing known material with introducing
//! new notes and chords.
//!
//! The selection goes through a fixed sequence of tiers and returns the result of the first tier
//! that produces an item:
//! 1. Only the items that are valid under the current settings are considered. Invalid items stay
//!    in the pool but are never presented.
//! 2. Among the valid items that are not new, the one with the earliest due timestamp at or before
//!    the current time is presented for review.
//! 3. Otherwise, the first valid item that has never been reviewed is presented, in the order in
//!    which the items appear in the pool.
//! 4. Otherwise, a fresh note or chord is generated. Generation avoids minting an item whose ID is
//!    already in the pool. If that's not possible, an existing item is presented for review instead.
//!
//! The selection never fails and never mutates the pool. Items generated in the last tier are
//! returned inside the challenge, and it's up to the caller to add them to the pool.

mod filter;

use chrono::{DateTime, Utc};
use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use ustr::UstrSet;

use crate::{
    data::{
        Challenge, Item, ItemKind, ItemState, Provenance, Settings, music::notes::PitchRange,
    },
    generator::{generate_chord, generate_note, sample},
    renderer::{MusicXmlRenderer, Renderer},
    scheduler::filter::ItemFilter,
};

/// The maximum number of notes drawn when looking for a note whose ID is not in the pool.
pub const MAX_NOTE_ATTEMPTS: usize = 20;

/// The trait that defines the interface for selecting challenges.
pub trait ChallengeScheduler {
    /// Selects the next challenge from the given pool of items under the given settings. The
    /// selection always succeeds.
    fn next_challenge(
        &mut self,
        items: &[Item],
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Challenge;
}

/// A scheduler that selects challenges by going through the tiers of due reviews, queued new
/// items, and generated items.
pub struct TieredScheduler {
    /// The renderer used to regenerate the content of the selected items.
    renderer: Box<dyn Renderer>,

    /// The source of randomness used during generation.
    rng: StdRng,
}

impl Default for TieredScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TieredScheduler {
    /// Creates a new scheduler seeded from the thread-local generator that renders items as
    /// MusicXML.
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderer: Box::new(MusicXmlRenderer::default()),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Creates a new scheduler with a fixed seed, so that generation is reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            renderer: Box::new(MusicXmlRenderer::default()),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Replaces the renderer used to produce the content of the selected items.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Builds the challenge for the given item after rendering its content again.
    fn present(&self, mut item: Item, provenance: Provenance) -> Challenge {
        item.content = self.renderer.render_item(&item);
        Challenge::new(item, provenance)
    }

    /// Returns the valid item with the earliest due timestamp among those that are due. Ties are
    /// broken by the order of the pool.
    fn due_review<'a>(valid: &[&'a Item], now: DateTime<Utc>) -> Option<&'a Item> {
        valid
            .iter()
            .filter(|item| item.record.is_due(now))
            .min_by_key(|item| item.record.due)
            .copied()
    }

    /// Returns the first valid item that has never been reviewed.
    fn queued_new<'a>(valid: &[&'a Item]) -> Option<&'a Item> {
        valid
            .iter()
            .find(|item| item.record.state == ItemState::New)
            .copied()
    }

    /// Decides whether to generate a chord or a single note. If both are enabled, the choice is
    /// made at random with equal probability. If neither is enabled, a note is generated.
    fn generate_chord_next(&mut self, settings: &Settings) -> bool {
        match (settings.enable_single_notes, settings.chords_enabled()) {
            (true, true) => self.rng.random_bool(0.5),
            (false, true) => true,
            _ => false,
        }
    }

    /// Generates a chord. If a chord with the same ID is already in the pool, the existing item is
    /// presented for review instead.
    fn chord_challenge(
        &mut self,
        items: &[Item],
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Challenge {
        let answer = generate_chord(settings, &mut self.rng).into_inner();
        let id = Item::id_for_answer(&answer);
        if let Some(existing) = items.iter().find(|item| item.id == id) {
            debug!("generated chord {id} is already known, presenting it for review");
            return self.present(existing.clone(), Provenance::Review);
        }

        debug!("generated new chord {id}");
        self.present(Item::new(answer, String::new(), now), Provenance::New)
    }

    /// Generates a note whose ID is not in the pool. If none is found after a bounded number of
    /// attempts, a random valid note from the pool is presented for review. If there are none, a
    /// note is generated even though its ID already exists.
    fn note_challenge(
        &mut self,
        items: &[Item],
        valid: &[&Item],
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Challenge {
        let known: UstrSet = items.iter().map(|item| item.id).collect();
        let rng = &mut self.rng;
        let fresh = sample(
            MAX_NOTE_ATTEMPTS,
            || Some(generate_note(settings, &PitchRange::PIANO, &mut *rng).into_inner()),
            |pitch| !known.contains(&Item::id_for_answer(&[*pitch])),
        );
        if let Some(pitch) = fresh {
            let item = Item::new(vec![pitch], String::new(), now);
            debug!("generated new note {}", item.id);
            return self.present(item, Provenance::New);
        }

        let known_notes: Vec<&Item> = valid
            .iter()
            .filter(|item| item.kind() == ItemKind::Note)
            .copied()
            .collect();
        if let Some(existing) = known_notes.choose(&mut self.rng) {
            debug!(
                "no unknown note found after {MAX_NOTE_ATTEMPTS} attempts, reviewing {}",
                existing.id
            );
            return self.present((*existing).clone(), Provenance::Review);
        }

        let pitch = generate_note(settings, &PitchRange::PIANO, &mut self.rng).into_inner();
        let item = Item::new(vec![pitch], String::new(), now);
        debug!("no unknown or valid note available, presenting known note {}", item.id);
        self.present(item, Provenance::New)
    }
}

impl ChallengeScheduler for TieredScheduler {
    fn next_challenge(
        &mut self,
        items: &[Item],
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Challenge {
        let filter = ItemFilter::new(settings);
        let valid = filter.valid_items(items);

        if let Some(item) = Self::due_review(&valid, now) {
            debug!("presenting due item {} for review", item.id);
            return self.present(item.clone(), Provenance::Review);
        }

        if let Some(item) = Self::queued_new(&valid) {
            debug!("presenting queued item {} for the first time", item.id);
            return self.present(item.clone(), Provenance::Learn);
        }

        if self.generate_chord_next(settings) {
            self.chord_challenge(items, settings, now)
        } else {
            self.note_challenge(items, &valid, settings, now)
        }
    }
}

#[cfg(test)]
mod test;
