//! Contains the filter that decides which items of the pool are eligible under the current
//! settings.
//!
//! An item is valid if its kind is enabled and every note of its answer lies within the octave
//! range and uses an enabled accidental. Items that fail the filter are never presented, neither
//! for review nor as queued new items, but they remain in the pool and become eligible again once
//! the settings allow them.

use crate::data::{Item, ItemKind, Settings};

/// The filter used to reduce the item pool to the items that can be presented.
pub(super) struct ItemFilter<'a> {
    /// The settings against which the items are checked.
    settings: &'a Settings,
}

impl<'a> ItemFilter<'a> {
    /// Constructs a new filter for the given settings.
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Returns whether the item can be presented under the settings.
    pub fn is_valid(&self, item: &Item) -> bool {
        let kind_enabled = match item.kind() {
            ItemKind::Note => self.settings.enable_single_notes,
            ItemKind::Chord => self.settings.chords_enabled(),
        };
        kind_enabled
            && !item.answer.is_empty()
            && item
                .answer
                .iter()
                .all(|pitch| self.settings.allows_pitch(pitch))
    }

    /// Returns the valid items in the same order as they appear in the pool.
    pub fn valid_items<'b>(&self, items: &'b [Item]) -> Vec<&'b Item> {
        items.iter().filter(|item| self.is_valid(item)).collect()
    }
}
