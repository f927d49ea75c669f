//! Card domain model.
//!
//! # Invariants
//! - Exactly one card exists per `(note_id, ordinal)` pair.
//! - `note_id` always references an existing note.

use crate::model::note::NoteId;
use crate::model::DeckId;
use serde::{Deserialize, Serialize};

/// Millisecond timestamp id of a card row.
pub type CardId = i64;

/// Scheduling statistics carried over by a full copy.
///
/// `Default` is the state of a freshly generated, never studied card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSchedule {
    /// Serialized as `type` to match the host column name.
    #[serde(rename = "type")]
    pub card_type: i32,
    pub queue: i32,
    pub interval: i64,
    pub ease_factor: i32,
    pub reps: i32,
    pub lapses: i32,
    /// Remaining learning steps.
    pub left: i32,
    pub original_due: i64,
}

impl CardSchedule {
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// One study card rendered from a note template slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub note_id: NoteId,
    pub deck_id: DeckId,
    /// Template slot (or cloze number minus one) this card renders.
    pub ordinal: u16,
    pub mtime_secs: i64,
    pub usn: i32,
    pub due: i64,
    pub original_deck_id: DeckId,
    pub schedule: CardSchedule,
    pub flags: i32,
    pub data: String,
}

impl Card {
    /// Creates an unsaved blank card (`id == 0`) for one ordinal.
    pub fn blank(note_id: NoteId, deck_id: DeckId, ordinal: u16, due: i64) -> Self {
        Self {
            id: 0,
            note_id,
            deck_id,
            ordinal,
            mtime_secs: 0,
            usn: 0,
            due,
            original_deck_id: 0,
            schedule: CardSchedule::default(),
            flags: 0,
            data: String::new(),
        }
    }
}

/// Sorts cards by ordinal, the pairing order between a note and its copy.
pub fn sort_by_ordinal(cards: &mut [Card]) {
    cards.sort_by_key(|card| card.ordinal);
}
