//! Collection records touched by the copy workflow.
//!
//! # Responsibility
//! - Define notes, cards, review log entries and note types as plain values.
//! - Keep the persisted host layout (field separator, tag string) in one place.
//!
//! # Invariants
//! - Every record is identified by a time-derived millisecond id.
//! - Records are never deleted by this crate; copies are independent rows.

pub mod card;
pub mod note;
pub mod notetype;
pub mod revlog;

/// Deck identifier. Deck rows are owned by the host and not modelled here.
pub type DeckId = i64;

/// Deck used for generated cards that have no counterpart on the original.
pub const DEFAULT_DECK_ID: DeckId = 1;
