//! Card pairing and schedule transplant.
//!
//! # Responsibility
//! - Pair the original cards with the freshly generated ones by ordinal.
//! - Move scheduling state and (optionally) review history onto the copy.
//!
//! # Invariants
//! - Pairing never truncates: differing ordinal sets are an error.
//! - The original card row and its review entries are left untouched.
//! - Scheduling state is either fully carried over or fully blank.

use crate::model::card::{sort_by_ordinal, Card, CardSchedule};
use crate::model::note::NoteId;
use crate::model::revlog::ReviewLogEntry;
use crate::repo::{CollectionStore, IdTable};
use crate::service::copy_service::{CopyContext, CopyError};

/// Result of moving one original card onto its copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransplantOutcome {
    pub card: Card,
    pub copied_log_entries: usize,
}

/// Sorts both card sets by ordinal and zips them.
///
/// # Errors
/// - `CopyError::CardSetMismatch` when the ordinal sequences differ.
pub fn pair_by_ordinal(
    note_id: NoteId,
    mut original: Vec<Card>,
    mut generated: Vec<Card>,
) -> Result<Vec<(Card, Card)>, CopyError> {
    sort_by_ordinal(&mut original);
    sort_by_ordinal(&mut generated);

    let original_ords: Vec<u16> = original.iter().map(|card| card.ordinal).collect();
    let generated_ords: Vec<u16> = generated.iter().map(|card| card.ordinal).collect();
    if original_ords != generated_ords {
        return Err(CopyError::CardSetMismatch {
            note_id,
            original: original_ords,
            generated: generated_ords,
        });
    }

    Ok(original.into_iter().zip(generated).collect())
}

/// Rewrites the generated `stub` row with the content of `old`.
///
/// With `preserve_schedule` off the copy keeps the stub's blank schedule,
/// due position and home deck. With `copy_log` on every review entry of
/// `old` is inserted again for the copy, with an id allocated from the
/// original entry id so review order is kept.
pub fn transplant<S: CollectionStore>(
    ctx: &mut CopyContext<'_, S>,
    old: &Card,
    stub: &Card,
    preserve_schedule: bool,
    copy_log: bool,
) -> Result<TransplantOutcome, CopyError> {
    let usn = ctx.store().current_usn()?;
    let mut card = Card {
        id: stub.id,
        note_id: stub.note_id,
        deck_id: old.deck_id,
        ordinal: stub.ordinal,
        mtime_secs: ctx.now_secs(),
        usn,
        due: old.due,
        original_deck_id: old.original_deck_id,
        schedule: old.schedule,
        flags: old.flags,
        data: old.data.clone(),
    };
    if !preserve_schedule {
        card.schedule = CardSchedule::default();
        card.deck_id = stub.deck_id;
        card.due = stub.due;
        card.original_deck_id = stub.original_deck_id;
    }
    ctx.store().update_card(&card)?;

    let mut copied_log_entries = 0;
    if copy_log {
        for entry in ctx.store().revlog_for_card(old.id)? {
            let copy = ReviewLogEntry {
                id: ctx.allocate(IdTable::Revlog, Some(entry.id))?,
                card_id: card.id,
                usn,
                ..entry
            };
            ctx.store().insert_revlog(&copy)?;
            copied_log_entries += 1;
        }
    }

    Ok(TransplantOutcome {
        card,
        copied_log_entries,
    })
}
