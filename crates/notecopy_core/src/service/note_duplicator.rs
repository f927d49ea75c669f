//! Note duplication and blank card generation.
//!
//! # Responsibility
//! - Insert a new note row carrying the original's fields and tags.
//! - Generate the blank cards the note's type yields for the new note,
//!   limited to the ordinals the original still has.
//!
//! # Invariants
//! - The new note's id and guid differ from every stored note.
//! - Fields and tags are copied verbatim; later steps may change them.
//! - A generated card lands in the home deck of the original card with the
//!   same ordinal, or in `DEFAULT_DECK_ID` when there is none.

use crate::model::card::Card;
use crate::model::note::{new_guid, Note, NoteId};
use crate::model::DEFAULT_DECK_ID;
use crate::repo::{CollectionStore, IdTable};
use crate::service::copy_service::{CopyContext, CopyError};
use crate::service::id_allocator::MAX_ID_PROBES;

/// Inserts a duplicate of `original` and its blank cards.
///
/// `id_basis` set to the original id keeps the creation time encoded in the
/// new id; `None` uses the current time.
///
/// Returns the stored note and its generated cards sorted by ordinal.
pub fn duplicate_note<S: CollectionStore>(
    ctx: &mut CopyContext<'_, S>,
    original: &Note,
    original_cards: &[Card],
    id_basis: Option<NoteId>,
) -> Result<(Note, Vec<Card>), CopyError> {
    let notetype = ctx
        .store()
        .get_notetype(original.notetype_id)?
        .ok_or(CopyError::NotetypeNotFound(original.notetype_id))?;

    let usn = ctx.store().current_usn()?;
    let now_secs = ctx.now_secs();
    let note = Note {
        id: ctx.allocate(IdTable::Notes, id_basis)?,
        guid: unused_guid(ctx.store())?,
        notetype_id: original.notetype_id,
        mtime_secs: now_secs,
        usn,
        fields: original.fields.clone(),
        tags: original.tags.clone(),
    };
    ctx.store().insert_note(&note)?;

    let ordinals = ordinals_to_generate(notetype.card_ordinals(&note), original_cards);
    let mut cards = Vec::with_capacity(ordinals.len());
    if ordinals.is_empty() {
        return Ok((note, cards));
    }

    let position = ctx.store().next_new_position()?;
    for ordinal in ordinals {
        let deck_id = original_cards
            .iter()
            .find(|card| card.ordinal == ordinal)
            .map(home_deck)
            .unwrap_or(DEFAULT_DECK_ID);
        let mut card = Card::blank(note.id, deck_id, ordinal, position);
        card.id = ctx.allocate(IdTable::Cards, None)?;
        card.mtime_secs = now_secs;
        card.usn = usn;
        ctx.store().insert_card(&card)?;
        cards.push(card);
    }

    Ok((note, cards))
}

/// Keeps the generated ordinals the original also has. An original without
/// cards gets everything its notetype generates.
fn ordinals_to_generate(generated: Vec<u16>, original_cards: &[Card]) -> Vec<u16> {
    if original_cards.is_empty() {
        return generated;
    }
    generated
        .into_iter()
        .filter(|ordinal| original_cards.iter().any(|card| card.ordinal == *ordinal))
        .collect()
}

/// Deck a card returns to when it leaves a filtered deck.
fn home_deck(card: &Card) -> i64 {
    if card.original_deck_id != 0 {
        card.original_deck_id
    } else {
        card.deck_id
    }
}

fn unused_guid<S: CollectionStore + ?Sized>(store: &S) -> Result<String, CopyError> {
    for _ in 0..MAX_ID_PROBES {
        let guid = new_guid();
        if !store.guid_exists(&guid)? {
            return Ok(guid);
        }
    }
    Err(CopyError::GuidSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::ordinals_to_generate;
    use crate::model::card::Card;

    #[test]
    fn removed_optional_cards_are_not_regenerated() {
        let original = vec![Card::blank(1, 1, 0, 0)];
        assert_eq!(ordinals_to_generate(vec![0, 1], &original), vec![0]);
    }

    #[test]
    fn note_without_cards_keeps_full_generation() {
        assert_eq!(ordinals_to_generate(vec![0, 1], &[]), vec![0, 1]);
    }
}
