//! Card rows.

use crate::model::card::{Card, CardSchedule};
use crate::model::note::NoteId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CARD_SELECT_SQL: &str = "SELECT
    id,
    nid,
    did,
    ord,
    mod,
    usn,
    type,
    queue,
    due,
    ivl,
    factor,
    reps,
    lapses,
    left,
    odue,
    odid,
    flags,
    data
FROM cards";

pub(crate) fn cards_of_note(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<Card>> {
    let mut stmt = conn.prepare(&format!(
        "{CARD_SELECT_SQL} WHERE nid = ?1 ORDER BY ord ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([note_id])?;
    let mut cards = Vec::new();
    while let Some(row) = rows.next()? {
        cards.push(parse_card_row(row)?);
    }
    Ok(cards)
}

pub(crate) fn insert_card(conn: &Connection, card: &Card) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO cards (
            id, nid, did, ord, mod, usn, type, queue, due, ivl,
            factor, reps, lapses, left, odue, odid, flags, data
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18);",
        params![
            card.id,
            card.note_id,
            card.deck_id,
            card.ordinal,
            card.mtime_secs,
            card.usn,
            card.schedule.card_type,
            card.schedule.queue,
            card.due,
            card.schedule.interval,
            card.schedule.ease_factor,
            card.schedule.reps,
            card.schedule.lapses,
            card.schedule.left,
            card.schedule.original_due,
            card.original_deck_id,
            card.flags,
            card.data.as_str(),
        ],
    )?;
    Ok(())
}

pub(crate) fn update_card(conn: &Connection, card: &Card) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE cards
         SET
            nid = ?2,
            did = ?3,
            ord = ?4,
            mod = ?5,
            usn = ?6,
            type = ?7,
            queue = ?8,
            due = ?9,
            ivl = ?10,
            factor = ?11,
            reps = ?12,
            lapses = ?13,
            left = ?14,
            odue = ?15,
            odid = ?16,
            flags = ?17,
            data = ?18
         WHERE id = ?1;",
        params![
            card.id,
            card.note_id,
            card.deck_id,
            card.ordinal,
            card.mtime_secs,
            card.usn,
            card.schedule.card_type,
            card.schedule.queue,
            card.due,
            card.schedule.interval,
            card.schedule.ease_factor,
            card.schedule.reps,
            card.schedule.lapses,
            card.schedule.left,
            card.schedule.original_due,
            card.original_deck_id,
            card.flags,
            card.data.as_str(),
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::CardNotFound(card.id));
    }
    Ok(())
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let id: i64 = row.get("id")?;
    let ordinal: i64 = row.get("ord")?;
    let ordinal = u16::try_from(ordinal)
        .map_err(|_| RepoError::InvalidData(format!("invalid ordinal `{ordinal}` on card {id}")))?;

    Ok(Card {
        id,
        note_id: row.get("nid")?,
        deck_id: row.get("did")?,
        ordinal,
        mtime_secs: row.get("mod")?,
        usn: row.get("usn")?,
        due: row.get("due")?,
        original_deck_id: row.get("odid")?,
        schedule: CardSchedule {
            card_type: row.get("type")?,
            queue: row.get("queue")?,
            interval: row.get("ivl")?,
            ease_factor: row.get("factor")?,
            reps: row.get("reps")?,
            lapses: row.get("lapses")?,
            left: row.get("left")?,
            original_due: row.get("odue")?,
        },
        flags: row.get("flags")?,
        data: row.get("data")?,
    })
}
