//! Review log rows.
//!
//! Inserts bind positionally in `REVLOG_COLUMNS` order so the row layout
//! stays compatible with the host schema.

use crate::model::card::CardId;
use crate::model::revlog::{ReviewLogEntry, REVLOG_COLUMNS};
use crate::repo::RepoResult;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection};

static REVLOG_INSERT_SQL: Lazy<String> = Lazy::new(|| {
    let placeholders = (1..=REVLOG_COLUMNS.len())
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO revlog ({}) VALUES ({placeholders});",
        REVLOG_COLUMNS.join(", ")
    )
});

pub(crate) fn revlog_for_card(
    conn: &Connection,
    card_id: CardId,
) -> RepoResult<Vec<ReviewLogEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM revlog WHERE cid = ?1 ORDER BY id ASC;",
        REVLOG_COLUMNS.join(", ")
    ))?;
    let mut rows = stmt.query([card_id])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(ReviewLogEntry {
            id: row.get(0)?,
            card_id: row.get(1)?,
            usn: row.get(2)?,
            ease: row.get(3)?,
            interval: row.get(4)?,
            last_interval: row.get(5)?,
            ease_factor: row.get(6)?,
            taken_millis: row.get(7)?,
            review_kind: row.get(8)?,
        });
    }
    Ok(entries)
}

pub(crate) fn insert_revlog(conn: &Connection, entry: &ReviewLogEntry) -> RepoResult<()> {
    conn.execute(
        REVLOG_INSERT_SQL.as_str(),
        params![
            entry.id,
            entry.card_id,
            entry.usn,
            entry.ease,
            entry.interval,
            entry.last_interval,
            entry.ease_factor,
            entry.taken_millis,
            entry.review_kind,
        ],
    )?;
    Ok(())
}
