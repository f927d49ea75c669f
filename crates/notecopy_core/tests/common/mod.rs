#![allow(dead_code)]

use notecopy_core::model::note::new_guid;
use notecopy_core::{
    Card, CardSchedule, CollectionStore, Note, NoteFields, Notetype, NotetypeKind,
    ReviewLogEntry, SqliteCollection,
};
use rusqlite::Connection;

pub const NOW_MS: i64 = 1_700_000_000_000;
pub const BASIC_NOTETYPE_ID: i64 = 100;
pub const CLOZE_NOTETYPE_ID: i64 = 200;
pub const NOTE_ID: i64 = 1_600_000_000_000;
pub const CARD0_ID: i64 = 1_600_000_000_100;
pub const CARD1_ID: i64 = 1_600_000_000_101;
pub const REVIEW_DECK_ID: i64 = 7;

pub fn basic_notetype() -> Notetype {
    Notetype {
        id: BASIC_NOTETYPE_ID,
        name: "Basic (and reversed card)".into(),
        kind: NotetypeKind::Standard,
        field_names: vec!["Front".into(), "Back".into()],
        template_names: vec!["Card 1".into(), "Card 2".into()],
    }
}

pub fn cloze_notetype() -> Notetype {
    Notetype {
        id: CLOZE_NOTETYPE_ID,
        name: "Cloze".into(),
        kind: NotetypeKind::Cloze,
        field_names: vec!["Text".into(), "Extra".into()],
        template_names: vec!["Cloze".into()],
    }
}

pub fn register_notetypes(store: &SqliteCollection<'_>) {
    store.add_notetype(&basic_notetype()).unwrap();
    store.add_notetype(&cloze_notetype()).unwrap();
}

pub fn seed_note(
    store: &SqliteCollection<'_>,
    id: i64,
    notetype_id: i64,
    fields: &[(&str, &str)],
    tags: &[&str],
) -> Note {
    let mut note = Note::new(
        notetype_id,
        NoteFields::from_pairs(fields.iter().copied()).unwrap(),
    );
    note.id = id;
    note.guid = new_guid();
    note.mtime_secs = id / 1000;
    for tag in tags {
        note.add_tag(tag);
    }
    store.insert_note(&note).unwrap();
    note
}

pub fn reviewed_schedule() -> CardSchedule {
    CardSchedule {
        card_type: 2,
        queue: 2,
        interval: 21,
        ease_factor: 2650,
        reps: 9,
        lapses: 1,
        left: 0,
        original_due: 0,
    }
}

pub fn seed_card(
    store: &SqliteCollection<'_>,
    id: i64,
    note_id: i64,
    ordinal: u16,
    schedule: CardSchedule,
) -> Card {
    let mut card = Card::blank(note_id, REVIEW_DECK_ID, ordinal, 0);
    card.id = id;
    card.mtime_secs = id / 1000;
    card.schedule = schedule;
    card.due = if schedule.is_blank() { 1 } else { 19_800 };
    card.flags = 3;
    store.insert_card(&card).unwrap();
    card
}

pub fn seed_review(
    store: &SqliteCollection<'_>,
    id: i64,
    card_id: i64,
    ease: i32,
) -> ReviewLogEntry {
    let entry = ReviewLogEntry {
        id,
        card_id,
        usn: 0,
        ease,
        interval: 4,
        last_interval: 1,
        ease_factor: 2500,
        taken_millis: 6_000,
        review_kind: 1,
    };
    store.insert_revlog(&entry).unwrap();
    entry
}

/// Basic note with two cards; ordinal 0 reviewed three times, ordinal 1 new.
pub fn seed_reviewed_basic_note(store: &SqliteCollection<'_>) -> Note {
    let note = seed_note(
        store,
        NOTE_ID,
        BASIC_NOTETYPE_ID,
        &[("Front", "capital of France"), ("Back", "Paris")],
        &["geo", "europe"],
    );
    seed_card(store, CARD0_ID, NOTE_ID, 0, reviewed_schedule());
    seed_card(store, CARD1_ID, NOTE_ID, 1, CardSchedule::default());
    seed_review(store, 1_600_000_100_000, CARD0_ID, 3);
    seed_review(store, 1_600_000_200_000, CARD0_ID, 1);
    seed_review(store, 1_600_000_300_000, CARD0_ID, 4);
    note
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}
