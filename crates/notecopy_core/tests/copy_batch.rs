mod common;

use common::*;
use notecopy_core::db::open_db_in_memory;
use notecopy_core::{
    copy_many, BatchErrorPolicy, Card, CardId, CollectionStore, CopyConfig, CopyContext,
    CopyError, FixedClock, HostEvent, IdTable, Note, NoteId, Notetype, NotetypeId, RecordingHost,
    RepoError, RepoResult, ReviewLogEntry, SqliteCollection,
};
use std::cell::Cell;

#[test]
fn empty_selection_warns_once_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn).unwrap();
    register_notetypes(&store);
    seed_reviewed_basic_note(&store);

    let config = CopyConfig::default();
    let clock = FixedClock(NOW_MS);
    let mut ctx = CopyContext::new(&store, &config, &clock);
    let mut host = RecordingHost::default();
    let err = copy_many(&mut ctx, &mut host, &[]).unwrap_err();

    assert!(matches!(err, CopyError::NoSelection));
    assert_eq!(
        host.events,
        vec![HostEvent::Warning("Please select at least one note.".into())]
    );
    assert_eq!(count_rows(&conn, "notes"), 1);
}

#[test]
fn successful_batch_drives_host_in_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn).unwrap();
    register_notetypes(&store);
    seed_reviewed_basic_note(&store);

    let config = CopyConfig::default();
    let clock = FixedClock(NOW_MS);
    let mut ctx = CopyContext::new(&store, &config, &clock);
    let mut host = RecordingHost::default();
    let report = copy_many(&mut ctx, &mut host, &[NOTE_ID]).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.copied.len(), 1);
    assert_eq!(
        host.events,
        vec![
            HostEvent::Checkpoint("Copy Notes".into()),
            HostEvent::ProgressStart,
            HostEvent::ProgressFinish,
            HostEvent::Reset,
            HostEvent::Tooltip("Cards copied.".into()),
        ]
    );
}

#[test]
fn continue_policy_copies_remaining_notes_and_warns_once() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn).unwrap();
    register_notetypes(&store);
    seed_reviewed_basic_note(&store);
    let second_id = NOTE_ID + 50;
    seed_note(
        &store,
        second_id,
        BASIC_NOTETYPE_ID,
        &[("Front", "2 + 2"), ("Back", "4")],
        &["math"],
    );
    seed_card(&store, second_id + 1, second_id, 0, Default::default());
    seed_card(&store, second_id + 2, second_id, 1, Default::default());

    let config = CopyConfig::default();
    let clock = FixedClock(NOW_MS);
    let mut ctx = CopyContext::new(&store, &config, &clock);
    let mut host = RecordingHost::default();
    let report = copy_many(&mut ctx, &mut host, &[NOTE_ID, 999, second_id]).unwrap();

    let copied: Vec<i64> = report.copied.iter().map(|outcome| outcome.original_id).collect();
    assert_eq!(copied, vec![NOTE_ID, second_id]);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0], (999, CopyError::NoteNotFound(999))));
    assert!(report.skipped.is_empty());

    assert_eq!(
        host.tooltips().collect::<Vec<_>>(),
        vec!["Cards copied for 2 of 3 note(s)."]
    );
    let warnings: Vec<&str> = host.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Note 999 was not copied"));
    assert_eq!(count_rows(&conn, "notes"), 4);
}

#[test]
fn abort_policy_skips_notes_after_first_failure() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn).unwrap();
    register_notetypes(&store);
    seed_reviewed_basic_note(&store);

    let config = CopyConfig {
        on_error: BatchErrorPolicy::Abort,
        ..CopyConfig::default()
    };
    let clock = FixedClock(NOW_MS);
    let mut ctx = CopyContext::new(&store, &config, &clock);
    let mut host = RecordingHost::default();
    let report = copy_many(&mut ctx, &mut host, &[999, NOTE_ID]).unwrap();

    assert!(report.copied.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.skipped, vec![NOTE_ID]);
    let warnings: Vec<&str> = host.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("1 note(s) skipped"));
    assert_eq!(count_rows(&conn, "notes"), 1);
}

#[test]
fn repeated_ids_in_selection_are_copied_once() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollection::try_new(&conn).unwrap();
    register_notetypes(&store);
    seed_reviewed_basic_note(&store);

    let config = CopyConfig::default();
    let clock = FixedClock(NOW_MS);
    let mut ctx = CopyContext::new(&store, &config, &clock);
    let mut host = RecordingHost::default();
    let report = copy_many(&mut ctx, &mut host, &[NOTE_ID, NOTE_ID, NOTE_ID]).unwrap();

    assert_eq!(report.copied.len(), 1);
    assert!(report.is_complete());
    assert_eq!(count_rows(&conn, "notes"), 2);
}

/// Store whose next savepoint release fails once, as a busy commit would.
struct FailingRelease<'conn> {
    inner: SqliteCollection<'conn>,
    fail_next_release: Cell<bool>,
}

impl CollectionStore for FailingRelease<'_> {
    fn current_usn(&self) -> RepoResult<i32> {
        self.inner.current_usn()
    }
    fn next_new_position(&self) -> RepoResult<i64> {
        self.inner.next_new_position()
    }
    fn id_exists(&self, table: IdTable, id: i64) -> RepoResult<bool> {
        self.inner.id_exists(table, id)
    }
    fn guid_exists(&self, guid: &str) -> RepoResult<bool> {
        self.inner.guid_exists(guid)
    }
    fn get_notetype(&self, id: NotetypeId) -> RepoResult<Option<Notetype>> {
        self.inner.get_notetype(id)
    }
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.inner.get_note(id)
    }
    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        self.inner.insert_note(note)
    }
    fn update_note(&self, note: &Note) -> RepoResult<()> {
        self.inner.update_note(note)
    }
    fn cards_of_note(&self, note_id: NoteId) -> RepoResult<Vec<Card>> {
        self.inner.cards_of_note(note_id)
    }
    fn insert_card(&self, card: &Card) -> RepoResult<()> {
        self.inner.insert_card(card)
    }
    fn update_card(&self, card: &Card) -> RepoResult<()> {
        self.inner.update_card(card)
    }
    fn revlog_for_card(&self, card_id: CardId) -> RepoResult<Vec<ReviewLogEntry>> {
        self.inner.revlog_for_card(card_id)
    }
    fn insert_revlog(&self, entry: &ReviewLogEntry) -> RepoResult<()> {
        self.inner.insert_revlog(entry)
    }
    fn begin_savepoint(&self, name: &str) -> RepoResult<()> {
        self.inner.begin_savepoint(name)
    }
    fn release_savepoint(&self, name: &str) -> RepoResult<()> {
        if self.fail_next_release.replace(false) {
            return Err(RepoError::InvalidData("database is locked".into()));
        }
        self.inner.release_savepoint(name)
    }
    fn rollback_savepoint(&self, name: &str) -> RepoResult<()> {
        self.inner.rollback_savepoint(name)
    }
}

#[test]
fn failed_release_rolls_back_note_and_later_notes_still_commit() {
    let conn = open_db_in_memory().unwrap();
    let inner = SqliteCollection::try_new(&conn).unwrap();
    register_notetypes(&inner);
    seed_reviewed_basic_note(&inner);
    let second_id = NOTE_ID + 50;
    seed_note(
        &inner,
        second_id,
        BASIC_NOTETYPE_ID,
        &[("Front", "2 + 2"), ("Back", "4")],
        &[],
    );
    seed_card(&inner, second_id + 1, second_id, 0, Default::default());
    seed_card(&inner, second_id + 2, second_id, 1, Default::default());
    let store = FailingRelease {
        inner,
        fail_next_release: Cell::new(true),
    };

    let config = CopyConfig::default();
    let clock = FixedClock(NOW_MS);
    let mut ctx = CopyContext::new(&store, &config, &clock);
    let mut host = RecordingHost::default();
    let report = copy_many(&mut ctx, &mut host, &[NOTE_ID, second_id]).unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, NOTE_ID);
    let copied: Vec<i64> = report.copied.iter().map(|outcome| outcome.original_id).collect();
    assert_eq!(copied, vec![second_id]);

    assert!(conn.is_autocommit(), "no savepoint may stay open");
    assert_eq!(count_rows(&conn, "notes"), 3);
    let copy_id = report.copied[0].new_note_id;
    assert!(store.get_note(copy_id).unwrap().is_some());
    assert_eq!(count_rows(&conn, "revlog"), 3);
}
