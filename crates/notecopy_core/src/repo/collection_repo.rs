//! SQLite-backed collection store.
//!
//! # Responsibility
//! - Implement `CollectionStore` over one migrated connection.
//! - Provide host-side seeding helpers (`add_notetype`).
//!
//! # Invariants
//! - The store borrows the connection; callers own transactions outside
//!   the per-note savepoints opened through the trait.
//! - Savepoint names are plain identifiers chosen by this crate.

use crate::db::DbError;
use crate::model::card::{Card, CardId};
use crate::model::note::{Note, NoteId};
use crate::model::notetype::{Notetype, NotetypeId};
use crate::model::revlog::ReviewLogEntry;
use crate::repo::{card_repo, note_repo, revlog_repo};
use crate::repo::{CollectionStore, IdTable, RepoError, RepoResult};
use rusqlite::{Connection, OptionalExtension};

const REQUIRED_TABLES: &[&str] = &[
    "col",
    "notetypes",
    "fields",
    "templates",
    "notes",
    "cards",
    "revlog",
];

/// Collection store over a migrated SQLite connection.
pub struct SqliteCollection<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollection<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for &table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Registers a notetype with its fields and templates.
    pub fn add_notetype(&self, notetype: &Notetype) -> RepoResult<()> {
        let usn = self.current_usn()?;
        note_repo::insert_notetype(self.conn, notetype, usn)
    }

    /// Sets the collection update sequence number (sync bookkeeping).
    pub fn set_usn(&self, usn: i32) -> RepoResult<()> {
        self.conn
            .execute("UPDATE col SET usn = ?1 WHERE id = 1;", [usn])?;
        Ok(())
    }

    fn savepoint_name(name: &str) -> RepoResult<&str> {
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(name)
        } else {
            Err(RepoError::InvalidData(format!(
                "savepoint name `{name}` must be a plain identifier"
            )))
        }
    }
}

impl CollectionStore for SqliteCollection<'_> {
    fn current_usn(&self) -> RepoResult<i32> {
        self.conn
            .query_row("SELECT usn FROM col WHERE id = 1;", [], |row| row.get(0))
            .optional()?
            .ok_or(RepoError::Db(DbError::MissingCollectionRow))
    }

    fn next_new_position(&self) -> RepoResult<i64> {
        let position: i64 = self
            .conn
            .query_row("SELECT next_pos FROM col WHERE id = 1;", [], |row| row.get(0))
            .optional()?
            .ok_or(RepoError::Db(DbError::MissingCollectionRow))?;
        self.conn
            .execute("UPDATE col SET next_pos = ?1 WHERE id = 1;", [position + 1])?;
        Ok(position)
    }

    fn id_exists(&self, table: IdTable, id: i64) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
                table.table_name()
            ),
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn guid_exists(&self, guid: &str) -> RepoResult<bool> {
        note_repo::guid_exists(self.conn, guid)
    }

    fn get_notetype(&self, id: NotetypeId) -> RepoResult<Option<Notetype>> {
        note_repo::load_notetype(self.conn, id)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        note_repo::load_note(self.conn, id)
    }

    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        note_repo::insert_note(self.conn, note)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        note_repo::update_note(self.conn, note)
    }

    fn cards_of_note(&self, note_id: NoteId) -> RepoResult<Vec<Card>> {
        card_repo::cards_of_note(self.conn, note_id)
    }

    fn insert_card(&self, card: &Card) -> RepoResult<()> {
        card_repo::insert_card(self.conn, card)
    }

    fn update_card(&self, card: &Card) -> RepoResult<()> {
        card_repo::update_card(self.conn, card)
    }

    fn revlog_for_card(&self, card_id: CardId) -> RepoResult<Vec<ReviewLogEntry>> {
        revlog_repo::revlog_for_card(self.conn, card_id)
    }

    fn insert_revlog(&self, entry: &ReviewLogEntry) -> RepoResult<()> {
        revlog_repo::insert_revlog(self.conn, entry)
    }

    fn begin_savepoint(&self, name: &str) -> RepoResult<()> {
        let name = Self::savepoint_name(name)?;
        self.conn.execute_batch(&format!("SAVEPOINT {name};"))?;
        Ok(())
    }

    fn release_savepoint(&self, name: &str) -> RepoResult<()> {
        let name = Self::savepoint_name(name)?;
        self.conn.execute_batch(&format!("RELEASE {name};"))?;
        Ok(())
    }

    fn rollback_savepoint(&self, name: &str) -> RepoResult<()> {
        let name = Self::savepoint_name(name)?;
        self.conn
            .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name};"))?;
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
