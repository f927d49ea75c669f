//! Collection store contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow record-store interface the copy workflow needs.
//! - Isolate SQL details from copy orchestration.
//!
//! # Invariants
//! - Writes never delete rows; copies are inserted next to their originals.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repository APIs return semantic errors (`NoteNotFound`) in addition to
//!   DB transport errors.

use crate::db::DbError;
use crate::model::card::{Card, CardId};
use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::model::notetype::{Notetype, NotetypeId};
use crate::model::revlog::ReviewLogEntry;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod card_repo;
mod collection_repo;
mod note_repo;
mod revlog_repo;

pub use collection_repo::SqliteCollection;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for collection persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(NoteValidationError),
    NoteNotFound(NoteId),
    CardNotFound(CardId),
    NotetypeNotFound(NotetypeId),
    /// Required table is missing from the connection schema.
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::CardNotFound(id) => write!(f, "card not found: {id}"),
            Self::NotetypeNotFound(id) => write!(f, "notetype not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "collection store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted collection data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Tables whose primary keys are time-derived ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdTable {
    Notes,
    Cards,
    Revlog,
}

impl IdTable {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Cards => "cards",
            Self::Revlog => "revlog",
        }
    }
}

impl Display for IdTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Record-store interface consumed by the copy workflow.
pub trait CollectionStore {
    /// Update sequence number stamped on rows written in this session.
    fn current_usn(&self) -> RepoResult<i32>;
    /// Reserves and returns the next new-card queue position.
    fn next_new_position(&self) -> RepoResult<i64>;
    fn id_exists(&self, table: IdTable, id: i64) -> RepoResult<bool>;
    fn guid_exists(&self, guid: &str) -> RepoResult<bool>;

    fn get_notetype(&self, id: NotetypeId) -> RepoResult<Option<Notetype>>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn insert_note(&self, note: &Note) -> RepoResult<()>;
    fn update_note(&self, note: &Note) -> RepoResult<()>;

    /// Cards of one note, sorted by ordinal.
    fn cards_of_note(&self, note_id: NoteId) -> RepoResult<Vec<Card>>;
    fn insert_card(&self, card: &Card) -> RepoResult<()>;
    fn update_card(&self, card: &Card) -> RepoResult<()>;

    /// Review entries of one card, sorted by id.
    fn revlog_for_card(&self, card_id: CardId) -> RepoResult<Vec<ReviewLogEntry>>;
    fn insert_revlog(&self, entry: &ReviewLogEntry) -> RepoResult<()>;

    fn begin_savepoint(&self, name: &str) -> RepoResult<()>;
    fn release_savepoint(&self, name: &str) -> RepoResult<()>;
    fn rollback_savepoint(&self, name: &str) -> RepoResult<()>;
}
