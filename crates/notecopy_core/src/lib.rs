//! Core note copy logic for a spaced-repetition card collection.
//! This crate is the single source of truth for copy invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{load_config, parse_config, BatchErrorPolicy, ConfigError, CopyConfig};
pub use host::{copy_menu_action, CopyHost, HostEvent, MenuAction, RecordingHost};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::card::{Card, CardId, CardSchedule};
pub use model::note::{Note, NoteFields, NoteId, NoteValidationError};
pub use model::notetype::{Notetype, NotetypeId, NotetypeKind};
pub use model::revlog::{ReviewLogEntry, RevlogId};
pub use repo::{CollectionStore, IdTable, RepoError, RepoResult, SqliteCollection};
pub use service::copy_service::{
    copy_many, copy_one, CopyContext, CopyError, CopyReport, NoteCopyOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
