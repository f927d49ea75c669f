//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Host callbacks are recorded and returned, never executed on the Rust
//!   side.

use log::warn;
use notecopy_core::db::open_db;
use notecopy_core::{
    copy_many, copy_menu_action, core_version as core_version_inner,
    init_logging as init_logging_inner, parse_config, CopyConfig, CopyContext, CopyError,
    RecordingHost, SqliteCollection, SystemClock,
};
use std::path::PathBuf;

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Menu entry the host should register for copying notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyActionResponse {
    pub ok: bool,
    pub label: String,
    pub menu: String,
    pub shortcut: String,
    /// Empty on success, parse error otherwise.
    pub message: String,
}

/// Result envelope for one copy batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyNotesResponse {
    /// False when the batch did not run or at least one note failed.
    pub ok: bool,
    /// Tooltip text, or the reason the batch did not run.
    pub message: String,
    /// Ids of the created copies, in selection order.
    pub copied_note_ids: Vec<i64>,
    /// Warning dialogs the host should show.
    pub warnings: Vec<String>,
}

impl CopyNotesResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            copied_note_ids: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Describes the copy menu entry for the given options JSON.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Blank `config_json` uses default options.
#[flutter_rust_bridge::frb(sync)]
pub fn copy_action(config_json: String) -> CopyActionResponse {
    match parse_config(&config_json) {
        Ok(config) => {
            let action = copy_menu_action(&config);
            CopyActionResponse {
                ok: true,
                label: action.label,
                menu: action.menu,
                shortcut: action.shortcut,
                message: String::new(),
            }
        }
        Err(err) => CopyActionResponse {
            ok: false,
            label: String::new(),
            menu: String::new(),
            shortcut: String::new(),
            message: format!("copy_action failed: {err}"),
        },
    }
}

/// Copies the selected notes of the collection at `db_path`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Empty selection returns `ok=false` with the selection warning.
#[flutter_rust_bridge::frb(sync)]
pub fn copy_notes(db_path: String, config_json: String, note_ids: Vec<i64>) -> CopyNotesResponse {
    let config = match parse_config(&config_json) {
        Ok(config) => config,
        Err(err) => return CopyNotesResponse::failure(format!("copy_notes failed: {err}")),
    };
    let db_path = db_path.trim();
    if db_path.is_empty() {
        return CopyNotesResponse::failure("copy_notes failed: db_path cannot be empty");
    }
    let db_path = PathBuf::from(db_path);
    // `open_db` would create an empty collection for a mistyped path.
    if !db_path.is_file() {
        return CopyNotesResponse::failure(format!(
            "copy_notes failed: collection `{}` does not exist",
            db_path.display()
        ));
    }
    run_copy(db_path, &config, &note_ids)
}

fn run_copy(db_path: PathBuf, config: &CopyConfig, note_ids: &[i64]) -> CopyNotesResponse {
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return CopyNotesResponse::failure(format!("collection open failed: {err}")),
    };
    let store = match SqliteCollection::try_new(&conn) {
        Ok(store) => store,
        Err(err) => return CopyNotesResponse::failure(format!("collection init failed: {err}")),
    };

    let clock = SystemClock;
    let mut ctx = CopyContext::new(&store, config, &clock);
    let mut host = RecordingHost::default();
    let result = copy_many(&mut ctx, &mut host, note_ids);
    let warnings = host.warnings().map(str::to_string).collect::<Vec<_>>();

    match result {
        Ok(report) => CopyNotesResponse {
            ok: report.is_complete(),
            message: host.tooltips().last().unwrap_or_default().to_string(),
            copied_note_ids: report
                .copied
                .iter()
                .map(|outcome| outcome.new_note_id)
                .collect(),
            warnings,
        },
        Err(CopyError::NoSelection) => CopyNotesResponse {
            warnings,
            ..CopyNotesResponse::failure("No notes selected.")
        },
        Err(err) => {
            warn!("event=ffi_copy_notes module=ffi status=error error={err}");
            CopyNotesResponse {
                warnings,
                ..CopyNotesResponse::failure(format!("copy_notes failed: {err}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{copy_action, copy_notes, core_version, init_logging};
    use notecopy_core::db::open_db;
    use notecopy_core::{
        Card, CollectionStore, Note, NoteFields, Notetype, NotetypeKind, SqliteCollection,
    };
    use std::path::Path;

    const NOTE_ID: i64 = 1_650_000_000_000;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn copy_action_uses_configured_shortcut() {
        let response = copy_action(r#"{"shortcut-copy": "Ctrl+Shift+D"}"#.to_string());
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.label, "Note Copy");
        assert_eq!(response.menu, "Edit");
        assert_eq!(response.shortcut, "Ctrl+Shift+D");

        let defaults = copy_action(String::new());
        assert_eq!(defaults.shortcut, "Ctrl+C");
    }

    #[test]
    fn copy_action_reports_malformed_config() {
        let response = copy_action("{not json".to_string());
        assert!(!response.ok);
        assert!(response.message.starts_with("copy_action failed"));
    }

    #[test]
    fn copy_notes_copies_seeded_note() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("collection.anki2");
        seed_collection(&db_path);

        let response = copy_notes(
            db_path.to_str().unwrap().to_string(),
            String::new(),
            vec![NOTE_ID],
        );
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.message, "Cards copied.");
        assert_eq!(response.copied_note_ids.len(), 1);
        assert!(response.warnings.is_empty());

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        let notes: i64 = conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(notes, 2);
    }

    #[test]
    fn copy_notes_with_empty_selection_returns_warning() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("collection.anki2");
        seed_collection(&db_path);

        let response = copy_notes(db_path.to_str().unwrap().to_string(), String::new(), vec![]);
        assert!(!response.ok);
        assert_eq!(response.warnings, vec!["Please select at least one note."]);
    }

    #[test]
    fn copy_notes_rejects_blank_path() {
        let response = copy_notes("  ".to_string(), String::new(), vec![NOTE_ID]);
        assert!(!response.ok);
        assert!(response.message.contains("db_path"));
    }

    #[test]
    fn copy_notes_rejects_missing_collection_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("typo.anki2");

        let response = copy_notes(
            db_path.to_str().unwrap().to_string(),
            String::new(),
            vec![NOTE_ID],
        );
        assert!(!response.ok);
        assert!(response.message.contains("does not exist"));
        assert!(!db_path.exists());
    }

    fn seed_collection(path: &Path) {
        let conn = open_db(path).unwrap();
        let store = SqliteCollection::try_new(&conn).unwrap();
        store
            .add_notetype(&Notetype {
                id: 1,
                name: "Basic".into(),
                kind: NotetypeKind::Standard,
                field_names: vec!["Front".into(), "Back".into()],
                template_names: vec!["Card 1".into()],
            })
            .unwrap();
        let mut note = Note::new(
            1,
            NoteFields::from_pairs([("Front", "hola"), ("Back", "hello")]).unwrap(),
        );
        note.id = NOTE_ID;
        store.insert_note(&note).unwrap();
        let mut card = Card::blank(NOTE_ID, 1, 0, 1);
        card.id = NOTE_ID + 1;
        store.insert_card(&card).unwrap();
    }
}
