//! Note copy orchestration.
//!
//! # Responsibility
//! - Run the per-note copy sequence: duplicate, relate, transplant cards,
//!   post-copy tags, usn bump, field blanking, persist.
//! - Drive host callbacks around a batch and aggregate per-note failures.
//!
//! # Invariants
//! - Each note is copied inside its own savepoint; a failure leaves no
//!   partial rows for that note.
//! - Notes are processed sequentially in selection order, each one fully
//!   before the next.
//! - Original notes, cards and review entries are never written; the
//!   relation tag goes on the copy only.

use crate::clock::Clock;
use crate::config::{BatchErrorPolicy, CopyConfig};
use crate::host::{CopyHost, COPY_CHECKPOINT_NAME};
use crate::model::card::CardId;
use crate::model::note::NoteId;
use crate::model::notetype::NotetypeId;
use crate::repo::{CollectionStore, IdTable, RepoError};
use crate::service::card_duplicator::{pair_by_ordinal, transplant};
use crate::service::field_blanking::blank_fields;
use crate::service::id_allocator::IdAllocator;
use crate::service::note_duplicator::duplicate_note;
use crate::service::relation::RelationTagger;
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const NOTE_SAVEPOINT: &str = "note_copy";
const NO_SELECTION_MESSAGE: &str = "Please select at least one note.";
const COPIED_MESSAGE: &str = "Cards copied.";

/// Error for note copy use-cases.
#[derive(Debug)]
pub enum CopyError {
    /// The batch was started without any selected note.
    NoSelection,
    NoteNotFound(NoteId),
    NotetypeNotFound(NotetypeId),
    /// No free id within the probe window starting at `start`.
    IdSpaceExhausted { table: IdTable, start: i64 },
    GuidSpaceExhausted,
    /// Card generation for the copy disagrees with the original's cards.
    CardSetMismatch {
        note_id: NoteId,
        original: Vec<u16>,
        generated: Vec<u16>,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CopyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no notes selected"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::NotetypeNotFound(id) => write!(f, "notetype not found: {id}"),
            Self::IdSpaceExhausted { table, start } => {
                write!(f, "no free id in `{table}` near {start}")
            }
            Self::GuidSpaceExhausted => write!(f, "could not generate an unused note guid"),
            Self::CardSetMismatch {
                note_id,
                original,
                generated,
            } => write!(
                f,
                "note {note_id} has cards for ordinals {original:?} but its copy generated {generated:?}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CopyError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteNotFound(id) => Self::NoteNotFound(id),
            RepoError::NotetypeNotFound(id) => Self::NotetypeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Explicit state shared by every copy step: store, options, clock and the
/// batch id allocator.
pub struct CopyContext<'a, S: CollectionStore> {
    store: &'a S,
    config: &'a CopyConfig,
    allocator: IdAllocator<'a>,
}

impl<'a, S: CollectionStore> CopyContext<'a, S> {
    pub fn new(store: &'a S, config: &'a CopyConfig, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            config,
            allocator: IdAllocator::new(clock),
        }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn config(&self) -> &'a CopyConfig {
        self.config
    }

    pub fn now_millis(&self) -> i64 {
        self.allocator.clock().now_millis()
    }

    pub fn now_secs(&self) -> i64 {
        self.allocator.clock().now_secs()
    }

    /// Allocates a free id in `table`; see `IdAllocator::allocate`.
    pub fn allocate(&mut self, table: IdTable, basis: Option<i64>) -> Result<i64, CopyError> {
        let store = self.store;
        self.allocator.allocate(store, table, basis)
    }
}

/// Result of copying one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCopyOutcome {
    pub original_id: NoteId,
    pub new_note_id: NoteId,
    /// Copy card ids in ordinal order.
    pub card_ids: Vec<CardId>,
    pub copied_log_entries: usize,
    /// Relation tag added to the copy, if any.
    pub relation_tag: Option<String>,
}

/// Per-batch summary.
#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: Vec<NoteCopyOutcome>,
    pub failed: Vec<(NoteId, CopyError)>,
    /// Notes never attempted because an earlier failure aborted the batch.
    pub skipped: Vec<NoteId>,
}

impl CopyReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Tooltip text shown when the batch finishes.
    pub fn summary(&self) -> String {
        if self.is_complete() {
            return COPIED_MESSAGE.to_string();
        }
        let attempted = self.copied.len() + self.failed.len() + self.skipped.len();
        format!(
            "Cards copied for {} of {attempted} note(s).",
            self.copied.len()
        )
    }

    /// Warning text listing failed and skipped notes, `None` when clean.
    pub fn failure_message(&self) -> Option<String> {
        if self.is_complete() {
            return None;
        }
        let mut lines = Vec::with_capacity(self.failed.len() + 1);
        for (note_id, err) in &self.failed {
            lines.push(format!("Note {note_id} was not copied: {err}"));
        }
        if !self.skipped.is_empty() {
            lines.push(format!(
                "{} note(s) skipped after the first failure.",
                self.skipped.len()
            ));
        }
        Some(lines.join("\n"))
    }
}

/// Copies one note inside its own savepoint.
///
/// # Errors
/// - `CopyError::NoteNotFound` when `note_id` does not exist.
/// - `CopyError::CardSetMismatch` when card generation disagrees with the
///   original's cards.
/// - `CopyError::IdSpaceExhausted` / `Repo` for storage failures.
///
/// On error the savepoint is rolled back and no copy rows remain.
pub fn copy_one<S: CollectionStore>(
    ctx: &mut CopyContext<'_, S>,
    note_id: NoteId,
) -> Result<NoteCopyOutcome, CopyError> {
    let started_at = Instant::now();
    ctx.store().begin_savepoint(NOTE_SAVEPOINT)?;

    // A failed release leaves the savepoint open; it must be rolled back like
    // any other failure or later notes nest inside it.
    let result = copy_note_steps(ctx, note_id).and_then(|outcome| {
        ctx.store().release_savepoint(NOTE_SAVEPOINT)?;
        Ok(outcome)
    });
    match result {
        Ok(outcome) => {
            info!(
                "event=note_copy module=copy status=ok note_id={note_id} new_note_id={} cards={} log_entries={} duration_ms={}",
                outcome.new_note_id,
                outcome.card_ids.len(),
                outcome.copied_log_entries,
                started_at.elapsed().as_millis()
            );
            Ok(outcome)
        }
        Err(err) => {
            if let Err(rollback_err) = ctx.store().rollback_savepoint(NOTE_SAVEPOINT) {
                error!(
                    "event=note_copy module=copy status=error note_id={note_id} error_code=rollback_failed error={rollback_err}"
                );
            }
            warn!(
                "event=note_copy module=copy status=error note_id={note_id} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn copy_note_steps<S: CollectionStore>(
    ctx: &mut CopyContext<'_, S>,
    note_id: NoteId,
) -> Result<NoteCopyOutcome, CopyError> {
    let config = ctx.config();
    let original = ctx
        .store()
        .get_note(note_id)?
        .ok_or(CopyError::NoteNotFound(note_id))?;
    let original_cards = ctx.store().cards_of_note(note_id)?;

    let id_basis = config.preserve_creation_time.then_some(original.id);
    let (copy, generated_cards) = duplicate_note(ctx, &original, &original_cards, id_basis)?;

    let mut working = original;
    working.id = copy.id;
    working.guid = copy.guid.clone();

    let mut relation_tag = None;
    if config.relate_copies {
        let tagger = RelationTagger::new(&config.relation_prefixes);
        if !tagger.has_relation(&working) {
            let tag = tagger.relation_tag(ctx.now_millis());
            working.add_tag(&tag);
            relation_tag = Some(tag);
        }
    }

    let pairs = pair_by_ordinal(note_id, original_cards, generated_cards)?;
    let mut card_ids = Vec::with_capacity(pairs.len());
    let mut copied_log_entries = 0;
    for (old, stub) in &pairs {
        let outcome = transplant(ctx, old, stub, config.preserve_schedule, config.copy_log)?;
        card_ids.push(outcome.card.id);
        copied_log_entries += outcome.copied_log_entries;
    }

    for tag in &config.post_copy_tags {
        working.add_tag(tag);
    }
    working.usn = ctx.store().current_usn()?;
    working.mtime_secs = ctx.now_secs();
    blank_fields(&mut working, config);
    ctx.store().update_note(&working)?;

    Ok(NoteCopyOutcome {
        original_id: note_id,
        new_note_id: working.id,
        card_ids,
        copied_log_entries,
        relation_tag,
    })
}

/// Copies every selected note in order and reports through `host`.
///
/// Repeated ids in `note_ids` are copied once. Per-note failures follow
/// `CopyConfig::on_error` and are collected in the returned report.
///
/// # Errors
/// - `CopyError::NoSelection` when `note_ids` is empty. The host receives a
///   warning and nothing is written.
pub fn copy_many<S: CollectionStore, H: CopyHost + ?Sized>(
    ctx: &mut CopyContext<'_, S>,
    host: &mut H,
    note_ids: &[NoteId],
) -> Result<CopyReport, CopyError> {
    if note_ids.is_empty() {
        host.warning(NO_SELECTION_MESSAGE);
        return Err(CopyError::NoSelection);
    }

    let started_at = Instant::now();
    info!(
        "event=copy_batch module=copy status=start notes={}",
        note_ids.len()
    );
    host.checkpoint(COPY_CHECKPOINT_NAME);
    host.progress_start();

    let mut seen = HashSet::new();
    let mut report = CopyReport::default();
    let mut aborted = false;
    for &note_id in note_ids {
        if !seen.insert(note_id) {
            continue;
        }
        if aborted {
            report.skipped.push(note_id);
            continue;
        }
        match copy_one(ctx, note_id) {
            Ok(outcome) => report.copied.push(outcome),
            Err(err) => {
                report.failed.push((note_id, err));
                aborted = ctx.config().on_error == BatchErrorPolicy::Abort;
            }
        }
    }

    host.progress_finish();
    host.reset();
    host.tooltip(&report.summary());
    if let Some(message) = report.failure_message() {
        host.warning(&message);
    }

    info!(
        "event=copy_batch module=copy status={} copied={} failed={} skipped={} duration_ms={}",
        if report.is_complete() { "ok" } else { "partial" },
        report.copied.len(),
        report.failed.len(),
        report.skipped.len(),
        started_at.elapsed().as_millis()
    );
    Ok(report)
}
