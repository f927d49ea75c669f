//! Time-derived id allocation.
//!
//! # Responsibility
//! - Hand out note/card/revlog ids that are free in storage and were not
//!   already handed out during the current batch.
//!
//! # Invariants
//! - Probing starts at the basis (or now) and only moves upward, so ids
//!   allocated from increasing bases stay increasing.
//! - Probing is bounded by `MAX_ID_PROBES`.

use crate::clock::Clock;
use crate::repo::{CollectionStore, IdTable};
use crate::service::copy_service::CopyError;
use log::debug;
use std::collections::HashSet;

/// Upper bound on collision probes for one allocation.
pub const MAX_ID_PROBES: u32 = 10_000;

/// Batch-scoped id allocator.
pub struct IdAllocator<'c> {
    clock: &'c dyn Clock,
    issued: HashSet<(IdTable, i64)>,
}

impl<'c> IdAllocator<'c> {
    pub fn new(clock: &'c dyn Clock) -> Self {
        Self {
            clock,
            issued: HashSet::new(),
        }
    }

    /// Allocates a free id in `table`, starting at `basis` or the current
    /// time in milliseconds.
    ///
    /// # Errors
    /// - `CopyError::IdSpaceExhausted` after `MAX_ID_PROBES` collisions.
    /// - `CopyError::Repo` when the existence probe fails.
    pub fn allocate<S: CollectionStore + ?Sized>(
        &mut self,
        store: &S,
        table: IdTable,
        basis: Option<i64>,
    ) -> Result<i64, CopyError> {
        let start = basis.unwrap_or_else(|| self.clock.now_millis());
        let mut candidate = start;
        for _ in 0..MAX_ID_PROBES {
            if !self.issued.contains(&(table, candidate)) && !store.id_exists(table, candidate)? {
                self.issued.insert((table, candidate));
                if candidate != start {
                    debug!(
                        "event=id_allocate module=copy status=ok table={table} probes={}",
                        candidate - start
                    );
                }
                return Ok(candidate);
            }
            candidate = candidate.checked_add(1).ok_or(CopyError::IdSpaceExhausted {
                table,
                start,
            })?;
        }
        Err(CopyError::IdSpaceExhausted { table, start })
    }

    pub fn clock(&self) -> &'c dyn Clock {
        self.clock
    }
}
