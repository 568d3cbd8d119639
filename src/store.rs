//! Owned, optimistic record collection.
//!
//! A [`RecordStore`] is the single source of truth for one kind of record on
//! the client side. Every local write happens in two phases: the change is
//! applied immediately and a [`WriteTicket`] is handed out; once the remote
//! store answers, the ticket is either confirmed or failed. Tickets carry a
//! per-record sequence number so answers that arrive out of order cannot
//! overwrite a newer local write.

use crate::domain::{BoardRecord, Identified, LeadStage, RecordId};
use crate::error::{CrmError, Result};
use log::{debug, warn};

/// Remote acknowledgement state of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Synced,
    Pending,
    Failed(String),
}

/// Handle for a local write awaiting its remote outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTicket {
    pub id: RecordId,
    seq: u64,
}

impl WriteTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened when a ticket was completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer write to the same record was issued after this one
    Stale,
    /// The record is gone (reloaded, or replaced by its server copy)
    Missing,
}

#[derive(Debug, Clone)]
enum Rollback<R> {
    Nothing,
    Restore(R),
    Remove,
}

#[derive(Debug, Clone)]
struct Entry<R> {
    record: R,
    state: SyncState,
    seq: u64,
    rollback: Rollback<R>,
}

impl<R> Entry<R> {
    fn synced(record: R) -> Self {
        Self {
            record,
            state: SyncState::Synced,
            seq: 0,
            rollback: Rollback::Nothing,
        }
    }
}

/// Client-side collection of records with optimistic writes
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    name: &'static str,
    entries: Vec<Entry<R>>,
    next_seq: u64,
    next_temp_id: i64,
}

impl<R: Identified + Clone> RecordStore<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            next_seq: 1,
            next_temp_id: -1,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replaces the whole collection with freshly loaded records.
    ///
    /// Tickets issued before the reload complete as stale or missing.
    pub fn replace_all(&mut self, records: Vec<R>) {
        self.entries = records.into_iter().map(Entry::synced).collect();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in collection order
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn to_vec(&self) -> Vec<R> {
        self.iter().cloned().collect()
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.position(id).map(|i| &self.entries[i].record)
    }

    /// Looks up a record from a textual id such as a drag payload
    pub fn find_by_text(&self, text: &str) -> Option<&R> {
        let id = text.parse::<RecordId>().ok()?;
        self.get(id)
    }

    pub fn sync_state(&self, id: RecordId) -> Option<&SyncState> {
        self.position(id).map(|i| &self.entries[i].state)
    }

    /// Ids of records whose last write is still in flight
    pub fn pending_ids(&self) -> Vec<RecordId> {
        self.entries
            .iter()
            .filter(|e| e.state == SyncState::Pending)
            .map(|e| e.record.id())
            .collect()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.entries.iter().position(|e| e.record.id() == id)
    }

    fn not_found(&self, id: RecordId) -> CrmError {
        CrmError::RecordNotFound {
            table: self.name.to_string(),
            id: id.to_string(),
        }
    }

    fn issue(&mut self, id: RecordId) -> WriteTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        WriteTicket { id, seq }
    }

    /// Applies a local change to one record and marks it pending
    pub fn patch(&mut self, id: RecordId, change: impl FnOnce(&mut R)) -> Result<WriteTicket> {
        let index = self.position(id).ok_or_else(|| self.not_found(id))?;
        if matches!(self.entries[index].rollback, Rollback::Remove) {
            return Err(CrmError::Unsaved(id.to_string()));
        }
        let ticket = self.issue(id);
        let entry = &mut self.entries[index];

        if entry.state != SyncState::Pending {
            entry.rollback = Rollback::Restore(entry.record.clone());
        }
        change(&mut entry.record);
        entry.state = SyncState::Pending;
        entry.seq = ticket.seq;

        debug!("{}: optimistic update of {} (seq {})", self.name, id, ticket.seq);
        Ok(ticket)
    }

    /// Prepends a placeholder built around a fresh temporary id
    pub fn insert_optimistic(&mut self, build: impl FnOnce(RecordId) -> R) -> WriteTicket {
        let id = RecordId::new(self.next_temp_id);
        self.next_temp_id -= 1;
        let ticket = self.issue(id);

        self.entries.insert(
            0,
            Entry {
                record: build(id),
                state: SyncState::Pending,
                seq: ticket.seq,
                rollback: Rollback::Remove,
            },
        );

        debug!("{}: optimistic insert under temporary id {}", self.name, id);
        ticket
    }

    /// Records a successful remote write.
    ///
    /// When the server returns its copy of the record it replaces the local
    /// one in place, which is how temporary ids are swapped for real ones.
    pub fn confirm(&mut self, ticket: WriteTicket, server: Option<R>) -> Completion {
        let Some(index) = self.position(ticket.id) else {
            warn!("{}: confirmation for unknown record {}", self.name, ticket.id);
            return Completion::Missing;
        };
        let entry = &mut self.entries[index];

        if entry.seq != ticket.seq {
            // An older write landed; it becomes the new rollback point.
            if let Some(server) = server {
                if matches!(entry.rollback, Rollback::Restore(_)) {
                    entry.rollback = Rollback::Restore(server);
                }
            }
            warn!(
                "{}: ignoring stale confirmation for {} (seq {}, current {})",
                self.name, ticket.id, ticket.seq, entry.seq
            );
            return Completion::Stale;
        }

        if let Some(server) = server {
            entry.record = server;
        }
        entry.state = SyncState::Synced;
        entry.rollback = Rollback::Nothing;
        Completion::Applied
    }

    /// Records a failed remote write, rolling the record back to its last
    /// confirmed value. A failed create removes the placeholder.
    pub fn fail(&mut self, ticket: WriteTicket, reason: impl Into<String>) -> Completion {
        let Some(index) = self.position(ticket.id) else {
            warn!("{}: failure for unknown record {}", self.name, ticket.id);
            return Completion::Missing;
        };

        if self.entries[index].seq != ticket.seq {
            warn!(
                "{}: ignoring stale failure for {} (seq {})",
                self.name, ticket.id, ticket.seq
            );
            return Completion::Stale;
        }

        let rollback = std::mem::replace(&mut self.entries[index].rollback, Rollback::Nothing);
        match rollback {
            Rollback::Remove => {
                self.entries.remove(index);
            }
            Rollback::Restore(previous) => {
                let entry = &mut self.entries[index];
                entry.record = previous;
                entry.state = SyncState::Failed(reason.into());
            }
            Rollback::Nothing => {
                self.entries[index].state = SyncState::Failed(reason.into());
            }
        }
        Completion::Applied
    }
}

impl<R: BoardRecord + Clone> RecordStore<R> {
    /// Moves a record to another stage.
    ///
    /// Returns `Ok(None)` without touching anything when the record is
    /// already in that stage.
    pub fn move_to_stage(&mut self, id: RecordId, stage: LeadStage) -> Result<Option<WriteTicket>> {
        let current = self.get(id).ok_or_else(|| self.not_found(id))?.stage();
        if current == stage {
            return Ok(None);
        }
        self.patch(id, |record| record.set_stage(stage)).map(Some)
    }
}
