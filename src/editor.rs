//! Create/edit form state for a single record.

use crate::domain::{Editable, Owner, RecordId};
use crate::error::Result;
use crate::store::{RecordStore, WriteTicket};

/// A local write still to be sent to the remote store
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    Create {
        ticket: WriteTicket,
        fields: serde_json::Value,
    },
    Update {
        ticket: WriteTicket,
        fields: serde_json::Value,
    },
}

impl PendingWrite {
    pub fn ticket(&self) -> WriteTicket {
        match self {
            Self::Create { ticket, .. } | Self::Update { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Clone)]
enum Target {
    New,
    Existing(RecordId),
}

/// Form state bound to a new or existing record
#[derive(Debug, Clone)]
pub struct RecordEditor<R: Editable> {
    open: Option<(Target, R::Draft)>,
}

impl<R: Editable> Default for RecordEditor<R> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<R: Editable> RecordEditor<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty form for a new record
    pub fn open_new(&mut self, draft: R::Draft) {
        self.open = Some((Target::New, draft));
    }

    /// Opens the form pre-filled from an existing record
    pub fn open_existing(&mut self, record: &R) {
        self.open = Some((Target::Existing(record.id()), record.to_draft()));
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Id of the record being edited, `None` for a new one
    pub fn editing(&self) -> Option<RecordId> {
        match &self.open {
            Some((Target::Existing(id), _)) => Some(*id),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&R::Draft> {
        self.open.as_ref().map(|(_, draft)| draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        self.open.as_mut().map(|(_, draft)| draft)
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// Validates the draft and applies it to the store optimistically.
    ///
    /// Closes the form on success. A failed validation leaves the form open
    /// and the store untouched. Returns `Ok(None)` if no form is open.
    pub fn submit(&mut self, store: &mut RecordStore<R>, owner: &Owner) -> Result<Option<PendingWrite>> {
        let Some((target, draft)) = &self.open else {
            return Ok(None);
        };
        R::validate(draft)?;

        let write = match target {
            Target::Existing(id) => {
                let fields = R::update_fields(draft)?;
                let ticket = store.patch(*id, |record| record.apply_draft(draft))?;
                PendingWrite::Update { ticket, fields }
            }
            Target::New => {
                let fields = R::create_fields(draft, owner)?;
                let ticket = store.insert_optimistic(|id| R::placeholder(id, draft, owner));
                PendingWrite::Create { ticket, fields }
            }
        };

        self.close();
        Ok(Some(write))
    }
}
