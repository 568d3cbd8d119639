//! A record store wired to its remote table.

use crate::{
    domain::{search_contacts, Contact, Editable, Owner, RecordId, Task},
    editor::{PendingWrite, RecordEditor},
    error::{CrmError, Result},
    remote::{list_as, ListQuery, RemoteStore, Table},
    store::{Completion, RecordStore, WriteTicket},
};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{future::Future, sync::Arc};

/// Result of a remote write, ready to be applied to the store
#[derive(Debug)]
pub struct WriteOutcome {
    pub ticket: WriteTicket,
    pub result: Result<Value>,
}

/// Sends a pending write to the remote store.
///
/// The returned future owns everything it needs, so several writes can be in
/// flight while the store keeps serving reads and local edits.
pub fn send_write(
    remote: Arc<dyn RemoteStore>,
    table: Table,
    write: PendingWrite,
) -> impl Future<Output = WriteOutcome> + Send + 'static {
    async move {
        let ticket = write.ticket();
        let result = match write {
            PendingWrite::Create { fields, .. } => remote.create(table, fields).await,
            PendingWrite::Update { fields, .. } => remote.update(table, ticket.id, fields).await,
        };
        WriteOutcome { ticket, result }
    }
}

/// Records of one table, kept locally and persisted optimistically
pub struct RecordCollection<R: Editable> {
    table: Table,
    store: RecordStore<R>,
    editor: RecordEditor<R>,
    remote: Arc<dyn RemoteStore>,
    owner: Owner,
}

impl<R> RecordCollection<R>
where
    R: Editable + DeserializeOwned,
{
    pub fn new(table: Table, remote: Arc<dyn RemoteStore>, owner: Owner) -> Self {
        Self {
            table,
            store: RecordStore::new(table.as_str()),
            editor: RecordEditor::new(),
            remote,
            owner,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<R> {
        &mut self.store
    }

    pub fn editor(&self) -> &RecordEditor<R> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RecordEditor<R> {
        &mut self.editor
    }

    pub fn remote(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.remote)
    }

    /// Replaces the local records with the table's default listing
    pub async fn load(&mut self) -> Result<()> {
        self.load_query(&ListQuery::all(self.table)).await
    }

    /// Replaces the local records with a filtered listing.
    ///
    /// On failure the current records are kept and the error is returned.
    pub async fn load_query(&mut self, query: &ListQuery) -> Result<()> {
        match list_as::<R>(self.remote.as_ref(), self.table, query).await {
            Ok(records) => {
                debug!("{}: loaded {} records", self.table, records.len());
                self.store.replace_all(records);
                Ok(())
            }
            Err(err) => {
                error!("Failed to fetch {}: {}", self.table, err);
                Err(err)
            }
        }
    }

    /// Applies the open form to the store; the write still has to be sent
    pub fn submit_local(&mut self) -> Result<Option<PendingWrite>> {
        self.editor.submit(&mut self.store, &self.owner)
    }

    /// Applies a local change plus the fields that persist it
    pub fn patch_local(
        &mut self,
        id: RecordId,
        change: impl FnOnce(&mut R),
        fields: Value,
    ) -> Result<PendingWrite> {
        let ticket = self.store.patch(id, change)?;
        Ok(PendingWrite::Update { ticket, fields })
    }

    /// Starts sending a write without holding on to the collection
    pub fn send(&self, write: PendingWrite) -> impl Future<Output = WriteOutcome> + Send + 'static {
        send_write(self.remote(), self.table, write)
    }

    /// Applies a finished remote write: confirms it (adopting the server's
    /// copy of the record when it can be read) or, if the remote store
    /// refused it, rolls the local change back.
    pub fn complete(&mut self, outcome: WriteOutcome) -> Result<Completion> {
        let WriteOutcome { ticket, result } = outcome;

        match result {
            Ok(row) => match serde_json::from_value::<R>(row) {
                Ok(record) => Ok(self.store.confirm(ticket, Some(record))),
                Err(err) => {
                    // The write went through; keep the local copy as saved
                    warn!(
                        "Saved {} {} but could not read the stored row: {}",
                        self.table, ticket.id, err
                    );
                    Ok(self.store.confirm(ticket, None))
                }
            },
            Err(err) => {
                error!("Failed to save {} {}: {}", self.table, ticket.id, err);
                self.store.fail(ticket, err.to_string());
                Err(err)
            }
        }
    }

    /// Sends a write and applies its outcome
    pub async fn persist(&mut self, write: PendingWrite) -> Result<Completion> {
        let outcome = self.send(write).await;
        self.complete(outcome)
    }

    /// Submits the open form and waits for the remote store
    pub async fn submit(&mut self) -> Result<Option<Completion>> {
        match self.submit_local()? {
            Some(write) => self.persist(write).await.map(Some),
            None => Ok(None),
        }
    }
}

impl RecordCollection<Contact> {
    /// Contacts matching a search term, in list order
    pub fn search(&self, term: &str) -> Vec<&Contact> {
        search_contacts(self.store.iter(), term)
    }
}

impl RecordCollection<Task> {
    /// Flips a task between completed and pending, locally first
    pub fn toggle_status_local(&mut self, id: RecordId) -> Result<PendingWrite> {
        let next = self
            .store
            .get(id)
            .ok_or_else(|| CrmError::RecordNotFound {
                table: self.table.to_string(),
                id: id.to_string(),
            })?
            .status
            .toggled();

        let fields = serde_json::json!({ "status": serde_json::to_value(next)? });
        self.patch_local(id, |task| task.status = next, fields)
    }

    pub async fn toggle_status(&mut self, id: RecordId) -> Result<Completion> {
        let write = self.toggle_status_local(id)?;
        self.persist(write).await
    }
}
