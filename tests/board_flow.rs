//! End-to-end pipeline flow against the JSON-file backend.
#![cfg(feature = "file-storage")]

use crm_core::{
    domain::{ContactDraft, PipelineDraft, TaskDraft},
    remote::{FileStore, RemoteStore},
    reports::{ContactDetails, DashboardStats},
    Completion, Contact, LeadStage, Owner, PipelineBoard, RecordCollection, Table, Task,
    TaskStatus,
};
use std::sync::Arc;
use tempfile::TempDir;

async fn backend() -> (TempDir, Arc<dyn RemoteStore>) {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    store.initialize().await.unwrap();
    (dir, Arc::new(store))
}

fn lead_draft(name: &str, stage: LeadStage) -> PipelineDraft {
    let mut draft = PipelineDraft::empty(stage);
    draft.name = name.to_string();
    draft.source = "Website".to_string();
    draft.value = 1200.0;
    draft
}

#[tokio::test]
async fn test_created_lead_moves_and_persists() {
    let (_dir, remote) = backend().await;
    let mut board = PipelineBoard::leads(remote.clone(), Owner::default());
    board.load().await.unwrap();

    board
        .records_mut()
        .editor_mut()
        .open_new(lead_draft("Cloud migration", LeadStage::New));
    board.records_mut().submit().await.unwrap();

    let lead = board.records().store().iter().next().unwrap().clone();
    assert!(!lead.id.is_temporary());
    assert_eq!(lead.owner, Owner::default());
    assert!(matches!(lead.score, Some(60..=99)));

    board.drag_start_payload(&lead.id.to_string()).unwrap();
    board.hover_enter(LeadStage::Proposal);
    let completion = board.drop(LeadStage::Proposal).await.unwrap();
    assert_eq!(completion, Some(Completion::Applied));

    // A fresh board sees the stored stage
    let mut reloaded = PipelineBoard::leads(remote, Owner::default());
    reloaded.load().await.unwrap();
    let columns = reloaded.columns();
    assert!(columns.column(LeadStage::New).unwrap().is_empty());
    assert_eq!(columns.column(LeadStage::Proposal).unwrap().ids(), vec![lead.id]);
}

#[tokio::test]
async fn test_newest_lead_listed_first() {
    let (_dir, remote) = backend().await;
    let mut board = PipelineBoard::leads(remote.clone(), Owner::default());

    for name in ["First", "Second"] {
        board
            .records_mut()
            .editor_mut()
            .open_new(lead_draft(name, LeadStage::Contacted));
        board.records_mut().submit().await.unwrap();
    }

    let mut reloaded = PipelineBoard::leads(remote, Owner::default());
    reloaded.load().await.unwrap();
    let names: Vec<_> = reloaded
        .columns()
        .column(LeadStage::Contacted)
        .unwrap()
        .items
        .iter()
        .map(|lead| lead.name.clone())
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_contact_details_and_dashboard() {
    let (_dir, remote) = backend().await;

    let mut contacts: RecordCollection<Contact> =
        RecordCollection::new(Table::Contacts, remote.clone(), Owner::default());
    contacts.editor_mut().open_new(ContactDraft {
        name: "Meera Nair".to_string(),
        email: "meera@infra.io".to_string(),
        company: "Infra".to_string(),
        tags: "vip, , enterprise".to_string(),
        ..Default::default()
    });
    contacts.submit().await.unwrap();
    let contact = contacts.store().iter().next().unwrap().clone();
    assert_eq!(contact.tags, vec!["vip", "enterprise"]);

    let mut tasks: RecordCollection<Task> =
        RecordCollection::new(Table::Tasks, remote.clone(), Owner::default());
    let due = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    tasks.editor_mut().open_new(TaskDraft::new("Send proposal", due));
    tasks.submit().await.unwrap();
    let task_id = tasks.store().iter().next().unwrap().id;

    remote
        .update(
            Table::Tasks,
            task_id,
            serde_json::json!({ "contactId": contact.id.value() }),
        )
        .await
        .unwrap();

    let details = ContactDetails::load(remote.as_ref(), contact.id).await.unwrap();
    assert_eq!(details.contact.name, "Meera Nair");
    assert!(details.deals.is_empty());
    assert_eq!(details.tasks.len(), 1);

    tasks.load().await.unwrap();
    tasks.toggle_status(task_id).await.unwrap();
    assert_eq!(
        tasks.store().get(task_id).unwrap().status,
        TaskStatus::Completed
    );

    let stats = DashboardStats::load(remote.as_ref()).await.unwrap();
    assert_eq!(stats.open_tasks, 0);
    assert!(stats.upcoming.is_empty());
}
