//! Kanban pipeline boards for leads and deals.

use crate::{
    collection::{RecordCollection, WriteOutcome},
    domain::{build_columns, BoardConfig, BoardRecord, BoardView, Deal, Editable, Lead, LeadStage, Owner, RecordId},
    drag::{DragController, MoveIntent},
    editor::PendingWrite,
    error::{CrmError, Result},
    remote::{RemoteStore, Table},
    store::Completion,
};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::{future::Future, sync::Arc};

/// A record collection shown as stage columns, with drag handling
pub struct PipelineBoard<R: Editable> {
    config: BoardConfig,
    records: RecordCollection<R>,
    drag: DragController,
}

impl PipelineBoard<Lead> {
    pub fn leads(remote: Arc<dyn RemoteStore>, owner: Owner) -> Self {
        Self::new(Table::Leads, BoardConfig::lead_pipeline(), remote, owner)
    }
}

impl PipelineBoard<Deal> {
    pub fn deals(remote: Arc<dyn RemoteStore>, owner: Owner) -> Self {
        Self::new(Table::Deals, BoardConfig::deal_pipeline(), remote, owner)
    }
}

impl<R> PipelineBoard<R>
where
    R: Editable + BoardRecord + DeserializeOwned,
{
    pub fn new(table: Table, config: BoardConfig, remote: Arc<dyn RemoteStore>, owner: Owner) -> Self {
        Self {
            config,
            records: RecordCollection::new(table, remote, owner),
            drag: DragController::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn records(&self) -> &RecordCollection<R> {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut RecordCollection<R> {
        &mut self.records
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub async fn load(&mut self) -> Result<()> {
        self.records.load().await
    }

    /// Current columns, derived from the store on every call
    pub fn columns(&self) -> BoardView<'_, R> {
        build_columns(self.records.store().iter(), &self.config)
    }

    pub fn drag_start(&mut self, record: RecordId) {
        self.drag.drag_start(record);
    }

    pub fn drag_start_payload(&mut self, payload: &str) -> Result<RecordId> {
        self.drag.drag_start_payload(payload)
    }

    pub fn hover_enter(&mut self, stage: LeadStage) {
        self.drag.hover_enter(stage);
    }

    pub fn hover_leave(&mut self, stage: LeadStage) {
        self.drag.hover_leave(stage);
    }

    pub fn drag_end(&mut self) {
        self.drag.drag_end();
    }

    /// Ends the drag on `target` and applies the move locally.
    ///
    /// Returns the stage update to send, or `None` when nothing was dragged
    /// or the card was dropped on its own column.
    pub fn drop_local(&mut self, target: LeadStage) -> Result<Option<PendingWrite>> {
        match self.drag.drop(target) {
            Some(intent) => self.move_local(intent),
            None => Ok(None),
        }
    }

    /// Same as [`drop_local`](Self::drop_local) for a drop carrying a text id
    pub fn drop_payload_local(&mut self, payload: &str, target: LeadStage) -> Result<Option<PendingWrite>> {
        match self.drag.drop_payload(payload, target) {
            Some(intent) => self.move_local(intent),
            None => Ok(None),
        }
    }

    /// Moves a card to another column of this board, locally only
    pub fn move_local(&mut self, intent: MoveIntent) -> Result<Option<PendingWrite>> {
        if !self.config.has_stage(intent.to) {
            return Err(CrmError::InvalidStage(format!(
                "{} is not a column of the {} board",
                intent.to, self.config.name
            )));
        }

        let store = self.records.store_mut();
        match store.move_to_stage(intent.record, intent.to)? {
            Some(ticket) => {
                debug!("{}: moved {} to {}", store.name(), intent.record, intent.to);
                Ok(Some(PendingWrite::Update {
                    ticket,
                    fields: json!({ "stage": intent.to }),
                }))
            }
            None => {
                debug!("{}: {} already in {}", store.name(), intent.record, intent.to);
                Ok(None)
            }
        }
    }

    pub fn send(&self, write: PendingWrite) -> impl Future<Output = WriteOutcome> + Send + 'static {
        self.records.send(write)
    }

    pub fn complete(&mut self, outcome: WriteOutcome) -> Result<Completion> {
        self.records.complete(outcome)
    }

    /// Drops the dragged card on `target` and persists the new stage
    pub async fn drop(&mut self, target: LeadStage) -> Result<Option<Completion>> {
        match self.drop_local(target)? {
            Some(write) => self.records.persist(write).await.map(Some),
            None => Ok(None),
        }
    }

    /// Moves a record without a drag gesture and persists the new stage
    pub async fn move_record(&mut self, record: RecordId, to: LeadStage) -> Result<Option<Completion>> {
        match self.move_local(MoveIntent { record, to })? {
            Some(write) => self.records.persist(write).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PipelineDraft;
    use crate::remote::mock::{Call, MockRemote};
    use crate::store::SyncState;
    use serde_json::Value;

    fn row(id: i64, stage: LeadStage) -> Value {
        serde_json::to_value(Lead::new(
            RecordId::new(id),
            format!("Lead {}", id),
            stage,
            Owner::default(),
        ))
        .unwrap()
    }

    async fn board(rows: Vec<Value>) -> (PipelineBoard<Lead>, Arc<MockRemote>) {
        let remote = Arc::new(MockRemote::new().with_rows(Table::Leads, rows));
        let mut board = PipelineBoard::leads(remote.clone(), Owner::default());
        board.load().await.unwrap();
        (board, remote)
    }

    fn ids(board: &PipelineBoard<Lead>, stage: LeadStage) -> Vec<RecordId> {
        board.columns().column(stage).unwrap().ids()
    }

    fn scenario() -> Vec<Value> {
        vec![
            row(1, LeadStage::New),
            row(2, LeadStage::Won),
            row(3, LeadStage::Contacted),
        ]
    }

    #[tokio::test]
    async fn test_initial_columns() {
        let (board, _) = board(scenario()).await;

        assert_eq!(ids(&board, LeadStage::New), vec![RecordId::new(1)]);
        assert_eq!(ids(&board, LeadStage::Contacted), vec![RecordId::new(3)]);
        assert_eq!(ids(&board, LeadStage::Won), vec![RecordId::new(2)]);
        assert!(board.columns().column(LeadStage::Proposal).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_onto_won_persists_stage() {
        let (mut board, remote) = board(scenario()).await;

        board.drag_start_payload("1").unwrap();
        board.hover_enter(LeadStage::Won);
        let completion = board.drop(LeadStage::Won).await.unwrap();

        assert_eq!(completion, Some(Completion::Applied));
        assert_eq!(remote.updates(), vec![(RecordId::new(1), json!({"stage": "Won"}))]);
        assert!(ids(&board, LeadStage::New).is_empty());
        assert_eq!(
            ids(&board, LeadStage::Won),
            vec![RecordId::new(1), RecordId::new(2)]
        );
        assert!(board.drag().is_idle());
    }

    #[tokio::test]
    async fn test_drop_with_text_payload() {
        let (mut board, remote) = board(scenario()).await;

        board.drag_start_payload("1").unwrap();
        let write = board.drop_payload_local(" 1 ", LeadStage::Won).unwrap().unwrap();
        assert!(board.drag().is_idle());
        assert_eq!(
            ids(&board, LeadStage::Won),
            vec![RecordId::new(1), RecordId::new(2)]
        );

        let outcome = board.send(write).await;
        let completion = board.complete(outcome).unwrap();
        assert_eq!(completion, Completion::Applied);
        assert_eq!(remote.updates(), vec![(RecordId::new(1), json!({"stage": "Won"}))]);

        // An unreadable payload moves nothing
        board.drag_start(RecordId::new(3));
        assert_eq!(board.drop_payload_local("card", LeadStage::Won).unwrap(), None);
        assert_eq!(ids(&board, LeadStage::Contacted), vec![RecordId::new(3)]);
    }

    #[tokio::test]
    async fn test_drop_on_own_column_is_noop() {
        let (mut board, remote) = board(scenario()).await;

        board.drag_start(RecordId::new(3));
        let completion = board.drop(LeadStage::Contacted).await.unwrap();

        assert_eq!(completion, None);
        assert!(remote.updates().is_empty());
        assert_eq!(ids(&board, LeadStage::Contacted), vec![RecordId::new(3)]);
        assert!(board.drag().is_idle());
    }

    #[tokio::test]
    async fn test_drag_end_without_drop() {
        let (mut board, remote) = board(scenario()).await;
        let before: Vec<_> = board.columns().columns.iter().map(|c| c.ids()).collect();

        board.drag_start(RecordId::new(1));
        board.hover_enter(LeadStage::Lost);
        board.drag_end();

        let after: Vec<_> = board.columns().columns.iter().map(|c| c.ids()).collect();
        assert_eq!(before, after);
        assert!(board.drag().is_idle());
        assert!(remote.updates().is_empty());
    }

    #[tokio::test]
    async fn test_drop_without_drag_does_nothing() {
        let (mut board, remote) = board(scenario()).await;

        assert_eq!(board.drop(LeadStage::Won).await.unwrap(), None);
        assert!(remote.updates().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_restores_membership() {
        let (mut board, _) = board(scenario()).await;

        board.move_record(RecordId::new(1), LeadStage::Proposal).await.unwrap();
        board.move_record(RecordId::new(1), LeadStage::New).await.unwrap();

        assert_eq!(ids(&board, LeadStage::New), vec![RecordId::new(1)]);
        assert!(ids(&board, LeadStage::Proposal).is_empty());
    }

    #[tokio::test]
    async fn test_move_to_stage_outside_board_is_refused() {
        let remote = Arc::new(MockRemote::new());
        let mut deals = PipelineBoard::deals(remote.clone(), Owner::default());

        let err = deals
            .move_record(RecordId::new(1), LeadStage::New)
            .await
            .unwrap_err();

        assert!(matches!(err, CrmError::InvalidStage(_)));
        assert!(remote.updates().is_empty());
    }

    #[tokio::test]
    async fn test_failed_move_rolls_back() {
        let (mut board, remote) = board(scenario()).await;
        remote.fail_writes(true);

        board.drag_start(RecordId::new(1));
        assert!(board.drop(LeadStage::Won).await.is_err());

        assert_eq!(ids(&board, LeadStage::New), vec![RecordId::new(1)]);
        assert!(matches!(
            board.records().store().sync_state(RecordId::new(1)),
            Some(SyncState::Failed(_))
        ));
    }

    #[tokio::test]
    async fn test_optimistic_create_keeps_column() {
        let (mut board, remote) = board(scenario()).await;

        let mut draft = PipelineDraft::empty(LeadStage::Contacted);
        draft.name = "Cloud migration".to_string();
        draft.source = "Website".to_string();
        board.records_mut().editor_mut().open_new(draft);
        let write = board.records_mut().submit_local().unwrap().unwrap();
        let temp_id = write.ticket().id;

        // Visible before the remote store has answered
        assert!(temp_id.is_temporary());
        assert_eq!(
            ids(&board, LeadStage::Contacted),
            vec![temp_id, RecordId::new(3)]
        );
        assert!(!remote.calls().iter().any(|c| matches!(c, Call::Create(..))));

        board.records_mut().persist(write).await.unwrap();

        let contacted = ids(&board, LeadStage::Contacted);
        assert_eq!(contacted.len(), 2);
        assert!(!contacted[0].is_temporary());
        assert_eq!(contacted[1], RecordId::new(3));
    }

    #[tokio::test]
    async fn test_out_of_order_completions_keep_latest_move() {
        let (mut board, _) = board(scenario()).await;

        board.drag_start(RecordId::new(1));
        let first = board.drop_local(LeadStage::Contacted).unwrap().unwrap();
        board.drag_start(RecordId::new(1));
        let second = board.drop_local(LeadStage::Won).unwrap().unwrap();

        let (first, second) = tokio::join!(board.send(first), board.send(second));

        assert_eq!(board.complete(second).unwrap(), Completion::Applied);
        assert_eq!(board.complete(first).unwrap(), Completion::Stale);

        assert_eq!(
            ids(&board, LeadStage::Won),
            vec![RecordId::new(1), RecordId::new(2)]
        );
        assert_eq!(
            board.records().store().sync_state(RecordId::new(1)),
            Some(&SyncState::Synced)
        );
    }
}
