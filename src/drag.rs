//! Drag-and-drop state for a pipeline board.

use crate::domain::{LeadStage, RecordId};
use crate::error::Result;

/// Ephemeral state of one drag interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        record: RecordId,
        hovered: Option<LeadStage>,
    },
}

/// A requested cross-column move, produced by a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub record: RecordId,
    pub to: LeadStage,
}

/// Tracks the dragged card and the hovered column
#[derive(Debug, Clone, Default)]
pub struct DragController {
    session: DragSession,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> DragSession {
        self.session
    }

    pub fn is_idle(&self) -> bool {
        self.session == DragSession::Idle
    }

    /// True while the given card is the one being dragged
    pub fn is_dragging(&self, id: RecordId) -> bool {
        matches!(self.session, DragSession::Dragging { record, .. } if record == id)
    }

    /// The column currently highlighted as a drop target
    pub fn hovered(&self) -> Option<LeadStage> {
        match self.session {
            DragSession::Dragging { hovered, .. } => hovered,
            DragSession::Idle => None,
        }
    }

    pub fn drag_start(&mut self, record: RecordId) {
        self.session = DragSession::Dragging {
            record,
            hovered: None,
        };
    }

    /// Starts a drag from the textual payload a card carries
    pub fn drag_start_payload(&mut self, payload: &str) -> Result<RecordId> {
        let record = payload.parse::<RecordId>()?;
        self.drag_start(record);
        Ok(record)
    }

    pub fn hover_enter(&mut self, stage: LeadStage) {
        if let DragSession::Dragging { hovered, .. } = &mut self.session {
            *hovered = Some(stage);
        }
    }

    /// Clears the highlight, but only when leaving the highlighted column
    pub fn hover_leave(&mut self, stage: LeadStage) {
        if let DragSession::Dragging { hovered, .. } = &mut self.session {
            if *hovered == Some(stage) {
                *hovered = None;
            }
        }
    }

    /// Ends the drag on a column. Returns the move to perform, if a card was
    /// being dragged; the session is idle afterwards either way.
    pub fn drop(&mut self, target: LeadStage) -> Option<MoveIntent> {
        match std::mem::take(&mut self.session) {
            DragSession::Dragging { record, .. } => Some(MoveIntent { record, to: target }),
            DragSession::Idle => None,
        }
    }

    /// Ends the drag on a column using the id carried in the drop payload
    pub fn drop_payload(&mut self, payload: &str, target: LeadStage) -> Option<MoveIntent> {
        self.session = DragSession::Idle;
        payload
            .parse::<RecordId>()
            .ok()
            .map(|record| MoveIntent { record, to: target })
    }

    /// Abandons the drag without moving anything
    pub fn drag_end(&mut self) {
        self.session = DragSession::Idle;
    }
}
