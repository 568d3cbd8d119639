//! # CRM Core
//!
//! Core business logic and domain models for a small CRM: contacts, lead and
//! deal pipelines, tasks, a dashboard and reports.
//!
//! Records live in client-side [`RecordStore`]s that are updated
//! optimistically and reconciled with a remote CRUD backend
//! ([`RemoteStore`]). Pipeline boards are derived from those stores on
//! demand and driven by drag gestures through [`PipelineBoard`].

pub mod collection;
pub mod config;
pub mod domain;
pub mod drag;
pub mod editor;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod reports;
pub mod store;

// Re-export commonly used types
pub use collection::RecordCollection;
pub use config::CrmConfig;
pub use domain::{
    build_columns, BoardConfig, BoardView, Column, Contact, Deal, Lead, LeadStage, Owner, RecordId,
    Task, TaskPriority, TaskStatus,
};
pub use drag::{DragController, DragSession, MoveIntent};
pub use editor::{PendingWrite, RecordEditor};
pub use error::{CrmError, Result};
pub use pipeline::PipelineBoard;
pub use remote::{RemoteStore, Table};
pub use store::{Completion, RecordStore, SyncState};
