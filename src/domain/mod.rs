pub mod board;
pub mod contact;
pub mod lead;
pub mod record;
pub mod sorting;
pub mod stage;
pub mod task;

pub use board::{build_columns, BoardConfig, BoardRecord, BoardView, Column};
pub use contact::{search_contacts, Contact, ContactDraft};
pub use lead::{Deal, Lead, PipelineDraft};
pub use record::{Editable, Identified, Owner, RecordId};
pub use sorting::{sort_records, sort_tasks, SortField, SortOrder, TaskSortField};
pub use stage::LeadStage;
pub use task::{Task, TaskDraft, TaskPriority, TaskStatus};
