use crate::domain::record::{require, Editable, Identified, Owner, RecordId};
use crate::error::{CrmError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Urgency of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Lower rank means more urgent
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        })
    }
}

/// Progress of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        })
    }
}

impl FromStr for TaskStatus {
    type Err = CrmError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in progress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(CrmError::Other(format!("Unknown task status: {}", s))),
        }
    }
}

impl TaskStatus {
    /// The status a checkbox toggle moves to
    pub fn toggled(&self) -> TaskStatus {
        match self {
            Self::Completed => Self::Pending,
            Self::Pending | Self::InProgress => Self::Completed,
        }
    }
}

/// A follow-up item, optionally tied to a contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    #[serde(rename = "dueDate")]
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(
        rename = "contactId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_id: Option<RecordId>,
}

impl Task {
    pub fn new(id: RecordId, title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            due_date,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            contact_id: None,
        }
    }

    /// Anything not completed counts as open
    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_date < now
    }
}

/// Task form fields; the due date is picked as a calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            due_date,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
        }
    }

    /// Due date as midnight UTC of the picked day
    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    fn to_fields(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "title": self.title,
            "dueDate": self.due_at().to_rfc3339(),
            "priority": serde_json::to_value(self.priority)?,
            "status": serde_json::to_value(self.status)?,
        }))
    }
}

impl Identified for Task {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Editable for Task {
    type Draft = TaskDraft;

    fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            due_date: self.due_date.date_naive(),
            priority: self.priority,
            status: self.status,
        }
    }

    fn apply_draft(&mut self, draft: &TaskDraft) {
        self.title = draft.title.clone();
        self.due_date = draft.due_at();
        self.priority = draft.priority;
        self.status = draft.status;
    }

    fn placeholder(id: RecordId, draft: &TaskDraft, _owner: &Owner) -> Self {
        let mut task = Task::new(id, draft.title.clone(), draft.due_at());
        task.apply_draft(draft);
        task
    }

    fn validate(draft: &TaskDraft) -> Result<()> {
        require(&draft.title, "title")
    }

    fn update_fields(draft: &TaskDraft) -> Result<serde_json::Value> {
        draft.to_fields()
    }

    fn create_fields(draft: &TaskDraft, _owner: &Owner) -> Result<serde_json::Value> {
        draft.to_fields()
    }
}
