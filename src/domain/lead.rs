use crate::domain::{
    board::BoardRecord,
    record::{require, Editable, Identified, Owner, RecordId},
    stage::LeadStage,
};
use crate::error::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Score given to a lead before the backend assigns one
const PLACEHOLDER_SCORE: u32 = 75;

/// A prospective customer moving through the lead pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: RecordId,
    pub name: String,
    pub source: String,
    pub value: f64,
    pub stage: LeadStage,
    pub owner: Owner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An opportunity linked (optionally) to a contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: RecordId,
    pub name: String,
    pub source: String,
    pub value: f64,
    pub stage: LeadStage,
    pub owner: Owner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        rename = "contactId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_id: Option<RecordId>,
}

/// Form fields shared by the lead and deal editors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub value: f64,
    pub stage: LeadStage,
    pub notes: String,
}

impl PipelineDraft {
    /// An empty form opened on the given stage
    pub fn empty(stage: LeadStage) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            source: String::new(),
            value: 0.0,
            stage,
            notes: String::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name")?;
        require(&self.source, "source")
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Lead {
    pub fn new(id: RecordId, name: impl Into<String>, stage: LeadStage, owner: Owner) -> Self {
        Self {
            id,
            name: name.into(),
            source: String::new(),
            value: 0.0,
            stage,
            owner,
            score: None,
            email: None,
            phone: None,
            notes: None,
        }
    }
}

impl Deal {
    pub fn new(id: RecordId, name: impl Into<String>, stage: LeadStage, owner: Owner) -> Self {
        Self {
            id,
            name: name.into(),
            source: String::new(),
            value: 0.0,
            stage,
            owner,
            score: None,
            email: None,
            phone: None,
            notes: None,
            contact_id: None,
        }
    }
}

impl Identified for Lead {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Identified for Deal {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl BoardRecord for Lead {
    fn stage(&self) -> LeadStage {
        self.stage
    }

    fn set_stage(&mut self, stage: LeadStage) {
        self.stage = stage;
    }
}

impl BoardRecord for Deal {
    fn stage(&self) -> LeadStage {
        self.stage
    }

    fn set_stage(&mut self, stage: LeadStage) {
        self.stage = stage;
    }
}

impl Editable for Lead {
    type Draft = PipelineDraft;

    fn to_draft(&self) -> PipelineDraft {
        PipelineDraft {
            name: self.name.clone(),
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            source: self.source.clone(),
            value: self.value,
            stage: self.stage,
            notes: self.notes.clone().unwrap_or_default(),
        }
    }

    fn apply_draft(&mut self, draft: &PipelineDraft) {
        self.name = draft.name.clone();
        self.email = optional(&draft.email);
        self.phone = optional(&draft.phone);
        self.source = draft.source.clone();
        self.value = draft.value;
        self.stage = draft.stage;
        self.notes = optional(&draft.notes);
    }

    fn placeholder(id: RecordId, draft: &PipelineDraft, owner: &Owner) -> Self {
        let mut lead = Lead::new(id, draft.name.clone(), draft.stage, owner.clone());
        lead.apply_draft(draft);
        lead.score = Some(PLACEHOLDER_SCORE);
        lead
    }

    fn validate(draft: &PipelineDraft) -> Result<()> {
        draft.validate()
    }

    fn update_fields(draft: &PipelineDraft) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(draft)?)
    }

    fn create_fields(draft: &PipelineDraft, owner: &Owner) -> Result<serde_json::Value> {
        let mut fields = serde_json::to_value(draft)?;
        fields["owner"] = serde_json::to_value(owner)?;
        fields["score"] = rand::thread_rng().gen_range(60..100).into();
        Ok(fields)
    }
}

impl Editable for Deal {
    type Draft = PipelineDraft;

    fn to_draft(&self) -> PipelineDraft {
        PipelineDraft {
            name: self.name.clone(),
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            source: self.source.clone(),
            value: self.value,
            stage: self.stage,
            notes: self.notes.clone().unwrap_or_default(),
        }
    }

    fn apply_draft(&mut self, draft: &PipelineDraft) {
        self.name = draft.name.clone();
        self.email = optional(&draft.email);
        self.phone = optional(&draft.phone);
        self.source = draft.source.clone();
        self.value = draft.value;
        self.stage = draft.stage;
        self.notes = optional(&draft.notes);
    }

    fn placeholder(id: RecordId, draft: &PipelineDraft, owner: &Owner) -> Self {
        let mut deal = Deal::new(id, draft.name.clone(), draft.stage, owner.clone());
        deal.apply_draft(draft);
        deal
    }

    fn validate(draft: &PipelineDraft) -> Result<()> {
        draft.validate()
    }

    fn update_fields(draft: &PipelineDraft) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(draft)?)
    }

    fn create_fields(draft: &PipelineDraft, owner: &Owner) -> Result<serde_json::Value> {
        let mut fields = serde_json::to_value(draft)?;
        fields["owner"] = serde_json::to_value(owner)?;
        Ok(fields)
    }
}
