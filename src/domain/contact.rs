use crate::domain::record::{null_as_default, require, Editable, Identified, Owner, RecordId};
use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A person the team is in touch with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar: String,
}

/// Contact form fields; tags are edited as one comma separated string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub tags: String,
}

impl ContactDraft {
    /// Splits the tag input on commas, dropping blank entries
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn to_fields(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "company": self.company,
            "tags": self.tag_list(),
        })
    }
}

/// Avatar URL seeded so every contact gets a stable picture
pub fn seeded_avatar(seed: impl std::fmt::Display) -> String {
    format!("https://picsum.photos/seed/{}/40/40", seed)
}

impl Contact {
    /// Case-insensitive match against name, email and company
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self.company.to_lowercase().contains(&term)
    }
}

/// Filters contacts by a search term, keeping their order
pub fn search_contacts<'a>(contacts: impl IntoIterator<Item = &'a Contact>, term: &str) -> Vec<&'a Contact> {
    contacts.into_iter().filter(|c| c.matches(term)).collect()
}

impl Identified for Contact {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Editable for Contact {
    type Draft = ContactDraft;

    fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            tags: self.tags.join(", "),
        }
    }

    fn apply_draft(&mut self, draft: &ContactDraft) {
        self.name = draft.name.clone();
        self.email = draft.email.clone();
        self.phone = draft.phone.clone();
        self.company = draft.company.clone();
        self.tags = draft.tag_list();
    }

    fn placeholder(id: RecordId, draft: &ContactDraft, _owner: &Owner) -> Self {
        let mut contact = Contact {
            id,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
            tags: Vec::new(),
            avatar: seeded_avatar(Utc::now().timestamp_millis()),
        };
        contact.apply_draft(draft);
        contact
    }

    fn validate(draft: &ContactDraft) -> Result<()> {
        require(&draft.name, "name")?;
        require(&draft.email, "email")
    }

    fn update_fields(draft: &ContactDraft) -> Result<serde_json::Value> {
        Ok(draft.to_fields())
    }

    fn create_fields(draft: &ContactDraft, _owner: &Owner) -> Result<serde_json::Value> {
        let mut fields = draft.to_fields();
        fields["avatar"] = seeded_avatar(Utc::now().timestamp_millis()).into();
        Ok(fields)
    }
}
