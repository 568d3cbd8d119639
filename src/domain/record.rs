use crate::error::{CrmError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of a stored record.
///
/// Ids assigned by the remote store are positive. Ids below zero are
/// temporary placeholders handed out locally for optimistic creates and are
/// never sent to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Returns true for locally allocated placeholder ids
    pub fn is_temporary(&self) -> bool {
        self.0 < 0
    }

    /// Compares against a textual id, as carried by drag payloads
    pub fn matches_text(&self, text: &str) -> bool {
        text.parse::<RecordId>().map(|id| id == *self).unwrap_or(false)
    }
}

impl FromStr for RecordId {
    type Err = CrmError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(Self(value));
        }

        // Numeric payloads sometimes arrive rendered as floats ("7.0")
        match trimmed.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                Ok(Self(value as i64))
            }
            _ => Err(CrmError::InvalidRecordId(s.to_string())),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self(value)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Person owning a lead or deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub avatar: String,
}

impl Owner {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self::new("Priya Sharma", "https://picsum.photos/seed/user/40/40")
    }
}

/// Anything kept in a [`RecordStore`](crate::store::RecordStore)
pub trait Identified {
    fn id(&self) -> RecordId;
}

/// A record that can be edited through a [`RecordEditor`](crate::editor::RecordEditor).
pub trait Editable: Identified + Clone {
    /// The subset of fields a user edits in a form
    type Draft: Clone + std::fmt::Debug;

    /// Extracts the editable fields from an existing record
    fn to_draft(&self) -> Self::Draft;

    /// Merges draft fields into the record
    fn apply_draft(&mut self, draft: &Self::Draft);

    /// Builds the placeholder shown until the remote create resolves
    fn placeholder(id: RecordId, draft: &Self::Draft, owner: &Owner) -> Self;

    /// Required-field checks
    fn validate(draft: &Self::Draft) -> Result<()>;

    /// Fields sent to the remote store on update
    fn update_fields(draft: &Self::Draft) -> Result<serde_json::Value>;

    /// Fields sent to the remote store on create, including any
    /// server-side defaults the backend expects the client to supply
    fn create_fields(draft: &Self::Draft, owner: &Owner) -> Result<serde_json::Value>;
}

/// Reads a nullable column, treating `null` like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CrmError::MissingField(field));
    }
    Ok(())
}
