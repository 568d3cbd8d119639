use crate::{
    domain::RecordId,
    error::Result,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

#[cfg(feature = "file-storage")]
pub mod file_store;
#[cfg(test)]
pub(crate) mod mock;
pub mod rest;

#[cfg(feature = "file-storage")]
pub use file_store::FileStore;
pub use rest::RestStore;

/// Tables exposed by the CRM backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Contacts,
    Leads,
    Deals,
    Tasks,
}

impl Table {
    pub const ALL: [Table; 4] = [Self::Contacts, Self::Leads, Self::Deals, Self::Tasks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Leads => "leads",
            Self::Deals => "deals",
            Self::Tasks => "tasks",
        }
    }

    /// Listing order the application asks for by default
    pub fn default_order(&self) -> ListOrder {
        match self {
            Self::Tasks => ListOrder::ascending("dueDate"),
            _ => ListOrder::descending("created_at"),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column and direction a listing is ordered by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOrder {
    pub column: String,
    pub ascending: bool,
}

impl ListOrder {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Filter and ordering for a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub contact_id: Option<RecordId>,
    pub order: ListOrder,
}

impl ListQuery {
    /// Unfiltered listing in the table's default order
    pub fn all(table: Table) -> Self {
        Self {
            contact_id: None,
            order: table.default_order(),
        }
    }

    /// Rows referencing the given contact, in the table's default order
    pub fn for_contact(table: Table, contact_id: RecordId) -> Self {
        Self {
            contact_id: Some(contact_id),
            order: table.default_order(),
        }
    }
}

/// Name of the column holding the contact reference
pub const CONTACT_COLUMN: &str = "contactId";

/// CRUD boundary to the hosted database
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists rows of a table
    async fn list(&self, table: Table, query: &ListQuery) -> Result<Vec<Value>>;

    /// Fetches one row; a missing row is `RecordNotFound`
    async fn get(&self, table: Table, id: RecordId) -> Result<Value>;

    /// Inserts a row and returns it as stored, with its assigned id
    async fn create(&self, table: Table, fields: Value) -> Result<Value>;

    /// Applies a partial update and returns the stored row
    async fn update(&self, table: Table, id: RecordId, fields: Value) -> Result<Value>;
}

/// Lists a table and decodes every row
pub async fn list_as<T: DeserializeOwned>(
    remote: &dyn RemoteStore,
    table: Table,
    query: &ListQuery,
) -> Result<Vec<T>> {
    remote
        .list(table, query)
        .await?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}

/// Fetches and decodes one row
pub async fn get_as<T: DeserializeOwned>(
    remote: &dyn RemoteStore,
    table: Table,
    id: RecordId,
) -> Result<T> {
    let row = remote.get(table, id).await?;
    Ok(serde_json::from_value(row)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_orders() {
        assert_eq!(Table::Tasks.default_order(), ListOrder::ascending("dueDate"));
        assert_eq!(Table::Leads.default_order(), ListOrder::descending("created_at"));
    }

    #[test]
    fn test_contact_query() {
        let query = ListQuery::for_contact(Table::Deals, RecordId::new(4));
        assert_eq!(query.contact_id, Some(RecordId::new(4)));
        assert!(!query.order.ascending);
    }
}
