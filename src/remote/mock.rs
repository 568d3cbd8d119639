//! In-memory remote store used by unit tests.

use crate::{
    domain::RecordId,
    error::{CrmError, Result},
    remote::{ListQuery, RemoteStore, Table, CONTACT_COLUMN},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A call the store received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Table),
    Get(Table, RecordId),
    Create(Table, Value),
    Update(Table, RecordId, Value),
}

/// Rows kept in insertion order; listings return them as stored
#[derive(Default)]
pub struct MockRemote {
    rows: Mutex<HashMap<Table, Vec<Value>>>,
    calls: Mutex<Vec<Call>>,
    fail_writes: Mutex<bool>,
    next_id: Mutex<i64>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1000),
            ..Default::default()
        }
    }

    pub fn with_rows(self, table: Table, rows: Vec<Value>) -> Self {
        self.rows.lock().unwrap().insert(table, rows);
        self
    }

    /// Makes every create and update fail with HTTP 500
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(RecordId, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(_, id, fields) => Some((id, fields)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_writes(&self) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(CrmError::Remote {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(table: Table, id: RecordId) -> CrmError {
        CrmError::RecordNotFound {
            table: table.to_string(),
            id: id.to_string(),
        }
    }
}

fn has_id(row: &Value, id: RecordId) -> bool {
    serde_json::from_value::<RecordId>(row["id"].clone()).ok() == Some(id)
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list(&self, table: Table, query: &ListQuery) -> Result<Vec<Value>> {
        self.record(Call::List(table));
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| match query.contact_id {
                        Some(id) => row[CONTACT_COLUMN] == Value::from(id.value()),
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, table: Table, id: RecordId) -> Result<Value> {
        self.record(Call::Get(table, id));
        let rows = self.rows.lock().unwrap();
        rows.get(&table)
            .and_then(|rows| rows.iter().find(|row| has_id(row, id)).cloned())
            .ok_or_else(|| Self::not_found(table, id))
    }

    async fn create(&self, table: Table, fields: Value) -> Result<Value> {
        self.record(Call::Create(table, fields.clone()));
        self.check_writes()?;

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let mut row = fields;
        row["id"] = Value::from(*next_id);

        self.rows
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .insert(0, row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: RecordId, fields: Value) -> Result<Value> {
        self.record(Call::Update(table, id, fields.clone()));
        self.check_writes()?;

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|row| has_id(row, id)))
            .ok_or_else(|| Self::not_found(table, id))?;

        if let (Value::Object(row), Value::Object(fields)) = (row, fields) {
            row.extend(fields);
        }
        Ok(rows[&table]
            .iter()
            .find(|row| has_id(row, id))
            .cloned()
            .unwrap_or(Value::Null))
    }
}
