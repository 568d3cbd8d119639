use crate::{
    domain::RecordId,
    error::{CrmError, Result},
    remote::{ListQuery, RemoteStore, Table, CONTACT_COLUMN},
};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};

/// Rows of one table as stored on disk
#[derive(Debug, Default, Serialize, Deserialize)]
struct TableFile {
    next_id: i64,
    rows: Vec<Map<String, Value>>,
}

/// JSON-file backend, one file per table, for local use and tests
pub struct FileStore {
    root_path: PathBuf,
    // Serializes read-modify-write cycles on the table files
    lock: Mutex<()>,
}

impl FileStore {
    const CRM_DIR: &'static str = ".crm";

    /// Creates a new FileStore for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::CRM_DIR),
            lock: Mutex::new(()),
        }
    }

    fn table_file(&self, table: Table) -> PathBuf {
        self.root_path.join(format!("{}.json", table.as_str()))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the data directory and empty table files
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        for table in Table::ALL {
            if !self.table_file(table).exists() {
                self.save_table(table, &TableFile::default()).await?;
            }
        }

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "*\n").await?;
        }

        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.root_path.exists() && Table::ALL.iter().all(|t| self.table_file(*t).exists())
    }

    async fn load_table(&self, table: Table) -> Result<TableFile> {
        let path = self.table_file(table);
        if !path.exists() {
            return Ok(TableFile::default());
        }

        let contents = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save_table(&self, table: Table, data: &TableFile) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(data)?;
        fs::write(self.table_file(table), json).await?;
        Ok(())
    }

    fn not_found(table: Table, id: RecordId) -> CrmError {
        CrmError::RecordNotFound {
            table: table.to_string(),
            id: id.to_string(),
        }
    }
}

fn row_id(row: &Map<String, Value>) -> Option<RecordId> {
    row.get("id")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

/// Orders JSON scalars: numbers numerically, strings lexically, missing last
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Greater,
        (_, Some(Value::Null) | None) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn into_object(fields: Value) -> Result<Map<String, Value>> {
    match fields {
        Value::Object(map) => Ok(map),
        other => Err(CrmError::StorageError(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl RemoteStore for FileStore {
    async fn list(&self, table: Table, query: &ListQuery) -> Result<Vec<Value>> {
        let data = self.load_table(table).await?;

        let mut rows: Vec<Map<String, Value>> = data
            .rows
            .into_iter()
            .filter(|row| match query.contact_id {
                Some(contact_id) => row
                    .get(CONTACT_COLUMN)
                    .cloned()
                    .and_then(|v| serde_json::from_value::<RecordId>(v).ok())
                    == Some(contact_id),
                None => true,
            })
            .collect();

        let column = query.order.column.as_str();
        // Missing values stay last regardless of direction; ids break ties
        // so rows created within the same instant keep creation order.
        rows.sort_by(|a, b| match (a.get(column), b.get(column)) {
            (Some(_), Some(_)) => {
                let cmp = compare_values(a.get(column), b.get(column))
                    .then_with(|| row_id(a).cmp(&row_id(b)));
                if query.order.ascending {
                    cmp
                } else {
                    cmp.reverse()
                }
            }
            (x, y) => compare_values(x, y),
        });

        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn get(&self, table: Table, id: RecordId) -> Result<Value> {
        let data = self.load_table(table).await?;

        data.rows
            .into_iter()
            .find(|row| row_id(row) == Some(id))
            .map(Value::Object)
            .ok_or_else(|| Self::not_found(table, id))
    }

    async fn create(&self, table: Table, fields: Value) -> Result<Value> {
        let _guard = self.lock.lock().await;
        let mut data = self.load_table(table).await?;

        let mut row = into_object(fields)?;
        data.next_id = data.next_id.max(0) + 1;
        row.insert("id".to_string(), Value::from(data.next_id));
        row.insert("created_at".to_string(), Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)));

        data.rows.push(row.clone());
        self.save_table(table, &data).await?;
        Ok(Value::Object(row))
    }

    async fn update(&self, table: Table, id: RecordId, fields: Value) -> Result<Value> {
        let _guard = self.lock.lock().await;
        let mut data = self.load_table(table).await?;

        let patch = into_object(fields)?;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row_id(row) == Some(id))
            .ok_or_else(|| Self::not_found(table, id))?;

        for (key, value) in patch {
            // The id column is immutable
            if key != "id" {
                row.insert(key, value);
            }
        }
        let updated = row.clone();

        self.save_table(table, &data).await?;
        Ok(Value::Object(updated))
    }
}
