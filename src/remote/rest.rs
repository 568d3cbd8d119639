//! Supabase / PostgREST backend.

use crate::{
    domain::RecordId,
    error::{CrmError, Result},
    remote::{ListQuery, RemoteStore, Table, CONTACT_COLUMN},
};
use async_trait::async_trait;
use log::debug;
use serde_json::Value;

/// HTTPS client for a PostgREST endpoint such as a Supabase project
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// `{base}/rest/v1/{table}`
    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    /// Query-string pairs for a listing
    fn list_params(query: &ListQuery) -> Vec<(String, String)> {
        let direction = if query.order.ascending { "asc" } else { "desc" };
        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            (
                "order".to_string(),
                format!("{}.{}", query.order.column, direction),
            ),
        ];
        if let Some(contact_id) = query.contact_id {
            params.push((CONTACT_COLUMN.to_string(), format!("eq.{}", contact_id)));
        }
        params
    }

    fn id_filter(id: RecordId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }

    fn request(&self, method: reqwest::Method, table: Table) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Sends a request, mapping non-2xx responses to `CrmError::Remote`
    async fn send(builder: reqwest::RequestBuilder) -> Result<Vec<Value>> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CrmError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json::<Vec<Value>>().await?)
    }

    fn single(rows: Vec<Value>, table: Table, id: impl ToString) -> Result<Value> {
        rows.into_iter()
            .next()
            .ok_or_else(|| CrmError::RecordNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn list(&self, table: Table, query: &ListQuery) -> Result<Vec<Value>> {
        debug!("GET {} {:?}", table, query);
        let req = self
            .request(reqwest::Method::GET, table)
            .query(&Self::list_params(query));
        Self::send(req).await
    }

    async fn get(&self, table: Table, id: RecordId) -> Result<Value> {
        let req = self
            .request(reqwest::Method::GET, table)
            .query(&[("select", "*")])
            .query(&Self::id_filter(id));
        let rows = Self::send(req).await?;
        Self::single(rows, table, id)
    }

    async fn create(&self, table: Table, fields: Value) -> Result<Value> {
        debug!("POST {}", table);
        let req = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[fields]);
        let rows = Self::send(req).await?;
        Self::single(rows, table, "<new>")
    }

    async fn update(&self, table: Table, id: RecordId, fields: Value) -> Result<Value> {
        debug!("PATCH {} id={}", table, id);
        let req = self
            .request(reqwest::Method::PATCH, table)
            .query(&Self::id_filter(id))
            .header("Prefer", "return=representation")
            .json(&fields);
        let rows = Self::send(req).await?;
        Self::single(rows, table, id)
    }
}
