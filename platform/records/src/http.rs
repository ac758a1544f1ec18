use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{FieldMap, RawRecord, RecordError, RecordResult, RecordStore};

/// Record store backed by the hosted data platform's table API.
///
/// Every response uses the platform envelope
/// `{ "success": bool, "message": string?, "data": ... }`; a non-success
/// envelope is surfaced as [`RecordError::Api`].
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/api/tables/{}/records", self.base_url, table)
    }

    fn record_url(&self, table: &str, id: i64) -> String {
        format!("{}/{}", self.records_url(table), id)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.api_key)
    }

    async fn unwrap_envelope<T>(
        &self,
        table: &str,
        id: Option<i64>,
        response: reqwest::Response,
    ) -> RecordResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RecordError::not_found(table, id.unwrap_or_default()));
        }
        if !status.is_success() {
            return Err(RecordError::Api(format!(
                "{table} request failed with status {status}"
            )));
        }
        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(RecordError::Api(
                envelope
                    .message
                    .unwrap_or_else(|| format!("{table} request rejected")),
            ));
        }
        envelope
            .data
            .ok_or_else(|| RecordError::Api(format!("{table} response missing data")))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_records(&self, table: &str) -> RecordResult<Vec<RawRecord>> {
        debug!(table, "fetching records");
        let response = self
            .request(Method::GET, self.records_url(table))
            .send()
            .await?;
        self.unwrap_envelope(table, None, response).await
    }

    async fn get_record(&self, table: &str, id: i64) -> RecordResult<RawRecord> {
        let response = self
            .request(Method::GET, self.record_url(table, id))
            .send()
            .await?;
        self.unwrap_envelope(table, Some(id), response).await
    }

    async fn create_record(&self, table: &str, fields: FieldMap) -> RecordResult<RawRecord> {
        debug!(table, "creating record");
        let response = self
            .request(Method::POST, self.records_url(table))
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        self.unwrap_envelope(table, None, response).await
    }

    async fn update_record(
        &self,
        table: &str,
        id: i64,
        fields: FieldMap,
    ) -> RecordResult<RawRecord> {
        debug!(table, id, "updating record");
        let response = self
            .request(Method::PATCH, self.record_url(table, id))
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        self.unwrap_envelope(table, Some(id), response).await
    }

    async fn delete_record(&self, table: &str, id: i64) -> RecordResult<()> {
        let response = self
            .request(Method::DELETE, self.record_url(table, id))
            .send()
            .await?;
        let _: serde_json::Value = self.unwrap_envelope(table, Some(id), response).await?;
        Ok(())
    }
}
