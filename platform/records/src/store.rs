use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::RecordResult;

/// A raw platform record: named fields, loosely typed.
pub type RawRecord = Map<String, Value>;

/// Fields for a create or partial update. Only the fields present are sent.
pub type FieldMap = Map<String, Value>;

/// Generic record capability per table. Injected into the board controller
/// so tests can substitute scripted doubles.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Full snapshot fetch; the board assumes no pagination.
    async fn fetch_records(&self, table: &str) -> RecordResult<Vec<RawRecord>>;

    async fn get_record(&self, table: &str, id: i64) -> RecordResult<RawRecord>;

    /// The store assigns `Id` and `CreatedOn`.
    async fn create_record(&self, table: &str, fields: FieldMap) -> RecordResult<RawRecord>;

    /// Partial update; returns the full updated record.
    async fn update_record(&self, table: &str, id: i64, fields: FieldMap)
        -> RecordResult<RawRecord>;

    async fn delete_record(&self, table: &str, id: i64) -> RecordResult<()>;
}
