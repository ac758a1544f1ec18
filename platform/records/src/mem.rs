use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::{FieldMap, RawRecord, RecordError, RecordResult, RecordStore};
use crate::{ACTIVITY_TABLE, CONTACT_TABLE, DEAL_TABLE};

/// In-memory record store. Assigns `Id` (max + 1 per table) and `CreatedOn`
/// on create, like the hosted platform does. Used by the CLI demo mode and
/// as a test double.
#[derive(Default)]
pub struct MemRecordStore {
    tables: Mutex<HashMap<String, Vec<RawRecord>>>,
}

impl MemRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with a small demo pipeline.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.lock().expect("record tables poisoned");
            tables.insert(CONTACT_TABLE.to_string(), demo_contacts());
            tables.insert(DEAL_TABLE.to_string(), demo_deals());
            tables.insert(ACTIVITY_TABLE.to_string(), demo_activities());
        }
        store
    }

    pub fn insert_raw(&self, table: &str, record: RawRecord) {
        let mut tables = self.tables.lock().expect("record tables poisoned");
        tables.entry(table.to_string()).or_default().push(record);
    }
}

fn record_id(record: &RawRecord) -> i64 {
    record.get("Id").and_then(Value::as_i64).unwrap_or(0)
}

#[async_trait]
impl RecordStore for MemRecordStore {
    async fn fetch_records(&self, table: &str) -> RecordResult<Vec<RawRecord>> {
        let tables = self.tables.lock().expect("record tables poisoned");
        Ok(tables.get(table).cloned().unwrap_or_default())
    }

    async fn get_record(&self, table: &str, id: i64) -> RecordResult<RawRecord> {
        let tables = self.tables.lock().expect("record tables poisoned");
        tables
            .get(table)
            .and_then(|rows| rows.iter().find(|r| record_id(r) == id))
            .cloned()
            .ok_or_else(|| RecordError::not_found(table, id))
    }

    async fn create_record(&self, table: &str, fields: FieldMap) -> RecordResult<RawRecord> {
        let mut tables = self.tables.lock().expect("record tables poisoned");
        let rows = tables.entry(table.to_string()).or_default();
        let next_id = rows.iter().map(record_id).max().unwrap_or(0) + 1;
        let mut record = fields;
        record.insert("Id".into(), json!(next_id));
        record.insert("CreatedOn".into(), json!(Utc::now().to_rfc3339()));
        rows.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        table: &str,
        id: i64,
        fields: FieldMap,
    ) -> RecordResult<RawRecord> {
        let mut tables = self.tables.lock().expect("record tables poisoned");
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| RecordError::not_found(table, id))?;
        let record = rows
            .iter_mut()
            .find(|r| record_id(r) == id)
            .ok_or_else(|| RecordError::not_found(table, id))?;
        for (name, value) in fields {
            record.insert(name, value);
        }
        Ok(record.clone())
    }

    async fn delete_record(&self, table: &str, id: i64) -> RecordResult<()> {
        let mut tables = self.tables.lock().expect("record tables poisoned");
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| RecordError::not_found(table, id))?;
        let before = rows.len();
        rows.retain(|r| record_id(r) != id);
        if rows.len() == before {
            return Err(RecordError::not_found(table, id));
        }
        Ok(())
    }
}

fn obj(value: Value) -> RawRecord {
    value.as_object().cloned().unwrap_or_default()
}

fn demo_contacts() -> Vec<RawRecord> {
    vec![
        obj(json!({
            "Id": 1, "Name": "Ada Lovelace", "company_c": "ACME, Inc.",
            "email_c": "ada@acme.test", "phone_c": "+1 555 0100"
        })),
        obj(json!({
            "Id": 2, "Name": "Grace Hopper", "company_c": "Initech",
            "email_c": "grace@initech.test", "phone_c": ""
        })),
        obj(json!({
            "Id": 3, "Name": "Linus Benedict", "company_c": "Globex",
            "email_c": "linus@globex.test", "phone_c": "+1 555 0102"
        })),
    ]
}

fn demo_deals() -> Vec<RawRecord> {
    let deal = |id: i64, title: &str, value: f64, stage: &str, contact: i64, moved: &str| {
        obj(json!({
            "Id": id, "Name": title, "title_c": title, "value_c": value,
            "stage_c": stage, "contact_id_c": contact,
            "CreatedOn": "2025-04-01T09:00:00Z", "moved_to_stage_at_c": moved
        }))
    };
    vec![
        deal(1, "ACME Pilot", 12_000.0, "Lead", 1, "2025-04-01T09:00:00Z"),
        deal(2, "ACME Expansion", 48_000.0, "Qualified", 1, "2025-04-10T14:00:00Z"),
        deal(3, "Initech Onboarding", 9_500.0, "Proposal", 2, "2025-04-15T11:00:00Z"),
        deal(4, "Globex Renewal", 30_000.0, "Negotiation", 3, "2025-04-20T16:00:00Z"),
        deal(5, "Globex Support", 5_000.0, "Closed", 3, "2025-04-25T10:00:00Z"),
    ]
}

fn demo_activities() -> Vec<RawRecord> {
    vec![
        obj(json!({
            "Id": 1, "deal_id_c": 1, "type_c": "deal_created",
            "from_stage_c": "", "to_stage_c": "Lead",
            "CreatedOn": "2025-04-01T09:00:00Z"
        })),
        obj(json!({
            "Id": 2, "deal_id_c": 2, "type_c": "stage_changed",
            "from_stage_c": "Lead", "to_stage_c": "Qualified",
            "CreatedOn": "2025-04-10T14:00:00Z"
        })),
    ]
}
