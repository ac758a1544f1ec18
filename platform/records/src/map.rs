//! The single mapping boundary between raw platform records and typed
//! entities. Every field is enumerated explicitly; unknown stage keys,
//! wrong types, and negative values are rejected rather than coerced.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use entity::{Activity, ActivityKind, Contact, Deal, DealPatch, NewActivity, NewDeal, Stage};

use crate::{FieldMap, RawRecord, RecordError, RecordResult, ACTIVITY_TABLE, CONTACT_TABLE, DEAL_TABLE};

pub(crate) fn deal_from_record(rec: &RawRecord) -> RecordResult<Deal> {
    let value = opt_f64(rec, DEAL_TABLE, "value_c")?.unwrap_or(0.0);
    if value < 0.0 {
        return Err(RecordError::malformed(DEAL_TABLE, "value_c is negative"));
    }
    Ok(Deal {
        id: req_i64(rec, DEAL_TABLE, "Id")?,
        title: req_str(rec, DEAL_TABLE, "title_c")?,
        value,
        stage: stage_field(rec, DEAL_TABLE, "stage_c")?,
        contact_id: req_i64(rec, DEAL_TABLE, "contact_id_c")?,
        created_at: req_datetime(rec, DEAL_TABLE, "CreatedOn")?,
        moved_to_stage_at: req_datetime(rec, DEAL_TABLE, "moved_to_stage_at_c")?,
    })
}

pub(crate) fn contact_from_record(rec: &RawRecord) -> RecordResult<Contact> {
    Ok(Contact {
        id: req_i64(rec, CONTACT_TABLE, "Id")?,
        name: req_str(rec, CONTACT_TABLE, "Name")?,
        company: opt_str(rec, CONTACT_TABLE, "company_c")?,
        email: opt_str(rec, CONTACT_TABLE, "email_c")?,
        phone: opt_str(rec, CONTACT_TABLE, "phone_c")?,
    })
}

pub(crate) fn activity_from_record(rec: &RawRecord) -> RecordResult<Activity> {
    let kind = match req_str(rec, ACTIVITY_TABLE, "type_c")?.as_str() {
        "deal_created" => ActivityKind::DealCreated,
        "stage_changed" => ActivityKind::StageChanged,
        other => {
            return Err(RecordError::malformed(
                ACTIVITY_TABLE,
                format!("unknown type_c: {other}"),
            ))
        }
    };
    let from_stage = match opt_str(rec, ACTIVITY_TABLE, "from_stage_c")? {
        Some(raw) => Some(parse_stage(ACTIVITY_TABLE, "from_stage_c", &raw)?),
        None => None,
    };
    Ok(Activity {
        id: req_i64(rec, ACTIVITY_TABLE, "Id")?,
        deal_id: req_i64(rec, ACTIVITY_TABLE, "deal_id_c")?,
        kind,
        from_stage,
        to_stage: stage_field(rec, ACTIVITY_TABLE, "to_stage_c")?,
        timestamp: req_datetime(rec, ACTIVITY_TABLE, "CreatedOn")?,
    })
}

pub(crate) fn new_deal_fields(input: &NewDeal, moved_at: DateTime<Utc>) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("Name".into(), json!(input.title));
    fields.insert("title_c".into(), json!(input.title));
    fields.insert("value_c".into(), json!(input.value));
    fields.insert("stage_c".into(), json!(input.stage.as_str()));
    fields.insert("contact_id_c".into(), json!(input.contact_id));
    fields.insert("moved_to_stage_at_c".into(), json!(moved_at.to_rfc3339()));
    fields
}

pub(crate) fn deal_patch_fields(patch: &DealPatch) -> FieldMap {
    let mut fields = FieldMap::new();
    if let Some(title) = &patch.title {
        fields.insert("Name".into(), json!(title));
        fields.insert("title_c".into(), json!(title));
    }
    if let Some(value) = patch.value {
        fields.insert("value_c".into(), json!(value));
    }
    if let Some(stage) = patch.stage {
        fields.insert("stage_c".into(), json!(stage.as_str()));
    }
    if let Some(contact_id) = patch.contact_id {
        fields.insert("contact_id_c".into(), json!(contact_id));
    }
    if let Some(moved_at) = patch.moved_to_stage_at {
        fields.insert("moved_to_stage_at_c".into(), json!(moved_at.to_rfc3339()));
    }
    fields
}

pub(crate) fn new_activity_fields(input: &NewActivity) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("deal_id_c".into(), json!(input.deal_id));
    fields.insert("type_c".into(), json!(input.kind.as_str()));
    // Absent from-stage is the empty string on the wire.
    fields.insert(
        "from_stage_c".into(),
        json!(input.from_stage.map(Stage::as_str).unwrap_or("")),
    );
    fields.insert("to_stage_c".into(), json!(input.to_stage.as_str()));
    fields
}

fn field<'a>(rec: &'a RawRecord, table: &str, name: &str) -> RecordResult<&'a Value> {
    rec.get(name)
        .ok_or_else(|| RecordError::malformed(table, format!("missing field {name}")))
}

fn req_i64(rec: &RawRecord, table: &str, name: &str) -> RecordResult<i64> {
    field(rec, table, name)?
        .as_i64()
        .ok_or_else(|| RecordError::malformed(table, format!("{name} is not an integer")))
}

fn req_str(rec: &RawRecord, table: &str, name: &str) -> RecordResult<String> {
    field(rec, table, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RecordError::malformed(table, format!("{name} is not a string")))
}

/// Optional string field; absent, null, and empty all read as `None`.
fn opt_str(rec: &RawRecord, table: &str, name: &str) -> RecordResult<Option<String>> {
    match rec.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RecordError::malformed(
            table,
            format!("{name} is not a string"),
        )),
    }
}

fn opt_f64(rec: &RawRecord, table: &str, name: &str) -> RecordResult<Option<f64>> {
    match rec.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| RecordError::malformed(table, format!("{name} is not a number"))),
    }
}

fn req_datetime(rec: &RawRecord, table: &str, name: &str) -> RecordResult<DateTime<Utc>> {
    let raw = req_str(rec, table, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| RecordError::malformed(table, format!("{name} is not a timestamp")))
}

fn stage_field(rec: &RawRecord, table: &str, name: &str) -> RecordResult<Stage> {
    let raw = req_str(rec, table, name)?;
    parse_stage(table, name, &raw)
}

fn parse_stage(table: &str, name: &str, raw: &str) -> RecordResult<Stage> {
    raw.parse()
        .map_err(|_| RecordError::malformed(table, format!("{name} has unknown stage {raw}")))
}
