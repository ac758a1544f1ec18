use std::sync::Arc;

use chrono::Utc;

use entity::{Activity, Contact, Deal, DealPatch, NewActivity, NewDeal};

use crate::map::{
    activity_from_record, contact_from_record, deal_from_record, deal_patch_fields,
    new_activity_fields, new_deal_fields,
};
use crate::{RecordResult, RecordStore, ACTIVITY_TABLE, CONTACT_TABLE, DEAL_TABLE};

/// Deal records (`deal_c` table).
#[derive(Clone)]
pub struct DealService {
    store: Arc<dyn RecordStore>,
}

impl DealService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> RecordResult<Vec<Deal>> {
        let records = self.store.fetch_records(DEAL_TABLE).await?;
        records.iter().map(deal_from_record).collect()
    }

    pub async fn get_by_id(&self, id: i64) -> RecordResult<Deal> {
        let record = self.store.get_record(DEAL_TABLE, id).await?;
        deal_from_record(&record)
    }

    /// Creates the deal with `moved_to_stage_at` set to now.
    pub async fn create(&self, input: &NewDeal) -> RecordResult<Deal> {
        let fields = new_deal_fields(input, Utc::now());
        let record = self.store.create_record(DEAL_TABLE, fields).await?;
        deal_from_record(&record)
    }

    pub async fn update(&self, id: i64, patch: &DealPatch) -> RecordResult<Deal> {
        let record = self
            .store
            .update_record(DEAL_TABLE, id, deal_patch_fields(patch))
            .await?;
        deal_from_record(&record)
    }

    pub async fn delete(&self, id: i64) -> RecordResult<()> {
        self.store.delete_record(DEAL_TABLE, id).await
    }
}

/// Contact records (`contact_c` table). The board only reads contacts.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn RecordStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> RecordResult<Vec<Contact>> {
        let records = self.store.fetch_records(CONTACT_TABLE).await?;
        records.iter().map(contact_from_record).collect()
    }

    pub async fn get_by_id(&self, id: i64) -> RecordResult<Contact> {
        let record = self.store.get_record(CONTACT_TABLE, id).await?;
        contact_from_record(&record)
    }
}

/// Activity records (`activity_c` table): the append-only audit log.
#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn RecordStore>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Full log, newest first.
    pub async fn get_all(&self) -> RecordResult<Vec<Activity>> {
        let records = self.store.fetch_records(ACTIVITY_TABLE).await?;
        let mut activities: Vec<Activity> = records
            .iter()
            .map(activity_from_record)
            .collect::<RecordResult<_>>()?;
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(activities)
    }

    pub async fn get_by_deal(&self, deal_id: i64) -> RecordResult<Vec<Activity>> {
        let mut activities = self.get_all().await?;
        activities.retain(|a| a.deal_id == deal_id);
        Ok(activities)
    }

    pub async fn create(&self, input: &NewActivity) -> RecordResult<Activity> {
        let record = self
            .store
            .create_record(ACTIVITY_TABLE, new_activity_fields(input))
            .await?;
        activity_from_record(&record)
    }
}
