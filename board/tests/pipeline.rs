use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use board::{BufferedNotifier, PipelineController};
use entity::{ActivityKind, NewDeal, Stage};
use platform_records::{
    FieldMap, MemRecordStore, RawRecord, RecordError, RecordResult, RecordStore, DEAL_TABLE,
};
use serde_json::json;

fn raw(value: serde_json::Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

fn deal_record(id: i64, stage: &str, value: f64) -> RawRecord {
    raw(json!({
        "Id": id, "Name": format!("Deal {id}"), "title_c": format!("Deal {id}"),
        "value_c": value, "stage_c": stage, "contact_id_c": 1,
        "CreatedOn": "2025-04-01T09:00:00Z",
        "moved_to_stage_at_c": "2025-04-01T09:00:00Z"
    }))
}

fn controller(store: Arc<dyn RecordStore>) -> PipelineController {
    PipelineController::new(store, Arc::new(BufferedNotifier::new()))
}

#[tokio::test]
async fn loaded_board_reports_stage_totals() {
    let store = MemRecordStore::new();
    store.insert_raw(DEAL_TABLE, deal_record(1, "Lead", 1_000.0));
    store.insert_raw(DEAL_TABLE, deal_record(2, "Closed", 500.0));

    let mut controller = controller(Arc::new(store));
    controller.load().await.unwrap();

    let state = controller.state();
    assert_eq!(state.stage_total(Stage::Lead), 1_000.0);
    assert_eq!(state.stage_total(Stage::Closed), 500.0);
    assert_eq!(state.stage_total(Stage::Proposal), 0.0);
    let total_grouped: usize = Stage::ALL
        .iter()
        .map(|s| state.deals_by_stage(*s).len())
        .sum();
    assert_eq!(total_grouped, state.deals().len());
}

#[tokio::test]
async fn deal_without_known_contact_resolves_to_none() {
    let store = MemRecordStore::new();
    store.insert_raw(DEAL_TABLE, {
        let mut rec = deal_record(1, "Lead", 100.0);
        rec.insert("contact_id_c".into(), json!(99));
        rec
    });

    let mut controller = controller(Arc::new(store));
    controller.load().await.unwrap();
    let deal = controller.state().deal(1).unwrap().clone();
    assert!(controller.state().contact_for(&deal).is_none());
}

/// Store whose fetches fail while the flag is set, for retry semantics.
#[derive(Default)]
struct FlakyStore {
    inner: MemRecordStore,
    failing: AtomicBool,
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn fetch_records(&self, table: &str) -> RecordResult<Vec<RawRecord>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RecordError::Api("backend unavailable".into()));
        }
        self.inner.fetch_records(table).await
    }

    async fn get_record(&self, table: &str, id: i64) -> RecordResult<RawRecord> {
        self.inner.get_record(table, id).await
    }

    async fn create_record(&self, table: &str, fields: FieldMap) -> RecordResult<RawRecord> {
        self.inner.create_record(table, fields).await
    }

    async fn update_record(
        &self,
        table: &str,
        id: i64,
        fields: FieldMap,
    ) -> RecordResult<RawRecord> {
        self.inner.update_record(table, id, fields).await
    }

    async fn delete_record(&self, table: &str, id: i64) -> RecordResult<()> {
        self.inner.delete_record(table, id).await
    }
}

#[tokio::test]
async fn failed_load_keeps_state_and_retry_recovers() {
    let store = Arc::new(FlakyStore {
        inner: MemRecordStore::with_demo_data(),
        failing: AtomicBool::new(true),
    });
    let mut controller = controller(store.clone());

    controller.load().await.unwrap_err();
    assert!(controller.state().deals().is_empty());

    store.failing.store(false, Ordering::SeqCst);
    controller.load().await.unwrap();
    assert_eq!(controller.state().deals().len(), 5);
    assert_eq!(controller.state().contacts().len(), 3);
}

#[tokio::test]
async fn contact_search_matches_name_company_and_email() {
    let store = Arc::new(MemRecordStore::with_demo_data());
    let mut controller = controller(store);
    controller.load().await.unwrap();

    let by_name: Vec<_> = controller
        .search_contacts("ada")
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(by_name, vec![1]);

    let by_company: Vec<_> = controller
        .search_contacts("GLOBEX")
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(by_company, vec![3]);

    let by_email: Vec<_> = controller
        .search_contacts("initech.test")
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(by_email, vec![2]);

    assert!(controller.search_contacts("   ").is_empty());
}

#[tokio::test]
async fn contact_detail_collects_deals_and_their_activities() {
    let store = Arc::new(MemRecordStore::with_demo_data());
    let mut controller = controller(store);
    controller.load().await.unwrap();

    let detail = controller.contact_detail(1).unwrap();
    assert_eq!(detail.contact.name, "Ada Lovelace");
    let mut deal_ids: Vec<i64> = detail.deals.iter().map(|d| d.id).collect();
    deal_ids.sort_unstable();
    assert_eq!(deal_ids, vec![1, 2]);
    assert_eq!(detail.activities.len(), 2);

    assert!(controller.contact_detail(99).is_none());
}

#[tokio::test]
async fn added_deal_lands_on_the_board_with_a_created_activity() {
    let store = Arc::new(MemRecordStore::with_demo_data());
    let notifier = Arc::new(BufferedNotifier::new());
    let mut controller = PipelineController::new(store, notifier.clone());
    controller.load().await.unwrap();

    let deal = controller
        .add_deal(&NewDeal {
            title: "Initech Upsell".into(),
            value: 7_500.0,
            stage: Stage::Lead,
            contact_id: 2,
        })
        .await
        .unwrap();

    assert_eq!(controller.state().deals().len(), 6);
    assert_eq!(controller.state().deal(deal.id).unwrap().stage, Stage::Lead);
    let created: Vec<_> = controller
        .state()
        .activities()
        .iter()
        .filter(|a| a.deal_id == deal.id && a.kind == ActivityKind::DealCreated)
        .collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].from_stage, None);
    assert_eq!(created[0].to_stage, Stage::Lead);
    assert_eq!(notifier.drain().len(), 1);
}
