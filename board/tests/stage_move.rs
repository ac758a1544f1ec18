use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use board::{BufferedNotifier, Notice, PipelineController, StageMoveError};
use entity::{ActivityKind, Stage};
use platform_records::{
    FieldMap, MemRecordStore, RawRecord, RecordError, RecordResult, RecordStore, ACTIVITY_TABLE,
    DEAL_TABLE,
};

/// Record store double: delegates to the in-memory store, counts calls, and
/// fails on demand per table.
#[derive(Default)]
struct ScriptedStore {
    inner: MemRecordStore,
    update_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_updates: AtomicBool,
    fail_activity_creates: AtomicBool,
}

impl ScriptedStore {
    fn with_demo_data() -> Self {
        Self {
            inner: MemRecordStore::with_demo_data(),
            ..Self::default()
        }
    }

    fn rejected() -> RecordError {
        RecordError::Api("rejected by test".into())
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn fetch_records(&self, table: &str) -> RecordResult<Vec<RawRecord>> {
        self.inner.fetch_records(table).await
    }

    async fn get_record(&self, table: &str, id: i64) -> RecordResult<RawRecord> {
        self.inner.get_record(table, id).await
    }

    async fn create_record(&self, table: &str, fields: FieldMap) -> RecordResult<RawRecord> {
        if table == ACTIVITY_TABLE {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_activity_creates.load(Ordering::SeqCst) {
                return Err(Self::rejected());
            }
        }
        self.inner.create_record(table, fields).await
    }

    async fn update_record(
        &self,
        table: &str,
        id: i64,
        fields: FieldMap,
    ) -> RecordResult<RawRecord> {
        if table == DEAL_TABLE {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(Self::rejected());
            }
        }
        self.inner.update_record(table, id, fields).await
    }

    async fn delete_record(&self, table: &str, id: i64) -> RecordResult<()> {
        self.inner.delete_record(table, id).await
    }
}

async fn loaded_controller(
    store: Arc<ScriptedStore>,
) -> (PipelineController, Arc<BufferedNotifier>) {
    let notifier = Arc::new(BufferedNotifier::new());
    let mut controller = PipelineController::new(store, notifier.clone());
    controller.load().await.expect("demo data loads");
    (controller, notifier)
}

#[tokio::test]
async fn drop_moves_the_deal_and_appends_one_activity() {
    let store = Arc::new(ScriptedStore::with_demo_data());
    let (mut controller, notifier) = loaded_controller(store.clone()).await;
    let before = controller.state().deal(1).unwrap().moved_to_stage_at;

    controller.drag_start(1);
    controller.drag_over(Stage::Qualified);
    controller.drop_on(Stage::Qualified).await.unwrap();

    assert!(controller.drag().is_idle());
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

    let moved = controller.state().deal(1).unwrap();
    assert_eq!(moved.stage, Stage::Qualified);
    assert!(moved.moved_to_stage_at > before);
    assert!(controller
        .state()
        .deals_by_stage(Stage::Lead)
        .iter()
        .all(|d| d.id != 1));

    let audits: Vec<_> = controller
        .state()
        .activities()
        .iter()
        .filter(|a| a.deal_id == 1 && a.kind == ActivityKind::StageChanged)
        .collect();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].from_stage, Some(Stage::Lead));
    assert_eq!(audits[0].to_stage, Stage::Qualified);

    assert_eq!(
        notifier.drain(),
        vec![Notice::success("Deal moved to Qualified")]
    );
}

#[tokio::test]
async fn drop_on_own_column_is_a_silent_cancel() {
    let store = Arc::new(ScriptedStore::with_demo_data());
    let (mut controller, notifier) = loaded_controller(store.clone()).await;

    controller.drag_start(1);
    controller.drag_over(Stage::Lead);
    controller.drop_on(Stage::Lead).await.unwrap();

    assert!(controller.drag().is_idle());
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.state().deal(1).unwrap().stage, Stage::Lead);
    assert!(notifier.drain().is_empty());
}

#[tokio::test]
async fn failed_update_leaves_the_board_untouched() {
    let store = Arc::new(ScriptedStore::with_demo_data());
    let (mut controller, notifier) = loaded_controller(store.clone()).await;
    store.fail_updates.store(true, Ordering::SeqCst);

    controller.drag_start(1);
    let err = controller.drop_on(Stage::Closed).await.unwrap_err();
    assert!(matches!(err, StageMoveError::Update(_)));

    assert!(controller.drag().is_idle());
    assert_eq!(controller.state().deal(1).unwrap().stage, Stage::Lead);
    // the audit step is never attempted after a failed update
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        notifier.drain(),
        vec![Notice::error("Failed to update deal stage")]
    );
}

#[tokio::test]
async fn activity_append_failure_does_not_roll_back_the_move() {
    let store = Arc::new(ScriptedStore::with_demo_data());
    let (mut controller, notifier) = loaded_controller(store.clone()).await;
    store.fail_activity_creates.store(true, Ordering::SeqCst);

    let moved = controller
        .move_deal_stage(1, Stage::Proposal)
        .await
        .unwrap();
    assert_eq!(moved.stage, Stage::Proposal);
    assert_eq!(controller.state().deal(1).unwrap().stage, Stage::Proposal);
    assert_eq!(
        notifier.drain(),
        vec![Notice::success("Deal moved to Proposal")]
    );
}

#[tokio::test]
async fn moving_an_unknown_deal_fails_without_calls() {
    let store = Arc::new(ScriptedStore::with_demo_data());
    let (mut controller, _notifier) = loaded_controller(store.clone()).await;

    let err = controller
        .move_deal_stage(99, Stage::Closed)
        .await
        .unwrap_err();
    assert!(matches!(err, StageMoveError::UnknownDeal(99)));
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_op_move_skips_the_server_entirely() {
    let store = Arc::new(ScriptedStore::with_demo_data());
    let (mut controller, notifier) = loaded_controller(store.clone()).await;

    let deal = controller.move_deal_stage(1, Stage::Lead).await.unwrap();
    assert_eq!(deal.stage, Stage::Lead);
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    assert!(notifier.drain().is_empty());
}
