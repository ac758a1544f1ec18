use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use entity::{Activity, Contact, Deal, DealPatch, NewActivity, NewDeal, Stage};
use platform_records::{
    ActivityService, ContactService, DealService, RecordError, RecordStore,
};

use crate::drag::DragSession;
use crate::notify::{Notice, Notifier};
use crate::state::BoardState;

#[derive(Debug, Error)]
#[error("failed to load pipeline data: {0}")]
pub struct LoadError(#[from] pub RecordError);

#[derive(Debug, Error)]
pub enum StageMoveError {
    #[error("deal {0} is not on the board")]
    UnknownDeal(i64),
    #[error("deal {0} already has a stage move in flight")]
    MoveInFlight(i64),
    #[error("stage update failed: {0}")]
    Update(RecordError),
}

/// Everything the contact-detail panel shows for one contact.
#[derive(Clone, Debug)]
pub struct ContactDetail {
    pub contact: Contact,
    pub deals: Vec<Deal>,
    pub activities: Vec<Activity>,
}

/// Drives the pipeline board: load, drag session, stage transitions, and
/// the page-level workflows around them.
///
/// Server calls run sequentially; the board state only changes after a call
/// succeeds (pessimistic update). The activity log is best-effort audit:
/// its failures are logged, never rolled back into the deal update.
pub struct PipelineController {
    deals: DealService,
    contacts: ContactService,
    activities: ActivityService,
    notifier: Arc<dyn Notifier>,
    state: BoardState,
    drag: DragSession,
    in_flight: Arc<Mutex<HashSet<i64>>>,
}

/// Releases the in-flight reservation even if the move future is dropped
/// at an await point.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<i64>>>,
    deal_id: i64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("in-flight set poisoned")
            .remove(&self.deal_id);
    }
}

impl PipelineController {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            deals: DealService::new(store.clone()),
            contacts: ContactService::new(store.clone()),
            activities: ActivityService::new(store),
            notifier,
            state: BoardState::default(),
            drag: DragSession::default(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    /// Full snapshot load of deals, contacts, and activities. On failure the
    /// previous state is left untouched so the caller can retry.
    pub async fn load(&mut self) -> Result<(), LoadError> {
        let (deals, contacts, activities) = tokio::try_join!(
            self.deals.get_all(),
            self.contacts.get_all(),
            self.activities.get_all(),
        )?;
        info!(
            deals = deals.len(),
            contacts = contacts.len(),
            activities = activities.len(),
            "pipeline data loaded"
        );
        self.state.replace(deals, contacts, activities);
        Ok(())
    }

    /// Begins dragging a card. Unknown ids are ignored.
    pub fn drag_start(&mut self, deal_id: i64) {
        if let Some(deal) = self.state.deal(deal_id) {
            self.drag.start(deal.clone());
        }
    }

    pub fn drag_over(&mut self, stage: Stage) {
        self.drag.over(stage);
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    /// Ends the drag without a drop (cancel).
    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    /// Completes a drop on a column. The session always resets to idle;
    /// dropping a card back on its own column is a silent cancel, and a
    /// second drop racing an in-flight move on the same deal is ignored.
    pub async fn drop_on(&mut self, stage: Stage) -> Result<(), StageMoveError> {
        let payload = self.drag.payload().cloned();
        self.drag.end();
        let Some(deal) = payload else {
            return Ok(());
        };
        if deal.stage == stage {
            return Ok(());
        }
        match self.move_deal_stage(deal.id, stage).await {
            Ok(_) => Ok(()),
            Err(StageMoveError::MoveInFlight(id)) => {
                debug!(deal_id = id, "drop ignored, move already in flight");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Commits a stage change: update the deal (stage + moved_to_stage_at),
    /// append a `stage_changed` activity, re-fetch the activity log, then
    /// swap in the server's deal. The update failing leaves the board
    /// untouched; the audit steps failing does not undo the update.
    pub async fn move_deal_stage(
        &mut self,
        deal_id: i64,
        target: Stage,
    ) -> Result<Deal, StageMoveError> {
        let _guard = self
            .begin_move(deal_id)
            .ok_or(StageMoveError::MoveInFlight(deal_id))?;

        let deal = self
            .state
            .deal(deal_id)
            .ok_or(StageMoveError::UnknownDeal(deal_id))?;
        if deal.stage == target {
            return Ok(deal.clone());
        }
        let from = deal.stage;

        let patch = DealPatch::stage_move(target, Utc::now());
        let updated = match self.deals.update(deal_id, &patch).await {
            Ok(deal) => deal,
            Err(err) => {
                warn!(deal_id, error = %err, "stage update failed");
                self.notifier
                    .notify(Notice::error("Failed to update deal stage"));
                return Err(StageMoveError::Update(err));
            }
        };
        info!(deal_id, from = %from, to = %target, "deal stage moved");

        let audit = NewActivity::stage_changed(deal_id, from, target);
        if let Err(err) = self.activities.create(&audit).await {
            warn!(deal_id, error = %err, "stage_changed activity append failed");
        }
        self.reload_activities().await;

        self.state.replace_deal(updated.clone());
        self.notifier
            .notify(Notice::success(format!("Deal moved to {target}")));
        Ok(updated)
    }

    /// Creates a deal, shows it on the board, and appends a `deal_created`
    /// audit activity (best-effort, like the stage-change audit).
    pub async fn add_deal(&mut self, input: &NewDeal) -> Result<Deal, RecordError> {
        let deal = match self.deals.create(input).await {
            Ok(deal) => deal,
            Err(err) => {
                self.notifier.notify(Notice::error("Failed to create deal"));
                return Err(err);
            }
        };
        self.state.push_deal(deal.clone());

        let audit = NewActivity::deal_created(deal.id, deal.stage);
        if let Err(err) = self.activities.create(&audit).await {
            warn!(deal_id = deal.id, error = %err, "deal_created activity append failed");
        }
        self.reload_activities().await;

        self.notifier
            .notify(Notice::success(format!("Deal \"{}\" added", deal.title)));
        Ok(deal)
    }

    /// Case-insensitive contact search over name, company, and email.
    pub fn search_contacts(&self, query: &str) -> Vec<&Contact> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return vec![];
        }
        self.state
            .contacts()
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || matches(&c.company, &needle)
                    || matches(&c.email, &needle)
            })
            .collect()
    }

    /// The contact's deals and the activities referencing those deals.
    pub fn contact_detail(&self, contact_id: i64) -> Option<ContactDetail> {
        let contact = self
            .state
            .contacts()
            .iter()
            .find(|c| c.id == contact_id)?
            .clone();
        let deals: Vec<Deal> = self
            .state
            .deals()
            .iter()
            .filter(|d| d.contact_id == contact_id)
            .cloned()
            .collect();
        let activities = self
            .state
            .activities()
            .iter()
            .filter(|a| deals.iter().any(|d| d.id == a.deal_id))
            .cloned()
            .collect();
        Some(ContactDetail {
            contact,
            deals,
            activities,
        })
    }

    fn begin_move(&self, deal_id: i64) -> Option<InFlightGuard> {
        let mut set = self.in_flight.lock().expect("in-flight set poisoned");
        if !set.insert(deal_id) {
            return None;
        }
        Some(InFlightGuard {
            set: self.in_flight.clone(),
            deal_id,
        })
    }

    /// The log is append-only, so the full list is re-fetched instead of
    /// appended locally. A failed refresh keeps the stale list.
    async fn reload_activities(&mut self) {
        match self.activities.get_all().await {
            Ok(activities) => self.state.set_activities(activities),
            Err(err) => warn!(error = %err, "activity reload failed"),
        }
    }
}

fn matches(field: &Option<String>, needle: &str) -> bool {
    field
        .as_deref()
        .map(|v| v.to_lowercase().contains(needle))
        .unwrap_or(false)
}
