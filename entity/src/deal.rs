use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A deal on the pipeline board. `moved_to_stage_at` changes whenever
/// `stage` changes and only then.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub title: String,
    /// Monetary value; never negative, missing on the wire reads as 0.
    pub value: f64,
    pub stage: Stage,
    pub contact_id: i64,
    pub created_at: DateTime<Utc>,
    pub moved_to_stage_at: DateTime<Utc>,
}

impl Deal {
    /// Whole days the deal has sat in its current stage, rounded up.
    pub fn days_in_stage(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = now.signed_duration_since(self.moved_to_stage_at);
        let seconds = elapsed.num_seconds().max(0);
        (seconds + 86_399) / 86_400
    }
}

/// Fields for creating a deal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewDeal {
    pub title: String,
    pub value: f64,
    pub stage: Stage,
    pub contact_id: i64,
}

/// Partial update for a deal; only set fields are sent to the store.
#[derive(Clone, Debug, Default)]
pub struct DealPatch {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<Stage>,
    pub contact_id: Option<i64>,
    pub moved_to_stage_at: Option<DateTime<Utc>>,
}

impl DealPatch {
    pub fn stage_move(stage: Stage, at: DateTime<Utc>) -> Self {
        Self {
            stage: Some(stage),
            moved_to_stage_at: Some(at),
            ..Self::default()
        }
    }
}
