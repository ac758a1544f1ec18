use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Append-only audit record describing a deal event. The board creates
/// activities but never mutates or deletes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub deal_id: i64,
    pub kind: ActivityKind,
    /// Absent for `DealCreated`.
    pub from_stage: Option<Stage>,
    pub to_stage: Stage,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ActivityKind {
    DealCreated,
    StageChanged,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::DealCreated => "deal_created",
            ActivityKind::StageChanged => "stage_changed",
        }
    }
}

/// Fields for appending an activity; the store assigns id and timestamp.
#[derive(Clone, Debug)]
pub struct NewActivity {
    pub deal_id: i64,
    pub kind: ActivityKind,
    pub from_stage: Option<Stage>,
    pub to_stage: Stage,
}

impl NewActivity {
    pub fn stage_changed(deal_id: i64, from: Stage, to: Stage) -> Self {
        Self {
            deal_id,
            kind: ActivityKind::StageChanged,
            from_stage: Some(from),
            to_stage: to,
        }
    }

    pub fn deal_created(deal_id: i64, stage: Stage) -> Self {
        Self {
            deal_id,
            kind: ActivityKind::DealCreated,
            from_stage: None,
            to_stage: stage,
        }
    }
}
