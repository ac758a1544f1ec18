use entity::{Deal, Stage};

/// Transient interactive state between picking up a card and releasing it.
///
/// Three states: idle, carrying a deal, carrying a deal over a column.
/// Only one drag can be active at a time; the tracker is synchronous
/// event-handler state and is never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        deal: Deal,
    },
    OverTarget {
        deal: Deal,
        target: Stage,
    },
}

impl DragSession {
    /// Begins a drag, recording the full deal as the payload.
    pub fn start(&mut self, deal: Deal) {
        *self = DragSession::Dragging { deal };
    }

    /// Records the hovered column. Re-entrant: hovering a new column just
    /// retargets. Ignored when no drag is in progress.
    pub fn over(&mut self, target: Stage) {
        *self = match std::mem::take(self) {
            DragSession::Idle => DragSession::Idle,
            DragSession::Dragging { deal } | DragSession::OverTarget { deal, .. } => {
                DragSession::OverTarget { deal, target }
            }
        };
    }

    /// Clears the drop-target highlight without dropping the payload.
    pub fn leave(&mut self) {
        if let DragSession::OverTarget { deal, .. } = std::mem::take(self) {
            *self = DragSession::Dragging { deal };
        }
    }

    /// Ends the drag (drop or cancel), unconditionally returning to idle.
    pub fn end(&mut self) {
        *self = DragSession::Idle;
    }

    pub fn payload(&self) -> Option<&Deal> {
        match self {
            DragSession::Idle => None,
            DragSession::Dragging { deal } | DragSession::OverTarget { deal, .. } => Some(deal),
        }
    }

    pub fn target(&self) -> Option<Stage> {
        match self {
            DragSession::OverTarget { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn is_dragging(&self, deal_id: i64) -> bool {
        self.payload().map(|d| d.id == deal_id).unwrap_or(false)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragSession::Idle)
    }
}
