use entity::{Activity, Contact, Deal, Stage};

/// In-memory snapshot of the records the board renders. Rebuilt from a full
/// load at session start and patched incrementally as operations succeed.
///
/// The groupings are recomputed per call; there is no stored index, and
/// order within a stage is load order.
#[derive(Clone, Debug, Default)]
pub struct BoardState {
    deals: Vec<Deal>,
    contacts: Vec<Contact>,
    activities: Vec<Activity>,
}

impl BoardState {
    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn deal(&self, id: i64) -> Option<&Deal> {
        self.deals.iter().find(|d| d.id == id)
    }

    pub fn deals_by_stage(&self, stage: Stage) -> Vec<&Deal> {
        self.deals.iter().filter(|d| d.stage == stage).collect()
    }

    /// Sum of deal values in a stage; 0 for an empty column.
    pub fn stage_total(&self, stage: Stage) -> f64 {
        self.deals_by_stage(stage).iter().map(|d| d.value).sum()
    }

    /// The contact owning a deal; `None` renders as "Unknown Contact".
    pub fn contact_for(&self, deal: &Deal) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == deal.contact_id)
    }

    pub fn replace(&mut self, deals: Vec<Deal>, contacts: Vec<Contact>, activities: Vec<Activity>) {
        self.deals = deals;
        self.contacts = contacts;
        self.activities = activities;
    }

    /// Swaps in the server representation of one deal; all others untouched.
    pub fn replace_deal(&mut self, updated: Deal) {
        if let Some(slot) = self.deals.iter_mut().find(|d| d.id == updated.id) {
            *slot = updated;
        }
    }

    pub fn push_deal(&mut self, deal: Deal) {
        self.deals.push(deal);
    }

    pub fn set_activities(&mut self, activities: Vec<Activity>) {
        self.activities = activities;
    }
}
