use serde::{Deserialize, Serialize};

/// A contact referenced by deals. Many deals may point at one contact; the
/// board never owns or mutates contacts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}
