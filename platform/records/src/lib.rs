//! Record-service layer over the hosted data platform.
//!
//! Records live in named tables and arrive as loosely-typed JSON maps with
//! platform fields (`Id`, `Name`, `CreatedOn`) plus `_c`-suffixed custom
//! fields. This crate owns the single mapping boundary between those raw
//! records and the typed entities, and exposes one thin service per table.

mod http;
mod map;
mod mem;
mod service;
mod store;

use thiserror::Error;

pub use http::HttpRecordStore;
pub use mem::MemRecordStore;
pub use service::{ActivityService, ContactService, DealService};
pub use store::{FieldMap, RawRecord, RecordStore};

/// Table names on the hosted platform.
pub const DEAL_TABLE: &str = "deal_c";
pub const CONTACT_TABLE: &str = "contact_c";
pub const ACTIVITY_TABLE: &str = "activity_c";

pub type RecordResult<T> = Result<T, RecordError>;

/// All record-store failures are recoverable: the board surfaces them and
/// leaves local state untouched.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("record api error: {0}")]
    Api(String),
    #[error("{table} record {id} not found")]
    NotFound { table: String, id: i64 },
    #[error("malformed {table} record: {reason}")]
    Malformed { table: String, reason: String },
}

impl RecordError {
    pub(crate) fn malformed(table: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(table: &str, id: i64) -> Self {
        Self::NotFound {
            table: table.to_string(),
            id,
        }
    }
}
