pub mod activity;
pub mod contact;
pub mod deal;
pub mod stage;

pub use activity::{Activity, ActivityKind, NewActivity};
pub use contact::Contact;
pub use deal::{Deal, DealPatch, NewDeal};
pub use stage::{Stage, StageParseError};
