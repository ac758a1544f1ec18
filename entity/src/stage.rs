use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage of a deal. Variant order is board column order; it does
/// not constrain transitions (any stage may move to any other).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Closed,
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("unknown stage: {0}")]
pub struct StageParseError(pub String);

impl Stage {
    /// All stages in board order.
    pub const ALL: [Stage; 5] = [
        Stage::Lead,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Lead => "Lead",
            Stage::Qualified => "Qualified",
            Stage::Proposal => "Proposal",
            Stage::Negotiation => "Negotiation",
            Stage::Closed => "Closed",
        }
    }

    /// Display color used for the column dot and card accent.
    pub fn color(self) -> &'static str {
        match self {
            Stage::Lead => "blue",
            Stage::Qualified => "indigo",
            Stage::Proposal => "purple",
            Stage::Negotiation => "amber",
            Stage::Closed => "green",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lead" => Ok(Stage::Lead),
            "Qualified" => Ok(Stage::Qualified),
            "Proposal" => Ok(Stage::Proposal),
            "Negotiation" => Ok(Stage::Negotiation),
            "Closed" => Ok(Stage::Closed),
            other => Err(StageParseError(other.to_string())),
        }
    }
}
