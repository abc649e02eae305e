//! Interview slot records.
//!
//! # Invariants
//! - `reviewer` moves from `None` to `Some` at most once.
//! - `meet_link` is set together with `reviewer` and never changes after.
//! - `admins` contains the reviewer once claimed, without duplicates.

use super::admin::{AdminId, AdminSummary};
use super::candidate::{Candidate, CandidateId};
use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type SlotId = Uuid;

/// One of the three sequential interview stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Round {
    One,
    Two,
    Three,
}

impl Round {
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    /// Round 2 is graded outside slot reviews.
    pub fn is_reviewable(self) -> bool {
        matches!(self, Self::One | Self::Three)
    }
}

impl Display for Round {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Round {}", self.number())
    }
}

impl TryFrom<u8> for Round {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value)
            .ok_or_else(|| ValidationError::new("round", format!("round must be 1, 2 or 3, got {value}")))
    }
}

impl From<Round> for u8 {
    fn from(value: Round) -> Self {
        value.number()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Pending,
    Ongoing,
    Completed,
}

impl SlotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "ongoing" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Scheduled interview block for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub uuid: SlotId,
    pub round: Round,
    /// Epoch ms.
    pub time_ms: i64,
    /// Primary reviewer; `None` until claimed.
    pub reviewer: Option<AdminId>,
    /// Every admin who joined, primary reviewer included, in join order.
    pub admins: Vec<AdminId>,
    pub candidates: Vec<CandidateId>,
    pub meet_link: Option<String>,
    pub is_ready: bool,
    pub status: SlotStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Slot {
    pub fn has_candidate(&self, candidate: CandidateId) -> bool {
        self.candidates.contains(&candidate)
    }
}

/// Slot with its admin and candidate references expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub slot: Slot,
    pub reviewer: Option<AdminSummary>,
    pub admins: Vec<AdminSummary>,
    pub candidates: Vec<Candidate>,
}

impl SlotView {
    /// Whether the reviewer still owes a review to any attached candidate.
    pub fn has_pending_review(&self) -> bool {
        self.candidates
            .iter()
            .any(|candidate| candidate.awaits_review(self.slot.round))
    }
}

/// Listing filter for slots reviewers may claim or join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimableFilter {
    /// Ready and not yet claimed (no meeting link).
    Pending,
    /// Ready, claimed (meeting link set) and not yet completed.
    Ongoing,
}

impl ClaimableFilter {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "ongoing" => Ok(Self::Ongoing),
            other => Err(ValidationError::new(
                "status",
                format!("invalid slot status `{other}`; expected pending|ongoing"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClaimableFilter, Round};

    #[test]
    fn round_label_and_numbers() {
        assert_eq!(Round::One.to_string(), "Round 1");
        assert_eq!(Round::from_number(3), Some(Round::Three));
        assert_eq!(Round::from_number(0), None);
        assert_eq!(Round::try_from(4).unwrap_err().field, "round");
    }

    #[test]
    fn claimable_filter_rejects_unknown_values() {
        assert_eq!(
            ClaimableFilter::parse("pending").unwrap(),
            ClaimableFilter::Pending
        );
        assert_eq!(
            ClaimableFilter::parse("ongoing").unwrap(),
            ClaimableFilter::Ongoing
        );
        let err = ClaimableFilter::parse("completed").unwrap_err();
        assert_eq!(err.field, "status");
    }
}
