//! Review submissions, one shape per reviewable round.

use super::candidate::{RoundOneScores, RoundThreeScores, TaskAssignment};
use super::slot::Round;
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Raw round-2 task fields as typed by the reviewer.
///
/// Flattened into the round-1 payload as `taskTitle`, `taskDescription`
/// and `taskDeadline`, the names validation errors report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDraft {
    #[serde(rename = "taskTitle")]
    pub title: Option<String>,
    #[serde(rename = "taskDescription")]
    pub description: Option<String>,
    /// RFC 3339, or naive and read as India Standard Time.
    #[serde(rename = "taskDeadline")]
    pub deadline: Option<String>,
}

impl TaskDraft {
    pub fn finalize(&self) -> Result<TaskAssignment, ValidationError> {
        TaskAssignment::from_input(
            self.title.as_deref(),
            self.description.as_deref(),
            self.deadline.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoundOneReview {
    pub scores: RoundOneScores,
    pub additional_feedback: Option<String>,
    #[serde(flatten)]
    pub task: TaskDraft,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoundThreeReview {
    pub scores: RoundThreeScores,
    pub additional_feedback: Option<String>,
}

/// Review payload, tagged by the round it grades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "round", rename_all = "camelCase")]
pub enum ReviewSubmission {
    RoundOne(RoundOneReview),
    RoundThree(RoundThreeReview),
}

impl ReviewSubmission {
    pub fn round(&self) -> Round {
        match self {
            Self::RoundOne(_) => Round::One,
            Self::RoundThree(_) => Round::Three,
        }
    }

    /// Validates the submission against the slot it is filed for and
    /// produces the write the candidate store applies.
    pub fn prepare(&self, slot_round: Round) -> Result<PreparedReview, ValidationError> {
        if self.round() != slot_round {
            return Err(ValidationError::new(
                "round",
                format!(
                    "submission grades {} but the slot is {}",
                    self.round(),
                    slot_round
                ),
            ));
        }

        match self {
            Self::RoundOne(review) => Ok(PreparedReview::RoundOne {
                scores: review.scores.clone(),
                additional_feedback: review.additional_feedback.clone(),
                task: review.task.finalize()?,
            }),
            Self::RoundThree(review) => Ok(PreparedReview::RoundThree {
                scores: review.scores.clone(),
                additional_feedback: review.additional_feedback.clone(),
            }),
        }
    }
}

/// Fully validated review, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedReview {
    RoundOne {
        scores: RoundOneScores,
        additional_feedback: Option<String>,
        task: TaskAssignment,
    },
    RoundThree {
        scores: RoundThreeScores,
        additional_feedback: Option<String>,
    },
}
