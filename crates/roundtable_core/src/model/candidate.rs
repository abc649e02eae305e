//! Candidate records and their per-round state.
//!
//! # Invariants
//! - `current_round` never decreases.
//! - Round-2 task fields are only written when round 1 completes.
//! - Round records exist from creation on, all starting `pending`.

use super::slot::Round;
use super::{non_blank, parse_local_time, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CandidateId = Uuid;

/// Completion state of one interview round for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    Pending,
    Completed,
}

impl RoundStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Scored fields recorded by a round-1 reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoundOneScores {
    pub tech_stack: Option<String>,
    pub technical_skills: Option<u8>,
    pub communication_skills: Option<u8>,
    pub problem_solving: Option<u8>,
    pub domain_knowledge: Option<u8>,
    pub interest_to_learn: Option<u8>,
    pub management_skills: Option<u8>,
    pub overall_rating: Option<u8>,
    pub group_discussion: Option<u8>,
    pub communication: Option<u8>,
    pub leadership: Option<u8>,
    pub critical_thinking: Option<u8>,
    pub teamwork: Option<u8>,
    pub relevancy: Option<u8>,
}

/// Scored fields recorded by a round-3 reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoundThreeScores {
    pub technical_skills: Option<u8>,
    pub communication_skills: Option<u8>,
    pub teamwork_abilities: Option<u8>,
    pub project_performance: Option<u8>,
}

/// Take-home task handed out at the end of round 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub title: String,
    pub description: String,
    /// Epoch ms.
    pub deadline_ms: i64,
}

impl TaskAssignment {
    /// Builds a task from raw reviewer input.
    ///
    /// `deadline` is RFC 3339, or a naive date-time read as India Standard
    /// Time (`2025-01-10T10:00`).
    ///
    /// # Errors
    /// Names the first missing field among `taskTitle`, `taskDescription`
    /// and `taskDeadline`, or `taskDeadline` when it does not parse.
    pub fn from_input(
        title: Option<&str>,
        description: Option<&str>,
        deadline: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let title = non_blank(title).ok_or_else(|| ValidationError::required("taskTitle"))?;
        let description =
            non_blank(description).ok_or_else(|| ValidationError::required("taskDescription"))?;
        let deadline =
            non_blank(deadline).ok_or_else(|| ValidationError::required("taskDeadline"))?;
        let deadline_ms = parse_local_time("taskDeadline", deadline)?;

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            deadline_ms,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOneRecord {
    pub scores: RoundOneScores,
    pub additional_feedback: Option<String>,
    pub task_submitted: bool,
    pub status: RoundStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTwoRecord {
    pub task: Option<TaskAssignment>,
    pub additional_feedback: Option<String>,
    pub task_submitted: bool,
    pub status: RoundStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundThreeRecord {
    pub scores: RoundThreeScores,
    pub additional_feedback: Option<String>,
    pub status: RoundStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRounds {
    pub round1: RoundOneRecord,
    pub round2: RoundTwoRecord,
    pub round3: RoundThreeRecord,
}

impl CandidateRounds {
    pub fn status(&self, round: Round) -> RoundStatus {
        match round {
            Round::One => self.round1.status,
            Round::Two => self.round2.status,
            Round::Three => self.round3.status,
        }
    }
}

/// Interview candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub uuid: CandidateId,
    pub name: String,
    pub email: String,
    pub is_fresher: bool,
    pub is_eliminated: bool,
    pub current_round: u32,
    pub rounds: CandidateRounds,
}

impl Candidate {
    /// Creates a fresher candidate with empty, pending round records.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            is_fresher: true,
            is_eliminated: false,
            current_round: 0,
            rounds: CandidateRounds::default(),
        }
    }

    /// Whether a review for `round` is still outstanding.
    ///
    /// Only rounds 1 and 3 are reviewed in slots.
    pub fn awaits_review(&self, round: Round) -> bool {
        round.is_reviewable() && self.rounds.status(round) == RoundStatus::Pending
    }

    /// Checks the fields a registration must carry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if non_blank(Some(self.name.as_str())).is_none() {
            return Err(ValidationError::required("name"));
        }
        if non_blank(Some(self.email.as_str())).is_none() {
            return Err(ValidationError::required("email"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Candidate, RoundStatus, TaskAssignment};
    use crate::model::slot::Round;

    #[test]
    fn new_candidate_starts_pending_everywhere() {
        let candidate = Candidate::new("C1", "c1@example.com");
        assert_eq!(candidate.current_round, 0);
        for round in [Round::One, Round::Two, Round::Three] {
            assert_eq!(candidate.rounds.status(round), RoundStatus::Pending);
        }
        assert!(candidate.rounds.round2.task.is_none());
    }

    #[test]
    fn round_two_never_awaits_slot_review() {
        let candidate = Candidate::new("C1", "c1@example.com");
        assert!(candidate.awaits_review(Round::One));
        assert!(!candidate.awaits_review(Round::Two));
        assert!(candidate.awaits_review(Round::Three));
    }

    #[test]
    fn task_requires_every_field_in_order() {
        let err = TaskAssignment::from_input(None, Some("d"), None).unwrap_err();
        assert_eq!(err.field, "taskTitle");

        let err = TaskAssignment::from_input(Some("t"), Some(" "), Some("x")).unwrap_err();
        assert_eq!(err.field, "taskDescription");

        let err = TaskAssignment::from_input(Some("t"), Some("d"), None).unwrap_err();
        assert_eq!(err.field, "taskDeadline");
    }

    #[test]
    fn task_deadline_keeps_offset_semantics() {
        let task = TaskAssignment::from_input(
            Some("Build X"),
            Some("..."),
            Some("2025-01-10T10:00:00+05:30"),
        )
        .unwrap();
        // 04:30 UTC
        assert_eq!(task.deadline_ms, 1_736_483_400_000);

        let err = TaskAssignment::from_input(Some("t"), Some("d"), Some("tomorrow")).unwrap_err();
        assert_eq!(err.field, "taskDeadline");
    }

    #[test]
    fn task_deadline_without_offset_is_ist() {
        let task =
            TaskAssignment::from_input(Some("Build X"), Some("..."), Some("2025-01-10T10:00"))
                .unwrap();
        assert_eq!(task.deadline_ms, 1_736_483_400_000);
    }
}
