//! Candidate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist candidates with their three round records.
//! - Apply round-specific review writes and bulk elimination sweeps.
//!
//! # Invariants
//! - Review writes are field-level sets on one row; the only arithmetic
//!   update is `current_round`, guarded on round 1 leaving `pending`.
//! - Elimination only ever sets `is_eliminated = 1`.
//! - Score sheets are stored as JSON text and validated on read.

use super::{bool_to_int, parse_flag, parse_uuid, RepoError, RepoResult};
use crate::model::candidate::{
    Candidate, CandidateId, CandidateRounds, RoundOneRecord, RoundStatus, RoundThreeRecord,
    RoundTwoRecord, TaskAssignment,
};
use crate::model::review::PreparedReview;
use crate::model::slot::Round;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;

const CANDIDATE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    is_fresher,
    is_eliminated,
    current_round,
    r1_scores,
    r1_feedback,
    r1_task_submitted,
    r1_status,
    r2_task_title,
    r2_task_description,
    r2_task_deadline,
    r2_feedback,
    r2_task_submitted,
    r2_status,
    r3_scores,
    r3_feedback,
    r3_status
FROM candidates";

/// Bulk elimination predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationCriterion {
    /// Candidate is not flagged as a fresher.
    NonFresher,
    /// Round-1 task was never submitted.
    RoundOneTaskMissing,
    /// Round-2 task was never submitted.
    RoundTwoTaskMissing,
}

impl EliminationCriterion {
    fn predicate_sql(self) -> &'static str {
        match self {
            Self::NonFresher => "is_fresher = 0",
            Self::RoundOneTaskMissing => "r1_task_submitted = 0",
            Self::RoundTwoTaskMissing => "r2_task_submitted = 0",
        }
    }
}

/// Query options for listing candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateListQuery {
    pub include_eliminated: bool,
    pub limit: Option<u32>,
}

/// Repository interface for candidate records.
pub trait CandidateRepository {
    fn create_candidate(&self, candidate: &Candidate) -> RepoResult<CandidateId>;
    fn get_candidate(&self, id: CandidateId) -> RepoResult<Option<Candidate>>;
    fn list_candidates(&self, query: &CandidateListQuery) -> RepoResult<Vec<Candidate>>;
    /// Flags the round-1 or round-2 task as handed in.
    fn mark_task_submitted(&self, id: CandidateId, round: Round) -> RepoResult<()>;
    /// Eliminates every not-yet-eliminated candidate matching `criterion`.
    /// Returns the number of rows changed.
    fn eliminate(&self, criterion: EliminationCriterion) -> RepoResult<u64>;
}

/// SQLite-backed candidate repository.
pub struct SqliteCandidateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCandidateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CandidateRepository for SqliteCandidateRepository<'_> {
    fn create_candidate(&self, candidate: &Candidate) -> RepoResult<CandidateId> {
        let rounds = &candidate.rounds;
        let task = rounds.round2.task.as_ref();
        let result = self.conn.execute(
            "INSERT INTO candidates (
                uuid,
                name,
                email,
                is_fresher,
                is_eliminated,
                current_round,
                r1_scores,
                r1_feedback,
                r1_task_submitted,
                r1_status,
                r2_task_title,
                r2_task_description,
                r2_task_deadline,
                r2_feedback,
                r2_task_submitted,
                r2_status,
                r3_scores,
                r3_feedback,
                r3_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19);",
            params![
                candidate.uuid.to_string(),
                candidate.name.trim(),
                candidate.email.trim().to_ascii_lowercase(),
                bool_to_int(candidate.is_fresher),
                bool_to_int(candidate.is_eliminated),
                candidate.current_round,
                to_json(&rounds.round1.scores)?,
                rounds.round1.additional_feedback.as_deref(),
                bool_to_int(rounds.round1.task_submitted),
                rounds.round1.status.as_str(),
                task.map(|task| task.title.as_str()),
                task.map(|task| task.description.as_str()),
                task.map(|task| task.deadline_ms),
                rounds.round2.additional_feedback.as_deref(),
                bool_to_int(rounds.round2.task_submitted),
                rounds.round2.status.as_str(),
                to_json(&rounds.round3.scores)?,
                rounds.round3.additional_feedback.as_deref(),
                rounds.round3.status.as_str(),
            ],
        );

        match result {
            Ok(_) => Ok(candidate.uuid),
            Err(err) if super::is_unique_violation(&err) => Err(RepoError::Duplicate {
                entity: "candidate",
                field: "email",
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn get_candidate(&self, id: CandidateId) -> RepoResult<Option<Candidate>> {
        load_candidate(self.conn, id)
    }

    fn list_candidates(&self, query: &CandidateListQuery) -> RepoResult<Vec<Candidate>> {
        let mut sql = format!("{CANDIDATE_SELECT_SQL} WHERE (?1 = 1 OR is_eliminated = 0)");
        sql.push_str(" ORDER BY created_at ASC, uuid ASC");
        sql.push_str(" LIMIT ?2;");

        let limit = query.limit.map_or(-1, i64::from);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![bool_to_int(query.include_eliminated), limit])?;
        let mut candidates = Vec::new();
        while let Some(row) = rows.next()? {
            candidates.push(parse_candidate_row(row)?);
        }
        Ok(candidates)
    }

    fn mark_task_submitted(&self, id: CandidateId, round: Round) -> RepoResult<()> {
        let sql = match round {
            Round::One => {
                "UPDATE candidates
                 SET r1_task_submitted = 1,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;"
            }
            Round::Two => {
                "UPDATE candidates
                 SET r2_task_submitted = 1,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;"
            }
            Round::Three => {
                return Err(RepoError::InvalidData(
                    "round 3 carries no task submission".to_string(),
                ));
            }
        };

        let changed = self.conn.execute(sql, [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "candidate",
                id,
            });
        }
        Ok(())
    }

    fn eliminate(&self, criterion: EliminationCriterion) -> RepoResult<u64> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE candidates
                 SET is_eliminated = 1,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE {}
                   AND is_eliminated = 0;",
                criterion.predicate_sql()
            ),
            [],
        )?;
        Ok(changed as u64)
    }
}

/// Writes a validated review onto one candidate row.
///
/// Runs on the caller's connection or transaction so the review repository
/// can pair it with the slot transition.
pub(crate) fn apply_review(
    conn: &Connection,
    id: CandidateId,
    review: &PreparedReview,
) -> RepoResult<()> {
    let changed = match review {
        PreparedReview::RoundOne {
            scores,
            additional_feedback,
            task,
        } => conn.execute(
            "UPDATE candidates
             SET r1_scores = ?2,
                 r1_feedback = ?3,
                 r1_status = 'completed',
                 r2_task_title = ?4,
                 r2_task_description = ?5,
                 r2_task_deadline = ?6,
                 r2_status = 'pending',
                 current_round = current_round
                    + CASE WHEN r1_status = 'completed' THEN 0 ELSE 1 END,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                to_json(scores)?,
                additional_feedback.as_deref(),
                task.title,
                task.description,
                task.deadline_ms,
            ],
        )?,
        PreparedReview::RoundThree {
            scores,
            additional_feedback,
        } => conn.execute(
            "UPDATE candidates
             SET r3_scores = ?2,
                 r3_feedback = ?3,
                 r3_status = 'completed',
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), to_json(scores)?, additional_feedback.as_deref()],
        )?,
    };

    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: "candidate",
            id,
        });
    }
    Ok(())
}

pub(crate) fn load_candidate(conn: &Connection, id: CandidateId) -> RepoResult<Option<Candidate>> {
    conn.query_row(
        &format!("{CANDIDATE_SELECT_SQL} WHERE uuid = ?1;"),
        [id.to_string()],
        |row| Ok(parse_candidate_row(row)),
    )
    .optional()?
    .transpose()
}

fn parse_candidate_row(row: &Row<'_>) -> RepoResult<Candidate> {
    let uuid_text: String = row.get("uuid")?;

    let task = match (
        row.get::<_, Option<String>>("r2_task_title")?,
        row.get::<_, Option<String>>("r2_task_description")?,
        row.get::<_, Option<i64>>("r2_task_deadline")?,
    ) {
        (Some(title), Some(description), Some(deadline_ms)) => Some(TaskAssignment {
            title,
            description,
            deadline_ms,
        }),
        (None, None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "partial round-2 task on candidate {uuid_text}"
            )));
        }
    };

    let current_round: i64 = row.get("current_round")?;
    let current_round = u32::try_from(current_round).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid current_round `{current_round}` in candidates.current_round"
        ))
    })?;

    Ok(Candidate {
        uuid: parse_uuid(&uuid_text, "candidates.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        is_fresher: parse_flag(row.get("is_fresher")?, "candidates.is_fresher")?,
        is_eliminated: parse_flag(row.get("is_eliminated")?, "candidates.is_eliminated")?,
        current_round,
        rounds: CandidateRounds {
            round1: RoundOneRecord {
                scores: from_json(&row.get::<_, String>("r1_scores")?, "candidates.r1_scores")?,
                additional_feedback: row.get("r1_feedback")?,
                task_submitted: parse_flag(
                    row.get("r1_task_submitted")?,
                    "candidates.r1_task_submitted",
                )?,
                status: parse_status(&row.get::<_, String>("r1_status")?, "candidates.r1_status")?,
            },
            round2: RoundTwoRecord {
                task,
                additional_feedback: row.get("r2_feedback")?,
                task_submitted: parse_flag(
                    row.get("r2_task_submitted")?,
                    "candidates.r2_task_submitted",
                )?,
                status: parse_status(&row.get::<_, String>("r2_status")?, "candidates.r2_status")?,
            },
            round3: RoundThreeRecord {
                scores: from_json(&row.get::<_, String>("r3_scores")?, "candidates.r3_scores")?,
                additional_feedback: row.get("r3_feedback")?,
                status: parse_status(&row.get::<_, String>("r3_status")?, "candidates.r3_status")?,
            },
        },
    })
}

fn parse_status(value: &str, column: &'static str) -> RepoResult<RoundStatus> {
    RoundStatus::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid round status `{value}` in {column}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("score sheet not serializable: {err}")))
}

fn from_json<T: DeserializeOwned>(value: &str, column: &'static str) -> RepoResult<T> {
    serde_json::from_str(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in {column}: {err}")))
}
