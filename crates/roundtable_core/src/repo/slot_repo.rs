//! Slot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist slots with their admin and candidate reference sets.
//! - Provide the conditional claim write and status/reviewer queries.
//!
//! # Invariants
//! - `claim_if_unassigned` is one conditional `UPDATE`; of any number of
//!   concurrent callers for a slot, exactly one observes a changed row.
//! - Reference sets keep insertion order via `position` and never hold
//!   duplicates (primary key on the pair).
//! - Listings are deterministic: `time_ms ASC, uuid ASC`.

use super::admin_repo::load_admin;
use super::candidate_repo::load_candidate;
use super::{bool_to_int, parse_flag, parse_uuid, RepoError, RepoResult};
use crate::model::admin::{Admin, AdminId};
use crate::model::candidate::CandidateId;
use crate::model::slot::{ClaimableFilter, Round, Slot, SlotId, SlotStatus, SlotView};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const SLOT_SELECT_SQL: &str = "SELECT
    uuid,
    round,
    time_ms,
    reviewer_uuid,
    meet_link,
    is_ready,
    status,
    created_at,
    updated_at
FROM slots";

/// Outcome of adding an admin to an already claimed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResult {
    Joined,
    AlreadyJoined,
    /// Slot has no primary reviewer yet; nothing was written.
    Unclaimed,
}

/// Repository interface for interview slots.
pub trait SlotRepository {
    fn create_slot(&self, round: Round, time_ms: i64) -> RepoResult<Slot>;
    fn get_slot(&self, id: SlotId) -> RepoResult<Option<Slot>>;
    /// Returns `false` when the candidate was already attached.
    fn attach_candidate(&self, id: SlotId, candidate: CandidateId) -> RepoResult<bool>;
    fn set_ready(&self, id: SlotId, is_ready: bool) -> RepoResult<()>;
    /// Sets reviewer and meeting link and records the reviewer as an admin,
    /// only if the slot has no reviewer. Returns whether this call won.
    fn claim_if_unassigned(
        &self,
        id: SlotId,
        reviewer: AdminId,
        meet_link: &str,
    ) -> RepoResult<bool>;
    /// Appends `admin` to a claimed slot's admin set.
    fn join_admin(&self, id: SlotId, admin: AdminId) -> RepoResult<JoinResult>;
    fn list_claimable(&self, filter: ClaimableFilter) -> RepoResult<Vec<Slot>>;
    fn list_by_reviewer(&self, reviewer: AdminId) -> RepoResult<Vec<Slot>>;
    /// Expands admin and candidate references.
    fn populate(&self, slot: Slot) -> RepoResult<SlotView>;
}

/// SQLite-backed slot repository.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn create_slot(&self, round: Round, time_ms: i64) -> RepoResult<Slot> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO slots (uuid, round, time_ms, status, is_ready)
             VALUES (?1, ?2, ?3, 'pending', 0);",
            params![id.to_string(), round.number(), time_ms],
        )?;
        load_required_slot(self.conn, id)
    }

    fn get_slot(&self, id: SlotId) -> RepoResult<Option<Slot>> {
        load_slot(self.conn, id)
    }

    fn attach_candidate(&self, id: SlotId, candidate: CandidateId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_slot_exists(&tx, id)?;
        if load_candidate(&tx, candidate)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "candidate",
                id: candidate,
            });
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO slot_candidates (slot_uuid, candidate_uuid, position)
             VALUES (
                ?1,
                ?2,
                (SELECT COALESCE(MAX(position), -1) + 1 FROM slot_candidates WHERE slot_uuid = ?1)
             );",
            params![id.to_string(), candidate.to_string()],
        )?;
        tx.commit()?;
        Ok(inserted == 1)
    }

    fn set_ready(&self, id: SlotId, is_ready: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE slots
             SET is_ready = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(is_ready)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "slot", id });
        }
        Ok(())
    }

    fn claim_if_unassigned(
        &self,
        id: SlotId,
        reviewer: AdminId,
        meet_link: &str,
    ) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let claimed = tx.execute(
            "UPDATE slots
             SET reviewer_uuid = ?2,
                 meet_link = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND reviewer_uuid IS NULL;",
            params![id.to_string(), reviewer.to_string(), meet_link],
        )?;
        if claimed == 0 {
            return Ok(false);
        }

        insert_slot_admin(&tx, id, reviewer)?;
        tx.commit()?;
        Ok(true)
    }

    fn join_admin(&self, id: SlotId, admin: AdminId) -> RepoResult<JoinResult> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let reviewer: Option<Option<String>> = tx
            .query_row(
                "SELECT reviewer_uuid FROM slots WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let result = match reviewer {
            None => return Err(RepoError::NotFound { entity: "slot", id }),
            Some(None) => JoinResult::Unclaimed,
            Some(Some(_)) => {
                if insert_slot_admin(&tx, id, admin)? {
                    JoinResult::Joined
                } else {
                    JoinResult::AlreadyJoined
                }
            }
        };
        tx.commit()?;
        Ok(result)
    }

    fn list_claimable(&self, filter: ClaimableFilter) -> RepoResult<Vec<Slot>> {
        let meet_link_predicate = match filter {
            ClaimableFilter::Pending => "meet_link IS NULL",
            ClaimableFilter::Ongoing => "meet_link IS NOT NULL",
        };
        let sql = format!(
            "{SLOT_SELECT_SQL}
             WHERE status = 'pending'
               AND is_ready = 1
               AND {meet_link_predicate}
             ORDER BY time_ms ASC, uuid ASC;"
        );
        query_slots(self.conn, &sql, [])
    }

    fn list_by_reviewer(&self, reviewer: AdminId) -> RepoResult<Vec<Slot>> {
        let sql = format!(
            "{SLOT_SELECT_SQL}
             WHERE reviewer_uuid = ?1
             ORDER BY time_ms ASC, uuid ASC;"
        );
        query_slots(self.conn, &sql, [reviewer.to_string()])
    }

    fn populate(&self, slot: Slot) -> RepoResult<SlotView> {
        let reviewer = match slot.reviewer {
            Some(id) => Some(required_admin(self.conn, id)?.summary()),
            None => None,
        };

        let mut admins = Vec::with_capacity(slot.admins.len());
        for id in &slot.admins {
            admins.push(required_admin(self.conn, *id)?.summary());
        }

        let mut candidates = Vec::with_capacity(slot.candidates.len());
        for id in &slot.candidates {
            let candidate = load_candidate(self.conn, *id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("slot {} references missing candidate {id}", slot.uuid))
            })?;
            candidates.push(candidate);
        }

        Ok(SlotView {
            slot,
            reviewer,
            admins,
            candidates,
        })
    }
}

/// Moves a slot to `completed`. Paired with the candidate write by the
/// review repository.
pub(crate) fn mark_slot_completed(conn: &Connection, id: SlotId) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE slots
         SET status = ?2,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE uuid = ?1;",
        params![id.to_string(), SlotStatus::Completed.as_str()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound { entity: "slot", id });
    }
    Ok(())
}

fn insert_slot_admin(conn: &Connection, id: SlotId, admin: AdminId) -> RepoResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO slot_admins (slot_uuid, admin_uuid, position)
         VALUES (
            ?1,
            ?2,
            (SELECT COALESCE(MAX(position), -1) + 1 FROM slot_admins WHERE slot_uuid = ?1)
         );",
        params![id.to_string(), admin.to_string()],
    )?;
    Ok(inserted == 1)
}

fn ensure_slot_exists(conn: &Connection, id: SlotId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM slots WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::NotFound { entity: "slot", id });
    }
    Ok(())
}

fn required_admin(conn: &Connection, id: AdminId) -> RepoResult<Admin> {
    load_admin(conn, id)?
        .ok_or_else(|| RepoError::InvalidData(format!("slot references missing admin {id}")))
}

fn load_required_slot(conn: &Connection, id: SlotId) -> RepoResult<Slot> {
    load_slot(conn, id)?.ok_or(RepoError::NotFound { entity: "slot", id })
}

pub(crate) fn load_slot(conn: &Connection, id: SlotId) -> RepoResult<Option<Slot>> {
    let sql = format!("{SLOT_SELECT_SQL} WHERE uuid = ?1;");
    let mut slots = query_slots(conn, &sql, [id.to_string()])?;
    Ok(slots.pop())
}

fn query_slots<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> RepoResult<Vec<Slot>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut slots = Vec::new();
    while let Some(row) = rows.next()? {
        slots.push(parse_slot_row(row)?);
    }
    drop(rows);

    for slot in &mut slots {
        slot.admins = list_refs(
            conn,
            "SELECT admin_uuid FROM slot_admins WHERE slot_uuid = ?1 ORDER BY position ASC;",
            slot.uuid,
            "slot_admins.admin_uuid",
        )?;
        slot.candidates = list_refs(
            conn,
            "SELECT candidate_uuid FROM slot_candidates WHERE slot_uuid = ?1 ORDER BY position ASC;",
            slot.uuid,
            "slot_candidates.candidate_uuid",
        )?;
    }
    Ok(slots)
}

fn list_refs(
    conn: &Connection,
    sql: &str,
    slot: SlotId,
    column: &'static str,
) -> RepoResult<Vec<Uuid>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query([slot.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, column)?);
    }
    Ok(ids)
}

fn parse_slot_row(row: &Row<'_>) -> RepoResult<Slot> {
    let uuid_text: String = row.get("uuid")?;

    let round_value: i64 = row.get("round")?;
    let round = u8::try_from(round_value)
        .ok()
        .and_then(Round::from_number)
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid round `{round_value}` in slots.round"))
        })?;

    let status_text: String = row.get("status")?;
    let status = SlotStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid slot status `{status_text}` in slots.status"))
    })?;

    let reviewer = row
        .get::<_, Option<String>>("reviewer_uuid")?
        .map(|value| parse_uuid(&value, "slots.reviewer_uuid"))
        .transpose()?;

    Ok(Slot {
        uuid: parse_uuid(&uuid_text, "slots.uuid")?,
        round,
        time_ms: row.get("time_ms")?,
        reviewer,
        admins: Vec::new(),
        candidates: Vec::new(),
        meet_link: row.get("meet_link")?,
        is_ready: parse_flag(row.get("is_ready")?, "slots.is_ready")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
