//! Administrative scheduling: slots, candidates and who sits where.
//!
//! # Responsibility
//! - Create slots and candidates and attach candidates to slots.
//! - Open slots for claiming and record task hand-ins.
//!
//! # Invariants
//! - Slot times without an explicit offset are read as India Standard Time.
//! - Attaching the same candidate twice is a no-op.

use crate::error::{CoreError, CoreResult};
use crate::model::candidate::{Candidate, CandidateId};
use crate::model::slot::{Round, Slot, SlotId};
use crate::model::{parse_local_time, ValidationError};
use crate::repo::candidate_repo::CandidateRepository;
use crate::repo::slot_repo::SlotRepository;
use log::info;

pub struct ScheduleService<S: SlotRepository, C: CandidateRepository> {
    slots: S,
    candidates: C,
}

impl<S: SlotRepository, C: CandidateRepository> ScheduleService<S, C> {
    pub fn new(slots: S, candidates: C) -> Self {
        Self { slots, candidates }
    }

    /// Creates a pending, not-ready slot for `round` at `date_time`.
    pub fn create_slot(&self, round: u8, date_time: &str) -> CoreResult<Slot> {
        let round = Round::try_from(round)?;
        let time_ms = parse_local_time("dateTime", date_time)?;
        let slot = self.slots.create_slot(round, time_ms)?;
        info!(
            "event=slot_create module=schedule status=ok slot_id={} round={}",
            slot.uuid,
            round.number()
        );
        Ok(slot)
    }

    pub fn register_candidate(
        &self,
        name: &str,
        email: &str,
        is_fresher: bool,
    ) -> CoreResult<Candidate> {
        let mut candidate = Candidate::new(name.trim(), email.trim().to_ascii_lowercase());
        candidate.is_fresher = is_fresher;
        candidate.validate()?;
        let id = self.candidates.create_candidate(&candidate)?;
        info!(
            "event=candidate_register module=schedule status=ok candidate_id={} fresher={}",
            id, is_fresher
        );
        self.candidates
            .get_candidate(id)?
            .ok_or(CoreError::not_found("candidate", id))
    }

    /// Returns `false` when the candidate was already attached.
    pub fn attach_candidate(&self, slot_id: SlotId, candidate_id: CandidateId) -> CoreResult<bool> {
        let attached = self.slots.attach_candidate(slot_id, candidate_id)?;
        info!(
            "event=slot_attach module=schedule status=ok slot_id={} candidate_id={} attached={}",
            slot_id, candidate_id, attached
        );
        Ok(attached)
    }

    pub fn set_slot_ready(&self, slot_id: SlotId, is_ready: bool) -> CoreResult<Slot> {
        self.slots.set_ready(slot_id, is_ready)?;
        self.slots
            .get_slot(slot_id)?
            .ok_or(CoreError::not_found("slot", slot_id))
    }

    /// Records that a candidate handed in the task of round 1 or 2.
    pub fn mark_task_submitted(&self, candidate_id: CandidateId, round: Round) -> CoreResult<()> {
        if round == Round::Three {
            return Err(ValidationError::new("round", "round 3 has no task to submit").into());
        }
        self.candidates.mark_task_submitted(candidate_id, round)?;
        Ok(())
    }
}
