//! Slot assignment use cases.
//!
//! # Responsibility
//! - Let reviewers claim unassigned slots and join claimed ones.
//! - Invite attached candidates once a slot has a reviewer.
//!
//! # Invariants
//! - A slot is claimed at most once; losers of a race observe `NotFound`.
//! - Notification failures never fail the claim.

use crate::error::{CoreError, CoreResult};
use crate::model::admin::AdminId;
use crate::model::slot::{ClaimableFilter, SlotId, SlotView};
use crate::notify::{interview_invite, Notifier};
use crate::repo::admin_repo::AdminRepository;
use crate::repo::slot_repo::{JoinResult, SlotRepository};
use log::{info, warn};

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub slot: SlotView,
    /// `true` when the reviewer was already in the admin set.
    pub already_joined: bool,
}

pub struct AssignmentService<S, A, N>
where
    S: SlotRepository,
    A: AdminRepository,
    N: Notifier,
{
    slots: S,
    admins: A,
    notifier: N,
}

impl<S, A, N> AssignmentService<S, A, N>
where
    S: SlotRepository,
    A: AdminRepository,
    N: Notifier,
{
    pub fn new(slots: S, admins: A, notifier: N) -> Self {
        Self {
            slots,
            admins,
            notifier,
        }
    }

    /// Makes `reviewer_id` the primary reviewer of `slot_id`.
    ///
    /// # Errors
    /// - `NotFound` for an unknown reviewer.
    /// - `PreconditionFailed` when the reviewer has no meeting link.
    /// - `NotFound` when the slot is unknown or already claimed.
    pub fn claim_slot(&self, slot_id: SlotId, reviewer_id: AdminId) -> CoreResult<SlotView> {
        let reviewer = self
            .admins
            .get_admin(reviewer_id)?
            .ok_or(CoreError::not_found("admin", reviewer_id))?;
        let Some(meet_link) = reviewer.usable_meet_link() else {
            return Err(CoreError::PreconditionFailed(
                "submit a meeting link before claiming slots".to_string(),
            ));
        };

        if !self
            .slots
            .claim_if_unassigned(slot_id, reviewer_id, meet_link)?
        {
            info!(
                "event=slot_claim module=assignment status=rejected slot_id={} admin_id={}",
                slot_id, reviewer_id
            );
            return Err(CoreError::not_found("slot", slot_id));
        }

        let view = self.populated(slot_id)?;
        info!(
            "event=slot_claim module=assignment status=ok slot_id={} admin_id={} candidates={}",
            slot_id,
            reviewer_id,
            view.candidates.len()
        );
        self.send_invites(&view, meet_link);
        Ok(view)
    }

    /// Adds `reviewer_id` to the admin set of an already claimed slot.
    ///
    /// # Errors
    /// - `NotFound` for an unknown reviewer or slot.
    /// - `PreconditionFailed` when nobody has claimed the slot yet.
    pub fn join_slot(&self, slot_id: SlotId, reviewer_id: AdminId) -> CoreResult<JoinOutcome> {
        if self.admins.get_admin(reviewer_id)?.is_none() {
            return Err(CoreError::not_found("admin", reviewer_id));
        }
        let already_joined = match self.slots.join_admin(slot_id, reviewer_id)? {
            JoinResult::Joined => false,
            JoinResult::AlreadyJoined => true,
            JoinResult::Unclaimed => {
                return Err(CoreError::PreconditionFailed(
                    "slot has no reviewer yet".to_string(),
                ))
            }
        };
        info!(
            "event=slot_join module=assignment status=ok slot_id={} admin_id={} already_joined={}",
            slot_id, reviewer_id, already_joined
        );
        Ok(JoinOutcome {
            slot: self.populated(slot_id)?,
            already_joined,
        })
    }

    pub fn list_claimable_slots(&self, filter: ClaimableFilter) -> CoreResult<Vec<SlotView>> {
        let slots = self.slots.list_claimable(filter)?;
        let mut views = Vec::with_capacity(slots.len());
        for slot in slots {
            views.push(self.slots.populate(slot)?);
        }
        Ok(views)
    }

    fn populated(&self, slot_id: SlotId) -> CoreResult<SlotView> {
        let slot = self
            .slots
            .get_slot(slot_id)?
            .ok_or(CoreError::not_found("slot", slot_id))?;
        Ok(self.slots.populate(slot)?)
    }

    fn send_invites(&self, view: &SlotView, meet_link: &str) {
        for candidate in &view.candidates {
            let message = interview_invite(&candidate.name, meet_link);
            if let Err(err) = self
                .notifier
                .send(&candidate.email, message.subject, &message.html_body)
            {
                warn!(
                    "event=slot_invite module=assignment status=error slot_id={} candidate_id={} error={}",
                    view.slot.uuid, candidate.uuid, err
                );
            }
        }
    }
}
