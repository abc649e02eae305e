//! Review workflow: grading candidates inside a claimed slot.
//!
//! # Responsibility
//! - Validate a submission against the slot it is filed for.
//! - Drive round progression through one transactional write.
//!
//! # Invariants
//! - Nothing is written unless every check passes.
//! - A completed slot always has its candidate update alongside it.
//! - `current_round` moves only on the first completion of round 1.

use crate::error::{CoreError, CoreResult};
use crate::model::admin::AdminId;
use crate::model::candidate::CandidateId;
use crate::model::review::ReviewSubmission;
use crate::model::slot::{Round, SlotId, SlotView};
use crate::repo::review_repo::ReviewRepository;
use crate::repo::slot_repo::SlotRepository;
use log::info;

pub struct ReviewWorkflow<S: SlotRepository, V: ReviewRepository> {
    slots: S,
    reviews: V,
}

impl<S: SlotRepository, V: ReviewRepository> ReviewWorkflow<S, V> {
    pub fn new(slots: S, reviews: V) -> Self {
        Self { slots, reviews }
    }

    /// Records a review for `candidate_id` in `slot_id` and completes the slot.
    ///
    /// Returns the graded round; its `Display` is the "Round N" label.
    ///
    /// # Errors
    /// - `NotFound` for an unknown slot.
    /// - `Forbidden` when the candidate is not attached to the slot.
    /// - `PreconditionFailed` for round-2 slots.
    /// - `Validation` for a round mismatch or a missing/malformed task field.
    pub fn submit_review(
        &self,
        slot_id: SlotId,
        candidate_id: CandidateId,
        submission: &ReviewSubmission,
    ) -> CoreResult<Round> {
        let slot = self
            .slots
            .get_slot(slot_id)?
            .ok_or(CoreError::not_found("slot", slot_id))?;
        if !slot.has_candidate(candidate_id) {
            info!(
                "event=review_submit module=review status=rejected slot_id={} candidate_id={} reason=forbidden",
                slot_id, candidate_id
            );
            return Err(CoreError::Forbidden(
                "candidate is not attached to this slot".to_string(),
            ));
        }
        if !slot.round.is_reviewable() {
            return Err(CoreError::PreconditionFailed(format!(
                "{} slots take no review submissions",
                slot.round
            )));
        }

        let prepared = submission.prepare(slot.round)?;
        self.reviews
            .record_review(slot_id, candidate_id, &prepared)?;

        info!(
            "event=review_submit module=review status=ok slot_id={} candidate_id={} round={}",
            slot_id,
            candidate_id,
            slot.round.number()
        );
        Ok(slot.round)
    }

    /// Slots owned by `reviewer_id` that still hold a candidate awaiting a
    /// review for the slot's round.
    pub fn list_reviewable_slots(&self, reviewer_id: AdminId) -> CoreResult<Vec<SlotView>> {
        let mut reviewable = Vec::new();
        for slot in self.slots.list_by_reviewer(reviewer_id)? {
            if !slot.round.is_reviewable() {
                continue;
            }
            let view = self.slots.populate(slot)?;
            if view.has_pending_review() {
                reviewable.push(view);
            }
        }
        Ok(reviewable)
    }
}
