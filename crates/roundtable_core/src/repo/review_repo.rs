//! Review persistence spanning the candidate and slot stores.
//!
//! # Invariants
//! - The candidate write happens before the slot write, inside one
//!   `BEGIN IMMEDIATE` transaction. Either both land or neither does.

use super::candidate_repo::apply_review;
use super::slot_repo::mark_slot_completed;
use super::RepoResult;
use crate::model::candidate::CandidateId;
use crate::model::review::PreparedReview;
use crate::model::slot::SlotId;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Repository interface for completing a review.
pub trait ReviewRepository {
    /// Applies `review` to the candidate and completes the slot.
    fn record_review(
        &self,
        slot: SlotId,
        candidate: CandidateId,
        review: &PreparedReview,
    ) -> RepoResult<()>;
}

/// SQLite-backed review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn record_review(
        &self,
        slot: SlotId,
        candidate: CandidateId,
        review: &PreparedReview,
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        apply_review(&tx, candidate, review)?;
        mark_slot_completed(&tx, slot)?;
        tx.commit()?;
        Ok(())
    }
}
