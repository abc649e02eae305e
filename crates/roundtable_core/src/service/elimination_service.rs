//! Batch elimination sweeps.
//!
//! Each sweep is a single bulk update; repeating one changes nothing and
//! reports zero.

use crate::error::CoreResult;
use crate::repo::candidate_repo::{CandidateRepository, EliminationCriterion};
use log::info;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationSweep {
    /// Drops every candidate not flagged as a fresher.
    NonFresher,
    /// Drops candidates who never submitted the round-1 task.
    RoundOneTaskMissing,
    /// Drops candidates who never submitted the round-2 task.
    RoundTwoTaskMissing,
}

impl EliminationSweep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonFresher => "non_fresher",
            Self::RoundOneTaskMissing => "round1_task_missing",
            Self::RoundTwoTaskMissing => "round2_task_missing",
        }
    }

    fn criterion(self) -> EliminationCriterion {
        match self {
            Self::NonFresher => EliminationCriterion::NonFresher,
            Self::RoundOneTaskMissing => EliminationCriterion::RoundOneTaskMissing,
            Self::RoundTwoTaskMissing => EliminationCriterion::RoundTwoTaskMissing,
        }
    }
}

pub struct EliminationService<R: CandidateRepository> {
    repo: R,
}

impl<R: CandidateRepository> EliminationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Runs `sweep` and returns how many candidates it newly eliminated.
    pub fn run(&self, sweep: EliminationSweep) -> CoreResult<u64> {
        let started = Instant::now();
        let eliminated = self.repo.eliminate(sweep.criterion())?;
        info!(
            "event=elimination_sweep module=elimination status=ok sweep={} eliminated={} duration_ms={}",
            sweep.as_str(),
            eliminated,
            started.elapsed().as_millis()
        );
        Ok(eliminated)
    }

    pub fn eliminate_non_freshers(&self) -> CoreResult<u64> {
        self.run(EliminationSweep::NonFresher)
    }

    pub fn eliminate_missing_round_one_task(&self) -> CoreResult<u64> {
        self.run(EliminationSweep::RoundOneTaskMissing)
    }

    pub fn eliminate_missing_round_two_task(&self) -> CoreResult<u64> {
        self.run(EliminationSweep::RoundTwoTaskMissing)
    }
}
