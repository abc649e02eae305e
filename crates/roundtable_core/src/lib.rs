//! Core domain logic for Roundtable, a multi-round interview coordinator.
//! This crate is the single source of truth for scheduling, assignment,
//! review and elimination invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use auth::cookie::{CookiePolicy, CredentialCookie};
pub use config::{ConfigError, SessionConfig, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
pub use db::{open_db, open_db_in_memory, DbError};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::admin::{Admin, AdminId, Identity};
pub use model::candidate::{Candidate, CandidateId, RoundStatus};
pub use model::review::{ReviewSubmission, RoundOneReview, RoundThreeReview, TaskDraft};
pub use model::slot::{ClaimableFilter, Round, Slot, SlotId, SlotStatus, SlotView};
pub use model::{parse_entity_id, ValidationError};
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use repo::admin_repo::{AdminRepository, SqliteAdminRepository};
pub use repo::candidate_repo::{CandidateRepository, SqliteCandidateRepository};
pub use repo::review_repo::{ReviewRepository, SqliteReviewRepository};
pub use repo::slot_repo::{SlotRepository, SqliteSlotRepository};
pub use repo::{RepoError, RepoResult};
pub use service::admin_service::AdminService;
pub use service::assignment_service::{AssignmentService, JoinOutcome};
pub use service::elimination_service::{EliminationService, EliminationSweep};
pub use service::review_service::ReviewWorkflow;
pub use service::schedule_service::ScheduleService;
pub use service::session_service::{LoginOutcome, SessionManager, SessionTokens};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
