use roundtable_core::db::open_db_in_memory;
use roundtable_core::model::candidate::{RoundOneScores, RoundThreeScores};
use roundtable_core::{
    AdminId, AdminRepository, AssignmentService, CandidateId, CandidateRepository, CoreError,
    LogNotifier, RepoError, ReviewRepository, ReviewSubmission, ReviewWorkflow, Round,
    RoundOneReview, RoundStatus, RoundThreeReview, ScheduleService, SlotId, SlotRepository, SlotStatus, SqliteAdminRepository,
    SqliteCandidateRepository, SqliteReviewRepository, SqliteSlotRepository, TaskDraft,
};
use rusqlite::Connection;

const DEADLINE: &str = "2025-01-10T10:00:00+05:30";
const DEADLINE_MS: i64 = 1_736_483_400_000;

fn reviewer(conn: &Connection, email: &str, meet_link: &str) -> AdminId {
    let repo = SqliteAdminRepository::new(conn);
    let (admin, _) = repo.get_or_create_by_email("Reviewer", email).unwrap();
    repo.set_meet_link(admin.uuid, meet_link).unwrap();
    admin.uuid
}

fn schedule(conn: &Connection) -> ScheduleService<SqliteSlotRepository<'_>, SqliteCandidateRepository<'_>> {
    ScheduleService::new(
        SqliteSlotRepository::new(conn),
        SqliteCandidateRepository::new(conn),
    )
}

fn slot_with(conn: &Connection, round: u8, email: &str) -> (SlotId, CandidateId) {
    let schedule = schedule(conn);
    let slot = schedule.create_slot(round, DEADLINE).unwrap();
    let candidate = schedule.register_candidate("Candidate", email, true).unwrap();
    schedule.attach_candidate(slot.uuid, candidate.uuid).unwrap();
    schedule.set_slot_ready(slot.uuid, true).unwrap();
    (slot.uuid, candidate.uuid)
}

fn workflow(conn: &Connection) -> ReviewWorkflow<SqliteSlotRepository<'_>, SqliteReviewRepository<'_>> {
    ReviewWorkflow::new(
        SqliteSlotRepository::new(conn),
        SqliteReviewRepository::new(conn),
    )
}

fn round_one(deadline: Option<&str>) -> ReviewSubmission {
    ReviewSubmission::RoundOne(RoundOneReview {
        scores: RoundOneScores {
            tech_stack: Some("Go".to_string()),
            technical_skills: Some(8),
            ..RoundOneScores::default()
        },
        additional_feedback: Some("solid".to_string()),
        task: TaskDraft {
            title: Some("Build X".to_string()),
            description: Some("...".to_string()),
            deadline: deadline.map(str::to_string),
        },
    })
}

fn round_three() -> ReviewSubmission {
    ReviewSubmission::RoundThree(RoundThreeReview {
        scores: RoundThreeScores {
            project_performance: Some(9),
            ..RoundThreeScores::default()
        },
        additional_feedback: None,
    })
}

#[test]
fn claim_then_round_one_review_advances_candidate() {
    let conn = open_db_in_memory().unwrap();
    let r1 = reviewer(&conn, "r1@example.com", "m1");
    let r2 = reviewer(&conn, "r2@example.com", "m2");
    let (s1, c1) = slot_with(&conn, 1, "c1@example.com");
    let assignment = AssignmentService::new(
        SqliteSlotRepository::new(&conn),
        SqliteAdminRepository::new(&conn),
        LogNotifier,
    );

    assignment.claim_slot(s1, r1).unwrap();
    assert!(matches!(
        assignment.claim_slot(s1, r2).unwrap_err(),
        CoreError::NotFound { .. }
    ));

    let round = workflow(&conn)
        .submit_review(s1, c1, &round_one(Some(DEADLINE)))
        .unwrap();
    assert_eq!(round, Round::One);
    assert_eq!(round.to_string(), "Round 1");

    let candidate = SqliteCandidateRepository::new(&conn)
        .get_candidate(c1)
        .unwrap()
        .unwrap();
    assert_eq!(candidate.current_round, 1);
    assert_eq!(candidate.rounds.round1.status, RoundStatus::Completed);
    assert_eq!(candidate.rounds.round1.scores.tech_stack.as_deref(), Some("Go"));
    assert_eq!(candidate.rounds.round1.scores.communication_skills, None);
    assert_eq!(candidate.rounds.round2.status, RoundStatus::Pending);
    let task = candidate.rounds.round2.task.unwrap();
    assert_eq!(task.title, "Build X");
    assert_eq!(task.deadline_ms, DEADLINE_MS);

    let slot = SqliteSlotRepository::new(&conn).get_slot(s1).unwrap().unwrap();
    assert_eq!(slot.status, SlotStatus::Completed);
}

#[test]
fn missing_deadline_is_rejected_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let (s1, c1) = slot_with(&conn, 1, "c1@example.com");

    let err = workflow(&conn)
        .submit_review(s1, c1, &round_one(None))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "taskDeadline"));

    let err = workflow(&conn)
        .submit_review(s1, c1, &round_one(Some("next friday")))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "taskDeadline"));

    let candidate = SqliteCandidateRepository::new(&conn)
        .get_candidate(c1)
        .unwrap()
        .unwrap();
    assert_eq!(candidate.current_round, 0);
    assert_eq!(candidate.rounds.round1.status, RoundStatus::Pending);
    assert!(candidate.rounds.round2.task.is_none());
    let slot = SqliteSlotRepository::new(&conn).get_slot(s1).unwrap().unwrap();
    assert_eq!(slot.status, SlotStatus::Pending);
}

#[test]
fn failed_slot_write_rolls_back_candidate_write() {
    let conn = open_db_in_memory().unwrap();
    let (_, c1) = slot_with(&conn, 1, "c1@example.com");
    let prepared = round_one(Some(DEADLINE)).prepare(Round::One).unwrap();

    let err = SqliteReviewRepository::new(&conn)
        .record_review(uuid::Uuid::new_v4(), c1, &prepared)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "slot", .. }));

    let candidate = SqliteCandidateRepository::new(&conn)
        .get_candidate(c1)
        .unwrap()
        .unwrap();
    assert_eq!(candidate.current_round, 0);
    assert_eq!(candidate.rounds.round1.status, RoundStatus::Pending);
    assert_eq!(candidate.rounds.round1.scores.tech_stack, None);
    assert!(candidate.rounds.round2.task.is_none());
}

#[test]
fn naive_task_deadline_is_read_as_ist() {
    let conn = open_db_in_memory().unwrap();
    let (s1, c1) = slot_with(&conn, 1, "c1@example.com");

    workflow(&conn)
        .submit_review(s1, c1, &round_one(Some("2025-01-10T10:00")))
        .unwrap();

    let candidate = SqliteCandidateRepository::new(&conn)
        .get_candidate(c1)
        .unwrap()
        .unwrap();
    assert_eq!(candidate.rounds.round2.task.unwrap().deadline_ms, DEADLINE_MS);
}

#[test]
fn round_three_review_leaves_current_round() {
    let conn = open_db_in_memory().unwrap();
    let (s3, c1) = slot_with(&conn, 3, "c1@example.com");

    let round = workflow(&conn).submit_review(s3, c1, &round_three()).unwrap();
    assert_eq!(round.to_string(), "Round 3");

    let candidate = SqliteCandidateRepository::new(&conn)
        .get_candidate(c1)
        .unwrap()
        .unwrap();
    assert_eq!(candidate.current_round, 0);
    assert_eq!(candidate.rounds.round3.status, RoundStatus::Completed);
    assert_eq!(candidate.rounds.round3.scores.project_performance, Some(9));
    assert_eq!(candidate.rounds.round1.status, RoundStatus::Pending);
}

#[test]
fn candidate_outside_slot_is_forbidden_and_untouched() {
    let conn = open_db_in_memory().unwrap();
    let (s1, _) = slot_with(&conn, 1, "c1@example.com");
    let (_, outsider) = slot_with(&conn, 1, "c2@example.com");

    let err = workflow(&conn)
        .submit_review(s1, outsider, &round_one(Some(DEADLINE)))
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
    assert_eq!(err.status_code(), 403);

    let candidate = SqliteCandidateRepository::new(&conn)
        .get_candidate(outsider)
        .unwrap()
        .unwrap();
    assert_eq!(candidate.current_round, 0);
    assert_eq!(candidate.rounds.round1.status, RoundStatus::Pending);
}

#[test]
fn unknown_slot_round_two_and_round_mismatch_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (s2, c2) = slot_with(&conn, 2, "c2@example.com");
    let (s1, c1) = slot_with(&conn, 1, "c1@example.com");
    let workflow = workflow(&conn);

    let err = workflow
        .submit_review(uuid::Uuid::new_v4(), c1, &round_one(Some(DEADLINE)))
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "slot", .. }));

    let err = workflow
        .submit_review(s2, c2, &round_one(Some(DEADLINE)))
        .unwrap_err();
    assert!(matches!(err, CoreError::PreconditionFailed(_)));

    let err = workflow.submit_review(s1, c1, &round_three()).unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "round"));
}

#[test]
fn repeated_round_one_submission_increments_once() {
    let conn = open_db_in_memory().unwrap();
    let (s1, c1) = slot_with(&conn, 1, "c1@example.com");
    let workflow = workflow(&conn);

    workflow.submit_review(s1, c1, &round_one(Some(DEADLINE))).unwrap();
    workflow.submit_review(s1, c1, &round_one(Some(DEADLINE))).unwrap();

    let candidate = SqliteCandidateRepository::new(&conn)
        .get_candidate(c1)
        .unwrap()
        .unwrap();
    assert_eq!(candidate.current_round, 1);
}

#[test]
fn reviewable_slots_are_owned_and_pending() {
    let conn = open_db_in_memory().unwrap();
    let owner = reviewer(&conn, "r1@example.com", "m1");
    let other = reviewer(&conn, "r2@example.com", "m2");
    let (pending_slot, _) = slot_with(&conn, 1, "c1@example.com");
    let (done_slot, done_candidate) = slot_with(&conn, 3, "c2@example.com");
    let (round_two_slot, _) = slot_with(&conn, 2, "c3@example.com");
    let (foreign_slot, _) = slot_with(&conn, 1, "c4@example.com");

    let assignment = AssignmentService::new(
        SqliteSlotRepository::new(&conn),
        SqliteAdminRepository::new(&conn),
        LogNotifier,
    );
    for slot in [pending_slot, done_slot, round_two_slot] {
        assignment.claim_slot(slot, owner).unwrap();
    }
    assignment.claim_slot(foreign_slot, other).unwrap();

    let workflow = workflow(&conn);
    workflow
        .submit_review(done_slot, done_candidate, &round_three())
        .unwrap();

    let reviewable = workflow.list_reviewable_slots(owner).unwrap();
    assert_eq!(
        reviewable.iter().map(|v| v.slot.uuid).collect::<Vec<_>>(),
        vec![pending_slot]
    );
    assert_eq!(reviewable[0].candidates.len(), 1);
}
