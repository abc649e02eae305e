use roundtable_core::db::open_db_in_memory;
use roundtable_core::repo::candidate_repo::CandidateListQuery;
use roundtable_core::{
    CandidateId, CandidateRepository, CoreError, EliminationService, EliminationSweep, Round,
    ScheduleService, SqliteCandidateRepository, SqliteSlotRepository,
};
use rusqlite::Connection;

fn register(conn: &Connection, email: &str, fresher: bool) -> CandidateId {
    ScheduleService::new(
        SqliteSlotRepository::new(conn),
        SqliteCandidateRepository::new(conn),
    )
    .register_candidate("Candidate", email, fresher)
    .unwrap()
    .uuid
}

fn eliminated(conn: &Connection, id: CandidateId) -> bool {
    SqliteCandidateRepository::new(conn)
        .get_candidate(id)
        .unwrap()
        .unwrap()
        .is_eliminated
}

#[test]
fn non_fresher_sweep_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let fresher = register(&conn, "f@example.com", true);
    let senior_a = register(&conn, "a@example.com", false);
    let senior_b = register(&conn, "b@example.com", false);
    let sweeps = EliminationService::new(SqliteCandidateRepository::new(&conn));

    assert_eq!(sweeps.eliminate_non_freshers().unwrap(), 2);
    assert_eq!(sweeps.run(EliminationSweep::NonFresher).unwrap(), 0);

    assert!(!eliminated(&conn, fresher));
    assert!(eliminated(&conn, senior_a));
    assert!(eliminated(&conn, senior_b));
}

#[test]
fn task_sweeps_spare_submitters() {
    let conn = open_db_in_memory().unwrap();
    let schedule = ScheduleService::new(
        SqliteSlotRepository::new(&conn),
        SqliteCandidateRepository::new(&conn),
    );
    let both = register(&conn, "both@example.com", true);
    let only_one = register(&conn, "one@example.com", true);
    let none = register(&conn, "none@example.com", true);
    schedule.mark_task_submitted(both, Round::One).unwrap();
    schedule.mark_task_submitted(both, Round::Two).unwrap();
    schedule.mark_task_submitted(only_one, Round::One).unwrap();
    let sweeps = EliminationService::new(SqliteCandidateRepository::new(&conn));

    assert_eq!(sweeps.eliminate_missing_round_one_task().unwrap(), 1);
    assert!(eliminated(&conn, none));

    assert_eq!(sweeps.eliminate_missing_round_two_task().unwrap(), 1);
    assert!(eliminated(&conn, only_one));
    assert!(!eliminated(&conn, both));

    assert_eq!(sweeps.eliminate_missing_round_two_task().unwrap(), 0);
    let active = SqliteCandidateRepository::new(&conn)
        .list_candidates(&CandidateListQuery::default())
        .unwrap();
    assert_eq!(active.iter().map(|c| c.uuid).collect::<Vec<_>>(), vec![both]);
}

#[test]
fn round_three_has_no_task_to_mark() {
    let conn = open_db_in_memory().unwrap();
    let id = register(&conn, "c@example.com", true);
    let schedule = ScheduleService::new(
        SqliteSlotRepository::new(&conn),
        SqliteCandidateRepository::new(&conn),
    );

    let err = schedule.mark_task_submitted(id, Round::Three).unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "round"));

    let err = schedule
        .mark_task_submitted(uuid::Uuid::new_v4(), Round::One)
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[test]
fn duplicate_registration_names_email_field() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "dup@example.com", true);
    let err = ScheduleService::new(
        SqliteSlotRepository::new(&conn),
        SqliteCandidateRepository::new(&conn),
    )
    .register_candidate("Again", " DUP@example.com ", true)
    .unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "email"));
}
