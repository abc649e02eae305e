use chrono::{Duration, Utc};
use roundtable_core::auth::token::{TokenCodec, TokenKind};
use roundtable_core::db::open_db_in_memory;
use roundtable_core::{
    AdminRepository, CoreError, Identity, SessionConfig, SessionManager, SqliteAdminRepository,
};

fn config() -> SessionConfig {
    SessionConfig::new(
        "access-secret-integration-01",
        "refresh-secret-integration-02",
        false,
    )
}

fn identity() -> Identity {
    Identity::new("Priya Sharma 22BCE1001", "  Priya.Sharma@Example.com ")
}

#[test]
fn first_login_creates_admin_with_derived_fields() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &config());

    let outcome = sessions.login(&identity(), "laptop").unwrap();
    assert!(outcome.created);
    assert_eq!(outcome.admin.name, "Priya Sharma");
    assert_eq!(outcome.admin.email, "priya.sharma@example.com");
    assert!(!outcome.admin.access);
    assert!(outcome.admin.meet_link.is_none());

    let again = sessions.login(&identity(), "phone").unwrap();
    assert!(!again.created);
    assert_eq!(again.admin.uuid, outcome.admin.uuid);
}

#[test]
fn login_rejects_bad_identity_and_blank_device() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &config());

    let err = sessions
        .login(&Identity::new("Someone", "not-an-email"), "laptop")
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "email"));

    let err = sessions.login(&identity(), "   ").unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "deviceId"));
}

#[test]
fn relogin_on_same_device_replaces_its_session() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAdminRepository::new(&conn);
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &config());

    let first = sessions.login(&identity(), "laptop").unwrap();
    let second = sessions.login(&identity(), "laptop").unwrap();
    sessions.login(&identity(), "phone").unwrap();

    let stored = repo.list_sessions(first.admin.uuid).unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored
        .iter()
        .any(|s| s.device_id == "laptop" && s.token == second.tokens.refresh_token));

    let err = sessions.refresh(&first.tokens.refresh_token).unwrap_err();
    assert!(matches!(err, CoreError::InvalidToken));
    assert!(sessions.refresh(&second.tokens.refresh_token).is_ok());
}

#[test]
fn refreshed_access_token_authenticates() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &config());
    let login = sessions.login(&identity(), "laptop").unwrap();

    let access = sessions.refresh(&login.tokens.refresh_token).unwrap();
    let admin = sessions.authenticate(&access).unwrap();
    assert_eq!(admin.uuid, login.admin.uuid);

    let err = sessions.authenticate(&login.tokens.refresh_token).unwrap_err();
    assert!(matches!(err, CoreError::InvalidToken));
}

#[test]
fn expired_and_garbage_refresh_tokens_are_distinguished() {
    let conn = open_db_in_memory().unwrap();
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &config());
    let login = sessions.login(&identity(), "laptop").unwrap();

    let codec = TokenCodec::new(&config());
    let stale = codec
        .issue(
            TokenKind::Refresh,
            login.admin.uuid,
            Utc::now() - Duration::days(8),
        )
        .unwrap();

    let err = sessions.refresh(&stale.token).unwrap_err();
    assert!(matches!(err, CoreError::ExpiredToken));
    assert_eq!(err.status_code(), 401);

    let err = sessions.refresh("garbage").unwrap_err();
    assert!(matches!(err, CoreError::InvalidToken));
}

#[test]
fn logout_removes_session_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAdminRepository::new(&conn);
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &config());
    let login = sessions.login(&identity(), "laptop").unwrap();

    sessions.logout(&login.tokens.refresh_token);
    sessions.logout(&login.tokens.refresh_token);
    sessions.logout("not-a-token");

    assert!(repo.list_sessions(login.admin.uuid).unwrap().is_empty());
    let err = sessions.refresh(&login.tokens.refresh_token).unwrap_err();
    assert!(matches!(err, CoreError::InvalidToken));
}

#[test]
fn prune_drops_only_expired_sessions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAdminRepository::new(&conn);
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &config());
    let login = sessions.login(&identity(), "laptop").unwrap();

    assert_eq!(sessions.prune_expired_sessions(Utc::now()).unwrap(), 0);
    assert_eq!(
        sessions
            .prune_expired_sessions(Utc::now() + Duration::days(8))
            .unwrap(),
        1
    );
    assert!(repo.list_sessions(login.admin.uuid).unwrap().is_empty());
}

#[test]
fn production_config_marks_session_cookies_secure() {
    let conn = open_db_in_memory().unwrap();
    let production = SessionConfig::new(
        "access-secret-integration-01",
        "refresh-secret-integration-02",
        true,
    );
    let sessions = SessionManager::new(SqliteAdminRepository::new(&conn), &production);

    let outcome = sessions.login(&identity(), "laptop").unwrap();
    let [access, refresh] = sessions.cookie_policy().session_cookies(&outcome.tokens);
    assert_eq!(access.value, outcome.tokens.access_token);
    assert!(access.secure && refresh.secure);

    let local = SessionManager::new(SqliteAdminRepository::new(&conn), &config());
    assert!(local.cookie_policy().cleared_cookies().iter().all(|c| !c.secure));
}
