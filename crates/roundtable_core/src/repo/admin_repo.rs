//! Admin repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist reviewer accounts and their per-device sessions.
//!
//! # Invariants
//! - First login for an email creates exactly one admin, even under races.
//! - Replacing a device session is atomic: no reader sees two sessions for
//!   the same device.

use super::{bool_to_int, parse_flag, parse_uuid, RepoError, RepoResult};
use crate::model::admin::{Admin, AdminId, AdminSession};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const ADMIN_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    meet_link,
    access,
    created_at,
    updated_at
FROM admins";

const SESSION_SELECT_SQL: &str = "SELECT
    admin_uuid,
    device_id,
    token,
    expires_at,
    created_at
FROM admin_sessions";

/// Repository interface for reviewer accounts and sessions.
pub trait AdminRepository {
    /// Returns the admin for `email`, creating it with `name` on first sight.
    /// The flag is `true` when this call created the record.
    fn get_or_create_by_email(&self, name: &str, email: &str) -> RepoResult<(Admin, bool)>;
    fn get_admin(&self, id: AdminId) -> RepoResult<Option<Admin>>;
    fn set_meet_link(&self, id: AdminId, meet_link: &str) -> RepoResult<()>;
    fn set_access(&self, id: AdminId, access: bool) -> RepoResult<()>;
    /// Drops any session bound to the same device, then stores `session`.
    /// Returns whether an older session was dropped.
    fn replace_device_session(&self, session: &AdminSession) -> RepoResult<bool>;
    fn find_session(&self, admin: AdminId, token: &str) -> RepoResult<Option<AdminSession>>;
    /// Returns whether a session was removed.
    fn remove_session(&self, admin: AdminId, token: &str) -> RepoResult<bool>;
    fn list_sessions(&self, admin: AdminId) -> RepoResult<Vec<AdminSession>>;
    /// Deletes sessions that expired at or before `now_ms`.
    fn prune_expired_sessions(&self, now_ms: i64) -> RepoResult<u64>;
}

/// SQLite-backed admin repository.
pub struct SqliteAdminRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAdminRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AdminRepository for SqliteAdminRepository<'_> {
    fn get_or_create_by_email(&self, name: &str, email: &str) -> RepoResult<(Admin, bool)> {
        let inserted = self.conn.execute(
            "INSERT INTO admins (uuid, name, email)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (email) DO NOTHING;",
            params![Uuid::new_v4().to_string(), name, email],
        )?;

        let mut stmt = self
            .conn
            .prepare(&format!("{ADMIN_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => Ok((parse_admin_row(row)?, inserted == 1)),
            None => Err(RepoError::InvalidData(format!(
                "admin for `{email}` missing after upsert"
            ))),
        }
    }

    fn get_admin(&self, id: AdminId) -> RepoResult<Option<Admin>> {
        load_admin(self.conn, id)
    }

    fn set_meet_link(&self, id: AdminId, meet_link: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE admins
             SET meet_link = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), meet_link],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "admin", id });
        }
        Ok(())
    }

    fn set_access(&self, id: AdminId, access: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE admins
             SET access = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(access)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "admin", id });
        }
        Ok(())
    }

    fn replace_device_session(&self, session: &AdminSession) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM admin_sessions
             WHERE admin_uuid = ?1
               AND device_id = ?2;",
            params![session.admin_uuid.to_string(), session.device_id],
        )?;
        tx.execute(
            "INSERT INTO admin_sessions (admin_uuid, device_id, token, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                session.admin_uuid.to_string(),
                session.device_id,
                session.token,
                session.expires_at,
                session.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn find_session(&self, admin: AdminId, token: &str) -> RepoResult<Option<AdminSession>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SESSION_SELECT_SQL}
             WHERE admin_uuid = ?1
               AND token = ?2;"
        ))?;
        let mut rows = stmt.query(params![admin.to_string(), token])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_session_row(row)?));
        }
        Ok(None)
    }

    fn remove_session(&self, admin: AdminId, token: &str) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM admin_sessions
             WHERE admin_uuid = ?1
               AND token = ?2;",
            params![admin.to_string(), token],
        )?;
        Ok(removed > 0)
    }

    fn list_sessions(&self, admin: AdminId) -> RepoResult<Vec<AdminSession>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SESSION_SELECT_SQL}
             WHERE admin_uuid = ?1
             ORDER BY created_at ASC, device_id ASC;"
        ))?;
        let mut rows = stmt.query([admin.to_string()])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_session_row(row)?);
        }
        Ok(sessions)
    }

    fn prune_expired_sessions(&self, now_ms: i64) -> RepoResult<u64> {
        let removed = self.conn.execute(
            "DELETE FROM admin_sessions WHERE expires_at <= ?1;",
            [now_ms],
        )?;
        Ok(removed as u64)
    }
}

/// Loads one admin by id on any connection or open transaction.
pub(crate) fn load_admin(conn: &Connection, id: AdminId) -> RepoResult<Option<Admin>> {
    conn.query_row(
        &format!("{ADMIN_SELECT_SQL} WHERE uuid = ?1;"),
        [id.to_string()],
        |row| Ok(parse_admin_row(row)),
    )
    .optional()?
    .transpose()
}

fn parse_admin_row(row: &Row<'_>) -> RepoResult<Admin> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Admin {
        uuid: parse_uuid(&uuid_text, "admins.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        meet_link: row.get("meet_link")?,
        access: parse_flag(row.get("access")?, "admins.access")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<AdminSession> {
    let admin_text: String = row.get("admin_uuid")?;
    Ok(AdminSession {
        admin_uuid: parse_uuid(&admin_text, "admin_sessions.admin_uuid")?,
        device_id: row.get("device_id")?,
        token: row.get("token")?,
        expires_at: row.get("expires_at")?,
        created_at: row.get("created_at")?,
    })
}
