//! Reviewer session lifecycle.
//!
//! # Responsibility
//! - Turn a pre-authenticated identity into an admin plus a credential pair.
//! - Exchange refresh credentials for access credentials.
//!
//! # Invariants
//! - At most one stored session per `(admin, device_id)`; a new login on the
//!   same device replaces the old one atomically.
//! - A refresh credential is honoured only while its stored session exists.
//! - Logout never fails from the caller's view.

use crate::auth::cookie::CookiePolicy;
use crate::auth::token::{TokenCodec, TokenKind};
use crate::config::SessionConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::admin::{Admin, AdminSession, Identity};
use crate::model::ValidationError;
use crate::repo::admin_repo::AdminRepository;
use chrono::{DateTime, Utc};
use log::{info, warn};

/// Credential pair returned by a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub admin: Admin,
    pub tokens: SessionTokens,
    /// `true` when this login created the admin record.
    pub created: bool,
}

pub struct SessionManager<R: AdminRepository> {
    repo: R,
    codec: TokenCodec,
    cookies: CookiePolicy,
}

impl<R: AdminRepository> SessionManager<R> {
    pub fn new(repo: R, config: &SessionConfig) -> Self {
        Self {
            repo,
            codec: TokenCodec::new(config),
            cookies: CookiePolicy::from_config(config),
        }
    }

    /// Cookie settings for the deployment this manager was configured for.
    pub fn cookie_policy(&self) -> CookiePolicy {
        self.cookies
    }

    /// Logs a reviewer in on one device.
    ///
    /// # Errors
    /// - `Validation` for a blank name, a malformed email or a blank device.
    /// - `Storage` when the admin or session write fails.
    pub fn login(&self, identity: &Identity, device_id: &str) -> CoreResult<LoginOutcome> {
        let (name, email) = identity.normalize()?;
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Err(ValidationError::required("deviceId").into());
        }

        let (admin, created) = self.repo.get_or_create_by_email(&name, &email)?;
        let now = Utc::now();
        let access = self.codec.issue(TokenKind::Access, admin.uuid, now)?;
        let refresh = self.codec.issue(TokenKind::Refresh, admin.uuid, now)?;

        let replaced = self.repo.replace_device_session(&AdminSession {
            admin_uuid: admin.uuid,
            device_id: device_id.to_string(),
            token: refresh.token.clone(),
            expires_at: refresh.expires_at,
            created_at: now.timestamp_millis(),
        })?;

        info!(
            "event=session_login module=session status=ok admin_id={} created={} replaced_device_session={}",
            admin.uuid, created, replaced
        );
        Ok(LoginOutcome {
            admin,
            tokens: SessionTokens {
                access_token: access.token,
                refresh_token: refresh.token,
            },
            created,
        })
    }

    /// Issues a new access credential. The refresh credential is not rotated.
    pub fn refresh(&self, refresh_token: &str) -> CoreResult<String> {
        let admin_id = match self.codec.verify(TokenKind::Refresh, refresh_token) {
            Ok(id) => id,
            Err(err) => {
                let err = CoreError::from(err);
                info!(
                    "event=session_refresh module=session status=rejected reason={}",
                    err.code()
                );
                return Err(err);
            }
        };

        if self.repo.find_session(admin_id, refresh_token)?.is_none() {
            info!(
                "event=session_refresh module=session status=rejected admin_id={} reason=unknown_session",
                admin_id
            );
            return Err(CoreError::InvalidToken);
        }

        let access = self.codec.issue(TokenKind::Access, admin_id, Utc::now())?;
        info!(
            "event=session_refresh module=session status=ok admin_id={}",
            admin_id
        );
        Ok(access.token)
    }

    /// Drops the stored session behind `refresh_token`, if any.
    pub fn logout(&self, refresh_token: &str) {
        let admin_id = match self.codec.verify(TokenKind::Refresh, refresh_token) {
            Ok(id) => id,
            Err(_) => {
                info!("event=session_logout module=session status=ok session_removed=false");
                return;
            }
        };

        match self.repo.remove_session(admin_id, refresh_token) {
            Ok(removed) => info!(
                "event=session_logout module=session status=ok admin_id={} session_removed={}",
                admin_id, removed
            ),
            Err(err) => warn!(
                "event=session_logout module=session status=error admin_id={} error={}",
                admin_id, err
            ),
        }
    }

    /// Resolves an access credential to its admin.
    pub fn authenticate(&self, access_token: &str) -> CoreResult<Admin> {
        let admin_id = self.codec.verify(TokenKind::Access, access_token)?;
        self.repo
            .get_admin(admin_id)?
            .ok_or(CoreError::InvalidToken)
    }

    /// Deletes stored sessions that expired at or before `now`.
    pub fn prune_expired_sessions(&self, now: DateTime<Utc>) -> CoreResult<u64> {
        let removed = self.repo.prune_expired_sessions(now.timestamp_millis())?;
        info!(
            "event=session_prune module=session status=ok removed={}",
            removed
        );
        Ok(removed)
    }
}
