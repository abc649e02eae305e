//! Service-level error taxonomy.
//!
//! # Responsibility
//! - Give every public operation one error type that transport layers can
//!   map to a status without inspecting messages.
//!
//! # Invariants
//! - Storage failures are surfaced, never retried or swallowed here.
//! - Repository `NotFound` stays `NotFound`; every other repository error
//!   becomes `Storage`.

use crate::auth::token::TokenError;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug)]
pub enum CoreError {
    /// Malformed or missing input; names the field.
    Validation(ValidationError),
    /// Referenced entity is absent, or a claim lost the race.
    NotFound { entity: &'static str, id: Uuid },
    /// Entity exists but the relationship required by the call does not.
    Forbidden(String),
    /// Entity exists but is in the wrong state for the transition.
    PreconditionFailed(String),
    InvalidToken,
    ExpiredToken,
    Storage(RepoError),
}

/// Coarse classification used by transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    PreconditionFailed,
    InvalidToken,
    ExpiredToken,
    Storage,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            Self::InvalidToken => ErrorKind::InvalidToken,
            Self::ExpiredToken => ErrorKind::ExpiredToken,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// HTTP status a transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::PreconditionFailed => 400,
            ErrorKind::InvalidToken | ErrorKind::ExpiredToken => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Storage => 500,
        }
    }

    /// Stable short code for logs.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "validation_failed",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::PreconditionFailed => "precondition_failed",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::ExpiredToken => "expired_token",
            ErrorKind::Storage => match self {
                Self::Storage(RepoError::Db(err)) if err.is_busy() => "storage_busy",
                _ => "storage_failure",
            },
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Forbidden(message) => write!(f, "forbidden: {message}"),
            Self::PreconditionFailed(message) => write!(f, "precondition failed: {message}"),
            Self::InvalidToken => write!(f, "invalid session token"),
            Self::ExpiredToken => write!(f, "expired session token"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Duplicate { entity, field } => Self::Validation(ValidationError::new(
                field,
                format!("{entity} with this {field} already exists"),
            )),
            other => Self::Storage(other),
        }
    }
}

impl From<TokenError> for CoreError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::Invalid(_) | TokenError::Encode(_) => Self::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreError, ErrorKind};
    use crate::model::ValidationError;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_not_found_stays_not_found() {
        let id = Uuid::new_v4();
        let err: CoreError = RepoError::NotFound { entity: "slot", id }.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn invalid_data_becomes_storage_failure() {
        let err: CoreError = RepoError::InvalidData("bad row".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn validation_keeps_field_name() {
        let err: CoreError = ValidationError::required("taskDeadline").into();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("taskDeadline"));
    }
}
