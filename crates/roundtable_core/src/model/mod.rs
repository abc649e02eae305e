//! Domain model for reviewers, candidates, slots and reviews.
//!
//! # Responsibility
//! - Define canonical records shared by stores and services.
//! - Hold pure input validation that needs no storage access.
//!
//! # Invariants
//! - Every record is identified by a stable v4 `Uuid`.
//! - Candidates and slots are never hard-deleted by core.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod admin;
pub mod candidate;
pub mod review;
pub mod slot;

/// Offset applied to date-times given without one (UTC+05:30).
const DEFAULT_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;
const NAIVE_DATE_TIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// User-correctable input problem, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// External (wire) name of the field, e.g. `taskDeadline`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn required(field: &'static str) -> Self {
        Self::new(field, format!("{field} is required"))
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

/// Parses an externally supplied identifier.
///
/// Transport layers call this before handing ids to services, so a
/// malformed id is reported as a validation failure on `field`.
pub fn parse_entity_id(field: &'static str, raw: &str) -> Result<Uuid, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    Uuid::parse_str(trimmed)
        .map_err(|_| ValidationError::new(field, format!("`{trimmed}` is not a valid id")))
}

/// Parses a reviewer- or operator-typed date-time into epoch milliseconds.
///
/// RFC 3339 input keeps its own offset; naive input such as
/// `2025-01-10T10:00` is read as India Standard Time. Failures name `field`.
pub fn parse_local_time(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.timestamp_millis());
    }

    let offset = FixedOffset::east_opt(DEFAULT_OFFSET_SECS)
        .ok_or_else(|| ValidationError::new(field, "invalid default offset"))?;
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            if let Some(local) = offset.from_local_datetime(&naive).single() {
                return Ok(local.timestamp_millis());
            }
        }
    }
    Err(ValidationError::new(
        field,
        format!("unrecognized date-time `{trimmed}`"),
    ))
}

/// Returns the trimmed value, or `None` when it is absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
